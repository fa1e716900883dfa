use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    AuthService, ClientService, FileStorageService, PartService, RepairPartService, RepairService,
    TemplateService, UserService, VehicleService,
};
use crate::store::Stores;

/// Shared application state: configuration plus one instance of every
/// service, wired over the chosen store backend.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub clients: Arc<ClientService>,
    pub vehicles: Arc<VehicleService>,
    pub repairs: Arc<RepairService>,
    pub parts: Arc<PartService>,
    pub repair_parts: Arc<RepairPartService>,
    pub files: Arc<FileStorageService>,
    pub templates: Arc<TemplateService>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let config = Arc::new(config);
        let files = Arc::new(FileStorageService::new(
            config.storage.root.clone(),
            config.storage.base_url.clone(),
            stores.clone(),
        ));

        Self {
            clients: Arc::new(ClientService::new(stores.clone())),
            vehicles: Arc::new(VehicleService::new(stores.clone())),
            repairs: Arc::new(RepairService::new(stores.clone(), files.clone())),
            parts: Arc::new(PartService::new(stores.clone())),
            repair_parts: Arc::new(RepairPartService::new(stores.clone())),
            templates: Arc::new(TemplateService::new(config.storage.templates_dir.clone())),
            auth: Arc::new(AuthService::new(stores.clone(), config.security.clone())),
            users: Arc::new(UserService::new(stores)),
            files,
            config,
        }
    }
}
