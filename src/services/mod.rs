pub mod auth_service;
pub mod client_service;
pub mod error;
pub mod file_storage;
pub mod part_service;
pub mod repair_part_service;
pub mod repair_service;
pub mod sync;
pub mod template_service;
pub mod user_service;
pub mod vehicle_service;

pub use auth_service::{AuthService, LoginRequest, LoginResponse};
pub use client_service::ClientService;
pub use error::DomainError;
pub use file_storage::FileStorageService;
pub use part_service::PartService;
pub use repair_part_service::RepairPartService;
pub use repair_service::RepairService;
pub use template_service::TemplateService;
pub use user_service::{NewUser, UserService};
pub use vehicle_service::VehicleService;
