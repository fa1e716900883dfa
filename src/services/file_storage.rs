use std::path::PathBuf;

use url::Url;

use crate::models::{File, FileTag, FileView};
use crate::store::Stores;

use super::DomainError;

/// Local filesystem attachment storage. Bytes live under one subdirectory
/// per repair number; metadata rows live in the file store.
pub struct FileStorageService {
    root: PathBuf,
    base_url: String,
    stores: Stores,
}

impl FileStorageService {
    pub fn new(root: PathBuf, base_url: String, stores: Stores) -> Self {
        Self {
            root,
            base_url,
            stores,
        }
    }

    /// Store the upload under `<root>/<repair number>/<filename>` and persist
    /// its metadata. Tags are derived from the content type here and never
    /// recomputed afterwards.
    pub async fn upload(
        &self,
        repair_id: i64,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<FileView, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::Upload(format!(
                "Failed to store empty file: {filename}"
            )));
        }

        let repair = self
            .stores
            .repairs
            .find_by_id(repair_id)
            .await?
            .ok_or_else(|| {
                DomainError::Upload(format!(
                    "Failed to upload file: {filename} for non-existing repair"
                ))
            })?;

        let filename = safe_path_segment(filename)?;
        let directory = match &repair.number {
            Some(number) => safe_path_segment(number)?,
            None => repair.id.to_string(),
        };

        let destination = self.root.join(&directory).join(&filename);
        if tokio::fs::try_exists(&destination)
            .await
            .map_err(|e| DomainError::Upload(format!("Failed to store file: {filename}: {e}")))?
        {
            return Err(DomainError::FileAlreadyExists(format!(
                "File already exists: {filename}"
            )));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::Upload(format!("Could not initialize storage: {e}"))
            })?;
        }
        tokio::fs::write(&destination, bytes)
            .await
            .map_err(|e| DomainError::Upload(format!("Failed to store file: {filename}: {e}")))?;

        let content_type = content_type.unwrap_or("application/octet-stream").to_string();
        let tags = FileTag::detect(&content_type);
        let relative_path = format!("{directory}/{filename}");
        let file_url = self.public_url(&relative_path)?;

        let file = self
            .stores
            .files
            .insert(File {
                id: 0,
                repair_id,
                filename,
                content_type,
                file_path: relative_path,
                file_url,
                size: bytes.len() as i64,
                tags,
            })
            .await?;

        Ok(file.into())
    }

    pub async fn find_by_id(&self, file_id: i64) -> Result<File, DomainError> {
        self.stores
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| DomainError::FileNotFound(format!("File not found with id: {file_id}")))
    }

    /// Load the metadata row together with the stored bytes.
    pub async fn load(&self, file_id: i64) -> Result<(File, Vec<u8>), DomainError> {
        let file = self.find_by_id(file_id).await?;
        let path = self.root.join(&file.file_path);
        let bytes = tokio::fs::read(&path).await.map_err(|_| {
            DomainError::FileAccessDenied(format!("Could not read file: {}", file.filename))
        })?;
        Ok((file, bytes))
    }

    pub async fn list_for_repair(&self, repair_id: i64) -> Result<Vec<FileView>, DomainError> {
        Ok(self
            .stores
            .files
            .find_by_repair_id(repair_id)
            .await?
            .into_iter()
            .map(FileView::from)
            .collect())
    }

    /// Remove the bytes (tolerating an already-missing file on disk) and the
    /// metadata row.
    pub async fn delete(&self, file_id: i64) -> Result<(), DomainError> {
        let file = self.stores.files.find_by_id(file_id).await?.ok_or_else(|| {
            DomainError::FileNotFound(format!("Failed to delete file with id: {file_id}"))
        })?;

        let path = self.root.join(&file.file_path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DomainError::Upload(format!(
                    "Failed to delete file: {file_id}: {e}"
                )))
            }
        }

        self.stores.files.delete(file_id).await?;
        Ok(())
    }

    /// Sequential child cleanup used by repair deletion; a failure partway
    /// leaves the remaining files in place.
    pub async fn delete_all_by_repair(&self, repair_id: i64) -> Result<(), DomainError> {
        for file in self.stores.files.find_by_repair_id(repair_id).await? {
            self.delete(file.id).await?;
        }
        Ok(())
    }

    fn public_url(&self, relative_path: &str) -> Result<String, DomainError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| DomainError::Internal(format!("invalid file base URL: {e}")))?;
        let root_name = self
            .root
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("uploads");
        let joined = base
            .join(&format!("{root_name}/{relative_path}"))
            .map_err(|e| DomainError::Internal(format!("invalid file URL: {e}")))?;
        Ok(joined.to_string())
    }
}

/// Uploaded names become single path segments under the upload root; path
/// separators and parent traversal are rejected outright.
fn safe_path_segment(name: &str) -> Result<String, DomainError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(DomainError::FileAccessDenied(format!(
            "Cannot store file outside the upload directory: {name}"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, Repair, RepairType, Vehicle};
    use crate::store::memory::MemoryStore;

    async fn setup() -> (FileStorageService, Stores, i64, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let stores = MemoryStore::new().stores();
        let service = FileStorageService::new(
            dir.path().join("upload-dir"),
            "http://localhost:8080/".to_string(),
            stores.clone(),
        );

        let vehicle = stores
            .vehicles
            .insert(Vehicle {
                id: 0,
                vin: None,
                manufacturer: None,
                model: None,
                licence_plate: None,
                production_date: None,
                color: None,
                engine_capacity: None,
                fuel_type: FuelType::Petrol,
                power: None,
            })
            .await
            .unwrap();
        let repair = stores
            .repairs
            .insert(Repair {
                id: 0,
                number: Some("21G-01-2024".to_string()),
                start_date: None,
                expected_end_date: None,
                repair_type: RepairType::Normal,
                vehicle_id: vehicle.id,
            })
            .await
            .unwrap();

        (service, stores, repair.id, dir)
    }

    #[tokio::test]
    async fn upload_stores_bytes_and_metadata() {
        let (service, _, repair_id, _dir) = setup().await;

        let view = service
            .upload(repair_id, "photo.png", Some("image/png"), b"png-bytes")
            .await
            .unwrap();

        assert_eq!(view.tags, vec![FileTag::Image]);
        assert_eq!(view.size, 9);
        assert!(view.file_url.ends_with("upload-dir/21G-01-2024/photo.png"));

        let (file, bytes) = service.load(view.id).await.unwrap();
        assert_eq!(file.filename, "photo.png");
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn upload_rejects_empty_and_duplicate_files() {
        let (service, _, repair_id, _dir) = setup().await;

        assert!(matches!(
            service.upload(repair_id, "a.pdf", None, b"").await.unwrap_err(),
            DomainError::Upload(_)
        ));

        service
            .upload(repair_id, "a.pdf", Some("application/pdf"), b"pdf")
            .await
            .unwrap();
        assert!(matches!(
            service
                .upload(repair_id, "a.pdf", Some("application/pdf"), b"pdf")
                .await
                .unwrap_err(),
            DomainError::FileAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn upload_rejects_path_traversal() {
        let (service, _, repair_id, _dir) = setup().await;

        let err = service
            .upload(repair_id, "../escape.txt", None, b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::FileAccessDenied(_)));
    }

    #[tokio::test]
    async fn upload_for_missing_repair_fails() {
        let (service, _, _, _dir) = setup().await;

        let err = service
            .upload(999, "a.pdf", None, b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Upload(_)));
    }

    #[tokio::test]
    async fn delete_all_by_repair_removes_rows_and_bytes() {
        let (service, stores, repair_id, _dir) = setup().await;
        let first = service
            .upload(repair_id, "a.pdf", Some("application/pdf"), b"a")
            .await
            .unwrap();
        service
            .upload(repair_id, "b.pdf", Some("application/pdf"), b"b")
            .await
            .unwrap();

        service.delete_all_by_repair(repair_id).await.unwrap();

        assert!(stores
            .files
            .find_by_repair_id(repair_id)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            service.load(first.id).await.unwrap_err(),
            DomainError::FileNotFound(_)
        ));
    }
}
