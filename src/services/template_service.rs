use std::path::PathBuf;

use base64::{engine::general_purpose, Engine as _};

use crate::models::TemplateInfo;

use super::DomainError;

/// Printable document templates shipped with the application. The catalog is
/// fixed; content is read from the configured templates directory.
const TEMPLATES: &[TemplateInfo] = &[
    TemplateInfo {
        name: "RepairOrder",
        display_name: "Zlecenie naprawy",
        description: "Dokument zlecenia naprawy pojazdu",
    },
    TemplateInfo {
        name: "VatDeclaration",
        display_name: "Oświadczenie VAT",
        description: "Oświadczenie o statusie płatnika VAT",
    },
];

const TEMPLATE_IMAGES: &[&str] = &["header.png", "footer.png"];

pub struct TemplateService {
    templates_dir: PathBuf,
}

impl TemplateService {
    pub fn new(templates_dir: PathBuf) -> Self {
        Self { templates_dir }
    }

    pub fn available(&self) -> Vec<TemplateInfo> {
        TEMPLATES.to_vec()
    }

    pub async fn content(&self, name: &str) -> Result<String, DomainError> {
        if !TEMPLATES.iter().any(|t| t.name == name) {
            return Err(DomainError::FileNotFound(format!(
                "Template not found: {name}"
            )));
        }

        let path = self.templates_dir.join(format!("{name}.html"));
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|_| DomainError::FileAccessDenied(format!("Failed to read template: {name}")))
    }

    /// Template HTML with header/footer image references replaced by base64
    /// data URLs. A missing image is skipped, not an error.
    pub async fn content_with_embedded_images(&self, name: &str) -> Result<String, DomainError> {
        let mut html = self.content(name).await?;

        for image in TEMPLATE_IMAGES {
            if let Ok(bytes) = self.image(image).await {
                let data_url = format!(
                    "data:image/png;base64,{}",
                    general_purpose::STANDARD.encode(&bytes)
                );
                html = html.replace(
                    &format!("src=\"{image}\""),
                    &format!("src=\"{data_url}\""),
                );
            }
        }

        Ok(html)
    }

    /// Only the fixed header/footer images are served; anything else is
    /// treated as unknown, which also rules out traversal through the name.
    pub async fn image(&self, image_name: &str) -> Result<Vec<u8>, DomainError> {
        if !TEMPLATE_IMAGES.contains(&image_name) {
            return Err(DomainError::FileNotFound(format!(
                "Image not found: {image_name}"
            )));
        }

        let path = self.templates_dir.join(image_name);
        tokio::fs::read(&path).await.map_err(|_| {
            DomainError::FileAccessDenied(format!("Failed to read image: {image_name}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let service = TemplateService::new(PathBuf::from("templates/documents"));
        assert!(matches!(
            service.content("Invoice").await.unwrap_err(),
            DomainError::FileNotFound(_)
        ));
        assert!(matches!(
            service.image("../secret.png").await.unwrap_err(),
            DomainError::FileNotFound(_)
        ));
    }

    #[tokio::test]
    async fn embeds_images_when_present() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("RepairOrder.html"),
            "<html><img src=\"header.png\"/></html>",
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("header.png"), b"png-bytes")
            .await
            .unwrap();

        let service = TemplateService::new(dir.path().to_path_buf());
        let html = service
            .content_with_embedded_images("RepairOrder")
            .await
            .unwrap();

        assert!(html.contains("data:image/png;base64,"));
        assert!(!html.contains("src=\"header.png\""));
    }

    #[tokio::test]
    async fn missing_image_is_skipped_during_embedding() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("VatDeclaration.html"),
            "<html><img src=\"footer.png\"/></html>",
        )
        .await
        .unwrap();

        let service = TemplateService::new(dir.path().to_path_buf());
        let html = service
            .content_with_embedded_images("VatDeclaration")
            .await
            .unwrap();

        assert!(html.contains("src=\"footer.png\""));
    }
}
