use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification tag derived from the upload's content type; assigned once
/// at upload time and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileTag {
    Image,
    Document,
}

impl FileTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileTag::Image => "IMAGE",
            FileTag::Document => "DOCUMENT",
        }
    }

    /// `image/*` uploads are tagged IMAGE, everything else DOCUMENT.
    pub fn detect(content_type: &str) -> Vec<FileTag> {
        if content_type.starts_with("image/") {
            vec![FileTag::Image]
        } else {
            vec![FileTag::Document]
        }
    }
}

impl fmt::Display for FileTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IMAGE" => Ok(FileTag::Image),
            "DOCUMENT" => Ok(FileTag::Document),
            other => Err(format!("unknown file tag: {other}")),
        }
    }
}

/// Metadata row for an uploaded attachment. Bytes live on disk under the
/// upload root; `file_path` is relative to that root.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: i64,
    pub repair_id: i64,
    pub filename: String,
    pub content_type: String,
    pub file_path: String,
    pub file_url: String,
    pub size: i64,
    pub tags: Vec<FileTag>,
}

/// Wire view of a file; omits the storage path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub id: i64,
    pub repair_id: i64,
    pub filename: String,
    pub content_type: String,
    pub file_url: String,
    pub size: i64,
    pub tags: Vec<FileTag>,
}

impl From<File> for FileView {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            repair_id: file.repair_id,
            filename: file.filename,
            content_type: file.content_type,
            file_url: file.file_url,
            size: file.size,
            tags: file.tags,
        }
    }
}

/// Descriptor of a printable document template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_tags_by_content_type() {
        assert_eq!(FileTag::detect("image/png"), vec![FileTag::Image]);
        assert_eq!(FileTag::detect("image/jpeg"), vec![FileTag::Image]);
        assert_eq!(FileTag::detect("application/pdf"), vec![FileTag::Document]);
        assert_eq!(FileTag::detect("text/plain"), vec![FileTag::Document]);
    }
}
