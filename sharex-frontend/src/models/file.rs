use serde::{Deserialize, Deserializer, Serialize};

/// Read-only description of one shared file, shown on the download page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_id: String,
    pub original_file_name: String,
    #[serde(default)]
    pub file_size: u64,
    // Older API builds name this flag `hasPassword`; Jackson drops the `is` prefix.
    #[serde(default, alias = "hasPassword", alias = "passwordProtected")]
    pub is_password_protected: bool,
    #[serde(default)]
    pub download_limit: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_count: u32,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Entry of the "my files" listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub file_id: String,
    pub original_file_name: String,
    #[serde(default, alias = "hasPassword", alias = "passwordProtected")]
    pub is_password_protected: bool,
    #[serde(default)]
    pub download_limit: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_count: u32,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_accepts_client_field_names() {
        let body = r#"{
            "fileId": "f-1",
            "originalFileName": "report.pdf",
            "fileSize": 2048,
            "isPasswordProtected": true,
            "downloadLimit": 5,
            "downloadCount": 2,
            "expiryDate": "2026-12-01T12:00:00",
            "createdAt": "2026-10-01T08:30:00"
        }"#;
        let metadata: FileMetadata = serde_json::from_str(body).unwrap();

        assert!(metadata.is_password_protected);
        assert_eq!(metadata.download_limit, Some(5));
        assert_eq!(metadata.download_count, 2);
    }

    #[test]
    fn metadata_accepts_server_field_names() {
        let body = r#"{
            "fileId": "f-1",
            "originalFileName": "a.png",
            "fileSize": 10,
            "hasPassword": true,
            "downloadLimit": null,
            "downloadCount": null,
            "expiryDate": null,
            "createdAt": "2026-10-01T08:30:00"
        }"#;
        let metadata: FileMetadata = serde_json::from_str(body).unwrap();

        assert!(metadata.is_password_protected);
        assert_eq!(metadata.download_limit, None);
        assert_eq!(metadata.download_count, 0);
    }

    #[test]
    fn file_info_without_size() {
        let body = r#"[{"fileId":"f-2","originalFileName":"notes.txt",
                        "passwordProtected":false,"downloadCount":7,
                        "createdAt":"2026-10-01T08:30:00"}]"#;
        let files: Vec<FileInfo> = serde_json::from_str(body).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].download_count, 7);
        assert!(!files[0].is_password_protected);
    }
}
