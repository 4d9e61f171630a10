use serde::{Deserialize, Serialize};

/// Descriptor of a file successfully stored by the upload endpoint.
///
/// Immutable once created. Serialized camelCase because the note-saving API
/// consumes it verbatim inside the note payload's `attachments` array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: String,
    pub original_filename: String,
    pub resource_type: String,
    pub format: String,
    pub bytes: u64,
    pub folder: Option<String>,
    /// Path fragment relative to the picked folder, when the file came from
    /// a folder selection. `None` for single-file picks.
    pub relative_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_serializes_camel_case() {
        let asset = UploadedAsset {
            secure_url: "https://res.example.com/a.pdf".to_string(),
            public_id: "acadex-notes/a".to_string(),
            original_filename: "a".to_string(),
            resource_type: "raw".to_string(),
            format: "pdf".to_string(),
            bytes: 1234,
            folder: Some("acadex-notes".to_string()),
            relative_path: None,
        };
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["secureUrl"], "https://res.example.com/a.pdf");
        assert_eq!(json["publicId"], "acadex-notes/a");
        assert_eq!(json["originalFilename"], "a");
        assert_eq!(json["relativePath"], serde_json::Value::Null);
    }
}
