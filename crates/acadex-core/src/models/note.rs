use serde::{Deserialize, Serialize};

use super::{Course, UploadedAsset};

/// Payload for POST /notes.
///
/// Carries the full `attachments` array plus the first asset's fields
/// flattened at the top level; older API consumers read only the flattened
/// primary-asset fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    pub subject: Option<String>,
    pub course_id: String,
    pub course_title: Option<String>,
    pub description: String,
    pub attachments: Vec<UploadedAsset>,
    pub file_url: Option<String>,
    pub public_id: Option<String>,
    pub original_filename: Option<String>,
    pub resource_type: Option<String>,
    pub format: Option<String>,
    pub bytes: Option<u64>,
    pub class_code: Option<String>,
}

impl CreateNoteRequest {
    /// Build a note payload from form fields and the successful-assets list.
    pub fn new(
        title: &str,
        course: &Course,
        description: &str,
        attachments: Vec<UploadedAsset>,
        class_code: Option<String>,
    ) -> Self {
        let primary = attachments.first().cloned();
        Self {
            title: title.trim().to_string(),
            subject: Some(course.title.clone()),
            course_id: course.id.clone(),
            course_title: Some(course.title.clone()),
            description: description.trim().to_string(),
            file_url: primary.as_ref().map(|a| a.secure_url.clone()),
            public_id: primary.as_ref().map(|a| a.public_id.clone()),
            original_filename: primary.as_ref().map(|a| a.original_filename.clone()),
            resource_type: primary.as_ref().map(|a| a.resource_type.clone()),
            format: primary.as_ref().map(|a| a.format.clone()),
            bytes: primary.as_ref().map(|a| a.bytes),
            attachments,
            class_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> UploadedAsset {
        UploadedAsset {
            secure_url: format!("https://res.example.com/{}", name),
            public_id: format!("acadex-notes/{}", name),
            original_filename: name.to_string(),
            resource_type: "raw".to_string(),
            format: "pdf".to_string(),
            bytes: 10,
            folder: Some("acadex-notes".to_string()),
            relative_path: None,
        }
    }

    fn course() -> Course {
        Course {
            id: "c1".to_string(),
            title: "Linear Algebra".to_string(),
            description: None,
            class_code: None,
        }
    }

    #[test]
    fn primary_asset_fields_are_flattened() {
        let req = CreateNoteRequest::new(
            " Week 3 ",
            &course(),
            "lecture notes",
            vec![asset("a"), asset("b")],
            Some("MATH101".to_string()),
        );

        assert_eq!(req.title, "Week 3");
        assert_eq!(req.course_id, "c1");
        assert_eq!(req.subject.as_deref(), Some("Linear Algebra"));
        assert_eq!(req.attachments.len(), 2);
        assert_eq!(req.public_id.as_deref(), Some("acadex-notes/a"));

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["courseId"], "c1");
        assert_eq!(json["fileUrl"], "https://res.example.com/a");
        assert_eq!(json["classCode"], "MATH101");
    }

    #[test]
    fn empty_attachments_leave_primary_fields_unset() {
        let req = CreateNoteRequest::new("t", &course(), "", vec![], None);
        assert!(req.file_url.is_none());
        assert!(req.bytes.is_none());
    }
}
