//! Domain methods for the Acadex API client.

use anyhow::Result;

use acadex_core::models::{Course, CreateNoteRequest};

use crate::ApiClient;

impl ApiClient {
    /// Create a note record attaching the uploaded assets.
    ///
    /// The backend's response shape is not part of this client's contract,
    /// so the raw JSON body is returned.
    pub async fn create_note(&self, note: &CreateNoteRequest) -> Result<serde_json::Value> {
        tracing::debug!(
            title = %note.title,
            attachments = note.attachments.len(),
            "Saving note"
        );
        self.post_json("/notes", note).await
    }

    /// List courses, optionally scoped to a classroom code.
    pub async fn list_courses(&self, class_code: Option<&str>) -> Result<Vec<Course>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(code) = class_code {
            query.push(("classCode", code.to_string()));
        }
        self.get("/courses", &query).await
    }

    /// Find a course by id in a fetched course list.
    pub fn find_course<'a>(courses: &'a [Course], course_id: &str) -> Option<&'a Course> {
        courses.iter().find(|course| course.id == course_id)
    }
}
