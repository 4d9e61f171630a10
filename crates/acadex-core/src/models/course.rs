use serde::{Deserialize, Serialize};

/// Course record as returned by GET /courses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "classCode")]
    pub class_code: Option<String>,
}
