//! Data models for the application
//!
//! Each sub-module covers one feature area: stored-asset descriptors,
//! courses, note payloads, and operation notices.

mod asset;
mod course;
mod note;
mod notice;

// Re-export all models for convenient imports
pub use asset::*;
pub use course::*;
pub use note::*;
pub use notice::*;
