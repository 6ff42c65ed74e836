//! Upload validation and storage.

pub mod store;
pub mod validate;

pub use store::{StoredUpload, UploadStore};
