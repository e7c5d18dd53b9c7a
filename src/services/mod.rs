//! Business logic shared by the route handlers.
//!
//! - `attachments`: photo and voice blob naming and upload
//! - `credential`: note password hashing, strength policy, access gate
//! - `editor`: editor form validation before a save
//! - `notes`: the note repository and its cache
//! - `session`: the workspace session gate

pub mod attachments;
pub mod credential;
pub mod editor;
pub mod notes;
pub mod session;
