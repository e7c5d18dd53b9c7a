//! # Route handlers
//!
//! - `auth`: session, sign up/in, developer access, logout
//! - `notes`: note CRUD and unlock; also defines [`AppState`]
//! - `folders`: folder listing and creation
//! - `tags`: distinct tags
//! - `attachments`: photo and voice uploads
//! - `password`: password strength check
//! - `health`: liveness

pub mod attachments;
pub mod auth;
pub mod folders;
pub mod health;
pub mod notes;
pub mod password;
pub mod tags;

pub use folders::*;
pub use health::*;
pub use notes::*;
pub use tags::*;
