//! # Data models
//!
//! Plain data types shared by the backend, the services and the routes.
//! - `note`: notes, the credential union and the editor form
//! - `folder`: folders
//! - `user`: accounts and backend sessions

pub mod folder;
pub mod note;
pub mod user;

pub use folder::*;
pub use note::*;
pub use user::*;
