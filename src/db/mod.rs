//! # Data access layer
//!
//! sqlx queries behind the bundled SQLite backend. Only
//! `backend::SqliteBackend` calls into this module.
//!
//! - `notes`: note CRUD, always scoped by owner
//! - `folders`: folder listing and creation
//! - `users`: account lookup and creation

pub mod folders;
pub mod notes;
pub mod users;

pub use folders::*;
pub use notes::*;
