//! Data models for host content entities and accounts.

pub mod account;
pub mod content;

pub use account::Account;
pub use content::{ContentKind, ContentRecord};
