//! `libcat-core`: catalog domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod catalog;
pub mod error;
pub mod id;

pub use catalog::{validate_name, Author, BookDraft, BookView, Category, Isbn};
pub use error::{DomainError, DomainResult};
pub use id::{AuthorId, BookId, CategoryId, UserId};
