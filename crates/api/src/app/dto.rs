use serde::Deserialize;

use libcat_core::{AuthorId, BookDraft, CategoryId, DomainResult};

// -------------------------
// Request DTOs
// -------------------------

/// Body of book create and update requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub isbn: String,
    pub title: String,
    pub author_id: AuthorId,
    pub category_id: CategoryId,
}

impl BookRequest {
    pub fn into_draft(self) -> DomainResult<BookDraft> {
        BookDraft::new(&self.isbn, &self.title, self.author_id, self.category_id)
    }
}

/// Body of author and category create requests.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}
