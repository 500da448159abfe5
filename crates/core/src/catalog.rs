//! Catalog records: authors, categories and books.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{AuthorId, BookId, CategoryId};

/// International Standard Book Number, as supplied by the client.
///
/// Only surrounding whitespace is normalised; checksum validation is left to
/// the cataloguers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("isbn must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Isbn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Isbn {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Isbn> for String {
    fn from(value: Isbn) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Validated input for creating or replacing a book.
///
/// Whether the referenced author and category exist is checked against the
/// store, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub isbn: Isbn,
    pub title: String,
    pub author_id: AuthorId,
    pub category_id: CategoryId,
}

impl BookDraft {
    pub fn new(
        isbn: &str,
        title: &str,
        author_id: AuthorId,
        category_id: CategoryId,
    ) -> DomainResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        Ok(Self {
            isbn: Isbn::parse(isbn)?,
            title: title.to_string(),
            author_id,
            category_id,
        })
    }
}

/// A book joined with its author and category, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: BookId,
    pub isbn: Isbn,
    pub title: String,
    pub author_id: AuthorId,
    pub category_id: CategoryId,
    pub author: Author,
    pub category: Category,
}

/// Normalise and validate an author or category display name.
pub fn validate_name(kind: &'static str, raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{kind} name must not be empty")));
    }
    Ok(name.to_string())
}
