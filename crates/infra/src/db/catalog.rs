//! Catalog queries: books, authors and categories.

use sqlx::FromRow;
use tracing::instrument;

use libcat_core::{
    validate_name, Author, AuthorId, BookDraft, BookId, BookView, Category, CategoryId,
    DomainError, Isbn,
};

use super::error::{is_unique_violation, CatalogError};
use super::store::SqliteStore;

const BOOK_VIEW_SELECT: &str = r#"
    SELECT
        b.id,
        b.isbn,
        b.title,
        b.author_id,
        b.category_id,
        a.name AS author_name,
        c.name AS category_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN categories c ON c.id = b.category_id
"#;

#[derive(FromRow)]
struct BookViewRow {
    id: i64,
    isbn: String,
    title: String,
    author_id: i64,
    category_id: i64,
    author_name: String,
    category_name: String,
}

impl TryFrom<BookViewRow> for BookView {
    type Error = DomainError;

    fn try_from(row: BookViewRow) -> Result<Self, Self::Error> {
        let author_id = AuthorId::new(row.author_id);
        let category_id = CategoryId::new(row.category_id);
        Ok(BookView {
            id: BookId::new(row.id),
            isbn: Isbn::parse(&row.isbn)?,
            title: row.title,
            author_id,
            category_id,
            author: Author { id: author_id, name: row.author_name },
            category: Category { id: category_id, name: row.category_name },
        })
    }
}

#[derive(FromRow)]
struct NamedRow {
    id: i64,
    name: String,
}

/// Which books to list.
#[derive(Debug, Clone, Copy)]
pub enum BookFilter<'a> {
    All,
    AuthorId(AuthorId),
    AuthorName(&'a str),
    CategoryId(CategoryId),
    CategoryName(&'a str),
}

fn conflict_or_db(e: sqlx::Error, what: impl FnOnce() -> String) -> CatalogError {
    if is_unique_violation(&e) {
        return CatalogError::Conflict(what());
    }
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => CatalogError::Conflict(what()),
        _ => CatalogError::Db(e),
    }
}

impl SqliteStore {
    // ── books ───────────────────────────────────────────────────────────────

    #[instrument(skip(self), err)]
    pub async fn list_books(&self, filter: BookFilter<'_>) -> Result<Vec<BookView>, CatalogError> {
        let sql = match filter {
            BookFilter::All => format!("{BOOK_VIEW_SELECT} ORDER BY b.id"),
            BookFilter::AuthorId(_) => format!("{BOOK_VIEW_SELECT} WHERE b.author_id = ? ORDER BY b.id"),
            BookFilter::AuthorName(_) => format!("{BOOK_VIEW_SELECT} WHERE a.name = ? ORDER BY b.id"),
            BookFilter::CategoryId(_) => format!("{BOOK_VIEW_SELECT} WHERE b.category_id = ? ORDER BY b.id"),
            BookFilter::CategoryName(_) => format!("{BOOK_VIEW_SELECT} WHERE c.name = ? ORDER BY b.id"),
        };

        let query = sqlx::query_as::<_, BookViewRow>(&sql);
        let query = match filter {
            BookFilter::All => query,
            BookFilter::AuthorId(id) => query.bind(id.get()),
            BookFilter::CategoryId(id) => query.bind(id.get()),
            BookFilter::AuthorName(name) | BookFilter::CategoryName(name) => query.bind(name),
        };

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| BookView::try_from(row).map_err(CatalogError::from))
            .collect()
    }

    pub async fn get_book(&self, isbn: &str) -> Result<BookView, CatalogError> {
        let row = sqlx::query_as::<_, BookViewRow>(&format!("{BOOK_VIEW_SELECT} WHERE b.isbn = ?"))
            .bind(isbn.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::not_found("book"))?;
        Ok(BookView::try_from(row)?)
    }

    /// Insert a book after checking that its author and category exist.
    #[instrument(skip(self), fields(isbn = %draft.isbn), err)]
    pub async fn create_book(&self, draft: &BookDraft) -> Result<BookView, CatalogError> {
        self.check_references(draft).await?;

        sqlx::query("INSERT INTO books (isbn, title, author_id, category_id) VALUES (?, ?, ?, ?)")
            .bind(draft.isbn.as_str())
            .bind(&draft.title)
            .bind(draft.author_id.get())
            .bind(draft.category_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_db(e, || format!("a book with isbn '{}' already exists", draft.isbn)))?;

        tracing::info!(isbn = %draft.isbn, "book created");
        self.get_book(draft.isbn.as_str()).await
    }

    /// Replace the book currently stored under `isbn` (the ISBN itself may change).
    #[instrument(skip(self, draft), err)]
    pub async fn update_book(&self, isbn: &str, draft: &BookDraft) -> Result<(), CatalogError> {
        let book_id: i64 = sqlx::query_scalar("SELECT id FROM books WHERE isbn = ?")
            .bind(isbn.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::not_found("book"))?;

        self.check_references(draft).await?;

        sqlx::query("UPDATE books SET isbn = ?, title = ?, author_id = ?, category_id = ? WHERE id = ?")
            .bind(draft.isbn.as_str())
            .bind(&draft.title)
            .bind(draft.author_id.get())
            .bind(draft.category_id.get())
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_db(e, || format!("a book with isbn '{}' already exists", draft.isbn)))?;

        tracing::info!(isbn, new_isbn = %draft.isbn, "book updated");
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn delete_book(&self, isbn: &str) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn.trim())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("book").into());
        }
        tracing::info!(isbn, "book deleted");
        Ok(())
    }

    async fn check_references(&self, draft: &BookDraft) -> Result<(), CatalogError> {
        if self.find_author(draft.author_id).await?.is_none() {
            return Err(CatalogError::InvalidAuthor);
        }
        if self.find_category(draft.category_id).await?.is_none() {
            return Err(CatalogError::InvalidCategory);
        }
        Ok(())
    }

    // ── authors ─────────────────────────────────────────────────────────────

    pub async fn list_authors(&self) -> Result<Vec<Author>, CatalogError> {
        let rows = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Author { id: AuthorId::new(r.id), name: r.name })
            .collect())
    }

    pub async fn get_author(&self, id: AuthorId) -> Result<Author, CatalogError> {
        Ok(self
            .find_author(id)
            .await?
            .ok_or(DomainError::not_found("author"))?)
    }

    pub async fn create_author(&self, name: &str) -> Result<Author, CatalogError> {
        let name = validate_name("author", name)?;
        let result = sqlx::query("INSERT INTO authors (name) VALUES (?)")
            .bind(&name)
            .execute(&self.pool)
            .await?;
        let author = Author { id: AuthorId::new(result.last_insert_rowid()), name };
        tracing::info!(id = %author.id, "author created");
        Ok(author)
    }

    pub async fn delete_author(&self, id: AuthorId) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_db(e, || format!("author {id} is still referenced by books")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("author").into());
        }
        tracing::info!(%id, "author deleted");
        Ok(())
    }

    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, sqlx::Error> {
        let row = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM authors WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Author { id: AuthorId::new(r.id), name: r.name }))
    }

    // ── categories ──────────────────────────────────────────────────────────

    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let rows = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Category { id: CategoryId::new(r.id), name: r.name })
            .collect())
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, CatalogError> {
        let name = validate_name("category", name)?;
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(&name)
            .execute(&self.pool)
            .await?;
        let category = Category { id: CategoryId::new(result.last_insert_rowid()), name };
        tracing::info!(id = %category.id, "category created");
        Ok(category)
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_db(e, || format!("category {id} is still referenced by books")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("category").into());
        }
        tracing::info!(%id, "category deleted");
        Ok(())
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, sqlx::Error> {
        let row = sqlx::query_as::<_, NamedRow>("SELECT id, name FROM categories WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Category { id: CategoryId::new(r.id), name: r.name }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    struct Fixture {
        store: SqliteStore,
        herbert: AuthorId,
        asimov: AuthorId,
        scifi: CategoryId,
    }

    async fn fixture() -> Fixture {
        let store = SqliteStore::new(connect_in_memory().await.unwrap());
        let herbert = store.create_author("Frank Herbert").await.unwrap().id;
        let asimov = store.create_author("Isaac Asimov").await.unwrap().id;
        let scifi = store.create_category("Sci-Fi").await.unwrap().id;
        Fixture { store, herbert, asimov, scifi }
    }

    fn draft(isbn: &str, title: &str, author: AuthorId, category: CategoryId) -> BookDraft {
        BookDraft::new(isbn, title, author, category).unwrap()
    }

    #[tokio::test]
    async fn create_then_read_back_with_relations() {
        let f = fixture().await;
        let created = f
            .store
            .create_book(&draft("111", "Dune", f.herbert, f.scifi))
            .await
            .unwrap();

        assert_eq!(created.author.name, "Frank Herbert");
        assert_eq!(created.category.name, "Sci-Fi");
        assert_eq!(f.store.get_book("111").await.unwrap(), created);
    }

    #[tokio::test]
    async fn dangling_references_are_reported_author_first() {
        let f = fixture().await;
        let missing_author = AuthorId::new(404);
        let missing_category = CategoryId::new(404);

        let err = f
            .store
            .create_book(&draft("1", "T", missing_author, missing_category))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidAuthor));

        let err = f
            .store
            .create_book(&draft("1", "T", f.herbert, missing_category))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCategory));
        assert_eq!(err.to_string(), "Invalid category ID.");
    }

    #[tokio::test]
    async fn filters_by_author_and_category() {
        let f = fixture().await;
        f.store.create_book(&draft("1", "Dune", f.herbert, f.scifi)).await.unwrap();
        f.store.create_book(&draft("2", "Foundation", f.asimov, f.scifi)).await.unwrap();

        let by_id = f.store.list_books(BookFilter::AuthorId(f.asimov)).await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].title, "Foundation");

        let by_name = f.store.list_books(BookFilter::AuthorName("Frank Herbert")).await.unwrap();
        assert_eq!(by_name[0].title, "Dune");

        assert_eq!(f.store.list_books(BookFilter::CategoryId(f.scifi)).await.unwrap().len(), 2);
        assert_eq!(f.store.list_books(BookFilter::CategoryName("Sci-Fi")).await.unwrap().len(), 2);
        assert!(f.store.list_books(BookFilter::CategoryName("Poetry")).await.unwrap().is_empty());
        assert_eq!(f.store.list_books(BookFilter::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_checks_existence_before_references() {
        let f = fixture().await;
        let err = f
            .store
            .update_book("nope", &draft("nope", "T", AuthorId::new(404), f.scifi))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::NotFound("book"))));
    }

    #[tokio::test]
    async fn update_can_change_the_isbn() {
        let f = fixture().await;
        f.store.create_book(&draft("1", "Dune", f.herbert, f.scifi)).await.unwrap();
        f.store
            .update_book("1", &draft("1-rev", "Dune (revised)", f.herbert, f.scifi))
            .await
            .unwrap();

        assert!(f.store.get_book("1").await.is_err());
        assert_eq!(f.store.get_book("1-rev").await.unwrap().title, "Dune (revised)");
    }

    #[tokio::test]
    async fn duplicate_isbn_is_a_conflict() {
        let f = fixture().await;
        f.store.create_book(&draft("1", "Dune", f.herbert, f.scifi)).await.unwrap();
        let err = f
            .store
            .create_book(&draft("1", "Dune again", f.herbert, f.scifi))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[tokio::test]
    async fn deletes_report_missing_rows() {
        let f = fixture().await;
        f.store.create_book(&draft("1", "Dune", f.herbert, f.scifi)).await.unwrap();

        f.store.delete_book("1").await.unwrap();
        assert!(matches!(
            f.store.delete_book("1").await,
            Err(CatalogError::Domain(DomainError::NotFound("book")))
        ));
        assert!(matches!(
            f.store.delete_category(CategoryId::new(404)).await,
            Err(CatalogError::Domain(DomainError::NotFound("category")))
        ));
        f.store.delete_author(f.asimov).await.unwrap();
        assert!(f.store.get_author(f.asimov).await.is_err());
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let f = fixture().await;
        f.store.create_book(&draft("1", "Dune", f.herbert, f.scifi)).await.unwrap();
        let err = f.store.delete_category(f.scifi).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let f = fixture().await;
        let err = f.store.create_category("  ").await.unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Validation(_))));
    }
}
