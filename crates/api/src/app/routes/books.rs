use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use libcat_core::{AuthorId, CategoryId};
use libcat_infra::db::BookFilter;

use crate::app::{dto, errors, AppServices};

pub async fn list_books(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    list_filtered(&services, BookFilter::All).await
}

pub async fn get_book(
    Extension(services): Extension<Arc<AppServices>>,
    Path(isbn): Path<String>,
) -> axum::response::Response {
    match services.store.get_book(&isbn).await {
        Ok(book) => Json(book).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn books_by_author_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path(author_id): Path<String>,
) -> axum::response::Response {
    let author_id = match errors::parse_id::<AuthorId>(&author_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    list_filtered(&services, BookFilter::AuthorId(author_id)).await
}

pub async fn books_by_author_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(author_name): Path<String>,
) -> axum::response::Response {
    list_filtered(&services, BookFilter::AuthorName(&author_name)).await
}

pub async fn books_by_category_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category_id): Path<String>,
) -> axum::response::Response {
    let category_id = match errors::parse_id::<CategoryId>(&category_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    list_filtered(&services, BookFilter::CategoryId(category_id)).await
}

pub async fn books_by_category_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category_name): Path<String>,
) -> axum::response::Response {
    list_filtered(&services, BookFilter::CategoryName(&category_name)).await
}

/// 201 with a `Location` header and the stored book.
pub async fn create_book(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BookRequest>,
) -> axum::response::Response {
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.create_book(&draft).await {
        Ok(book) => {
            let location = format!("/api/books/{}", book.isbn);
            (StatusCode::CREATED, [(header::LOCATION, location)], Json(book)).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_book(
    Extension(services): Extension<Arc<AppServices>>,
    Path(isbn): Path<String>,
    Json(body): Json<dto::BookRequest>,
) -> axum::response::Response {
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.update_book(&isbn, &draft).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_book(
    Extension(services): Extension<Arc<AppServices>>,
    Path(isbn): Path<String>,
) -> axum::response::Response {
    match services.store.delete_book(&isbn).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

async fn list_filtered(services: &AppServices, filter: BookFilter<'_>) -> axum::response::Response {
    match services.store.list_books(filter).await {
        Ok(books) => Json(books).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
