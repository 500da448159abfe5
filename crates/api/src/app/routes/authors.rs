use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use libcat_core::{validate_name, AuthorId};

use crate::app::{dto, errors, AppServices};

pub async fn list_authors(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.list_authors().await {
        Ok(authors) => Json(authors).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_author(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<AuthorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.get_author(id).await {
        Ok(author) => Json(author).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_author(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::NameRequest>,
) -> axum::response::Response {
    let name = match validate_name("author", &body.name) {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.create_author(&name).await {
        Ok(author) => {
            let location = format!("/api/authors/{}", author.id);
            (StatusCode::CREATED, [(header::LOCATION, location)], Json(author)).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_author(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<AuthorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.delete_author(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
