use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use libcat_core::{validate_name, CategoryId};

use crate::app::{dto, errors, AppServices};

/// Open to any authenticated caller; no permission is required.
pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.list_categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::NameRequest>,
) -> axum::response::Response {
    let name = match validate_name("category", &body.name) {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.create_category(&name).await {
        Ok(category) => {
            let location = format!("/api/categories/{}", category.id);
            (StatusCode::CREATED, [(header::LOCATION, location)], Json(category)).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<CategoryId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.delete_category(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
