use axum::{handler::Handler, routing::on, Router};

use crate::operations::{self, Operation};

pub mod authors;
pub mod books;
pub mod categories;
pub mod system;
pub mod user;

/// Router for every registered operation.
///
/// Routes are only added through [`route`], so each one has an entry in the
/// operation table the permission gate consults.
pub fn router() -> Router {
    let r = Router::new();
    let r = route(r, &operations::HEALTH, system::health);
    let r = route(r, &operations::USER_AUTH, user::authenticate);

    let r = route(r, &operations::BOOKS_LIST, books::list_books);
    let r = route(r, &operations::BOOKS_GET, books::get_book);
    let r = route(r, &operations::BOOKS_CREATE, books::create_book);
    let r = route(r, &operations::BOOKS_BY_AUTHOR_ID, books::books_by_author_id);
    let r = route(r, &operations::BOOKS_BY_AUTHOR_NAME, books::books_by_author_name);
    let r = route(r, &operations::BOOKS_BY_CATEGORY_ID, books::books_by_category_id);
    let r = route(r, &operations::BOOKS_BY_CATEGORY_NAME, books::books_by_category_name);
    let r = route(r, &operations::BOOKS_UPDATE, books::update_book);
    let r = route(r, &operations::BOOKS_DELETE, books::delete_book);

    let r = route(r, &operations::CATEGORIES_LIST, categories::list_categories);
    let r = route(r, &operations::CATEGORIES_CREATE, categories::create_category);
    let r = route(r, &operations::CATEGORIES_DELETE, categories::delete_category);

    let r = route(r, &operations::AUTHORS_LIST, authors::list_authors);
    let r = route(r, &operations::AUTHORS_GET, authors::get_author);
    let r = route(r, &operations::AUTHORS_CREATE, authors::create_author);
    route(r, &operations::AUTHORS_DELETE, authors::delete_author)
}

fn route<H, T>(router: Router, op: &'static Operation, handler: H) -> Router
where
    H: Handler<T, ()>,
    T: 'static,
{
    router.route(op.path, on(op.verb.filter(), handler))
}
