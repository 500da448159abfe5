//! Static registration table of every HTTP operation.
//!
//! Each operation carries at most one permission declaration. The router is
//! built from this table and the gate resolves the matched route against it,
//! so a route cannot exist without an entry here.

use std::collections::HashMap;

use axum::http::Method;
use axum::routing::MethodFilter;

use libcat_auth::Permission;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Delete => MethodFilter::DELETE,
        }
    }

    /// `HEAD` is served by `GET` routes and resolves to the same operation.
    pub fn from_method(method: &Method) -> Option<Self> {
        if method == Method::GET || method == Method::HEAD {
            Some(Verb::Get)
        } else if method == Method::POST {
            Some(Verb::Post)
        } else if method == Method::PUT {
            Some(Verb::Put)
        } else if method == Method::DELETE {
            Some(Verb::Delete)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct Operation {
    /// Stable name used in logs.
    pub id: &'static str,
    pub verb: Verb,
    /// Route path in axum syntax.
    pub path: &'static str,
    /// The single permission required, if any.
    pub permission: Option<Permission>,
    /// Reject anonymous callers with 401 even without a declaration.
    pub authenticated: bool,
}

impl Operation {
    const fn declared(id: &'static str, verb: Verb, path: &'static str, permission: Permission) -> Self {
        Self { id, verb, path, permission: Some(permission), authenticated: false }
    }

    const fn authenticated(id: &'static str, verb: Verb, path: &'static str) -> Self {
        Self { id, verb, path, permission: None, authenticated: true }
    }

    const fn public(id: &'static str, verb: Verb, path: &'static str) -> Self {
        Self { id, verb, path, permission: None, authenticated: false }
    }
}

pub static HEALTH: Operation = Operation::public("system.health", Verb::Get, "/health");
pub static USER_AUTH: Operation = Operation::public("user.auth", Verb::Post, "/api/user/auth");

pub static BOOKS_LIST: Operation =
    Operation::declared("books.list", Verb::Get, "/api/books", Permission::Read);
pub static BOOKS_GET: Operation =
    Operation::declared("books.get", Verb::Get, "/api/books/:isbn", Permission::Read);
pub static BOOKS_CREATE: Operation =
    Operation::declared("books.create", Verb::Post, "/api/books", Permission::Add);
pub static BOOKS_BY_AUTHOR_ID: Operation = Operation::declared(
    "books.by_author_id",
    Verb::Get,
    "/api/books/author/id/:author_id",
    Permission::Read,
);
pub static BOOKS_BY_AUTHOR_NAME: Operation = Operation::declared(
    "books.by_author_name",
    Verb::Get,
    "/api/books/author/name/:author_name",
    Permission::Read,
);
pub static BOOKS_BY_CATEGORY_ID: Operation = Operation::declared(
    "books.by_category_id",
    Verb::Get,
    "/api/books/category/id/:category_id",
    Permission::Read,
);
pub static BOOKS_BY_CATEGORY_NAME: Operation = Operation::declared(
    "books.by_category_name",
    Verb::Get,
    "/api/books/category/name/:category_name",
    Permission::Read,
);
pub static BOOKS_UPDATE: Operation =
    Operation::declared("books.update", Verb::Put, "/api/books/:isbn", Permission::Edit);
pub static BOOKS_DELETE: Operation =
    Operation::declared("books.delete", Verb::Delete, "/api/books/:isbn", Permission::Delete);

pub static CATEGORIES_LIST: Operation =
    Operation::authenticated("categories.list", Verb::Get, "/api/categories");
pub static CATEGORIES_CREATE: Operation =
    Operation::declared("categories.create", Verb::Post, "/api/categories", Permission::Add);
pub static CATEGORIES_DELETE: Operation =
    Operation::declared("categories.delete", Verb::Delete, "/api/categories/:id", Permission::Delete);

pub static AUTHORS_LIST: Operation =
    Operation::declared("authors.list", Verb::Get, "/api/authors", Permission::Read);
pub static AUTHORS_GET: Operation =
    Operation::declared("authors.get", Verb::Get, "/api/authors/:id", Permission::Read);
pub static AUTHORS_CREATE: Operation =
    Operation::declared("authors.create", Verb::Post, "/api/authors", Permission::Add);
pub static AUTHORS_DELETE: Operation =
    Operation::declared("authors.delete", Verb::Delete, "/api/authors/:id", Permission::Delete);

pub static OPERATIONS: [&Operation; 18] = [
    &HEALTH,
    &USER_AUTH,
    &BOOKS_LIST,
    &BOOKS_GET,
    &BOOKS_CREATE,
    &BOOKS_BY_AUTHOR_ID,
    &BOOKS_BY_AUTHOR_NAME,
    &BOOKS_BY_CATEGORY_ID,
    &BOOKS_BY_CATEGORY_NAME,
    &BOOKS_UPDATE,
    &BOOKS_DELETE,
    &CATEGORIES_LIST,
    &CATEGORIES_CREATE,
    &CATEGORIES_DELETE,
    &AUTHORS_LIST,
    &AUTHORS_GET,
    &AUTHORS_CREATE,
    &AUTHORS_DELETE,
];

/// Lookup from (verb, matched route path) to its operation.
#[derive(Debug)]
pub struct OperationTable {
    by_route: HashMap<(Verb, &'static str), &'static Operation>,
}

impl OperationTable {
    pub fn new(operations: &[&'static Operation]) -> Self {
        let by_route = operations
            .iter()
            .map(|op| ((op.verb, op.path), *op))
            .collect();
        Self { by_route }
    }

    pub fn resolve(&self, method: &Method, matched_path: &str) -> Option<&'static Operation> {
        let verb = Verb::from_method(method)?;
        self.by_route.get(&(verb, matched_path)).copied()
    }

    /// Whether any operation is registered under `matched_path`.
    pub fn has_path(&self, matched_path: &str) -> bool {
        self.by_route.keys().any(|(_, path)| *path == matched_path)
    }
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::new(&OPERATIONS)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_and_routes_are_unique() {
        let ids: HashSet<_> = OPERATIONS.iter().map(|op| op.id).collect();
        let routes: HashSet<_> = OPERATIONS.iter().map(|op| (op.verb, op.path)).collect();
        assert_eq!(ids.len(), OPERATIONS.len());
        assert_eq!(routes.len(), OPERATIONS.len());
    }

    #[test]
    fn resolves_matched_routes() {
        let table = OperationTable::default();

        let op = table.resolve(&Method::DELETE, "/api/books/:isbn").unwrap();
        assert_eq!(op.id, "books.delete");
        assert_eq!(op.permission, Some(Permission::Delete));

        let op = table.resolve(&Method::HEAD, "/api/books").unwrap();
        assert_eq!(op.id, "books.list");

        assert!(table.resolve(&Method::PATCH, "/api/books/:isbn").is_none());
        assert!(table.has_path("/api/books/:isbn"));
        assert!(table.resolve(&Method::GET, "/api/unknown").is_none());
        assert!(!table.has_path("/api/unknown"));
    }

    #[test]
    fn only_login_health_and_category_listing_are_undeclared() {
        let undeclared: HashSet<_> = OPERATIONS
            .iter()
            .filter(|op| op.permission.is_none())
            .map(|op| op.id)
            .collect();
        assert_eq!(
            undeclared,
            HashSet::from(["system.health", "user.auth", "categories.list"])
        );
    }
}
