use sqlx::SqlitePool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_permissions (
        user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        permission TEXT NOT NULL CHECK (permission IN ('Read', 'Add', 'Edit', 'Delete')),
        PRIMARY KEY (user_id, permission)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        isbn        TEXT NOT NULL UNIQUE,
        title       TEXT NOT NULL,
        author_id   INTEGER NOT NULL REFERENCES authors(id),
        category_id INTEGER NOT NULL REFERENCES categories(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS books_author_id ON books(author_id)",
    "CREATE INDEX IF NOT EXISTS books_category_id ON books(category_id)",
];

/// Create any missing tables. Safe to run on every start.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}
