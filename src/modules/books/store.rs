//! Persistence gateway for books. Handlers depend on the `BookStore` trait
//! so tests can swap in an in-memory implementation.

use async_trait::async_trait;
use libris_db::DbError;
use sqlx::PgPool;

use super::models::{Book, BookInput};

#[async_trait]
pub trait BookStore: Send + Sync {
    /// All active records, in insertion (id) order.
    async fn find_all(&self) -> Result<Vec<Book>, DbError>;

    /// Insert a record; the database assigns id and timestamps.
    async fn create(&self, input: BookInput) -> Result<Book, DbError>;

    /// Fails with `DbError::NotFound` when no active record matches.
    async fn find_by_id(&self, id: i64) -> Result<Book, DbError>;

    /// Full overwrite of the business fields; bumps `updated_at`.
    async fn save(&self, id: i64, input: BookInput) -> Result<Book, DbError>;

    /// Soft-delete: marks the record inactive, keeps the row (and its id).
    async fn delete(&self, id: i64) -> Result<(), DbError>;
}

pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, DbError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, rating, created_at, updated_at
             FROM books
             WHERE deleted_at IS NULL
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn create(&self, input: BookInput) -> Result<Book, DbError> {
        let book = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, author, rating)
             VALUES ($1, $2, $3)
             RETURNING id, title, author, rating, created_at, updated_at",
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.rating)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, DbError> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, rating, created_at, updated_at
             FROM books
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound(id))
    }

    async fn save(&self, id: i64, input: BookInput) -> Result<Book, DbError> {
        sqlx::query_as::<_, Book>(
            "UPDATE books
             SET title = $1, author = $2, rating = $3, updated_at = now()
             WHERE id = $4 AND deleted_at IS NULL
             RETURNING id, title, author, rating, created_at, updated_at",
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.rating)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE books
             SET deleted_at = now(), updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(id));
        }

        Ok(())
    }
}
