//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPatch, CreateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    /// List all books in catalog order
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Create a new book; availability starts equal to the total quantity
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, publisher, subject, age_rating,
                               total_quantity, available_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.subject)
        .bind(book.age_rating)
        .bind(book.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Apply a merged update. A change in total quantity shifts availability
    /// by the same delta; the CHECK constraint rejects a shift that would
    /// drive availability negative while copies are still on loan.
    pub async fn update(&self, id: i32, patch: &BookPatch) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, publisher = $3, subject = $4,
                age_rating = $5,
                available_quantity = available_quantity + ($6 - total_quantity),
                total_quantity = $6,
                updated_at = now()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.author)
        .bind(&patch.publisher)
        .bind(&patch.subject)
        .bind(patch.age_rating)
        .bind(patch.total_quantity)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(updated)
    }

    /// Attach an uploaded cover image path
    pub async fn set_cover(&self, id: i32, filename: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "UPDATE books SET cover_image = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(filename)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Atomically claim one available copy. The quantity guard in the WHERE
    /// clause is the concurrency contract: two borrows racing for the last
    /// copy cannot both match the row.
    pub async fn checkout(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = available_quantity - 1, updated_at = now()
            WHERE id = $1 AND available_quantity > 0
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Hand one copy back after a return
    pub async fn restock(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = available_quantity + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
