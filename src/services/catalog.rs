//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.create(&book).await
    }

    /// Partially update a book. Missing or falsy fields keep the stored
    /// value; see [`UpdateBook::merge_over`].
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        let current = self.repository.books.get_by_id(id).await?;
        let patch = update.merge_over(&current);
        self.repository.books.update(id, &patch).await
    }

    /// Attach an uploaded cover image path to a book
    pub async fn set_cover(&self, id: i32, filename: &str) -> AppResult<Book> {
        self.repository.books.set_cover(id, filename).await
    }
}
