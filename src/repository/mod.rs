//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, Loan, LoanWithBook, LoanWithParties, NewLoan, User},
};

/// Persistent store consumed by the lending engine.
///
/// `checkout_book` and `restock_book` are conditional updates: the store
/// must apply them atomically with respect to concurrent calls touching the
/// same book, so that a single remaining copy is never handed out twice.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LendingStore: Send + Sync {
    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>>;
    async fn book_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    /// Claim one copy: decrement availability only if a copy remains.
    /// Returns false when the book has no available copies.
    async fn checkout_book(&self, book_id: i32) -> AppResult<bool>;

    /// Hand one copy back. Returns false when the book no longer exists.
    async fn restock_book(&self, book_id: i32) -> AppResult<bool>;

    async fn insert_loan(&self, loan: NewLoan) -> AppResult<Loan>;
    async fn loan_by_id(&self, id: i32) -> AppResult<Option<Loan>>;
    async fn update_loan_renewal(
        &self,
        id: i32,
        due_date: DateTime<Utc>,
        renewals: i16,
    ) -> AppResult<()>;

    /// Remove a loan record. Returns false when the loan was already gone.
    async fn delete_loan(&self, id: i32) -> AppResult<bool>;

    async fn loans_for_user(&self, user_id: i32) -> AppResult<Vec<LoanWithBook>>;
    async fn all_loans(&self) -> AppResult<Vec<LoanWithParties>>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl LendingStore for Repository {
    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn book_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.find_by_id(id).await
    }

    async fn checkout_book(&self, book_id: i32) -> AppResult<bool> {
        self.books.checkout(book_id).await
    }

    async fn restock_book(&self, book_id: i32) -> AppResult<bool> {
        self.books.restock(book_id).await
    }

    async fn insert_loan(&self, loan: NewLoan) -> AppResult<Loan> {
        self.loans.insert(&loan).await
    }

    async fn loan_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        self.loans.find_by_id(id).await
    }

    async fn update_loan_renewal(
        &self,
        id: i32,
        due_date: DateTime<Utc>,
        renewals: i16,
    ) -> AppResult<()> {
        self.loans.set_renewal(id, due_date, renewals).await
    }

    async fn delete_loan(&self, id: i32) -> AppResult<bool> {
        self.loans.delete(id).await
    }

    async fn loans_for_user(&self, user_id: i32) -> AppResult<Vec<LoanWithBook>> {
        self.loans.for_user(user_id).await
    }

    async fn all_loans(&self) -> AppResult<Vec<LoanWithParties>> {
        self.loans.all_with_parties().await
    }
}
