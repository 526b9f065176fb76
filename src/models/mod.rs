//! Data models for Biblioteca

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{AgeRating, Book, BookSummary, CreateBook, UpdateBook};
pub use loan::{Loan, LoanWithBook, LoanWithParties, NewLoan};
pub use user::{CreateUser, UpdateUser, User, UserSummary};
