//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::BookSummary;
use super::user::UserSummary;

/// Loan model from database.
///
/// A loan's existence means one copy of the referenced book is checked out:
/// availability is decremented exactly once at creation and incremented
/// exactly once at deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub due_date: DateTime<Utc>,
    pub renewals: i16,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new loan; renewals always start at zero
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub user_id: i32,
    pub book_id: i32,
    pub due_date: DateTime<Utc>,
}

/// Loan joined with its book summary, for per-user listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanWithBook {
    pub id: i32,
    pub due_date: DateTime<Utc>,
    pub renewals: i16,
    pub created_at: DateTime<Utc>,
    pub book: BookSummary,
}

/// Loan joined with reduced user and book projections, for the global listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanWithParties {
    pub id: i32,
    pub due_date: DateTime<Utc>,
    pub renewals: i16,
    pub user: UserSummary,
    pub book: BookSummary,
}
