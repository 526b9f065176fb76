//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{
        book::BookSummary,
        loan::{Loan, LoanWithBook, LoanWithParties, NewLoan},
        user::UserSummary,
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    /// Insert a new loan with zero renewals
    pub async fn insert(&self, loan: &NewLoan) -> AppResult<Loan> {
        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, due_date, renewals)
            VALUES ($1, $2, $3, 0)
            RETURNING *
            "#,
        )
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Record a renewal: new due date and bumped counter
    pub async fn set_renewal(
        &self,
        id: i32,
        due_date: DateTime<Utc>,
        renewals: i16,
    ) -> AppResult<()> {
        sqlx::query("UPDATE loans SET due_date = $1, renewals = $2 WHERE id = $3")
            .bind(due_date)
            .bind(renewals)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a loan record; false when the row was already gone
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Loans for one user, each joined with its book summary
    pub async fn for_user(&self, user_id: i32) -> AppResult<Vec<LoanWithBook>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.due_date, l.renewals, l.created_at,
                   b.id as book_id, b.title, b.author
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1
            ORDER BY l.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let loans = rows
            .into_iter()
            .map(|row| LoanWithBook {
                id: row.get("id"),
                due_date: row.get("due_date"),
                renewals: row.get("renewals"),
                created_at: row.get("created_at"),
                book: BookSummary {
                    id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                },
            })
            .collect();

        Ok(loans)
    }

    /// Every open loan joined with reduced user and book projections
    pub async fn all_with_parties(&self) -> AppResult<Vec<LoanWithParties>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.due_date, l.renewals,
                   u.id as user_id, u.name, u.email,
                   b.id as book_id, b.title, b.author
            FROM loans l
            JOIN users u ON l.user_id = u.id
            JOIN books b ON l.book_id = b.id
            ORDER BY l.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let loans = rows
            .into_iter()
            .map(|row| LoanWithParties {
                id: row.get("id"),
                due_date: row.get("due_date"),
                renewals: row.get("renewals"),
                user: UserSummary {
                    id: row.get("user_id"),
                    name: row.get("name"),
                    email: row.get("email"),
                },
                book: BookSummary {
                    id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                },
            })
            .collect();

        Ok(loans)
    }
}
