//! Loan lifecycle engine.
//!
//! Owns the three state transitions of a loan (borrow, renew, return) and
//! the read-only loan projections. Every transition is all-or-nothing: on
//! any error path the store is left untouched, and every availability
//! decrement is paired with exactly one later increment.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{Loan, LoanWithBook, LoanWithParties, NewLoan},
        user::User,
    },
    repository::LendingStore,
    services::email::LoanNotifier,
};

#[derive(Clone)]
pub struct LendingService {
    store: Arc<dyn LendingStore>,
    policy: LoansConfig,
    notifier: Option<Arc<dyn LoanNotifier>>,
}

impl LendingService {
    pub fn new(
        store: Arc<dyn LendingStore>,
        policy: LoansConfig,
        notifier: Option<Arc<dyn LoanNotifier>>,
    ) -> Self {
        Self {
            store,
            policy,
            notifier,
        }
    }

    /// Borrow a book: claim one copy and open a loan.
    ///
    /// The copy is claimed through the store's conditional decrement, so two
    /// borrows racing for the last copy cannot both succeed. If the loan
    /// insert fails after the claim, the copy is handed back before the
    /// error surfaces.
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<Loan> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;
        let book = self
            .store
            .book_by_id(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if !self.store.checkout_book(book_id).await? {
            return Err(AppError::Unavailable(format!(
                "No available copies of \"{}\"",
                book.title
            )));
        }

        let due_date = Utc::now() + Duration::days(self.policy.duration_days);
        let loan = match self
            .store
            .insert_loan(NewLoan {
                user_id,
                book_id,
                due_date,
            })
            .await
        {
            Ok(loan) => loan,
            Err(e) => {
                if let Err(restock_err) = self.store.restock_book(book_id).await {
                    tracing::error!(
                        "Failed to restock book {} after loan insert error: {}",
                        book_id,
                        restock_err
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            "User {} borrowed book {} (loan {}, due {})",
            user_id,
            book_id,
            loan.id,
            loan.due_date
        );
        self.notify_borrowed(&user, &book);

        Ok(loan)
    }

    /// Renew a loan: bump the counter and push the due date out by one loan
    /// period from its current value. No inventory side effect.
    pub async fn renew(&self, loan_id: i32) -> AppResult<Loan> {
        let loan = self
            .store
            .loan_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.renewals >= self.policy.max_renewals {
            return Err(AppError::RenewalLimitReached(loan.renewals));
        }

        // extensions compound on the existing due date, not on "now"
        let due_date = loan.due_date + Duration::days(self.policy.duration_days);
        let renewals = loan.renewals + 1;
        self.store
            .update_loan_renewal(loan_id, due_date, renewals)
            .await?;

        Ok(Loan {
            due_date,
            renewals,
            ..loan
        })
    }

    /// Return a loan: remove the record and hand the copy back.
    ///
    /// Deleting the row is the claim; only the caller that actually removed
    /// it performs the restock, so a raced second return observes `NotFound`
    /// and the book is never incremented twice for one loan.
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<()> {
        let loan = self
            .store
            .loan_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if self.store.book_by_id(loan.book_id).await?.is_none() {
            // restock target is unknown; leave the loan intact
            return Err(AppError::IntegrityFault(format!(
                "Loan {} references book {} which no longer exists",
                loan_id, loan.book_id
            )));
        }

        if !self.store.delete_loan(loan_id).await? {
            return Err(AppError::NotFound(format!(
                "Loan with id {} not found",
                loan_id
            )));
        }

        if !self.store.restock_book(loan.book_id).await? {
            return Err(AppError::IntegrityFault(format!(
                "Book {} disappeared before loan {} could be restocked",
                loan.book_id, loan_id
            )));
        }

        tracing::info!("Loan {} returned (book {})", loan_id, loan.book_id);
        Ok(())
    }

    /// Loans for one user, joined with book summaries
    pub async fn loans_for_user(&self, user_id: i32) -> AppResult<Vec<LoanWithBook>> {
        self.store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;
        self.store.loans_for_user(user_id).await
    }

    /// Every open loan with reduced user and book projections
    pub async fn all_loans(&self) -> AppResult<Vec<LoanWithParties>> {
        self.store.all_loans().await
    }

    /// Dispatch the loan notification as an independent task. Delivery
    /// failure is logged and never affects the loan itself.
    fn notify_borrowed(&self, user: &User, book: &Book) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let recipient = user.email.clone();
        let title = book.title.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.loan_created(&recipient, &title).await {
                tracing::warn!("Loan notification to {} failed: {}", recipient, e);
            }
        });
    }
}
