//! Lending engine tests against an in-memory store.
//!
//! The store implements the same conditional-update contract the Postgres
//! repository provides, so the engine's lifecycle rules and the inventory
//! pairing invariant can be exercised without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use biblioteca_server::config::LoansConfig;
use biblioteca_server::error::{AppError, AppResult};
use biblioteca_server::models::{
    AgeRating, Book, BookSummary, Loan, LoanWithBook, LoanWithParties, NewLoan, User, UserSummary,
};
use biblioteca_server::repository::LendingStore;
use biblioteca_server::services::lending::LendingService;

#[derive(Default)]
struct Inner {
    users: HashMap<i32, User>,
    books: HashMap<i32, Book>,
    loans: HashMap<i32, Loan>,
    next_loan_id: i32,
}

#[derive(Default)]
struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn seed_user(&self, id: i32, name: &str, email: &str) {
        let now = Utc::now();
        self.inner.lock().unwrap().users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password: "pw".to_string(),
                created_at: now,
                updated_at: now,
            },
        );
    }

    fn seed_book(&self, id: i32, title: &str, quantity: i32) {
        let now = Utc::now();
        self.inner.lock().unwrap().books.insert(
            id,
            Book {
                id,
                title: title.to_string(),
                author: "Author".to_string(),
                publisher: None,
                subject: None,
                age_rating: AgeRating::General,
                total_quantity: quantity,
                available_quantity: quantity,
                cover_image: None,
                created_at: now,
                updated_at: now,
            },
        );
    }

    fn remove_book(&self, id: i32) {
        self.inner.lock().unwrap().books.remove(&id);
    }

    fn available(&self, book_id: i32) -> i32 {
        self.inner.lock().unwrap().books[&book_id].available_quantity
    }

    fn open_loans(&self) -> usize {
        self.inner.lock().unwrap().loans.len()
    }

    /// available + open loans == total, for every book
    fn assert_inventory_consistent(&self) {
        let inner = self.inner.lock().unwrap();
        for book in inner.books.values() {
            let open = inner
                .loans
                .values()
                .filter(|l| l.book_id == book.id)
                .count() as i32;
            assert_eq!(
                book.available_quantity + open,
                book.total_quantity,
                "inventory drift on book {}",
                book.id
            );
            assert!(book.available_quantity >= 0);
        }
    }
}

#[async_trait]
impl LendingStore for MemoryStore {
    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn book_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.inner.lock().unwrap().books.get(&id).cloned())
    }

    async fn checkout_book(&self, book_id: i32) -> AppResult<bool> {
        // decrement guarded by the quantity check, atomic under the lock
        let mut inner = self.inner.lock().unwrap();
        match inner.books.get_mut(&book_id) {
            Some(book) if book.available_quantity > 0 => {
                book.available_quantity -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restock_book(&self, book_id: i32) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.books.get_mut(&book_id) {
            Some(book) => {
                book.available_quantity += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_loan(&self, loan: NewLoan) -> AppResult<Loan> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_loan_id += 1;
        let created = Loan {
            id: inner.next_loan_id,
            user_id: loan.user_id,
            book_id: loan.book_id,
            due_date: loan.due_date,
            renewals: 0,
            created_at: Utc::now(),
        };
        inner.loans.insert(created.id, created.clone());
        Ok(created)
    }

    async fn loan_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        Ok(self.inner.lock().unwrap().loans.get(&id).cloned())
    }

    async fn update_loan_renewal(
        &self,
        id: i32,
        due_date: DateTime<Utc>,
        renewals: i16,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let loan = inner
            .loans
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;
        loan.due_date = due_date;
        loan.renewals = renewals;
        Ok(())
    }

    async fn delete_loan(&self, id: i32) -> AppResult<bool> {
        Ok(self.inner.lock().unwrap().loans.remove(&id).is_some())
    }

    async fn loans_for_user(&self, user_id: i32) -> AppResult<Vec<LoanWithBook>> {
        let inner = self.inner.lock().unwrap();
        let mut loans: Vec<_> = inner
            .loans
            .values()
            .filter(|l| l.user_id == user_id)
            .map(|l| {
                let book = &inner.books[&l.book_id];
                LoanWithBook {
                    id: l.id,
                    due_date: l.due_date,
                    renewals: l.renewals,
                    created_at: l.created_at,
                    book: BookSummary {
                        id: book.id,
                        title: book.title.clone(),
                        author: book.author.clone(),
                    },
                }
            })
            .collect();
        loans.sort_by_key(|l| l.id);
        Ok(loans)
    }

    async fn all_loans(&self) -> AppResult<Vec<LoanWithParties>> {
        let inner = self.inner.lock().unwrap();
        let mut loans: Vec<_> = inner
            .loans
            .values()
            .map(|l| {
                let user = &inner.users[&l.user_id];
                let book = &inner.books[&l.book_id];
                LoanWithParties {
                    id: l.id,
                    due_date: l.due_date,
                    renewals: l.renewals,
                    user: UserSummary {
                        id: user.id,
                        name: user.name.clone(),
                        email: user.email.clone(),
                    },
                    book: BookSummary {
                        id: book.id,
                        title: book.title.clone(),
                        author: book.author.clone(),
                    },
                }
            })
            .collect();
        loans.sort_by_key(|l| l.id);
        Ok(loans)
    }
}

fn engine(store: Arc<MemoryStore>) -> LendingService {
    LendingService::new(
        store,
        LoansConfig {
            duration_days: 7,
            max_renewals: 2,
        },
        None,
    )
}

#[tokio::test]
async fn full_loan_lifecycle() {
    let store = Arc::new(MemoryStore::default());
    store.seed_user(1, "Ana", "ana@example.org");
    store.seed_book(2, "Dom Casmurro", 1);
    let lending = engine(store.clone());

    // borrow: one copy claimed, due in 7 days, no renewals yet
    let before = Utc::now();
    let loan = lending.borrow(1, 2).await.unwrap();
    assert_eq!(loan.renewals, 0);
    assert!(loan.due_date >= before + Duration::days(7));
    assert!(loan.due_date <= Utc::now() + Duration::days(7));
    assert_eq!(store.available(2), 0);
    store.assert_inventory_consistent();

    // renewals compound on the previous due date
    let first_due = loan.due_date;
    let renewed = lending.renew(loan.id).await.unwrap();
    assert_eq!(renewed.renewals, 1);
    assert_eq!(renewed.due_date, first_due + Duration::days(7));

    let renewed = lending.renew(loan.id).await.unwrap();
    assert_eq!(renewed.renewals, 2);
    assert_eq!(renewed.due_date, first_due + Duration::days(14));

    // third renewal hits the cap and the counter stays at 2
    let err = lending.renew(loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::RenewalLimitReached(2)));
    let stored = store.loan_by_id(loan.id).await.unwrap().unwrap();
    assert_eq!(stored.renewals, 2);
    store.assert_inventory_consistent();

    // return: copy restocked, record gone
    lending.return_loan(loan.id).await.unwrap();
    assert_eq!(store.available(2), 1);
    assert_eq!(store.open_loans(), 0);
    store.assert_inventory_consistent();

    // returning again is NotFound, no second increment
    let err = lending.return_loan(loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(store.available(2), 1);
}

#[tokio::test]
async fn borrow_with_zero_stock_leaves_state_unchanged() {
    let store = Arc::new(MemoryStore::default());
    store.seed_user(1, "Ana", "ana@example.org");
    store.seed_book(2, "Dom Casmurro", 0);
    let lending = engine(store.clone());

    let err = lending.borrow(1, 2).await.unwrap_err();
    assert!(matches!(err, AppError::Unavailable(_)));
    assert_eq!(store.available(2), 0);
    assert_eq!(store.open_loans(), 0);
    store.assert_inventory_consistent();
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_borrows_of_last_copy_admit_exactly_one() {
    for round in 0..25 {
        let store = Arc::new(MemoryStore::default());
        store.seed_user(1, "Ana", "ana@example.org");
        store.seed_user(2, "Bruno", "bruno@example.org");
        store.seed_book(3, "Dom Casmurro", 1);
        let lending = Arc::new(engine(store.clone()));

        let a = {
            let lending = lending.clone();
            tokio::spawn(async move { lending.borrow(1, 3).await })
        };
        let b = {
            let lending = lending.clone();
            tokio::spawn(async move { lending.borrow(2, 3).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let unavailable = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::Unavailable(_))))
            .count();

        assert_eq!(successes, 1, "round {}: exactly one borrow must win", round);
        assert_eq!(unavailable, 1, "round {}: the loser must see Unavailable", round);
        assert_eq!(store.available(3), 0);
        assert_eq!(store.open_loans(), 1);
        store.assert_inventory_consistent();
    }
}

#[tokio::test]
async fn return_with_dangling_book_reports_integrity_fault() {
    let store = Arc::new(MemoryStore::default());
    store.seed_user(1, "Ana", "ana@example.org");
    store.seed_book(2, "Dom Casmurro", 1);
    let lending = engine(store.clone());

    let loan = lending.borrow(1, 2).await.unwrap();
    store.remove_book(2);

    let err = lending.return_loan(loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::IntegrityFault(_)));

    // the loan is left intact so nothing is silently dropped
    assert!(store.loan_by_id(loan.id).await.unwrap().is_some());
}

#[tokio::test]
async fn loans_for_user_joins_book_summaries() {
    let store = Arc::new(MemoryStore::default());
    store.seed_user(1, "Ana", "ana@example.org");
    store.seed_user(2, "Bruno", "bruno@example.org");
    store.seed_book(10, "Dom Casmurro", 2);
    store.seed_book(11, "Grande Sertao", 1);
    let lending = engine(store.clone());

    lending.borrow(1, 10).await.unwrap();
    lending.borrow(1, 11).await.unwrap();
    lending.borrow(2, 10).await.unwrap();

    let loans = lending.loans_for_user(1).await.unwrap();
    assert_eq!(loans.len(), 2);
    let titles: Vec<_> = loans.iter().map(|l| l.book.title.as_str()).collect();
    assert!(titles.contains(&"Dom Casmurro"));
    assert!(titles.contains(&"Grande Sertao"));

    let err = lending.loans_for_user(99).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn all_loans_carries_user_and_book_projections() {
    let store = Arc::new(MemoryStore::default());
    store.seed_user(1, "Ana", "ana@example.org");
    store.seed_book(10, "Dom Casmurro", 1);
    let lending = engine(store.clone());

    lending.borrow(1, 10).await.unwrap();

    let loans = lending.all_loans().await.unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].user.name, "Ana");
    assert_eq!(loans[0].user.email, "ana@example.org");
    assert_eq!(loans[0].book.title, "Dom Casmurro");
    assert_eq!(loans[0].book.author, "Author");
}

#[tokio::test]
async fn repeated_borrow_and_return_keep_counts_paired() {
    let store = Arc::new(MemoryStore::default());
    store.seed_user(1, "Ana", "ana@example.org");
    store.seed_book(2, "Dom Casmurro", 3);
    let lending = engine(store.clone());

    let mut open = Vec::new();
    for _ in 0..3 {
        open.push(lending.borrow(1, 2).await.unwrap());
        store.assert_inventory_consistent();
    }

    // stock exhausted
    let err = lending.borrow(1, 2).await.unwrap_err();
    assert!(matches!(err, AppError::Unavailable(_)));

    for loan in open {
        lending.return_loan(loan.id).await.unwrap();
        store.assert_inventory_consistent();
    }
    assert_eq!(store.available(2), 3);
}
