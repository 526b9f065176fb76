//! OpenAPI documentation

use axum::Json;
use utoipa::OpenApi;

use crate::api::{auth, books, health, loans, users};
use crate::error::ErrorResponse;
use crate::models::{
    book::{AgeRating, Book, BookSummary, CreateBook, UpdateBook},
    loan::{Loan, LoanWithBook, LoanWithParties},
    user::{CreateUser, LoginRequest, UpdateUser, User, UserSummary},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "0.1.0",
        description = "Library loans management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::upload_cover,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        // Loans
        loans::borrow,
        loans::renew_loan,
        loans::return_loan,
        loans::get_user_loans,
        loans::list_loans,
    ),
    components(
        schemas(
            health::HealthResponse,
            ErrorResponse,
            AgeRating,
            Book,
            BookSummary,
            CreateBook,
            UpdateBook,
            User,
            UserSummary,
            CreateUser,
            UpdateUser,
            LoginRequest,
            Loan,
            LoanWithBook,
            LoanWithParties,
            loans::BorrowRequest,
            loans::RenewResponse,
            loans::ReturnResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Login"),
        (name = "books", description = "Book catalog"),
        (name = "users", description = "Library users"),
        (name = "loans", description = "Loan lifecycle")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
