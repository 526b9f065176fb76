//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanWithBook, LoanWithParties},
};

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// User ID
    pub user_id: i32,
    /// Book ID
    pub book_id: i32,
}

/// Renewal response with the extended due date
#[derive(Serialize, ToSchema)]
pub struct RenewResponse {
    /// Loan ID
    pub id: i32,
    /// New due date (ISO 8601 format)
    pub due_date: DateTime<Utc>,
    /// Renewals used so far
    pub renewals: i16,
    /// Status message
    pub message: String,
}

/// Return acknowledgement
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
}

/// Borrow a book (create a loan)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "No available copies")
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .services
        .lending
        .borrow(request.user_id, request.book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Renew a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/renew",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan renewed", body = RenewResponse),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Renewal limit reached")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<RenewResponse>> {
    let loan = state.services.lending.renew(loan_id).await?;

    Ok(Json(RenewResponse {
        id: loan.id,
        due_date: loan.due_date,
        renewals: loan.renewals,
        message: format!("Loan renewed ({} renewals)", loan.renewals),
    }))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    state.services.lending.return_loan(loan_id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
    }))
}

/// Get loans for a specific user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loans with book summaries", body = Vec<LoanWithBook>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<LoanWithBook>>> {
    let loans = state.services.lending.loans_for_user(user_id).await?;
    Ok(Json(loans))
}

/// List every open loan with user and book summaries
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "All open loans", body = Vec<LoanWithParties>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<LoanWithParties>>> {
    let loans = state.services.lending.all_loans().await?;
    Ok(Json(loans))
}
