//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Audience age rating for a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[repr(i16)]
pub enum AgeRating {
    General = 0,
    Children = 1,
    YoungAdult = 2,
    Adult = 3,
}

impl Default for AgeRating {
    fn default() -> Self {
        AgeRating::General
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub subject: Option<String>,
    pub age_rating: AgeRating,
    pub total_quantity: i32,
    pub available_quantity: i32,
    /// Opaque path produced by the upload collaborator
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reduced book projection used in loan listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    pub publisher: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub age_rating: AgeRating,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    #[serde(default)]
    pub quantity: i32,
}

/// Partial book update request.
///
/// Field semantics are deliberately lax: a field that is missing *or* falsy
/// (empty string, zero quantity) keeps the stored value. Only truthy
/// submitted values overwrite.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub subject: Option<String>,
    pub age_rating: Option<AgeRating>,
    pub quantity: Option<i32>,
}

/// Resolved field values for a book update, after merging a partial
/// request over the stored row
#[derive(Debug, Clone, PartialEq)]
pub struct BookPatch {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub subject: Option<String>,
    pub age_rating: AgeRating,
    pub total_quantity: i32,
}

fn truthy(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl UpdateBook {
    /// Merge this partial update over the current record
    pub fn merge_over(&self, current: &Book) -> BookPatch {
        BookPatch {
            title: truthy(&self.title).unwrap_or(&current.title).to_string(),
            author: truthy(&self.author).unwrap_or(&current.author).to_string(),
            publisher: truthy(&self.publisher)
                .map(str::to_string)
                .or_else(|| current.publisher.clone()),
            subject: truthy(&self.subject)
                .map(str::to_string)
                .or_else(|| current.subject.clone()),
            age_rating: self.age_rating.unwrap_or(current.age_rating),
            // zero counts as "not provided", same as the string fields
            total_quantity: self
                .quantity
                .filter(|&q| q > 0)
                .unwrap_or(current.total_quantity),
        }
    }
}
