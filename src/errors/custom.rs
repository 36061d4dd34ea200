use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Database Error: {0}")]
    DatabaseError(#[from] DbError),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Insufficient Stock: {0}")]
    InsufficientStock(String),
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection Error: {0}")]
    ConnectionError(String),

    #[error("Query Error: {0}")]
    QueryError(String),

    #[error("Insertion Error: {0}")]
    InsertionError(String),

    #[error("Updation Error: {0}")]
    UpdationError(String),

    #[error("Other Database Error: {0}")]
    Other(String),
}

// Required by diesel-async's transaction combinator, any driver failure
// inside the transaction rolls back and surfaces as a 500.
impl From<diesel::result::Error> for CustomError {
    fn from(err: diesel::result::Error) -> Self {
        CustomError::DatabaseError(DbError::QueryError(err.to_string()))
    }
}

impl ResponseError for CustomError {
    fn error_response(&self) -> HttpResponse {
        match self {
            CustomError::ValidationError(msg) => {
                HttpResponse::BadRequest().json(json!({ "message": msg }))
            }
            CustomError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "message": msg })),
            CustomError::InsufficientStock(msg) => {
                HttpResponse::BadRequest().json(json!({ "message": msg }))
            }
            CustomError::DatabaseError(err) => {
                // Internal detail goes to the logs, never to the client
                tracing::error!("database failure: {}", err);
                HttpResponse::InternalServerError().json(json!({ "message": "Server error" }))
            }
        }
    }
}
