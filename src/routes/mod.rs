pub mod health_check;
pub mod order;
pub mod products;

use serde::Serialize;

/// Every successful JSON response is wrapped in this envelope.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}
