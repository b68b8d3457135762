use crate::error::AppError;

pub mod drinks;
pub mod health;

pub async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_string())
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
