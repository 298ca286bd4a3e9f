use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(format!("duplicate value: {}", msg)),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ServiceError::Conflict(format!("record is referenced elsewhere: {}", msg)),
            _ => ServiceError::Db(e.to_string()),
        }
    }
}

impl From<common::money::MoneyError> for ServiceError {
    fn from(e: common::money::MoneyError) -> Self { ServiceError::Validation(format!("price: {}", e)) }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
