use thiserror::Error;

use supplyflow_auth::AuthzError;
use supplyflow_cart::CartError;
use supplyflow_core::DomainError;
use supplyflow_inventory::StockError;
use supplyflow_orders::OrderError;

use crate::order_store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unit, order or cart line absent.
    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl ServiceError {
    /// Infrastructure failures outside the business contract.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ServiceError::Store(StoreError::Unavailable(_))
                | ServiceError::Stock(StockError::Unavailable(_))
                | ServiceError::Cart(CartError::Stock(StockError::Unavailable(_)))
        )
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Conflict(msg) => ServiceError::Store(StoreError::Concurrency(msg)),
            other => ServiceError::Validation(other.detail().to_string()),
        }
    }
}
