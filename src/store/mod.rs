// src/store/mod.rs

//! Data access for the results collection and the documents it references.

mod populate;
mod result;

pub use result::ResultStore;

use thiserror::Error;

/// Errors surfaced by store operations. Nothing below this boundary panics or leaks
/// driver types; driver failures are folded into `Unexpected` with their message intact.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed identifier or missing required field. No write was attempted.
    #[error("params_invalid")]
    ParamsInvalid,

    #[error("{0}")]
    NotFound(&'static str),

    /// A listing produced no rows.
    #[error("{0}")]
    EmptyPage(EmptyPage),

    #[error("{0}")]
    WriteFailed(&'static str),

    #[error("{0}")]
    Unexpected(String),
}

/// Why a page came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmptyPage {
    #[error("result_list_empty")]
    NoData,

    #[error("page_out_of_range")]
    OutOfRange { page: u64, total: u64 },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Logs a driver failure with context before converting it.
fn db_err(action: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        tracing::error!("Failed to {}: {:?}", action, err);
        StoreError::from(err)
    }
}
