use thiserror::Error;

use crate::store::{Collection, RecordId};

/// Failures of the remote store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote store unreachable: {0}")]
    Transport(String),

    #[error("{collection} record {id} does not exist")]
    NotFound { collection: Collection, id: RecordId },

    #[error("malformed {collection} record: {source}")]
    Decode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced to the presentation layer.
#[derive(Debug, Error)]
pub enum HrError {
    #[error("Could not reach the HR data service: {0}")]
    Transport(String),

    #[error("The requested {collection} record ({id}) no longer exists")]
    NotFound { collection: Collection, id: RecordId },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Login failed, the HR data service is unavailable: {0}")]
    AuthServiceUnavailable(String),

    #[error("{0}")]
    Validation(String),

    #[error("Account {account_id} was deleted but {failed} related record(s) could not be removed")]
    PartialCascadeFailure { account_id: RecordId, failed: usize },

    #[error("You must be logged in to do that")]
    NotAuthenticated,

    #[error("Session storage error: {0}")]
    SessionStorage(String),

    #[error("Password hashing failed: {0}")]
    Password(String),
}

impl From<StoreError> for HrError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => HrError::NotFound { collection, id },
            other => HrError::Transport(other.to_string()),
        }
    }
}

pub type HrResult<T> = Result<T, HrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_its_identity() {
        let err: HrError = StoreError::NotFound {
            collection: Collection::Leaves,
            id: RecordId::Int(7),
        }
        .into();
        assert!(matches!(err, HrError::NotFound { collection: Collection::Leaves, .. }));
        assert!(err.to_string().contains("leaves"));
    }

    #[test]
    fn transport_failures_collapse_to_transport() {
        let err: HrError = StoreError::Transport("connection refused".into()).into();
        match err {
            HrError::Transport(msg) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
