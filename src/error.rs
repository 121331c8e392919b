use std::io;

use thiserror::Error;

/// Everything that can go wrong below the UI layer.
///
/// The window registry, the overlay and the broadcast channel never fail;
/// these variants come from the collaborators (backend, storage, session)
/// and from user input validation.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("you need to sign in first")]
    NotSignedIn,

    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeskError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

pub type Result<T, E = DeskError> = std::result::Result<T, E>;

impl From<DeskError> for io::Error {
    fn from(err: DeskError) -> Self {
        match err {
            DeskError::Io(inner) => inner,
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = DeskError::not_found("reservation", 7);
        assert_eq!(err.to_string(), "reservation 7 not found");
    }

    #[test]
    fn io_errors_round_trip_through_io_error() {
        let err: io::Error = DeskError::Io(io::Error::new(io::ErrorKind::NotFound, "gone")).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        let err: io::Error = DeskError::InvalidCredentials.into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
