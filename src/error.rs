use std::{fmt, result};

use warp::http;

/// The user field a validation failure refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    Username,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid {0}")]
    ValidationFailed(Field),
    #[error("email or username already taken")]
    NotUnique,
    #[error("no such user")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("can't delete yourself")]
    SelfDeleteForbidden,
    #[error("page out of range")]
    PaginationOutOfRange,
    #[error("storage failure")]
    StorageFailure,
    #[error("internal error")]
    Internal,
}

pub type Result<T> = result::Result<T, Error>;

impl fmt::Display for Field {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Username => "username",
        })
    }
}

impl From<Error> for http::StatusCode {
    fn from(e: Error) -> Self {
        match e {
            Error::ValidationFailed(_) => http::StatusCode::BAD_REQUEST,
            Error::NotFound => http::StatusCode::NOT_FOUND,
            Error::PermissionDenied => http::StatusCode::FORBIDDEN,
            Error::NotUnique => http::StatusCode::CONFLICT,
            Error::PaginationOutOfRange => http::StatusCode::RANGE_NOT_SATISFIABLE,
            Error::SelfDeleteForbidden => http::StatusCode::UNPROCESSABLE_ENTITY,
            Error::StorageFailure | Error::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl warp::reject::Reject for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_kind_has_its_own_status() {
        let kinds = [
            Error::ValidationFailed(Field::Email),
            Error::NotUnique,
            Error::NotFound,
            Error::PermissionDenied,
            Error::SelfDeleteForbidden,
            Error::PaginationOutOfRange,
            Error::StorageFailure,
        ];

        let mut statuses: Vec<http::StatusCode> = kinds.iter().map(|&e| e.into()).collect();
        statuses.sort_by_key(|s| s.as_u16());
        statuses.dedup();

        assert_eq!(statuses.len(), kinds.len());
    }

    #[test]
    fn validation_names_the_field() {
        assert_eq!(
            Error::ValidationFailed(Field::Username).to_string(),
            "invalid username"
        );
    }
}
