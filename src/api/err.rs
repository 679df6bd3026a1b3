//! API error handling.
//!
//! We define our own error to use for all resolvers. It has `From` impls to
//! be created from other common errors that occur (e.g. store errors). This
//! module also offers a couple macros to easily create an error.
//!
//! Besides the message, the error carries a coarse "kind" that is exposed to
//! API consumers as machine readable `kind` extension.

use juniper::{FieldError, IntoFieldError, ScalarValue, graphql_value};

use crate::{prelude::*, store::StoreError};


pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) struct ApiError {
    pub(crate) msg: String,
    pub(crate) kind: ApiErrorKind,
}

pub(crate) enum ApiErrorKind {
    /// The arguments passed to an endpoint are invalid somehow.
    InvalidInput,

    /// The API request is not sufficiently authorized.
    NotAuthorized,

    /// A referenced document does not exist.
    NotFound,

    /// The operation conflicts with existing data, e.g. a duplicate email.
    Conflict,

    /// Some server error out of control of the API user.
    InternalServerError,
}

impl ApiErrorKind {
    fn kind_str(&self) -> &str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    fn message_prefix(&self) -> &str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::NotAuthorized => "Not authorized",
            Self::NotFound => "Not found",
            Self::Conflict => "Conflict",
            Self::InternalServerError => "Internal server error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(src: StoreError) -> Self {
        match src {
            StoreError::DuplicateEmail(email) => Self {
                msg: format!("a user with email '{email}' already exists"),
                kind: ApiErrorKind::Conflict,
            },
            StoreError::MalformedId(id) => Self {
                msg: format!("malformed document id '{id}'"),
                kind: ApiErrorKind::InvalidInput,
            },
            StoreError::Database(e) => {
                // Logging the error here is not ideal but probably totally
                // fine for us. At this point, it's very likely that the error
                // is sent back to the user, and this is the last time we can
                // get detailed information about it.
                error!("Store error when executing query: {e}");
                debug!("Detailed error: {e:#?}");

                Self {
                    msg: "database error".into(),
                    kind: ApiErrorKind::InternalServerError,
                }
            }
        }
    }
}

impl<S: ScalarValue> IntoFieldError<S> for ApiError {
    fn into_field_error(self) -> FieldError<S> {
        let msg = format!("{}: {}", self.kind.message_prefix(), self.msg);
        debug!("Responding with API error: {msg}");
        let ext = graphql_value!({
            "kind": (self.kind.kind_str()),
        });

        FieldError::new(msg, ext)
    }
}


// ===== Helper macros to easily create errors ==================================================

/// Creates an `ApiError` with a `format!` like syntax.
macro_rules! api_err {
    ($kind:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::api::err::ApiError {
            msg: format!($fmt $(, $arg)*),
            kind: $crate::api::err::ApiErrorKind::$kind,
        }
    };
}

macro_rules! invalid_input {
    ($($t:tt)+) => { $crate::api::err::api_err!(InvalidInput, $($t)*) };
}

macro_rules! not_authorized {
    ($($t:tt)+) => { $crate::api::err::api_err!(NotAuthorized, $($t)*) };
}

macro_rules! not_found {
    ($($t:tt)+) => { $crate::api::err::api_err!(NotFound, $($t)*) };
}

macro_rules! conflict {
    ($($t:tt)+) => { $crate::api::err::api_err!(Conflict, $($t)*) };
}

macro_rules! internal_server_error {
    ($($t:tt)+) => { $crate::api::err::api_err!(InternalServerError, $($t)*) };
}

pub(crate) use api_err;
pub(crate) use invalid_input;
pub(crate) use not_authorized;
pub(crate) use not_found;
pub(crate) use conflict;
pub(crate) use internal_server_error;
