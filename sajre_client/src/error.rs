use crate::models::Role;
use crate::routes::Route;
use thiserror::Error;

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx answer. The message is what the server said, or
    /// `Request failed: <status>` when it said nothing useful.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bearer token cannot be sent as a header value.
    #[error("Invalid token")]
    InvalidToken,

    #[error("invalid API base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Client-side form validation. Raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Dashboard access checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("Access Denied: {} role required", .required.label())]
    Denied { required: Role, actual: Role },
}

impl AccessError {
    /// Both cases offer a way back to the login page.
    pub fn redirect(&self) -> Route {
        Route::Login
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored entities are not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("could not serialize entities: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("unknown referral code `{0}`")]
    UnknownReferralCode(String),
    #[error("a {creator} cannot create a {requested}")]
    WrongReferrer { creator: Role, requested: Role },
}
