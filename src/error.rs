//! Error types shared across the crate.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading, parsing, or validating configuration.
///
/// Every variant is fatal at startup: the binary refuses to open a session
/// without the identifiers it needs.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    /// A required setting resolved to an empty value.
    Missing(&'static str),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Missing(what) => write!(f, "missing required setting: {what}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the model HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status {
        code: u16,
        body: String,
        retry_after_secs: Option<u64>,
    },
    /// The endpoint answered with a payload we could not use.
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Status {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// CatalogError
// ---------------------------------------------------------------------------

/// Errors from the tool catalog and its authorization channel.
#[derive(Debug)]
pub enum CatalogError {
    Http(reqwest::Error),
    Status(u16, String),
    /// The user denied consent or the provider reported a failed flow.
    AuthorizationFailed(String),
    /// The authorization handle is no longer known to the provider.
    AuthorizationExpired,
    Invalid(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status(code, body) => write!(f, "status {code}: {body}"),
            Self::AuthorizationFailed(msg) => write!(f, "authorization failed: {msg}"),
            Self::AuthorizationExpired => write!(f, "authorization request expired"),
            Self::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Failures raised while an execution pass is streaming.
///
/// These abort the current turn; the session loop reports them and keeps
/// accepting input.
#[derive(Debug)]
pub enum EngineError {
    Api(ApiError),
    Catalog(CatalogError),
    /// A resume arrived for a session with nothing suspended.
    NoCheckpoint(String),
    /// The resume payload does not line up with the suspended calls.
    ResumeMismatch { expected: usize, received: usize },
    /// Model returned no choices in the response.
    EmptyResponse,
    /// The tool-calling loop exceeded the configured iteration cap.
    MaxIterationsReached,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Catalog(e) => write!(f, "catalog: {e}"),
            Self::NoCheckpoint(session) => {
                write!(f, "session `{session}` has no suspended execution to resume")
            }
            Self::ResumeMismatch { expected, received } => write!(
                f,
                "resume carried {received} decision(s) but {expected} call(s) are suspended"
            ),
            Self::EmptyResponse => write!(f, "model returned empty response"),
            Self::MaxIterationsReached => write!(f, "max agentic loop iterations reached"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ApiError> for EngineError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<CatalogError> for EngineError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}
