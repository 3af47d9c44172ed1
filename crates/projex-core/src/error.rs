use std::fmt;

use crate::db::{DatabaseMissing, FetchError};
use crate::db::projects::QueryError;
use crate::hooks::HookError;
use crate::model::MappingError;
use crate::paths::PathError;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DatabaseUnavailable,
    ProjectNotFound,
    MappingFailed,
    ExtensionCallbackFailed,
    HookTypeMismatch,
    QueryFailed,
    FilesystemError,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::DatabaseUnavailable => "E1002",
            Self::ProjectNotFound => "E2001",
            Self::MappingFailed => "E2002",
            Self::ExtensionCallbackFailed => "E3001",
            Self::HookTypeMismatch => "E3002",
            Self::QueryFailed => "E4001",
            Self::FilesystemError => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DatabaseUnavailable => "Database unavailable",
            Self::ProjectNotFound => "Project not found",
            Self::MappingFailed => "Unexpected column data",
            Self::ExtensionCallbackFailed => "Extension callback failed",
            Self::HookTypeMismatch => "Hook registered with conflicting types",
            Self::QueryFailed => "Query failed",
            Self::FilesystemError => "Filesystem error",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in projex.toml and retry."),
            Self::DatabaseUnavailable => {
                Some("Check [database].path, or run `px init-demo` to create a sample database.")
            }
            Self::ProjectNotFound => Some("Run `px list --search <term>` to find the project number."),
            Self::MappingFailed => Some("Check that custom queries select the expected columns."),
            Self::ExtensionCallbackFailed | Self::HookTypeMismatch => {
                Some("Check the filters registered by deployment extensions.")
            }
            Self::QueryFailed => Some("Check the SQL produced by custom query filters."),
            Self::FilesystemError => Some("Check [filesystem].lookup_paths and permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// Best-effort classification of an error chain.
    #[must_use]
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(query) = cause.downcast_ref::<QueryError>() {
                return match query {
                    QueryError::NotFound(_) => Self::ProjectNotFound,
                    QueryError::Hook(hook) => Self::from_hook(hook),
                    QueryError::Fetch(_) => Self::QueryFailed,
                    QueryError::Mapping(_) => Self::MappingFailed,
                };
            }
            if let Some(hook) = cause.downcast_ref::<HookError>() {
                return Self::from_hook(hook);
            }
            if let Some(path) = cause.downcast_ref::<PathError>() {
                return match path {
                    PathError::Hook(hook) => Self::from_hook(hook),
                    PathError::Io { .. } => Self::FilesystemError,
                };
            }
            if cause.is::<MappingError>() {
                return Self::MappingFailed;
            }
            if cause.is::<FetchError>() {
                return Self::QueryFailed;
            }
            if cause.is::<DatabaseMissing>() || cause.is::<rusqlite::Error>() {
                return Self::DatabaseUnavailable;
            }
            if cause.is::<toml::de::Error>() {
                return Self::ConfigParseError;
            }
        }
        Self::InternalUnexpected
    }

    const fn from_hook(err: &HookError) -> Self {
        match err {
            HookError::Callback { .. } => Self::ExtensionCallbackFailed,
            HookError::TypeMismatch { .. } => Self::HookTypeMismatch,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
