use camino::Utf8PathBuf;
use std::fmt;

/// Transport-level failure classes. The retry predicate matches on these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    UnknownHost,
    ConnectionRefused,
    ConnectionReset,
    Tls,
    Timeout,
    Io,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownHost => "unknown host",
            Self::ConnectionRefused => "connection refused",
            Self::ConnectionReset => "connection reset",
            Self::Tls => "tls failure",
            Self::Timeout => "timeout",
            Self::Io => "i/o error",
            Self::Other => "transport error",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that never produced an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Protocol step, used to label failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterWhitelistedResource,
    RegisterContentCreatorComponent,
    Upload,
    Analyze,
    ListCategories,
    ListViolatingSymbols,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RegisterWhitelistedResource => "whitelist registration",
            Self::RegisterContentCreatorComponent => "content creator component registration",
            Self::Upload => "upload",
            Self::Analyze => "analysis",
            Self::ListCategories => "category listing",
            Self::ListViolatingSymbols => "violating symbol listing",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{operation}: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: TransportError,
    },

    #[error("{operation}: HTTP {}", describe_status(.status))]
    Status { operation: Operation, status: u16 },

    #[error("{operation}: invalid response body: {message}")]
    Decode {
        operation: Operation,
        message: String,
    },

    #[error("{operation}: cannot read artifact {path}: {source}")]
    Artifact {
        operation: Operation,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Artifact { operation, .. } => *operation,
        }
    }

    /// HTTP status of a rejected request, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport { source, .. } => Some(source.kind),
            _ => None,
        }
    }
}

fn describe_status(status: &u16) -> String {
    let status = *status;
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    }
}
