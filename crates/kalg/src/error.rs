//! `AF_ALG` error types.

use std::io;

use thiserror::Error;

use crate::report::Verdict;

/// Why an algorithm is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// The kernel has no such algorithm (`ENOENT`).
    NotFound,
    /// The algorithm is disabled by FIPS mode (`ELIBBAD`).
    FipsDisabled,
}

/// Coarse classification callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The kernel does not support `AF_ALG` at all.
    TransportUnsupported,
    /// `AF_ALG` works but the requested algorithm does not exist.
    AlgorithmUnsupported,
    /// Anything else.
    Fatal,
}

/// `AF_ALG` errors
#[derive(Debug, Error)]
pub enum AlgError {
    /// `socket(AF_ALG)` failed with `EAFNOSUPPORT`
    #[error("kernel doesn't support AF_ALG")]
    TransportUnsupported(#[source] io::Error),

    /// `bind()` rejected the algorithm
    #[error("kernel doesn't support {alg_type} algorithm '{name}'{}", fips_suffix(.reason))]
    AlgorithmUnsupported {
        /// Algorithm type
        alg_type: String,
        /// Algorithm name
        name: String,
        /// Why the kernel rejected it
        reason: Unsupported,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Failed to create the algorithm socket
    #[error("unexpected error creating AF_ALG socket: {0}")]
    Socket(#[source] io::Error),

    /// Failed to bind the algorithm socket
    #[error("unexpected error binding AF_ALG socket to {alg_type} algorithm '{name}': {source}")]
    Bind {
        /// Algorithm type
        alg_type: String,
        /// Algorithm name
        name: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// `setsockopt(ALG_SET_KEY)` failed
    #[error("unexpected error setting key (len={keylen}): {source}")]
    SetKey {
        /// Key length in bytes
        keylen: usize,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// `setsockopt(ALG_SET_AEAD_AUTHSIZE)` failed
    #[error("unexpected error setting AEAD authsize {authsize}: {source}")]
    SetAuthSize {
        /// Requested tag size in bytes
        authsize: u32,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// `accept()` on the algorithm socket failed
    #[error("unexpected error accept()ing AF_ALG request socket: {0}")]
    Accept(#[source] io::Error),

    /// `sendmsg()` failed
    #[error("sendmsg() on AF_ALG request socket failed: {0}")]
    Send(#[source] io::Error),

    /// `sendmsg()` transmitted fewer bytes than requested
    #[error("short send on AF_ALG request socket: sent {sent} of {expected} bytes")]
    ShortSend {
        /// Bytes the kernel accepted
        sent: usize,
        /// Bytes requested
        expected: usize,
    },

    /// `read()` failed
    #[error("read() from AF_ALG request socket failed: {0}")]
    Read(#[source] io::Error),

    /// `read()` returned fewer bytes than requested
    #[error("short read from AF_ALG request socket: got {got} of {expected} bytes")]
    ShortRead {
        /// Bytes received
        got: usize,
        /// Bytes requested
        expected: usize,
    },

    /// Key or authsize changed after request sockets were derived
    #[error("cannot change the key of '{name}' after {accepted} request socket(s) were accepted")]
    KeyAfterAccept {
        /// Algorithm name
        name: String,
        /// Request sockets already derived
        accepted: usize,
    },

    /// Algorithm type/name cannot be encoded in `sockaddr_alg`
    #[error("invalid algorithm specifier: {0}")]
    InvalidSpec(String),

    /// Control envelope cannot be encoded
    #[error("invalid control envelope: {0}")]
    InvalidEnvelope(String),
}

fn fips_suffix(reason: &Unsupported) -> &'static str {
    match reason {
        Unsupported::NotFound => "",
        Unsupported::FipsDisabled => " (disabled by FIPS mode)",
    }
}

impl AlgError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransportUnsupported(_) => ErrorKind::TransportUnsupported,
            Self::AlgorithmUnsupported { .. } => ErrorKind::AlgorithmUnsupported,
            _ => ErrorKind::Fatal,
        }
    }

    /// `true` for the two "not available" kinds.
    pub fn is_unsupported(&self) -> bool {
        self.kind() != ErrorKind::Fatal
    }

    /// Verdict a test should end with when it hits this error.
    pub fn verdict(&self) -> Verdict {
        match self.kind() {
            ErrorKind::TransportUnsupported | ErrorKind::AlgorithmUnsupported => Verdict::Conf,
            ErrorKind::Fatal => Verdict::Broken,
        }
    }

    /// The OS error code behind this error, if any.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::TransportUnsupported(e)
            | Self::Socket(e)
            | Self::Accept(e)
            | Self::Send(e)
            | Self::Read(e) => e.raw_os_error(),
            Self::AlgorithmUnsupported { source, .. }
            | Self::Bind { source, .. }
            | Self::SetKey { source, .. }
            | Self::SetAuthSize { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// Classifies a failed `socket(AF_ALG)`.
    pub(crate) fn from_socket(err: io::Error) -> Self {
        if err.raw_os_error() == Some(libc::EAFNOSUPPORT) {
            Self::TransportUnsupported(err)
        } else {
            Self::Socket(err)
        }
    }

    /// Classifies a failed `bind()`.
    pub(crate) fn from_bind(alg_type: &str, name: &str, err: io::Error) -> Self {
        let reason = match err.raw_os_error() {
            Some(libc::ENOENT) => Some(Unsupported::NotFound),
            Some(libc::ELIBBAD) => Some(Unsupported::FipsDisabled),
            _ => None,
        };

        match reason {
            Some(reason) => Self::AlgorithmUnsupported {
                alg_type: alg_type.to_string(),
                name: name.to_string(),
                reason,
                source: err,
            },
            None => Self::Bind {
                alg_type: alg_type.to_string(),
                name: name.to_string(),
                source: err,
            },
        }
    }
}
