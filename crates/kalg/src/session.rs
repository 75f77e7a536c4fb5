//! Algorithm sessions: `AF_ALG` sockets bound to a named algorithm.
//!
//! A session goes through three steps:
//!
//! 1. [`AlgSocket::create`] opens an unbound `AF_ALG` socket.
//! 2. [`AlgSocket::bind`] / [`AlgSocket::bind_addr`] bind it to an algorithm
//!    and yield an [`AlgSession`].
//! 3. [`AlgSession::set_key`] optionally installs a key, after which any
//!    number of request sockets can be derived with [`AlgSession::accept`].
//!
//! [`AlgSession::setup`] does all three in one call.

use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

use tracing::debug;

use crate::addr::AlgSpec;
use crate::config::AlgConfig;
use crate::error::AlgError;
use crate::key::KeyMaterial;
use crate::request::RequestChannel;
use crate::sys::{ALG_SET_AEAD_AUTHSIZE, ALG_SET_KEY};
use crate::transport::Transport;

/// An `AF_ALG` socket not yet bound to any algorithm.
#[derive(Debug)]
pub struct AlgSocket {
    transport: Transport,
    config: AlgConfig,
}

impl AlgSocket {
    /// Create an `AF_ALG` algorithm socket.
    ///
    /// # Errors
    ///
    /// [`AlgError::TransportUnsupported`] if the kernel was built without
    /// `AF_ALG`, [`AlgError::Socket`] for any other failure.
    pub fn create(config: &AlgConfig) -> Result<Self, AlgError> {
        let transport = Transport::open(config).map_err(AlgError::from_socket)?;
        debug!(fd = transport.as_raw_fd(), "created AF_ALG socket");

        Ok(Self {
            transport,
            config: config.clone(),
        })
    }

    /// Bind to the algorithm described by `spec`, including its feature and
    /// mask bits.
    ///
    /// The socket is closed if binding fails.
    ///
    /// # Errors
    ///
    /// [`AlgError::AlgorithmUnsupported`] if the kernel doesn't have the
    /// algorithm or FIPS mode disables it, [`AlgError::Bind`] otherwise.
    pub fn bind_addr(self, spec: &AlgSpec) -> Result<AlgSession, AlgError> {
        self.transport
            .bind(&spec.to_sockaddr())
            .map_err(|e| AlgError::from_bind(spec.alg_type(), spec.name(), e))?;

        debug!(
            fd = self.transport.as_raw_fd(),
            alg_type = spec.alg_type(),
            name = spec.name(),
            feat = spec.feat(),
            mask = spec.mask(),
            "bound AF_ALG socket"
        );

        Ok(AlgSession {
            transport: self.transport,
            config: self.config,
            spec: spec.clone(),
            keyed: false,
            accepted: 0,
        })
    }

    /// Bind to `alg_type`/`alg_name` with feature and mask bits left 0.
    ///
    /// # Errors
    ///
    /// As [`bind_addr`](Self::bind_addr), plus [`AlgError::InvalidSpec`] if
    /// the names don't fit the binding address.
    pub fn bind(self, alg_type: &str, alg_name: &str) -> Result<AlgSession, AlgError> {
        let spec = AlgSpec::new(alg_type, alg_name)?;
        self.bind_addr(&spec)
    }
}

impl AsRawFd for AlgSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.transport.as_raw_fd()
    }
}

/// An `AF_ALG` algorithm socket bound to one algorithm.
///
/// Request sockets derived from it share its key. The key can't be
/// changed once a request socket exists.
#[derive(Debug)]
pub struct AlgSession {
    transport: Transport,
    config: AlgConfig,
    spec: AlgSpec,
    keyed: bool,
    accepted: usize,
}

impl AlgSession {
    /// Create a socket, bind it to `alg_type`/`alg_name` and, unless `key` is
    /// empty, install the key (generating it for [`KeyMaterial::Random`]).
    ///
    /// # Errors
    ///
    /// The first error from [`AlgSocket::create`], [`AlgSocket::bind`] or
    /// [`set_key`](Self::set_key). Nothing is left open on failure.
    pub fn setup(
        config: &AlgConfig,
        alg_type: &str,
        alg_name: &str,
        key: KeyMaterial<'_>,
    ) -> Result<Self, AlgError> {
        let mut session = AlgSocket::create(config)?.bind(alg_type, alg_name)?;

        if let Some(key) = key.resolve() {
            session.set_key(&key)?;
        }

        Ok(session)
    }

    /// Install `key` with `ALG_SET_KEY`.
    ///
    /// # Errors
    ///
    /// [`AlgError::KeyAfterAccept`] once a request socket has been derived,
    /// [`AlgError::SetKey`] if the kernel rejects the key.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), AlgError> {
        self.check_unaccepted()?;

        self.transport
            .set_alg_opt(ALG_SET_KEY, key, key.len())
            .map_err(|source| AlgError::SetKey {
                keylen: key.len(),
                source,
            })?;

        debug!(name = self.spec.name(), keylen = key.len(), "set AF_ALG key");
        self.keyed = true;
        Ok(())
    }

    /// Set the AEAD authentication tag size with `ALG_SET_AEAD_AUTHSIZE`.
    ///
    /// # Errors
    ///
    /// [`AlgError::KeyAfterAccept`] once a request socket has been derived,
    /// [`AlgError::SetAuthSize`] if the kernel rejects the size.
    pub fn set_aead_authsize(&mut self, authsize: u32) -> Result<(), AlgError> {
        self.check_unaccepted()?;

        // The size travels in optlen, optval is NULL.
        self.transport
            .set_alg_opt(ALG_SET_AEAD_AUTHSIZE, &[], authsize as usize)
            .map_err(|source| AlgError::SetAuthSize { authsize, source })?;

        debug!(name = self.spec.name(), authsize, "set AEAD authsize");
        Ok(())
    }

    /// Derive a request socket.
    ///
    /// Request sockets are independent of each other and of this session's
    /// lifetime: dropping the session doesn't invalidate them.
    ///
    /// # Errors
    ///
    /// [`AlgError::Accept`] on failure.
    pub fn accept(&mut self) -> Result<RequestChannel, AlgError> {
        let transport = self
            .transport
            .accept(self.config.accept_flags())
            .map_err(AlgError::Accept)?;

        self.accepted += 1;
        debug!(
            algfd = self.transport.as_raw_fd(),
            reqfd = transport.as_raw_fd(),
            name = self.spec.name(),
            "accepted AF_ALG request socket"
        );

        Ok(RequestChannel::new(transport, self.spec.clone()))
    }

    /// The algorithm this session is bound to.
    pub fn spec(&self) -> &AlgSpec {
        &self.spec
    }

    /// Whether a key has been installed.
    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// Number of request sockets derived so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// The session's socket.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn check_unaccepted(&self) -> Result<(), AlgError> {
        if self.accepted > 0 {
            return Err(AlgError::KeyAfterAccept {
                name: self.spec.name().to_string(),
                accepted: self.accepted,
            });
        }
        Ok(())
    }
}

impl AsRawFd for AlgSession {
    fn as_raw_fd(&self) -> RawFd {
        self.transport.as_raw_fd()
    }
}

impl AsFd for AlgSession {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.transport.as_fd()
    }
}
