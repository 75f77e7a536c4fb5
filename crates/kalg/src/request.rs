//! Request channels: per-operation sockets derived from a session.

use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

use tracing::{debug, trace};

use crate::addr::AlgSpec;
use crate::cmsg::ControlEnvelope;
use crate::config::AlgConfig;
use crate::error::AlgError;
use crate::key::KeyMaterial;
use crate::session::AlgSession;
use crate::transport::Transport;

/// An `AF_ALG` request socket.
///
/// Data and control messages go in with [`send`](Self::send), results come
/// out with [`read`](Self::read). Each channel keeps its own pending
/// operation, so several channels from one session can be used at once.
#[derive(Debug)]
pub struct RequestChannel {
    transport: Transport,
    spec: AlgSpec,
}

impl RequestChannel {
    pub(crate) fn new(transport: Transport, spec: AlgSpec) -> Self {
        Self { transport, spec }
    }

    /// Derive a request channel from `session`. Same as
    /// [`AlgSession::accept`].
    ///
    /// # Errors
    ///
    /// [`AlgError::Accept`] on failure.
    pub fn derive(session: &mut AlgSession) -> Result<Self, AlgError> {
        session.accept()
    }

    /// Set up a session for `alg_type`/`alg_name` with `key`, derive one
    /// request channel from it and close the session.
    ///
    /// Only the returned channel stays open.
    ///
    /// # Errors
    ///
    /// The first error from [`AlgSession::setup`] or
    /// [`AlgSession::accept`].
    pub fn setup(
        config: &AlgConfig,
        alg_type: &str,
        alg_name: &str,
        key: KeyMaterial<'_>,
    ) -> Result<Self, AlgError> {
        let mut session = AlgSession::setup(config, alg_type, alg_name, key)?;
        let channel = session.accept()?;
        drop(session);

        debug!(
            reqfd = channel.as_raw_fd(),
            name = alg_name,
            "set up AF_ALG request socket"
        );
        Ok(channel)
    }

    /// Send `data` along with the control messages described by `envelope`.
    ///
    /// `envelope.flags()` is the `sendmsg` flags word, e.g. `MSG_MORE` when
    /// more data for the same operation follows.
    ///
    /// # Errors
    ///
    /// [`AlgError::Send`] if `sendmsg` fails, [`AlgError::ShortSend`] if it
    /// accepts fewer than `data.len()` bytes. Short sends are not retried.
    pub fn send(&self, data: &[u8], envelope: &ControlEnvelope<'_>) -> Result<(), AlgError> {
        let control = envelope.encode();
        trace!(
            reqfd = self.as_raw_fd(),
            datalen = data.len(),
            controllen = control.as_bytes().len(),
            flags = envelope.flags(),
            "sendmsg"
        );

        let sent = self
            .transport
            .sendmsg(data, control.as_bytes(), envelope.flags())
            .map_err(AlgError::Send)?;
        check_sent(sent, data.len())
    }

    /// Send `data` with no control messages and no flags.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send).
    pub fn write(&self, data: &[u8]) -> Result<(), AlgError> {
        self.send(data, &ControlEnvelope::new())
    }

    /// Read output into `buf`, returning the number of bytes read.
    ///
    /// # Errors
    ///
    /// [`AlgError::Read`] if `read` fails.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, AlgError> {
        self.transport.read(buf).map_err(AlgError::Read)
    }

    /// Read exactly `buf.len()` bytes of output in a single `read`.
    ///
    /// # Errors
    ///
    /// [`AlgError::Read`] if `read` fails, [`AlgError::ShortRead`] if it
    /// returns fewer bytes.
    pub fn read_exact(&self, buf: &mut [u8]) -> Result<(), AlgError> {
        let got = self.read(buf)?;
        if got != buf.len() {
            return Err(AlgError::ShortRead {
                got,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    /// The algorithm behind this channel.
    pub fn spec(&self) -> &AlgSpec {
        &self.spec
    }

    /// The channel's socket.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

impl AsRawFd for RequestChannel {
    fn as_raw_fd(&self) -> RawFd {
        self.transport.as_raw_fd()
    }
}

impl AsFd for RequestChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.transport.as_fd()
    }
}

/// A transmit that moved fewer bytes than asked for is a failure.
pub(crate) fn check_sent(sent: usize, expected: usize) -> Result<(), AlgError> {
    if sent != expected {
        return Err(AlgError::ShortSend { sent, expected });
    }
    Ok(())
}
