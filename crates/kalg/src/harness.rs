//! Reporting wrappers for test programs.
//!
//! [`AlgHarness`] offers the same operations as [`AlgSocket`],
//! [`AlgSession`] and [`RequestChannel`], but reports every failure to a
//! [`Reporter`] before returning it: unsupported transports and algorithms
//! abort with [`Verdict::Conf`], everything else with [`Verdict::Broken`].
//! A test propagates the error with `?` and stops.

use crate::addr::AlgSpec;
use crate::cmsg::ControlEnvelope;
use crate::config::AlgConfig;
use crate::error::AlgError;
use crate::key::KeyMaterial;
use crate::probe;
use crate::report::{Reporter, Verdict};
use crate::request::RequestChannel;
use crate::session::{AlgSession, AlgSocket};

/// `AF_ALG` operations bound to a reporter.
#[derive(Debug)]
pub struct AlgHarness<R> {
    reporter: R,
    config: AlgConfig,
}

impl<R: Reporter> AlgHarness<R> {
    /// Harness with the default [`AlgConfig`].
    pub fn new(reporter: R) -> Self {
        Self::with_config(reporter, AlgConfig::default())
    }

    /// Harness with an explicit configuration.
    pub fn with_config(reporter: R, config: AlgConfig) -> Self {
        Self { reporter, config }
    }

    /// The reporter failures go to.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Socket configuration in use.
    pub fn config(&self) -> &AlgConfig {
        &self.config
    }

    /// See [`AlgSocket::create`].
    ///
    /// # Errors
    ///
    /// Aborts with `Conf` if the kernel lacks `AF_ALG`, `Broken` otherwise.
    pub fn create(&self) -> Result<AlgSocket, AlgError> {
        self.check(AlgSocket::create(&self.config))
    }

    /// See [`AlgSocket::bind_addr`].
    ///
    /// # Errors
    ///
    /// Aborts with `Conf` if the algorithm is unsupported, `Broken`
    /// otherwise.
    pub fn bind_addr(&self, socket: AlgSocket, spec: &AlgSpec) -> Result<AlgSession, AlgError> {
        self.check(socket.bind_addr(spec))
    }

    /// See [`AlgSocket::bind`].
    ///
    /// # Errors
    ///
    /// As [`bind_addr`](Self::bind_addr).
    pub fn bind(
        &self,
        socket: AlgSocket,
        alg_type: &str,
        alg_name: &str,
    ) -> Result<AlgSession, AlgError> {
        self.check(socket.bind(alg_type, alg_name))
    }

    /// Probe for an algorithm without reporting "unsupported".
    ///
    /// Unsupported transports and algorithms come back as the error they
    /// are, unreported; anything else aborts with `Broken`.
    ///
    /// # Errors
    ///
    /// The probe's error.
    pub fn try_alg(&self, alg_type: &str, alg_name: &str) -> Result<(), AlgError> {
        self.probe_with_config(alg_type, alg_name).inspect_err(|e| {
            if !e.is_unsupported() {
                self.abort(e);
            }
        })
    }

    /// Whether an algorithm is available.
    ///
    /// An unavailable algorithm is reported once with `res(Conf)`; the
    /// FIPS-disabled case is reported the same way.
    ///
    /// # Errors
    ///
    /// Any other probe failure, after aborting with `Broken`.
    pub fn have_alg(&self, alg_type: &str, alg_name: &str) -> Result<bool, AlgError> {
        Ok(self.probe(alg_type, alg_name)?.is_none())
    }

    /// Abort with `Conf` unless an algorithm is available.
    ///
    /// # Errors
    ///
    /// The reason the algorithm is unavailable, or any other probe failure.
    pub fn require_alg(&self, alg_type: &str, alg_name: &str) -> Result<(), AlgError> {
        match self.probe(alg_type, alg_name)? {
            None => Ok(()),
            Some(err) => {
                self.reporter.brk(
                    Verdict::Conf,
                    &format!("{alg_type} algorithm '{alg_name}' is required"),
                );
                Err(err)
            }
        }
    }

    /// See [`AlgSession::set_key`].
    ///
    /// # Errors
    ///
    /// Aborts with `Broken`.
    pub fn set_key(&self, session: &mut AlgSession, key: &[u8]) -> Result<(), AlgError> {
        self.check(session.set_key(key))
    }

    /// See [`AlgSession::set_aead_authsize`].
    ///
    /// # Errors
    ///
    /// Aborts with `Broken`.
    pub fn set_aead_authsize(
        &self,
        session: &mut AlgSession,
        authsize: u32,
    ) -> Result<(), AlgError> {
        self.check(session.set_aead_authsize(authsize))
    }

    /// See [`AlgSession::accept`].
    ///
    /// # Errors
    ///
    /// Aborts with `Broken`.
    pub fn accept(&self, session: &mut AlgSession) -> Result<RequestChannel, AlgError> {
        self.check(session.accept())
    }

    /// See [`AlgSession::setup`].
    ///
    /// # Errors
    ///
    /// The first failing step, reported with its verdict.
    pub fn setup(
        &self,
        alg_type: &str,
        alg_name: &str,
        key: KeyMaterial<'_>,
    ) -> Result<AlgSession, AlgError> {
        self.check(AlgSession::setup(&self.config, alg_type, alg_name, key))
    }

    /// See [`RequestChannel::setup`].
    ///
    /// # Errors
    ///
    /// The first failing step, reported with its verdict.
    pub fn setup_request(
        &self,
        alg_type: &str,
        alg_name: &str,
        key: KeyMaterial<'_>,
    ) -> Result<RequestChannel, AlgError> {
        self.check(RequestChannel::setup(&self.config, alg_type, alg_name, key))
    }

    /// See [`RequestChannel::send`].
    ///
    /// # Errors
    ///
    /// Aborts with `Broken`, short sends included.
    pub fn send(
        &self,
        req: &RequestChannel,
        data: &[u8],
        envelope: &ControlEnvelope<'_>,
    ) -> Result<(), AlgError> {
        self.check(req.send(data, envelope))
    }

    /// See [`RequestChannel::read_exact`].
    ///
    /// # Errors
    ///
    /// Aborts with `Broken`.
    pub fn read_exact(&self, req: &RequestChannel, buf: &mut [u8]) -> Result<(), AlgError> {
        self.check(req.read_exact(buf))
    }

    /// `Ok(None)` if available, `Ok(Some(reason))` after reporting an
    /// unavailable algorithm, `Err` after aborting on anything else.
    fn probe(&self, alg_type: &str, alg_name: &str) -> Result<Option<AlgError>, AlgError> {
        match self.probe_with_config(alg_type, alg_name) {
            Ok(()) => Ok(None),
            Err(e) if e.is_unsupported() => {
                self.reporter.res(Verdict::Conf, &e.to_string());
                Ok(Some(e))
            }
            Err(e) => {
                self.abort(&e);
                Err(e)
            }
        }
    }

    fn probe_with_config(&self, alg_type: &str, alg_name: &str) -> Result<(), AlgError> {
        probe::try_alg_with(&self.config, &AlgSpec::new(alg_type, alg_name)?)
    }

    pub(crate) fn check<T>(&self, result: Result<T, AlgError>) -> Result<T, AlgError> {
        result.inspect_err(|e| self.abort(e))
    }

    fn abort(&self, err: &AlgError) {
        self.reporter.brk(err.verdict(), &err.to_string());
    }
}
