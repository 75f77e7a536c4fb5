//! Algorithm availability probing.
//!
//! Probing creates and binds a throwaway algorithm socket and closes it
//! again. No key is set and no data is processed, so it's cheap enough to
//! run at the start of every test.

use tracing::debug;

use crate::addr::AlgSpec;
use crate::config::AlgConfig;
use crate::error::AlgError;
use crate::session::AlgSocket;

/// Check whether the kernel can bind `alg_type`/`alg_name`.
///
/// # Errors
///
/// The error that stopped the probe; [`AlgError::kind`] tells "no
/// `AF_ALG`" and "no such algorithm" apart from real failures.
pub fn try_alg(alg_type: &str, alg_name: &str) -> Result<(), AlgError> {
    try_alg_addr(&AlgSpec::new(alg_type, alg_name)?)
}

/// Check whether the kernel can bind `spec`, feature and mask bits
/// included.
///
/// # Errors
///
/// As [`try_alg`].
pub fn try_alg_addr(spec: &AlgSpec) -> Result<(), AlgError> {
    try_alg_with(&AlgConfig::default(), spec)
}

/// [`try_alg_addr`] with the probe socket opened according to `config`.
///
/// # Errors
///
/// As [`try_alg`].
pub fn try_alg_with(config: &AlgConfig, spec: &AlgSpec) -> Result<(), AlgError> {
    let result = AlgSocket::create(config).and_then(|s| s.bind_addr(spec));

    match &result {
        Ok(_) => debug!(%spec, cloexec = config.cloexec, "algorithm available"),
        Err(e) => debug!(%spec, error = %e, "algorithm probe failed"),
    }

    // The session, if any, is closed here.
    result.map(drop)
}
