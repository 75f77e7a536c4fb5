//! # KALG
//!
//! Helpers for driving Linux kernel crypto algorithms through `AF_ALG`
//! sockets, written for test programs that exercise the kernel crypto API.
//!
//! This crate provides:
//! - Algorithm sessions: an `AF_ALG` socket bound to one named algorithm,
//!   optionally keyed
//! - Availability probing that tells "no `AF_ALG`" and "no such algorithm"
//!   apart from real failures
//! - Request channels derived from a session with `accept(2)`
//! - `SOL_ALG` control-message encoding (operation, IV, AEAD assoclen)
//! - A reporting harness that maps failures onto skip/broken verdicts
//!
//! ## Example
//!
//! ```no_run
//! use kalg::{AlgConfig, ControlEnvelope, KeyMaterial, RequestChannel};
//!
//! let config = AlgConfig::default();
//! let req = RequestChannel::setup(&config, "hash", "sha256", KeyMaterial::Absent)?;
//! req.send(b"abc", &ControlEnvelope::new())?;
//!
//! let mut digest = [0u8; 32];
//! req.read_exact(&mut digest)?;
//! # Ok::<(), kalg::AlgError>(())
//! ```
//!
//! ## Failure taxonomy
//!
//! | Kind | Cause | Verdict |
//! |------|-------|---------|
//! | `TransportUnsupported` | kernel built without `AF_ALG` | skip |
//! | `AlgorithmUnsupported` | algorithm missing or FIPS-disabled | skip |
//! | `Fatal` | everything else | broken |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(not(target_os = "linux"))]
compile_error!("kalg requires Linux: AF_ALG is a Linux socket family");

pub mod addr;
pub mod cmsg;
pub mod config;
pub mod error;
pub mod harness;
pub mod key;
pub mod probe;
pub mod report;
pub mod request;
pub mod session;
pub mod sys;

mod transport;

pub use addr::AlgSpec;
pub use cmsg::{AlgOp, ControlEntry, ControlEnvelope, EncodedControl};
pub use config::AlgConfig;
pub use error::{AlgError, ErrorKind, Unsupported};
pub use harness::AlgHarness;
pub use key::KeyMaterial;
pub use probe::{try_alg, try_alg_addr, try_alg_with};
pub use report::{RecordingReporter, Report, Reporter, TracingReporter, Verdict};
pub use request::RequestChannel;
pub use session::{AlgSession, AlgSocket};
pub use transport::Transport;
