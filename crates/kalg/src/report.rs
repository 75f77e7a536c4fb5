//! Test result reporting.
//!
//! The helpers in this crate return errors; a test framework decides what
//! an error means for the test. [`Reporter`] is that framework seen from
//! here: `res` records a result and lets the test continue, `brk` records
//! that the test is being aborted.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::{error, info, warn};

/// Outcome category of a reported result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The check passed
    Pass,
    /// The check failed
    Fail,
    /// The test or its environment is broken
    Broken,
    /// Something unexpected that doesn't fail the test
    Warn,
    /// The test doesn't apply to this system (skip)
    Conf,
    /// Informational message
    Info,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Pass => "TPASS",
            Self::Fail => "TFAIL",
            Self::Broken => "TBROK",
            Self::Warn => "TWARN",
            Self::Conf => "TCONF",
            Self::Info => "TINFO",
        };
        f.write_str(tag)
    }
}

/// Sink for test results.
pub trait Reporter {
    /// Record a result; the test goes on.
    fn res(&self, verdict: Verdict, msg: &str);

    /// Record that the test is aborting with `verdict`.
    ///
    /// Callers return an error right after this, so nothing else runs.
    fn brk(&self, verdict: Verdict, msg: &str);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn res(&self, verdict: Verdict, msg: &str) {
        (**self).res(verdict, msg);
    }

    fn brk(&self, verdict: Verdict, msg: &str) {
        (**self).brk(verdict, msg);
    }
}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn res(&self, verdict: Verdict, msg: &str) {
        match verdict {
            Verdict::Fail | Verdict::Broken => error!(%verdict, "{msg}"),
            Verdict::Warn => warn!(%verdict, "{msg}"),
            _ => info!(%verdict, "{msg}"),
        }
    }

    fn brk(&self, verdict: Verdict, msg: &str) {
        match verdict {
            Verdict::Conf => info!(%verdict, "aborting test: {msg}"),
            _ => error!(%verdict, "aborting test: {msg}"),
        }
    }
}

/// A recorded call to a [`Reporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// `res(verdict, msg)`
    Result(Verdict, String),
    /// `brk(verdict, msg)`
    Abort(Verdict, String),
}

/// Keeps every report in memory, for tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in order.
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Only the `res` calls.
    pub fn results(&self) -> Vec<(Verdict, String)> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Result(v, m) => Some((v, m)),
                Report::Abort(..) => None,
            })
            .collect()
    }

    /// Only the `brk` calls.
    pub fn aborts(&self) -> Vec<(Verdict, String)> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Abort(v, m) => Some((v, m)),
                Report::Result(..) => None,
            })
            .collect()
    }

    fn push(&self, report: Report) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }
}

impl Reporter for RecordingReporter {
    fn res(&self, verdict: Verdict, msg: &str) {
        self.push(Report::Result(verdict, msg.to_string()));
    }

    fn brk(&self, verdict: Verdict, msg: &str) {
        self.push(Report::Abort(verdict, msg.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Conf.to_string(), "TCONF");
        assert_eq!(Verdict::Broken.to_string(), "TBROK");
    }

    #[test]
    fn test_recording_reporter() {
        let rec = RecordingReporter::new();
        let by_ref = &rec;

        by_ref.res(Verdict::Info, "hello");
        by_ref.brk(Verdict::Conf, "skip");

        assert_eq!(
            rec.reports(),
            vec![
                Report::Result(Verdict::Info, "hello".into()),
                Report::Abort(Verdict::Conf, "skip".into()),
            ]
        );
        assert_eq!(rec.results().len(), 1);
        assert_eq!(rec.aborts(), vec![(Verdict::Conf, "skip".into())]);
    }

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingReporter.res(Verdict::Pass, "ok");
        TracingReporter.brk(Verdict::Broken, "broken");
    }
}
