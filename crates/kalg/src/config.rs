//! Socket configuration.

/// Options applied to every descriptor the crate opens.
#[derive(Debug, Clone)]
pub struct AlgConfig {
    /// Open algorithm and request sockets with close-on-exec
    pub cloexec: bool,
}

impl Default for AlgConfig {
    fn default() -> Self {
        Self { cloexec: true }
    }
}

impl AlgConfig {
    /// Flags for `accept4(2)`.
    pub(crate) fn accept_flags(&self) -> libc::c_int {
        if self.cloexec { libc::SOCK_CLOEXEC } else { 0 }
    }
}
