//! Owned `AF_ALG` socket descriptors and the raw syscalls made on them.

use std::io::{self, IoSlice, Read};
use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, RawFd};
use std::os::raw::{c_int, c_void};
use std::ptr;

use socket2::{Domain, Socket, Type};

use crate::config::AlgConfig;
use crate::sys::{AF_ALG, SOL_ALG, SockaddrAlg};

/// An `AF_ALG` socket, either an algorithm socket or a request socket.
///
/// The descriptor is closed when the value is dropped.
#[derive(Debug)]
pub struct Transport {
    socket: Socket,
}

impl Transport {
    /// `socket(AF_ALG, SOCK_SEQPACKET, 0)`.
    pub(crate) fn open(config: &AlgConfig) -> io::Result<Self> {
        let domain = Domain::from(AF_ALG);
        let ty = Type::from(libc::SOCK_SEQPACKET);

        // `Socket::new` always sets close-on-exec on Linux.
        let socket = if config.cloexec {
            Socket::new(domain, ty, None)?
        } else {
            Socket::new_raw(domain, ty, None)?
        };

        Ok(Self { socket })
    }

    /// `bind(2)` to an algorithm.
    pub(crate) fn bind(&self, addr: &SockaddrAlg) -> io::Result<()> {
        // SAFETY: bind() is a standard POSIX syscall. `addr` is a live
        // `sockaddr_alg` and the length passed is exactly its size.
        let ret = unsafe {
            libc::bind(
                self.as_raw_fd(),
                ptr::from_ref(addr).cast::<libc::sockaddr>(),
                mem::size_of::<SockaddrAlg>() as libc::socklen_t,
            )
        };
        cvt(ret).map(drop)
    }

    /// `setsockopt(fd, SOL_ALG, opt, value, len)`.
    ///
    /// `value` may be empty, in which case a NULL pointer is passed and only
    /// `len` carries information (as `ALG_SET_AEAD_AUTHSIZE` expects).
    pub(crate) fn set_alg_opt(&self, opt: c_int, value: &[u8], len: usize) -> io::Result<()> {
        let optval: *const c_void = if value.is_empty() {
            ptr::null()
        } else {
            value.as_ptr().cast()
        };
        let optlen = libc::socklen_t::try_from(len)
            .map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))?;

        // SAFETY: setsockopt() is a standard POSIX syscall. `optval` is either
        // NULL or points to `value`, and callers only pass a non-empty `value`
        // together with `len == value.len()`.
        let ret = unsafe { libc::setsockopt(self.as_raw_fd(), SOL_ALG, opt, optval, optlen) };
        cvt(ret).map(drop)
    }

    /// `accept4(fd, NULL, NULL, flags)`.
    ///
    /// The kernel refuses to report a peer address for `AF_ALG` sockets, so
    /// the address arguments must be NULL.
    pub(crate) fn accept(&self, flags: c_int) -> io::Result<Self> {
        // SAFETY: accept4() is a standard Linux syscall; NULL address
        // arguments are explicitly allowed.
        let fd = unsafe {
            libc::accept4(
                self.as_raw_fd(),
                ptr::null_mut(),
                ptr::null_mut(),
                flags,
            )
        };
        let fd = cvt(fd)?;

        // SAFETY: `fd` was just returned by accept4() and is owned by nobody
        // else.
        let socket = unsafe { Socket::from_raw_fd(fd) };
        Ok(Self { socket })
    }

    /// `sendmsg(2)` with one data buffer and a raw control buffer.
    pub(crate) fn sendmsg(&self, data: &[u8], control: &[u8], flags: c_int) -> io::Result<usize> {
        let iov = [IoSlice::new(data)];

        // SAFETY: an all-zero msghdr is a valid empty message.
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        // `IoSlice` is ABI compatible with `iovec`.
        msg.msg_iov = iov.as_ptr().cast_mut().cast::<libc::iovec>();
        msg.msg_iovlen = iov.len() as _;
        if !control.is_empty() {
            msg.msg_control = control.as_ptr().cast_mut().cast::<c_void>();
            msg.msg_controllen = control.len() as _;
        }

        // SAFETY: sendmsg() is a standard POSIX syscall. Every pointer in
        // `msg` refers to `iov`, `data` or `control`, all of which outlive
        // the call, and the kernel only reads through them.
        let ret = unsafe { libc::sendmsg(self.as_raw_fd(), &msg, flags) };
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            // Non-negative, checked above.
            Ok(ret as usize)
        }
    }

    /// `read(2)`.
    pub(crate) fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.socket).read(buf)
    }

    /// Give up ownership of the underlying socket.
    pub fn into_socket(self) -> Socket {
        self.socket
    }
}

impl AsRawFd for Transport {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}

impl AsFd for Transport {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }
}

fn cvt(ret: c_int) -> io::Result<c_int> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}
