//! `SOL_ALG` control messages sent alongside request data.
//!
//! Each `sendmsg` on a request socket can carry up to three control
//! messages, in this order:
//!
//! | Type | Payload | Present when |
//! |------|---------|--------------|
//! | `ALG_SET_OP` | `u32` (`ALG_OP_ENCRYPT` / `ALG_OP_DECRYPT`) | an operation is set |
//! | `ALG_SET_IV` | `struct af_alg_iv { u32 ivlen; u8 iv[]; }` | the IV is non-empty |
//! | `ALG_SET_AEAD_ASSOCLEN` | `u32` | assoclen > 0 |

use std::mem;
use std::os::raw::{c_int, c_uint};
use std::ptr;

use tracing::trace;

use crate::error::AlgError;
use crate::sys::{
    ALG_OP_DECRYPT, ALG_OP_ENCRYPT, ALG_SET_AEAD_ASSOCLEN, ALG_SET_IV, ALG_SET_OP, SOL_ALG,
};

/// Longest IV that still leaves the control message length arithmetic in
/// range.
pub const MAX_IV_LEN: usize = (c_uint::MAX / 2) as usize;

/// Direction of a cipher operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgOp {
    /// `ALG_OP_ENCRYPT`
    Encrypt,
    /// `ALG_OP_DECRYPT`
    Decrypt,
}

impl AlgOp {
    /// Kernel value for `ALG_SET_OP`.
    pub fn as_raw(self) -> u32 {
        match self {
            Self::Encrypt => ALG_OP_ENCRYPT,
            Self::Decrypt => ALG_OP_DECRYPT,
        }
    }

    /// Inverse of [`as_raw`](Self::as_raw).
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            ALG_OP_ENCRYPT => Some(Self::Encrypt),
            ALG_OP_DECRYPT => Some(Self::Decrypt),
            _ => None,
        }
    }
}

/// The control data for one `sendmsg` on a request socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlEnvelope<'a> {
    op: Option<AlgOp>,
    iv: &'a [u8],
    assoclen: u32,
    flags: c_int,
}

impl<'a> ControlEnvelope<'a> {
    /// An envelope with no control messages and no flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an envelope from independent encrypt/decrypt switches.
    ///
    /// # Errors
    ///
    /// [`AlgError::InvalidEnvelope`] if both `encrypt` and `decrypt` are set
    /// or the IV is too long.
    pub fn from_parts(
        encrypt: bool,
        decrypt: bool,
        iv: &'a [u8],
        assoclen: u32,
        flags: c_int,
    ) -> Result<Self, AlgError> {
        let op = match (encrypt, decrypt) {
            (true, true) => {
                return Err(AlgError::InvalidEnvelope(
                    "encrypt and decrypt are mutually exclusive".into(),
                ));
            }
            (true, false) => Some(AlgOp::Encrypt),
            (false, true) => Some(AlgOp::Decrypt),
            (false, false) => None,
        };

        Ok(Self::new()
            .with_op(op)
            .with_iv(iv)?
            .with_assoclen(assoclen)
            .with_flags(flags))
    }

    /// Request encryption.
    pub fn encrypt(self) -> Self {
        self.with_op(Some(AlgOp::Encrypt))
    }

    /// Request decryption.
    pub fn decrypt(self) -> Self {
        self.with_op(Some(AlgOp::Decrypt))
    }

    /// Set or clear the operation.
    pub fn with_op(mut self, op: Option<AlgOp>) -> Self {
        self.op = op;
        self
    }

    /// Set the IV. An empty IV sends no `ALG_SET_IV` message.
    ///
    /// # Errors
    ///
    /// [`AlgError::InvalidEnvelope`] if `iv` is longer than [`MAX_IV_LEN`].
    pub fn with_iv(mut self, iv: &'a [u8]) -> Result<Self, AlgError> {
        if iv.len() > MAX_IV_LEN {
            return Err(AlgError::InvalidEnvelope(format!(
                "IV of {} bytes exceeds {MAX_IV_LEN}",
                iv.len()
            )));
        }
        self.iv = iv;
        Ok(self)
    }

    /// Set the AEAD associated data length. 0 sends no
    /// `ALG_SET_AEAD_ASSOCLEN` message.
    pub fn with_assoclen(mut self, assoclen: u32) -> Self {
        self.assoclen = assoclen;
        self
    }

    /// Set the `sendmsg` flags word.
    pub fn with_flags(mut self, flags: c_int) -> Self {
        self.flags = flags;
        self
    }

    /// Operation, if any
    pub fn op(&self) -> Option<AlgOp> {
        self.op
    }

    /// IV bytes (empty when unset)
    pub fn iv(&self) -> &'a [u8] {
        self.iv
    }

    /// AEAD associated data length
    pub fn assoclen(&self) -> u32 {
        self.assoclen
    }

    /// `sendmsg` flags
    pub fn flags(&self) -> c_int {
        self.flags
    }

    /// Encode the control messages into an ancillary data buffer.
    pub fn encode(&self) -> EncodedControl {
        let mut payloads: Vec<(c_int, Vec<u8>)> = Vec::with_capacity(3);

        if let Some(op) = self.op {
            payloads.push((ALG_SET_OP, op.as_raw().to_ne_bytes().to_vec()));
        }

        if !self.iv.is_empty() {
            // struct af_alg_iv
            let mut iv = Vec::with_capacity(mem::size_of::<u32>() + self.iv.len());
            // Bounded by MAX_IV_LEN in `with_iv`.
            iv.extend_from_slice(&(self.iv.len() as u32).to_ne_bytes());
            iv.extend_from_slice(self.iv);
            payloads.push((ALG_SET_IV, iv));
        }

        if self.assoclen > 0 {
            payloads.push((ALG_SET_AEAD_ASSOCLEN, self.assoclen.to_ne_bytes().to_vec()));
        }

        let total = payloads.iter().map(|(_, p)| cmsg_space(p.len())).sum();
        let mut buf = vec![0u8; total];
        let mut off = 0;
        for (ty, payload) in &payloads {
            write_entry(&mut buf[off..], *ty, payload);
            off += cmsg_space(payload.len());
        }

        trace!(
            op = ?self.op,
            ivlen = self.iv.len(),
            assoclen = self.assoclen,
            controllen = buf.len(),
            "encoded AF_ALG control data"
        );
        EncodedControl { buf }
    }
}

/// One decoded control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEntry {
    /// `ALG_SET_OP` with its raw value
    Op(u32),
    /// `ALG_SET_IV` with the IV bytes
    Iv(Vec<u8>),
    /// `ALG_SET_AEAD_ASSOCLEN`
    AssocLen(u32),
    /// Anything this crate doesn't produce
    Other {
        /// `cmsg_level`
        level: c_int,
        /// `cmsg_type`
        ty: c_int,
        /// Payload bytes
        data: Vec<u8>,
    },
}

/// An encoded ancillary data buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedControl {
    buf: Vec<u8>,
}

impl EncodedControl {
    /// Raw bytes for `msg_control`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// `true` when no control message is present.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Decode the buffer back into its messages.
    ///
    /// Decoding stops at the first malformed header.
    pub fn entries(&self) -> Vec<ControlEntry> {
        let hdr_len = cmsg_len(0);
        let mut entries = Vec::new();
        let mut off = 0;

        while let Some(rest) = self.buf.get(off..) {
            if rest.len() < hdr_len {
                break;
            }
            // SAFETY: `rest` holds at least `hdr_len >= size_of::<cmsghdr>()`
            // bytes and the read makes no alignment assumption.
            let hdr: libc::cmsghdr = unsafe { ptr::read_unaligned(rest.as_ptr().cast()) };
            let len = hdr.cmsg_len as usize;
            let Some(data) = rest.get(hdr_len..len) else {
                break;
            };

            entries.push(decode_entry(hdr.cmsg_level, hdr.cmsg_type, data));
            off += cmsg_space(len - hdr_len);
        }

        entries
    }
}

fn decode_entry(level: c_int, ty: c_int, data: &[u8]) -> ControlEntry {
    let other = || ControlEntry::Other {
        level,
        ty,
        data: data.to_vec(),
    };
    if level != SOL_ALG {
        return other();
    }

    match ty {
        ALG_SET_OP => read_u32(data).map_or_else(other, ControlEntry::Op),
        ALG_SET_AEAD_ASSOCLEN => read_u32(data).map_or_else(other, ControlEntry::AssocLen),
        ALG_SET_IV => {
            let iv = read_u32(data)
                .and_then(|ivlen| data.get(4..4 + ivlen as usize))
                .map(|iv| ControlEntry::Iv(iv.to_vec()));
            iv.unwrap_or_else(other)
        }
        _ => other(),
    }
}

fn read_u32(data: &[u8]) -> Option<u32> {
    let bytes = data.get(..4)?.try_into().ok()?;
    Some(u32::from_ne_bytes(bytes))
}

/// Write one `cmsghdr` plus payload at the start of `buf`.
fn write_entry(buf: &mut [u8], ty: c_int, payload: &[u8]) {
    let hdr_len = cmsg_len(0);

    // SAFETY: an all-zero cmsghdr is valid; the fields are set below.
    let mut hdr: libc::cmsghdr = unsafe { mem::zeroed() };
    hdr.cmsg_len = cmsg_len(payload.len()) as _;
    hdr.cmsg_level = SOL_ALG;
    hdr.cmsg_type = ty;

    let dst = &mut buf[..hdr_len];
    // SAFETY: `dst` is `hdr_len >= size_of::<cmsghdr>()` bytes long and the
    // write makes no alignment assumption.
    unsafe { ptr::write_unaligned(dst.as_mut_ptr().cast::<libc::cmsghdr>(), hdr) };
    buf[hdr_len..hdr_len + payload.len()].copy_from_slice(payload);
}

fn cmsg_len(len: usize) -> usize {
    // SAFETY: CMSG_LEN is pure arithmetic; `len` is bounded by MAX_IV_LEN
    // plus a small header, so it fits a c_uint without overflowing.
    unsafe { libc::CMSG_LEN(len as c_uint) as usize }
}

fn cmsg_space(len: usize) -> usize {
    // SAFETY: as for `cmsg_len`.
    unsafe { libc::CMSG_SPACE(len as c_uint) as usize }
}
