//! Kernel ABI for the `AF_ALG` user-space interface.
//!
//! Mirrors `<linux/if_alg.h>`. The values are fixed by the kernel ABI, so
//! they are spelled out here instead of depending on which of them a given
//! `libc` release happens to export.

use std::os::raw::{c_int, c_uint};

/// `AF_ALG` address family.
pub const AF_ALG: c_int = 38;

/// `SOL_ALG` socket option / control message level.
pub const SOL_ALG: c_int = 279;

/// Set the key of an algorithm socket.
pub const ALG_SET_KEY: c_int = 1;
/// Control message: initialization vector (`struct af_alg_iv`).
pub const ALG_SET_IV: c_int = 2;
/// Control message: operation (`ALG_OP_*`).
pub const ALG_SET_OP: c_int = 3;
/// Control message: AEAD associated data length.
pub const ALG_SET_AEAD_ASSOCLEN: c_int = 4;
/// Set the AEAD authentication tag size.
pub const ALG_SET_AEAD_AUTHSIZE: c_int = 5;

/// `ALG_SET_OP` value for decryption.
pub const ALG_OP_DECRYPT: c_uint = 0;
/// `ALG_SET_OP` value for encryption.
pub const ALG_OP_ENCRYPT: c_uint = 1;

/// `salg_feat`/`salg_mask` bit selecting asynchronous implementations.
pub const CRYPTO_ALG_ASYNC: u32 = 0x0000_0080;

/// Size of `sockaddr_alg::salg_type`.
pub const SALG_TYPE_LEN: usize = 14;
/// Size of `sockaddr_alg::salg_name`.
pub const SALG_NAME_LEN: usize = 64;

/// `struct sockaddr_alg`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SockaddrAlg {
    /// Always `AF_ALG`.
    pub salg_family: libc::sa_family_t,
    /// NUL-padded algorithm type.
    pub salg_type: [u8; SALG_TYPE_LEN],
    /// Required algorithm feature bits.
    pub salg_feat: u32,
    /// Mask applied to `salg_feat`.
    pub salg_mask: u32,
    /// NUL-padded algorithm name.
    pub salg_name: [u8; SALG_NAME_LEN],
}

impl Default for SockaddrAlg {
    fn default() -> Self {
        Self {
            salg_family: AF_ALG as libc::sa_family_t,
            salg_type: [0; SALG_TYPE_LEN],
            salg_feat: 0,
            salg_mask: 0,
            salg_name: [0; SALG_NAME_LEN],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sockaddr_alg_layout() {
        // 2 (family) + 14 (type) + 4 (feat) + 4 (mask) + 64 (name)
        assert_eq!(std::mem::size_of::<SockaddrAlg>(), 88);
        assert_eq!(std::mem::offset_of!(SockaddrAlg, salg_feat), 16);
        assert_eq!(std::mem::offset_of!(SockaddrAlg, salg_name), 24);
    }

    #[test]
    fn test_constants_match_libc() {
        assert_eq!(AF_ALG, libc::AF_ALG);
    }
}
