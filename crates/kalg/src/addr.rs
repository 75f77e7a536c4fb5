//! Algorithm specifiers and their `sockaddr_alg` encoding.

use std::fmt;

use crate::error::AlgError;
use crate::sys::{SALG_NAME_LEN, SALG_TYPE_LEN, SockaddrAlg};

/// An algorithm to bind to: type, name and the optional feature/mask bits.
///
/// The type is one of the kernel's algorithm classes (`"hash"`,
/// `"skcipher"`, `"aead"`, `"rng"`, ...) and the name is a crypto API
/// driver or algorithm name such as `"sha256"` or `"xts(aes)"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlgSpec {
    alg_type: String,
    name: String,
    feat: u32,
    mask: u32,
}

impl AlgSpec {
    /// Create a specifier with feature and mask bits cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AlgError::InvalidSpec`] if either string contains a NUL
    /// byte or doesn't fit in `sockaddr_alg` together with its terminator.
    pub fn new(alg_type: &str, name: &str) -> Result<Self, AlgError> {
        check_field("type", alg_type, SALG_TYPE_LEN)?;
        check_field("name", name, SALG_NAME_LEN)?;

        Ok(Self {
            alg_type: alg_type.to_string(),
            name: name.to_string(),
            feat: 0,
            mask: 0,
        })
    }

    /// Set the `salg_feat` and `salg_mask` bits.
    pub fn with_feat_mask(mut self, feat: u32, mask: u32) -> Self {
        self.feat = feat;
        self.mask = mask;
        self
    }

    /// Algorithm type
    pub fn alg_type(&self) -> &str {
        &self.alg_type
    }

    /// Algorithm name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required feature bits
    pub fn feat(&self) -> u32 {
        self.feat
    }

    /// Feature mask
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Encode as the kernel's binding address.
    pub fn to_sockaddr(&self) -> SockaddrAlg {
        let mut addr = SockaddrAlg {
            salg_feat: self.feat,
            salg_mask: self.mask,
            ..Default::default()
        };

        // Lengths were checked in `new`, the remainder stays NUL.
        addr.salg_type[..self.alg_type.len()].copy_from_slice(self.alg_type.as_bytes());
        addr.salg_name[..self.name.len()].copy_from_slice(self.name.as_bytes());
        addr
    }
}

impl fmt::Display for AlgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} algorithm '{}'", self.alg_type, self.name)
    }
}

fn check_field(what: &str, value: &str, cap: usize) -> Result<(), AlgError> {
    if value.is_empty() {
        return Err(AlgError::InvalidSpec(format!("empty algorithm {what}")));
    }

    if value.bytes().any(|b| b == 0) {
        return Err(AlgError::InvalidSpec(format!(
            "algorithm {what} {value:?} contains a NUL byte"
        )));
    }

    if value.len() >= cap {
        return Err(AlgError::InvalidSpec(format!(
            "algorithm {what} {value:?} is {} bytes, limit is {}",
            value.len(),
            cap - 1
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::AF_ALG;

    #[test]
    fn test_spec_to_sockaddr() {
        let spec = AlgSpec::new("skcipher", "xts(aes)")
            .unwrap()
            .with_feat_mask(0x8, 0xc);
        let addr = spec.to_sockaddr();

        assert_eq!(i32::from(addr.salg_family), AF_ALG);
        assert_eq!(&addr.salg_type[..8], b"skcipher");
        assert!(addr.salg_type[8..].iter().all(|&b| b == 0));
        assert_eq!(&addr.salg_name[..8], b"xts(aes)");
        assert!(addr.salg_name[8..].iter().all(|&b| b == 0));
        assert_eq!(addr.salg_feat, 0x8);
        assert_eq!(addr.salg_mask, 0xc);
    }

    #[test]
    fn test_spec_limits() {
        // 13 bytes of type and 63 of name still leave room for the NUL
        let max_type = "t".repeat(SALG_TYPE_LEN - 1);
        let max_name = "n".repeat(SALG_NAME_LEN - 1);
        assert!(AlgSpec::new(&max_type, &max_name).is_ok());

        let long_type = "t".repeat(SALG_TYPE_LEN);
        assert!(matches!(
            AlgSpec::new(&long_type, "sha256"),
            Err(AlgError::InvalidSpec(_))
        ));

        let long_name = "n".repeat(SALG_NAME_LEN);
        assert!(AlgSpec::new("hash", &long_name).is_err());
    }

    #[test]
    fn test_spec_rejects_nul_and_empty() {
        assert!(AlgSpec::new("hash", "sha\0256").is_err());
        assert!(AlgSpec::new("", "sha256").is_err());
        assert!(AlgSpec::new("hash", "").is_err());
    }

    #[test]
    fn test_spec_display() {
        let spec = AlgSpec::new("aead", "gcm(aes)").unwrap();
        assert_eq!(spec.to_string(), "aead algorithm 'gcm(aes)'");
    }
}
