//! Key material handed to an algorithm session.

use rand::RngCore;
use zeroize::Zeroizing;

/// What key, if any, to install when setting up a session.
///
/// "No key" and "make one up" are different requests: a keyed hash
/// bound without a key refuses to hash, while a random key is fine for
/// tests that only care that the operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMaterial<'a> {
    /// Don't set a key.
    Absent,
    /// Set exactly these bytes.
    Explicit(&'a [u8]),
    /// Set a freshly generated key of this many bytes.
    Random(usize),
}

impl KeyMaterial<'_> {
    /// Length of the key that would be installed; 0 means none.
    pub fn len(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Explicit(key) => key.len(),
            Self::Random(len) => *len,
        }
    }

    /// `true` when no key would be installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve into the bytes to pass to `ALG_SET_KEY`.
    ///
    /// Returns `None` when no key should be set.
    pub fn resolve(&self) -> Option<Zeroizing<Vec<u8>>> {
        match *self {
            _ if self.is_empty() => None,
            Self::Explicit(key) => Some(Zeroizing::new(key.to_vec())),
            Self::Random(len) => Some(random_key(len)),
            Self::Absent => None,
        }
    }
}

impl<'a> From<&'a [u8]> for KeyMaterial<'a> {
    fn from(key: &'a [u8]) -> Self {
        Self::Explicit(key)
    }
}

impl<'a> From<Option<&'a [u8]>> for KeyMaterial<'a> {
    fn from(key: Option<&'a [u8]>) -> Self {
        key.map_or(Self::Absent, Self::Explicit)
    }
}

/// Generate a key of `len` bytes.
///
/// The bytes only need to vary between runs; nothing here depends on them
/// being secret.
pub fn random_key(len: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; len]);
    rand::thread_rng().fill_bytes(&mut key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_material_len() {
        assert_eq!(KeyMaterial::Absent.len(), 0);
        assert_eq!(KeyMaterial::Explicit(b"Jefe").len(), 4);
        assert_eq!(KeyMaterial::Random(64).len(), 64);
        assert!(KeyMaterial::Random(0).is_empty());
        assert!(KeyMaterial::Explicit(&[]).is_empty());
    }

    #[test]
    fn test_resolve() {
        assert!(KeyMaterial::Absent.resolve().is_none());
        assert!(KeyMaterial::Random(0).resolve().is_none());
        assert!(KeyMaterial::Explicit(&[]).resolve().is_none());

        let key = KeyMaterial::Explicit(b"Jefe").resolve().unwrap();
        assert_eq!(&key[..], b"Jefe");

        let key = KeyMaterial::Random(32).resolve().unwrap();
        assert_eq!(key.len(), 32);
    }

    #[test]
    fn test_random_keys_differ() {
        let a = random_key(32);
        let b = random_key(32);
        assert_ne!(&a[..], &b[..]);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(KeyMaterial::from(None::<&[u8]>), KeyMaterial::Absent);
        let key: &[u8] = b"k";
        assert_eq!(KeyMaterial::from(Some(key)), KeyMaterial::Explicit(b"k"));
    }
}
