//! Property-based tests for KALG
//!
//! Uses proptest to check the control-message encoder and address encoding
//! over large input spaces.

use proptest::prelude::*;

// ============================================================================
// Control Envelope Properties
// ============================================================================

mod envelope_properties {
    use super::*;
    use kalg::{AlgOp, ControlEntry, ControlEnvelope};

    fn cmsg_space(len: usize) -> usize {
        // SAFETY: pure arithmetic on a small length.
        unsafe { libc::CMSG_SPACE(len as libc::c_uint) as usize }
    }

    fn op_strategy() -> impl Strategy<Value = Option<AlgOp>> {
        prop_oneof![
            Just(None),
            Just(Some(AlgOp::Encrypt)),
            Just(Some(AlgOp::Decrypt)),
        ]
    }

    proptest! {
        /// Every requested entry is present, in order, with exact contents
        #[test]
        fn envelope_entries_match_request(
            op in op_strategy(),
            iv in prop::collection::vec(any::<u8>(), 0..64),
            assoclen in any::<u32>(),
        ) {
            let envelope = ControlEnvelope::new()
                .with_op(op)
                .with_iv(&iv)
                .unwrap()
                .with_assoclen(assoclen);
            let control = envelope.encode();

            let mut expected = Vec::new();
            let mut size = 0;
            if let Some(op) = op {
                expected.push(ControlEntry::Op(op.as_raw()));
                size += cmsg_space(4);
            }
            if !iv.is_empty() {
                expected.push(ControlEntry::Iv(iv.clone()));
                size += cmsg_space(4 + iv.len());
            }
            if assoclen > 0 {
                expected.push(ControlEntry::AssocLen(assoclen));
                size += cmsg_space(4);
            }

            prop_assert_eq!(control.entries(), expected);
            prop_assert_eq!(control.as_bytes().len(), size);
        }

        /// IV entries carry exactly the IV, byte for byte
        #[test]
        fn iv_entry_is_exact(iv in prop::collection::vec(any::<u8>(), 1..256)) {
            let control = ControlEnvelope::new().with_iv(&iv).unwrap().encode();
            let entries = control.entries();

            prop_assert_eq!(entries.len(), 1);
            match &entries[0] {
                ControlEntry::Iv(sent) => {
                    prop_assert_eq!(sent.len(), iv.len());
                    prop_assert_eq!(sent, &iv);
                }
                other => prop_assert!(false, "unexpected entry {:?}", other),
            }
        }

        /// from_parts accepts everything except encrypt+decrypt together
        #[test]
        fn from_parts_rejects_only_both(encrypt in any::<bool>(), decrypt in any::<bool>()) {
            let result = ControlEnvelope::from_parts(encrypt, decrypt, &[], 0, 0);
            prop_assert_eq!(result.is_err(), encrypt && decrypt);
        }
    }
}

// ============================================================================
// Address Properties
// ============================================================================

mod address_properties {
    use super::*;
    use kalg::AlgSpec;
    use kalg::sys::{SALG_NAME_LEN, SALG_TYPE_LEN};

    proptest! {
        /// Valid specifiers are copied into sockaddr_alg NUL-padded
        #[test]
        fn sockaddr_is_nul_padded(
            alg_type in "[a-z]{1,13}",
            name in "[a-z0-9()-]{1,63}",
            feat in any::<u32>(),
            mask in any::<u32>(),
        ) {
            let spec = AlgSpec::new(&alg_type, &name).unwrap().with_feat_mask(feat, mask);
            let addr = spec.to_sockaddr();

            prop_assert_eq!(&addr.salg_type[..alg_type.len()], alg_type.as_bytes());
            prop_assert!(addr.salg_type[alg_type.len()..].iter().all(|&b| b == 0));
            prop_assert_eq!(&addr.salg_name[..name.len()], name.as_bytes());
            prop_assert!(addr.salg_name[name.len()..].iter().all(|&b| b == 0));
            prop_assert_eq!(addr.salg_feat, feat);
            prop_assert_eq!(addr.salg_mask, mask);
        }

        /// Anything that leaves no room for the terminator is rejected
        #[test]
        fn oversized_names_are_rejected(extra in 0usize..32) {
            let long_type = "t".repeat(SALG_TYPE_LEN + extra);
            let long_name = "n".repeat(SALG_NAME_LEN + extra);
            prop_assert!(AlgSpec::new(&long_type, "sha256").is_err());
            prop_assert!(AlgSpec::new("hash", &long_name).is_err());
        }
    }
}

// ============================================================================
// Key Material Properties
// ============================================================================

mod key_properties {
    use super::*;
    use kalg::KeyMaterial;

    proptest! {
        /// Random keys have the requested length, zero means no key
        #[test]
        fn random_key_length(len in 0usize..512) {
            let key = KeyMaterial::Random(len).resolve();
            prop_assert_eq!(key.as_ref().map_or(0, |k| k.len()), len);
            prop_assert_eq!(key.is_none(), len == 0);
        }
    }
}
