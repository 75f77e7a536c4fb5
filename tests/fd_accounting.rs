//! Descriptor accounting for one-shot request channel setup.
//!
//! Kept in its own test binary so no other test opens descriptors while
//! these count them.

use kalg::{AlgConfig, KeyMaterial, RequestChannel};
use kalg_integration_tests::test_helpers::{init_tracing, open_fd_count, or_skip};

#[test]
fn test_setup_request_leaves_one_descriptor() {
    init_tracing();
    let config = AlgConfig::default();

    let before = open_fd_count();
    let Some(req) = or_skip(
        RequestChannel::setup(&config, "skcipher", "xts(aes)", KeyMaterial::Random(64)),
        "xts(aes)",
    ) else {
        assert_eq!(open_fd_count(), before);
        return;
    };

    // The algorithm socket is gone, only the request socket remains.
    assert_eq!(open_fd_count(), before + 1);

    drop(req);
    assert_eq!(open_fd_count(), before);

    // Failed setups don't leak either.
    let missing = "no-such-mode(aes)";
    let err = RequestChannel::setup(&config, "skcipher", missing, KeyMaterial::Random(64))
        .unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(open_fd_count(), before);
}
