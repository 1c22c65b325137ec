//! Fuzz target for the `key=value` payload encoder.
//!
//! Run with: cargo +nightly fuzz run fuzz_kv_encoder
//!
//! The first byte picks a capacity; the rest is split on NUL into tokens.
//! A truncated payload must be a prefix of the full one and fit its capacity.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logctl_core::{KvEncoder, OverflowPolicy};

fuzz_target!(|data: &[u8]| {
    let Some((&cap, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let tokens: Vec<&str> = text.split('\0').filter(|t| !t.is_empty()).collect();

    let full = KvEncoder::new(usize::MAX, OverflowPolicy::Fail).encode(&tokens);
    let cut = KvEncoder::new(cap as usize, OverflowPolicy::Truncate).encode(&tokens);
    match (full, cut) {
        (Ok(full), Ok(cut)) => {
            assert!(cut.as_str().len() <= cap as usize);
            assert!(full.as_str().starts_with(cut.as_str()));
            assert_eq!(cut.is_truncated(), full.as_str().len() > cap as usize);
        }
        (Err(a), Err(b)) => assert_eq!(a, b),
        _ => panic!("encoders disagree on token validity"),
    }
});
