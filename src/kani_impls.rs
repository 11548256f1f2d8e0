//! Kani proof harnesses for the byte-level building blocks of the parser
//! and the canonicalizer.
//!
//! # Usage
//!
//! Kani is not a Cargo dependency. Install and run with:
//!
//! ```bash
//! cargo install --locked kani-verifier
//! cargo kani setup
//! cargo kani --features kani
//! ```
//!
//! This module is only compiled when using Kani (`#[cfg(kani)]`).

use crate::grammar::{Production, hex_value, is_unreserved};
use crate::normalize::{builtin, remove_dot_segments};
use crate::parser::is_ipv4_address;

/// Characters that exercise every branch of dot-segment removal.
const PATH_CHARS: &[u8] = b"./a";

fn arbitrary_path(max_len: usize) -> String {
    let len: usize = kani::any();
    let len = len % (max_len + 1);
    (0..len)
        .map(|_| {
            let idx: usize = kani::any();
            PATH_CHARS[idx % PATH_CHARS.len()] as char
        })
        .collect()
}

fn arbitrary_hex_digit() -> u8 {
    let b: u8 = kani::any();
    kani::assume(b.is_ascii_hexdigit());
    b
}

#[kani::proof]
#[kani::unwind(5)]
fn proof_hex_value_matches_to_digit() {
    let b: u8 = kani::any();
    let expected = char::from(b).to_digit(16).and_then(|d| u8::try_from(d).ok());
    assert_eq!(hex_value(b), expected);
}

#[kani::proof]
#[kani::unwind(8)]
fn proof_remove_dot_segments_never_grows() {
    let path = arbitrary_path(6);
    let out = remove_dot_segments(&path);
    assert!(out.len() <= path.len());
}

#[kani::proof]
#[kani::unwind(8)]
fn proof_remove_dot_segments_idempotent_on_absolute_paths() {
    let path = format!("/{}", arbitrary_path(5));
    let once = remove_dot_segments(&path);
    assert_eq!(remove_dot_segments(&once), once);
}

#[kani::proof]
#[kani::unwind(4)]
fn proof_pct_triplet_rule() {
    let hi = arbitrary_hex_digit();
    let lo = arbitrary_hex_digit();
    let triplet = String::from_utf8(vec![b'%', hi, lo]).unwrap();
    let out = builtin(Production::PctEncoded, triplet);

    let octet = (hex_value(hi).unwrap() << 4) | hex_value(lo).unwrap();
    if is_unreserved(octet) {
        assert_eq!(out.as_bytes(), &[octet]);
    } else {
        assert_eq!(out.len(), 3);
        assert!(!out.bytes().any(|b| b.is_ascii_lowercase()));
        assert_eq!(builtin(Production::PctEncoded, out.clone()), out);
    }
}

#[kani::proof]
#[kani::unwind(5)]
fn proof_single_octet_classification() {
    let n: u8 = kani::any();
    let text = format!("{n}.0.0.1");
    assert!(is_ipv4_address(&text));
    let padded = format!("0{n}.0.0.1");
    assert!(!is_ipv4_address(&padded));
}
