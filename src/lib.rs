//! Parser, validator, and canonicalizer for RFC 3986 URI references.
//!
//! This crate recognizes the complete `URI-reference` grammar of RFC 3986
//! Appendix A, extended with IPv6 zone identifiers from RFC 6874, and
//! decomposes a reference into its named components.
//!
//! # Overview
//!
//! A URI reference is either an absolute URI or a relative reference:
//!
//! ```text
//! URI-reference = URI / relative-ref
//! URI           = scheme ":" hier-part [ "?" query ] [ "#" fragment ]
//! relative-ref  = relative-part [ "?" query ] [ "#" fragment ]
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use uri_grammar::Uri;
//!
//! let uri = Uri::parse("foo://user@example.com:8042/over/there?name=ferret#nose").unwrap();
//!
//! assert_eq!(uri.scheme(), Some("foo"));
//! assert_eq!(uri.userinfo(), Some("user"));
//! assert_eq!(uri.host(), Some("example.com"));
//! assert_eq!(uri.port(), Some("8042"));
//! assert_eq!(uri.path(), "/over/there");
//! assert_eq!(uri.fragment(), Some("nose"));
//!
//! // Relative references parse too; the empty string is one.
//! let rel = Uri::parse("../g?y").unwrap();
//! assert!(rel.is_relative_reference());
//! ```
//!
//! # Canonical Form
//!
//! [`Uri::canonical`] rebuilds the reference bottom-up, upper-casing the hex
//! digits of percent triplets, decoding triplets of unreserved characters,
//! and removing dot segments from the path. Nothing else changes: the scheme
//! and host keep their case unless a hook registered on a [`Normalizer`]
//! folds them.
//!
//! ```rust
//! use uri_grammar::{Normalizer, Production, Uri};
//!
//! let uri = Uri::parse("HTTP://Example.COM/a/./b/../c%7e").unwrap();
//! assert_eq!(uri.canonical().unwrap(), "HTTP://Example.COM/a/c~");
//!
//! let mut normalizer = Normalizer::new();
//! normalizer
//!     .register_scheme_hook(Production::Scheme, |s| s.to_ascii_lowercase())
//!     .unwrap()
//!     .register_protocol_hook(Production::RegName, |h| h.to_ascii_lowercase())
//!     .unwrap();
//! assert_eq!(uri.canonical_with(&normalizer).unwrap(), "http://example.com/a/c~");
//! ```
//!
//! # Host Classification
//!
//! A host that matches `IPv4address` is always reported as an IPv4 address,
//! never as a registered name. Anything else made of digits and dots, such
//! as `256.0.0.1`, is a registered name.
//!
//! # Grammar Specification
//!
//! The grammar is written out in `grammar.abnf` at the crate root, in RFC 5234
//! ABNF. Every rule name there is a [`Production`].
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Uri`] as a string.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod constants;
mod error;
mod grammar;
mod host;
#[cfg(kani)]
mod kani_impls;
mod normalize;
mod parser;
pub mod prelude;
mod reducer;
mod uri;

pub use constants::{
    AUTHORITY_PREFIX, FRAGMENT_DELIMITER, IPV4_GROUP_WIDTH, IPV6_GROUPS, MAX_H16_DIGITS,
    PORT_DELIMITER, QUERY_DELIMITER, SCHEME_DELIMITER, SUB_DELIMS, UNRESERVED_MARKS,
    USERINFO_DELIMITER, ZONE_ID_DELIMITER,
};
pub use error::{CoercionError, HookError, ParseError, ParseErrorKind};
pub use grammar::Production;
pub use host::Host;
pub use normalize::{Hook, Normalizer, remove_dot_segments};
pub use uri::{Uri, canonical, canonical_with, parse};
