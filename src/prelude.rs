//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use uri_grammar::prelude::*;
//!
//! let uri = Uri::parse("http://192.0.2.16/").unwrap();
//! assert!(matches!(uri.host_kind(), Some(Host::Ipv4(_))));
//! ```

pub use crate::{
    // Core types
    Host, Normalizer, Production, Uri,
    // Errors
    CoercionError, HookError, ParseError, ParseErrorKind,
};
