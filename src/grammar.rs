//! Named productions and character classes of the URI grammar.
//!
//! # Grammar Reference
//!
//! The productions mirror RFC 3986 Appendix A extended with RFC 6874
//! (`IPv6addrz`, `ZoneID`). The full ABNF lives in `grammar.abnf` at the
//! crate root.

use std::fmt;
use std::str::FromStr;

use crate::constants::{SUB_DELIMS, UNRESERVED_MARKS};
use crate::error::HookError;

/// A named production of the URI grammar.
///
/// Productions identify where the parser stopped in a
/// [`ParseErrorKind::Syntax`](crate::ParseErrorKind::Syntax) error and key
/// the normalization hooks of a [`Normalizer`](crate::Normalizer).
///
/// # Examples
///
/// ```
/// use uri_grammar::Production;
///
/// let production: Production = "path-abempty".parse().unwrap();
/// assert_eq!(production, Production::PathAbempty);
/// assert_eq!(production.name(), "path-abempty");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Production {
    /// `URI-reference`
    UriReference,
    /// `URI`
    Uri,
    /// `relative-ref`
    RelativeRef,
    /// `hier-part`
    HierPart,
    /// `relative-part`
    RelativePart,
    /// `scheme`
    Scheme,
    /// `authority`
    Authority,
    /// `userinfo`
    Userinfo,
    /// `host`
    Host,
    /// `port`
    Port,
    /// `IP-literal`
    IpLiteral,
    /// `IPv6address`
    Ipv6Address,
    /// `IPv6addrz`
    Ipv6Addrz,
    /// `ZoneID`
    ZoneId,
    /// `IPvFuture`
    IpvFuture,
    /// `h16`
    H16,
    /// `ls32`
    Ls32,
    /// `IPv4address`
    Ipv4Address,
    /// `dec-octet`
    DecOctet,
    /// `reg-name`
    RegName,
    /// `path-abempty`
    PathAbempty,
    /// `path-absolute`
    PathAbsolute,
    /// `path-noscheme`
    PathNoscheme,
    /// `path-rootless`
    PathRootless,
    /// `path-empty`
    PathEmpty,
    /// `segment`
    Segment,
    /// `segment-nz`
    SegmentNz,
    /// `segment-nz-nc`
    SegmentNzNc,
    /// `pchar`
    Pchar,
    /// `query`
    Query,
    /// `fragment`
    Fragment,
    /// `pct-encoded`
    PctEncoded,
}

impl Production {
    /// Every production, in grammar order.
    pub const ALL: [Self; 32] = [
        Self::UriReference,
        Self::Uri,
        Self::RelativeRef,
        Self::HierPart,
        Self::RelativePart,
        Self::Scheme,
        Self::Authority,
        Self::Userinfo,
        Self::Host,
        Self::Port,
        Self::IpLiteral,
        Self::Ipv6Address,
        Self::Ipv6Addrz,
        Self::ZoneId,
        Self::IpvFuture,
        Self::H16,
        Self::Ls32,
        Self::Ipv4Address,
        Self::DecOctet,
        Self::RegName,
        Self::PathAbempty,
        Self::PathAbsolute,
        Self::PathNoscheme,
        Self::PathRootless,
        Self::PathEmpty,
        Self::Segment,
        Self::SegmentNz,
        Self::SegmentNzNc,
        Self::Pchar,
        Self::Query,
        Self::Fragment,
        Self::PctEncoded,
    ];

    /// Returns the rule name as written in the RFC grammar.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UriReference => "URI-reference",
            Self::Uri => "URI",
            Self::RelativeRef => "relative-ref",
            Self::HierPart => "hier-part",
            Self::RelativePart => "relative-part",
            Self::Scheme => "scheme",
            Self::Authority => "authority",
            Self::Userinfo => "userinfo",
            Self::Host => "host",
            Self::Port => "port",
            Self::IpLiteral => "IP-literal",
            Self::Ipv6Address => "IPv6address",
            Self::Ipv6Addrz => "IPv6addrz",
            Self::ZoneId => "ZoneID",
            Self::IpvFuture => "IPvFuture",
            Self::H16 => "h16",
            Self::Ls32 => "ls32",
            Self::Ipv4Address => "IPv4address",
            Self::DecOctet => "dec-octet",
            Self::RegName => "reg-name",
            Self::PathAbempty => "path-abempty",
            Self::PathAbsolute => "path-absolute",
            Self::PathNoscheme => "path-noscheme",
            Self::PathRootless => "path-rootless",
            Self::PathEmpty => "path-empty",
            Self::Segment => "segment",
            Self::SegmentNz => "segment-nz",
            Self::SegmentNzNc => "segment-nz-nc",
            Self::Pchar => "pchar",
            Self::Query => "query",
            Self::Fragment => "fragment",
            Self::PctEncoded => "pct-encoded",
        }
    }

    /// Returns true if the reducer assembles this production as a unit.
    ///
    /// Only reducible productions can carry normalization hooks. Sub-token
    /// rules such as `h16` or `segment` are folded into their parent.
    #[must_use]
    pub const fn is_reducible(self) -> bool {
        !matches!(
            self,
            Self::H16
                | Self::Ls32
                | Self::DecOctet
                | Self::Segment
                | Self::SegmentNz
                | Self::SegmentNzNc
                | Self::Pchar
        )
    }

    /// Returns true if this is one of the five `path-*` productions.
    #[must_use]
    pub const fn is_path(self) -> bool {
        matches!(
            self,
            Self::PathAbempty
                | Self::PathAbsolute
                | Self::PathNoscheme
                | Self::PathRootless
                | Self::PathEmpty
        )
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Production {
    type Err = HookError;

    /// Looks up a production by rule name. ABNF rule names are
    /// case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| HookError::UnknownProduction {
                name: s.to_string(),
            })
    }
}

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
#[must_use]
pub(crate) fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || UNRESERVED_MARKS.as_bytes().contains(&b)
}

/// `sub-delims`
#[must_use]
pub(crate) fn is_sub_delim(b: u8) -> bool {
    SUB_DELIMS.as_bytes().contains(&b)
}

/// Characters allowed after the first character of a `scheme`.
#[must_use]
pub(crate) const fn is_scheme_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')
}

/// Literal (non-`pct-encoded`) characters of `pchar`.
#[must_use]
pub(crate) fn is_pchar_literal(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || matches!(b, b':' | b'@')
}

/// Literal characters of `userinfo`.
#[must_use]
pub(crate) fn is_userinfo_literal(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || b == b':'
}

/// Literal characters of `reg-name`.
#[must_use]
pub(crate) fn is_reg_name_literal(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b)
}

/// Literal characters of `query` and `fragment`.
#[must_use]
pub(crate) fn is_query_literal(b: u8) -> bool {
    is_pchar_literal(b) || matches!(b, b'/' | b'?')
}

/// Characters of the trailing part of `IPvFuture`.
#[must_use]
pub(crate) fn is_ipvfuture_char(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || b == b':'
}

/// Decodes a single hex digit.
#[must_use]
pub(crate) const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
