//! Main URI reference type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::{CoercionError, ParseError, ParseErrorKind};
use crate::host::Host;
use crate::normalize::Normalizer;
use crate::parser;
use crate::reducer::{Fields, Mode, Reducer};

/// A parsed URI reference: either an absolute URI or a relative reference.
///
/// Every field holds the text matched by the corresponding production,
/// exactly as written. The value never changes after parsing;
/// [`canonical`](Self::canonical) and [`normalized`](Self::normalized)
/// produce new values.
///
/// # Structure
///
/// ```text
///   foo://example.com:8042/over/there?name=ferret#nose
///   \_/   \______________/\_________/ \_________/ \__/
///    |           |            |            |        |
/// scheme     authority       path        query   fragment
/// ```
///
/// # Examples
///
/// ```
/// use uri_grammar::Uri;
///
/// let uri = Uri::parse("foo://example.com:8042/over/there?name=ferret#nose").unwrap();
/// assert_eq!(uri.scheme(), Some("foo"));
/// assert_eq!(uri.authority(), Some("example.com:8042"));
/// assert_eq!(uri.reg_name(), Some("example.com"));
/// assert_eq!(uri.port(), Some("8042"));
/// assert_eq!(uri.path(), "/over/there");
/// assert_eq!(uri.query(), Some("name=ferret"));
/// assert_eq!(uri.fragment(), Some("nose"));
/// assert!(!uri.is_absolute());
///
/// let uri = Uri::parse("ldap://[2001:db8::7]/c=GB?objectClass?one").unwrap();
/// assert_eq!(uri.ip_literal(), Some("2001:db8::7"));
/// assert_eq!(uri.zone_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    original: String,
    scheme: Option<String>,
    hier_part: Option<String>,
    relative_part: Option<String>,
    authority: Option<String>,
    userinfo: Option<String>,
    host: Option<String>,
    port: Option<String>,
    ip_literal: Option<String>,
    zone_id: Option<String>,
    ipv4_address: Option<String>,
    reg_name: Option<String>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Uri {
    /// Parses a URI reference.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` with [`ParseErrorKind::Syntax`] if the input
    /// does not match `URI-reference`. No partial result is produced.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let fields = reduce(input, Mode::Plain)?;
        Ok(Self::from_fields(input.to_string(), fields))
    }

    /// Parses a URI reference, taking ownership of the text.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn new(input: impl Into<String>) -> Result<Self, ParseError> {
        let input = input.into();
        let fields = reduce(&input, Mode::Plain)?;
        Ok(Self::from_fields(input, fields))
    }

    /// Interprets `bytes` as text and parses it.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` with [`ParseErrorKind::Coercion`] if `bytes` is
    /// not UTF-8, before any parsing is attempted; otherwise fails as
    /// [`parse`](Self::parse) does.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let input = std::str::from_utf8(bytes).map_err(|e| ParseError {
            input: String::from_utf8_lossy(bytes).into_owned(),
            kind: ParseErrorKind::Coercion(CoercionError::NotUtf8 {
                valid_up_to: e.valid_up_to(),
            }),
        })?;
        Self::parse(input)
    }

    /// Returns the reference exactly as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Returns the scheme; absent for relative references.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Returns the `hier-part`; set exactly when a scheme is present.
    #[must_use]
    pub fn hier_part(&self) -> Option<&str> {
        self.hier_part.as_deref()
    }

    /// Returns the `relative-part`; set exactly when no scheme is present.
    #[must_use]
    pub fn relative_part(&self) -> Option<&str> {
        self.relative_part.as_deref()
    }

    /// Returns the authority, which may be empty (`file:///x`).
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Returns the userinfo, without the trailing `@`.
    #[must_use]
    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    /// Returns the host text as written, brackets included for IP literals.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the port digits. The grammar puts no bound on their value
    /// and allows an empty port.
    #[must_use]
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Returns the text inside an IP literal's brackets, without any zone
    /// identifier.
    #[must_use]
    pub fn ip_literal(&self) -> Option<&str> {
        self.ip_literal.as_deref()
    }

    /// Returns the IPv6 zone identifier (RFC 6874), still percent-encoded.
    #[must_use]
    pub fn zone_id(&self) -> Option<&str> {
        self.zone_id.as_deref()
    }

    /// Returns the host if it matched `IPv4address`.
    #[must_use]
    pub fn ipv4_address(&self) -> Option<&str> {
        self.ipv4_address.as_deref()
    }

    /// Returns the host if it matched `reg-name`.
    #[must_use]
    pub fn reg_name(&self) -> Option<&str> {
        self.reg_name.as_deref()
    }

    /// Returns the path, which is always present and may be empty.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the fragment, without the leading `#`.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns true if this is an RFC 3986 `absolute-URI`: a scheme and a
    /// `hier-part` are present and there is no fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_grammar::Uri;
    ///
    /// assert!(Uri::parse("http://localhost/").unwrap().is_absolute());
    /// assert!(Uri::parse("urn:example:animal:ferret:nose").unwrap().is_absolute());
    /// assert!(!Uri::parse("http://localhost/#top").unwrap().is_absolute());
    /// assert!(!Uri::parse("/relative").unwrap().is_absolute());
    /// ```
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.scheme.is_some() && self.hier_part.is_some() && self.fragment.is_none()
    }

    /// Returns true if the reference matched `relative-ref`.
    #[must_use]
    pub const fn is_relative_reference(&self) -> bool {
        self.relative_part.is_some()
    }

    /// Returns the host classified by the alternative it matched.
    #[must_use]
    pub fn host_kind(&self) -> Option<Host<'_>> {
        if let Some(address) = &self.ipv4_address {
            return address.parse::<Ipv4Addr>().ok().map(Host::Ipv4);
        }
        if let Some(name) = &self.reg_name {
            return Some(Host::RegName(name));
        }
        let literal = self.ip_literal.as_deref()?;
        if literal.starts_with(['v', 'V']) {
            return Some(Host::IpvFuture(literal));
        }
        literal.parse::<Ipv6Addr>().ok().map(|address| Host::Ipv6 {
            address,
            zone_id: self.zone_id.as_deref(),
        })
    }

    /// Returns the canonical form using only the built-in rules:
    /// percent-triplet normalization and dot-segment removal.
    ///
    /// The scheme and host are not lower-cased; register hooks and use
    /// [`canonical_with`](Self::canonical_with) for that.
    ///
    /// # Errors
    ///
    /// The reference is re-parsed and fails exactly as [`parse`](Self::parse)
    /// would, which cannot happen for a value obtained from it.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_grammar::Uri;
    ///
    /// let uri = Uri::parse("HTTP://Example.com/a/b/c/./../../g?%7e%2a").unwrap();
    /// assert_eq!(uri.canonical().unwrap(), "HTTP://Example.com/a/g?~%2A");
    /// ```
    pub fn canonical(&self) -> Result<String, ParseError> {
        self.canonical_with(&Normalizer::default())
    }

    /// Returns the canonical form, applying `normalizer`'s hooks after the
    /// built-in rules.
    ///
    /// # Errors
    ///
    /// Same as [`canonical`](Self::canonical).
    pub fn canonical_with(&self, normalizer: &Normalizer) -> Result<String, ParseError> {
        canonical_with(&self.original, normalizer)
    }

    /// Returns a new value parsed from [`canonical`](Self::canonical).
    ///
    /// # Errors
    ///
    /// Same as [`canonical`](Self::canonical).
    pub fn normalized(&self) -> Result<Self, ParseError> {
        self.normalized_with(&Normalizer::default())
    }

    /// Returns a new value parsed from [`canonical_with`](Self::canonical_with).
    ///
    /// # Errors
    ///
    /// Fails if the hooks produce text that no longer matches the grammar.
    pub fn normalized_with(&self, normalizer: &Normalizer) -> Result<Self, ParseError> {
        Self::new(self.canonical_with(normalizer)?)
    }

    fn from_fields(original: String, fields: Fields) -> Self {
        debug_assert!(fields.hier_part.is_some() != fields.relative_part.is_some());
        Self {
            original,
            scheme: fields.scheme,
            hier_part: fields.hier_part,
            relative_part: fields.relative_part,
            authority: fields.authority,
            userinfo: fields.userinfo,
            host: fields.host,
            port: fields.port,
            ip_literal: fields.ip_literal,
            zone_id: fields.zone_id,
            ipv4_address: fields.ipv4_address,
            reg_name: fields.reg_name,
            path: fields.path,
            query: fields.query,
            fragment: fields.fragment,
        }
    }
}

/// Parses `input` as a URI reference. Shorthand for [`Uri::parse`].
///
/// # Errors
///
/// Same as [`Uri::parse`].
pub fn parse(input: &str) -> Result<Uri, ParseError> {
    Uri::parse(input)
}

/// Returns the canonical form of `input` using only the built-in rules.
///
/// # Errors
///
/// Fails exactly as [`Uri::parse`] does.
///
/// # Examples
///
/// ```
/// assert_eq!(uri_grammar::canonical("/a/b/c/./../../g").unwrap(), "/a/g");
/// assert_eq!(uri_grammar::canonical("mid/content=5/../6").unwrap(), "mid/6");
/// assert!(uri_grammar::canonical("http://invalid##").is_err());
/// ```
pub fn canonical(input: &str) -> Result<String, ParseError> {
    canonical_with(input, &Normalizer::default())
}

/// Returns the canonical form of `input`, applying `normalizer`'s hooks.
///
/// # Errors
///
/// Fails exactly as [`Uri::parse`] does.
pub fn canonical_with(input: &str, normalizer: &Normalizer) -> Result<String, ParseError> {
    tracing::trace!(len = input.len(), hooks = normalizer.hook_count(), "canonicalizing");
    Ok(reduce(input, Mode::Normalizing(normalizer))?.reference)
}

/// One pass of the pipeline: parse, then reduce in `mode`.
fn reduce(input: &str, mode: Mode<'_>) -> Result<Fields, ParseError> {
    let derivation = parser::parse(input).map_err(|kind| ParseError {
        input: input.to_string(),
        kind,
    })?;
    Ok(Reducer::new(&derivation, mode).reduce())
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl FromStr for Uri {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.original
    }
}

impl TryFrom<&str> for Uri {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uri {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&[u8]> for Uri {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.original.hash(state);
    }
}

impl PartialOrd for Uri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.original.cmp(&other.original)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.original)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
