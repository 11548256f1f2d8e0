//! Recursive-descent engine for `URI-reference`.
//!
//! The engine walks the input once, left to right, and records the span of
//! every component it matches in a [`Derivation`]. It never backtracks past
//! a committed component: the only grammar ambiguities are local and are
//! settled by [`classify_host`] and [`Parser::ipv6_address`].
//!
//! All grammar characters are ASCII, so every recorded span boundary falls
//! on a `char` boundary of the input.

use std::ops::Range;

use crate::constants::{
    AUTHORITY_PREFIX, IPV4_GROUP_WIDTH, IPV6_GROUPS, MAX_H16_DIGITS, ZONE_ID_DELIMITER,
};
use crate::error::ParseErrorKind;
use crate::grammar::{
    Production, hex_value, is_ipvfuture_char, is_pchar_literal, is_query_literal,
    is_reg_name_literal, is_scheme_char, is_unreserved, is_userinfo_literal,
};

/// Byte range into the parsed input.
pub(crate) type Span = Range<usize>;

/// The single derivation of a successfully parsed reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Derivation<'a> {
    pub(crate) input: &'a str,
    /// Present for the `URI` branch, absent for `relative-ref`.
    pub(crate) scheme: Option<Span>,
    /// Span of `hier-part` or `relative-part`.
    pub(crate) part: Span,
    pub(crate) authority: Option<AuthorityNode>,
    pub(crate) path: PathNode,
    pub(crate) query: Option<Span>,
    pub(crate) fragment: Option<Span>,
}

impl<'a> Derivation<'a> {
    /// Returns the input text covered by `span`.
    pub(crate) fn text(&self, span: &Span) -> &'a str {
        &self.input[span.clone()]
    }

    /// Returns true if the reference matched the `relative-ref` branch.
    pub(crate) const fn is_relative(&self) -> bool {
        self.scheme.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthorityNode {
    pub(crate) span: Span,
    pub(crate) userinfo: Option<Span>,
    pub(crate) host: HostNode,
    pub(crate) port: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HostNode {
    pub(crate) span: Span,
    pub(crate) kind: HostKind,
}

/// Which `host` alternative matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostKind {
    IpLiteral {
        /// Text between the brackets, without any zone suffix.
        address: Span,
        form: LiteralForm,
        zone_id: Option<Span>,
    },
    Ipv4,
    RegName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralForm {
    Ipv6,
    IpvFuture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathNode {
    /// One of the five `path-*` productions.
    pub(crate) production: Production,
    pub(crate) span: Span,
}

/// Parses `input` against `URI-reference`.
///
/// # Errors
///
/// Returns [`ParseErrorKind::Syntax`] with the position where no
/// production could continue.
pub(crate) fn parse(input: &str) -> Result<Derivation<'_>, ParseErrorKind> {
    tracing::trace!(len = input.len(), "parsing URI reference");
    Parser::new(input).uri_reference().map_err(|m| {
        tracing::debug!(
            position = m.position,
            expected = %m.expected,
            "rejected URI reference"
        );
        ParseErrorKind::Syntax {
            position: m.position,
            expected: m.expected,
        }
    })
}

/// Host tie-break: text matching `IPv4address` is always IPv4, even though
/// `reg-name` would accept it as well.
pub(crate) fn classify_host(text: &str) -> HostKind {
    if is_ipv4_address(text) {
        HostKind::Ipv4
    } else {
        HostKind::RegName
    }
}

/// Returns true if `text` is exactly `dec-octet "." dec-octet "." dec-octet "." dec-octet`.
pub(crate) fn is_ipv4_address(text: &str) -> bool {
    let mut octets = 0;
    for octet in text.split('.') {
        if !is_dec_octet(octet.as_bytes()) {
            return false;
        }
        octets += 1;
    }
    octets == 4
}

/// `dec-octet`: 0-9, 10-99, 100-199, 200-249, 250-255 with no leading zeros.
const fn is_dec_octet(octet: &[u8]) -> bool {
    matches!(
        octet,
        [b'0'..=b'9']
            | [b'1'..=b'9', b'0'..=b'9']
            | [b'1', b'0'..=b'9', b'0'..=b'9']
            | [b'2', b'0'..=b'4', b'0'..=b'9']
            | [b'2', b'5', b'0'..=b'5']
    )
}

/// Point where the derivation could not continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mismatch {
    position: usize,
    expected: Production,
}

type Step<T> = Result<T, Mismatch>;

/// Cursor over the input. One instance per parse call.
struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..].starts_with(prefix.as_bytes())
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn fail<T>(&self, expected: Production) -> Step<T> {
        Err(Mismatch {
            position: self.pos,
            expected,
        })
    }

    /// `URI-reference = URI / relative-ref`
    ///
    /// A leading `scheme ":"` commits to `URI`: `relative-ref` cannot start
    /// that way because `path-noscheme` forbids a colon in its first segment.
    fn uri_reference(mut self) -> Step<Derivation<'a>> {
        let scheme = self.scheme();
        let absolute = scheme.is_some();

        let start = self.pos;
        let (authority, path) = self.hierarchical_part(absolute)?;
        let part = start..self.pos;

        let query = if self.eat(b'?') {
            Some(self.query_or_fragment()?)
        } else {
            None
        };
        let fragment = if self.eat(b'#') {
            Some(self.query_or_fragment()?)
        } else {
            None
        };

        if self.pos != self.bytes.len() {
            let expected = if fragment.is_some() {
                Production::Fragment
            } else if query.is_some() {
                Production::Query
            } else if path.production == Production::PathEmpty {
                if absolute {
                    Production::HierPart
                } else {
                    Production::RelativePart
                }
            } else {
                path.production
            };
            return self.fail(expected);
        }

        Ok(Derivation {
            input: self.input,
            scheme,
            part,
            authority,
            path,
            query,
            fragment,
        })
    }

    /// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )` followed by `":"`.
    ///
    /// Leaves the cursor untouched when no scheme prefix is present.
    fn scheme(&mut self) -> Option<Span> {
        if !self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            return None;
        }
        let end = self.bytes[self.pos..]
            .iter()
            .position(|&b| !is_scheme_char(b))
            .map_or(self.bytes.len(), |i| self.pos + i);
        if self.bytes.get(end) != Some(&b':') {
            return None;
        }
        let span = self.pos..end;
        self.pos = end + 1;
        Some(span)
    }

    /// `hier-part` when `absolute`, otherwise `relative-part`.
    fn hierarchical_part(&mut self, absolute: bool) -> Step<(Option<AuthorityNode>, PathNode)> {
        if self.starts_with(AUTHORITY_PREFIX) {
            self.pos += AUTHORITY_PREFIX.len();
            let authority = self.authority()?;
            let path = self.path(Production::PathAbempty)?;
            return Ok((Some(authority), path));
        }

        let production = match self.peek() {
            Some(b'/') => Production::PathAbsolute,
            Some(b) if b == b'%' || is_pchar_literal(b) => {
                if absolute {
                    Production::PathRootless
                } else {
                    Production::PathNoscheme
                }
            }
            _ => Production::PathEmpty,
        };
        Ok((None, self.path(production)?))
    }

    /// `authority = [ userinfo "@" ] host [ ":" port ]`
    ///
    /// The authority ends at the first `/`, `?` or `#`; none of its
    /// sub-components can contain those characters.
    fn authority(&mut self) -> Step<AuthorityNode> {
        let start = self.pos;
        let end = self.bytes[start..]
            .iter()
            .position(|&b| matches!(b, b'/' | b'?' | b'#'))
            .map_or(self.bytes.len(), |i| start + i);

        let userinfo = match self.bytes[start..end].iter().position(|&b| b == b'@') {
            Some(at) => {
                let span = self.run(start + at, Production::Userinfo, is_userinfo_literal)?;
                self.pos += 1;
                Some(span)
            }
            None => None,
        };

        let host = self.host(end)?;

        let port = if self.eat(b':') {
            let port_start = self.pos;
            while self.pos < end && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            Some(port_start..self.pos)
        } else {
            None
        };

        if self.pos != end {
            let expected = if port.is_some() {
                Production::Port
            } else {
                Production::Authority
            };
            return self.fail(expected);
        }

        Ok(AuthorityNode {
            span: start..end,
            userinfo,
            host,
            port,
        })
    }

    /// `host = IP-literal / IPv4address / reg-name`
    fn host(&mut self, authority_end: usize) -> Step<HostNode> {
        let start = self.pos;
        if self.peek() == Some(b'[') {
            let kind = self.ip_literal()?;
            return Ok(HostNode {
                span: start..self.pos,
                kind,
            });
        }

        let end = self.bytes[start..authority_end]
            .iter()
            .position(|&b| b == b':')
            .map_or(authority_end, |i| start + i);
        let kind = classify_host(&self.input[start..end]);
        if kind == HostKind::Ipv4 {
            self.pos = end;
        } else {
            self.run(end, Production::RegName, is_reg_name_literal)?;
        }
        Ok(HostNode {
            span: start..end,
            kind,
        })
    }

    /// `IP-literal = "[" ( IPv6address / IPv6addrz / IPvFuture ) "]"`
    fn ip_literal(&mut self) -> Step<HostKind> {
        self.pos += 1;

        let (address, form) = if matches!(self.peek(), Some(b'v' | b'V')) {
            (self.ipvfuture()?, LiteralForm::IpvFuture)
        } else {
            (self.ipv6_address()?, LiteralForm::Ipv6)
        };

        let zone_id = if form == LiteralForm::Ipv6 && self.starts_with(ZONE_ID_DELIMITER) {
            self.pos += ZONE_ID_DELIMITER.len();
            let zone_start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'%' {
                    self.pct_encoded()?;
                } else if is_unreserved(b) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.pos == zone_start {
                return self.fail(Production::ZoneId);
            }
            Some(zone_start..self.pos)
        } else {
            None
        };

        if !self.eat(b']') {
            return self.fail(Production::IpLiteral);
        }

        Ok(HostKind::IpLiteral {
            address,
            form,
            zone_id,
        })
    }

    /// `IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" )`
    fn ipvfuture(&mut self) -> Step<Span> {
        let start = self.pos;
        self.pos += 1;

        let version_start = self.pos;
        while self.peek().and_then(hex_value).is_some() {
            self.pos += 1;
        }
        if self.pos == version_start || !self.eat(b'.') {
            return self.fail(Production::IpvFuture);
        }

        let body_start = self.pos;
        while self.peek().is_some_and(is_ipvfuture_char) {
            self.pos += 1;
        }
        if self.pos == body_start {
            return self.fail(Production::IpvFuture);
        }
        Ok(start..self.pos)
    }

    /// `IPv6address`, all nine `::` compression forms.
    ///
    /// Compression tie-break: explicit `h16` groups are consumed greedily,
    /// left to right, so every group before the `::` is matched before any
    /// group after it. This yields the unique reading of a compressed
    /// address. Without `::` the explicit groups must total 8; with `::` at
    /// most 7, leaving at least one implied zero group. A trailing
    /// `IPv4address` counts as two groups.
    fn ipv6_address(&mut self) -> Step<Span> {
        let start = self.pos;
        let mut groups = 0;
        let mut compressed = false;
        let mut need_group = false;

        if self.starts_with("::") {
            self.pos += 2;
            compressed = true;
        }

        loop {
            if !self.peek().is_some_and(|b| hex_value(b).is_some()) {
                if need_group {
                    return self.fail(Production::H16);
                }
                break;
            }

            if self.dotted_quad_ahead() {
                let quad_start = self.pos;
                while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b'.') {
                    self.pos += 1;
                }
                if !is_ipv4_address(&self.input[quad_start..self.pos]) {
                    self.pos = quad_start;
                    return self.fail(Production::Ipv4Address);
                }
                groups += IPV4_GROUP_WIDTH;
                break;
            }

            self.h16()?;
            groups += 1;
            need_group = false;
            if groups > IPV6_GROUPS {
                return self.fail(Production::Ipv6Address);
            }

            if self.starts_with("::") {
                if compressed {
                    return self.fail(Production::Ipv6Address);
                }
                self.pos += 2;
                compressed = true;
            } else if self.eat(b':') {
                need_group = true;
            } else {
                break;
            }
        }

        let complete = if compressed {
            groups < IPV6_GROUPS
        } else {
            groups == IPV6_GROUPS
        };
        if !complete {
            return self.fail(Production::Ipv6Address);
        }
        Ok(start..self.pos)
    }

    /// Returns true if the next run of hex digits and dots contains a dot,
    /// i.e. an `ls32` written as `IPv4address` starts here.
    fn dotted_quad_ahead(&self) -> bool {
        self.bytes[self.pos..]
            .iter()
            .take_while(|&&b| b == b'.' || hex_value(b).is_some())
            .any(|&b| b == b'.')
    }

    /// `h16 = 1*4HEXDIG`
    fn h16(&mut self) -> Step<()> {
        let start = self.pos;
        while self.peek().and_then(hex_value).is_some() {
            if self.pos - start == MAX_H16_DIGITS {
                return self.fail(Production::H16);
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// One of the `path-*` productions. The caller has already chosen the
    /// alternative from the first character.
    fn path(&mut self, production: Production) -> Step<PathNode> {
        let start = self.pos;
        let mut first_segment = true;

        while let Some(b) = self.peek() {
            match b {
                b'/' => {
                    first_segment = false;
                    self.pos += 1;
                }
                b'%' => self.pct_encoded()?,
                b':' if first_segment && production == Production::PathNoscheme => {
                    return self.fail(Production::SegmentNzNc);
                }
                b if is_pchar_literal(b) => self.pos += 1,
                _ => break,
            }
        }

        debug_assert!(production != Production::PathEmpty || self.pos == start);
        Ok(PathNode {
            production,
            span: start..self.pos,
        })
    }

    /// `query` or `fragment`: `*( pchar / "/" / "?" )`.
    fn query_or_fragment(&mut self) -> Step<Span> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'%' {
                self.pct_encoded()?;
            } else if is_query_literal(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(start..self.pos)
    }

    /// Consumes `literal` characters and `pct-encoded` triplets up to `end`.
    /// Anything else before `end` fails with `production`.
    fn run(&mut self, end: usize, production: Production, literal: fn(u8) -> bool) -> Step<Span> {
        let start = self.pos;
        while self.pos < end {
            let b = self.bytes[self.pos];
            if b == b'%' {
                self.pct_encoded()?;
            } else if literal(b) {
                self.pos += 1;
            } else {
                return self.fail(production);
            }
        }
        Ok(start..self.pos)
    }

    /// `pct-encoded = "%" HEXDIG HEXDIG`
    fn pct_encoded(&mut self) -> Step<()> {
        debug_assert_eq!(self.peek(), Some(b'%'));
        for offset in 1..=2 {
            if self.peek_at(offset).and_then(hex_value).is_none() {
                self.pos += offset;
                return self.fail(Production::PctEncoded);
            }
        }
        self.pos += 3;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(input: &str) -> Derivation<'_> {
        parse(input).unwrap()
    }

    fn mismatch(input: &str) -> (usize, Production) {
        match parse(input) {
            Err(ParseErrorKind::Syntax { position, expected }) => (position, expected),
            other => panic!("expected syntax error for {input:?}, got {other:?}"),
        }
    }

    fn ipv6(text: &str) -> bool {
        let mut parser = Parser::new(text);
        parser.ipv6_address().is_ok() && parser.pos == text.len()
    }

    #[test]
    fn uri_branch_components() {
        let d = derive("foo://example.com:8042/over/there?name=ferret#nose");
        assert_eq!(d.text(d.scheme.as_ref().unwrap()), "foo");
        assert_eq!(d.text(&d.part), "//example.com:8042/over/there");
        let authority = d.authority.as_ref().unwrap();
        assert_eq!(d.text(&authority.span), "example.com:8042");
        assert_eq!(d.text(&authority.host.span), "example.com");
        assert_eq!(authority.host.kind, HostKind::RegName);
        assert_eq!(d.text(authority.port.as_ref().unwrap()), "8042");
        assert_eq!(d.path.production, Production::PathAbempty);
        assert_eq!(d.text(&d.path.span), "/over/there");
        assert_eq!(d.text(d.query.as_ref().unwrap()), "name=ferret");
        assert_eq!(d.text(d.fragment.as_ref().unwrap()), "nose");
    }

    #[test]
    fn path_alternatives() {
        assert_eq!(derive("urn:a:b").path.production, Production::PathRootless);
        assert_eq!(derive("foo:/a").path.production, Production::PathAbsolute);
        assert_eq!(derive("foo:").path.production, Production::PathEmpty);
        assert_eq!(derive("a/b").path.production, Production::PathNoscheme);
        assert_eq!(derive("/a/b").path.production, Production::PathAbsolute);
        assert_eq!(derive("?q").path.production, Production::PathEmpty);
        assert_eq!(derive("").path.production, Production::PathEmpty);
    }

    #[test]
    fn scheme_prefix_commits_to_uri() {
        assert!(!derive("a+b.c-d:x").is_relative());
        assert!(derive("./a:b").is_relative());
        assert!(derive("//host").is_relative());
    }

    #[test]
    fn colon_in_first_relative_segment_fails() {
        assert_eq!(mismatch("1a:b"), (2, Production::SegmentNzNc));
        assert_eq!(mismatch(":foo"), (0, Production::SegmentNzNc));
    }

    #[test]
    fn trailing_hash_fails() {
        assert_eq!(mismatch("http://invalid##"), (15, Production::Fragment));
    }

    #[test]
    fn bad_percent_triplet_reports_offending_digit() {
        assert_eq!(mismatch("/a%4g"), (4, Production::PctEncoded));
        assert_eq!(mismatch("/a%"), (3, Production::PctEncoded));
    }

    #[test]
    fn non_ascii_fails() {
        assert_eq!(mismatch("/caf\u{e9}"), (4, Production::PathAbsolute));
        assert_eq!(mismatch("http://exa mple"), (10, Production::RegName));
    }

    #[test]
    fn host_classification() {
        assert_eq!(classify_host("192.0.2.16"), HostKind::Ipv4);
        assert_eq!(classify_host("256.0.0.1"), HostKind::RegName);
        assert_eq!(classify_host("1.2.3.04"), HostKind::RegName);
        assert_eq!(classify_host("1.2.3"), HostKind::RegName);
        assert_eq!(classify_host("1.2.3.4.5"), HostKind::RegName);
        assert_eq!(classify_host(""), HostKind::RegName);
    }

    #[test]
    fn dec_octet_ranges() {
        for ok in ["0", "9", "10", "99", "100", "199", "200", "249", "250", "255"] {
            assert!(is_dec_octet(ok.as_bytes()), "{ok}");
        }
        for bad in ["", "00", "01", "256", "260", "300", "1000", "a"] {
            assert!(!is_dec_octet(bad.as_bytes()), "{bad}");
        }
    }

    #[test]
    fn ipv6_forms() {
        for ok in [
            "1:2:3:4:5:6:7:8",
            "1:2:3:4:5:6:1.2.3.4",
            "::",
            "::1",
            "1::",
            "2001:db8::7",
            "::ffff:192.0.2.1",
            "1:2:3:4:5:6:7::",
            "::2:3:4:5:6:7:8",
            "1:2:3:4:5::1.2.3.4",
            "fe80::a",
            "ABCD:ef01::",
        ] {
            assert!(ipv6(ok), "{ok}");
        }
        for bad in [
            "1:2:3:4:5:6:7",
            "1:2:3:4:5:6:7:8:9",
            "1:2:3:4:5:6:7:8::",
            "1::2::3",
            "12345::",
            ":1::",
            "1:",
            "1:2:3:4:5:6::1.2.3.4",
            "::256.1.1.1",
            "1:2:3:4:5:6:7:1.2.3.4",
        ] {
            assert!(!ipv6(bad), "{bad}");
        }
    }

    #[test]
    fn ip_literal_with_zone() {
        let d = derive("http://[fe80::a%25eth0]/");
        let host = &d.authority.as_ref().unwrap().host;
        assert_eq!(d.text(&host.span), "[fe80::a%25eth0]");
        match &host.kind {
            HostKind::IpLiteral {
                address,
                form,
                zone_id,
            } => {
                assert_eq!(d.text(address), "fe80::a");
                assert_eq!(*form, LiteralForm::Ipv6);
                assert_eq!(d.text(zone_id.as_ref().unwrap()), "eth0");
            }
            other => panic!("unexpected host {other:?}"),
        }
    }

    #[test]
    fn zone_requires_encoded_percent() {
        assert_eq!(mismatch("http://[fe80::a%eth0]"), (15, Production::IpLiteral));
        assert_eq!(mismatch("http://[fe80::a%25]"), (18, Production::ZoneId));
    }

    #[test]
    fn ipvfuture_literal() {
        let d = derive("//[v7.fe:80]:1");
        match &d.authority.as_ref().unwrap().host.kind {
            HostKind::IpLiteral { address, form, .. } => {
                assert_eq!(d.text(address), "v7.fe:80");
                assert_eq!(*form, LiteralForm::IpvFuture);
            }
            other => panic!("unexpected host {other:?}"),
        }
        assert_eq!(mismatch("//[v.x]"), (4, Production::IpvFuture));
    }

    #[test]
    fn userinfo_and_port() {
        let d = derive("ftp://user:pw@host:21");
        let authority = d.authority.as_ref().unwrap();
        assert_eq!(d.text(authority.userinfo.as_ref().unwrap()), "user:pw");
        assert_eq!(d.text(authority.port.as_ref().unwrap()), "21");

        let d = derive("http://host:/");
        assert_eq!(d.text(d.authority.as_ref().unwrap().port.as_ref().unwrap()), "");
    }

    #[test]
    fn authority_errors() {
        assert_eq!(mismatch("http://a@b@c/"), (10, Production::RegName));
        assert_eq!(mismatch("http://host:8x"), (13, Production::Port));
        assert_eq!(mismatch("http://[::1]x"), (12, Production::Authority));
        assert_eq!(mismatch("http://[::1"), (11, Production::IpLiteral));
    }

    #[test]
    fn empty_authority() {
        let d = derive("file:///etc/hosts");
        let authority = d.authority.as_ref().unwrap();
        assert!(authority.span.is_empty());
        assert_eq!(authority.host.kind, HostKind::RegName);
        assert_eq!(d.text(&d.path.span), "/etc/hosts");
    }
}
