//! Bottom-up reduction of a [`Derivation`] into URI fields.
//!
//! Every named production is reduced to text by concatenating its already
//! reduced children. In plain mode that reproduces the matched input; in
//! normalizing mode each production's text passes through the
//! [`Normalizer`] before its parent sees it, so composite fields such as
//! `authority` reflect the normalization of their parts.
//!
//! The value under construction lives in the [`Reducer`], which is created
//! per call and owns it exclusively.

use crate::constants::{
    AUTHORITY_PREFIX, FRAGMENT_DELIMITER, PORT_DELIMITER, QUERY_DELIMITER, SCHEME_DELIMITER,
    USERINFO_DELIMITER, ZONE_ID_DELIMITER,
};
use crate::grammar::Production;
use crate::normalize::{Normalizer, preserve_path_reading};
use crate::parser::{AuthorityNode, Derivation, HostKind, HostNode, LiteralForm, Span};

/// Whether reduction concatenates text as matched or canonicalizes it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Mode<'n> {
    Plain,
    Normalizing(&'n Normalizer),
}

/// Reduced fields of one reference. Each optional field is assigned at
/// most once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Fields {
    pub(crate) scheme: Option<String>,
    pub(crate) hier_part: Option<String>,
    pub(crate) relative_part: Option<String>,
    pub(crate) authority: Option<String>,
    pub(crate) userinfo: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<String>,
    pub(crate) ip_literal: Option<String>,
    pub(crate) zone_id: Option<String>,
    pub(crate) ipv4_address: Option<String>,
    pub(crate) reg_name: Option<String>,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) fragment: Option<String>,
    /// The whole reduced `URI-reference`.
    pub(crate) reference: String,
}

pub(crate) struct Reducer<'a, 'n> {
    derivation: &'a Derivation<'a>,
    mode: Mode<'n>,
    fields: Fields,
}

impl<'a, 'n> Reducer<'a, 'n> {
    pub(crate) fn new(derivation: &'a Derivation<'a>, mode: Mode<'n>) -> Self {
        Self {
            derivation,
            mode,
            fields: Fields::default(),
        }
    }

    /// Reduces the whole derivation, leaves first.
    pub(crate) fn reduce(mut self) -> Fields {
        let d = self.derivation;

        if let Some(span) = &d.scheme {
            let scheme = self.rule(Production::Scheme, d.text(span).to_string());
            set(&mut self.fields.scheme, scheme);
        }

        let authority = d.authority.as_ref().map(|node| self.authority(node));
        let path = self.path();

        let mut part = String::new();
        if let Some(authority) = &authority {
            part.push_str(AUTHORITY_PREFIX);
            part.push_str(authority);
        }
        part.push_str(&path);
        let production = if d.is_relative() {
            Production::RelativePart
        } else {
            Production::HierPart
        };
        let part = self.rule(production, part);
        debug_assert!(self.is_normalizing() || part == d.text(&d.part));
        if d.is_relative() {
            set(&mut self.fields.relative_part, part);
        } else {
            set(&mut self.fields.hier_part, part);
        }

        if let Some(span) = &d.query {
            let text = self.pct_run(span);
            let query = self.rule(Production::Query, text);
            set(&mut self.fields.query, query);
        }
        if let Some(span) = &d.fragment {
            let text = self.pct_run(span);
            let fragment = self.rule(Production::Fragment, text);
            set(&mut self.fields.fragment, fragment);
        }

        let reference = self.assemble();
        let branch = if d.is_relative() {
            Production::RelativeRef
        } else {
            Production::Uri
        };
        let reference = self.rule(branch, reference);
        self.fields.reference = self.rule(Production::UriReference, reference);

        debug_assert!(self.is_normalizing() || self.fields.reference == d.input);
        self.fields
    }

    /// `[ scheme ":" ] part [ "?" query ] [ "#" fragment ]` from reduced fields.
    fn assemble(&self) -> String {
        let f = &self.fields;
        let mut out = String::with_capacity(self.derivation.input.len());
        if let Some(scheme) = &f.scheme {
            out.push_str(scheme);
            out.push(SCHEME_DELIMITER);
        }
        if let Some(part) = f.hier_part.as_ref().or(f.relative_part.as_ref()) {
            out.push_str(part);
        }
        if let Some(query) = &f.query {
            out.push(QUERY_DELIMITER);
            out.push_str(query);
        }
        if let Some(fragment) = &f.fragment {
            out.push(FRAGMENT_DELIMITER);
            out.push_str(fragment);
        }
        out
    }

    fn authority(&mut self, node: &AuthorityNode) -> String {
        let d = self.derivation;
        let mut text = String::new();

        if let Some(span) = &node.userinfo {
            let raw = self.pct_run(span);
            let userinfo = self.rule(Production::Userinfo, raw);
            text.push_str(&userinfo);
            text.push(USERINFO_DELIMITER);
            set(&mut self.fields.userinfo, userinfo);
        }

        let host = self.host(&node.host);
        text.push_str(&host);
        set(&mut self.fields.host, host);

        if let Some(span) = &node.port {
            let port = self.rule(Production::Port, d.text(span).to_string());
            text.push(PORT_DELIMITER);
            text.push_str(&port);
            set(&mut self.fields.port, port);
        }

        let authority = self.rule(Production::Authority, text);
        debug_assert!(self.is_normalizing() || authority == d.text(&node.span));
        set(&mut self.fields.authority, authority.clone());
        authority
    }

    fn host(&mut self, node: &HostNode) -> String {
        let d = self.derivation;
        let host = match &node.kind {
            HostKind::IpLiteral {
                address,
                form,
                zone_id,
            } => {
                let production = match form {
                    LiteralForm::Ipv6 => Production::Ipv6Address,
                    LiteralForm::IpvFuture => Production::IpvFuture,
                };
                let address = self.rule(production, d.text(address).to_string());
                let inner = match zone_id {
                    Some(span) => {
                        let raw = self.pct_run(span);
                        let zone = self.rule(Production::ZoneId, raw);
                        let addrz = format!("{address}{ZONE_ID_DELIMITER}{zone}");
                        set(&mut self.fields.zone_id, zone);
                        self.rule(Production::Ipv6Addrz, addrz)
                    }
                    None => address.clone(),
                };
                set(&mut self.fields.ip_literal, address);
                self.rule(Production::IpLiteral, format!("[{inner}]"))
            }
            HostKind::Ipv4 => {
                let ipv4 = self.rule(Production::Ipv4Address, d.text(&node.span).to_string());
                set(&mut self.fields.ipv4_address, ipv4.clone());
                ipv4
            }
            HostKind::RegName => {
                let raw = self.pct_run(&node.span);
                let reg_name = self.rule(Production::RegName, raw);
                set(&mut self.fields.reg_name, reg_name.clone());
                reg_name
            }
        };
        self.rule(Production::Host, host)
    }

    fn path(&mut self) -> String {
        let d = self.derivation;
        let raw = self.pct_run(&d.path.span);
        let mut path = self.rule(d.path.production, raw);
        if self.is_normalizing() {
            path = preserve_path_reading(path, d.authority.is_some(), d.scheme.is_some());
        }
        self.fields.path.clone_from(&path);
        path
    }

    /// Reduces one production's text in the current mode.
    fn rule(&self, production: Production, text: String) -> String {
        match self.mode {
            Mode::Plain => text,
            Mode::Normalizing(normalizer) => {
                normalizer.apply(production, self.fields.scheme.as_deref(), text)
            }
        }
    }

    /// Text of `span` with every `pct-encoded` triplet reduced on its own.
    fn pct_run(&self, span: &Span) -> String {
        let text = self.derivation.text(span);
        if !self.is_normalizing() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(i) = rest.find('%') {
            let Some(triplet) = rest.get(i..i + 3) else {
                break;
            };
            out.push_str(&rest[..i]);
            out.push_str(&self.rule(Production::PctEncoded, triplet.to_string()));
            rest = &rest[i + 3..];
        }
        out.push_str(rest);
        out
    }

    const fn is_normalizing(&self) -> bool {
        matches!(self.mode, Mode::Normalizing(_))
    }
}

fn set(slot: &mut Option<String>, value: String) {
    debug_assert!(slot.is_none(), "field reduced twice");
    *slot = Some(value);
}
