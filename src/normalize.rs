//! Canonicalization rules and the normalization hook registry.
//!
//! Built-in rules, always active in normalizing mode:
//!
//! - `pct-encoded`: hex digits are upper-cased, and a triplet that decodes
//!   to an `unreserved` character is replaced by that character.
//! - `path-*`: [`remove_dot_segments`] is applied to the assembled path.
//!
//! Nothing else is rewritten. The scheme and host keep their case even
//! though RFC 3986 recommends lower-casing both; that is opt-in through
//! hooks registered on a [`Normalizer`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::HookError;
use crate::grammar::{Production, hex_value, is_scheme_char, is_unreserved};

/// A normalization function applied to the reduced text of one production.
pub type Hook = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone)]
struct ScopedHook {
    /// Lower-cased scheme filter; `None` applies to every scheme.
    scheme: Option<String>,
    hook: Hook,
}

impl ScopedHook {
    fn applies_to(&self, scheme: Option<&str>) -> bool {
        match (&self.scheme, scheme) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
            (Some(_), None) => false,
        }
    }
}

/// Registry of per-production normalization hooks.
///
/// Hooks are consulted only while canonicalizing, after the built-in rule
/// for their production, in two tiers: scheme-based hooks first, then
/// protocol-based hooks. Within a tier hooks run in registration order.
/// A scheme-based hook may be limited to one scheme; it then runs only when
/// the reference's (already reduced) scheme matches, ignoring ASCII case.
/// The scheme itself is reduced before any scheme is known, so scoped hooks
/// never apply to [`Production::Scheme`].
///
/// A `Normalizer` holds no per-parse state and can be shared across threads.
///
/// # Examples
///
/// ```
/// use uri_grammar::{Normalizer, Production, Uri};
///
/// let mut normalizer = Normalizer::new();
/// normalizer
///     .register_scheme_hook(Production::Scheme, |s| s.to_ascii_lowercase())?
///     .register_scheme_hook_for("http", Production::Authority, |a| {
///         a.strip_suffix(":80").unwrap_or(a).to_string()
///     })?
///     .register_protocol_hook_named("reg-name", |h| h.to_ascii_lowercase())?;
///
/// let uri = Uri::parse("HTTP://Example.COM:80/a/./b").unwrap();
/// assert_eq!(uri.canonical_with(&normalizer).unwrap(), "http://example.com/a/b");
/// // Without hooks only the built-in rules apply.
/// assert_eq!(uri.canonical().unwrap(), "HTTP://Example.COM:80/a/b");
/// # Ok::<(), uri_grammar::HookError>(())
/// ```
#[derive(Clone, Default)]
pub struct Normalizer {
    scheme_hooks: BTreeMap<Production, Vec<ScopedHook>>,
    protocol_hooks: BTreeMap<Production, Vec<Hook>>,
}

impl Normalizer {
    /// Creates a registry with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scheme-based hook that applies to every scheme.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::NotReducible`] if `production` is never reduced
    /// on its own.
    pub fn register_scheme_hook<F>(
        &mut self,
        production: Production,
        hook: F,
    ) -> Result<&mut Self, HookError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.insert_scheme_hook(None, production, Arc::new(hook))
    }

    /// Registers a scheme-based hook limited to references with `scheme`.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::InvalidScheme`] if `scheme` does not match the
    /// `scheme` production, or [`HookError::NotReducible`] as for
    /// [`register_scheme_hook`](Self::register_scheme_hook).
    pub fn register_scheme_hook_for<F>(
        &mut self,
        scheme: &str,
        production: Production,
        hook: F,
    ) -> Result<&mut Self, HookError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        if !is_scheme(scheme) {
            return Err(HookError::InvalidScheme {
                scheme: scheme.to_string(),
            });
        }
        self.insert_scheme_hook(Some(scheme.to_ascii_lowercase()), production, Arc::new(hook))
    }

    /// Registers a protocol-based hook.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::NotReducible`] if `production` is never reduced
    /// on its own.
    pub fn register_protocol_hook<F>(
        &mut self,
        production: Production,
        hook: F,
    ) -> Result<&mut Self, HookError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        check_reducible(production)?;
        tracing::debug!(tier = "protocol", %production, "registered normalization hook");
        self.protocol_hooks
            .entry(production)
            .or_default()
            .push(Arc::new(hook));
        Ok(self)
    }

    /// Registers a scheme-based hook by RFC rule name, e.g. `"port"`.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnknownProduction`] if no production has that
    /// name, or [`HookError::NotReducible`].
    pub fn register_scheme_hook_named<F>(
        &mut self,
        name: &str,
        hook: F,
    ) -> Result<&mut Self, HookError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.register_scheme_hook(name.parse()?, hook)
    }

    /// Registers a protocol-based hook by RFC rule name, e.g. `"reg-name"`.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnknownProduction`] if no production has that
    /// name, or [`HookError::NotReducible`].
    pub fn register_protocol_hook_named<F>(
        &mut self,
        name: &str,
        hook: F,
    ) -> Result<&mut Self, HookError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.register_protocol_hook(name.parse()?, hook)
    }

    /// Returns true if no hook is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scheme_hooks.is_empty() && self.protocol_hooks.is_empty()
    }

    /// Returns the total number of registered hooks.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.scheme_hooks.values().map(Vec::len).sum::<usize>()
            + self.protocol_hooks.values().map(Vec::len).sum::<usize>()
    }

    /// Applies the built-in rule for `production`, then the scheme tier,
    /// then the protocol tier.
    pub(crate) fn apply(
        &self,
        production: Production,
        scheme: Option<&str>,
        text: String,
    ) -> String {
        let mut text = builtin(production, text);
        if let Some(hooks) = self.scheme_hooks.get(&production) {
            for entry in hooks.iter().filter(|h| h.applies_to(scheme)) {
                text = (entry.hook)(&text);
            }
        }
        if let Some(hooks) = self.protocol_hooks.get(&production) {
            for hook in hooks {
                text = hook(&text);
            }
        }
        text
    }

    fn insert_scheme_hook(
        &mut self,
        scheme: Option<String>,
        production: Production,
        hook: Hook,
    ) -> Result<&mut Self, HookError> {
        check_reducible(production)?;
        tracing::debug!(
            tier = "scheme",
            %production,
            scheme = scheme.as_deref().unwrap_or("*"),
            "registered normalization hook"
        );
        self.scheme_hooks
            .entry(production)
            .or_default()
            .push(ScopedHook { scheme, hook });
        Ok(self)
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme: BTreeMap<_, _> = self
            .scheme_hooks
            .iter()
            .map(|(p, hooks)| {
                let scopes: Vec<_> = hooks
                    .iter()
                    .map(|h| h.scheme.as_deref().unwrap_or("*"))
                    .collect();
                (p.name(), scopes)
            })
            .collect();
        let protocol: BTreeMap<_, _> = self
            .protocol_hooks
            .iter()
            .map(|(p, hooks)| (p.name(), hooks.len()))
            .collect();
        f.debug_struct("Normalizer")
            .field("scheme_hooks", &scheme)
            .field("protocol_hooks", &protocol)
            .finish()
    }
}

fn check_reducible(production: Production) -> Result<(), HookError> {
    if production.is_reducible() {
        Ok(())
    } else {
        Err(HookError::NotReducible { production })
    }
}

fn is_scheme(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic()) && bytes.all(is_scheme_char)
}

/// Built-in canonicalization rule for `production`.
pub(crate) fn builtin(production: Production, text: String) -> String {
    match production {
        Production::PctEncoded => normalize_pct_triplet(&text).unwrap_or(text),
        p if p.is_path() => remove_dot_segments(&text),
        _ => text,
    }
}

/// Upper-cases a `%XX` triplet, or decodes it if it encodes an
/// `unreserved` character. Returns `None` for anything but a triplet.
fn normalize_pct_triplet(triplet: &str) -> Option<String> {
    let &[b'%', hi, lo] = triplet.as_bytes() else {
        return None;
    };
    let octet = (hex_value(hi)? << 4) | hex_value(lo)?;
    if is_unreserved(octet) {
        Some(char::from(octet).to_string())
    } else {
        Some(format!("%{octet:02X}"))
    }
}

/// Removes `.` and `..` segments from a path (RFC 3986 section 5.2.4).
///
/// `..` and `.` are recognized only as complete segments: `/..a` is an
/// ordinary segment.
///
/// # Examples
///
/// ```
/// use uri_grammar::remove_dot_segments;
///
/// assert_eq!(remove_dot_segments("/a/b/c/./../../g"), "/a/g");
/// assert_eq!(remove_dot_segments("mid/content=5/../6"), "mid/6");
/// assert_eq!(remove_dot_segments("../x/./y/.."), "x/");
/// ```
#[must_use]
pub fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_last_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_last_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let skip = usize::from(input.starts_with('/'));
            let end = input[skip..].find('/').map_or(input.len(), |i| skip + i);
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }

    output
}

/// Drops the last segment of `output` together with its leading `/`.
fn pop_last_segment(output: &mut String) {
    let cut = output.rfind('/').unwrap_or(0);
    output.truncate(cut);
}

/// Keeps a canonical path readable as the same production once serialized.
///
/// Without an authority a path starting with `//` would read as one, so it
/// gets a `/.` prefix. Without a scheme a first segment containing `:`
/// would read as a scheme, so it gets a `./` prefix. Both prefixes vanish
/// again under [`remove_dot_segments`].
pub(crate) fn preserve_path_reading(path: String, has_authority: bool, has_scheme: bool) -> String {
    if has_authority {
        return path;
    }
    if path.starts_with("//") {
        return format!("/.{path}");
    }
    let first_segment = path.split('/').next().unwrap_or_default();
    if !has_scheme && first_segment.contains(':') {
        return format!("./{path}");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc_dot_segment_examples() {
        assert_eq!(remove_dot_segments("/a/b/c/./../../g"), "/a/g");
        assert_eq!(remove_dot_segments("mid/content=5/../6"), "mid/6");
    }

    #[test]
    fn dot_segment_edge_cases() {
        assert_eq!(remove_dot_segments(""), "");
        assert_eq!(remove_dot_segments("."), "");
        assert_eq!(remove_dot_segments(".."), "");
        assert_eq!(remove_dot_segments("/."), "/");
        assert_eq!(remove_dot_segments("/.."), "/");
        assert_eq!(remove_dot_segments("/../../a"), "/a");
        assert_eq!(remove_dot_segments("/a/.."), "/");
        assert_eq!(remove_dot_segments("/a/b/.."), "/a/");
        assert_eq!(remove_dot_segments("a/.."), "/");
        assert_eq!(remove_dot_segments("/a/./b/"), "/a/b/");
        assert_eq!(remove_dot_segments("/..a/.b/..."), "/..a/.b/...");
        assert_eq!(remove_dot_segments("//a/../b"), "//b");
    }

    #[test]
    fn dot_removal_is_idempotent() {
        for path in ["/a/b/../c/./d", "../../x", "a/./b/../../..", "/./../.."] {
            let once = remove_dot_segments(path);
            assert_eq!(remove_dot_segments(&once), once, "{path}");
        }
    }

    #[test]
    fn pct_triplets() {
        assert_eq!(normalize_pct_triplet("%7e").as_deref(), Some("~"));
        assert_eq!(normalize_pct_triplet("%41").as_deref(), Some("A"));
        assert_eq!(normalize_pct_triplet("%2a").as_deref(), Some("%2A"));
        assert_eq!(normalize_pct_triplet("%2F").as_deref(), Some("%2F"));
        assert_eq!(normalize_pct_triplet("%c3").as_deref(), Some("%C3"));
        assert_eq!(normalize_pct_triplet("%zz"), None);
        assert_eq!(normalize_pct_triplet("%7"), None);
    }

    #[test]
    fn builtin_leaves_other_productions_alone() {
        assert_eq!(builtin(Production::Scheme, "HTTP".into()), "HTTP");
        assert_eq!(builtin(Production::RegName, "Example.COM".into()), "Example.COM");
        assert_eq!(builtin(Production::PathRootless, "a/./b".into()), "a/b");
    }

    #[test]
    fn path_reading_guards() {
        assert_eq!(preserve_path_reading("//b".into(), false, true), "/.//b");
        assert_eq!(preserve_path_reading("//b".into(), true, true), "//b");
        assert_eq!(preserve_path_reading("b:c/d".into(), false, false), "./b:c/d");
        assert_eq!(preserve_path_reading("b:c/d".into(), false, true), "b:c/d");
        assert_eq!(preserve_path_reading("b/c:d".into(), false, false), "b/c:d");
    }

    #[test]
    fn hooks_run_in_tier_order() {
        let mut normalizer = Normalizer::new();
        normalizer
            .register_protocol_hook(Production::Port, |p| format!("{p}-protocol"))
            .unwrap()
            .register_scheme_hook(Production::Port, |p| format!("{p}-scheme"))
            .unwrap()
            .register_scheme_hook_for("HTTP", Production::Port, |p| format!("{p}-http"))
            .unwrap();

        assert_eq!(
            normalizer.apply(Production::Port, Some("http"), "80".into()),
            "80-scheme-http-protocol"
        );
        assert_eq!(
            normalizer.apply(Production::Port, Some("ftp"), "21".into()),
            "21-scheme-protocol"
        );
        assert_eq!(normalizer.hook_count(), 3);
    }

    #[test]
    fn hooks_run_after_builtin_rule() {
        let mut normalizer = Normalizer::new();
        normalizer
            .register_scheme_hook(Production::PathAbsolute, |p| format!("{p}!"))
            .unwrap();
        assert_eq!(
            normalizer.apply(Production::PathAbsolute, None, "/a/../b".into()),
            "/b!"
        );
    }

    #[test]
    fn registration_is_validated() {
        let mut normalizer = Normalizer::new();
        assert_eq!(
            normalizer
                .register_scheme_hook(Production::H16, str::to_string)
                .err(),
            Some(HookError::NotReducible {
                production: Production::H16
            })
        );
        assert!(matches!(
            normalizer.register_protocol_hook_named("hostname", str::to_string),
            Err(HookError::UnknownProduction { .. })
        ));
        assert!(matches!(
            normalizer.register_scheme_hook_for("1http", Production::Port, str::to_string),
            Err(HookError::InvalidScheme { .. })
        ));
        assert!(normalizer.is_empty());
    }

    #[test]
    fn debug_lists_hooked_productions() {
        let mut normalizer = Normalizer::new();
        normalizer
            .register_scheme_hook_for("http", Production::Port, str::to_string)
            .unwrap();
        let debug = format!("{normalizer:?}");
        assert!(debug.contains("port"));
        assert!(debug.contains("http"));
    }
}
