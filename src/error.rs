//! Error types for URI reference parsing and normalization.

use std::fmt;

use crate::grammar::Production;

/// Errors that can occur when parsing a URI reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The input that failed to parse (lossily decoded for byte input)
    pub input: String,
    /// The specific error that occurred
    pub kind: ParseErrorKind,
}

/// Specific parsing error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input could not be interpreted as text; nothing was parsed
    Coercion(CoercionError),
    /// Input does not match `URI-reference`
    Syntax {
        /// Byte offset at which no production could continue
        position: usize,
        /// Innermost production that failed at `position`
        expected: Production,
    },
}

impl ParseError {
    /// Returns the failure position for syntax errors.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self.kind {
            ParseErrorKind::Syntax { position, .. } => Some(position),
            ParseErrorKind::Coercion(_) => None,
        }
    }

    /// Returns true if the input was text but did not match the grammar.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Syntax { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse URI reference '{}': ", self.input)?;
        match &self.kind {
            ParseErrorKind::Coercion(e) => write!(f, "{e}"),
            ParseErrorKind::Syntax { position, expected } => {
                match self.input.get(*position..).and_then(|s| s.chars().next()) {
                    Some(c) => write!(
                        f,
                        "unexpected character '{c}' at position {position} while matching {expected}"
                    ),
                    None => write!(
                        f,
                        "unexpected end of input at position {position} while matching {expected}"
                    ),
                }
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Coercion(e) => Some(e),
            ParseErrorKind::Syntax { .. } => None,
        }
    }
}

/// Errors for converting constructor input into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// Byte input is not valid UTF-8
    NotUtf8 {
        /// Length of the longest valid UTF-8 prefix
        valid_up_to: usize,
    },
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8 { valid_up_to } => {
                write!(f, "input is not valid UTF-8 after byte {valid_up_to}")
            }
        }
    }
}

impl std::error::Error for CoercionError {}

/// Errors for registering normalization hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// No production has this name
    UnknownProduction {
        /// The name that was looked up
        name: String,
    },
    /// The production is folded into its parent and never reduced on its own
    NotReducible {
        /// The rejected production
        production: Production,
    },
    /// Scheme filter is not a valid `scheme`
    InvalidScheme {
        /// The rejected scheme text
        scheme: String,
    },
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProduction { name } => write!(f, "unknown grammar production '{name}'"),
            Self::NotReducible { production } => write!(
                f,
                "production '{production}' is not reduced on its own; hook its parent instead"
            ),
            Self::InvalidScheme { scheme } => {
                write!(f, "'{scheme}' is not a valid scheme name")
            }
        }
    }
}

impl std::error::Error for HookError {}
