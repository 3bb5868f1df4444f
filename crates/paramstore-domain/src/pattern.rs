//! Shell-style matching of parameter names.
//!
//! `*` matches any run of characters other than `/`, `?` matches one
//! character other than `/`, and `[...]` matches a character class
//! (`[!...]` or `[^...]` negates). `\` escapes the next character.

use regex::Regex;
use thiserror::Error;

/// Errors compiling a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unterminated character class in pattern: {pattern}")]
    UnterminatedClass { pattern: String },

    #[error("trailing escape in pattern: {pattern}")]
    TrailingEscape { pattern: String },

    #[error("invalid pattern {pattern}: {message}")]
    Invalid { pattern: String, message: String },
}

/// A compiled name pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let mut out = String::with_capacity(pattern.len() * 2 + 2);
        out.push('^');

        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '*' => out.push_str("[^/]*"),
                '?' => out.push_str("[^/]"),
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| PatternError::TrailingEscape {
                        pattern: pattern.to_string(),
                    })?;
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
                '[' => {
                    let mut class = String::from("[");
                    let mut first = true;
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            ']' if !first => {
                                closed = true;
                                break;
                            }
                            '!' | '^' if first => class.push('^'),
                            '\\' | '[' | '&' | '~' => {
                                class.push('\\');
                                class.push(c);
                            }
                            _ => class.push(c),
                        }
                        first = false;
                    }
                    if !closed {
                        return Err(PatternError::UnterminatedClass {
                            pattern: pattern.to_string(),
                        });
                    }
                    class.push(']');
                    out.push_str(&class);
                }
                other => out.push_str(&regex::escape(&other.to_string())),
            }
        }
        out.push('$');

        let regex = Regex::new(&out).map_err(|e| PatternError::Invalid {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
