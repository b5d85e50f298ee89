//! Shell-style glob patterns.
//!
//! A glob is translated to a regular expression anchored at both ends, so it
//! must match the whole key:
//!
//! - `*` matches any run of characters (including none)
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` match one character from the class
//! - `[!abc]` matches one character not in the class
//!
//! Every other character matches itself. An unterminated `[` is a literal.
//! Matching is case-sensitive.

use regex::Regex;

use crate::error::{CacheError, CacheResult};

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob.
    ///
    /// Fails with [`CacheError::InvalidPattern`] if a bracket class does not
    /// form a valid character class (for example a reversed range `[z-a]`).
    pub fn new(pattern: &str) -> CacheResult<Self> {
        let translated = translate(pattern);
        let regex = Regex::new(&translated).map_err(|source| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns `true` if the glob matches all of `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The glob as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Translate a glob into an anchored regular expression.
pub fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 12);
    out.push_str("^(?s:");

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // Runs of stars are equivalent to one.
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut out, &chars[i..end]);
                    i = end + 1;
                }
                None => out.push_str("\\["),
            },
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    out.push_str(")\\z");
    out
}

/// Find the index of the `]` closing a class whose body starts at `start`.
///
/// A `]` directly after the opening bracket (or after `[!`) is part of the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn push_class(out: &mut String, body: &[char]) {
    out.push('[');
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };
    if negated {
        out.push('^');
    }

    let last = body.len().saturating_sub(1);
    // Set while the previous member was the upper end of a range.
    let mut closed_range = false;
    let mut in_range = false;
    for (idx, &c) in body.iter().enumerate() {
        // A dash between two members is a range, unless the member before it
        // already ended one. At either edge it is a literal.
        if c == '-' && idx != 0 && idx != last && !closed_range {
            out.push('-');
            in_range = true;
            continue;
        }
        closed_range = in_range;
        in_range = false;
        match c {
            '-' | '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push(']');
}
