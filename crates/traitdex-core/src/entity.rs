//! HTML entity escaping and unescaping.
//!
//! The generator escapes `impl` signatures into HTML fragments using a small
//! set of named entities plus numeric character references. Escaping is
//! total; unescaping is fallible so malformed fragments surface as
//! diagnostics rather than silently corrupt text.

use thiserror::Error;

/// Errors produced while unescaping an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// An `&` was not followed by a terminating `;` within a sane distance.
    #[error("unterminated entity at byte {0}")]
    Unterminated(usize),
    /// A named entity is not one the generator emits.
    #[error("unknown entity '&{name};' at byte {position}")]
    Unknown {
        /// Byte offset of the `&`.
        position: usize,
        /// The entity name without `&` and `;`.
        name: String,
    },
    /// A numeric reference does not denote a valid character.
    #[error("invalid numeric reference '&#{digits};' at byte {position}")]
    InvalidNumeric {
        /// Byte offset of the `&`.
        position: usize,
        /// The digits between `&#` and `;`.
        digits: String,
    },
}

/// Longest entity name the generator emits (`&quot;`), used to bound the
/// search for a terminating `;`.
const MAX_ENTITY_LEN: usize = 8;

/// Numeric references run longer than any named entity (`&#x0010FFFF;`).
const MAX_NUMERIC_LEN: usize = 12;

/// Escape text content for embedding in an HTML fragment.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Unescape an HTML fragment's text content.
pub fn unescape(text: &str) -> Result<String, EntityError> {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'&' {
            // Advance over a full UTF-8 character.
            let c = text[i..].chars().next().unwrap_or('\u{fffd}');
            out.push(c);
            i += c.len_utf8();
            continue;
        }
        let rest = &text[i + 1..];
        let window = if rest.starts_with('#') {
            MAX_NUMERIC_LEN
        } else {
            MAX_ENTITY_LEN
        };
        let semi = rest
            .char_indices()
            .take(window)
            .find(|&(_, c)| c == ';')
            .map(|(j, _)| j);
        let Some(semi) = semi else {
            return Err(EntityError::Unterminated(i));
        };
        let name = &rest[..semi];
        let replacement = match name {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "nbsp" => '\u{a0}',
            _ => {
                if let Some(digits) = name.strip_prefix('#') {
                    numeric_reference(digits).ok_or_else(|| EntityError::InvalidNumeric {
                        position: i,
                        digits: digits.to_string(),
                    })?
                } else {
                    return Err(EntityError::Unknown {
                        position: i,
                        name: name.to_string(),
                    });
                }
            }
        };
        out.push(replacement);
        i += 1 + semi + 1;
    }
    Ok(out)
}

/// Decode `&#NN;` / `&#xNN;` digits into a character.
fn numeric_reference(digits: &str) -> Option<char> {
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
