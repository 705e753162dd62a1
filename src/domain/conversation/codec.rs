//! Field name codec - collision-free mapping to schema identifiers.
//!
//! Caller-declared field names are arbitrary Unicode ("topmostSubform[0].
//! Page1[0].f1_01[0]", "café", even ""), but generated tool schemas need
//! plain identifiers. The codec maps any name to a safe identifier and
//! back, with a perfect round trip and no two names sharing an encoding.
//!
//! Names that are already safe identifiers pass through untouched, so the
//! common case stays readable. Everything else gains the `field_` escape
//! prefix, with each unsafe character replaced by `_PCT{HEX}_` where HEX
//! is its code point in uppercase hexadecimal, padded to at least two
//! digits. The prefix also absorbs the one collision hazard: a name that
//! itself starts with `field_` is always escaped.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Escape prefix for encoded names.
const PREFIX: &str = "field_";

/// Start of an escape token.
const TOKEN_START: &str = "_PCT";

/// Identifiers that could collide with the vocabulary of generated
/// schemas, so they are never passed through raw.
static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "type",
        "properties",
        "required",
        "enum",
        "items",
        "description",
        "title",
        "value",
    ]
    .into_iter()
    .collect()
});

fn is_safe_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns true if the name can be used as a schema identifier unchanged.
fn passes_through(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(is_safe_char)
        && !name.starts_with(|ch: char| ch.is_ascii_digit())
        && !RESERVED.contains(name)
        && !name.starts_with(PREFIX)
}

/// Encodes a field name into a safe schema identifier.
pub fn encode(name: &str) -> String {
    if passes_through(name) {
        return name.to_string();
    }

    let mut encoded = String::with_capacity(PREFIX.len() + name.len());
    encoded.push_str(PREFIX);
    let mut rest = name;
    while let Some(ch) = rest.chars().next() {
        if rest.starts_with(TOKEN_START) {
            // A literal token marker would be ambiguous once escaped text
            // surrounds it, so its underscore is escaped too.
            encoded.push_str(&format!("{}5F_", TOKEN_START));
            rest = &rest[1..];
        } else if is_safe_char(ch) {
            encoded.push(ch);
            rest = &rest[ch.len_utf8()..];
        } else {
            encoded.push_str(&format!("{}{:02X}_", TOKEN_START, ch as u32));
            rest = &rest[ch.len_utf8()..];
        }
    }
    encoded
}

/// Decodes an identifier produced by [`encode`] back to the original name.
///
/// Identifiers without the escape prefix were never encoded and come back
/// unchanged. Escape tokens are reversed by a single scan; malformed token
/// text (which [`encode`] never produces) is left as-is.
pub fn decode(identifier: &str) -> String {
    let Some(body) = identifier.strip_prefix(PREFIX) else {
        return identifier.to_string();
    };

    let mut decoded = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(start) = rest.find(TOKEN_START) {
        let after_marker = &rest[start + TOKEN_START.len()..];
        let hex_len = after_marker
            .chars()
            .take_while(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_lowercase())
            .count();
        let terminated = after_marker[hex_len..].starts_with('_');

        if hex_len == 0 || !terminated {
            // Not an escape token, keep the marker literally and move on.
            decoded.push_str(&rest[..start + TOKEN_START.len()]);
            rest = after_marker;
            continue;
        }

        let code = u32::from_str_radix(&after_marker[..hex_len], 16).ok();
        match code.and_then(char::from_u32) {
            Some(ch) => {
                decoded.push_str(&rest[..start]);
                decoded.push(ch);
                rest = &after_marker[hex_len + 1..];
            }
            None => {
                decoded.push_str(&rest[..start + TOKEN_START.len()]);
                rest = after_marker;
            }
        }
    }
    decoded.push_str(rest);
    decoded
}
