//! Entity Decoding
//!
//! Handles decoding of character references found in text and attribute values:
//! - Built-in XML entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - The HTML named entities that show up in ordinary pages
//!
//! Uses Cow for zero-copy when no entities are present. Unknown or malformed
//! references are kept verbatim, the way browsers do.

use memchr::memchr;
use std::borrow::Cow;

/// Longest named reference we attempt to resolve (`&hellip;` and friends)
const MAX_ENTITY_LEN: usize = 10;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
pub fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let Some(amp_pos) = memchr(b'&', &input[pos..]) else {
            result.extend_from_slice(&input[pos..]);
            break;
        };
        result.extend_from_slice(&input[pos..pos + amp_pos]);
        pos += amp_pos;

        let window_end = (pos + 2 + MAX_ENTITY_LEN).min(input.len());
        let decoded = memchr(b';', &input[pos..window_end]).and_then(|semi_offset| {
            decode_entity(&input[pos + 1..pos + semi_offset]).map(|d| (d, semi_offset))
        });

        match decoded {
            Some((ch, semi_offset)) => {
                let mut buf = [0u8; 4];
                result.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                pos += semi_offset + 1;
            }
            None => {
                result.push(b'&');
                pos += 1;
            }
        }
    }

    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &[u8]) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix(b"#") {
        return decode_numeric_entity(numeric);
    }

    let ch = match entity {
        b"lt" => '<',
        b"gt" => '>',
        b"amp" => '&',
        b"quot" => '"',
        b"apos" => '\'',
        b"nbsp" => '\u{00A0}',
        b"copy" => '\u{00A9}',
        b"reg" => '\u{00AE}',
        b"trade" => '\u{2122}',
        b"mdash" => '\u{2014}',
        b"ndash" => '\u{2013}',
        b"lsquo" => '\u{2018}',
        b"rsquo" => '\u{2019}',
        b"ldquo" => '\u{201C}',
        b"rdquo" => '\u{201D}',
        b"laquo" => '\u{00AB}',
        b"raquo" => '\u{00BB}',
        b"hellip" => '\u{2026}',
        b"bull" => '\u{2022}',
        b"middot" => '\u{00B7}',
        b"times" => '\u{00D7}',
        b"euro" => '\u{20AC}',
        _ => return None,
    };
    Some(ch)
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &[u8]) -> Option<char> {
    let codepoint = match entity.first()? {
        b'x' | b'X' => {
            let hex = std::str::from_utf8(&entity[1..]).ok()?;
            u32::from_str_radix(hex, 16).ok()?
        }
        _ => std::str::from_utf8(entity).ok()?.parse::<u32>().ok()?,
    };

    // NUL is never a legal reference; map it to the replacement character like HTML does
    if codepoint == 0 {
        return Some('\u{FFFD}');
    }
    char::from_u32(codepoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities() {
        let input = b"Hello, World!";
        let result = decode_text(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), b"Hello, World!");
    }

    #[test]
    fn test_basic_entities() {
        let result = decode_text(b"&lt;hello&gt; &amp; &quot;world&quot;");
        assert_eq!(result.as_ref(), b"<hello> & \"world\"");
    }

    #[test]
    fn test_numeric_decimal_and_hex() {
        assert_eq!(decode_text(b"&#65;&#66;&#67;").as_ref(), b"ABC");
        assert_eq!(decode_text(b"&#x41;&#X42;&#x43;").as_ref(), b"ABC");
    }

    #[test]
    fn test_html_named() {
        let result = decode_text("Make&nbsp;everything&hellip;".as_bytes());
        assert_eq!(std::str::from_utf8(result.as_ref()).unwrap(), "Make\u{a0}everything\u{2026}");
    }

    #[test]
    fn test_unknown_and_bare_ampersand() {
        assert_eq!(decode_text(b"&unknown;").as_ref(), b"&unknown;");
        assert_eq!(decode_text(b"a && b").as_ref(), b"a && b");
        assert_eq!(decode_text(b"q=1&r=2; s").as_ref(), b"q=1&r=2; s");
    }
}
