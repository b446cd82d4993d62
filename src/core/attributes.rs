//! Attribute Parsing
//!
//! Parses attributes from the inside of a start tag. Lenient in the way HTML
//! is: value-less boolean attributes, unquoted values and stray characters
//! are all accepted.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_whitespace};
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Attribute name as written
    pub name: Cow<'a, [u8]>,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute
    pub fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        Attribute {
            name: Cow::Borrowed(name),
            value,
        }
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name.as_ref()).ok()
    }

    /// Get the value as a string
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(self.value.as_ref()).ok()
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' or '/>'.
/// A repeated attribute name keeps its first value, as in HTML.
pub fn parse_attributes(input: &[u8]) -> Vec<Attribute<'_>> {
    let mut attrs: Vec<Attribute<'_>> = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        while pos < input.len() && (is_whitespace(input[pos]) || input[pos] == b'/') {
            pos += 1;
        }
        if pos >= input.len() {
            break;
        }

        let name_start = pos;
        while pos < input.len() && is_attr_name_char(input[pos]) {
            pos += 1;
        }
        if pos == name_start {
            // Garbage such as a stray quote; skip it
            pos += 1;
            continue;
        }
        let name = &input[name_start..pos];

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() || input[pos] != b'=' {
            push_unique(&mut attrs, Attribute::new(name, Cow::Borrowed(b"")));
            continue;
        }
        pos += 1; // Skip '='

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= input.len() {
            push_unique(&mut attrs, Attribute::new(name, Cow::Borrowed(b"")));
            break;
        }

        let quote = input[pos];
        let value_bytes = if quote == b'"' || quote == b'\'' {
            pos += 1;
            let value_start = pos;
            while pos < input.len() && input[pos] != quote {
                pos += 1;
            }
            let value = &input[value_start..pos];
            pos = (pos + 1).min(input.len()); // Skip closing quote
            value
        } else {
            let value_start = pos;
            while pos < input.len() && !is_whitespace(input[pos]) && input[pos] != b'>' {
                pos += 1;
            }
            &input[value_start..pos]
        };

        push_unique(&mut attrs, Attribute::new(name, decode_text(value_bytes)));
    }

    attrs
}

fn push_unique<'a>(attrs: &mut Vec<Attribute<'a>>, attr: Attribute<'a>) {
    if !attrs.iter().any(|a| a.name.eq_ignore_ascii_case(&attr.name)) {
        attrs.push(attr);
    }
}

/// Attribute names are looser than tag names: `@click`, `[x]`, `data-1` all occur in the wild
#[inline]
fn is_attr_name_char(b: u8) -> bool {
    is_name_char(b) || matches!(b, b'@' | b'[' | b']' | b'(' | b')' | b'#' | b'*' | b'$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(b" id=\"test\" class=\"foo\"");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[0].value_str(), Some("test"));
        assert_eq!(attrs[1].name_str(), Some("class"));
        assert_eq!(attrs[1].value_str(), Some("foo"));
    }

    #[test]
    fn test_single_quoted() {
        let attrs = parse_attributes(b" onclick='javascript:window.okDone(); return false;'");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value_str(), Some("javascript:window.okDone(); return false;"));
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(b" title=\"&lt;hello&gt;\"");
        assert_eq!(attrs[0].value_str(), Some("<hello>"));
    }

    #[test]
    fn test_boolean_and_unquoted() {
        let attrs = parse_attributes(b" disabled type=submit hidden /");
        let pairs: Vec<_> = attrs
            .iter()
            .map(|a| (a.name_str().unwrap(), a.value_str().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("disabled", ""), ("type", "submit"), ("hidden", "")]);
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let attrs = parse_attributes(b" class=\"a\" CLASS=\"b\"");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value_str(), Some("a"));
    }

    #[test]
    fn test_whitespace_handling() {
        let attrs = parse_attributes(b"  id  =  \"test\"  ");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[0].value_str(), Some("test"));
    }

    #[test]
    fn test_empty_attributes() {
        assert!(parse_attributes(b"").is_empty());
    }
}
