//! Markup Event Types
//!
//! Event types for pull-parser style processing.

use crate::core::attributes::Attribute;
use std::borrow::Cow;

/// Markup parsing event
#[derive(Debug, Clone)]
pub enum MarkupEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(EndElement<'a>),
    /// Self-closed element: <name attrs.../>
    EmptyElement(StartElement<'a>),
    /// Text content between tags
    Text(Cow<'a, [u8]>),
    /// CDATA section content
    CData(Cow<'a, [u8]>),
    /// Comment content
    Comment(Cow<'a, [u8]>),
    /// Processing instruction: <?target data?>
    ProcessingInstruction {
        target: Cow<'a, [u8]>,
        data: Option<Cow<'a, [u8]>>,
    },
    /// DOCTYPE declaration body (after the DOCTYPE keyword)
    DocType(Cow<'a, [u8]>),
    /// End of document
    EndDocument,
}

/// Start element event data
#[derive(Debug, Clone)]
pub struct StartElement<'a> {
    /// Element name as written
    pub name: Cow<'a, [u8]>,
    /// Element attributes
    pub attributes: Vec<Attribute<'a>>,
}

impl<'a> StartElement<'a> {
    /// Create a new start element from a byte slice
    pub fn new(name: &'a [u8], attributes: Vec<Attribute<'a>>) -> Self {
        StartElement {
            name: Cow::Borrowed(name),
            attributes,
        }
    }

    /// Create a new start element from a Cow
    pub fn from_cow(name: Cow<'a, [u8]>, attributes: Vec<Attribute<'a>>) -> Self {
        StartElement { name, attributes }
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name.as_ref()).ok()
    }

    /// Get an attribute value by name as string
    pub fn get_attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name_str() == Some(name))
            .and_then(|a| a.value_str())
    }
}

/// End element event data
#[derive(Debug, Clone)]
pub struct EndElement<'a> {
    /// Element name as written
    pub name: Cow<'a, [u8]>,
}

impl<'a> EndElement<'a> {
    /// Create a new end element from a Cow
    pub fn from_cow(name: Cow<'a, [u8]>) -> Self {
        EndElement { name }
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name.as_ref()).ok()
    }
}

impl<'a> MarkupEvent<'a> {
    /// Check if this is a start element event
    pub fn is_start_element(&self) -> bool {
        matches!(self, MarkupEvent::StartElement(_) | MarkupEvent::EmptyElement(_))
    }

    /// Get as start element if applicable
    pub fn as_start_element(&self) -> Option<&StartElement<'a>> {
        match self {
            MarkupEvent::StartElement(e) | MarkupEvent::EmptyElement(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if applicable
    pub fn as_text(&self) -> Option<&[u8]> {
        match self {
            MarkupEvent::Text(t) | MarkupEvent::CData(t) => Some(t.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_element() {
        let elem = StartElement::new(b"div", vec![]);
        assert_eq!(elem.name_str(), Some("div"));
        assert!(elem.attributes.is_empty());
    }

    #[test]
    fn test_event_accessors() {
        let text = MarkupEvent::Text(Cow::Borrowed(b"hi"));
        assert_eq!(text.as_text(), Some(b"hi" as &[u8]));
        assert!(!text.is_start_element());

        let empty = MarkupEvent::EmptyElement(StartElement::new(b"br", vec![]));
        assert_eq!(empty.as_start_element().and_then(|e| e.name_str()), Some("br"));
    }
}
