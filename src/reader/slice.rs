//! Zero-Copy Slice Reader
//!
//! Parses markup from a byte slice with zero-copy semantics.
//! Input references are maintained directly in the output.

use super::events::{EndElement, MarkupEvent, StartElement};
use crate::core::attributes::{parse_attributes, Attribute};
use crate::core::scanner::is_whitespace;
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};

/// Zero-copy markup reader from a byte slice
pub struct SliceReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
}

impl<'a> SliceReader<'a> {
    /// Create a new slice reader
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input),
        }
    }

    /// Get the next markup event
    pub fn next_event(&mut self) -> Option<MarkupEvent<'a>> {
        loop {
            let token = self.tokenizer.next_token()?;

            match token.kind {
                TokenKind::Eof => return Some(MarkupEvent::EndDocument),

                TokenKind::StartTag => {
                    let attrs = self.parse_tag_attributes(&token);
                    let name = token.name?;
                    return Some(MarkupEvent::StartElement(StartElement::from_cow(name, attrs)));
                }

                TokenKind::EndTag => {
                    let name = token.name?;
                    return Some(MarkupEvent::EndElement(EndElement::from_cow(name)));
                }

                TokenKind::EmptyTag => {
                    let attrs = self.parse_tag_attributes(&token);
                    let name = token.name?;
                    return Some(MarkupEvent::EmptyElement(StartElement::from_cow(name, attrs)));
                }

                TokenKind::Text => {
                    if let Some(content) = token.content {
                        if !content.is_empty() {
                            return Some(MarkupEvent::Text(content));
                        }
                    }
                }

                TokenKind::CData => {
                    if let Some(content) = token.content {
                        return Some(MarkupEvent::CData(content));
                    }
                }

                TokenKind::Comment => {
                    if let Some(content) = token.content {
                        return Some(MarkupEvent::Comment(content));
                    }
                }

                TokenKind::ProcessingInstruction => {
                    if let Some(name) = token.name {
                        return Some(MarkupEvent::ProcessingInstruction {
                            target: name,
                            data: token.content,
                        });
                    }
                }

                TokenKind::DocType => {
                    if let Some(content) = token.content {
                        return Some(MarkupEvent::DocType(content));
                    }
                }
            }
        }
    }

    /// Parse attributes from a tag token
    fn parse_tag_attributes(&self, token: &Token<'a>) -> Vec<Attribute<'a>> {
        let (start, end) = token.span;
        let tag_content = &self.input[start..end];

        // Skip '<' and the tag name
        let mut pos = 1;
        while pos < tag_content.len() {
            let b = tag_content[pos];
            if is_whitespace(b) || b == b'>' || b == b'/' {
                break;
            }
            pos += 1;
        }

        // Find end of attributes (before '>' or '/>')
        let mut attr_end = tag_content.len();
        if tag_content.ends_with(b"/>") {
            attr_end -= 2;
        } else if tag_content.ends_with(b">") {
            attr_end -= 1;
        }

        if pos >= attr_end {
            return Vec::new();
        }

        parse_attributes(&tag_content[pos..attr_end])
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = MarkupEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.next_event()?;
        if matches!(event, MarkupEvent::EndDocument) {
            None
        } else {
            Some(event)
        }
    }
}
