//! Markup Tokenizer - Lenient state machine for token extraction
//!
//! Implements a pull-parser style tokenizer that extracts:
//! - Element start/end/empty tags
//! - Text content (with raw text handling for `script` and `style`)
//! - CDATA sections
//! - Comments
//! - Processing instructions
//! - DOCTYPE declarations
//!
//! The tokenizer never fails. Anything that does not form valid markup is
//! handed back as text, which is what a browser would show.

use super::entities::decode_text;
use super::scanner::Scanner;
use std::borrow::Cow;

/// Elements whose content is raw text: no markup and no entity decoding
const RAW_TEXT_ELEMENTS: &[&[u8]] = &[b"script", b"style"];

/// Elements whose content is text with entities but no markup
const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&[u8]] = &[b"textarea", b"title"];

/// Current parsing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Initial state before parsing starts
    Init,
    /// Inside text content between tags
    InsideText,
    /// Inside a markup construct (<...>)
    InsideMarkup,
    /// End of input reached
    Done,
}

/// Type of markup token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Self-closed element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction or XML declaration: <?target ...?>
    ProcessingInstruction,
    /// DOCTYPE declaration
    DocType,
    /// End of file
    Eof,
}

/// A parsed markup token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags: the element name
    pub name: Option<Cow<'a, [u8]>>,
    /// For text/cdata/comments/doctype: the content
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(Cow::Borrowed(name));
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Pending raw text element whose body must be read verbatim
#[derive(Debug, Clone, Copy)]
struct RawText<'a> {
    name: &'a [u8],
    decode: bool,
}

/// Markup tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    state: ParseState,
    raw_text: Option<RawText<'a>>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            state: ParseState::Init,
            raw_text: None,
        }
    }

    /// Get the next token, or None once Eof has been returned
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.state == ParseState::Done {
            return None;
        }

        if self.state == ParseState::Init {
            // Skip a UTF-8 byte order mark and leading whitespace
            if self.scanner.starts_with(b"\xEF\xBB\xBF") {
                self.scanner.advance(3);
            }
            self.scanner.skip_whitespace();
            self.state = ParseState::InsideText;
        }

        if let Some(raw) = self.raw_text.take() {
            if let Some(token) = self.parse_raw_text(raw) {
                return Some(token);
            }
        }

        if self.scanner.is_eof() {
            self.state = ParseState::Done;
            let pos = self.scanner.position();
            return Some(Token::new(TokenKind::Eof, (pos, pos)));
        }

        if self.scanner.peek() == Some(b'<') {
            let start = self.scanner.position();
            if let Some(token) = self.parse_markup() {
                return Some(token);
            }
            // Not markup after all: the '<' is literal text
            self.scanner.set_position(start);
            return Some(self.parse_text(1));
        }

        Some(self.parse_text(0))
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'
        self.state = ParseState::InsideMarkup;

        let token = match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => None,
        };

        self.state = ParseState::InsideText;
        token
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Option<Token<'a>> {
        let name = self.scanner.read_name()?;

        // Find the end of the tag, handling quoted attributes
        let end = self.scanner.find_tag_end_quoted()?;
        let is_empty = self.scanner.slice(start, end).ends_with(b"/");

        self.scanner.set_position(end + 1);

        if !is_empty {
            self.raw_text = raw_text_kind(name);
        }

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Some(Token::new(kind, (start, end + 1)).with_name(name))
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '/'

        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => {
                // `</ >` or `</3>`: swallow it as a bogus comment
                let end = self.scanner.find_byte(b'>')?;
                let content = self.scanner.slice(start + 2, end);
                self.scanner.set_position(end + 1);
                return Some(
                    Token::new(TokenKind::Comment, (start, end + 1)).with_content(Cow::Borrowed(content)),
                );
            }
        };

        let end = self.scanner.find_byte(b'>')?;
        self.scanner.set_position(end + 1);

        Some(Token::new(TokenKind::EndTag, (start, end + 1)).with_name(name))
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE, bogus comment)
    fn parse_bang_markup(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.scanner.advance(2);
            return Some(self.parse_delimited(start, b"-->", TokenKind::Comment));
        }
        if self.scanner.starts_with(b"[CDATA[") {
            self.scanner.advance(7);
            return Some(self.parse_delimited(start, b"]]>", TokenKind::CData));
        }
        if self.scanner.starts_with_ignore_case(b"DOCTYPE") {
            self.scanner.advance(7);
            return Some(self.parse_doctype(start));
        }

        // Bogus comment: <!anything>
        Some(self.parse_delimited(start, b">", TokenKind::Comment))
    }

    /// Read content up to `terminator`; an unterminated construct runs to end of input
    fn parse_delimited(&mut self, start: usize, terminator: &[u8], kind: TokenKind) -> Token<'a> {
        let content_start = self.scanner.position();
        let (content_end, next) = match self.scanner.find_seq(terminator) {
            Some(pos) => (pos, pos + terminator.len()),
            None => (self.scanner.len(), self.scanner.len()),
        };

        let content = self.scanner.slice(content_start, content_end);
        self.scanner.set_position(next);
        Token::new(kind, (start, next)).with_content(Cow::Borrowed(content))
    }

    /// Parse a DOCTYPE declaration, including an optional internal subset
    fn parse_doctype(&mut self, start: usize) -> Token<'a> {
        let content_start = self.scanner.position();
        let close = self.scanner.find_byte(b'>');
        let bracket = self.scanner.find_byte(b'[');

        // The internal subset may itself contain '>'
        let end = match (bracket, close) {
            (Some(b), Some(c)) if b < c => {
                self.scanner.set_position(b);
                self.scanner
                    .find_seq(b"]")
                    .and_then(|sq| {
                        self.scanner.set_position(sq);
                        self.scanner.find_byte(b'>')
                    })
                    .unwrap_or(self.scanner.len())
            }
            (_, Some(c)) => c,
            (_, None) => self.scanner.len(),
        };

        let content = self.scanner.slice(content_start, end);
        let next = (end + 1).min(self.scanner.len());
        self.scanner.set_position(next);
        Token::new(TokenKind::DocType, (start, next)).with_content(Cow::Borrowed(content))
    }

    /// Parse a processing instruction <?...?> (also covers the XML declaration)
    fn parse_pi(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '?'
        let name = self.scanner.read_name()?;
        let content_start = self.scanner.position();

        let (content_end, next) = match self.scanner.find_seq(b"?>") {
            Some(pos) => (pos, pos + 2),
            None => {
                let pos = self.scanner.find_byte(b'>')?;
                (pos, pos + 1)
            }
        };

        let content = self.scanner.slice(content_start, content_end);
        self.scanner.set_position(next);
        Some(
            Token::new(TokenKind::ProcessingInstruction, (start, next))
                .with_name(name)
                .with_content(Cow::Borrowed(content)),
        )
    }

    /// Parse the body of a raw text element up to its closing tag
    fn parse_raw_text(&mut self, raw: RawText<'a>) -> Option<Token<'a>> {
        let start = self.scanner.position();
        let end = self.scanner.find_closing_tag(raw.name).unwrap_or(self.scanner.len());
        if end == start {
            return None;
        }

        let content = self.scanner.slice(start, end);
        self.scanner.set_position(end);
        let content = if raw.decode { decode_text(content) } else { Cow::Borrowed(content) };
        Some(Token::new(TokenKind::Text, (start, end)).with_content(content))
    }

    /// Parse text content, starting `skip` bytes in (past a literal '<')
    fn parse_text(&mut self, skip: usize) -> Token<'a> {
        let start = self.scanner.position();
        self.scanner.advance(skip);

        let end = self.scanner.find_tag_start().unwrap_or(self.scanner.len());
        let content = self.scanner.slice(start, end);
        self.scanner.set_position(end);

        Token::new(TokenKind::Text, (start, end)).with_content(decode_text(content))
    }
}

/// Raw text handling for an element name, if any
fn raw_text_kind(name: &[u8]) -> Option<RawText<'_>> {
    if RAW_TEXT_ELEMENTS.iter().any(|n| name.eq_ignore_ascii_case(n)) {
        Some(RawText { name, decode: false })
    } else if ESCAPABLE_RAW_TEXT_ELEMENTS.iter().any(|n| name.eq_ignore_ascii_case(n)) {
        Some(RawText { name, decode: true })
    } else {
        None
    }
}

/// Iterator adapter for tokenizer
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
