//! Incremental XML lexical scanner.
//!
//! [`XmlScanner`] produces exactly one token per [`XmlScanner::scan`] call,
//! which lets rendering and folding consumers lex only the slice of the
//! document they are looking at and stop as soon as they have scrolled past
//! it. The scanner is error tolerant: malformed input never aborts a scan,
//! it only flags the offending token and resynchronizes on the next `<`.
//!
//! All offsets are character offsets into the backing [`TextStorage`]. The
//! scanner holds no reference to the document; the storage is passed to each
//! call, so one scanner can be re-aimed at any document with
//! [`XmlScanner::set_range`].

use std::fmt;

use crate::storage::TextStorage;

/// Lexical class of the token most recently produced by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Whitespace inside a tag.
    Whitespace,
    /// Tag punctuation: `<`, `</`, `>`, `/>`, `:`, `=`.
    Special,
    /// Namespace prefix of an element name.
    ElementPrefix,
    /// Local part of an element name.
    ElementName,
    /// Namespace prefix of an attribute name.
    AttributePrefix,
    /// Local part of an attribute name.
    AttributeName,
    /// Quoted attribute value, quotes included.
    AttributeValue,
    /// The prefix being bound by an `xmlns:` declaration.
    NamespacePrefix,
    /// The `xmlns` keyword of a namespace declaration.
    NamespaceName,
    /// Quoted namespace URI, quotes included.
    NamespaceValue,
    /// Character data between tags, including CDATA sections.
    ElementValue,
    /// Entity or character reference, `&` through `;`.
    EntityReference,
    /// Comment markers and comment body.
    Comment,
    /// Processing instruction, `<?` through `?>`.
    ProcessingInstruction,
}

/// Structural position of the scanner in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// Nothing scanned yet since the last reset.
    StartDocument,
    /// Inside or just past a start tag.
    StartElement,
    /// Inside or just past an end tag or self-closing tag.
    EndElement,
    /// Inside character data.
    Characters,
    /// The scan range is exhausted.
    EndDocument,
}

/// Error raised by [`XmlScanner::set_range`] for an unusable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// `start > end`, or `end` lies beyond the document.
    InvalidRange {
        /// Requested range start (characters).
        start: usize,
        /// Requested range end (characters).
        end: usize,
        /// Document length in characters.
        len: usize,
    },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InvalidRange { start, end, len } => write!(
                f,
                "scan range [{start}, {end}) is invalid for document of length {len}"
            ),
        }
    }
}

impl std::error::Error for ScanError {}

/// Where the scanner is between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Between tags.
    Content,
    /// Inside a comment, the `<!--` marker already consumed.
    Comment,
    /// Inside a tag.
    Tag(Tag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tag {
    /// True inside `</...>`.
    closing: bool,
    state: TagState,
    /// The attribute currently being scanned is an `xmlns` declaration.
    ns_attr: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagState {
    /// Expecting the element name.
    Name,
    /// At the `:` separating element prefix and local name.
    NameColon,
    /// Expecting the element local name after its prefix.
    NameSuffix,
    /// Element name consumed; expecting attributes or the tag end.
    AfterName,
    /// At the `:` separating attribute prefix and local name.
    AttrColon,
    /// Expecting the attribute local name after its prefix.
    AttrSuffix,
    /// Attribute name consumed; expecting `=`.
    AfterAttrName,
    /// `=` consumed; expecting the opening quote.
    AfterEquals,
    /// Inside a quoted value.
    InValue(char),
}

impl Tag {
    fn open(closing: bool) -> Self {
        Self {
            closing,
            state: TagState::Name,
            ns_attr: false,
        }
    }
}

const CHUNK: usize = 128;

/// Chunk-buffered character access over a storage window.
struct Reader<'a, S: TextStorage + ?Sized> {
    storage: &'a S,
    limit: usize,
    buf: Vec<char>,
    buf_start: usize,
}

impl<'a, S: TextStorage + ?Sized> Reader<'a, S> {
    fn new(storage: &'a S, limit: usize) -> Self {
        Self {
            storage,
            limit,
            buf: Vec::new(),
            buf_start: 0,
        }
    }

    fn get(&mut self, offset: usize) -> Option<char> {
        if offset >= self.limit {
            return None;
        }
        if offset < self.buf_start || offset >= self.buf_start + self.buf.len() {
            let count = (self.limit - offset).min(CHUNK);
            let text = self.storage.get_text(offset, count).ok()?;
            self.buf = text.chars().collect();
            self.buf_start = offset;
        }
        self.buf.get(offset - self.buf_start).copied()
    }

    fn matches(&mut self, offset: usize, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.get(offset + i) == Some(c))
    }

    /// Offset of the next occurrence of `pattern` at or after `offset`.
    fn find(&mut self, mut offset: usize, pattern: &str) -> Option<usize> {
        while offset < self.limit {
            if self.matches(offset, pattern) {
                return Some(offset);
            }
            offset += 1;
        }
        None
    }
}

/// Restartable, error-tolerant XML tokenizer.
///
/// After each [`scan`](Self::scan) the token is described by
/// [`token`](Self::token), [`start_offset`](Self::start_offset),
/// [`end_offset`](Self::end_offset), [`event`](Self::event) and
/// [`is_error`](Self::is_error). Every scan before the end of the range
/// advances [`end_offset`](Self::end_offset) by at least one character, so
/// driving the scanner in a loop always terminates.
pub struct XmlScanner {
    cursor: usize,
    /// Exclusive end of the scan range; `None` tracks the document end.
    limit: Option<usize>,
    start: usize,
    end: usize,
    token: Option<TokenKind>,
    event: ScanEvent,
    error: bool,
    valid: bool,
    context: Context,
    /// Offset of the `<` that opened the current or most recent tag.
    tag_start: usize,
    /// Set when the last token opened or closed a tag; drives
    /// [`get_next_tag`](Self::get_next_tag).
    signal: Option<ScanEvent>,
}

impl Default for XmlScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlScanner {
    /// Create a scanner positioned at offset zero with an unbounded range.
    pub fn new() -> Self {
        Self {
            cursor: 0,
            limit: None,
            start: 0,
            end: 0,
            token: None,
            event: ScanEvent::StartDocument,
            error: false,
            valid: false,
            context: Context::Content,
            tag_start: 0,
            signal: None,
        }
    }

    /// Kind of the last token, `None` before the first scan and at the end
    /// of the range.
    pub fn token(&self) -> Option<TokenKind> {
        self.token
    }

    /// Structural event as of the last token.
    pub fn event(&self) -> ScanEvent {
        self.event
    }

    /// Start offset of the last token, in characters.
    pub fn start_offset(&self) -> usize {
        self.start
    }

    /// End offset (exclusive) of the last token, in characters.
    pub fn end_offset(&self) -> usize {
        self.end
    }

    /// Whether the last token was lexically malformed.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// Offset of the `<` that opened the current or most recent tag.
    pub fn tag_start_offset(&self) -> usize {
        self.tag_start
    }

    /// Consumer-managed freshness flag. The scanner never changes it; edit
    /// listeners clear it and readers re-aim the scanner when it is unset.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Set the consumer-managed freshness flag.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Re-aim the scanner at `[start, end)` of `storage` and reset all token
    /// state. The freshness flag is left untouched.
    pub fn set_range(
        &mut self,
        storage: &(impl TextStorage + ?Sized),
        start: usize,
        end: usize,
    ) -> Result<(), ScanError> {
        let len = storage.len();
        if start > end || end > len {
            return Err(ScanError::InvalidRange { start, end, len });
        }
        self.cursor = start;
        self.limit = Some(end);
        self.start = start;
        self.end = start;
        self.token = None;
        self.event = ScanEvent::StartDocument;
        self.error = false;
        self.context = Context::Content;
        self.tag_start = start;
        self.signal = None;
        Ok(())
    }

    /// Produce the next token. Returns its kind, or `None` once the range is
    /// exhausted; calling again at the end of the range is a no-op.
    pub fn scan(&mut self, storage: &(impl TextStorage + ?Sized)) -> Option<TokenKind> {
        let doc_len = storage.len();
        let limit = self.limit.unwrap_or(doc_len).min(doc_len);
        self.signal = None;

        if self.cursor >= limit {
            self.start = limit;
            self.end = limit;
            self.token = None;
            if self.event != ScanEvent::EndDocument {
                // An open tag construct at the end of the range means the
                // document was cut off mid-tag. An error on the last token,
                // an unterminated comment for one, stays flagged.
                self.error = self.error || matches!(self.context, Context::Tag(_));
                self.event = ScanEvent::EndDocument;
            }
            return None;
        }

        let mut reader = Reader::new(storage, limit);
        let Some(c) = reader.get(self.cursor) else {
            // The storage shrank under a live scan; finish the range.
            self.cursor = limit;
            self.start = limit;
            self.end = limit;
            self.token = None;
            self.event = ScanEvent::EndDocument;
            return None;
        };
        self.start = self.cursor;
        self.error = false;

        match self.context {
            Context::Content => self.scan_content(&mut reader, c),
            Context::Comment => self.scan_comment(&mut reader),
            Context::Tag(tag) => self.scan_tag(&mut reader, tag, c),
        }

        self.end = self.cursor;
        self.token
    }

    /// Advance until a tag has been fully consumed and return its event:
    /// [`ScanEvent::StartElement`] after a start tag's closing `>`,
    /// [`ScanEvent::EndElement`] after an end tag's `>` or a `/>`, and
    /// [`ScanEvent::EndDocument`] once the range is exhausted. A tag cut
    /// short before its `>` reports no event of its own.
    pub fn get_next_tag(&mut self, storage: &(impl TextStorage + ?Sized)) -> ScanEvent {
        loop {
            if self.scan(storage).is_none() {
                return ScanEvent::EndDocument;
            }
            if let Some(signal) = self.signal {
                return signal;
            }
        }
    }

    fn scan_content(&mut self, r: &mut Reader<'_, impl TextStorage + ?Sized>, c: char) {
        match c {
            '<' => {
                if r.get(self.cursor + 1) == Some('/') {
                    self.tag_start = self.cursor;
                    self.cursor += 2;
                    self.token = Some(TokenKind::Special);
                    self.event = ScanEvent::EndElement;
                    self.context = Context::Tag(Tag::open(true));
                } else if r.matches(self.cursor + 1, "!--") {
                    self.cursor += 4;
                    self.token = Some(TokenKind::Comment);
                    self.context = Context::Comment;
                } else if r.matches(self.cursor + 1, "![CDATA[") {
                    self.scan_cdata(r);
                } else if r.get(self.cursor + 1) == Some('?') {
                    self.scan_instruction(r);
                } else {
                    self.tag_start = self.cursor;
                    self.cursor += 1;
                    self.token = Some(TokenKind::Special);
                    self.event = ScanEvent::StartElement;
                    self.context = Context::Tag(Tag::open(false));
                }
            }
            '&' => {
                self.scan_reference(r, &['<', '&']);
                self.event = ScanEvent::Characters;
            }
            _ => {
                while !matches!(r.get(self.cursor), None | Some('<') | Some('&')) {
                    self.cursor += 1;
                }
                self.token = Some(TokenKind::ElementValue);
                self.event = ScanEvent::Characters;
            }
        }
    }

    fn scan_comment(&mut self, r: &mut Reader<'_, impl TextStorage + ?Sized>) {
        self.token = Some(TokenKind::Comment);
        if r.matches(self.cursor, "-->") {
            self.cursor += 3;
            self.context = Context::Content;
        } else if let Some(close) = r.find(self.cursor, "-->") {
            self.cursor = close;
        } else {
            self.cursor = r.limit;
            self.error = true;
            self.context = Context::Content;
        }
    }

    /// A CDATA section is one `ElementValue` token, markers included.
    fn scan_cdata(&mut self, r: &mut Reader<'_, impl TextStorage + ?Sized>) {
        match r.find(self.cursor + 9, "]]>") {
            Some(close) => self.cursor = close + 3,
            None => {
                self.cursor = r.limit;
                self.error = true;
            }
        }
        self.token = Some(TokenKind::ElementValue);
        self.event = ScanEvent::Characters;
    }

    /// A processing instruction is one token, `<?` through `?>`.
    fn scan_instruction(&mut self, r: &mut Reader<'_, impl TextStorage + ?Sized>) {
        match r.find(self.cursor + 2, "?>") {
            Some(close) => self.cursor = close + 2,
            None => {
                self.cursor = r.limit;
                self.error = true;
            }
        }
        self.token = Some(TokenKind::ProcessingInstruction);
    }

    fn scan_tag(&mut self, r: &mut Reader<'_, impl TextStorage + ?Sized>, mut tag: Tag, c: char) {
        // A quoted value continues across entity splits without re-reading
        // the opening quote.
        if let TagState::InValue(quote) = tag.state {
            self.scan_value(r, &mut tag, quote, false);
            self.context = Context::Tag(tag);
            return;
        }

        match c {
            c if c.is_whitespace() => {
                while r.get(self.cursor).is_some_and(|c| c.is_whitespace()) {
                    self.cursor += 1;
                }
                self.token = Some(TokenKind::Whitespace);
                // A quote right after whitespace with no `=` means the
                // separator is missing; the gap carries the error so the
                // value itself can still scan cleanly.
                self.error = tag.state == TagState::AfterAttrName
                    && matches!(r.get(self.cursor), Some('"') | Some('\''));
            }
            '>' => {
                self.cursor += 1;
                self.token = Some(TokenKind::Special);
                self.context = Context::Content;
                // The tag is complete only now; this is the boundary
                // get_next_tag reports.
                self.signal = Some(if tag.closing {
                    ScanEvent::EndElement
                } else {
                    ScanEvent::StartElement
                });
            }
            '/' => {
                if r.get(self.cursor + 1) == Some('>') {
                    self.cursor += 2;
                    self.token = Some(TokenKind::Special);
                    self.event = ScanEvent::EndElement;
                    self.context = Context::Content;
                    self.signal = Some(ScanEvent::EndElement);
                } else {
                    self.cursor += 1;
                    self.token = Some(TokenKind::Special);
                    self.error = true;
                }
            }
            '<' => {
                // Tag opener inside an unterminated tag: resynchronize on a
                // fresh tag. Only an end tag cut short counts as an error
                // here; after a bad attribute the new tag is taken at face
                // value.
                self.tag_start = self.cursor;
                if r.get(self.cursor + 1) == Some('/') {
                    self.cursor += 2;
                    self.error = tag.closing;
                    self.event = ScanEvent::EndElement;
                    self.context = Context::Tag(Tag::open(true));
                } else {
                    self.cursor += 1;
                    self.error = tag.closing;
                    self.event = ScanEvent::StartElement;
                    self.context = Context::Tag(Tag::open(false));
                }
                self.token = Some(TokenKind::Special);
            }
            '=' => {
                self.cursor += 1;
                self.token = Some(TokenKind::Special);
                tag.state = TagState::AfterEquals;
                self.context = Context::Tag(tag);
            }
            '"' | '\'' => {
                self.scan_value(r, &mut tag, c, true);
                self.context = Context::Tag(tag);
            }
            ':' if matches!(tag.state, TagState::NameColon | TagState::AttrColon) => {
                self.cursor += 1;
                self.token = Some(TokenKind::Special);
                tag.state = if tag.state == TagState::NameColon {
                    TagState::NameSuffix
                } else {
                    TagState::AttrSuffix
                };
                self.context = Context::Tag(tag);
            }
            _ => {
                self.scan_name(r, &mut tag);
                self.context = Context::Tag(tag);
            }
        }
    }

    /// Scan a name run or, after a bare `=`, an unquoted value.
    fn scan_name(&mut self, r: &mut Reader<'_, impl TextStorage + ?Sized>, tag: &mut Tag) {
        if tag.state == TagState::AfterEquals {
            // Unquoted value. Consumed through any `>` so the scan
            // resynchronizes on whitespace or the next tag.
            while r
                .get(self.cursor)
                .is_some_and(|c| c != '<' && !c.is_whitespace())
            {
                self.cursor += 1;
            }
            self.token = Some(TokenKind::AttributeName);
            self.error = true;
            tag.state = TagState::AfterName;
            return;
        }

        let run_start = self.cursor;
        let allow_colon = matches!(tag.state, TagState::NameSuffix | TagState::AttrSuffix);
        let mut text = String::new();
        loop {
            match r.get(self.cursor) {
                Some(c)
                    if !c.is_whitespace()
                        && !matches!(c, '<' | '>' | '/' | '=')
                        && (c != ':' || allow_colon || self.cursor == run_start) =>
                {
                    text.push(c);
                    self.cursor += 1;
                }
                _ => break,
            }
        }
        let terminator = r.get(self.cursor);
        self.error = !valid_name(&text) || terminator == Some('<');

        match tag.state {
            TagState::Name => {
                if terminator == Some(':') {
                    self.token = Some(TokenKind::ElementPrefix);
                    tag.state = TagState::NameColon;
                } else {
                    self.token = Some(TokenKind::ElementName);
                    tag.state = TagState::AfterName;
                }
            }
            TagState::NameColon | TagState::NameSuffix => {
                self.token = Some(TokenKind::ElementName);
                tag.state = TagState::AfterName;
            }
            TagState::AttrColon | TagState::AttrSuffix => {
                self.token = Some(if tag.ns_attr {
                    TokenKind::NamespacePrefix
                } else {
                    TokenKind::AttributeName
                });
                tag.state = TagState::AfterAttrName;
            }
            // A name run anywhere else starts a new attribute.
            _ => {
                if text == "xmlns" {
                    self.token = Some(TokenKind::NamespaceName);
                    tag.ns_attr = true;
                    tag.state = if terminator == Some(':') {
                        TagState::AttrColon
                    } else {
                        TagState::AfterAttrName
                    };
                } else if terminator == Some(':') {
                    self.token = Some(TokenKind::AttributePrefix);
                    tag.ns_attr = false;
                    tag.state = TagState::AttrColon;
                } else {
                    self.token = Some(TokenKind::AttributeName);
                    tag.ns_attr = false;
                    tag.state = TagState::AfterAttrName;
                }
            }
        }
    }

    /// Scan one chunk of a quoted value. Entity references split a value
    /// into multiple tokens; the quotes stay part of the flanking chunks.
    fn scan_value(
        &mut self,
        r: &mut Reader<'_, impl TextStorage + ?Sized>,
        tag: &mut Tag,
        quote: char,
        at_start: bool,
    ) {
        let kind = if tag.ns_attr {
            TokenKind::NamespaceValue
        } else {
            TokenKind::AttributeValue
        };
        let chunk_start = self.cursor;
        if at_start {
            self.cursor += 1;
            tag.state = TagState::InValue(quote);
        }
        loop {
            match r.get(self.cursor) {
                None => {
                    self.token = Some(kind);
                    self.error = true;
                    return;
                }
                Some(c) if c == quote => {
                    self.cursor += 1;
                    self.token = Some(kind);
                    tag.state = TagState::AfterName;
                    return;
                }
                Some('&') => {
                    if self.cursor > chunk_start {
                        self.token = Some(kind);
                        return;
                    }
                    self.scan_reference(r, &[quote, '<', '>', '&']);
                    return;
                }
                Some('<') => {
                    // Unescaped `<` ends the value; the next scan treats it
                    // as a fresh tag.
                    self.token = Some(kind);
                    self.error = true;
                    tag.state = TagState::AfterName;
                    return;
                }
                Some(_) => self.cursor += 1,
            }
        }
    }

    /// Scan `&` through `;`. A reference cut off by a stop character or the
    /// end of the range is flagged, as is one whose body is neither a name
    /// nor a legal character reference.
    fn scan_reference(&mut self, r: &mut Reader<'_, impl TextStorage + ?Sized>, stop: &[char]) {
        self.cursor += 1;
        let mut body = String::new();
        loop {
            match r.get(self.cursor) {
                None => {
                    self.error = true;
                    break;
                }
                Some(';') => {
                    self.cursor += 1;
                    self.error = !valid_reference(&body);
                    break;
                }
                Some(c) if stop.contains(&c) => {
                    self.error = true;
                    break;
                }
                Some(c) => {
                    body.push(c);
                    self.cursor += 1;
                }
            }
        }
        self.token = Some(TokenKind::EntityReference);
    }
}

/// Whether `text` is a well-formed XML name (namespace-aware, so `:` is not
/// a name character).
fn valid_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Whether the text between `&` and `;` is a valid reference: an entity
/// name, or `#` / `#x` digits decoding to a character XML allows.
fn valid_reference(body: &str) -> bool {
    match body.strip_prefix('#') {
        Some(digits) => {
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) if !hex.is_empty() => u32::from_str_radix(hex, 16),
                Some(_) => return false,
                None if !digits.is_empty() => digits.parse(),
                None => return false,
            };
            match code {
                Ok(code) => matches!(
                    code,
                    0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF
                ),
                Err(_) => false,
            }
        }
        None => valid_name(body),
    }
}

/// Offset just past the last `>` at or before `offset`, the safe place to
/// restart a scan after an edit near `offset`. Zero when no tag end exists.
pub fn tag_end_before(storage: &(impl TextStorage + ?Sized), offset: usize) -> usize {
    let mut at = offset.min(storage.len());
    while at > 0 {
        if let Ok(text) = storage.get_text(at - 1, 1) {
            if text == ">" {
                return at;
            }
        }
        at -= 1;
    }
    0
}
