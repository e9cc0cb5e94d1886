//! Cursor-based tokenizers over a mutable byte buffer
//!
//! Tokens are [`Span`]s into the buffer being tokenized. Nothing is
//! allocated; quoted CSV fields are decoded by compacting bytes in place.

/// A bounded view into a backing buffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.end()]
    }
}

/// Position of the first occurrence of `needle` in `haystack`
#[inline]
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() == 1 {
        return haystack.iter().position(|&b| b == needle[0]);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits a region of a buffer at every occurrence of a delimiter
///
/// Restartable: [`seed`](Self::seed) points the cursor at a new region and
/// [`next_token`](Self::next_token) then walks it until no delimiter is left.
#[derive(Clone, Debug)]
pub struct DelimTokenizer<'d> {
    delim: &'d [u8],
    cursor: usize,
    end: usize,
}

impl<'d> DelimTokenizer<'d> {
    pub fn new(delim: &'d [u8]) -> Self {
        assert!(!delim.is_empty(), "delimiter must not be empty");
        Self {
            delim,
            cursor: 0,
            end: 0,
        }
    }

    /// Reset the cursor to the start of `source`
    pub fn seed(&mut self, source: Span) {
        self.cursor = source.start;
        self.end = source.end();
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor within the seeded region
    pub fn set_cursor(&mut self, cursor: usize) {
        debug_assert!(cursor <= self.end);
        self.cursor = cursor.min(self.end);
    }

    /// Span ending at the next delimiter; the cursor moves past the delimiter
    ///
    /// Returns `None` once no delimiter remains, leaving the cursor in place.
    pub fn next_token(&mut self, buf: &[u8]) -> Option<Span> {
        let at = find(&buf[self.cursor..self.end], self.delim)?;
        let token = Span::new(self.cursor, at);
        self.cursor += at + self.delim.len();
        Some(token)
    }

    /// Everything between the cursor and the end of the seeded region
    #[inline]
    pub fn remainder(&self) -> Span {
        Span::new(self.cursor, self.end - self.cursor)
    }
}

/// Splits one line into CSV fields, decoding quoted fields in place
///
/// ```
/// use csvtable::tokenizer::{FieldTokenizer, Span};
///
/// let mut buf = b"7,\"a,b\"\"c\",x".to_vec();
/// let line = Span::new(0, buf.len());
/// let fields = FieldTokenizer::new(line).collect_fields(&mut buf);
/// let text: Vec<&[u8]> = fields.iter().map(|s| s.slice(&buf)).collect();
/// assert_eq!(text, [&b"7"[..], &b"a,b\"c"[..], &b"x"[..]]);
/// ```
#[derive(Clone, Debug)]
pub struct FieldTokenizer {
    inner: DelimTokenizer<'static>,
    finished: bool,
}

impl FieldTokenizer {
    pub fn new(line: Span) -> Self {
        let mut inner = DelimTokenizer::new(b",");
        inner.seed(line);
        Self {
            inner,
            finished: false,
        }
    }

    /// Next comma-terminated field, or `None` when only the final field is left
    pub fn next_field(&mut self, buf: &mut [u8]) -> Option<Span> {
        if self.finished {
            return None;
        }

        let start = self.inner.cursor();
        let end = self.inner.remainder().end();
        if start < end && buf[start] == b'"' {
            return Some(self.quoted_field(buf, start, end));
        }

        self.inner.next_token(buf)
    }

    /// The last field of the line, at most once
    ///
    /// `None` if a quoted field already consumed the end of the line.
    pub fn finish(&mut self) -> Option<Span> {
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(self.inner.remainder())
    }

    /// Every field of the line, including the final one
    pub fn collect_fields(mut self, buf: &mut [u8]) -> Vec<Span> {
        let mut fields = Vec::new();
        while let Some(field) = self.next_field(buf) {
            fields.push(field);
        }
        fields.extend(self.finish());
        fields
    }

    // Decoded bytes are written from the opening quote's slot onward; the
    // read position always stays ahead of the write position.
    fn quoted_field(&mut self, buf: &mut [u8], start: usize, end: usize) -> Span {
        let mut write = start;
        let mut read = start + 1;

        while read < end {
            let b = buf[read];
            if b == b'"' {
                if read + 1 < end && buf[read + 1] == b'"' {
                    buf[write] = b'"';
                    write += 1;
                    read += 2;
                    continue;
                }
                read += 1;
                break;
            }
            buf[write] = b;
            write += 1;
            read += 1;
        }

        // Skip to past the next comma; anything between the closing quote and
        // that comma is dropped.
        self.inner.set_cursor(read);
        if self.inner.next_token(buf).is_none() {
            self.finished = true;
        }

        Span::new(start, write - start)
    }
}
