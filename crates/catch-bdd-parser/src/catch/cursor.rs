//! Character cursor for the Catch lexer, modeled on apollo-parser's
//! `lexer::cursor::Cursor` (bump/peek-ahead over a char stream), but
//! tracking a byte offset directly so callers can slice lexemes out of
//! the original source rather than re-accumulating them.

pub(crate) struct Cursor<'a> {
    source: &'a str,
    rest: std::str::Chars<'a>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            rest: source.chars(),
        }
    }

    /// Byte offset of the cursor's current position.
    pub(crate) fn pos(&self) -> usize {
        self.source.len() - self.rest.as_str().len()
    }

    pub(crate) fn first(&self) -> char {
        self.rest.clone().next().unwrap_or('\0')
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.rest.as_str().is_empty()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        self.rest.next()
    }

    /// The source slice from `start` (a byte offset returned by an
    /// earlier [`Cursor::pos`]) up to the cursor's current position.
    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos()]
    }
}
