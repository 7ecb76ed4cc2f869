//! Component B: the character-level finite automaton for Catch/C++
//! sources (§4.2).

use crate::catch::cursor::Cursor;
use crate::error::{Diagnostic, DiagnosticSink};
use crate::token::{Sym, Token};

/// Exact-case Catch macro keywords (state 7 of the automaton: an
/// identifier that matches one of these exactly is emitted as the
/// keyword instead).
const KEYWORDS: &[(&str, Sym)] = &[
    ("SCENARIO", Sym::Scenario),
    ("GIVEN", Sym::Given),
    ("WHEN", Sym::When),
    ("THEN", Sym::Then),
    ("AND_WHEN", Sym::AndWhen),
    ("AND_THEN", Sym::AndThen),
    ("TEST_CASE", Sym::TestCase),
    ("SECTION", Sym::Section),
];

/// Synonyms recognized inside a comment payload during comment
/// post-processing (§4.2). Only story/feature are extracted this way;
/// every other label stays a plain `comment`.
const COMMENT_LABELS: &[(&str, Sym)] = &[
    ("user story", Sym::Story),
    ("požadavek", Sym::Story),
    ("story", Sym::Story),
    ("feature", Sym::Feature),
    ("rys", Sym::Feature),
];

fn classify_comment(payload: &str) -> (Sym, String) {
    let trimmed = payload.trim();
    if let Some(colon) = trimmed.find(':') {
        let candidate = trimmed[..colon]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        for &(phrase, sym) in COMMENT_LABELS {
            if candidate == phrase {
                return (sym, trimmed[colon + 1..].trim().to_string());
            }
        }
    }
    (Sym::Comment, trimmed.to_string())
}

/// Lazily tokenizes a Catch/C++ source, terminating with exactly one
/// [`Sym::End`] token. Never fails outright: a lexical problem is
/// reported as one [`Sym::ErrorTok`] token followed immediately by
/// `$` (§4.2's error model), leaving the caller (the parser) to decide
/// whether to surface it as a [`crate::error::Error::Lexical`].
pub struct CatchLexer<'a, 's> {
    source_name: String,
    cursor: Cursor<'a>,
    line: u32,
    done: bool,
    force_end_next: bool,
    /// True at the very start of a logical line, i.e. right after a
    /// `\n` or at the start of the source, before any non-whitespace
    /// character has been consumed. Only in this position does a `#`
    /// start a preprocessor directive (§4.2); everywhere else it is a
    /// plain [`Sym::Hash`] token.
    start_of_line: bool,
    sink: DiagnosticSink<'s>,
}

impl<'a, 's> CatchLexer<'a, 's> {
    pub fn new(source: &'a str, source_name: &str, sink: DiagnosticSink<'s>) -> Self {
        Self {
            source_name: source_name.to_string(),
            cursor: Cursor::new(source),
            line: 1,
            done: false,
            force_end_next: false,
            start_of_line: true,
            sink,
        }
    }

    fn one_char(&mut self, sym: Sym, start: usize, line: u32) -> Token {
        Token::new(sym, "", self.cursor.slice_from(start), line)
    }

    fn error(&mut self, expected: &str, start: usize, line: u32) -> Token {
        self.force_end_next = true;
        Token::new(Sym::ErrorTok, expected, self.cursor.slice_from(start), line)
    }

    fn lex_assignment_or_eq(&mut self, start: usize, line: u32) -> Token {
        if self.cursor.first() == '=' {
            self.cursor.bump();
            Token::new(Sym::Eq, "", self.cursor.slice_from(start), line)
        } else {
            Token::new(Sym::Assignment, "", self.cursor.slice_from(start), line)
        }
    }

    fn lex_num(&mut self, start: usize, line: u32) -> Token {
        while self.cursor.first().is_ascii_digit() {
            self.cursor.bump();
        }
        let lexeme = self.cursor.slice_from(start);
        Token::new(Sym::Num, lexeme, lexeme, line)
    }

    fn lex_identifier(&mut self, start: usize, line: u32) -> Token {
        while self.cursor.first().is_alphanumeric() || self.cursor.first() == '_' {
            self.cursor.bump();
        }
        let lexeme = self.cursor.slice_from(start);
        match KEYWORDS.iter().find(|&&(kw, _)| kw == lexeme) {
            Some(&(_, sym)) => Token::new(sym, "", lexeme, line),
            None => {
                if let Some(&(kw, _)) = KEYWORDS.iter().find(|&&(kw, _)| kw.eq_ignore_ascii_case(lexeme)) {
                    (self.sink)(Diagnostic {
                        source_name: self.source_name.clone(),
                        line,
                        message: format!(
                            "identifier {lexeme:?} resembles the Catch keyword {kw} but its case doesn't match exactly; treated as a plain identifier"
                        ),
                    });
                }
                Token::new(Sym::Identifier, lexeme, lexeme, line)
            }
        }
    }

    fn lex_string(&mut self, start: usize, line: u32) -> Token {
        loop {
            match self.cursor.bump() {
                Some('"') => {
                    let lexeme = self.cursor.slice_from(start);
                    let value = &lexeme[1..lexeme.len() - 1];
                    return Token::new(Sym::StringLit, value, lexeme, line);
                }
                Some('\\') => {
                    self.cursor.bump();
                }
                Some('\n') => {
                    self.line += 1;
                }
                Some(_) => {}
                None => return self.error("'\"'", start, line),
            }
        }
    }

    fn lex_line_comment(&mut self, start: usize, line: u32) -> Token {
        self.cursor.bump(); // consume the second `/`
        while !self.cursor.is_eof() && self.cursor.first() != '\n' {
            self.cursor.bump();
        }
        let lexeme = self.cursor.slice_from(start);
        let payload = &lexeme[2..];
        let (sym, value) = classify_comment(payload);
        Token::new(sym, value, lexeme, line)
    }

    fn lex_block_comment(&mut self, start: usize, line: u32) -> Token {
        self.cursor.bump(); // consume the `*`
        loop {
            match self.cursor.bump() {
                Some('\n') => self.line += 1,
                Some('*') if self.cursor.first() == '/' => {
                    self.cursor.bump();
                    let lexeme = self.cursor.slice_from(start);
                    let payload = &lexeme[2..lexeme.len() - 2];
                    let (sym, value) = classify_comment(payload);
                    return Token::new(sym, value, lexeme, line);
                }
                Some(_) => {}
                None => return self.error("'*/'", start, line),
            }
        }
    }

    fn lex_preprocessor(&mut self, start: usize, line: u32) -> Token {
        loop {
            if self.cursor.is_eof() || self.cursor.first() == '\n' {
                break;
            }
            let c = self.cursor.bump().unwrap();
            if c == '\\' && self.cursor.first() == '\n' {
                self.cursor.bump();
                self.line += 1;
            }
        }
        let lexeme = self.cursor.slice_from(start);
        Token::new(Sym::PreprocessorDirective, lexeme.trim(), lexeme, line)
    }
}

impl<'a, 's> Iterator for CatchLexer<'a, 's> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        if self.force_end_next {
            self.done = true;
            return Some(Token::new(Sym::End, "", "", self.line));
        }

        loop {
            if self.cursor.is_eof() {
                self.done = true;
                return Some(Token::new(Sym::End, "", "", self.line));
            }

            let start = self.cursor.pos();
            let line = self.line;
            let c = self.cursor.bump().unwrap();

            if c == ' ' || c == '\t' || c == '\r' {
                continue;
            }
            if c == '\n' {
                self.line += 1;
                self.start_of_line = true;
                return Some(Token::new(Sym::Newline, "", self.cursor.slice_from(start), line));
            }

            let at_line_start = self.start_of_line;
            self.start_of_line = false;

            return Some(match c {
                '(' => self.one_char(Sym::LPar, start, line),
                ')' => self.one_char(Sym::RPar, start, line),
                '{' => self.one_char(Sym::LBrace, start, line),
                '}' => self.one_char(Sym::RBrace, start, line),
                ',' => self.one_char(Sym::Comma, start, line),
                ':' => self.one_char(Sym::Colon, start, line),
                ';' => self.one_char(Sym::Semic, start, line),
                '#' if at_line_start => self.lex_preprocessor(start, line),
                '#' => self.one_char(Sym::Hash, start, line),
                '=' => self.lex_assignment_or_eq(start, line),
                '"' => self.lex_string(start, line),
                '/' => match self.cursor.first() {
                    '/' => self.lex_line_comment(start, line),
                    '*' => self.lex_block_comment(start, line),
                    _ => self.error("'/' or '*'", start, line),
                },
                c if c.is_ascii_digit() => self.lex_num(start, line),
                c if c.is_alphabetic() || c == '_' => self.lex_identifier(start, line),
                other => self.error(&format!("unexpected {other:?}"), start, line),
            });
        }
    }
}

/// `lex_catch(source, source_name)` from the core API (§6).
pub fn lex_catch<'a, 's>(source: &'a str, source_name: &str, sink: DiagnosticSink<'s>) -> CatchLexer<'a, 's> {
    CatchLexer::new(source, source_name, sink)
}
