//! Component A: the line-aware lexer for `*.feature` sources (§4.1).

use crate::error::{Diagnostic, DiagnosticSink};
use crate::token::{Sym, Token};

/// One recognizable label, already lower-cased for comparison. Ordered
/// so that the longest phrase is tried first ("the longest label
/// wins", §4.1).
const LABELS: &[(&str, Sym)] = &[
    ("uživatelský požadavek", Sym::Story),
    ("user story", Sym::Story),
    ("požadavek", Sym::Story),
    ("story", Sym::Story),
    ("feature", Sym::Feature),
    ("rys", Sym::Feature),
    ("scénář", Sym::Scenario),
    ("scenario", Sym::Scenario),
    ("příklad", Sym::Scenario),
    ("example", Sym::Scenario),
    ("section", Sym::Section),
    ("sec", Sym::Section),
    ("test", Sym::TestCase),
    ("dáno", Sym::Given),
    ("given", Sym::Given),
    ("když", Sym::When),
    ("when", Sym::When),
    ("pak", Sym::Then),
    ("then", Sym::Then),
    ("and", Sym::And),
    ("but", Sym::But),
    ("ale", Sym::But),
    ("a", Sym::And),
];

fn normalize_label(candidate: &str) -> String {
    candidate.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Splits already-trimmed scenario/test_case payload text into its
/// identifier and an optional `[tag1][tag2]…` suffix.
fn split_tags(payload: &str) -> (String, Option<String>) {
    let trimmed = payload.trim();
    let bytes = trimmed.as_bytes();
    if bytes.last() != Some(&b']') {
        return (trimmed.to_string(), None);
    }

    // Walk backwards over balanced `[...]` groups made only of word
    // characters, so `[slow][net]` is captured but free text ending in
    // a bracket (e.g. "do the thing [for real]") degrades gracefully
    // to "no tags" if its bracket body isn't `\w+`.
    let mut idx = trimmed.len();
    loop {
        let Some(open) = trimmed[..idx].rfind('[') else {
            break;
        };
        let close = idx - 1;
        if trimmed.as_bytes()[close] != b']' {
            break;
        }
        let body = &trimmed[open + 1..close];
        if body.is_empty() || !body.chars().all(|c| c.is_alphanumeric() || c == '_') {
            break;
        }
        idx = open;
    }

    if idx == trimmed.len() {
        (trimmed.to_string(), None)
    } else {
        let value = trimmed[..idx].trim_end().to_string();
        let tags = trimmed[idx..].to_string();
        (value, Some(tags))
    }
}

/// First run of alphabetic characters in `after_leading`, used to test
/// whether a line that didn't parse as a label merely *looks* like one
/// (§9's first open question: "a label-like prefix followed by
/// anything other than a colon").
fn first_word(after_leading: &str) -> &str {
    let end = after_leading
        .char_indices()
        .find(|&(_, c)| !c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(after_leading.len());
    &after_leading[..end]
}

/// True when `after_leading`'s first word matches a known label phrase
/// (case-insensitively) even though the line as a whole didn't satisfy
/// the "colon required" rule and was classified as plain `line` text.
fn looks_label_like(after_leading: &str) -> bool {
    let word = first_word(after_leading).to_lowercase();
    !word.is_empty() && LABELS.iter().any(|&(phrase, _)| phrase.split(' ').next() == Some(word.as_str()))
}

/// Classifies one line. The third element of the returned tuple is
/// `true` exactly when the line fell through to plain `line` text but
/// resembles a structural label closely enough to be worth a
/// diagnostic (§7: "a token whose symbol could not be classified").
fn classify(line: &str) -> (Sym, String, Option<String>, bool) {
    let stripped = line.trim_end_matches(['\n', '\r']);
    if stripped.trim().is_empty() {
        return (Sym::EmptyLine, String::new(), None, false);
    }

    let leading_ws = stripped.len() - stripped.trim_start().len();
    let after_leading = &stripped[leading_ws..];
    if let Some(colon) = after_leading.find(':') {
        let candidate = normalize_label(&after_leading[..colon]);
        let mut best: Option<(&str, Sym)> = None;
        for &(phrase, sym) in LABELS {
            if candidate == phrase
                && best.map(|(best_phrase, _)| phrase.len() > best_phrase.len()).unwrap_or(true)
            {
                best = Some((phrase, sym));
            }
        }
        if let Some((_, sym)) = best {
            let payload = after_leading[colon + 1..].trim();
            return match sym {
                Sym::Scenario | Sym::TestCase => {
                    let (text, tags) = split_tags(payload);
                    (sym, text, tags, false)
                }
                _ => (sym, payload.to_string(), None, false),
            };
        }
    }

    let ambiguous = looks_label_like(after_leading);
    (Sym::Line, stripped.trim_end().to_string(), None, ambiguous)
}

/// Splits `source` into lines, preserving each line's trailing newline
/// exactly when present in the original text — required so that the
/// lexeme invariant ("lexeme always includes the original line's
/// newline if one was present") holds even for the final line.
fn split_lines(source: &str) -> Vec<&str> {
    if source.is_empty() {
        Vec::new()
    } else {
        source.split_inclusive('\n').collect()
    }
}

/// Lazily tokenizes a `*.feature` source, terminating with exactly one
/// [`Sym::End`] token. Never fails: unrecognized lines become
/// [`Sym::Line`] tokens, per §4.1's error model; a line that merely
/// resembles a label is reported through the caller's [`DiagnosticSink`]
/// instead (§7).
pub struct FeatureLexer<'a, 's> {
    source_name: String,
    lines: std::vec::IntoIter<&'a str>,
    lineno: u32,
    done: bool,
    sink: DiagnosticSink<'s>,
}

impl<'a, 's> FeatureLexer<'a, 's> {
    pub fn new(source: &'a str, source_name: &str, sink: DiagnosticSink<'s>) -> Self {
        Self {
            source_name: source_name.to_string(),
            lines: split_lines(source).into_iter(),
            lineno: 0,
            done: false,
            sink,
        }
    }
}

impl<'a, 's> Iterator for FeatureLexer<'a, 's> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }

        match self.lines.next() {
            Some(line) => {
                self.lineno += 1;
                let (sym, value, tags, ambiguous) = classify(line);
                if ambiguous {
                    (self.sink)(Diagnostic {
                        source_name: self.source_name.clone(),
                        line: self.lineno,
                        message: format!(
                            "line resembles a structural label but has no colon; treated as plain text: {value:?}"
                        ),
                    });
                }
                Some(Token::new(sym, value, line, self.lineno).with_tags(tags))
            }
            None => {
                self.done = true;
                Some(Token::new(Sym::End, "", "", self.lineno + 1))
            }
        }
    }
}

/// `lex_feature(source, source_name)` from the core API (§6).
pub fn lex_feature<'a, 's>(
    source: &'a str,
    source_name: &str,
    sink: DiagnosticSink<'s>,
) -> FeatureLexer<'a, 's> {
    FeatureLexer::new(source, source_name, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn discard(_: Diagnostic) {}

    fn syms(source: &str) -> Vec<Sym> {
        lex_feature(source, "test.feature", &mut discard)
            .map(|t| t.sym)
            .collect()
    }

    #[test]
    fn empty_source_is_just_end() {
        assert_eq!(syms(""), vec![Sym::End]);
    }

    #[test]
    fn minimal_scenario() {
        let source = "Scenario: scenario identifier\n   Given: given identifier\n    When: when identifier\n    Then: then identifier\n";
        assert_eq!(
            syms(source),
            vec![Sym::Scenario, Sym::Given, Sym::When, Sym::Then, Sym::End]
        );
    }

    #[test]
    fn czech_keywords() {
        let source = "Scénář: x\nDáno: a\nKdyž: b\na: c\nPak: d\n";
        assert_eq!(
            syms(source),
            vec![
                Sym::Scenario,
                Sym::Given,
                Sym::When,
                Sym::And,
                Sym::Then,
                Sym::End
            ]
        );
    }

    #[test]
    fn scenario_tags_are_split_from_title() {
        let mut tokens = lex_feature(
            "Scenario: name for scenario[slow][net]\n",
            "test.feature",
            &mut discard,
        );
        let tok = tokens.next().unwrap();
        assert_eq!(tok.value, "name for scenario");
        assert_eq!(tok.tags.as_deref(), Some("[slow][net]"));
    }

    #[test]
    fn label_like_prefix_without_colon_is_a_line() {
        assert_eq!(syms("Given it away\n"), vec![Sym::Line, Sym::End]);
    }

    #[test]
    fn label_like_prefix_without_colon_raises_a_diagnostic() {
        let mut seen = Vec::new();
        let tokens: Vec<Token> = lex_feature("Given it away\n", "ambiguous.feature", &mut |d| {
            seen.push(d)
        })
        .collect();
        assert_eq!(tokens[0].sym, Sym::Line);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].source_name, "ambiguous.feature");
        assert_eq!(seen[0].line, 1);
    }

    #[test]
    fn blank_line_is_emptyline() {
        assert_eq!(syms("   \n"), vec![Sym::EmptyLine, Sym::End]);
    }

    #[test]
    fn lexeme_reconstructs_source_without_trailing_newline() {
        let source = "Story: s\nrest";
        let lexemes: String = lex_feature(source, "test.feature", &mut discard)
            .take_while(|t| t.sym != Sym::End)
            .map(|t| t.lexeme)
            .collect();
        assert_eq!(lexemes, source);
    }
}
