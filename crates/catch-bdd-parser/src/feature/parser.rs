//! Component C: recursive-descent parser for `*.feature` sources (§4.3).

use crate::error::{DiagnosticSink, Error, Result};
use crate::feature::lexer::FeatureLexer;
use crate::token::{Sym, Token};
use crate::tree::{BddNode, BddTree};

struct Parser<'a, 's> {
    source_name: String,
    tokens: std::iter::Peekable<FeatureLexer<'a, 's>>,
    current: Token,
}

impl<'a, 's> Parser<'a, 's> {
    fn new(source: &'a str, source_name: &str, sink: DiagnosticSink<'s>) -> Self {
        let mut tokens = FeatureLexer::new(source, source_name, sink).peekable();
        let current = tokens.next().expect("lexer always yields at least `$`");
        Self {
            source_name: source_name.to_string(),
            tokens,
            current,
        }
    }

    fn sym(&self) -> Sym {
        self.current.sym
    }

    fn bump(&mut self) -> Token {
        let next = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::new(Sym::End, "", "", self.current.line));
        std::mem::replace(&mut self.current, next)
    }

    fn skip_emptylines(&mut self) {
        while self.sym() == Sym::EmptyLine {
            self.bump();
        }
    }

    fn error(&self, expected: &[&'static str]) -> Error {
        Error::Syntax {
            source_name: self.source_name.clone(),
            line: self.current.line,
            expected: expected.to_vec(),
            found: format!("{:?}", self.sym()),
        }
    }
}

/// `parse_feature(source, source_name)` from the core API (§6).
pub fn parse_feature(source: &str, source_name: &str, sink: DiagnosticSink) -> Result<BddTree> {
    let mut p = Parser::new(source, source_name, sink);
    let mut tree = Vec::new();

    parse_feature_or_story(&mut p, &mut tree)?;
    parse_test_case_or_scenario_serie(&mut p, &mut tree)?;

    if p.sym() != Sym::End {
        return Err(p.error(&["test_case", "scenario", "$"]));
    }
    Ok(tree)
}

fn parse_feature_or_story(p: &mut Parser, tree: &mut BddTree) -> Result<()> {
    p.skip_emptylines();
    match p.sym() {
        Sym::Story => {
            let text = p.current.value.clone();
            p.bump();
            tree.push(BddNode::Story(text));
            let lines = parse_description(p);
            if !lines.is_empty() {
                tree.push(BddNode::Description(lines));
            }
        }
        Sym::Feature => {
            let text = p.current.value.clone();
            p.bump();
            tree.push(BddNode::Feature(text));
            let lines = parse_description(p);
            if !lines.is_empty() {
                tree.push(BddNode::Description(lines));
            }
        }
        Sym::End | Sym::Scenario | Sym::TestCase => {
            // No story/feature definition — empty preamble is accepted.
        }
        _ => return Err(p.error(&["story", "feature", "scenario", "test_case", "$"])),
    }
    Ok(())
}

/// Collects description lines. Per the "description boundary" design
/// note, lines that would otherwise be classified as Given/When/Then/
/// And/But/Section are absorbed verbatim via their lexeme rather than
/// ending the narrative — only Story/Feature/Scenario/Test/`$` end it.
fn parse_description(p: &mut Parser) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        match p.sym() {
            Sym::Line => {
                lines.push(p.current.value.clone());
                p.bump();
            }
            Sym::EmptyLine => {
                lines.push(String::new());
                p.bump();
            }
            Sym::Given | Sym::When | Sym::Then | Sym::And | Sym::But | Sym::Section => {
                let lexeme = p.current.lexeme.trim_end_matches(['\n', '\r']).to_string();
                lines.push(lexeme);
                p.bump();
            }
            _ => break,
        }
    }
    lines
}

fn parse_test_case_or_scenario_serie(p: &mut Parser, tree: &mut BddTree) -> Result<()> {
    loop {
        match p.sym() {
            Sym::TestCase => tree.push(parse_test_case(p)?),
            Sym::Scenario => tree.push(parse_scenario(p)?),
            Sym::EmptyLine => {
                p.bump();
            }
            Sym::End => break,
            _ => return Err(p.error(&["test_case", "scenario"])),
        }
    }
    Ok(())
}

fn parse_test_case(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    let tags = p.current.tags.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::Section => parse_section_serie(p)?,
        _ => Vec::new(),
    };
    Ok(BddNode::TestCase {
        title,
        tags,
        children,
    })
}

fn parse_section_serie(p: &mut Parser) -> Result<Vec<BddNode>> {
    let mut items = Vec::new();
    loop {
        p.skip_emptylines();
        if p.sym() != Sym::Section {
            break;
        }
        let title = p.current.value.clone();
        p.bump();
        items.push(BddNode::Section {
            title,
            children: Vec::new(),
        });
    }
    Ok(items)
}

fn parse_scenario(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    let tags = p.current.tags.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::Given => parse_given_serie(p)?,
        _ => Vec::new(),
    };
    Ok(BddNode::Scenario {
        title,
        tags,
        children,
    })
}

fn parse_given_serie(p: &mut Parser) -> Result<Vec<BddNode>> {
    let mut items = Vec::new();
    loop {
        p.skip_emptylines();
        if p.sym() != Sym::Given {
            break;
        }
        items.push(parse_given(p)?);
    }
    Ok(items)
}

fn parse_given(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::When => parse_when_serie(p)?,
        Sym::And | Sym::But => vec![parse_and_given(p)?],
        _ => Vec::new(),
    };
    Ok(BddNode::Given { title, children })
}

fn parse_and_given(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::When => parse_when_serie(p)?,
        Sym::And | Sym::But => vec![parse_and_given(p)?],
        _ => Vec::new(),
    };
    Ok(BddNode::AndGiven { title, children })
}

fn parse_when_serie(p: &mut Parser) -> Result<Vec<BddNode>> {
    let mut items = Vec::new();
    loop {
        p.skip_emptylines();
        if p.sym() != Sym::When {
            break;
        }
        items.push(parse_when(p)?);
    }
    Ok(items)
}

fn parse_when(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::Then => vec![parse_then(p)?],
        Sym::And | Sym::But => vec![parse_and_when(p)?],
        _ => Vec::new(),
    };
    Ok(BddNode::When { title, children })
}

fn parse_and_when(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::Then => vec![parse_then(p)?],
        Sym::And | Sym::But => vec![parse_and_when(p)?],
        _ => Vec::new(),
    };
    Ok(BddNode::AndWhen { title, children })
}

fn parse_then(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::And | Sym::But => vec![parse_and_then(p)?],
        _ => Vec::new(),
    };
    Ok(BddNode::Then { title, children })
}

fn parse_and_then(p: &mut Parser) -> Result<BddNode> {
    let title = p.current.value.clone();
    p.bump();
    p.skip_emptylines();
    let children = match p.sym() {
        Sym::And | Sym::But => vec![parse_and_then(p)?],
        _ => Vec::new(),
    };
    Ok(BddNode::AndThen { title, children })
}
