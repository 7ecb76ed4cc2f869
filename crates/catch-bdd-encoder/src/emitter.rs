//! Component E: lowers a BDD tree to a formatted Catch skeleton (§4.5).

use std::fmt::{self, Write as _};

use catch_bdd_parser::{check_invariants, BddNode, BddTree, Error};

use crate::options::EmitOptions;

/// `emit_catch(tree, options) -> string` from the core API (§6).
///
/// Validates the tree's §3.2 invariants first: a tree built by hand
/// (rather than returned by one of the two parsers) that violates them
/// is the one way this otherwise-infallible function can fail (§4.5,
/// "an unknown node tag is a programming error").
pub fn emit_catch(tree: &BddTree, options: &EmitOptions) -> Result<String, Error> {
    check_invariants(tree).map_err(Error::Invariant)?;

    let mut buf = String::new();
    for node in tree {
        emit_node(&mut buf, node, 0, options).expect("writing to a String never fails");
    }

    writeln!(buf).unwrap();
    writeln!(buf, "// Generated by catch-bdd-tool; hand-edit only inside the macro bodies.").unwrap();
    writeln!(buf, "// https://github.com/pepr-bdd/catch-bdd-tool").unwrap();
    Ok(buf)
}

fn emit_node(buf: &mut String, node: &BddNode, depth: usize, options: &EmitOptions) -> fmt::Result {
    let indent = options.indent_unit.repeat(depth);
    match node {
        BddNode::Story(text) => writeln!(buf, "{indent}// Story: {text}"),
        BddNode::Feature(text) => writeln!(buf, "{indent}// Feature: {text}"),
        BddNode::Description(lines) => emit_description(buf, lines, &indent),
        BddNode::TestCase {
            title,
            tags,
            children,
        } => emit_block(buf, "TEST_CASE", title, tags.as_deref(), None, children, depth, options),
        BddNode::Scenario {
            title,
            tags,
            children,
        } => emit_block(buf, "SCENARIO", title, tags.as_deref(), None, children, depth, options),
        BddNode::Section { title, children } => emit_block(
            buf,
            "SECTION",
            title,
            None,
            Some("TODO: fill in section body"),
            children,
            depth,
            options,
        ),
        BddNode::Given { title, children } => {
            emit_block(buf, "GIVEN", title, None, Some("set up initial state"), children, depth, options)
        }
        BddNode::AndGiven { title, children } => {
            // Catch has no AND_GIVEN macro; and_given lowers to a
            // second, nested GIVEN (§4.5).
            emit_block(buf, "GIVEN", title, None, Some("set up initial state"), children, depth, options)
        }
        BddNode::When { title, children } => {
            emit_block(buf, "WHEN", title, None, Some("perform operation"), children, depth, options)
        }
        BddNode::AndWhen { title, children } => {
            emit_block(buf, "AND_WHEN", title, None, Some("perform operation"), children, depth, options)
        }
        BddNode::Then { title, children } => {
            emit_block(buf, "THEN", title, None, Some("assert expected state"), children, depth, options)
        }
        BddNode::AndThen { title, children } => {
            emit_block(buf, "AND_THEN", title, None, Some("assert expected state"), children, depth, options)
        }
    }
}

fn emit_description(buf: &mut String, lines: &[String], indent: &str) -> fmt::Result {
    writeln!(buf, "{indent}//")?;
    for line in lines {
        if line.is_empty() {
            writeln!(buf, "{indent}//")?;
        } else {
            writeln!(buf, "{indent}// {line}")?;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn emit_block(
    buf: &mut String,
    macro_name: &str,
    title: &str,
    tags: Option<&str>,
    hint: Option<&str>,
    children: &[BddNode],
    depth: usize,
    options: &EmitOptions,
) -> fmt::Result {
    let indent = options.indent_unit.repeat(depth);
    let is_top_level = matches!(macro_name, "TEST_CASE" | "SCENARIO");
    if is_top_level {
        writeln!(buf)?;
    }
    writeln!(buf, "{indent}{}", macro_head(macro_name, title, tags, options))?;
    if let (Some(hint), true) = (hint, options.hint_flag) {
        writeln!(buf, "{indent}{}// {hint}", options.indent_unit)?;
    }
    if hint.is_some() {
        writeln!(buf, "{indent}{}REQUIRE(false);", options.indent_unit)?;
    }
    for child in children {
        emit_node(buf, child, depth + 1, options)?;
    }
    writeln!(buf, "{indent}}}")
}

fn macro_head(name: &str, title: &str, tags: Option<&str>, options: &EmitOptions) -> String {
    let mut head = String::new();
    head.push_str(name);
    head.push_str(&options.open_paren);
    head.push_str(&escape(title));
    if let Some(tags) = tags {
        head.push_str("\", \"");
        head.push_str(&escape(tags));
    }
    head.push_str(&options.close_paren);
    head.push_str(" {");
    head
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal_tree() -> BddTree {
        vec![BddNode::Scenario {
            title: "scenario identifier".into(),
            tags: None,
            children: vec![BddNode::Given {
                title: "given identifier".into(),
                children: vec![BddNode::When {
                    title: "when identifier".into(),
                    children: vec![BddNode::Then {
                        title: "then identifier".into(),
                        children: vec![],
                    }],
                }],
            }],
        }]
    }

    #[test]
    fn emits_matching_braces_and_macro_heads() {
        let out = emit_catch(&minimal_tree(), &EmitOptions::default()).unwrap();
        assert!(out.contains("SCENARIO( \"scenario identifier\" ) {"));
        assert!(out.contains("GIVEN( \"given identifier\" ) {"));
        assert!(out.contains("WHEN( \"when identifier\" ) {"));
        assert!(out.contains("THEN( \"then identifier\" ) {"));
        assert_eq!(out.matches('{').count(), out.matches('}').count());
        assert_eq!(out.matches('{').count(), 4);
    }

    #[test]
    fn story_and_description_render_as_line_comments() {
        let tree = vec![
            BddNode::Story("story identifier".into()),
            BddNode::Description(vec![
                "As a user".into(),
                "I want the feature".into(),
                String::new(),
            ]),
        ];
        let out = emit_catch(&tree, &EmitOptions::default()).unwrap();
        let expected = indoc::indoc! {"
            // Story: story identifier
            //
            // As a user
            // I want the feature
            //
        "};
        assert!(out.starts_with(expected));
    }

    #[test]
    fn hint_flag_false_omits_comments() {
        let options = EmitOptions {
            hint_flag: false,
            ..EmitOptions::default()
        };
        let out = emit_catch(&minimal_tree(), &options).unwrap();
        assert!(!out.contains("set up initial state"));
        assert!(out.contains("REQUIRE(false);"));
    }

    #[test]
    fn and_given_lowers_to_given_macro() {
        let tree = vec![BddNode::Scenario {
            title: "s".into(),
            tags: None,
            children: vec![BddNode::Given {
                title: "g".into(),
                children: vec![BddNode::AndGiven {
                    title: "g2".into(),
                    children: vec![],
                }],
            }],
        }];
        let out = emit_catch(&tree, &EmitOptions::default()).unwrap();
        assert!(out.contains("GIVEN( \"g\" ) {"));
        assert!(out.contains("GIVEN( \"g2\" ) {"));
        assert!(!out.contains("AND_GIVEN"));
    }

    #[test]
    fn titles_with_quotes_are_escaped() {
        let tree = vec![BddNode::Scenario {
            title: "say \"hi\"".into(),
            tags: None,
            children: vec![],
        }];
        let out = emit_catch(&tree, &EmitOptions::default()).unwrap();
        assert!(out.contains("SCENARIO( \"say \\\"hi\\\"\" ) {"));
    }

    #[test]
    fn tags_render_as_second_argument() {
        let tree = vec![BddNode::Scenario {
            title: "x".into(),
            tags: Some("[slow][net]".into()),
            children: vec![],
        }];
        let out = emit_catch(&tree, &EmitOptions::default()).unwrap();
        assert!(out.contains("SCENARIO( \"x\", \"[slow][net]\" ) {"));
    }

    #[test]
    fn malformed_tree_is_an_invariant_violation() {
        let tree = vec![BddNode::Scenario {
            title: "s".into(),
            tags: None,
            children: vec![BddNode::Section {
                title: "oops".into(),
                children: vec![],
            }],
        }];
        assert!(matches!(
            emit_catch(&tree, &EmitOptions::default()),
            Err(Error::Invariant(_))
        ));
    }
}
