//! Black-box coverage of the six end-to-end scenarios in §8, exercised
//! through the public API only.

use catch_bdd_parser::{parse_catch, parse_feature, BddNode, Diagnostic, Error};
use pretty_assertions::assert_eq;
use unindent::unindent;

fn discard(_: Diagnostic) {}

#[test]
fn scenario_1_minimal_feature() {
    let source = unindent(
        "
        Scenario: scenario identifier
           Given: given identifier
            When: when identifier
            Then: then identifier
        ",
    );
    let tree = parse_feature(&source, "minimal.feature", &mut discard).unwrap();
    assert_eq!(
        tree,
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
    );
}

#[test]
fn scenario_2_story_and_description() {
    let source = unindent(
        "
        Story: story identifier

        As a user
        I want the feature
        so that my life is to be easier.

        Scenario: scenario identifier
           Given: given identifier
            When: when identifier
            Then: then identifier
        ",
    );
    let tree = parse_feature(&source, "story.feature", &mut discard).unwrap();
    assert_eq!(tree[0], BddNode::Story("story identifier".into()));
    assert_eq!(
        tree[1],
        BddNode::Description(vec![
            String::new(),
            "As a user".into(),
            "I want the feature".into(),
            "so that my life is to be easier.".into(),
            String::new(),
        ])
    );
}

#[test]
fn scenario_3_and_but_folding() {
    let source = unindent(
        "
        Scenario: s
          Given: g
          and: g2
           When: w
           but: w2
           Then: t
           and: t2
        ",
    );
    let tree = parse_feature(&source, "fold.feature", &mut discard).unwrap();
    let BddNode::Scenario { children, .. } = &tree[0] else {
        panic!("expected scenario");
    };
    let BddNode::Given {
        children: given_children,
        ..
    } = &children[0]
    else {
        panic!("expected given");
    };
    assert!(matches!(given_children[0], BddNode::AndGiven { .. }));
}

#[test]
fn scenario_4_czech_keywords() {
    let source = "Scénář: x\nDáno: a\nKdyž: b\na: c\nPak: d\n";
    let tree = parse_feature(source, "czech.feature", &mut discard).unwrap();
    assert_eq!(
        tree,
        vec![BddNode::Scenario {
            title: "x".into(),
            tags: None,
            children: vec![BddNode::Given {
                title: "a".into(),
                children: vec![BddNode::When {
                    title: "b".into(),
                    children: vec![BddNode::AndWhen {
                        title: "c".into(),
                        children: vec![BddNode::Then {
                            title: "d".into(),
                            children: vec![],
                        }],
                    }],
                }],
            }],
        }]
    );
}

#[test]
fn scenario_5_catch_recovery() {
    let source = "// Story: s\n\nSCENARIO( \"x\" ) {\n  GIVEN( \"g\" ) {\n    std::string fname{\"t.data\"};\n  }\n}";
    let tree = parse_catch(source, "t.h", &mut discard).unwrap();
    assert_eq!(
        tree,
        vec![
            BddNode::Story("s".into()),
            BddNode::Scenario {
                title: "x".into(),
                tags: None,
                children: vec![BddNode::Given {
                    title: "g".into(),
                    children: vec![],
                }],
            },
        ]
    );
}

#[test]
fn scenario_6_unterminated_literal() {
    let err = parse_catch("TEST_CASE(\"oops {", "t.h", &mut discard).unwrap_err();
    match err {
        Error::Lexical { line, expected, .. } => {
            assert_eq!(line, 1);
            assert!(expected.contains('"'));
        }
        other => panic!("expected Lexical, got {other:?}"),
    }
}
