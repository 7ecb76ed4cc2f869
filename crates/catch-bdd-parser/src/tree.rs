//! The language-neutral BDD tree (§3.2): the shared target of both
//! parsers and the shared source of the emitter.

/// One node of a BDD tree.
///
/// `description` is the only variant that does not carry child nodes;
/// it carries its own ordered line list instead. Every other variant
/// carries a title and an ordered, exclusively-owned child vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BddNode {
    Story(String),
    Feature(String),
    Description(Vec<String>),
    TestCase {
        title: String,
        tags: Option<String>,
        children: Vec<BddNode>,
    },
    Scenario {
        title: String,
        tags: Option<String>,
        children: Vec<BddNode>,
    },
    Section {
        title: String,
        children: Vec<BddNode>,
    },
    Given {
        title: String,
        children: Vec<BddNode>,
    },
    AndGiven {
        title: String,
        children: Vec<BddNode>,
    },
    When {
        title: String,
        children: Vec<BddNode>,
    },
    AndWhen {
        title: String,
        children: Vec<BddNode>,
    },
    Then {
        title: String,
        children: Vec<BddNode>,
    },
    AndThen {
        title: String,
        children: Vec<BddNode>,
    },
}

/// A BDD tree is a forest: a document is a flat, ordered list of
/// top-level nodes (at most one story/feature/description, then a
/// series of scenarios or test cases).
pub type BddTree = Vec<BddNode>;

impl BddNode {
    /// Name of the node's tag, used in diagnostics and by the emitter
    /// to reject unknown tags (it can't happen in-process, but the
    /// emitter's contract calls for the check regardless, see §7).
    pub fn tag(&self) -> &'static str {
        match self {
            BddNode::Story(_) => "story",
            BddNode::Feature(_) => "feature",
            BddNode::Description(_) => "description",
            BddNode::TestCase { .. } => "test_case",
            BddNode::Scenario { .. } => "scenario",
            BddNode::Section { .. } => "section",
            BddNode::Given { .. } => "given",
            BddNode::AndGiven { .. } => "and_given",
            BddNode::When { .. } => "when",
            BddNode::AndWhen { .. } => "and_when",
            BddNode::Then { .. } => "then",
            BddNode::AndThen { .. } => "and_then",
        }
    }

    pub fn children(&self) -> &[BddNode] {
        match self {
            BddNode::Story(_) | BddNode::Feature(_) | BddNode::Description(_) => &[],
            BddNode::TestCase { children, .. }
            | BddNode::Scenario { children, .. }
            | BddNode::Section { children, .. }
            | BddNode::Given { children, .. }
            | BddNode::AndGiven { children, .. }
            | BddNode::When { children, .. }
            | BddNode::AndWhen { children, .. }
            | BddNode::Then { children, .. }
            | BddNode::AndThen { children, .. } => children,
        }
    }
}

/// Checks the tree-shaped invariants every component is required to
/// preserve (§3.2): at most one story/feature and one description at
/// the root, `scenario` descendants restricted to Given/When/Then
/// families, `test_case` descendants restricted to `section`, and
/// every `and_*` node has a matching non-`and_*` ancestor.
///
/// Returns the first violation found, as a human-readable message.
pub fn check_invariants(tree: &BddTree) -> Result<(), String> {
    let story_or_feature = tree
        .iter()
        .filter(|n| matches!(n, BddNode::Story(_) | BddNode::Feature(_)))
        .count();
    if story_or_feature > 1 {
        return Err("more than one story/feature node at the root".to_string());
    }
    let descriptions = tree
        .iter()
        .filter(|n| matches!(n, BddNode::Description(_)))
        .count();
    if descriptions > 1 {
        return Err("more than one description node at the root".to_string());
    }

    for node in tree {
        match node {
            BddNode::Scenario { children, .. } => check_given_family(children)?,
            BddNode::TestCase { children, .. } => check_section_family(children)?,
            BddNode::Story(_) | BddNode::Feature(_) | BddNode::Description(_) => {}
            other => return Err(format!("unexpected node {:?} at document root", other.tag())),
        }
    }
    Ok(())
}

fn check_section_family(children: &[BddNode]) -> Result<(), String> {
    for child in children {
        match child {
            BddNode::Section { children, .. } => check_section_family(children)?,
            other => {
                return Err(format!(
                    "test_case descendant must be a section, found {:?}",
                    other.tag()
                ))
            }
        }
    }
    Ok(())
}

fn check_given_family(children: &[BddNode]) -> Result<(), String> {
    for child in children {
        match child {
            BddNode::Given { children, .. } => check_when_family(children, false)?,
            other => {
                return Err(format!(
                    "scenario descendant must be given, found {:?}",
                    other.tag()
                ))
            }
        }
    }
    Ok(())
}

fn check_when_family(children: &[BddNode], is_and: bool) -> Result<(), String> {
    let what = if is_and { "and_given" } else { "given" };
    for child in children {
        match child {
            BddNode::AndGiven { children, .. } => check_when_family(children, true)?,
            BddNode::When { children, .. } => check_then_family(children, false)?,
            other => {
                return Err(format!(
                    "{what} body must be when/and_given, found {:?}",
                    other.tag()
                ))
            }
        }
    }
    Ok(())
}

fn check_then_family(children: &[BddNode], _is_and: bool) -> Result<(), String> {
    for child in children {
        match child {
            BddNode::Then { children, .. } => check_and_then_family(children)?,
            BddNode::AndWhen { children, .. } => check_then_family(children, true)?,
            other => {
                return Err(format!(
                    "when body must be then/and_when, found {:?}",
                    other.tag()
                ))
            }
        }
    }
    Ok(())
}

fn check_and_then_family(children: &[BddNode]) -> Result<(), String> {
    for child in children {
        match child {
            BddNode::AndThen { children, .. } => check_and_then_family(children)?,
            other => {
                return Err(format!(
                    "then body must be and_then, found {:?}",
                    other.tag()
                ))
            }
        }
    }
    Ok(())
}
