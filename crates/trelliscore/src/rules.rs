//! Static parent/child relationship rules between node kinds.
//!
//! Five tables plus the canonical execution order. The tables only
//! constrain the kinds they list; a parent kind with no entry accepts any
//! child. Executors consult these through their default validate path.

use crate::{kind, FlowDocument, FlowNode, ValidationReport};

/// Parent kind -> permitted child kinds
const ALLOWED_CHILDREN: &[(&str, &[&str])] = &[
    (kind::SWITCH, &[kind::CASE, kind::DEFAULT_CASE]),
    (kind::IF, &[kind::TRUE_BRANCH, kind::FALSE_BRANCH]),
    (kind::TRY_CATCH, &[kind::TRY_BLOCK, kind::CATCH_BLOCK]),
    (kind::AGENT, &[kind::LLM, kind::MEMORY, kind::TOOLS]),
];

/// Parent kind -> child kinds that must appear at least once (hard errors)
const REQUIRED_CHILDREN: &[(&str, &[&str])] = &[
    (kind::SWITCH, &[kind::CASE]),
    (kind::IF, &[kind::TRUE_BRANCH]),
    (kind::TRY_CATCH, &[kind::TRY_BLOCK]),
    (kind::AGENT, &[kind::LLM]),
];

/// Parent kind -> recommended child kinds (missing ones are warnings)
const RECOMMENDED_CHILDREN: &[(&str, &[&str])] = &[(kind::AGENT, &[kind::MEMORY])];

/// Child kinds that must not co-occur under one parent: arms belonging to
/// different control constructs
const MUTUALLY_EXCLUSIVE: &[(&str, &str)] = &[
    (kind::CASE, kind::TRUE_BRANCH),
    (kind::CASE, kind::TRY_BLOCK),
    (kind::TRUE_BRANCH, kind::TRY_BLOCK),
];

/// Child kind -> parent kinds it is expected to live under. Only used to
/// emit advisory warnings when the child is found elsewhere.
const DECLARED_PARENTS: &[(&str, &[&str])] = &[
    (kind::CASE, &[kind::SWITCH]),
    (kind::DEFAULT_CASE, &[kind::SWITCH]),
    (kind::TRUE_BRANCH, &[kind::IF]),
    (kind::FALSE_BRANCH, &[kind::IF]),
    (kind::TRY_BLOCK, &[kind::TRY_CATCH]),
    (kind::CATCH_BLOCK, &[kind::TRY_CATCH]),
    (kind::BREAK, &[kind::LOOP]),
    (kind::LLM, &[kind::AGENT]),
    (kind::MEMORY, &[kind::AGENT]),
    (kind::TOOLS, &[kind::AGENT]),
];

fn lookup<'a>(table: &[(&str, &'a [&'a str])], key: &str) -> Option<&'a [&'a str]> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

pub fn allowed_children(parent_kind: &str) -> Option<&'static [&'static str]> {
    lookup(ALLOWED_CHILDREN, parent_kind)
}

pub fn declared_parents(child_kind: &str) -> Option<&'static [&'static str]> {
    lookup(DECLARED_PARENTS, child_kind)
}

/// Run every relationship table against one node, appending findings to
/// the report. `doc` supplies the parent lookup for the declared
/// dependency check.
pub fn check_relationships(node: &FlowNode, doc: &FlowDocument, report: &mut ValidationReport) {
    if let Some(allowed) = allowed_children(&node.kind) {
        for child in &node.children {
            if !allowed.contains(&child.kind.as_str()) {
                report.error(
                    &node.id,
                    format!(
                        "'{}' may not contain a '{}' child (allowed: {})",
                        node.kind,
                        child.kind,
                        allowed.join(", ")
                    ),
                );
            }
        }
    }

    if let Some(required) = lookup(REQUIRED_CHILDREN, &node.kind) {
        for needed in required {
            if !node.children.iter().any(|c| c.kind == *needed) {
                report.error(
                    &node.id,
                    format!("'{}' requires at least one '{}' child", node.kind, needed),
                );
            }
        }
    }

    if let Some(recommended) = lookup(RECOMMENDED_CHILDREN, &node.kind) {
        for wanted in recommended {
            if !node.children.iter().any(|c| c.kind == *wanted) {
                report.warn(
                    &node.id,
                    format!("'{}' usually carries a '{}' child", node.kind, wanted),
                );
            }
        }
    }

    for (a, b) in MUTUALLY_EXCLUSIVE {
        let has_a = node.children.iter().any(|c| c.kind == *a);
        let has_b = node.children.iter().any(|c| c.kind == *b);
        if has_a && has_b {
            report.error(
                &node.id,
                format!("children '{}' and '{}' must not co-occur under one parent", a, b),
            );
        }
    }

    if let Some(expected) = declared_parents(&node.kind) {
        let parent_kind = doc.find_parent(&node.id).map(|p| p.kind.as_str());
        let placed_well = matches!(parent_kind, Some(k) if expected.contains(&k));
        if !placed_well {
            report.warn(
                &node.id,
                format!(
                    "'{}' is usually nested under {}, found under '{}'",
                    node.kind,
                    expected.join(" or "),
                    parent_kind.unwrap_or("the document root")
                ),
            );
        }
    }
}

/// The subset and ordering of children that should actually run for a
/// multi-child kind. Branching kinds return all children because the
/// selection happens at runtime; the agent runs its components in a fixed
/// llm -> memory -> tools sequence regardless of authored order.
pub fn execution_order<'a>(parent_kind: &str, children: &'a [FlowNode]) -> Vec<&'a FlowNode> {
    match parent_kind {
        kind::TRY_CATCH => {
            let mut ordered: Vec<&FlowNode> = children
                .iter()
                .filter(|c| c.kind == kind::TRY_BLOCK)
                .collect();
            ordered.extend(children.iter().filter(|c| c.kind == kind::CATCH_BLOCK));
            ordered
        }
        kind::AGENT => [kind::LLM, kind::MEMORY, kind::TOOLS]
            .iter()
            .flat_map(|component| children.iter().filter(move |c| c.kind == *component))
            .collect(),
        _ => children.iter().collect(),
    }
}
