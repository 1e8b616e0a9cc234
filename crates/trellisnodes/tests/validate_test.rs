mod common;

use common::engine;
use trelliscore::{kind, FlowDocument, FlowNode, InputValue};

fn doc_with(root: FlowNode) -> FlowDocument {
    let mut doc = FlowDocument::new("validate");
    doc.add_node(root);
    doc
}

#[test]
fn well_formed_document_is_valid() {
    let doc = doc_with(
        FlowNode::new("start", kind::START).with_child(
            FlowNode::new("sw", kind::SWITCH)
                .with_field("expression", "{{x}}")
                .with_child(FlowNode::new("c", kind::CASE).with_field("value", "a")),
        ),
    );

    let report = engine().validate_document(&doc);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
}

#[test]
fn validation_is_pure_and_repeatable() {
    let doc = doc_with(
        FlowNode::new("start", kind::START)
            .with_child(FlowNode::new("t", kind::TRY_CATCH))
            .with_child(FlowNode::new("b", kind::BREAK)),
    );

    let engine = engine();
    let first = engine.validate_document(&doc);
    let second = engine.validate_document(&doc);
    assert_eq!(first, second);
    assert!(!first.is_valid());
}

#[test]
fn empty_document_is_an_error() {
    let report = engine().validate_document(&FlowDocument::new("empty"));
    assert!(!report.is_valid());
    assert!(report.errors[0].message.contains("no nodes"));
}

#[test]
fn duplicate_ids_across_the_tree_are_errors() {
    let mut doc = FlowDocument::new("dups");
    doc.add_node(FlowNode::new("a", kind::START).with_child(FlowNode::new("a", kind::END)));

    let report = engine().validate_document(&doc);
    assert!(report
        .errors
        .iter()
        .any(|e| e.node_id == "a" && e.message.contains("duplicate")));
}

#[test]
fn unregistered_kind_is_reported_not_thrown() {
    let doc = doc_with(FlowNode::new("x", "mystery"));
    let report = engine().validate_document(&doc);
    assert!(report
        .errors
        .iter()
        .any(|e| e.message.contains("no executor registered for kind 'mystery'")));
}

#[test]
fn switch_without_cases_or_expression_collects_both_errors() {
    let doc = doc_with(FlowNode::new("sw", kind::SWITCH));
    let report = engine().validate_document(&doc);

    assert!(report
        .errors
        .iter()
        .any(|e| e.message.contains("'expression'")));
    assert!(report.errors.iter().any(|e| e.message.contains("'case'")));
}

#[test]
fn two_default_cases_are_rejected() {
    let doc = doc_with(
        FlowNode::new("sw", kind::SWITCH)
            .with_field("expression", "{{x}}")
            .with_child(FlowNode::new("c", kind::CASE).with_field("value", "a"))
            .with_child(FlowNode::new("d1", kind::DEFAULT_CASE))
            .with_child(FlowNode::new("d2", kind::DEFAULT_CASE)),
    );

    let report = engine().validate_document(&doc);
    assert!(report
        .errors
        .iter()
        .any(|e| e.message.contains("at most one default-case")));
}

#[test]
fn switch_rejects_children_that_are_not_arms() {
    let doc = doc_with(
        FlowNode::new("sw", kind::SWITCH)
            .with_field("expression", "{{x}}")
            .with_child(FlowNode::new("c", kind::CASE).with_field("value", "a"))
            .with_child(FlowNode::new("stray", kind::TEMPLATE)),
    );

    let report = engine().validate_document(&doc);
    assert!(report
        .errors
        .iter()
        .any(|e| e.node_id == "sw" && e.message.contains("may not contain")));
}

#[test]
fn loop_without_items_is_an_error() {
    let doc = doc_with(
        FlowNode::new("lp", kind::LOOP).with_child(FlowNode::new("t", kind::TEMPLATE)),
    );
    let report = engine().validate_document(&doc);
    assert!(report
        .errors
        .iter()
        .any(|e| e.node_id == "lp" && e.message.contains("'items'")));
}

#[test]
fn misplaced_break_is_a_warning_not_an_error() {
    let doc = doc_with(
        FlowNode::new("start", kind::START).with_child(FlowNode::new("b", kind::BREAK)),
    );
    let report = engine().validate_document(&doc);

    assert!(report.is_valid());
    assert!(report
        .warnings
        .iter()
        .any(|w| w.node_id == "b" && w.message.contains("loop")));
}

#[test]
fn agent_without_llm_is_an_error_and_without_memory_a_warning() {
    let doc = doc_with(FlowNode::new("a", kind::AGENT).with_child(FlowNode::new(
        "t",
        kind::TOOLS,
    )));
    let report = engine().validate_document(&doc);

    assert!(report
        .errors
        .iter()
        .any(|e| e.node_id == "a" && e.message.contains("'llm'")));
    assert!(report
        .warnings
        .iter()
        .any(|w| w.node_id == "a" && w.message.contains("'memory'")));
}

#[test]
fn mixed_construct_arms_are_mutually_exclusive() {
    // relationship tables also apply to kinds with no allowed-children
    // entry, where mixing arms of different constructs is the only error
    let doc = doc_with(
        FlowNode::new("odd", kind::TEMPLATE)
            .with_child(FlowNode::new("c", kind::CASE))
            .with_child(FlowNode::new("tb", kind::TRY_BLOCK)),
    );
    let report = engine().validate_document(&doc);

    assert!(report
        .errors
        .iter()
        .any(|e| e.node_id == "odd" && e.message.contains("must not co-occur")));
}

#[test]
fn if_requires_condition_input_and_true_branch() {
    let doc = doc_with(FlowNode::new("gate", kind::IF));
    let report = engine().validate_document(&doc);

    assert!(report
        .errors
        .iter()
        .any(|e| e.message.contains("'condition'")));
    assert!(report
        .errors
        .iter()
        .any(|e| e.message.contains("'true-branch'")));
}

#[test]
fn set_variable_checks_name_and_value() {
    let doc = doc_with(FlowNode::new("sv", kind::SET_VARIABLE));
    let report = engine().validate_document(&doc);

    assert!(report.errors.iter().any(|e| e.message.contains("'name'")));
    assert!(report
        .errors
        .iter()
        .any(|e| e.message.contains("'value' input")));
}

#[test]
fn validation_never_executes_nodes() {
    // a loop over a non-array constant would fail at runtime; validation
    // accepts it because resolution only happens during execution
    let doc = doc_with(
        FlowNode::new("lp", kind::LOOP)
            .with_input("items", InputValue::constant("not-an-array"))
            .with_child(FlowNode::new("t", kind::TEMPLATE).with_input(
                "x",
                InputValue::constant(1i64),
            )),
    );
    let report = engine().validate_document(&doc);
    assert!(report.is_valid());
}
