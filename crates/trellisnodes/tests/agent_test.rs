mod common;

use common::engine_with_recorder;
use std::collections::HashMap;
use trelliscore::{kind, FlowDocument, FlowNode, InputValue, Value};

fn component(id: &str, component_kind: &str) -> FlowNode {
    FlowNode::new(id, component_kind).with_child(
        FlowNode::new(format!("rec-{}", id), "record")
            .with_input("value", InputValue::constant(component_kind)),
    )
}

#[tokio::test]
async fn components_run_in_canonical_order_not_authored_order() {
    let mut doc = FlowDocument::new("agent flow");
    doc.add_node(
        FlowNode::new("start", kind::START).with_child(
            // authored tools, llm, memory on purpose
            FlowNode::new("agent", kind::AGENT)
                .with_child(component("t", kind::TOOLS))
                .with_child(component("l", kind::LLM))
                .with_child(component("m", kind::MEMORY)),
        ),
    );

    let (engine, seen) = engine_with_recorder();
    let result = engine.execute_flow(&doc, HashMap::new()).await;

    assert!(result.success);
    let order: Vec<String> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["llm", "memory", "tools"]);
}

#[tokio::test]
async fn absent_components_are_skipped() {
    let mut doc = FlowDocument::new("lean agent");
    doc.add_node(
        FlowNode::new("start", kind::START).with_child(
            FlowNode::new("agent", kind::AGENT)
                .with_child(component("t", kind::TOOLS))
                .with_child(component("l", kind::LLM)),
        ),
    );

    let (engine, seen) = engine_with_recorder();
    let result = engine.execute_flow(&doc, HashMap::new()).await;

    assert!(result.success);
    let order: Vec<String> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["llm", "tools"]);
}

#[tokio::test]
async fn composite_result_collects_component_data_and_summary() {
    let mut doc = FlowDocument::new("composite");
    doc.add_node(
        FlowNode::new("start", kind::START).with_child(
            FlowNode::new("agent", kind::AGENT)
                .with_title("support bot")
                .with_child(
                    FlowNode::new("l", kind::LLM)
                        .with_input("prompt", InputValue::constant("classify {{topic}}")),
                )
                .with_child(FlowNode::new("m", kind::MEMORY)),
        ),
    );

    let (engine, _) = engine_with_recorder();
    let inputs = HashMap::from([("topic".to_string(), Value::from("billing"))]);
    let result = engine.execute_flow(&doc, inputs).await;

    assert!(result.success);
    let data = result.results["agent"].data.as_ref().unwrap();
    assert_eq!(
        data.get_path("components.llm.prompt").and_then(Value::as_str),
        Some("classify billing")
    );
    let summary = data.get_path("summary").and_then(Value::as_str).unwrap();
    assert!(summary.contains("support bot"));
    assert!(summary.contains("llm -> memory"));

    // the phase marker does not survive the agent scope
    assert!(!result.final_variables.contains_key("agent.phase"));
}

#[tokio::test]
async fn phase_marker_is_visible_inside_components() {
    let mut doc = FlowDocument::new("phase marker");
    doc.add_node(
        FlowNode::new("start", kind::START).with_child(
            FlowNode::new("agent", kind::AGENT)
                .with_child(FlowNode::new("l", kind::LLM).with_child(
                    FlowNode::new("rec", "record")
                        .with_input("value", InputValue::variable("agent.phase")),
                )),
        ),
    );

    let (engine, seen) = engine_with_recorder();
    let result = engine.execute_flow(&doc, HashMap::new()).await;

    assert!(result.success);
    assert_eq!(*seen.lock().unwrap(), vec![Value::String("llm".to_string())]);
}

#[tokio::test]
async fn failing_component_aborts_the_agent_and_clears_the_phase() {
    let mut doc = FlowDocument::new("broken agent");
    doc.add_node(
        FlowNode::new("start", kind::START).with_child(
            FlowNode::new("agent", kind::AGENT)
                .with_child(FlowNode::new("l", kind::LLM).with_child(FlowNode::new(
                    "boom",
                    "no-such-kind",
                )))
                .with_child(component("m", kind::MEMORY)),
        ),
    );

    let (engine, seen) = engine_with_recorder();
    let result = engine.execute_flow(&doc, HashMap::new()).await;

    assert!(!result.success);
    // memory never ran
    assert!(seen.lock().unwrap().is_empty());
    assert!(!result.results.contains_key("m"));
    assert!(!result.final_variables.contains_key("agent.phase"));
}
