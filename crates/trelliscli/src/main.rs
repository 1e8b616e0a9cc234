use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use trelliscore::{kind, FlowDocument, FlowNode, Value};
use trellisnodes::NoActionService;
use trellisruntime::{FlowEngine, NodeRegistry};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis flow engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a flow document
    Run {
        /// Path to flow document JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Input variables as a JSON object
        #[arg(short, long)]
        input: Option<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a flow document without executing it
    Validate {
        /// Path to flow document JSON file
        file: PathBuf,
    },

    /// List registered node kinds
    Kinds,

    /// Create a new example flow document
    Init {
        /// Output file path
        #[arg(short, long, default_value = "flow.json")]
        output: PathBuf,
    },
}

fn build_engine() -> FlowEngine {
    let mut registry = NodeRegistry::new();
    trellisnodes::register_defaults(&mut registry, Arc::new(NoActionService));
    FlowEngine::new(Arc::new(registry))
}

fn load_document(file: &PathBuf) -> Result<FlowDocument> {
    let json = std::fs::read_to_string(file)?;
    Ok(serde_json::from_str(&json)?)
}

fn parse_inputs(input: Option<String>) -> Result<HashMap<String, Value>> {
    let Some(input_str) = input else {
        return Ok(HashMap::new());
    };
    let json: serde_json::Value = serde_json::from_str(&input_str)?;
    match json {
        serde_json::Value::Object(obj) => Ok(obj
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()),
        _ => Err(anyhow::anyhow!("Input must be a JSON object")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            input,
            verbose,
        } => {
            let level = if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            };
            tracing_subscriber::fmt().with_max_level(level).init();

            run_flow(file, input).await?;
        }

        Commands::Validate { file } => {
            validate_flow(file)?;
        }

        Commands::Kinds => {
            list_kinds();
        }

        Commands::Init { output } => {
            create_example_flow(output)?;
        }
    }

    Ok(())
}

async fn run_flow(file: PathBuf, input: Option<String>) -> Result<()> {
    println!("🚀 Loading flow from: {}", file.display());

    let doc = load_document(&file)?;
    println!("📋 Flow: {}", doc.name);
    println!("   Nodes: {}", doc.all_nodes().len());
    println!();

    let inputs = parse_inputs(input)?;
    let engine = build_engine();

    let report = engine.validate_document(&doc);
    for warning in &report.warnings {
        println!("  ⚠️  [{}] {}", warning.node_id, warning.message);
    }
    if !report.is_valid() {
        println!("❌ Document is invalid:");
        for error in &report.errors {
            println!("   [{}] {}", error.node_id, error.message);
        }
        return Err(anyhow::anyhow!("validation failed"));
    }

    let result = engine.execute_flow(&doc, inputs).await;

    if result.success {
        println!("✨ Flow completed successfully in {}ms", result.duration_ms);
    } else {
        println!(
            "💥 Flow failed after {}ms: {}",
            result.duration_ms,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!();
    println!("📊 Execution Summary:");
    println!("   Execution ID: {}", result.execution_id);
    println!("   Visited: {} nodes", result.results.len());

    if !result.results.is_empty() {
        println!();
        println!("📤 Node results:");
        for (node_id, node_result) in &result.results {
            let marker = if node_result.success { "✅" } else { "❌" };
            println!(
                "   {} {} ({}, {}ms)",
                marker, node_id, node_result.kind, node_result.duration_ms
            );
            if let Some(data) = &node_result.data {
                println!("      {}", serde_json::to_string(&data.to_json())?);
            }
            if let Some(error) = &node_result.error {
                println!("      error: {}", error);
            }
        }
    }

    if !result.final_variables.is_empty() {
        println!();
        println!("🔧 Final variables:");
        for (name, value) in &result.final_variables {
            println!("   {}: {}", name, value.display_string());
        }
    }

    Ok(())
}

fn validate_flow(file: PathBuf) -> Result<()> {
    println!("🔍 Validating flow: {}", file.display());

    let doc = load_document(&file)?;
    let report = build_engine().validate_document(&doc);

    for warning in &report.warnings {
        println!("  ⚠️  [{}] {}", warning.node_id, warning.message);
    }
    for error in &report.errors {
        println!("  ❌ [{}] {}", error.node_id, error.message);
    }

    if report.is_valid() {
        println!("✅ Flow is valid:");
        println!("   Name: {}", doc.name);
        println!("   Nodes: {}", doc.all_nodes().len());
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} validation error(s)",
            report.errors.len()
        ))
    }
}

fn list_kinds() {
    println!("📦 Registered node kinds:");
    println!();

    let engine = build_engine();
    for kind in engine.registry().kinds() {
        println!("  • {}", kind);
    }
}

fn create_example_flow(output: PathBuf) -> Result<()> {
    let mut doc = FlowDocument::new("Example switch flow").with_variable("userType", "vip");
    doc.add_node(
        FlowNode::new("start", kind::START)
            .with_child(
                FlowNode::new("route", kind::SWITCH)
                    .with_field("expression", "{{userType}}")
                    .with_child(
                        FlowNode::new("case-vip", kind::CASE)
                            .with_field("value", "vip")
                            .with_child(
                                FlowNode::new("greet-vip", kind::TEMPLATE)
                                    .with_field("template", "Welcome back, {{userType}}!"),
                            ),
                    )
                    .with_child(
                        FlowNode::new("fallback", kind::DEFAULT_CASE).with_child(
                            FlowNode::new("greet", kind::TEMPLATE)
                                .with_field("template", "Hello, {{userType}}."),
                        ),
                    ),
            )
            .with_child(FlowNode::new("done", kind::END)),
    );

    let json = serde_json::to_string_pretty(&doc)?;
    std::fs::write(&output, json)?;

    println!("✨ Created example flow: {}", output.display());
    println!();
    println!("Run it with:");
    println!(
        "  trellis run --file {} --input '{{\"userType\": \"guest\"}}'",
        output.display()
    );

    Ok(())
}
