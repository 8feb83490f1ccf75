mod builtin;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use taskline_config::WorkflowDef;
use taskline_correlator::Correlator;
use taskline_task::{Context, Invocation, Run};
use taskline_workflow::Resolver;

/// Taskline - run task workflows described in JSON
#[derive(Parser)]
#[command(name = "taskline")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow file against the built-in tasks
  Run {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Correlation id for the run (default: generated)
    #[arg(long)]
    correlation_id: Option<String>,
  },

  /// List the built-in tasks
  Tasks,
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Some(Commands::Run {
      workflow_file,
      correlation_id,
    }) => run_workflow(workflow_file, correlation_id),
    Some(Commands::Tasks) => {
      for name in builtin::registry().names() {
        println!("{}", name);
      }
      Ok(ExitCode::SUCCESS)
    }
    None => {
      println!("taskline - use --help to see available commands");
      Ok(ExitCode::SUCCESS)
    }
  }
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => Level::WARN,
    1 => Level::INFO,
    2 => Level::DEBUG,
    _ => Level::TRACE,
  };
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_max_level(level)
    .init();
}

fn run_workflow(workflow_file: PathBuf, correlation_id: Option<String>) -> Result<ExitCode> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_workflow_async(workflow_file, correlation_id).await })
}

async fn run_workflow_async(
  workflow_file: PathBuf,
  correlation_id: Option<String>,
) -> Result<ExitCode> {
  let workflow_content = tokio::fs::read_to_string(&workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  let workflow_def = WorkflowDef::from_json(&workflow_content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))?;

  eprintln!("Loaded workflow: {}", workflow_def.name);

  let payload = read_payload_from_stdin()?;

  let resolver = Resolver::new(builtin::registry());
  let workflow = resolver
    .resolve(workflow_def)
    .context("failed to resolve workflow")?;

  let run = Arc::new(Run::new(Correlator::resolve(
    correlation_id.as_deref(),
    None,
  )));
  let context = Context::from(payload);

  let mut invocation = Invocation::new(Arc::new(workflow))
    .context(context.clone())
    .run(run.clone());
  if let Some(id) = correlation_id {
    invocation = invocation.correlation_id(id);
  }
  let result = invocation.execute().await;

  eprintln!("Run {} finished: {} / {}", run.id(), result.state(), result.status());

  let output = serde_json::json!({
    "result": result.to_value(),
    "context": context.to_value(),
    "run": run.to_value(),
  });
  println!("{}", serde_json::to_string_pretty(&output)?);

  if result.is_failed() {
    Ok(ExitCode::FAILURE)
  } else {
    Ok(ExitCode::SUCCESS)
  }
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(serde_json::json!({}));
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;

  if input.trim().is_empty() {
    Ok(serde_json::json!({}))
  } else {
    serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
  }
}
