//! promptr CLI entry point.
//!
//! Resolves flags and `.promptr.toml` defaults into an explicit
//! [`RunConfig`], dispatches to the pipeline, renders the outcome, and maps
//! it to a stable exit code.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use promptr::exit_codes;
use promptr::io::config::load_config;
use promptr::io::model::OpenAiClient;
use promptr::run::{Mode, RunConfig, RunOutcome, render_report, run_direct_apply, run_interpret};

#[derive(Parser)]
#[command(
    name = "promptr",
    version,
    about = "Send a prompt to a language model and apply the file operations it returns"
)]
struct Cli {
    /// Pipeline mode. Defaults to `default_mode` from .promptr.toml.
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Prompt text. Required outside execute mode.
    #[arg(short, long)]
    prompt: Option<String>,

    /// Template file overriding the embedded refactor template.
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Write raw model output to this file instead of interpreting it.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the rendered prompt (interpret mode) or the decoded batch
    /// (execute mode) without applying anything.
    #[arg(short, long)]
    dry_run: bool,

    /// Do not pull files mentioned in the prompt into the context.
    #[arg(long)]
    disable_auto_context: bool,

    /// Context files rendered into the prompt.
    #[arg(value_name = "FILE")]
    context_files: Vec<String>,
}

fn main() {
    promptr::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve working directory")?;
    let defaults = load_config(&root)?;

    let mode = match cli.mode {
        Some(mode) => mode,
        None => Mode::parse(&defaults.default_mode)
            .with_context(|| format!("unsupported default_mode '{}'", defaults.default_mode))?,
    };

    if mode == Mode::Execute {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("read operations payload from stdin")?;
        let outcome = run_direct_apply(&root, &payload, cli.dry_run)?;
        return emit(&outcome);
    }

    let prompt = cli
        .prompt
        .context("missing --prompt (required outside execute mode)")?;
    let config = RunConfig {
        mode,
        prompt,
        template_path: cli.template.or(defaults.template),
        output_path: cli.output,
        dry_run: cli.dry_run,
        auto_context: !cli.disable_auto_context && defaults.auto_context,
        context_paths: cli.context_files,
    };

    let client = OpenAiClient::from_env()?;
    let outcome = run_interpret(&root, &client, &config)?;
    emit(&outcome)
}

/// Print the outcome to stdout and pick its exit code.
fn emit(outcome: &RunOutcome) -> Result<i32> {
    match outcome {
        RunOutcome::RenderedPrompt(prompt) => {
            println!("{prompt}");
            Ok(exit_codes::OK)
        }
        RunOutcome::InspectedBatch(batch) => {
            let rendered =
                serde_json::to_string_pretty(batch).context("serialize batch for inspection")?;
            println!("{rendered}");
            Ok(exit_codes::OK)
        }
        RunOutcome::OutputWritten(path) => {
            println!("model output written to {}", path.display());
            Ok(exit_codes::OK)
        }
        RunOutcome::Applied(report) => {
            print!("{}", render_report(report));
            if report.is_success() {
                Ok(exit_codes::OK)
            } else {
                Ok(exit_codes::APPLY_FAILED)
            }
        }
    }
}
