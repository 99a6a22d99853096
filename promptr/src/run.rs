//! Pipeline orchestration: prompt → model output → batch → file system.
//!
//! The driver owns the full response-to-action pipeline and takes all
//! behavior as an explicit [`RunConfig`]; nothing here reads ambient global
//! state. Two entries exist: interpret mode runs the whole pipeline, and
//! direct-apply mode takes an already-structured payload (typically piped on
//! stdin) straight through validation and application.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::core::extract::{decode_batch, extract_operations};
use crate::core::operation::{OpKind, OperationBatch};
use crate::core::validate::validate_batch;
use crate::io::apply::{ApplyReport, OpOutcome, apply_batch};
use crate::io::context::{auto_context_paths, build_context};
use crate::io::model::{ModelClient, ModelRequest};
use crate::io::template::PromptTemplate;

/// Pipeline mode, resolved from `--mode` or the config default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Interpret mode against the gpt-3.5 model family.
    Gpt3,
    /// Interpret mode against the gpt-4 model family.
    Gpt4,
    /// Direct-apply mode: read a structured batch from stdin, skip the model.
    Execute,
}

impl Mode {
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "gpt3" => Some(Self::Gpt3),
            "gpt4" => Some(Self::Gpt4),
            "execute" => Some(Self::Execute),
            _ => None,
        }
    }

    /// Model identifier sent to the API. `None` for direct-apply.
    pub fn model_name(self) -> Option<&'static str> {
        match self {
            Self::Gpt3 => Some("gpt-3.5-turbo"),
            Self::Gpt4 => Some("gpt-4"),
            Self::Execute => None,
        }
    }
}

/// Everything one interpret-mode run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    pub prompt: String,
    /// User template path; `None` selects the embedded refactor template.
    pub template_path: Option<PathBuf>,
    /// When set, raw model output is written here instead of interpreted.
    pub output_path: Option<PathBuf>,
    /// Print the inspectable artifact (prompt or batch) without side effects.
    pub dry_run: bool,
    /// Pull files mentioned in the prompt into the context.
    pub auto_context: bool,
    /// Context files named explicitly on the command line.
    pub context_paths: Vec<String>,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        // The refactor template's output is an operations payload, which is
        // meaningless as a plain output file.
        if self.output_path.is_some() && self.template_path.is_none() {
            bail!("the default refactor template cannot be used with --output; pass --template");
        }
        Ok(())
    }
}

/// What a run produced; the caller renders it and maps it to an exit code.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Dry run before the model call: the fully rendered prompt.
    RenderedPrompt(String),
    /// Dry run of direct-apply: the decoded batch, printed, not applied.
    InspectedBatch(OperationBatch),
    /// Raw model output was redirected to a file.
    OutputWritten(PathBuf),
    /// The batch was applied; per-operation results inside.
    Applied(ApplyReport),
}

/// Run the full interpret pipeline beneath `root`.
///
/// Extraction or whole-batch validation failures propagate as errors before
/// any file is touched; per-operation apply failures are recorded in the
/// returned report instead.
pub fn run_interpret<C: ModelClient + ?Sized>(
    root: &Path,
    client: &C,
    config: &RunConfig,
) -> Result<RunOutcome> {
    config.validate()?;
    let model = config
        .mode
        .model_name()
        .context("interpret mode requires a model-backed mode (gpt3 or gpt4)")?;

    let mut paths = config.context_paths.clone();
    if config.auto_context {
        for path in auto_context_paths(root, &config.prompt) {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    let file_context = build_context(root, &paths)?;

    let template = match &config.template_path {
        Some(path) => PromptTemplate::from_path(path)?,
        None => PromptTemplate::refactor(),
    };
    let prompt = template.render(&config.prompt, &file_context)?;

    if config.dry_run {
        return Ok(RunOutcome::RenderedPrompt(prompt));
    }

    let raw = client.complete(&ModelRequest {
        model: model.to_string(),
        prompt,
    })?;

    if let Some(output_path) = &config.output_path {
        fs::write(output_path, &raw)
            .with_context(|| format!("write model output to {}", output_path.display()))?;
        return Ok(RunOutcome::OutputWritten(output_path.clone()));
    }

    let batch = extract_operations(&raw).context("extract operations from model output")?;
    info!(operations = batch.len(), "extracted operation batch");
    apply_validated(root, batch)
}

/// Run direct-apply mode on an already-structured payload.
///
/// The payload is still strict-decoded and schema-checked; only payload
/// location is skipped. With `dry_run` the decoded batch is returned for
/// inspection and nothing is applied.
pub fn run_direct_apply(root: &Path, payload: &str, dry_run: bool) -> Result<RunOutcome> {
    let batch = decode_batch(payload).context("decode piped operations payload")?;
    debug!(operations = batch.len(), "decoded piped batch");
    if dry_run {
        return Ok(RunOutcome::InspectedBatch(batch));
    }
    apply_validated(root, batch)
}

/// Fail-closed gate between extraction and application: the whole batch
/// must validate before the first write happens.
fn apply_validated(root: &Path, batch: OperationBatch) -> Result<RunOutcome> {
    validate_batch(root, &batch)?;
    Ok(RunOutcome::Applied(apply_batch(root, &batch)))
}

/// Render the human-readable report: one line per operation plus totals.
pub fn render_report(report: &ApplyReport) -> String {
    let mut out = String::new();
    for op in &report.ops {
        let line = match &op.outcome {
            OpOutcome::Applied => format!("{} {}: applied", op.kind, op.path),
            OpOutcome::SkippedMissing => {
                format!("{} {}: skipped (file does not exist)", op.kind, op.path)
            }
            OpOutcome::Failed { reason, .. } => {
                format!("{} {}: failed ({reason})", op.kind, op.path)
            }
            OpOutcome::SkippedAfterFatal => {
                format!("{} {}: skipped (earlier fatal failure)", op.kind, op.path)
            }
        };
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!(
        "{} created, {} updated, {} deleted, {} failed\n",
        report.applied(OpKind::Create),
        report.applied(OpKind::Update),
        report.applied(OpKind::Delete),
        report.failed(),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::interpret_config;

    /// Client that returns a canned response without network access.
    struct ScriptedClient {
        output: String,
    }

    impl ModelClient for ScriptedClient {
        fn complete(&self, _request: &ModelRequest) -> Result<String> {
            Ok(self.output.clone())
        }
    }

    /// Client that records the request it was sent.
    struct RecordingClient {
        seen: std::cell::RefCell<Vec<ModelRequest>>,
        output: String,
    }

    impl ModelClient for RecordingClient {
        fn complete(&self, request: &ModelRequest) -> Result<String> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.output.clone())
        }
    }

    #[test]
    fn interpret_extracts_validates_and_applies() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient {
            output: concat!(
                "Sure, here you go:\n```json\n",
                r#"{"operations":[{"kind":"create","path":"a.txt","content":"hi"},{"kind":"delete","path":"b.txt"}]}"#,
                "\n```\n",
            )
            .to_string(),
        };

        let outcome = run_interpret(temp.path(), &client, &interpret_config("make a.txt"))
            .expect("run");

        let RunOutcome::Applied(report) = outcome else {
            panic!("expected applied outcome");
        };
        assert!(report.is_success());
        assert_eq!(
            fs::read_to_string(temp.path().join("a.txt")).expect("read"),
            "hi"
        );
        assert_eq!(report.ops[1].outcome, OpOutcome::SkippedMissing);
    }

    #[test]
    fn interpret_sends_resolved_model_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = RecordingClient {
            seen: std::cell::RefCell::new(Vec::new()),
            output: r#"{"operations":[]}"#.to_string(),
        };
        let mut config = interpret_config("noop");
        config.mode = Mode::Gpt3;

        run_interpret(temp.path(), &client, &config).expect("run");

        let seen = client.seen.borrow();
        assert_eq!(seen[0].model, "gpt-3.5-turbo");
        assert!(seen[0].prompt.contains("noop"));
    }

    #[test]
    fn invalid_batch_is_rejected_before_any_write() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient {
            output: r#"{"operations":[{"kind":"create","path":"ok.txt","content":"x"},{"kind":"create","path":"../escape.txt","content":"x"}]}"#.to_string(),
        };

        let err =
            run_interpret(temp.path(), &client, &interpret_config("go")).unwrap_err();

        assert!(err.to_string().contains("invalid"));
        // Fail-closed: the valid first operation must not have been applied.
        assert!(!temp.path().join("ok.txt").exists());
    }

    #[test]
    fn unextractable_output_is_an_error_without_effects() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient {
            output: "I'm sorry, I can't help with that.".to_string(),
        };

        let err = run_interpret(temp.path(), &client, &interpret_config("go")).unwrap_err();

        assert!(err.to_string().contains("extract operations"));
        assert_eq!(fs::read_dir(temp.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn dry_run_returns_rendered_prompt_without_model_call() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = RecordingClient {
            seen: std::cell::RefCell::new(Vec::new()),
            output: String::new(),
        };
        let mut config = interpret_config("rename foo");
        config.dry_run = true;

        let outcome = run_interpret(temp.path(), &client, &config).expect("run");

        let RunOutcome::RenderedPrompt(prompt) = outcome else {
            panic!("expected rendered prompt");
        };
        assert!(prompt.contains("rename foo"));
        assert!(client.seen.borrow().is_empty());
    }

    #[test]
    fn auto_context_pulls_mentioned_files_into_the_prompt() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("notes.txt"), "remember the milk").expect("seed");
        let client = RecordingClient {
            seen: std::cell::RefCell::new(Vec::new()),
            output: r#"{"operations":[]}"#.to_string(),
        };
        let config = interpret_config("tidy up notes.txt for me");

        run_interpret(temp.path(), &client, &config).expect("run");

        assert!(client.seen.borrow()[0].prompt.contains("remember the milk"));
    }

    #[test]
    fn disabled_auto_context_leaves_mentioned_files_out() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("notes.txt"), "remember the milk").expect("seed");
        let client = RecordingClient {
            seen: std::cell::RefCell::new(Vec::new()),
            output: r#"{"operations":[]}"#.to_string(),
        };
        let mut config = interpret_config("tidy up notes.txt for me");
        config.auto_context = false;

        run_interpret(temp.path(), &client, &config).expect("run");

        assert!(!client.seen.borrow()[0].prompt.contains("remember the milk"));
    }

    #[test]
    fn output_redirect_writes_raw_output_and_skips_interpretation() {
        let temp = tempfile::tempdir().expect("tempdir");
        let template = temp.path().join("plain.md");
        fs::write(&template, "{{ prompt }}").expect("seed");
        let output = temp.path().join("out.txt");
        let client = ScriptedClient {
            output: "raw model text, no payload".to_string(),
        };
        let mut config = interpret_config("explain this");
        config.template_path = Some(template);
        config.output_path = Some(output.clone());

        let outcome = run_interpret(temp.path(), &client, &config).expect("run");

        assert!(matches!(outcome, RunOutcome::OutputWritten(_)));
        assert_eq!(
            fs::read_to_string(&output).expect("read"),
            "raw model text, no payload"
        );
    }

    #[test]
    fn output_redirect_with_default_template_is_refused() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient {
            output: String::new(),
        };
        let mut config = interpret_config("explain");
        config.output_path = Some(temp.path().join("out.txt"));

        let err = run_interpret(temp.path(), &client, &config).unwrap_err();
        assert!(err.to_string().contains("--output"));
    }

    #[test]
    fn direct_apply_applies_piped_payload() {
        let temp = tempfile::tempdir().expect("tempdir");
        let payload = r#"{"operations":[{"kind":"create","path":"a.txt","content":"hi"}]}"#;

        let outcome = run_direct_apply(temp.path(), payload, false).expect("run");

        assert!(matches!(outcome, RunOutcome::Applied(_)));
        assert!(temp.path().join("a.txt").exists());
    }

    #[test]
    fn direct_apply_dry_run_inspects_without_applying() {
        let temp = tempfile::tempdir().expect("tempdir");
        let payload = r#"{"operations":[{"kind":"create","path":"a.txt","content":"hi"}]}"#;

        let outcome = run_direct_apply(temp.path(), payload, true).expect("run");

        let RunOutcome::InspectedBatch(batch) = outcome else {
            panic!("expected inspected batch");
        };
        assert_eq!(batch.len(), 1);
        assert!(!temp.path().join("a.txt").exists());
    }

    #[test]
    fn direct_apply_rejects_malformed_payload() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = run_direct_apply(temp.path(), "not json", false).unwrap_err();
        assert!(err.to_string().contains("decode piped operations payload"));
    }

    #[test]
    fn report_rendering_lists_operations_and_totals() {
        let temp = tempfile::tempdir().expect("tempdir");
        let payload = r#"{"operations":[{"kind":"create","path":"a.txt","content":"hi"},{"kind":"delete","path":"b.txt"}]}"#;
        let RunOutcome::Applied(report) =
            run_direct_apply(temp.path(), payload, false).expect("run")
        else {
            panic!("expected applied outcome");
        };

        let rendered = render_report(&report);

        assert!(rendered.contains("create a.txt: applied"));
        assert!(rendered.contains("delete b.txt: skipped (file does not exist)"));
        assert!(rendered.contains("1 created, 0 updated, 0 deleted, 0 failed"));
    }
}
