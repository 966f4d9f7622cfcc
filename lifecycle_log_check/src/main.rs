use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use lifecycle_log::{LoggingRule, MessageKey, MessageTemplates, TestIdentity, TracingFactory};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "lifecycle-log-check")]
#[command(about = "Validate a lifecycle message bundle and show the lines it produces")]
struct Cli {
    /// Messages TOML to check (default: $LIFECYCLE_LOG_MESSAGES, then the embedded bundle)
    #[arg(short, long)]
    messages: Option<PathBuf>,
    /// Display name used for the sample test case
    #[arg(short, long, default_value = "sampleCase(SampleTest)")]
    name: String,
    /// Class the sample is logged under
    #[arg(long, default_value = "SampleTest")]
    class: String,
    /// Make the sample body return an error
    #[arg(long)]
    fail: bool,
    /// Make the sample body panic
    #[arg(long, conflicts_with = "fail")]
    panic: bool,
    /// Only validate, do not run the sample
    #[arg(long)]
    validate_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sample {
    Pass,
    Fail,
    Panic,
}

fn load_templates(path: Option<&Path>) -> anyhow::Result<MessageTemplates> {
    match path {
        Some(p) => MessageTemplates::from_path(p)
            .with_context(|| format!("loading messages from {}", p.display())),
        None => MessageTemplates::resolve().context("loading default messages"),
    }
}

/// Run the sample body through the rule; `true` when the sample failed as
/// requested.
fn run_sample(rule: &LoggingRule<TracingFactory>, identity: TestIdentity, sample: Sample) -> bool {
    match sample {
        Sample::Pass => rule.evaluate(|| Ok::<(), String>(()), identity).is_err(),
        Sample::Fail => rule
            .evaluate(|| Err::<(), _>("sample failure".to_string()), identity)
            .is_err(),
        Sample::Panic => panic::catch_unwind(AssertUnwindSafe(|| {
            rule.run(|| panic!("sample panic"), identity);
        }))
        .is_err(),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let templates = match load_templates(cli.messages.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            error!("invalid message bundle: {e:#}");
            return Err(e);
        }
    };
    for key in [MessageKey::Start, MessageKey::Exception, MessageKey::Finish] {
        info!(key = key.as_str(), template = templates.get(key).source(), "template ok");
    }
    if cli.validate_only {
        return Ok(());
    }

    let sample = if cli.panic {
        Sample::Panic
    } else if cli.fail {
        Sample::Fail
    } else {
        Sample::Pass
    };
    let rule = LoggingRule::new(TracingFactory, templates);
    let identity = TestIdentity::with_display_name(cli.class, cli.name);
    let failed = run_sample(&rule, identity, sample);
    if failed != (sample != Sample::Pass) {
        bail!("sample outcome changed by the rule (failed = {failed})");
    }
    info!(?sample, failed, "sample finished");
    Ok(())
}
