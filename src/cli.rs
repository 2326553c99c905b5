//! Command-line interface for scoregate.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use crate::engine::ScoreEngine;
use crate::features::{FeatureSet, RouteDecision};
use crate::policy::Policy;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default policy file names to search for.
const DEFAULT_POLICY_NAMES: &[&str] = &["scoregate.yaml", ".scoregate.yaml"];

/// Content risk scoring with a hash-chained audit trail.
///
/// Scoregate evaluates extracted content features against a set of
/// registered scoring rules, aggregates them into a verdict with a
/// confidence measure, and records every pipeline stage in a verifiable
/// audit chain.
#[derive(Parser)]
#[command(name = "scoregate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a feature payload against the deployed policy
    #[command(visible_alias = "eval")]
    Evaluate(EvaluateArgs),
    /// Create a new scoregate policy file from the defaults
    Init(InitArgs),
}

/// Arguments for the evaluate command.
#[derive(Parser)]
pub struct EvaluateArgs {
    /// Path to the feature payload JSON (must carry a modality tag)
    pub payload: PathBuf,

    /// Path to a policy YAML file (default: auto-discover)
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Output format: pretty, json, or markdown
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Also exit non-zero when the verdict is review
    #[arg(long)]
    pub fail_on_review: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "scoregate.yaml")]
    pub output: PathBuf,
}

/// Run the evaluate command, returning the process exit code.
pub fn run_evaluate(args: &EvaluateArgs) -> anyhow::Result<i32> {
    let policy = load_policy(args.policy.as_deref())?;
    let engine = ScoreEngine::from_policy(&policy)?;

    let raw = fs::read_to_string(&args.payload)?;
    let mut payload: serde_json::Value = serde_json::from_str(&raw)?;

    // A routing collaborator may have attached its decision to the
    // payload; it is passed through and hashed, never interpreted.
    let route = match payload.as_object_mut().and_then(|o| o.remove("route")) {
        Some(value) => serde_json::from_value(value)?,
        None => RouteDecision::new("default", "unrouted"),
    };
    let features = FeatureSet::from_json(payload)?;

    let outcome = engine.run(&route, &features)?;

    match args.format.as_str() {
        "json" => {
            let value = report::render_json(&outcome)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        "markdown" => print!("{}", report::render_markdown(&outcome)),
        "pretty" => report::write_pretty(&outcome),
        other => anyhow::bail!("unknown format: {} (expected pretty, json, or markdown)", other),
    }

    let failed = !outcome.result.compliance_pass
        || (args.fail_on_review && outcome.result.verdict == crate::aggregate::Verdict::Review);
    Ok(if failed { EXIT_FAILED } else { EXIT_SUCCESS })
}

/// Run the init command, returning the process exit code.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        anyhow::bail!("refusing to overwrite existing {}", args.output.display());
    }
    let policy = Policy::default();
    fs::write(&args.output, policy.to_yaml()?)?;
    println!("wrote default policy to {}", args.output.display());
    Ok(EXIT_SUCCESS)
}

/// Load the policy from an explicit path or by discovery, falling back to
/// the built-in defaults.
fn load_policy(explicit: Option<&std::path::Path>) -> anyhow::Result<Policy> {
    if let Some(path) = explicit {
        return Ok(Policy::parse_file(path)?);
    }
    for name in DEFAULT_POLICY_NAMES {
        let candidate = PathBuf::from(name);
        if candidate.exists() {
            return Ok(Policy::parse_file(&candidate)?);
        }
    }
    Ok(Policy::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_evaluate_clean_payload() {
        let temp = TempDir::new().unwrap();
        let payload_path = temp.path().join("payload.json");
        std::fs::write(
            &payload_path,
            r#"{"modality": "text", "features": {"text": "a short friendly note"}}"#,
        )
        .unwrap();

        let args = EvaluateArgs {
            payload: payload_path,
            policy: None,
            format: "json".to_string(),
            fail_on_review: false,
        };
        assert_eq!(run_evaluate(&args).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn test_evaluate_risky_payload_fails() {
        let temp = TempDir::new().unwrap();
        let payload_path = temp.path().join("payload.json");
        let text = "password secret api_key token credit_card ".repeat(5);
        std::fs::write(
            &payload_path,
            format!(
                r#"{{"modality": "text", "features": {{"text": "{}"}}}}"#,
                text
            ),
        )
        .unwrap();

        let args = EvaluateArgs {
            payload: payload_path,
            policy: None,
            format: "json".to_string(),
            fail_on_review: false,
        };
        assert_eq!(run_evaluate(&args).unwrap(), EXIT_FAILED);
    }

    #[test]
    fn test_evaluate_missing_modality_errors() {
        let temp = TempDir::new().unwrap();
        let payload_path = temp.path().join("payload.json");
        std::fs::write(&payload_path, r#"{"features": {"text": "hi"}}"#).unwrap();

        let args = EvaluateArgs {
            payload: payload_path,
            policy: None,
            format: "json".to_string(),
            fail_on_review: false,
        };
        assert!(run_evaluate(&args).is_err());
    }

    #[test]
    fn test_init_writes_parseable_policy() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("scoregate.yaml");
        let args = InitArgs { output: out.clone() };

        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        Policy::parse_file(&out).unwrap();

        // A second init must not clobber the deployed policy.
        assert!(run_init(&args).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let temp = TempDir::new().unwrap();
        let payload_path = temp.path().join("payload.json");
        let mut f = std::fs::File::create(&payload_path).unwrap();
        f.write_all(br#"{"modality": "text", "features": {}}"#).unwrap();

        let args = EvaluateArgs {
            payload: payload_path,
            policy: None,
            format: "xml".to_string(),
            fail_on_review: false,
        };
        assert!(run_evaluate(&args).is_err());
    }
}
