use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::process::Command;

const CORE_PACKAGE: &str = "clickstream-core";
const CORE_MANIFEST_PATH: &str = "crates/libs/clickstream-core/Cargo.toml";

// The core only coordinates; transports and stores live in host crates.
const FORBIDDEN_CORE_DEPS: &[&str] =
    &["tokio", "async-std", "rusqlite", "tungstenite", "reqwest", "hyper"];

#[derive(Parser)]
#[command(name = "xtask")]
struct Xtask {
    #[command(subcommand)]
    command: XtaskCommand,
}

#[derive(Subcommand)]
enum XtaskCommand {
    Ci {
        #[arg(long)]
        stage: Option<CiStage>,
    },
    ForbiddenDeps,
    ModelCheck,
    RaceCheck,
    BenchCheck,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CiStage {
    LintFormat,
    BuildMatrix,
    TestUnit,
    TestIntegration,
    Doc,
    UnusedDeps,
    ForbiddenDeps,
    ModelCheck,
    RaceCheck,
    BenchCheck,
}

fn main() -> Result<()> {
    let xtask = Xtask::parse();
    match xtask.command {
        XtaskCommand::Ci { stage } => run_ci(stage),
        XtaskCommand::ForbiddenDeps => run_forbidden_deps(),
        XtaskCommand::ModelCheck => run_model_check(),
        XtaskCommand::RaceCheck => run_race_check(),
        XtaskCommand::BenchCheck => run_bench_check(),
    }
}

fn run_ci(stage: Option<CiStage>) -> Result<()> {
    if let Some(stage) = stage {
        return run_ci_stage(stage);
    }

    run("cargo", &["fmt", "--all", "--", "--check"])?;
    run("cargo", &["clippy", "--workspace", "--all-targets", "--no-deps", "--", "-D", "warnings"])?;
    run_forbidden_deps()?;
    run("cargo", &["test", "--workspace"])?;
    run("cargo", &["doc", "--workspace", "--no-deps"])?;
    run_race_check()?;
    run_model_check()?;
    Ok(())
}

fn run_ci_stage(stage: CiStage) -> Result<()> {
    match stage {
        CiStage::LintFormat => run("cargo", &["fmt", "--all", "--", "--check"]),
        CiStage::BuildMatrix => {
            run("cargo", &["build", "--workspace", "--all-targets"])?;
            run("cargo", &["build", "-p", CORE_PACKAGE, "--features", "loom-tests"])
        }
        CiStage::TestUnit => run("cargo", &["test", "--workspace", "--lib"]),
        CiStage::TestIntegration => run("cargo", &["test", "--workspace", "--tests"]),
        CiStage::Doc => run("cargo", &["doc", "--workspace", "--no-deps"]),
        CiStage::UnusedDeps => run("cargo", &["+nightly", "udeps", "--workspace", "--all-targets"]),
        CiStage::ForbiddenDeps => run_forbidden_deps(),
        CiStage::ModelCheck => run_model_check(),
        CiStage::RaceCheck => run_race_check(),
        CiStage::BenchCheck => run_bench_check(),
    }
}

fn run_forbidden_deps() -> Result<()> {
    let manifest = fs::read_to_string(CORE_MANIFEST_PATH)
        .with_context(|| format!("read {CORE_MANIFEST_PATH}"))?;
    let manifest: toml::Table =
        manifest.parse().with_context(|| format!("parse {CORE_MANIFEST_PATH}"))?;
    let Some(dependencies) = manifest.get("dependencies").and_then(toml::Value::as_table) else {
        return Ok(());
    };
    for dep in FORBIDDEN_CORE_DEPS {
        if dependencies.contains_key(*dep) {
            bail!("{CORE_PACKAGE} must not depend on '{dep}'");
        }
    }
    Ok(())
}

fn run_model_check() -> Result<()> {
    run(
        "cargo",
        &[
            "test",
            "-p",
            CORE_PACKAGE,
            "--test",
            "loom_state_cell",
            "--features",
            "loom-tests",
            "--release",
            "--",
            "--nocapture",
        ],
    )
}

fn run_race_check() -> Result<()> {
    run("cargo", &["test", "-p", CORE_PACKAGE, "race_", "--", "--nocapture"])
}

fn run_bench_check() -> Result<()> {
    run(
        "cargo",
        &[
            "bench",
            "-p",
            CORE_PACKAGE,
            "--bench",
            "state_cell_paths",
            "--",
            "--sample-size",
            "10",
            "--warm-up-time",
            "0.1",
            "--measurement-time",
            "0.2",
        ],
    )
}

fn run(cmd: &str, args: &[&str]) -> Result<()> {
    let status =
        Command::new(cmd).args(args).status().with_context(|| format!("failed to spawn {cmd}"))?;
    if !status.success() {
        bail!("command failed: {cmd} {}", args.join(" "));
    }
    Ok(())
}
