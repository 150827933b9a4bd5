use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use vega_core::InferenceConfig;
use vega_model::{Api, Slot};

#[derive(Parser)]
#[command(name = "vega", version, about = "Vega CLI (assemble, enums, slots)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a scraped document set into a model
    Assemble(AssembleArgs),
    /// List inferred enums from a snapshot
    Enums(EnumsArgs),
    /// List enum-qualified method slots of one class
    Slots(SlotsArgs),
}

#[derive(Args)]
struct AssembleArgs {
    /// Path to a document-set JSON dump
    docset: PathBuf,
    /// Write the assembled model to this snapshot file
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct EnumsArgs {
    /// Path to a model snapshot
    snapshot: PathBuf,
    /// Glob over package names, e.g. `com.x*`
    #[arg(long, default_value = "*")]
    package: String,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SlotsArgs {
    /// Path to a model snapshot
    snapshot: PathBuf,
    /// Fully-qualified class name
    class: String,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AssembleSummary {
    packages: usize,
    classes: usize,
    constants: usize,
    enums: usize,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Assemble(args) => run_assemble(args),
        Command::Enums(args) => run_enums(args),
        Command::Slots(args) => run_slots(args),
    }
}

fn run_assemble(args: AssembleArgs) -> Result<()> {
    let docs = vega_docs::load_document_set(&args.docset)
        .with_context(|| format!("loading {}", args.docset.display()))?;
    let (api, report) = vega_assemble::assemble(&docs, &InferenceConfig::new())?;

    if let Some(path) = &args.snapshot {
        vega_model::save_snapshot(&api, path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
    }

    let summary = AssembleSummary {
        packages: api.package_names().count(),
        classes: api.classes().count(),
        constants: api.constants().count(),
        enums: api.enums().count(),
        warnings: report.warnings.iter().map(ToString::to_string).collect(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} packages, {} classes, {} constants, {} inferred enums",
            summary.packages, summary.classes, summary.constants, summary.enums
        );
        for warning in &summary.warnings {
            println!("warning: {warning}");
        }
    }
    Ok(())
}

fn run_enums(args: EnumsArgs) -> Result<()> {
    let api = load(&args.snapshot)?;
    let ids = api
        .enums_in_packages(&args.package)
        .with_context(|| format!("bad package pattern {}", args.package))?;

    if args.json {
        let entries: Vec<_> = ids.iter().map(|id| api.inferred_enum(*id)).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for id in ids {
        let entry = api.inferred_enum(id);
        println!("{}", entry.fqn);
        for (value, member) in &entry.members {
            println!("  {} = {value}", member.name);
        }
    }
    Ok(())
}

fn run_slots(args: SlotsArgs) -> Result<()> {
    let api = load(&args.snapshot)?;
    let class_id = api
        .class_id(&args.class)
        .with_context(|| format!("unknown class {}", args.class))?;
    let slots = api.enum_qualified_slots(class_id);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }
    for slot in slots {
        let position = match slot.slot {
            Slot::Return => "return".to_owned(),
            Slot::Param(p) => format!("param {p}"),
        };
        println!("{} [{position}] -> {}", slot.signature, slot.enum_fqn);
    }
    Ok(())
}

fn load(path: &PathBuf) -> Result<Api> {
    vega_model::load_snapshot(path).with_context(|| format!("loading snapshot {}", path.display()))
}
