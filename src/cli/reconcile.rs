use std::path::PathBuf;

use clap::Args;

use crate::cli::match_cmd::print_text_outcome;
use crate::cli::{load_registry, or_dash, runtime, ConfigArgs, DemographicsArgs, OutputFormat};
use crate::core::person::ReconciliationRequest;
use crate::matching::MatchingEngine;
use crate::reconciliation::{ReconciliationEngine, ReconciliationOutcome};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Registry fixture file (JSON)
    #[arg(long, required = true)]
    pub registry: PathBuf,

    /// NHS number currently held locally for this person
    #[arg(long)]
    pub nhs_number: Option<String>,

    #[command(flatten)]
    pub demographics: DemographicsArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: ReconcileArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config.resolve()?;
    let registry = load_registry(&args.registry)?;

    if verbose {
        eprintln!(
            "Registry: {} persons, strategy {}",
            registry.len(),
            config.strategy
        );
    }

    let engine = ReconciliationEngine::new(MatchingEngine::new(&registry, config), &registry);
    let request = ReconciliationRequest::new(args.nhs_number.clone(), args.demographics.to_record());
    let outcome = runtime()?.block_on(engine.reconcile(&request))?;

    match format {
        OutputFormat::Text => print_text_reconciliation(&outcome),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Tsv => print_tsv_reconciliation(&outcome),
    }

    Ok(())
}

fn print_text_reconciliation(outcome: &ReconciliationOutcome) {
    print_text_outcome(&outcome.match_outcome);

    println!("\nReconciliation");
    println!("{}", "=".repeat(60));
    println!("  Status: {}", outcome.status);

    if let Some(person) = &outcome.person {
        println!("  Registry NHS number: {}", person.nhs_number);
        if let Some(practice) = &person.gp_practice {
            println!("  GP practice: {practice}");
        }
    }

    if outcome.differences.is_empty() {
        println!("\nNo field differences.");
    } else {
        println!("\nDifferences ({}):", outcome.differences.len());
        for diff in &outcome.differences {
            println!(
                "  {:<12} local: {:<24} registry: {}",
                diff.field.name(),
                diff.local.as_deref().unwrap_or("(missing)"),
                diff.registry.as_deref().unwrap_or("(missing)"),
            );
        }
    }

    for error in &outcome.errors {
        println!("  Error: {error}");
    }
}

fn print_tsv_reconciliation(outcome: &ReconciliationOutcome) {
    println!("field\tlocal\tregistry");
    for diff in &outcome.differences {
        println!(
            "{}\t{}\t{}",
            diff.field.name(),
            or_dash(diff.local.as_deref()),
            or_dash(diff.registry.as_deref()),
        );
    }
    println!("#status\t{}", outcome.status);
}
