use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_registry, or_dash, runtime, ConfigArgs, DemographicsArgs, OutputFormat};
use crate::matching::{MatchOutcome, MatchingEngine};

#[derive(Args)]
pub struct MatchArgs {
    /// Registry fixture file (JSON)
    #[arg(long, required = true)]
    pub registry: PathBuf,

    #[command(flatten)]
    pub demographics: DemographicsArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Issue one query with these raw birth-date tokens (e.g. ge2008-01-01) instead of the cascade
    #[arg(long = "raw-dob", value_name = "TOKEN")]
    pub raw_dob: Vec<String>,
}

pub fn run(args: MatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config.resolve()?;
    let registry = load_registry(&args.registry)?;

    if verbose {
        eprintln!(
            "Registry: {} persons, strategy {}",
            registry.len(),
            config.strategy
        );
    }

    let engine = MatchingEngine::new(&registry, config);
    let mut record = args.demographics.to_record();

    let outcome = runtime()?.block_on(async {
        if args.raw_dob.is_empty() {
            engine.match_person(&mut record).await
        } else {
            engine.match_raw(&record, &args.raw_dob).await
        }
    })?;

    match format {
        OutputFormat::Text => print_text_outcome(&outcome),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Tsv => print_tsv_outcome(&outcome),
    }

    Ok(())
}

pub(crate) fn print_text_outcome(outcome: &MatchOutcome) {
    println!("Match Result");
    println!("{}", "=".repeat(60));
    println!("  Status: {}", outcome.status);
    if let Some(nhs_number) = &outcome.nhs_number {
        println!("  NHS number: {nhs_number}");
    }
    if let Some(score) = outcome.score {
        println!("  Score: {score:.2}");
    }
    if let Some(stage) = &outcome.process_stage {
        println!("  Stage: {stage}");
    }
    if let Some(message) = &outcome.message {
        println!("  Message: {message}");
    }
    if let Some(quality) = &outcome.quality {
        println!("\nData Quality:");
        println!("  Given: {:?}", quality.given);
        println!("  Family: {:?}", quality.family);
        println!("  Birth date: {:?}", quality.birth_date);
        println!("  Gender: {:?}", quality.gender);
        println!("  Phone: {:?}", quality.phone);
        println!("  Email: {:?}", quality.email);
        println!("  Postcode: {:?}", quality.postcode);
    }
}

fn print_tsv_outcome(outcome: &MatchOutcome) {
    println!("status\tnhs_number\tscore\tstage");
    println!(
        "{}\t{}\t{}\t{}",
        outcome.status,
        or_dash(outcome.nhs_number.as_ref().map(|n| n.as_str())),
        outcome
            .score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.4}")),
        or_dash(outcome.process_stage.as_deref()),
    );
}
