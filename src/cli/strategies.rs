use clap::Args;

use crate::cli::{ConfigArgs, DemographicsArgs, OutputFormat};
use crate::core::query::NamedQuery;
use crate::strategy::{find_strategy, STRATEGIES};

#[derive(Args)]
pub struct StrategiesArgs {
    /// Also print the cascade the selected strategy builds for the given demographics
    #[arg(long)]
    pub show_cascade: bool,

    #[command(flatten)]
    pub demographics: DemographicsArgs,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: StrategiesArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let config = args.config.resolve()?;

    let cascade = if args.show_cascade {
        let strategy = find_strategy(&config.strategy)?;
        Some(strategy.cascade(&args.demographics.to_record(), &config.cascade_options())?)
    } else {
        None
    };

    match format {
        OutputFormat::Text => print_text(cascade.as_deref(), &config.strategy.to_string()),
        OutputFormat::Json => print_json(cascade.as_deref(), &config.strategy.to_string())?,
        OutputFormat::Tsv => print_tsv(cascade.as_deref()),
    }

    Ok(())
}

fn print_text(cascade: Option<&[NamedQuery]>, selected: &str) {
    println!("Search Strategies");
    println!("{}", "=".repeat(60));
    for strategy in STRATEGIES {
        println!(
            "  {:<8} v{}  {}",
            strategy.name, strategy.version, strategy.description
        );
    }

    if let Some(cascade) = cascade {
        println!("\nCascade for {selected}:");
        for (i, entry) in cascade.iter().enumerate() {
            let dates: Vec<String> = entry.query.birth_date.iter().map(ToString::to_string).collect();
            println!("  {:>2}. {:<36} {}", i + 1, entry.name, dates.join(" "));
        }
    }
}

fn print_json(cascade: Option<&[NamedQuery]>, selected: &str) -> anyhow::Result<()> {
    let strategies: Vec<_> = STRATEGIES
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name,
                "version": s.version,
                "description": s.description,
            })
        })
        .collect();

    let mut output = serde_json::json!({ "strategies": strategies });
    if let Some(cascade) = cascade {
        output["selected"] = serde_json::json!(selected);
        output["cascade"] = serde_json::to_value(cascade)?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(cascade: Option<&[NamedQuery]>) {
    match cascade {
        Some(cascade) => {
            println!("position\tname\tbirth_date");
            for (i, entry) in cascade.iter().enumerate() {
                let dates: Vec<String> =
                    entry.query.birth_date.iter().map(ToString::to_string).collect();
                println!("{}\t{}\t{}", i + 1, entry.name, dates.join(","));
            }
        }
        None => {
            println!("name\tversion\tdescription");
            for strategy in STRATEGIES {
                println!("{}\t{}\t{}", strategy.name, strategy.version, strategy.description);
            }
        }
    }
}
