use clap::Args;

use crate::cli::OutputFormat;
use crate::utils::validation::is_valid_nhs_number;

#[derive(Args)]
pub struct ValidateArgs {
    /// NHS number to check (10 digits, spaces allowed)
    #[arg(required = true)]
    pub nhs_number: String,
}

/// Returns whether the number is valid; the caller sets the exit code
pub fn run(args: ValidateArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<bool> {
    let normalized: String = args.nhs_number.split_whitespace().collect();
    let valid = is_valid_nhs_number(&normalized);

    match format {
        OutputFormat::Text => {
            if valid {
                println!("{normalized}: valid");
            } else {
                println!("{normalized}: invalid");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "nhs_number": normalized,
                "valid": valid,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("nhs_number\tvalid");
            println!("{normalized}\t{valid}");
        }
    }

    Ok(valid)
}
