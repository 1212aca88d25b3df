//! Validate a function schema or a `{"tools": [...]}` envelope from a file
//! or stdin, or print one of the built-in examples.
//!
//! ```text
//! cargo run --example validate -- schema.json
//! cat schema.json | cargo run --example validate -- --strict
//! cargo run --example validate -- --example send_email
//! ```

use clap::Parser;
use fnschema::{
    validate::{DEFAULT_OPTIONS, STRICT_OPTIONS},
    Example, SchemaDocument, Validator,
};
use std::{io::Read, path::PathBuf};

/// Check OpenAI function-calling schemas.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file to validate. Reads stdin if omitted.
    path: Option<PathBuf>,
    /// Print a built-in example instead of validating.
    #[arg(short, long)]
    example: Option<Example>,
    /// Treat array parameters without `items` as errors.
    #[arg(short, long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "log")]
    env_logger::init();

    let args = Args::parse();

    if let Some(example) = args.example {
        println!("{}", example.to_json_pretty()?);
        return Ok(());
    }

    let text = match &args.path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().lock().read_to_string(&mut text)?;
            text
        }
    };

    let validator = Validator::new(if args.strict {
        STRICT_OPTIONS
    } else {
        DEFAULT_OPTIONS
    });
    let result = validator.validate_json(&text);

    for error in &result.errors {
        eprintln!("error: {error}");
    }
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    if !result.is_valid {
        return Err(format!("{} error(s)", result.errors.len()).into());
    }

    let document = SchemaDocument::parse_with(&validator, &text)?;
    println!(
        "OK: {} function(s): {}",
        document.len(),
        document.function_names().join(", ")
    );

    Ok(())
}
