//! cellgrid - Load, edit and inspect a grid of named cells from the command line

mod config;

use anyhow::{Context, bail};
use cellgrid_core::Sheet;
use std::env;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: cellgrid [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Sheet file to open (.grd)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <NAME=CONTENT>  Set a cell (can be repeated, applied in order)");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula against the sheet and print it");
    eprintln!("  -o, --output <FILE>       Save the sheet to a file");
    eprintln!("  --formulas                List raw contents instead of values");
    eprintln!("  --config <FILE>           Load configuration from a TOML file");
    eprintln!("  --no-config               Ignore the user configuration file");
    eprintln!("  -h, --help                Print help");
}

#[derive(Default)]
struct Args {
    file_path: Option<PathBuf>,
    sets: Vec<String>,
    command: Option<String>,
    output_file: Option<PathBuf>,
    show_formulas: bool,
    config_file: Option<PathBuf>,
    no_config: bool,
}

/// Parse arguments. `Ok(None)` means help was printed.
fn parse_args(args: &[String]) -> anyhow::Result<Option<Args>> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-s" | "--set" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("--set requires NAME=CONTENT");
                };
                parsed.sets.push(value.clone());
            }
            "-c" | "--command" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("--command requires a formula");
                };
                parsed.command = Some(value.clone());
            }
            "-o" | "--output" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("--output requires a file path");
                };
                parsed.output_file = Some(PathBuf::from(value));
            }
            "--formulas" => parsed.show_formulas = true,
            "--config" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("--config requires a file path");
                };
                parsed.config_file = Some(PathBuf::from(value));
            }
            "--no-config" => parsed.no_config = true,
            arg if arg.starts_with('-') => {
                print_usage();
                bail!("Unknown option: {}", arg);
            }
            arg => {
                if parsed.file_path.is_some() {
                    print_usage();
                    bail!("Unexpected argument: {}", arg);
                }
                parsed.file_path = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(Some(parsed))
}

/// Run the command line. Returns the process exit code.
fn run(args: Args) -> anyhow::Result<i32> {
    let (config, warnings) = if args.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(args.config_file.as_ref())
    };
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut sheet = Sheet::with_file(
        args.file_path.clone(),
        config.name_policy(),
        &config.sheet.version,
    )
    .with_context(|| match &args.file_path {
        Some(p) => format!("failed to open {}", p.display()),
        None => "failed to create sheet".to_string(),
    })?;

    for set in &args.sets {
        let Some((name, content)) = set.split_once('=') else {
            bail!("Expected NAME=CONTENT, got '{}'", set);
        };
        sheet
            .set_contents(name.trim(), content)
            .with_context(|| format!("failed to set {}", name.trim()))?;
    }

    if let Some(output_path) = &args.output_file {
        sheet
            .save(output_path)
            .with_context(|| format!("failed to save {}", output_path.display()))?;
        eprintln!("Saved to {}", output_path.display());
    }

    let decimals = config.display.decimals;

    if let Some(command) = &args.command {
        let formula = command.trim();
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        let value = sheet.evaluate_formula(formula)?;
        println!("{}", value.to_display_string(decimals));
        return Ok(if value.is_error() { 1 } else { 0 });
    }

    let show_formulas = args.show_formulas || config.display.show_formulas;
    for name in sheet.nonempty_cells() {
        let shown = if show_formulas {
            sheet.content(&name).to_input_string()
        } else {
            sheet.value(&name).to_display_string(decimals)
        };
        println!("{}: {}", name, shown);
    }

    Ok(0)
}

/// Join an error and its causes, skipping causes already quoted by the
/// message before them.
fn error_message(err: &anyhow::Error) -> String {
    let mut message = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if message.ends_with(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let result = parse_args(&args).and_then(|parsed| match parsed {
        Some(parsed) => run(parsed),
        None => Ok(0),
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", error_message(&e));
            std::process::exit(1);
        }
    }
}
