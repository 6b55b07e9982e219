//! Electoral Roll Name Lookup - Command Line Interface
//!
//! Searches the per-constituency Parquet files of an electoral roll by voter
//! name and relation (father / husband) name. Matching is case-insensitive and
//! Unicode-normalized, so Tamil names match regardless of how they were typed.
//!
//! # Commands
//!
//! - **`regions`** - Loads every configured region and reports its row count
//! - **`search`** - Searches one region and prints the highlighted matches
//!
//! # Usage Examples
//!
//! ```bash
//! # List regions (built-in Tiruppur district list, files in the current directory)
//! roll-search regions
//!
//! # Search by name and relation name
//! roll-search search "116 - திருப்பூர் (Tiruppur)" --name பிரகாஷ் --relation வேலுசாமி
//!
//! # Export the matches as CSV into a directory
//! roll-search search "116 - திருப்பூர் (Tiruppur)" --name prakash --export out/
//!
//! # Use a config file
//! roll-search search "7 - North" --name ravi --config rolls.toml
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `roll_search=info`); logs go to
//! stderr so stdout stays clean for results.
//!
//! # Exit Codes
//!
//! - `0` - Success, including a search with no matching records
//! - `1` - Invalid arguments, bad config or an export failure
//! - `2` - Neither `--name` nor `--relation` had any content
//! - `3` - The region is unknown or its data could not be loaded

use std::env;
use std::path::{Path, PathBuf};
use std::process;
use roll_search::config::RegistryConfig;
use roll_search::error::{RegistryError, SearchError};
use roll_search::registry::DatasetRegistry;
use roll_search::searching::query_matcher::search_normalized;
use roll_search::searching::result_formatter::{export_file_name, format, HighlightStyle};
use roll_search::searching::search_results::{NormalizedTerms, SearchStatus, SearchTerms};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Parsed `search` arguments.
#[derive(Debug, Default)]
struct SearchArgs {
    region: String,
    terms: SearchTerms,
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "roll_search=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();

    // Handle --help flag
    if args.len() == 2 && (args[1] == "--help" || args[1] == "-h") {
        print_help();
        return;
    }

    if args.len() < 2 {
        eprintln!("Error: Not enough arguments\n");
        print_help();
        process::exit(1);
    }

    let (config_path, rest) = match take_config_flag(&args[2..]) {
        Ok(split) => split,
        Err(message) => usage_error(&message),
    };
    let config = load_config(config_path.as_deref());
    let registry = DatasetRegistry::from_config(&config);

    match args[1].as_str() {
        "regions" => {
            if !rest.is_empty() {
                usage_error("'regions' takes no arguments besides --config");
            }
            handle_regions(&registry).await;
        }
        "search" => {
            let search_args = match parse_search_args(&rest) {
                Ok(parsed) => parsed,
                Err(message) => usage_error(&message),
            };
            handle_search(&registry, search_args).await;
        }
        command => usage_error(&format!("Unknown command '{}'", command)),
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}\n", message);
    print_help();
    process::exit(1);
}

/// Removes `--config FILE` from the argument list.
fn take_config_flag(args: &[String]) -> Result<(Option<PathBuf>, Vec<String>), String> {
    let mut config = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().ok_or("--config requires a file path")?;
            config = Some(PathBuf::from(path));
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((config, rest))
}

fn parse_search_args(args: &[String]) -> Result<SearchArgs, String> {
    let mut parsed = SearchArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--name" => {
                parsed.terms.primary_name = iter.next().ok_or("--name requires a value")?.clone();
            }
            "--relation" => {
                parsed.terms.related_name = iter.next().ok_or("--relation requires a value")?.clone();
            }
            "--export" => {
                parsed.export = Some(PathBuf::from(iter.next().ok_or("--export requires a path")?));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            region => {
                if !parsed.region.is_empty() {
                    return Err(format!("Unexpected argument '{}'", region));
                }
                parsed.region = region.to_string();
            }
        }
    }
    if parsed.region.is_empty() {
        return Err("'search' requires a region label".to_string());
    }
    Ok(parsed)
}

fn load_config(path: Option<&Path>) -> RegistryConfig {
    match path {
        Some(path) => RegistryConfig::load(path).unwrap_or_else(|e| {
            eprintln!("✗ {}", e);
            process::exit(1);
        }),
        None => RegistryConfig::default(),
    }
}

/// Handles the `regions` command: loads everything and reports each region.
async fn handle_regions(registry: &DatasetRegistry) {
    registry.load_all().await;

    for label in registry.labels() {
        match registry.get(label).await {
            Ok(table) => println!("✓ {}  ({} rows)", label, table.num_rows()),
            Err(e) => println!("✗ {}  ({})", label, e),
        }
    }
}

/// Handles the `search` command.
///
/// The terms are validated before the region is touched, so an empty query
/// never triggers a load.
async fn handle_search(registry: &DatasetRegistry, args: SearchArgs) {
    let terms = match NormalizedTerms::from_terms(&args.terms) {
        Ok(terms) => terms,
        Err(_) => {
            eprintln!("{}", SearchStatus::EmptyQuery);
            process::exit(2);
        }
    };

    let table = match registry.get(&args.region).await {
        Ok(table) => table,
        Err(RegistryError::UnknownRegion(label)) => {
            eprintln!("Error: Unknown region '{}'. Available regions:", label);
            for known in registry.labels() {
                eprintln!("  {}", known);
            }
            process::exit(3);
        }
        Err(RegistryError::Load(_)) => {
            eprintln!("{}", SearchStatus::Unavailable { region: args.region.clone() });
            process::exit(3);
        }
    };

    let result = match search_normalized(&table, terms) {
        Ok(result) => result,
        Err(SearchError::EmptyQuery) => {
            eprintln!("{}", SearchStatus::EmptyQuery);
            process::exit(2);
        }
        Err(e) => {
            eprintln!("✗ Error during search: {}", e);
            process::exit(1);
        }
    };

    let formatted = match format(&result, HighlightStyle::Terminal) {
        Ok(formatted) => formatted,
        Err(e) => {
            eprintln!("✗ Error formatting results: {}", e);
            process::exit(1);
        }
    };

    println!("{}", formatted.status);
    if !formatted.rows.is_empty() {
        println!();
        println!("{}", formatted.columns.join(" | "));
        for row in &formatted.rows {
            println!("{}", row.cells.join(" | "));
        }
    }

    if let Some(target) = args.export {
        let path = if target.is_dir() {
            target.join(export_file_name(&args.region))
        } else {
            target
        };
        if let Err(e) = formatted.write_export(&path) {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
        println!("\nExported {} rows to {}", result.len(), path.display());
    }
}

/// Prints help information for the CLI.
fn print_help() {
    let program = env::args().next().unwrap_or_else(|| "roll-search".to_string());
    println!("Electoral Roll Name Lookup");
    println!();
    println!("USAGE:");
    println!("  {} regions [--config FILE]", program);
    println!("  {} search <region> [--name TEXT] [--relation TEXT] [--export PATH] [--config FILE]", program);
    println!("  {} --help", program);
    println!();
    println!("COMMANDS:");
    println!("  regions            Load every region and show its row count");
    println!("  search             Search one region by name and/or relation name");
    println!();
    println!("OPTIONS:");
    println!("  --name TEXT        Voter name (substring, case-insensitive)");
    println!("  --relation TEXT    Father / husband name (substring, case-insensitive)");
    println!("  --export PATH      Write matches as UTF-8 CSV; a directory gets {{region}}_voter_results.csv");
    println!("  --config FILE      TOML file listing regions and field names");
    println!("  --help, -h         Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  {} search \"116 - திருப்பூர் (Tiruppur)\" --name பிரகாஷ் --relation வேலுசாமி", program);
    println!();
    println!("NOTE:");
    println!("  - With both --name and --relation a record must match both");
    println!("  - Log verbosity follows RUST_LOG (default roll_search=info)");
}
