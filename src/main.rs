//! Sheetfeed - load and populate spreadsheet worksheets from the command line

mod config;
mod error;

use anyhow::{Context, bail};
use log::debug;
use sheetfeed_core::storage::{read_csv, render_markdown, write_csv, write_markdown};
use sheetfeed_core::transport::HttpTransport;
use sheetfeed_core::{FeedClient, Spreadsheet, WorksheetConfig};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn print_usage() {
    eprintln!("Usage: sheetfeed [OPTIONS] <SPREADSHEET_ID>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <SPREADSHEET_ID>          Key of the spreadsheet to load");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -w, --worksheet <TITLE>   Only load this worksheet (can be repeated, not with --create)");
    eprintln!("  --create <TITLE>          Create a worksheet instead of loading");
    eprintln!("  --rows <N>                Row count of the created worksheet");
    eprintln!("  --cols <N>                Column count of the created worksheet");
    eprintln!("  --csv <FILE>              Populate the created worksheet from a CSV file");
    eprintln!("  -o, --output <FILE>       Export to file (.csv or markdown)");
    eprintln!("  --config <FILE>           Load configuration from TOML file");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Options {
    spreadsheet_id: String,
    worksheets: Vec<String>,
    create: Option<String>,
    rows: Option<u32>,
    cols: Option<u32>,
    csv_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn parse_count(flag: &str, value: &str) -> u32 {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("Error: {} requires a positive number, got '{}'", flag, value);
            std::process::exit(1);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let mut spreadsheet_id: Option<String> = None;
    let mut opts = Options::default();
    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-w" | "--worksheet" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --worksheet requires a title");
                    std::process::exit(1);
                }
                opts.worksheets.push(args[i].to_string());
            }
            "--create" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --create requires a title");
                    std::process::exit(1);
                }
                opts.create = Some(args[i].to_string());
            }
            "--rows" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --rows requires a value");
                    std::process::exit(1);
                }
                opts.rows = Some(parse_count("--rows", &args[i]));
            }
            "--cols" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --cols requires a value");
                    std::process::exit(1);
                }
                opts.cols = Some(parse_count("--cols", &args[i]));
            }
            "--csv" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --csv requires a file path");
                    std::process::exit(1);
                }
                opts.csv_file = Some(PathBuf::from(&args[i]));
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires a file path");
                    std::process::exit(1);
                }
                opts.output_file = Some(PathBuf::from(&args[i]));
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if spreadsheet_id.is_none() {
                    spreadsheet_id = Some(args[i].to_string());
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let Some(spreadsheet_id) = spreadsheet_id else {
        eprintln!("Error: Missing spreadsheet id");
        print_usage();
        std::process::exit(1);
    };
    opts.spreadsheet_id = spreadsheet_id;

    if opts.create.is_none() && (opts.csv_file.is_some() || opts.rows.is_some() || opts.cols.is_some()) {
        eprintln!("Error: --csv, --rows and --cols require --create");
        std::process::exit(1);
    }
    if opts.create.is_some() && !opts.worksheets.is_empty() {
        eprintln!("Error: --worksheet cannot be combined with --create");
        std::process::exit(1);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (config, warnings) = config::load_config(config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    if let Err(e) = run(opts, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(opts: Options, config: config::Config) -> anyhow::Result<()> {
    let mut transport = HttpTransport::new();
    if let Some(token) = &config.access_token {
        transport = transport.with_access_token(token.clone());
    }
    let endpoints = config.endpoints();
    debug!("feed base {}", endpoints.base_url);
    let client = FeedClient::with_endpoints(Arc::new(transport), endpoints);

    let mut spreadsheet = Spreadsheet::with_wanted(&opts.spreadsheet_id, opts.worksheets.clone());

    if let Some(title) = &opts.create {
        let mut ws_config = WorksheetConfig::new(title.as_str());
        if let Some(rows) = opts.rows.or(config.default_rows) {
            ws_config = ws_config.rows(rows);
        }
        if let Some(cols) = opts.cols.or(config.default_cols) {
            ws_config = ws_config.cols(cols);
        }
        if let Some(csv_path) = &opts.csv_file {
            let table = read_csv(csv_path)
                .with_context(|| format!("reading {}", csv_path.display()))?;
            ws_config = ws_config.headers(table.headers).row_data(table.rows);
        }

        let worksheet = spreadsheet
            .create_worksheet(&client, ws_config)
            .await
            .into_result()
            .with_context(|| format!("creating worksheet '{}'", title))?;
        eprintln!(
            "Created worksheet '{}' ({}) with {} row(s)",
            worksheet.title,
            worksheet.id,
            worksheet.rows.len()
        );
    } else {
        spreadsheet
            .fetch(&client)
            .await
            .with_context(|| format!("loading spreadsheet {}", opts.spreadsheet_id))?;
    }

    match &opts.output_file {
        Some(path) => export(path, &spreadsheet)?,
        None => print!("{}", render_markdown(&spreadsheet)),
    }
    Ok(())
}

fn export(path: &Path, spreadsheet: &Spreadsheet) -> anyhow::Result<()> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let Some(worksheet) = spreadsheet.worksheets.first() else {
            bail!("No worksheet to export");
        };
        if spreadsheet.worksheets.len() > 1 {
            eprintln!(
                "Warning: CSV holds one worksheet; exporting '{}'",
                worksheet.title
            );
        }
        write_csv(path, worksheet)?;
    } else {
        write_markdown(path, spreadsheet)?;
    }
    println!("Exported to {}", path.display());
    Ok(())
}
