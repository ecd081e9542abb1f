//! cellgrid - run sheet commands from the command line or stdin

use std::env;
use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cellgrid::{load_config, run_line};
use cellgrid_core::Sheet;

fn print_usage() {
    eprintln!("Usage: cellgrid [OPTIONS]");
    eprintln!();
    eprintln!("Runs sheet commands given with -c, or one per line from stdin.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run a command (can be repeated)");
    eprintln!("  --config <FILE>           Load sheet settings from TOML file");
    eprintln!("  --rows <N>                Number of rows (overrides config)");
    eprintln!("  --cols <N>                Number of columns (overrides config)");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  set <CELL> <content>      Write content, e.g. set B1 = SUM(A1:A3)");
    eprintln!("  clear <CELL>              Empty a cell");
    eprintln!("  get <CELL>                Print the evaluated value");
    eprintln!("  raw <CELL>                Print the raw content");
    eprintln!("  color <CELL> [<hex>]      Print or set the color");
    eprintln!("  insert-row <N>            Insert an empty row above row N");
    eprintln!("  delete-row <N>            Delete row N");
    eprintln!("  insert-col <COL>          Insert an empty column left of COL");
    eprintln!("  delete-col <COL>          Delete column COL");
    eprintln!("  filter <CELL> [<value>]   List values under a header, or matching cells");
    eprintln!("  matrix                    Print all raw content, tab separated");
    eprintln!("  functions                 List built-in functions");
    eprintln!("  size                      Print ROWSxCOLS");
}

fn require_value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("Error: {} requires {}", flag, what);
            std::process::exit(1);
        }
    }
}

fn parse_count(value: &str, flag: &str) -> usize {
    match value.parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: {} expects a number, got {}", flag, value);
            std::process::exit(1);
        }
    }
}

fn read_stdin_commands() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut commands = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read commands from stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        commands.push(trimmed.to_string());
    }
    Ok(commands)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    let mut commands: Vec<String> = Vec::new();
    let mut config_file: Option<PathBuf> = None;
    let mut rows: Option<usize> = None;
    let mut cols: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                commands.push(require_value(&args, i, "--command", "a command").to_string());
            }
            "--config" => {
                i += 1;
                config_file = Some(PathBuf::from(require_value(
                    &args,
                    i,
                    "--config",
                    "a file path",
                )));
            }
            "--rows" => {
                i += 1;
                rows = Some(parse_count(require_value(&args, i, "--rows", "a number"), "--rows"));
            }
            "--cols" => {
                i += 1;
                cols = Some(parse_count(require_value(&args, i, "--cols", "a number"), "--cols"));
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (mut config, warnings) = load_config(config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    if let Some(rows) = rows {
        config.height = rows;
    }
    if let Some(cols) = cols {
        config.width = cols;
    }

    if commands.is_empty() {
        commands = match read_stdin_commands() {
            Ok(commands) => commands,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        };
    }

    let mut sheet = Sheet::with_config(&config);
    for command in &commands {
        match run_line(&mut sheet, command) {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(e) => {
                eprintln!("Error: {}: {}", command, e);
                std::process::exit(1);
            }
        }
    }
}
