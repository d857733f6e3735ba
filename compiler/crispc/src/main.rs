//! Crisp CLI
//!
//! Runs, checks and completes crisp scripts.

use crispc::commands::{check_file, complete_file, parse_file, run_file};
use crispc::{init_tracing, RunConfig};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let mut config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let positional = match config.apply_flags(&args[2..]) {
        Ok(positional) => positional,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    match command.as_str() {
        "run" => {
            let Some(path) = positional.first() else {
                eprintln!("Usage: crisp run <file.crisp> [--chain-id <id>] [--sender <address>] [--json]");
                std::process::exit(1);
            };
            run_file(path, &config);
        }
        "check" => {
            let Some(path) = positional.first() else {
                eprintln!("Usage: crisp check <file.crisp>");
                std::process::exit(1);
            };
            check_file(path, &config);
        }
        "parse" => {
            let Some(path) = positional.first() else {
                eprintln!("Usage: crisp parse <file.crisp>");
                std::process::exit(1);
            };
            parse_file(path, &config);
        }
        "complete" => {
            let [path, line, col] = positional.as_slice() else {
                eprintln!("Usage: crisp complete <file.crisp> <line> <col> [--json]");
                std::process::exit(1);
            };
            let (Ok(line), Ok(col)) = (line.parse::<u32>(), col.parse::<u32>()) else {
                eprintln!("error: line and column must be positive integers");
                std::process::exit(1);
            };
            complete_file(path, line, col, &config);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("crisp {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // A bare script path runs it.
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("crisp"))
            {
                run_file(command, &config);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Crisp: a command language for EVM transactions");
    println!();
    println!("Usage: crisp <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.crisp>                 Interpret a script and dry-run its transactions");
    println!("  check <file.crisp>               Parse and evaluate without chain access");
    println!("  parse <file.crisp>               Parse and display the command tree");
    println!("  complete <file> <line> <col>     List completions at a position");
    println!("  help                             Show this help message");
    println!("  version                          Show version information");
    println!();
    println!("Options:");
    println!("  --chain-id <id>      Chain id of the dry-run client (default: 1, env CRISP_CHAIN_ID)");
    println!("  --sender <address>   Sender of the dry-run client (env CRISP_SENDER)");
    println!("  --json               Print actions, completions and diagnostics as JSON");
    println!();
    println!("Examples:");
    println!("  crisp run proposal.crisp --chain-id 5");
    println!("  crisp check proposal.crisp");
    println!("  crisp complete proposal.crisp 3 12 --json");
    println!();
    println!("Set RUST_LOG=crisp=debug to trace interpretation.");
}
