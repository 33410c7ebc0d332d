//! ndb - Interactive debugger prompt for V8 inspector endpoints.
//!
//! Attaches to a JavaScript runtime started with `--inspect` or
//! `--inspect-brk` and reads commands from stdin:
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sources [--all]` | List announced scripts |
//! | `list <file:line>` | Show source around a line |
//! | `break <file:line>` | Set a breakpoint |
//! | `help` | Show command help |
//! | `exit` | Quit |
//!
//! Usage:
//!   ndb
//!   ndb 127.0.0.1 9229
//!   ndb 127.0.0.1 9229 --debug

// ============================================================================
// Imports
// ============================================================================

use std::io::{self, IsTerminal, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ndb::session::listing;
use ndb::{Result, Session, SessionOptions};

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 9229;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    host: String,
    port: u16,
    debug: bool,
}

impl Args {
    /// Parse command-line arguments: `ndb [host] [port] [--debug]`.
    fn parse() -> Self {
        let mut debug = false;
        let mut positional = Vec::new();

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--debug" => debug = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => positional.push(arg),
            }
        }

        let host = positional
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match positional.get(1) {
            Some(raw) => match raw.parse() {
                Ok(port) => port,
                Err(_) => {
                    eprintln!("Invalid port: {raw}");
                    std::process::exit(2);
                }
            },
            None => DEFAULT_PORT,
        };

        Self { host, port, debug }
    }
}

/// A parsed prompt command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Sources { all: bool },
    List { filename: String, line: usize },
    Break { filename: String, line: usize },
    Help,
    Quit,
    Unknown(String),
    Invalid(String),
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let color = io::stdout().is_terminal();

    let options = SessionOptions {
        color,
        ..SessionOptions::default()
    };
    let session = Session::attach(&args.host, args.port, options).await?;

    println!(
        "Attached to {}:{} ({} scripts)",
        args.host,
        args.port,
        session.script_count()
    );
    println!("Type 'help' for commands, 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", listing::prompt(color));
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            ReplCommand::Sources { all } => {
                print!(
                    "{}",
                    listing::render_script_list(&session.scripts(), all, color)
                );
            }
            ReplCommand::List { filename, line } => {
                if let Err(e) = session.list_source(&filename, line).await {
                    eprintln!("{e}");
                }
            }
            ReplCommand::Break { filename, line } => {
                if let Err(e) = session.set_breakpoint(&filename, line).await {
                    eprintln!("{e}");
                }
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(command) => {
                println!("Unknown command: {command} (try 'help')");
            }
            ReplCommand::Invalid(message) => println!("{message}"),
        }
    }

    session.close();
    Ok(())
}

// ============================================================================
// Command Parsing
// ============================================================================

/// Parse one prompt line into a command.
fn parse_command(line: &str) -> ReplCommand {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return ReplCommand::Invalid("Empty command".to_string());
    };

    match command {
        "sources" => ReplCommand::Sources {
            all: parts.any(|part| part == "--all"),
        },
        "list" => match parse_location(parts.next(), "list") {
            Ok((filename, line)) => ReplCommand::List { filename, line },
            Err(message) => ReplCommand::Invalid(message),
        },
        "break" => match parse_location(parts.next(), "break") {
            Ok((filename, line)) => ReplCommand::Break { filename, line },
            Err(message) => ReplCommand::Invalid(message),
        },
        "help" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Parse a `file:line` location argument.
fn parse_location(arg: Option<&str>, usage: &str) -> std::result::Result<(String, usize), String> {
    let Some(spec) = arg else {
        return Err(format!("Usage: {usage} <file:line>"));
    };
    let Some((filename, line)) = spec.rsplit_once(':') else {
        return Err(format!("Usage: {usage} <file:line>"));
    };
    if filename.is_empty() {
        return Err(format!("Usage: {usage} <file:line>"));
    }
    let line = line
        .parse()
        .map_err(|_| format!("Invalid line number: {line}"))?;

    Ok((filename.to_string(), line))
}

// ============================================================================
// Helpers
// ============================================================================

/// Initialize tracing/logging.
///
/// `RUST_LOG` overrides the default filter when set. Logs go to stderr
/// so the prompt stays clean.
fn init_logging(debug: bool) {
    let filter = if debug { "ndb=debug" } else { "ndb=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_usage() {
    println!("Usage: ndb [host] [port] [--debug]");
    println!();
    println!("Attach to a V8 inspector endpoint (default {DEFAULT_HOST}:{DEFAULT_PORT}).");
    println!();
    println!("Options:");
    println!("  --debug    Enable debug logging");
    println!("  --help     Show this help");
}

fn print_help() {
    println!("Commands:");
    println!("  sources [--all]      List announced scripts (--all includes node internals)");
    println!("  list <file:line>     Show source around a line");
    println!("  break <file:line>    Set a breakpoint");
    println!("  help                 Show this help");
    println!("  exit                 Quit");
}

// ============================================================================
// Tests
// ============================================================================
