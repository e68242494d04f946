//! `slots` CLI — parse, expand, order and split tutor booking slots.
//!
//! ## Usage
//!
//! ```sh
//! # Canonical form of a slot string (either shape)
//! slots parse "01/02/2025 - 1:00 PM"
//!
//! # This month's slots for a weekly template, minus booked ones
//! slots expand --token "Mon-2:00 PM-3:00 PM" --token "Wed-4:00 PM-5:00 PM" \
//!     --now 2025-01-20T10:00 --booked booked.json
//!
//! # Order a JSON array of booking records chronologically
//! slots order -i bookings.json
//!
//! # Split bookings into upcoming and passed sessions
//! slots partition -i bookings.json --now 2025-01-20T10:00
//! ```
//!
//! Times given with `--now` are wall-clock times in `--timezone`
//! (env `SLOTS_TIMEZONE`, default `UTC`). Logging goes to stderr and is controlled
//! by `RUST_LOG` or `-v`.

use std::collections::HashSet;
use std::io::{self, Read};

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use slot_engine::booking::partition_by_time;
use slot_engine::{codec, filter, orderer, BookingRecord};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slots", version, about = "Tutor booking slot tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Timezone that slot strings and --now are expressed in
    #[arg(long, env = "SLOTS_TIMEZONE", default_value = "UTC", global = true)]
    timezone: String,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a slot string
    Parse {
        /// Slot string, e.g. "Jan. 2, 2025 - 1:00 PM" or "01/02/2025 - 1:00 PM"
        text: String,
        /// Print the parsed components as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Expand weekly availability tokens into this month's open slots
    Expand {
        /// Availability token, e.g. "Mon-2:00 PM-3:00 PM" (repeatable)
        #[arg(short, long = "token", required = true)]
        tokens: Vec<String>,
        /// Reference time (YYYY-MM-DDTHH:MM[:SS]); defaults to the current time
        #[arg(long)]
        now: Option<String>,
        /// JSON file holding an array of already-booked slot strings
        #[arg(long)]
        booked: Option<String>,
        /// Also drop slots that have already started
        #[arg(long)]
        hide_elapsed: bool,
    },
    /// Order a JSON array of booking records chronologically
    Order {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Split a JSON array of booking records into upcoming and passed sessions
    Partition {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Reference time (YYYY-MM-DDTHH:MM[:SS]); defaults to the current time
        #[arg(long)]
        now: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let tz: Tz = cli
        .timezone
        .parse()
        .map_err(|_| anyhow!("Unknown timezone: '{}'", cli.timezone))?;

    match cli.command {
        Commands::Parse { text, json } => {
            let instant = codec::parse(&text)
                .with_context(|| format!("Failed to parse slot: {:?}", text))?;
            if json {
                let value = serde_json::json!({
                    "year": instant.year(),
                    "month_index": instant.month_index(),
                    "day": instant.day(),
                    "hour": instant.hour(),
                    "minute": instant.minute(),
                    "canonical": instant.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", instant);
            }
        }
        Commands::Expand {
            tokens,
            now,
            booked,
            hide_elapsed,
        } => {
            let now = reference_time(now.as_deref(), &tz)?;
            let booked = match booked {
                Some(path) => read_booked(&path)?,
                None => HashSet::new(),
            };
            debug!(tokens = tokens.len(), booked = booked.len(), %now, "expanding availability");

            let mut slots = filter::available_slots(&tokens, now, &booked);
            if hide_elapsed {
                slots = filter::drop_past(&slots, now);
            }
            for slot in slots {
                println!("{}", slot);
            }
        }
        Commands::Order { input, output } => {
            let records = read_records(input.as_deref())?;
            let ordered = orderer::order(records);
            let pretty = serde_json::to_string_pretty(&ordered)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Partition { input, now } => {
            let now = reference_time(now.as_deref(), &tz)?;
            let records = orderer::order(read_records(input.as_deref())?);
            let split = partition_by_time(records, now);
            println!("{}", serde_json::to_string_pretty(&split)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Parse `--now`, or take the current time in `tz`.
fn reference_time(now: Option<&str>, tz: &Tz) -> Result<NaiveDateTime> {
    match now {
        Some(text) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
            .with_context(|| format!("Invalid --now value: '{}'", text)),
        None => Ok(Utc::now().with_timezone(tz).naive_local()),
    }
}

fn read_booked(path: &str) -> Result<HashSet<String>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    let slots: Vec<String> = serde_json::from_str(&text)
        .with_context(|| format!("Expected a JSON array of slot strings in {}", path))?;
    Ok(slots.into_iter().collect())
}

fn read_records(path: Option<&str>) -> Result<Vec<BookingRecord>> {
    let text = read_input(path)?;
    serde_json::from_str(&text).context("Expected a JSON array of booking records")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
