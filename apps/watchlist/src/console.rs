//! Line-oriented operator console on stdin.

use std::fmt::Write as _;
use std::io::BufRead;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info};
use watchlist_market_data::{SortKey, SymbolResult, WatchlistQuery, DEGRADED_ADVISORY};

use crate::main_lib::Pipeline;

const HELP: &str = "Commands: refresh | list [price|change|volume] [search] | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Refresh,
    List(WatchlistQuery),
    Help,
    Quit,
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Result<Command, String>> {
    let mut words = line.split_whitespace();
    let verb = words.next()?.to_lowercase();

    let command = match verb.as_str() {
        "refresh" | "r" => Ok(Command::Refresh),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "help" | "?" => Ok(Command::Help),
        "list" | "ls" => {
            let mut query = WatchlistQuery::default();
            let mut rest: Vec<&str> = words.collect();
            if let Some(first) = rest.first() {
                if let Ok(sort) = first.parse::<SortKey>() {
                    query.sort = sort;
                    rest.remove(0);
                }
            }
            if !rest.is_empty() {
                query.search = Some(rest.join(" "));
            }
            Ok(Command::List(query))
        }
        other => Err(format!("Unknown command '{}'. {}", other, HELP)),
    };

    Some(command)
}

/// Render results as a fixed-width table.
pub fn render_table(results: &[Arc<SymbolResult>], last_updated: Option<DateTime<Utc>>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>12} {:>10} {:>8} {:>12}  {}",
        "SYMBOL", "PRICE", "CHANGE", "CHG%", "VOLUME", "SOURCE"
    );

    for result in results {
        let quote = &result.quote;
        let arrow = if quote.is_gain() { '+' } else { '-' };
        let _ = writeln!(
            out,
            "{:<12} {:>12.2} {:>10.2} {:>7.2}{} {:>12}  {}",
            result.symbol,
            quote.current_price,
            quote.change,
            quote.change_percent,
            arrow,
            quote.volume,
            result.source
        );
    }

    if results.is_empty() {
        let _ = writeln!(out, "(no data yet)");
    }
    if results.iter().any(|r| r.is_synthetic()) {
        let _ = writeln!(out, "Note: {}", DEGRADED_ADVISORY);
    }
    match last_updated {
        Some(at) => {
            let _ = writeln!(out, "Last updated {}", at.with_timezone(&Local).format("%H:%M:%S"));
        }
        None => {
            let _ = writeln!(out, "Waiting for first refresh");
        }
    }
    out
}

/// Read stdin on a dedicated thread so a pending read never holds up
/// runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Serve console commands until `quit` or end of input.
pub async fn run(pipeline: &Pipeline) {
    let mut lines = spawn_stdin_reader();
    println!("{}", HELP);

    while let Some(line) = lines.recv().await {
        let command = match parse_command(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(message)) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::Refresh => {
                if pipeline.scheduler.refresh_now() {
                    println!("Refresh started");
                } else {
                    println!("Refresh already in progress");
                }
            }
            Command::List(query) => {
                let results = pipeline.latest.query(&query);
                print!("{}", render_table(&results, pipeline.latest.last_updated()));
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {
                info!("Quit requested from console");
                return;
            }
        }
    }

    debug!("Console input closed");
}
