//! split-settle CLI
//!
//! Settle a saved expense session from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Who owes whom, in the session's settlement currency
//! split-settle settle --input session.json
//!
//! # In another currency, as JSON
//! split-settle settle --input session.json --currency KRW --format json
//!
//! # Paid / share / net per participant
//! split-settle balances --input session.json
//!
//! # Generate a random session for testing
//! split-settle generate --participants 6 --transactions 40
//! ```

use chrono::Utc;
use log::{error, info};
use rust_decimal::Decimal;
use split_settle::core::currency::CurrencyCode;
use split_settle::session::config::SessionConfig;
use split_settle::session::snapshot::SessionSnapshot;
use split_settle::session::state::Session;
use split_settle::settlement::debt_table::round_for_display;
use split_settle::simulation::generator::{generate_random_session, SessionGenConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-settle — multi-currency shared expense settlement

USAGE:
    split-settle <COMMAND> [OPTIONS]

COMMANDS:
    settle      Compute pairwise net debts for a saved session
    balances    Show what each participant paid, owed and nets out to
    generate    Generate a random session snapshot (for testing)
    help        Show this message

OPTIONS (settle, balances):
    --input <FILE>      Path to a JSON session snapshot
    --currency <CODE>   Settlement currency (default: the snapshot's)
    --format <FORMAT>   Output format: text (default) or json
    --ignore-expiry     Accept snapshots older than 15 days

OPTIONS (generate):
    --participants <N>  Number of participants (default: 5)
    --transactions <N>  Number of transactions (default: 20)
    --currencies <LIST> Comma-separated extra currency codes (default: KRW,USD)
    --seed <N>          Seed for reproducible output
    --output <FILE>     Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG            Log filter, e.g. RUST_LOG=debug

EXAMPLES:
    split-settle settle --input trip.json
    split-settle settle --input trip.json --currency KRW --format json
    split-settle balances --input trip.json
    split-settle generate --participants 4 --currencies KRW,JPY --output trip.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Options shared by `settle` and `balances`.
struct ReportArgs {
    input: String,
    currency: Option<String>,
    json: bool,
    ignore_expiry: bool,
}

fn parse_report_args(args: &[String]) -> ReportArgs {
    let mut input = None;
    let mut currency = None;
    let mut format = "text".to_string();
    let mut ignore_expiry = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--input requires a file path")),
                );
            }
            "--currency" => {
                i += 1;
                currency = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--currency requires a currency code")),
                );
            }
            "--format" => {
                i += 1;
                format = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail("--format requires 'text' or 'json'"));
            }
            "--ignore-expiry" => ignore_expiry = true,
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let json = match format.as_str() {
        "text" => false,
        "json" => true,
        other => fail(format!("unknown format '{}', expected text or json", other)),
    };

    ReportArgs {
        input: input.unwrap_or_else(|| fail("--input <FILE> is required")),
        currency,
        json,
        ignore_expiry,
    }
}

fn load_session(args: &ReportArgs) -> Session {
    let content = fs::read_to_string(&args.input)
        .unwrap_or_else(|e| fail(format!("reading '{}': {}", args.input, e)));
    let snapshot = SessionSnapshot::from_json(&content).unwrap_or_else(|e| fail(e));

    let config = SessionConfig::default();
    let restored = if args.ignore_expiry {
        snapshot.restore_unchecked_age(config)
    } else {
        snapshot.restore(Utc::now(), config)
    };
    let mut session = restored.unwrap_or_else(|e| fail(e));

    if let Some(code) = &args.currency {
        session
            .set_settlement_currency(code)
            .unwrap_or_else(|e| fail(e));
    }
    info!(
        "loaded {} participants and {} transactions from {}",
        session.roster().len(),
        session.transactions().len(),
        args.input
    );
    session
}

/// JSON output schema for settlement results.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SettlementOutput {
    settlement_currency: CurrencyCode,
    debts: Vec<DebtOutput>,
    total_transfer: String,
}

#[derive(serde::Serialize)]
struct DebtOutput {
    payer: String,
    receiver: String,
    amount: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceOutput {
    participant: String,
    paid: String,
    share: String,
    net: String,
}

fn display(amount: Decimal) -> String {
    format!("{:.2}", round_for_display(amount))
}

fn cmd_settle(args: &[String]) {
    let args = parse_report_args(args);
    let session = load_session(&args);
    let table = session.settle().unwrap_or_else(|e| fail(e));

    if args.json {
        let output = SettlementOutput {
            settlement_currency: table.settlement_currency().clone(),
            debts: table
                .displayable_debts()
                .iter()
                .map(|d| DebtOutput {
                    payer: d.payer.to_string(),
                    receiver: d.receiver.to_string(),
                    amount: display(d.amount),
                })
                .collect(),
            total_transfer: display(table.total_transfer()),
        };
        let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        print!("{}", table);
    }
}

fn cmd_balances(args: &[String]) {
    let args = parse_report_args(args);
    let session = load_session(&args);
    let balances = session.balances().unwrap_or_else(|e| fail(e));
    let currency = session.settlement_currency();

    if args.json {
        let output: Vec<BalanceOutput> = balances
            .iter()
            .map(|b| BalanceOutput {
                participant: b.participant.to_string(),
                paid: display(b.paid),
                share: display(b.share),
                net: display(b.net),
            })
            .collect();
        let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        println!("=== Balances ({}) ===", currency);
        println!(
            "{:<16} {:>12} {:>12} {:>12}",
            "Participant", "Paid", "Share", "Net"
        );
        for b in &balances {
            println!(
                "{:<16} {:>12} {:>12} {:>12}",
                b.participant.as_str(),
                display(b.paid),
                display(b.share),
                display(b.net)
            );
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = SessionGenConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                config.participant_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--participants requires a number"));
            }
            "--transactions" => {
                i += 1;
                config.transaction_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--transactions requires a number"));
            }
            "--currencies" => {
                i += 1;
                let list = args
                    .get(i)
                    .unwrap_or_else(|| fail("--currencies requires a comma-separated list"));
                config.currencies = list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "--seed" => {
                i += 1;
                config.seed = Some(
                    args.get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| fail("--seed requires a number")),
                );
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let session = generate_random_session(&config).unwrap_or_else(|e| fail(e));
    let json = session
        .snapshot(Utc::now())
        .to_json()
        .unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("writing '{}': {}", path, e)));
        eprintln!(
            "Generated {} transactions across {} participants → {}",
            session.transactions().len(),
            session.roster().len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "settle" => cmd_settle(rest),
        "balances" => cmd_balances(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
