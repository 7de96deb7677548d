//! spotwatch - print dashboard datasets from the command line.
//!
//! Runs one dataset query through the same cache and guard the dashboard
//! uses and prints the result as JSON.

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use spotwatch_core::{
    ChannelNotifier, Config, Dataset, DashboardClient, FilterSelection, HistoryOrder, QueryState,
};
use spotwatch_core::models::HistoryRow;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "\
Usage: spotwatch <dataset> [options]
       spotwatch --save-config

Datasets: countday, countdaysport, sports, locations, history, historyline, weekly

Options:
  --activity <name>   Add an activity (repeatable)
  --location <name>   Add a location (repeatable, none = all)
  --from <date>       Start, RFC 3339 or YYYY-MM-DD
  --to <date>         End, RFC 3339 or YYYY-MM-DD (inclusive day)
  --order <field>     date, activity, location, spots_total, spots_free
  --desc              Sort descending
  --refetch           Bypass cached results";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[derive(Debug, Default)]
struct CliArgs {
    dataset: Option<Dataset>,
    selection: FilterSelection,
    refetch: bool,
    save_config: bool,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Parse an RFC 3339 instant or a bare date. Bare end dates cover the whole day.
fn parse_instant(value: &str, bound: Bound) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {}", value))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| anyhow::anyhow!("Invalid end-of-day time"))?,
    };
    Ok(date.and_time(time).and_utc())
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("{} requires a value", flag))
        };
        match arg.as_str() {
            "--activity" => {
                parsed.selection.activities.insert(value("--activity")?);
            }
            "--location" => {
                parsed.selection.locations.insert(value("--location")?);
            }
            "--from" => parsed.selection.from = Some(parse_instant(&value("--from")?, Bound::Start)?),
            "--to" => parsed.selection.to = Some(parse_instant(&value("--to")?, Bound::End)?),
            "--order" => parsed.selection.order_by = HistoryOrder::parse(&value("--order")?),
            "--desc" => parsed.selection.desc = true,
            "--refetch" => parsed.refetch = true,
            "--save-config" => parsed.save_config = true,
            name if !name.starts_with("--") && parsed.dataset.is_none() => {
                parsed.dataset = Some(
                    Dataset::parse(name).ok_or_else(|| anyhow::anyhow!("Unknown dataset: {}", name))?,
                );
            }
            other => bail!("Unexpected argument: {}", other),
        }
    }
    Ok(parsed)
}

fn print_state<T: Serialize>(state: &QueryState<Vec<T>>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(state.data.as_ref())?);
    match &state.error {
        Some(err) => bail!("Query failed: {}", err),
        None => Ok(()),
    }
}

fn history_summary(rows: &[HistoryRow]) -> String {
    let free: i64 = rows.iter().map(HistoryRow::places_free).sum();
    let full = rows.iter().filter(|row| row.places_free() == 0).count();
    format!("{} lessons, {} places free, {} fully booked", rows.len(), free, full)
}

async fn run(client: &DashboardClient, dataset: Dataset, args: &CliArgs) -> Result<()> {
    let sel = &args.selection;
    if dataset.needs_selection() && !spotwatch_core::is_fetchable(sel) {
        eprintln!("Nothing to fetch: select at least one --activity and both --from and --to.");
    }

    match (dataset, args.refetch) {
        (Dataset::CountDay, false) => print_state(&client.get_count_day().await),
        (Dataset::CountDay, true) => print_state(&client.refetch_count_day().await),
        (Dataset::CountDayPerSport, false) => print_state(&client.get_count_day_per_sport().await),
        (Dataset::CountDayPerSport, true) => print_state(&client.refetch_count_day_per_sport().await),
        (Dataset::Sports, false) => print_state(&client.get_sports().await),
        (Dataset::Sports, true) => print_state(&client.refetch_sports().await),
        (Dataset::Locations, false) => print_state(&client.get_locations().await),
        (Dataset::Locations, true) => print_state(&client.refetch_locations().await),
        (Dataset::History, refetch) => {
            let state = if refetch {
                client.refetch_history(sel).await
            } else {
                client.get_history(sel).await
            };
            if !state.data.is_empty() {
                eprintln!("{}", history_summary(&state.data));
            }
            print_state(&state)
        }
        (Dataset::HistoryLine, false) => print_state(&client.get_history_line(sel).await),
        (Dataset::HistoryLine, true) => print_state(&client.refetch_history_line(sel).await),
        (Dataset::Weekly, false) => print_state(&client.get_weekly(sel).await),
        (Dataset::Weekly, true) => print_state(&client.refetch_weekly(sel).await),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = Config::load()?;
    if cli.save_config {
        config.save()?;
        eprintln!("Saved config to {}", Config::config_path()?.display());
        return Ok(());
    }

    let dataset = match cli.dataset {
        Some(dataset) => dataset,
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    info!(base_url = %config.base_url, dataset = %dataset, "spotwatch starting");
    let (notifier, mut notices) = ChannelNotifier::new();
    let client = DashboardClient::from_config(&config, Arc::new(notifier))?;

    let result = run(&client, dataset, &cli).await;

    while let Ok(notice) = notices.try_recv() {
        eprintln!("{}: {}", notice.title, notice.message);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_history_args() {
        let cli = parse_args(&args(&[
            "history",
            "--activity",
            "Volleyball",
            "--activity",
            "Badminton",
            "--from",
            "2023-01-01",
            "--to",
            "2023-01-31",
            "--order",
            "spots_free",
            "--desc",
        ]))
        .unwrap();

        assert_eq!(cli.dataset, Some(Dataset::History));
        assert_eq!(cli.selection.activities.len(), 2);
        assert!(cli.selection.desc);
        assert_eq!(cli.selection.order_by, HistoryOrder::SpotsFree);
        assert_eq!(
            cli.selection.from.unwrap().to_rfc3339(),
            "2023-01-01T00:00:00+00:00"
        );
        assert_eq!(
            cli.selection.to.unwrap().to_rfc3339(),
            "2023-01-31T23:59:59+00:00"
        );
        assert!(spotwatch_core::is_fetchable(&cli.selection));
    }

    #[test]
    fn test_parse_rfc3339_dates() {
        let at = parse_instant("2023-01-10T18:15:00+01:00", Bound::End).unwrap();
        assert_eq!(at.to_rfc3339(), "2023-01-10T17:15:00+00:00");
    }

    #[test]
    fn test_unknown_order_falls_back_to_date() {
        let cli = parse_args(&args(&["history", "--order", "price"])).unwrap();
        assert_eq!(cli.selection.order_by, HistoryOrder::Date);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["histogram"])).is_err());
        assert!(parse_args(&args(&["history", "--activity"])).is_err());
        assert!(parse_args(&args(&["history", "--from", "yesterday"])).is_err());
        assert!(parse_args(&args(&["sports", "weekly"])).is_err());
    }

    #[test]
    fn test_save_config_without_dataset() {
        let cli = parse_args(&args(&["--save-config"])).unwrap();
        assert!(cli.save_config);
        assert!(cli.dataset.is_none());
    }

    #[test]
    fn test_history_summary_counts_free_places() {
        let rows: Vec<HistoryRow> = serde_json::from_str(
            r#"[
                {"sport": "Yoga", "from_date": "2023-01-10T07:00:00Z", "places_max": 20, "places_taken": 12},
                {"sport": "Yoga", "from_date": 1673370900, "places_max": 10, "places_taken": 11}
            ]"#,
        )
        .unwrap();
        assert_eq!(history_summary(&rows), "2 lessons, 8 places free, 1 fully booked");
    }
}
