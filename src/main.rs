use std::process::ExitCode;

use samescraper::{init_tracing, SameRust, SameRustError};
use serde::Serialize;
use tracing::error;

const USAGE: &str = "usage: samescraper [schedule | home | latest [page] | pages [limit] | max-page]";
const DEFAULT_PAGE_LIMIT: u32 = 3;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Schedule,
    Home,
    Latest(u32),
    Pages(u32),
    MaxPage,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let command = match parse_command(&std::env::args().skip(1).collect::<Vec<_>>()) {
        Ok(command) => command,
        Err(e) => {
            error!(error = %e, "{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "scrape failed");
            ExitCode::FAILURE
        }
    }
}

fn parse_command(args: &[String]) -> Result<Command, SameRustError> {
    let number = |default: u32| -> Result<u32, SameRustError> {
        args.get(1)
            .map(|raw| raw.parse::<u32>().map_err(SameRustError::from))
            .unwrap_or(Ok(default))
    };

    match args.first().map(String::as_str).unwrap_or("schedule") {
        "schedule" => Ok(Command::Schedule),
        "home" => Ok(Command::Home),
        "latest" => Ok(Command::Latest(number(1)?)),
        "pages" => Ok(Command::Pages(number(DEFAULT_PAGE_LIMIT)?)),
        "max-page" => Ok(Command::MaxPage),
        other => Err(SameRustError::UnknownError(format!(
            "unknown command: {}",
            other
        ))),
    }
}

async fn run(command: Command) -> Result<(), SameRustError> {
    let scraper = SameRust::new()?.samehadaku;

    match command {
        Command::Schedule => print_json(&scraper.scrape_schedule().await),
        Command::Home => print_json(&scraper.scrape_home().await?),
        Command::Latest(page) => print_json(&scraper.scrape_latest_page(page).await),
        Command::Pages(limit) => print_json(&scraper.scrape_latest_pages_up_to(limit).await),
        Command::MaxPage => print_json(&scraper.get_max_page().await),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SameRustError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
