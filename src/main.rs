use anyhow::anyhow;
use app::Diary;
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod app;
mod backdrop;
mod charts;
mod cli;
mod config;
mod entries;
mod error;
mod history;
mod notice;
mod quotes;
mod store;

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moodlog=warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to set up logging: {err}"))?;

    let cli = Cli::parse();
    let diary = Diary::new(Config::from_options(&cli.options));

    let notice = match cli.command {
        Command::Save(form) => diary.save(&form, app::today()),
        Command::Plot => diary.plot(&diary.backdrop()),
        Command::Today => diary.today(app::today()),
        Command::List { search, json } => diary.list(search.as_deref(), json),
    };

    notice.show();

    Ok(notice.exit_code())
}
