use crate::entries::EntryForm;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_BACKDROP_URL: &str = "https://i.postimg.cc/0jtwKScH/Untitled-design-15.jpg";

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[clap(flatten)]
    pub options: Options,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Clone, Debug)]
pub struct Options {
    /// Diary table to write to and read from
    #[arg(long, global = true, env = "DIARY_DATA", default_value = "diary_data.csv")]
    pub data: PathBuf,

    /// Directory the charts are written to
    #[arg(long, global = true, env = "DIARY_CHART_DIR", default_value = ".")]
    pub charts: PathBuf,

    /// Background image painted behind the charts
    #[arg(long, global = true, env = "DIARY_BACKDROP_URL", default_value = DEFAULT_BACKDROP_URL)]
    pub backdrop_url: String,

    /// Skip downloading the background image
    #[arg(long, global = true)]
    pub no_backdrop: bool,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Save today's entry
    Save(EntryForm),
    /// Draw charts of your history
    Plot,
    /// Show today's date and quote
    Today,
    /// List saved entries
    List {
        /// Only show entries containing this text
        #[arg(long, short)]
        search: Option<String>,

        /// Print entries as JSON objects, one per line
        #[arg(long)]
        json: bool,
    },
}
