use crate::cli::Options;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub chart_dir: PathBuf,
    pub backdrop_url: Option<String>,
}

impl Config {
    /// Settings after flags, environment and `.env` have been merged by the parser.
    pub fn from_options(options: &Options) -> Self {
        let backdrop_url = Some(options.backdrop_url.trim())
            .filter(|url| !options.no_backdrop && !url.is_empty())
            .map(str::to_owned);

        Self {
            data_path: options.data.clone(),
            chart_dir: options.charts.clone(),
            backdrop_url,
        }
    }
}
