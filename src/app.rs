use crate::{
    backdrop::Backdrop,
    charts,
    config::Config,
    entries::{DATE_FORMAT, DiaryEntry, EntryForm},
    error::{LoadError, PlotError, SaveError},
    history::History,
    notice::Notice,
    quotes::quote_of_the_day,
    store::{self, Table},
};
use std::path::PathBuf;
use time::{Date, OffsetDateTime};
use tracing::{debug, error};

/// The local calendar date, or the UTC one when the local offset is unknown.
pub fn today() -> Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(err) => {
            debug!(error = %err, "local offset unavailable, using UTC");
            OffsetDateTime::now_utc().date()
        }
    }
}

pub struct Diary {
    config: Config,
}

impl Diary {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Background for the charts; a failed download is never an error.
    pub fn backdrop(&self) -> Backdrop {
        match &self.config.backdrop_url {
            Some(url) => Backdrop::fetch(url),
            None => Backdrop::Unavailable,
        }
    }

    /// Append the form as a new entry. The form itself is left alone, so saving
    /// twice records the same entry twice.
    pub fn save(&self, form: &EntryForm, date: Date) -> Notice {
        let entry = DiaryEntry::from_form(date, form);

        match store::append(&self.config.data_path, &entry) {
            Ok(()) => Notice::info("Success", "Diary entry saved successfully!"),
            Err(err) => save_failure(err),
        }
    }

    pub fn plot(&self, backdrop: &Backdrop) -> Notice {
        match self.draw(backdrop) {
            Ok((paths, skipped)) => {
                let mut message = String::from("Charts are ready:");
                for path in &paths {
                    message.push_str(&format!("\n  {}", path.display()));
                }
                if skipped > 0 {
                    message.push_str(&format!("\nSkipped {skipped} malformed row(s)."));
                }
                Notice::info("Charts", message)
            }
            Err(PlotError::Load(LoadError::NoData { .. })) => {
                Notice::warning("File Error", "No data found. Start writing your diary first!")
            }
            Err(PlotError::Load(LoadError::EmptyData)) => {
                Notice::warning("Data Error", "No data available to plot!")
            }
            Err(err) => {
                error!(error = %err, "failed to plot history");
                Notice::critical(
                    "Plot Error",
                    format!("An error occurred while plotting: {err}"),
                )
            }
        }
    }

    fn draw(&self, backdrop: &Backdrop) -> Result<(Vec<PathBuf>, usize), PlotError> {
        let table = store::load(&self.config.data_path)?;
        let history = History::from_table(&table)?;
        let paths = charts::render_all(&history, backdrop, &self.config.chart_dir)?;

        Ok((paths, history.skipped()))
    }

    pub fn today(&self, date: Date) -> Notice {
        let formatted = date
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| date.to_string());

        Notice::info("", format!("Date: {formatted}\n\n{}", quote_of_the_day(date)))
    }

    /// Print saved entries, optionally only those with `search` in any field.
    pub fn list(&self, search: Option<&str>, json: bool) -> Notice {
        let table = match store::load(&self.config.data_path) {
            Ok(table) => table,
            Err(LoadError::NoData { .. }) => {
                return Notice::warning(
                    "File Error",
                    "No data found. Start writing your diary first!",
                );
            }
            Err(LoadError::EmptyData) => return Notice::info("", "No entries yet."),
            Err(err) => {
                error!(error = %err, "failed to read diary");
                return Notice::critical(
                    "Read Error",
                    format!("An error occurred while reading: {err}"),
                );
            }
        };

        let rows = table.rows().iter().filter(|row| {
            search.is_none_or(|query| row.iter().any(|field| field.contains(query)))
        });

        let lines: Vec<String> = if json {
            rows.map(|row| row_to_json(&table, row)).collect()
        } else {
            rows.map(|row| row_summary(&table, row)).collect()
        };

        match (lines.is_empty(), search) {
            (true, Some(query)) => Notice::info("", format!("No entries match '{query}'.")),
            (true, None) => Notice::info("", "No entries yet."),
            (false, _) => Notice::info("", lines.join("\n")),
        }
    }
}

fn save_failure(err: SaveError) -> Notice {
    error!(error = %err, "failed to save entry");

    match err {
        SaveError::PermissionDenied { .. } => Notice::critical("Permission Error", err.to_string()),
        _ => Notice::critical("Save Error", format!("An error occurred while saving: {err}")),
    }
}

fn row_summary(table: &Table, row: &csv::StringRecord) -> String {
    let cell = |name| {
        table
            .column(name)
            .map(|idx| Table::field(row, idx))
            .unwrap_or("")
    };

    let mut line = format!(
        "{} happiness {}/5, productivity {}/5",
        cell("Date"),
        cell("Happiness_Score"),
        cell("Productivity_Score"),
    );
    let notes = cell("Notes");
    if !notes.is_empty() {
        line.push_str(&format!(": {notes}"));
    }
    line
}

fn row_to_json(table: &Table, row: &csv::StringRecord) -> String {
    let object: serde_json::Map<String, serde_json::Value> = table
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, header)| (header.to_owned(), Table::field(row, idx).into()))
        .collect();

    serde_json::Value::Object(object).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Level;
    use std::fs;
    use tempfile::TempDir;
    use time::macros::date;

    fn diary() -> (TempDir, Diary) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_path: dir.path().join("diary_data.csv"),
            chart_dir: dir.path().join("charts"),
            backdrop_url: None,
        };
        (dir, Diary::new(config))
    }

    fn write_table(dir: &TempDir, contents: &str) {
        fs::write(dir.path().join("diary_data.csv"), contents).unwrap();
    }

    #[test]
    fn saving_twice_appends_twice() {
        let (dir, diary) = diary();
        let form = EntryForm {
            happiness: 3,
            notes: "same again".into(),
            ..EntryForm::default()
        };

        let first = diary.save(&form, date!(2024 - 05 - 01));
        let second = diary.save(&form, date!(2024 - 05 - 01));

        assert_eq!(first.level, Level::Info);
        assert_eq!(second.message, "Diary entry saved successfully!");

        let contents = fs::read_to_string(dir.path().join("diary_data.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let diary = Diary::new(Config {
            data_path: dir.path().join("missing").join("diary_data.csv"),
            chart_dir: dir.path().to_path_buf(),
            backdrop_url: None,
        });

        let notice = diary.save(&EntryForm::default(), date!(2024 - 05 - 01));

        assert_eq!(notice.level, Level::Critical);
        assert_eq!(notice.title, "Save Error");
        assert!(notice.message.starts_with("An error occurred while saving:"));
    }

    #[test]
    fn locked_table_gets_its_own_title() {
        let notice = save_failure(SaveError::PermissionDenied {
            path: "diary_data.csv".into(),
        });

        assert_eq!(notice.level, Level::Critical);
        assert_eq!(notice.title, "Permission Error");
        assert!(notice.message.starts_with("Cannot save to 'diary_data.csv'."));

        let notice = save_failure(SaveError::Io(std::io::Error::other("disk full")));
        assert_eq!(notice.title, "Save Error");
        assert_eq!(notice.message, "An error occurred while saving: disk full");
    }

    #[test]
    fn plot_without_table_reports_no_data() {
        let (dir, diary) = diary();

        let notice = diary.plot(&Backdrop::Unavailable);

        assert_eq!(notice.level, Level::Warning);
        assert_eq!(notice.message, "No data found. Start writing your diary first!");
        assert!(!dir.path().join("charts").exists());
    }

    #[test]
    fn plot_with_header_only_reports_empty_data() {
        let (dir, diary) = diary();
        write_table(&dir, "Date,Happiness_Score\n");

        let notice = diary.plot(&Backdrop::Unavailable);

        assert_eq!(notice.level, Level::Warning);
        assert_eq!(notice.message, "No data available to plot!");
    }

    #[test]
    fn plot_with_bad_nap_hours_reports_plot_error() {
        let (_dir, diary) = diary();
        let form = EntryForm {
            nap_hours: "all afternoon".into(),
            ..EntryForm::default()
        };
        diary.save(&form, date!(2024 - 05 - 01));

        let notice = diary.plot(&Backdrop::Unavailable);

        assert_eq!(notice.level, Level::Critical);
        assert_eq!(notice.title, "Plot Error");
        assert!(notice.message.contains("all afternoon"));
    }

    #[test]
    fn plot_renders_saved_entries() {
        let (dir, diary) = diary();
        for (day, happiness) in [(3, 5), (1, 3), (2, 1)] {
            let form = EntryForm {
                happiness,
                nap_hours: "6".into(),
                coding: day != 2,
                ..EntryForm::default()
            };
            let date = Date::from_calendar_date(2024, time::Month::January, day).unwrap();
            diary.save(&form, date);
        }

        let notice = diary.plot(&Backdrop::Unavailable);

        assert_eq!(notice.level, Level::Info, "{notice}");
        for name in ["trend.svg", "naps.svg", "habits.svg"] {
            assert!(dir.path().join("charts").join(name).exists());
        }
        assert!(!notice.message.contains("Skipped"));
    }

    #[test]
    fn plot_mentions_skipped_rows() {
        let (dir, diary) = diary();
        diary.save(&EntryForm::default(), date!(2024 - 05 - 01));
        let mut contents = fs::read_to_string(dir.path().join("diary_data.csv")).unwrap();
        contents.push_str("2024-05-02,too,many,fields,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,\n");
        write_table(&dir, &contents);

        let notice = diary.plot(&Backdrop::Unavailable);

        assert_eq!(notice.level, Level::Info, "{notice}");
        assert!(notice.message.contains("Skipped 1 malformed row(s)."));
    }

    #[test]
    fn list_filters_by_search() {
        let (_dir, diary) = diary();
        for notes in ["walked the dog", "rainy day"] {
            let form = EntryForm {
                notes: notes.into(),
                ..EntryForm::default()
            };
            diary.save(&form, date!(2024 - 05 - 01));
        }

        let notice = diary.list(Some("dog"), false);
        assert_eq!(
            notice.message,
            "2024-05-01 happiness 1/5, productivity 1/5: walked the dog"
        );

        let notice = diary.list(Some("cat"), false);
        assert_eq!(notice.message, "No entries match 'cat'.");
    }

    #[test]
    fn list_as_json_keeps_column_names() {
        let (_dir, diary) = diary();
        diary.save(&EntryForm::default(), date!(2024 - 05 - 01));

        let notice = diary.list(None, true);
        let value: serde_json::Value = serde_json::from_str(&notice.message).unwrap();

        assert_eq!(value["Date"], "2024-05-01");
        assert_eq!(value["Unhappy_Importance"], "important");
        assert_eq!(value["Did_Coding"], "False");
    }

    #[test]
    fn today_shows_date_and_quote() {
        let (_dir, diary) = diary();

        let notice = diary.today(date!(2024 - 01 - 02));

        assert_eq!(
            notice.to_string(),
            "Date: 2024-01-02\n\nQuote of the Day 2: Keep shining!"
        );
    }
}
