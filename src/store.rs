use crate::{
    entries::{COLUMNS, DiaryEntry},
    error::{LoadError, SaveError},
};
use csv::StringRecord;
use std::{
    fs::{self, File, OpenOptions},
    io,
    path::Path,
};
use tracing::{debug, info, warn};

/// Append one entry to the table at `path`. The header row is only written
/// when the table does not exist yet.
pub fn append(path: &Path, entry: &DiaryEntry) -> Result<(), SaveError> {
    let write_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(err) if err.kind() == io::ErrorKind::NotFound => true,
        Err(err) => return Err(SaveError::from_io(path, err)),
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| SaveError::from_io(path, err))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);

    writer
        .serialize(entry)
        .map_err(|err| SaveError::from_csv(path, err))?;
    writer.flush().map_err(|err| SaveError::from_io(path, err))?;

    info!(path = %path.display(), header = write_header, "appended diary entry");

    Ok(())
}

/// The raw diary table as read from disk.
#[derive(Debug)]
pub struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    skipped: usize,
}

impl Table {
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Rows dropped while reading because they did not fit the header.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn column(&self, name: &'static str) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or(LoadError::MissingColumn(name))
    }

    /// Cell `idx` of `row`; short rows read as empty.
    pub fn field(row: &StringRecord, idx: usize) -> &str {
        row.get(idx).unwrap_or("")
    }
}

/// Read the whole table at `path`.
pub fn load(path: &Path) -> Result<Table, LoadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::NoData {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err.into()),
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::EmptyData);
    }
    if !headers.iter().eq(COLUMNS) {
        warn!(path = %path.display(), "table columns differ from the diary layout");
    }

    let mut rows = Vec::new();
    let mut skipped = 0;

    for result in reader.records() {
        match result {
            Ok(record) if record.len() > headers.len() => {
                debug!(line = ?record.position().map(|p| p.line()), "skipping bad line");
                skipped += 1;
            }
            Ok(record) => rows.push(record),
            Err(err) if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) => {
                debug!(error = %err, "skipping bad line");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "dropped malformed rows");
    }

    if rows.is_empty() {
        return Err(LoadError::EmptyData);
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded diary table");

    Ok(Table {
        headers,
        rows,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::EntryForm;
    use time::macros::date;

    fn entry(happiness: u8) -> DiaryEntry {
        let form = EntryForm {
            happiness,
            ..EntryForm::default()
        };
        DiaryEntry::from_form(date!(2024 - 01 - 01), &form)
    }

    #[test]
    fn first_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_data.csv");

        for happiness in 1..=3 {
            append(&path, &entry(happiness)).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        let header = COLUMNS.join(",");

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], header);
        assert_eq!(lines.iter().filter(|line| **line == header).count(), 1);
    }

    #[test]
    fn empty_file_gets_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_data.csv");
        File::create(&path).unwrap();

        append(&path, &entry(2)).unwrap();

        let table = load(&path).unwrap();
        assert_eq!(table.headers().len(), COLUMNS.len());
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn append_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("diary_data.csv");

        let err = append(&path, &entry(1)).unwrap_err();
        assert!(matches!(err, SaveError::Io(_)));
    }

    #[test]
    fn missing_table_is_no_data() {
        let dir = tempfile::tempdir().unwrap();

        let err = load(&dir.path().join("diary_data.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NoData { .. }));
    }

    #[test]
    fn header_only_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_data.csv");
        fs::write(&path, format!("{}\n", COLUMNS.join(","))).unwrap();

        assert!(matches!(load(&path), Err(LoadError::EmptyData)));
    }

    #[test]
    fn zero_byte_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_data.csv");
        File::create(&path).unwrap();

        assert!(matches!(load(&path), Err(LoadError::EmptyData)));
    }

    #[test]
    fn long_rows_are_skipped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_data.csv");
        fs::write(
            &path,
            "Date,Nap_Hours\n2024-01-01,7\n2024-01-02,8,extra\n2024-01-03\n",
        )
        .unwrap();

        let table = load(&path).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.skipped(), 1);

        let nap = table.column("Nap_Hours").unwrap();
        assert_eq!(Table::field(&table.rows()[0], nap), "7");
        assert_eq!(Table::field(&table.rows()[1], nap), "");
    }

    #[test]
    fn rows_with_invalid_utf8_are_skipped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_data.csv");
        fs::write(
            &path,
            b"Date,Nap_Hours\n2024-01-01,7\n2024-01-02,\xff\xfe\n2024-01-03,8\n",
        )
        .unwrap();

        let table = load(&path).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.skipped(), 1);

        let date = table.column("Date").unwrap();
        assert_eq!(Table::field(&table.rows()[1], date), "2024-01-03");
    }

    #[test]
    fn unknown_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_data.csv");
        fs::write(&path, "Date\n2024-01-01\n").unwrap();

        let table = load(&path).unwrap();
        assert!(matches!(
            table.column("Nap_Hours"),
            Err(LoadError::MissingColumn("Nap_Hours"))
        ));
    }
}
