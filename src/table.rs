//! In-memory string table passed between pipeline stages.
//!
//! Every stage artifact is a CSV file with a header row; inside one process a
//! stage works on a [`Table`] and the calling stage does the file I/O.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::SOURCE_FILE;
use crate::error::{MonitorError, Result};
use crate::metrics::StageMetrics;

/// Rectangular table of string cells. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding short rows with empty cells and dropping surplus cells
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Exact header match first, then a case-insensitive one
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.column_index(name).or_else(|| {
            let lowered = name.to_lowercase();
            self.headers.iter().position(|h| h.to_lowercase() == lowered)
        })
    }

    /// Cell value by row and column name; `None` when the column is absent
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r[idx].as_str())
    }

    /// Add a column, or overwrite it if it already exists. `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    /// Project onto `columns` in the given order; absent columns are filled with empty strings
    pub fn select(&self, columns: &[&str]) -> Table {
        let indices: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
                    .collect()
            })
            .collect();
        Table {
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Stack tables vertically. Headers are unioned in first-seen order.
    ///
    /// A header that differs from an earlier table's only by case joins that
    /// column under the first spelling seen. Columns within one table are never merged.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut combined = Table::default();
        let mut mappings = Vec::with_capacity(tables.len());
        for table in &tables {
            let mut claimed: Vec<usize> = Vec::with_capacity(table.headers.len());
            for header in &table.headers {
                let lowered = header.to_lowercase();
                let existing = combined.column_index(header).filter(|i| !claimed.contains(i)).or_else(|| {
                    combined
                        .headers
                        .iter()
                        .enumerate()
                        .position(|(i, h)| !claimed.contains(&i) && h.to_lowercase() == lowered)
                });
                let idx = match existing {
                    Some(idx) => {
                        if combined.headers[idx] != *header {
                            debug!("Merging column '{}' into '{}'", header, combined.headers[idx]);
                        }
                        idx
                    }
                    None => {
                        combined.headers.push(header.clone());
                        combined.headers.len() - 1
                    }
                };
                claimed.push(idx);
            }
            mappings.push(claimed);
        }

        let width = combined.headers.len();
        for (table, mapping) in tables.into_iter().zip(mappings) {
            for row in table.rows {
                let mut out = vec![String::new(); width];
                for (cell, &idx) in row.into_iter().zip(&mapping) {
                    out[idx] = cell;
                }
                combined.rows.push(out);
            }
        }
        combined
    }

    /// Parse CSV with a header row. `origin` names the source in diagnostics.
    ///
    /// Short records are padded. Surplus cells are dropped with a warning.
    pub fn from_reader<R: io::Read>(reader: R, origin: &str) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect::<Vec<_>>();
        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record?;
            if record.len() > table.headers.len() {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                warn!(
                    "{} line {}: {} cells for {} columns, dropping the extra cells",
                    origin,
                    line,
                    record.len(),
                    table.headers.len()
                );
            }
            table.push_row(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Table> {
        if !path.exists() {
            return Err(MonitorError::MissingInput { path: path.to_path_buf() });
        }
        let file = fs::File::open(path).map_err(|e| MonitorError::read_file(path, e))?;
        Table::from_reader(file, &path.display().to_string()).map_err(|e| MonitorError::read_file(path, e))
    }

    /// Write the table, creating parent directories as needed. Overwrites an existing file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let file = fs::File::create(path).map_err(|e| MonitorError::write_file(path, e))?;
        self.to_writer(file).map_err(|e| MonitorError::write_file(path, e))?;
        debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| MonitorError::write_file(parent, e))?;
        }
    }
    Ok(())
}

/// Load and concatenate every `*.csv` file directly inside `dir`, in filename order.
///
/// Each row gets a `__source_file` column naming the file it came from. Files
/// that fail to parse are skipped with a warning; a missing directory is an error.
pub fn read_csv_dir(dir: &Path) -> Result<Table> {
    if !dir.is_dir() {
        return Err(MonitorError::MissingInput { path: dir.to_path_buf() });
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| MonitorError::read_file(dir, e))? {
        let path = entry.map_err(|e| MonitorError::read_file(dir, e))?.path();
        let is_csv = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut frames = Vec::new();
    for path in paths {
        match Table::read_csv(&path) {
            Ok(mut table) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                debug!("Read {} rows from {}", table.len(), path.display());
                table.set_column(SOURCE_FILE, vec![name; table.len()]);
                frames.push(table);
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                StageMetrics::record_file_skipped();
            }
        }
    }

    Ok(Table::concat(frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::capture_logs;
    use tempfile::tempdir;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(headers.iter().copied());
        for row in rows {
            t.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        t
    }

    #[test]
    fn test_find_column_prefers_exact_then_case_insensitive() {
        let t = table(&["Text", "text"], &[]);
        assert_eq!(t.find_column("text"), Some(1));
        assert_eq!(t.find_column("TEXT"), Some(0));
        assert_eq!(t.find_column("body"), None);
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let t = table(&["a", "b"], &[&["1"], &["1", "2", "3"]]);
        assert_eq!(t.rows()[0], vec!["1", ""]);
        assert_eq!(t.rows()[1], vec!["1", "2"]);
    }

    #[test]
    fn test_select_fills_missing_and_drops_extra() {
        let t = table(&["b", "extra", "a"], &[&["2", "x", "1"]]);
        let selected = t.select(&["a", "b", "c"]);
        assert_eq!(selected.headers(), &["a", "b", "c"]);
        assert_eq!(selected.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_concat_unions_headers() {
        let first = table(&["a", "b"], &[&["1", "2"]]);
        let second = table(&["b", "c"], &[&["3", "4"]]);
        let combined = Table::concat(vec![first, second]);
        assert_eq!(combined.headers(), &["a", "b", "c"]);
        assert_eq!(combined.rows()[0], vec!["1", "2", ""]);
        assert_eq!(combined.rows()[1], vec!["", "3", "4"]);
    }

    #[test]
    fn test_concat_folds_headers_that_differ_only_by_case() {
        let first = table(&["Message", "user"], &[&["first", "amy"]]);
        let second = table(&["message"], &[&["second"]]);
        let combined = Table::concat(vec![first, second]);
        assert_eq!(combined.headers(), &["Message", "user"]);
        assert_eq!(combined.get(0, "Message"), Some("first"));
        assert_eq!(combined.get(1, "Message"), Some("second"));
    }

    #[test]
    fn test_concat_keeps_case_variants_within_one_table() {
        let only = table(&["Text", "text"], &[&["upper", "lower"]]);
        let combined = Table::concat(vec![only.clone()]);
        assert_eq!(combined, only);

        let later = table(&["TEXT"], &[&["third"]]);
        let combined = Table::concat(vec![only, later]);
        assert_eq!(combined.headers(), &["Text", "text"]);
        assert_eq!(combined.rows()[1], vec!["third", ""]);
    }

    #[test]
    fn test_ragged_row_warns_with_origin_and_line() {
        let body = "text,user\nok,amy\ntoo,many,cells\n";
        let (parsed, logs) = capture_logs(|| Table::from_reader(body.as_bytes(), "raw/export.csv"));
        let parsed = parsed.unwrap();
        assert_eq!(parsed.rows()[1], vec!["too", "many"]);
        assert!(logs.contains("raw/export.csv line 3"), "{logs}");
        assert!(logs.contains("3 cells for 2 columns"), "{logs}");
    }

    #[test]
    fn test_csv_roundtrip_keeps_quoted_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let t = table(&["id", "text"], &[&["1", "hello, \"world\"\nline two"]]);
        t.write_csv(&path).unwrap();
        assert_eq!(Table::read_csv(&path).unwrap(), t);
    }

    #[test]
    fn test_read_csv_missing_file() {
        let err = Table::read_csv(Path::new("/nonexistent/file.csv")).unwrap_err();
        assert!(matches!(err, MonitorError::MissingInput { .. }));
    }

    #[test]
    fn test_read_csv_dir_skips_bad_files_and_tags_source() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "text\nsecond\n").unwrap();
        fs::write(dir.path().join("a.CSV"), "text,user\nfirst,amy\n").unwrap();
        fs::write(dir.path().join("broken.csv"), [0xff, 0xfe, b'\n', 0xff]).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored\n").unwrap();

        let combined = read_csv_dir(dir.path()).unwrap();
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.get(0, "text"), Some("first"));
        assert_eq!(combined.get(0, SOURCE_FILE), Some("a.CSV"));
        assert_eq!(combined.get(1, "text"), Some("second"));
        assert_eq!(combined.get(1, "user"), Some(""));
        assert_eq!(combined.get(1, SOURCE_FILE), Some("b.csv"));
    }

    #[test]
    fn test_read_csv_dir_missing_directory() {
        let err = read_csv_dir(Path::new("/nonexistent/raw")).unwrap_err();
        assert!(matches!(err, MonitorError::MissingInput { .. }));
    }
}
