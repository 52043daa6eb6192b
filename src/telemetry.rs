use crate::app_dirs::AppDirs;
use chrono::Local;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::cell::RefCell;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Posted once when a session reaches its terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalRecord {
    pub user: String,
    pub puzzle: String,
    /// Remaining whole seconds on the countdown at emission (0 on timeout).
    pub time: u64,
    pub present_words_left: usize,
    pub total_words_left: usize,
    pub words_in_puzzle: usize,
    pub puzzle_skipped: usize,
    pub words_skipped: usize,
    pub words_found: usize,
    pub does_not_exist: usize,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Posted once per word event (found, skipped, or flagged missing), keyed by
/// the word's text rather than any display index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordRecord {
    pub user: String,
    pub puzzle: String,
    /// Elapsed milliseconds since the per-word clock started.
    pub time: u64,
    pub word: String,
    pub skipped: u8,
    pub missing: u8,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Destination for session telemetry. Delivery is fire-and-forget: callers
/// ignore the result and never retry.
pub trait TelemetrySink {
    fn post_terminal(&mut self, record: &TerminalRecord) -> Result<(), Box<dyn Error>>;
    fn post_word(&mut self, record: &WordRecord) -> Result<(), Box<dyn Error>>;
}

/// SQLite-backed sink storing both record shapes.
#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database at the default state path.
    pub fn new() -> rusqlite::Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("wordsweep_telemetry.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::with_connection(Connection::open(&db_path)?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS session_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                puzzle TEXT NOT NULL,
                time INTEGER NOT NULL,
                present_words_left INTEGER NOT NULL,
                total_words_left INTEGER NOT NULL,
                words_in_puzzle INTEGER NOT NULL,
                puzzle_skipped INTEGER NOT NULL,
                words_skipped INTEGER NOT NULL,
                words_found INTEGER NOT NULL,
                does_not_exist INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS word_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                puzzle TEXT NOT NULL,
                time INTEGER NOT NULL,
                word TEXT NOT NULL,
                skipped INTEGER NOT NULL,
                missing INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_session_records_user ON session_records(user)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_word_records_word ON word_records(word)",
            [],
        )?;

        Ok(SqliteSink { conn })
    }

    pub fn session_count(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM session_records", [], |row| row.get(0))
    }

    pub fn word_count(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM word_records", [], |row| row.get(0))
    }

    /// (time, skipped, missing) rows for one word, most recent first.
    pub fn word_rows(&self, word: &str) -> rusqlite::Result<Vec<(u64, u8, u8)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT time, skipped, missing
            FROM word_records
            WHERE word = ?1
            ORDER BY timestamp DESC
            "#,
        )?;

        let rows = stmt.query_map([word], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }

        Ok(out)
    }
}

impl TelemetrySink for SqliteSink {
    fn post_terminal(&mut self, record: &TerminalRecord) -> Result<(), Box<dyn Error>> {
        self.conn.execute(
            r#"
            INSERT INTO session_records
            (user, puzzle, time, present_words_left, total_words_left, words_in_puzzle,
             puzzle_skipped, words_skipped, words_found, does_not_exist, timestamp, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.user,
                record.puzzle,
                record.time,
                record.present_words_left,
                record.total_words_left,
                record.words_in_puzzle,
                record.puzzle_skipped,
                record.words_skipped,
                record.words_found,
                record.does_not_exist,
                record.timestamp,
                Local::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn post_word(&mut self, record: &WordRecord) -> Result<(), Box<dyn Error>> {
        self.conn.execute(
            r#"
            INSERT INTO word_records
            (user, puzzle, time, word, skipped, missing, timestamp, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.user,
                record.puzzle,
                record.time,
                record.word,
                record.skipped,
                record.missing,
                record.timestamp,
                Local::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}

/// Appends terminal records to a CSV session log, writing the header on
/// first use. Per-word records are left to the SQLite sink.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new() -> Self {
        let path = AppDirs::sessions_csv_path().unwrap_or_else(|| PathBuf::from("sessions.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for CsvSink {
    fn post_terminal(&mut self, record: &TerminalRecord) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        writer.serialize(record)?;
        writer.flush()?;

        Ok(())
    }

    fn post_word(&mut self, _record: &WordRecord) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}

/// In-process sink for tests. Clone the handles before moving the sink into
/// a session to inspect what was posted.
#[derive(Debug, Default)]
pub struct MemorySink {
    terminals: Rc<RefCell<Vec<TerminalRecord>>>,
    words: Rc<RefCell<Vec<WordRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminal_handle(&self) -> Rc<RefCell<Vec<TerminalRecord>>> {
        Rc::clone(&self.terminals)
    }

    pub fn word_handle(&self) -> Rc<RefCell<Vec<WordRecord>>> {
        Rc::clone(&self.words)
    }
}

impl TelemetrySink for MemorySink {
    fn post_terminal(&mut self, record: &TerminalRecord) -> Result<(), Box<dyn Error>> {
        self.terminals.borrow_mut().push(record.clone());
        Ok(())
    }

    fn post_word(&mut self, record: &WordRecord) -> Result<(), Box<dyn Error>> {
        self.words.borrow_mut().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal_record() -> TerminalRecord {
        TerminalRecord {
            user: "u1".to_string(),
            puzzle: "p1".to_string(),
            time: 42,
            present_words_left: 2,
            total_words_left: 2,
            words_in_puzzle: 8,
            puzzle_skipped: 0,
            words_skipped: 1,
            words_found: 5,
            does_not_exist: 0,
            timestamp: 1_700_000_000_000,
        }
    }

    fn word_record() -> WordRecord {
        WordRecord {
            user: "u1".to_string(),
            puzzle: "p1".to_string(),
            time: 3_200,
            word: "cat".to_string(),
            skipped: 0,
            missing: 0,
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_sqlite_sink_roundtrip() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        sink.post_terminal(&terminal_record()).unwrap();
        sink.post_word(&word_record()).unwrap();

        assert_eq!(sink.session_count().unwrap(), 1);
        assert_eq!(sink.word_count().unwrap(), 1);

        let rows = sink.word_rows("cat").unwrap();
        assert_eq!(rows, vec![(3_200, 0, 0)]);
    }

    #[test]
    fn test_sqlite_sink_empty() {
        let sink = SqliteSink::open_in_memory().unwrap();
        assert_eq!(sink.session_count().unwrap(), 0);
        assert_eq!(sink.word_count().unwrap(), 0);
        assert!(sink.word_rows("cat").unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_sink_skipped_and_missing_flags() {
        let mut sink = SqliteSink::open_in_memory().unwrap();

        let mut skipped = word_record();
        skipped.word = "dog".to_string();
        skipped.skipped = 1;
        sink.post_word(&skipped).unwrap();

        let mut missing = word_record();
        missing.word = "fox".to_string();
        missing.missing = 1;
        sink.post_word(&missing).unwrap();

        assert_eq!(sink.word_rows("dog").unwrap(), vec![(3_200, 1, 0)]);
        assert_eq!(sink.word_rows("fox").unwrap(), vec![(3_200, 0, 1)]);
    }

    #[test]
    fn test_csv_sink_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        let mut sink = CsvSink::with_path(&path);

        sink.post_terminal(&terminal_record()).unwrap();
        sink.post_terminal(&terminal_record()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("user,puzzle,time"));
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn test_csv_sink_ignores_word_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        let mut sink = CsvSink::with_path(&path);

        sink.post_word(&word_record()).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_memory_sink_captures_records() {
        let sink = MemorySink::new();
        let terminals = sink.terminal_handle();
        let words = sink.word_handle();

        let mut sink = sink;
        sink.post_terminal(&terminal_record()).unwrap();
        sink.post_word(&word_record()).unwrap();

        assert_eq!(terminals.borrow().len(), 1);
        assert_eq!(words.borrow().len(), 1);
        assert_eq!(words.borrow()[0].word, "cat");
    }
}
