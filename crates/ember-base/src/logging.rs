use chrono::Utc;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Environment variable that overrides the build-mode default level.
pub const LOG_LEVEL_ENV: &str = "EMBER_LOG";

/// A logger that writes to stdout.
pub struct StdoutLogger {
    max_level: LevelFilter,
}

/// A logger that writes to date-named files, rolling over at UTC midnight.
pub struct FileLogger {
    max_level: LevelFilter,
    state: Mutex<FileLoggerState>,
}

struct FileLoggerState {
    dir: PathBuf,
    current_date: String,
    file: File,
}

impl StdoutLogger {
    pub fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }
}

impl FileLogger {
    /// Create a new FileLogger that writes `ember-YYYY-MM-DD.log` files into `dir`.
    pub fn new(dir: impl Into<PathBuf>, max_level: LevelFilter) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let current_date = format_today();
        let file = open_day_file(&dir, &current_date)?;

        Ok(FileLogger {
            max_level,
            state: Mutex::new(FileLoggerState {
                dir,
                current_date,
                file,
            }),
        })
    }
}

fn open_day_file(dir: &std::path::Path, date: &str) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(format!("ember-{}.log", date)))
}

/// Render one record as a single line, shared by both loggers.
fn format_record(record: &Record) -> String {
    format!(
        "{} {:<5} [{}] {}:{} - {}",
        format_timestamp(),
        record.level(),
        record.target(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!("{}", format_record(record));
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let today = format_today();
        if today != state.current_date {
            let dir = state.dir.clone();
            match open_day_file(&dir, &today) {
                Ok(new_file) => {
                    state.file = new_file;
                    state.current_date = today;
                }
                Err(e) => {
                    // keep writing to the previous day's file
                    eprintln!("Failed to open new log file in {:?}: {}", dir, e);
                }
            }
        }

        let line = format!("{}\n", format_record(record));
        if let Err(e) = state.file.write_all(line.as_bytes()) {
            eprintln!("Failed to write to log file: {}", e);
            eprintln!("{}", line.trim_end());
        }
    }

    fn flush(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.file.flush().ok();
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS`.
pub fn format_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Current UTC date as `YYYY-MM-DD`, the day-file suffix.
pub fn format_today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Pick the max level: `EMBER_LOG` if it parses, otherwise Debug in debug
/// builds and Info in release builds.
pub fn max_level_from_env() -> LevelFilter {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
}

/// Install a StdoutLogger as the global logger.
///
/// Only the first call per process takes effect; later calls are ignored.
pub fn init_stdout_logger() {
    let max_level = max_level_from_env();
    if log::set_boxed_logger(Box::new(StdoutLogger::new(max_level))).is_ok() {
        log::set_max_level(max_level);
    }
}

/// Install a FileLogger writing into `dir` as the global logger.
///
/// Returns an error if the directory cannot be created or the day file
/// cannot be opened. Only the first successful install takes effect.
pub fn init_file_logger(dir: impl Into<PathBuf>) -> std::io::Result<()> {
    let max_level = max_level_from_env();
    let logger = FileLogger::new(dir, max_level)?;
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_structure() {
        let ts = format_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[16..17], ":");
    }

    #[test]
    fn test_file_logger_day_rollover() {
        let dir = tempfile::tempdir().expect("tempdir");
        let logger = FileLogger::new(dir.path(), LevelFilter::Debug).expect("create logger");

        let stale_path = dir.path().join("ember-1999-01-01.log");
        {
            let mut state = logger.state.lock().unwrap();
            state.current_date = "1999-01-01".to_string();
            state.file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&stale_path)
                .unwrap();
        }

        let record = log::RecordBuilder::new()
            .level(log::Level::Info)
            .target("ember::test")
            .file(Some("test.rs"))
            .line(Some(1))
            .args(format_args!("after rollover"))
            .build();
        logger.log(&record);
        logger.flush();

        let today_path = dir.path().join(format!("ember-{}.log", format_today()));
        let content = fs::read_to_string(&today_path).expect("today's file");
        assert!(content.contains("after rollover"));
        assert!(fs::read_to_string(&stale_path).unwrap().is_empty());
        assert_eq!(logger.state.lock().unwrap().current_date, format_today());
    }
}
