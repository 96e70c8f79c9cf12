//! Unified logging for the portal backend
//!
//! One initialization call configures level and destination for every crate
//! in the workspace. Lines are formatted as ISO timestamp + key=value tags +
//! message, written either to stderr or to a log file under
//! `.crowdhub/logs` with rotation. Also provides error cause-chain
//! formatting and a lightweight timing helper.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Minimum log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// Parse a log level from a string, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Logging configuration options
pub struct LogOptions {
    /// Print to stderr instead of a file
    pub print: bool,
    /// Development mode (stable dev.log filename instead of timestamped)
    pub dev: bool,
    /// Minimum log level (defaults to Info)
    pub level: Option<LogLevel>,
}

/// Structured field tags attached to log lines
pub type Tags = HashMap<String, serde_json::Value>;

struct LoggerState {
    min_level: LogLevel,
    file_writer: Mutex<Option<File>>,
    log_path: Option<PathBuf>,
    last_log_time: Mutex<Instant>,
}

/// Logger handle carrying a set of tags
pub struct Logger {
    tags: Mutex<Tags>,
    state: Arc<LoggerState>,
}

impl Logger {
    pub fn debug(&self, message: &str, extra: Option<Tags>) {
        self.write(LogLevel::Debug, message, extra);
    }

    pub fn info(&self, message: &str, extra: Option<Tags>) {
        self.write(LogLevel::Info, message, extra);
    }

    pub fn warn(&self, message: &str, extra: Option<Tags>) {
        self.write(LogLevel::Warn, message, extra);
    }

    pub fn error(&self, message: &str, extra: Option<Tags>) {
        self.write(LogLevel::Error, message, extra);
    }

    /// Add a tag carried by every subsequent line from this logger
    pub fn tag(&self, key: String, value: serde_json::Value) {
        let mut tags = self.tags.lock().unwrap();
        tags.insert(key, value);
    }

    /// Clone this logger with its current tags
    pub fn clone_logger(&self) -> Self {
        let tags = self.tags.lock().unwrap().clone();
        Logger {
            tags: Mutex::new(tags),
            state: Arc::clone(&self.state),
        }
    }

    /// Start a timer; logs "started" now and "completed" with the duration
    /// when the returned handle is dropped.
    pub fn time(&self, message: String, extra: Option<Tags>) -> Timer {
        let extra = extra.unwrap_or_default();
        let mut start_fields = extra.clone();
        start_fields.insert("status".to_string(), serde_json::Value::from("started"));
        self.info(&message, Some(start_fields));

        Timer {
            message,
            start: Instant::now(),
            extra,
            logger: self.clone_logger(),
        }
    }

    fn write(&self, level: LogLevel, message: &str, extra: Option<Tags>) {
        if level < self.state.min_level {
            return;
        }

        let line = self.build_line(message, extra);
        let formatted = format!("{} {}\n", level.as_str(), line);

        let mut writer = self.state.file_writer.lock().unwrap();
        match writer.as_mut() {
            Some(file) => {
                let _ = file.write_all(formatted.as_bytes());
                let _ = file.flush();
            }
            None => eprint!("{}", formatted),
        }
    }

    fn build_line(&self, message: &str, extra: Option<Tags>) -> String {
        let mut all_fields = self.tags.lock().unwrap().clone();
        if let Some(extra_fields) = extra {
            all_fields.extend(extra_fields);
        }

        let fields: Vec<String> = all_fields
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Null => return None,
                    other => serde_json::to_string(other).unwrap_or_default(),
                };
                Some(format!("{}={}", key, rendered))
            })
            .collect();

        // Milliseconds since the previous line, for eyeballing latency
        let mut last_time = self.state.last_log_time.lock().unwrap();
        let now = Instant::now();
        let diff = now.duration_since(*last_time);
        *last_time = now;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let parts: Vec<String> = vec![
            timestamp,
            format!("+{}ms", diff.as_millis()),
            fields.join(" "),
            message.to_string(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

        parts.join(" ")
    }
}

/// Performance timing helper returned by [`Logger::time`]
pub struct Timer {
    message: String,
    start: Instant,
    extra: Tags,
    logger: Logger,
}

impl Timer {
    /// Stop the timer and log the duration now
    pub fn stop(self) {}
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let mut fields = self.extra.clone();
        fields.insert("status".to_string(), serde_json::Value::from("completed"));
        fields.insert(
            "duration".to_string(),
            serde_json::Value::from(duration.as_millis() as u64),
        );
        self.logger.info(&self.message, Some(fields));
    }
}

static GLOBAL_STATE: Mutex<Option<Arc<LoggerState>>> = Mutex::new(None);
static LOGGER_CACHE: Mutex<Option<HashMap<String, Logger>>> = Mutex::new(None);

/// Number of rotated log files kept on disk
const KEEP_LOGS: usize = 10;

/// Initialize the logging system.
///
/// With `print` set, lines go to stderr. Otherwise a log file is created
/// under `.crowdhub/logs` in the current directory (a stable `dev.log` in
/// dev mode, a timestamped file otherwise) and old files beyond the newest
/// ten are removed.
pub fn init(options: LogOptions) -> std::io::Result<()> {
    let min_level = options.level.unwrap_or(LogLevel::Info);

    let log_path = if options.print {
        None
    } else {
        let log_dir = std::env::current_dir()?.join(".crowdhub").join("logs");
        fs::create_dir_all(&log_dir)?;

        let filename = if options.dev {
            "dev.log".to_string()
        } else {
            let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S").to_string();
            format!("{}.log", timestamp)
        };

        let path = log_dir.join(filename);
        let _ = File::create(&path)?;
        cleanup(&log_dir)?;

        Some(path)
    };

    let file_writer = match log_path {
        Some(ref path) => Some(File::options().create(true).append(true).open(path)?),
        None => None,
    };

    let state = Arc::new(LoggerState {
        min_level,
        file_writer: Mutex::new(file_writer),
        log_path,
        last_log_time: Mutex::new(Instant::now()),
    });

    *GLOBAL_STATE.lock().unwrap() = Some(state);
    *LOGGER_CACHE.lock().unwrap() = Some(HashMap::new());

    Ok(())
}

/// Path of the current log file, if logging to a file
pub fn file() -> Option<PathBuf> {
    GLOBAL_STATE
        .lock()
        .unwrap()
        .as_ref()
        .and_then(|state| state.log_path.clone())
}

fn cleanup(log_dir: &Path) -> std::io::Result<()> {
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if path.extension()? == "log" {
                let modified = fs::metadata(&path).ok()?.modified().ok()?;
                Some((path, modified))
            } else {
                None
            }
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(KEEP_LOGS) {
        let _ = fs::remove_file(path);
    }

    Ok(())
}

/// Create a logger with optional tags.
///
/// Loggers carrying a `service` tag are cached and shared by service name.
pub fn create(tags: Option<Tags>) -> Logger {
    let tags = tags.unwrap_or_default();

    if let Some(serde_json::Value::String(service)) = tags.get("service") {
        let cache = LOGGER_CACHE.lock().unwrap();
        if let Some(cached) = cache.as_ref().and_then(|map| map.get(service)) {
            return cached.clone_logger();
        }
    }

    let state = GLOBAL_STATE
        .lock()
        .unwrap()
        .as_ref()
        .expect("Logging not initialized")
        .clone();

    let logger = Logger {
        tags: Mutex::new(tags.clone()),
        state,
    };

    if let Some(serde_json::Value::String(service)) = tags.get("service") {
        let mut cache = LOGGER_CACHE.lock().unwrap();
        if let Some(map) = cache.as_mut() {
            map.insert(service.clone(), logger.clone_logger());
        }
    }

    logger
}

/// Format an error with its cause chain
pub fn format_error(error: &dyn std::error::Error) -> String {
    format_error_recursive(error, 0)
}

fn format_error_recursive(error: &dyn std::error::Error, depth: usize) -> String {
    const MAX_DEPTH: usize = 10;

    if depth >= MAX_DEPTH {
        return error.to_string();
    }

    let base = error.to_string();
    match error.source() {
        Some(source) => format!(
            "{} Caused by: {}",
            base,
            format_error_recursive(source, depth + 1)
        ),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("Warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_logger_creation_and_tags() {
        init(LogOptions {
            print: true,
            dev: true,
            level: Some(LogLevel::Debug),
        })
        .unwrap();

        let logger = create(None);
        logger.info("plain message", None);

        let mut tags = Tags::new();
        tags.insert("service".to_string(), serde_json::Value::from("requests"));
        let tagged = create(Some(tags));
        tagged.debug("tagged message", None);
    }

    #[test]
    fn test_error_formatting_includes_message() {
        use std::io;

        let inner = io::Error::new(io::ErrorKind::NotFound, "row not found");
        let outer = io::Error::new(io::ErrorKind::Other, format!("query failed: {}", inner));

        let formatted = format_error(&outer);
        assert!(formatted.contains("query failed"));
    }
}
