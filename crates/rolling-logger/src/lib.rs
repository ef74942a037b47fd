//! Rolling Logger
//!
//! A `tracing` layer that keeps the most recent log lines in a circular
//! buffer and can mirror them to a size-rolled log file and a line sink
//! (the browser console, for instance).
//!
//! # Usage
//!
//! ```ignore
//! // desktop: file + buffer
//! rolling_logger::init_logger(log_dir, "AdminConsole")?;
//! // browser: buffer + console sink
//! rolling_logger::init_memory_logger(500, Some(sink))?;
//! let _ = rolling_logger::info("ready");
//! ```

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Receives every formatted line after it is buffered
pub type LineSink = Arc<dyn Fn(Level, &str) + Send + Sync>;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("a global logger is already installed")]
    AlreadyInitialized,
    #[error("logger has not been initialized")]
    NotInitialized,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Lines kept in memory
    pub capacity: usize,
    /// Size at which `<name>.log` is rotated
    pub max_file_bytes: u64,
    /// Rotated files kept besides the live one
    pub max_files: usize,
    pub level: Level,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            max_file_bytes: 5 * 1024 * 1024,
            max_files: 5,
            level: Level::INFO,
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

// ========================
// Rolling file
// ========================

/// Appends lines to `<dir>/<name>.log`, shifting full files to
/// `<name>.1.log` ... `<name>.<max_files>.log`
#[derive(Debug)]
pub struct RollingFile {
    dir: PathBuf,
    name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(
        dir: impl AsRef<Path>,
        name: &str,
        max_bytes: u64,
        max_files: usize,
    ) -> Result<Self, LoggerError> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(format!("{name}.log"));
        let io_error = |source| LoggerError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&dir).map_err(io_error)?;
        let file = open_append(&path).map_err(io_error)?;
        let written = file.metadata().map(|meta| meta.len()).unwrap_or(0);
        Ok(Self {
            dir,
            name: name.to_string(),
            max_bytes,
            max_files,
            file,
            written,
        })
    }

    /// Path of the live file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{index}.log", self.name))
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let len = line.len() as u64 + 1;
        if self.written > 0 && self.written + len > self.max_bytes {
            self.rotate()?;
        }
        writeln!(self.file, "{line}")?;
        self.written += len;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            self.file = File::create(self.path())?;
            self.written = 0;
            return Ok(());
        }
        let oldest = self.rotated_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        fs::rename(self.path(), self.rotated_path(1))?;
        self.file = open_append(&self.path())?;
        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

// ========================
// Buffer layer
// ========================

struct Shared {
    lines: Mutex<VecDeque<String>>,
    capacity: usize,
    file: Option<Mutex<RollingFile>>,
    sink: Option<LineSink>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shared {
    fn push(&self, level: Level, line: String) {
        if let Some(file) = &self.file {
            // a failing disk must not take logging down with it
            let _ = lock(file).write_line(&line);
        }
        if let Some(sink) = &self.sink {
            sink(level, &line);
        }
        if self.capacity == 0 {
            return;
        }
        let mut lines = lock(&self.lines);
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }
}

/// Read handle on a layer's circular buffer
#[derive(Clone)]
pub struct LogBuffer {
    shared: Arc<Shared>,
}

impl fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogBuffer")
            .field("capacity", &self.shared.capacity)
            .finish_non_exhaustive()
    }
}

impl LogBuffer {
    /// Buffered lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        lock(&self.shared.lines).iter().cloned().collect()
    }

    pub fn clear(&self) {
        lock(&self.shared.lines).clear();
    }
}

pub struct BufferLayer {
    shared: Arc<Shared>,
}

impl BufferLayer {
    pub fn new(capacity: usize) -> Self {
        Self::with_outputs(capacity, None, None)
    }

    /// Layer that also mirrors each line to `file` and `sink`
    pub fn with_outputs(capacity: usize, file: Option<RollingFile>, sink: Option<LineSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                lines: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
                file: file.map(Mutex::new),
                sink,
            }),
        }
    }

    pub fn buffer(&self) -> LogBuffer {
        LogBuffer {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: Subscriber> Layer<S> for BufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let line = format!(
            "{} {:>5} {}: {}{}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            meta.level().as_str(),
            meta.target(),
            visitor.message,
            visitor.fields
        );
        self.shared.push(*meta.level(), line);
    }
}

/// Collects the message and `k=v` pairs of one event
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

// ========================
// Global logger
// ========================

static GLOBAL: OnceLock<LogBuffer> = OnceLock::new();

fn install(layer: BufferLayer, level: Level) -> Result<(), LoggerError> {
    let buffer = layer.buffer();
    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(layer)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    GLOBAL
        .set(buffer)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// Buffer plus `<dir>/<name>.log`, with default limits
pub fn init_logger(dir: impl AsRef<Path>, name: &str) -> Result<(), LoggerError> {
    init_logger_with(dir, name, LoggerConfig::default())
}

pub fn init_logger_with(
    dir: impl AsRef<Path>,
    name: &str,
    config: LoggerConfig,
) -> Result<(), LoggerError> {
    let file = RollingFile::open(dir, name, config.max_file_bytes, config.max_files)?;
    install(
        BufferLayer::with_outputs(config.capacity, Some(file), None),
        config.level,
    )
}

/// Buffer only, optionally echoing lines to `sink`; for targets without a
/// filesystem
pub fn init_memory_logger(capacity: usize, sink: Option<LineSink>) -> Result<(), LoggerError> {
    let config = LoggerConfig::default().with_capacity(capacity);
    install(BufferLayer::with_outputs(capacity, None, sink), config.level)
}

/// Lines held by the global logger, oldest first
pub fn recent_lines() -> Vec<String> {
    GLOBAL.get().map(LogBuffer::lines).unwrap_or_default()
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    GLOBAL.get().ok_or(LoggerError::NotInitialized)?;
    tracing::info!(target: "app", "{message}");
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    GLOBAL.get().ok_or(LoggerError::NotInitialized)?;
    tracing::error!(target: "app", "{message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(layer: BufferLayer, f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_buffer_keeps_latest_lines() {
        let layer = BufferLayer::new(2);
        let buffer = layer.buffer();
        capture(layer, || {
            tracing::info!("one");
            tracing::warn!(item_id = "i1", "two");
            tracing::error!(count = 3, "three");
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" WARN "));
        assert!(lines[0].ends_with("two item_id=i1"));
        assert!(lines[1].ends_with("three count=3"));

        buffer.clear();
        assert!(buffer.lines().is_empty());
    }

    #[test]
    fn test_sink_sees_every_line() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: LineSink = Arc::new(move |level, line| {
            sink_seen.lock().unwrap().push((level, line.to_string()));
        });
        capture(BufferLayer::with_outputs(0, None, Some(sink)), || {
            tracing::info!("hello");
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, Level::INFO);
        assert!(seen[0].1.ends_with("hello"));
    }

    #[test]
    fn test_rolling_file_rotates() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "grid", 16, 2).unwrap();
        for line in ["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc", "dddddddddd"] {
            file.write_line(line).unwrap();
        }

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("grid.log"), "dddddddddd\n");
        assert_eq!(read("grid.1.log"), "cccccccccc\n");
        assert_eq!(read("grid.2.log"), "bbbbbbbbbb\n");
        assert!(!dir.path().join("grid.3.log").exists());
    }

    #[test]
    fn test_layer_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = RollingFile::open(dir.path(), "grid", 1024, 1).unwrap();
        let path = file.path();
        capture(BufferLayer::with_outputs(4, Some(file), None), || {
            tracing::info!(target: "grid_engine", "item added");
        });
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("INFO grid_engine: item added"));
    }

    #[test]
    fn test_helpers_need_init() {
        if GLOBAL.get().is_none() {
            assert!(matches!(info("x"), Err(LoggerError::NotInitialized)));
            assert!(recent_lines().is_empty());
        }
    }
}
