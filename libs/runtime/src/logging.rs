use crate::config::{LoggingConfig, Section};
use crate::paths::resolve_under;
use anyhow::Context;
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 10;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// Level names accepted in config; unknown names fall back to `info`, and
/// `off`/`none`/empty silence the sink.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" | "" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Size-rotated log file shared by every writer the fmt layer asks for.
#[derive(Clone)]
struct LogFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl LogFile {
    fn open(path: &Path, max_bytes: usize, max_backups: usize) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log dir {}", dir.display()))?;
        }
        let rotate = FileRotate::new(
            path,
            AppendCount::new(max_backups),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

impl<'a> fmt::MakeWriter<'a> for LogFile {
    type Writer = LogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().flush()
    }
}

/// Per-subsystem filter for one sink. `level_of` selects the console or file level of a
/// section; the `default` section is the fallback for unlisted targets.
fn build_targets(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> &str) -> Targets {
    let fallback = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level(level_of(s)))
        .unwrap_or(LevelFilter::OFF);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(fallback), |targets, (name, s)| {
            targets.with_target(name.clone(), parse_level(level_of(s)))
        })
}

/// Only the `default` section names the log file; subsystem sections tune levels.
fn open_log_file(cfg: &LoggingConfig, base_dir: &Path) -> anyhow::Result<Option<LogFile>> {
    let Some(section) = cfg.get(DEFAULT_SECTION) else {
        return Ok(None);
    };
    if section.file.trim().is_empty() {
        return Ok(None);
    }

    let path = resolve_under(&section.file, base_dir);
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
    LogFile::open(&path, max_bytes as usize, max_backups)
        .with_context(|| format!("cannot open log file {}", path.display()))
        .map(Some)
}

/// Install the global subscriber: a console layer on stderr and, when configured, a
/// JSON layer appending to a rotated file under `base_dir` (usually `home_dir`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    // `log` records from dependencies go through tracing too
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_writer(io::stderr)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_max_level(LevelFilter::WARN)
            .try_init();
        return;
    }

    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_targets(cfg, |s| s.console_level.as_str()));

    let log_file = open_log_file(cfg, base_dir).unwrap_or_else(|e| {
        eprintln!("file logging disabled: {e:#}");
        None
    });
    let file = log_file.map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(build_targets(cfg, |s| s.file_level.as_str()))
    });

    let _ = Registry::default().with(console).with(file).try_init();
}
