use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use crate::error::SettingsError;

#[derive(Debug)]
struct SimpleLogger {
    log_path: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<SimpleLogger> = OnceCell::new();

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} [{}] - {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            );
            let log_file = self.log_path.join("log.txt");

            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_file) {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

// ~/aiwolf/data
pub fn default_log_dir() -> Result<PathBuf, SettingsError> {
    let home = dir::home_dir()
        .ok_or_else(|| SettingsError::Logger("no home directory".to_string()))?;
    Ok(home.join("aiwolf").join("data"))
}

pub fn init(log_dir: Option<PathBuf>, level: LevelFilter) -> Result<(), SettingsError> {
    let log_path = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };
    create_dir_all(&log_path)?;

    LOGGER
        .set(SimpleLogger { log_path, level })
        .map_err(|_| SettingsError::Logger("logger already set".to_string()))?;
    let logger = LOGGER
        .get()
        .ok_or_else(|| SettingsError::Logger("logger missing".to_string()))?;

    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
