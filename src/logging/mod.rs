use std::{fmt::Write as _, thread};

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;

use crate::logging::rotate::Rotate;

pub mod rotate;

const LOG_DIR: &str = "log";

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 每個等級各自寫入一個檔案
#[derive(Debug, Copy, Clone, strum::AsRefStr, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

pub struct Logger {
    writers: Vec<Sender<String>>,
}

impl Logger {
    fn new(log_name: &str) -> Self {
        use strum::IntoEnumIterator;

        Logger {
            writers: Level::iter()
                .map(|level| Self::create_writer(log_name, level))
                .collect(),
        }
    }

    fn log(&self, level: Level, msg: String) {
        match self.writers.get(level as usize) {
            Some(writer) => {
                if let Err(why) = writer.send(msg) {
                    error_console(why.to_string());
                }
            }
            None => error_console(msg),
        }
    }

    /// Spawns the thread that owns the `Rotate` of one level and returns its inbox.
    fn create_writer(log_name: &str, level: Level) -> Sender<String> {
        let (tx, rx) = unbounded::<String>();
        let fn_pattern = format!("{}/%Y-%m-%d_{}_{}.log", LOG_DIR, log_name, level.as_ref());

        thread::spawn(move || {
            let mut rotate = Rotate::new(fn_pattern);
            let mut batch = String::with_capacity(2048);

            for received in &rx {
                let now = Local::now();
                if writeln!(&mut batch, "{} {}", now.format("%F %X%.6f"), received).is_err() {
                    continue;
                }

                // 佇列清空或累積夠多才落盤
                if !rx.is_empty() && batch.len() < 2048 {
                    continue;
                }

                if let Err(why) = rotate.write_msg(now, batch.as_bytes()) {
                    error_console(format!("Failed to write {:?} log because {:?}", level, why));
                    print!("{}", batch);
                }

                batch.clear();
            }
        });

        tx
    }
}

pub fn info_file_async(log: String) {
    LOGGER.log(Level::Info, log);
}

pub fn warn_file_async(log: String) {
    LOGGER.log(Level::Warn, log);
}

pub fn error_file_async(log: String) {
    LOGGER.log(Level::Error, log);
}

pub fn debug_file_async(log: String) {
    LOGGER.log(Level::Debug, log);
}

pub fn info_console(log: String) {
    console("Info", log);
}

pub fn error_console(log: String) {
    console("Error", log);
}

fn console(level: &str, log: String) {
    println!(
        "{} {} {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        level,
        log
    );
}
