use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeDelta};
use rayon::prelude::*;

use crate::logging;

/// 預設保留天數：7 天
const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// A log file writer that moves to a new file whenever the date in `fn_pattern` changes.
pub struct Rotate {
    /// 檔名模式，例如 "log/%Y-%m-%d_info.log"
    fn_pattern: String,
    /// 當前檔名
    cur_fn: String,
    out_fh: Option<BufWriter<File>>,
    /// 日誌保留時間
    max_age: TimeDelta,
}

impl Rotate {
    pub fn new(fn_pattern: String) -> Self {
        Self::with_max_age(fn_pattern, DEFAULT_MAX_AGE_DAYS)
    }

    /// # Arguments
    /// * `fn_pattern` - 檔名模式，例如 "log/%Y-%m-%d_info.log"
    /// * `max_age_days` - 日誌保留天數
    pub fn with_max_age(fn_pattern: String, max_age_days: i64) -> Self {
        Rotate {
            fn_pattern,
            cur_fn: String::new(),
            out_fh: None,
            max_age: TimeDelta::try_days(max_age_days).unwrap_or(TimeDelta::days(7)),
        }
    }

    /// Appends `msg` to the file for `now`, opening a new one when the day changed.
    pub fn write_msg(&mut self, now: DateTime<Local>, msg: &[u8]) -> Result<()> {
        let filename = now.format(&self.fn_pattern).to_string();

        // 日期變更
        if filename != self.cur_fn || self.out_fh.is_none() {
            self.open_new_file(filename)?;
            self.cleanup_old_files(now);
        }

        let writer = self
            .out_fh
            .as_mut()
            .ok_or_else(|| anyhow!("Failed to get writer for {}", self.cur_fn))?;
        writer.write_all(msg)?;
        writer.flush()?;

        Ok(())
    }

    fn open_new_file(&mut self, filename: String) -> Result<()> {
        self.flush_current();

        if let Some(parent) = Path::new(&filename).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        self.out_fh = Some(BufWriter::with_capacity(4096, file));
        self.cur_fn = filename;

        Ok(())
    }

    fn flush_current(&mut self) {
        if let Some(ref mut writer) = self.out_fh {
            let _ = writer.flush();
        }
    }

    /// 清理超過 max_age 的 .log 檔案，目前寫入中的檔案除外
    fn cleanup_old_files(&self, now: DateTime<Local>) {
        let files = match Self::files_in_directory(&self.cur_fn) {
            Ok(files) => files,
            Err(why) => {
                logging::error_console(format!(
                    "Failed to list the log directory because {:?}",
                    why
                ));
                return;
            }
        };

        let current = PathBuf::from(&self.cur_fn);
        let cut_off = (now - self.max_age).timestamp().max(0) as u64;
        let to_unlink: Vec<PathBuf> = files
            .into_iter()
            .filter(|file| *file != current)
            .filter(|file| file.extension().is_some_and(|ext| ext == "log"))
            .filter(|file| {
                fs::metadata(file)
                    .and_then(|metadata| metadata.modified())
                    .ok()
                    .and_then(|system_time| system_time.duration_since(UNIX_EPOCH).ok())
                    .is_some_and(|duration| duration.as_secs() <= cut_off)
            })
            .collect();

        if to_unlink.is_empty() {
            return;
        }

        to_unlink
            .par_iter()
            .with_min_len(num_cpus::get())
            .for_each(|unlink| {
                if let Err(why) = fs::remove_file(unlink) {
                    logging::error_console(format!(
                        "couldn't remove the file({}). because {:?}",
                        unlink.display(),
                        why
                    ));
                }
            });
    }

    fn files_in_directory<P: AsRef<Path>>(file_path: P) -> Result<Vec<PathBuf>, io::Error> {
        let path = file_path.as_ref();
        let parent_dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            Some(_) => Path::new("."),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "Parent directory not found",
                ))
            }
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(parent_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }

        Ok(files)
    }
}

impl Drop for Rotate {
    fn drop(&mut self) {
        self.flush_current();
    }
}
