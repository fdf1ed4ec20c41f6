use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{config, logging, series::Series};

/// Keeps the whole series in a single JSON file.
pub struct SeriesStore {
    path: PathBuf,
}

impl SeriesStore {
    pub fn new(store: &config::Store) -> Self {
        SeriesStore {
            path: PathBuf::from(&store.path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted series.
    ///
    /// A missing, empty or unparsable file is not an error: the series simply starts over
    /// empty.
    pub fn load(&self) -> Series {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(why) if why.kind() == io::ErrorKind::NotFound => {
                logging::info_file_async(format!(
                    "{} does not exist yet, starting with an empty series",
                    self.path.display()
                ));
                return Series::new();
            }
            Err(why) => {
                logging::warn_file_async(format!(
                    "Failed to read {} because {:?}, starting with an empty series",
                    self.path.display(),
                    why
                ));
                return Series::new();
            }
        };

        if text.trim().is_empty() {
            return Series::new();
        }

        match serde_json::from_str::<Series>(&text) {
            Ok(series) => series,
            Err(why) => {
                logging::warn_file_async(format!(
                    "Failed to parse {} because {:?}, starting with an empty series",
                    self.path.display(),
                    why
                ));
                Series::new()
            }
        }
    }

    /// Writes the whole series back.
    ///
    /// The content goes to a sibling temporary file first and is then renamed over the
    /// target, so the previous state survives a failed write.
    pub fn save(&self, series: &Series) -> Result<()> {
        let json = to_json(series)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|why| {
                    anyhow!("Failed to create {} because {:?}", parent.display(), why)
                })?;
            }
        }

        let tmp_path = self.tmp_path();
        write_file(&tmp_path, json.as_bytes()).map_err(|why| {
            let _ = fs::remove_file(&tmp_path);
            anyhow!("Failed to write {} because {:?}", tmp_path.display(), why)
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|why| {
            let _ = fs::remove_file(&tmp_path);
            anyhow!(
                "Failed to rename {} to {} because {:?}",
                tmp_path.display(),
                self.path.display(),
                why
            )
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "series.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// 以四個空白縮排輸出
fn to_json(series: &Series) -> Result<String> {
    let mut buf = Vec::with_capacity(series.len() * 192);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    series
        .serialize(&mut ser)
        .map_err(|why| anyhow!("Failed to serialize the series because {:?}", why))?;

    String::from_utf8(buf).map_err(|why| anyhow!("Serialized series is not UTF-8: {:?}", why))
}

fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}
