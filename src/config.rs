use std::{env, path::PathBuf};

use anyhow::{anyhow, Result};
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub store: Store,
    #[serde(default)]
    pub schedule: Schedule,
}

const FUND_SOURCE_URL: &str = "FUND_SOURCE_URL";
const FUND_SOURCE_SELECTOR: &str = "FUND_SOURCE_SELECTOR";
const FUND_USER_AGENT: &str = "FUND_USER_AGENT";

/// 淨值來源網頁
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Source {
    #[serde(default = "Source::default_url")]
    pub url: String,
    /// CSS selector of the element holding the value, e.g. `USD 118.5825`
    #[serde(default = "Source::default_selector")]
    pub selector: String,
    #[serde(default = "Source::default_user_agent")]
    pub user_agent: String,
}

impl Source {
    fn default_url() -> String {
        "https://www.blackrock.com/cash/en-es/products/250972/blackrock-ics-us-treasury-premier-acc-fund/".to_string()
    }

    fn default_selector() -> String {
        ".header-nav-data".to_string()
    }

    fn default_user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
    }
}

impl Default for Source {
    fn default() -> Self {
        Source {
            url: Source::default_url(),
            selector: Source::default_selector(),
            user_agent: Source::default_user_agent(),
        }
    }
}

const FUND_STORE_PATH: &str = "FUND_STORE_PATH";

/// 淨值序列的存放位置
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Store {
    #[serde(default = "Store::default_path")]
    pub path: String,
}

impl Store {
    fn default_path() -> String {
        "BlackRock ICS US Treasury Fund Premier Acc (USD).json".to_string()
    }
}

impl Default for Store {
    fn default() -> Self {
        Store {
            path: Store::default_path(),
        }
    }
}

const FUND_SCHEDULE_CRON: &str = "FUND_SCHEDULE_CRON";

/// Six-field cron expression evaluated in UTC. Empty means run once and exit.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Schedule {
    #[serde(default)]
    pub cron: String,
}

impl Schedule {
    pub fn is_enabled(&self) -> bool {
        !self.cron.trim().is_empty()
    }
}

impl App {
    /// Reads `app.json` when present, then lets the environment override it.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    fn load_from(path: PathBuf) -> Result<Self> {
        if path.exists() {
            let app: App = config_config::builder()
                .add_source(config_file::from(path.clone()))
                .build()
                .and_then(|c| c.try_deserialize::<App>())
                .map_err(|why| {
                    anyhow!("Failed to read the config {} because {:?}", path.display(), why)
                })?;
            return Ok(app.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(url) = env::var(FUND_SOURCE_URL) {
            self.source.url = url;
        }

        if let Ok(selector) = env::var(FUND_SOURCE_SELECTOR) {
            self.source.selector = selector;
        }

        if let Ok(user_agent) = env::var(FUND_USER_AGENT) {
            self.source.user_agent = user_agent;
        }

        if let Ok(path) = env::var(FUND_STORE_PATH) {
            self.store.path = path;
        }

        if let Ok(cron) = env::var(FUND_SCHEDULE_CRON) {
            self.schedule.cron = cron;
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
