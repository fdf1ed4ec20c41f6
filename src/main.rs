#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod config;
pub mod crawler;
pub mod event;
pub mod logging;
pub mod scheduler;
pub mod series;
pub mod util;

use std::process::ExitCode;

use anyhow::{anyhow, Result};
use tokio_cron_scheduler::JobScheduler;

use crate::{crawler::blackrock::BlackRock, series::store::SeriesStore};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            logging::error_console(format!("{:?}", why));
            logging::error_file_async(format!("{:?}", why));
            // 讓寫檔線程有機會寫完
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install the rustls crypto provider"))?;

    let app = config::App::load()?;

    if !app.schedule.is_enabled() {
        let source = BlackRock::new(app.source.clone());
        let store = SeriesStore::new(&app.store);
        let outcome = event::fund_value::execute(&source, &store).await?;
        logging::info_console(format!("{}: {}", store.path().display(), outcome));
        return Ok(());
    }

    let mut sched = JobScheduler::new()
        .await
        .map_err(|why| anyhow!("Failed to create the scheduler because {:?}", why))?;
    scheduler::start(&sched, &app).await?;
    logging::info_console(format!(
        "FundValueTracker 已啟動 ({}) OS/Arch: {}/{}",
        app.schedule.cron,
        std::env::consts::OS,
        std::env::consts::ARCH
    ));

    tokio::signal::ctrl_c().await?;
    sched
        .shutdown()
        .await
        .map_err(|why| anyhow!("Failed to shut down the scheduler because {:?}", why))
}
