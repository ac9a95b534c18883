mod config;
mod console;
mod main_lib;

use config::Config;
use main_lib::{build_pipeline, init_tracing, spawn_event_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    let pipeline = build_pipeline(&config);

    let event_logger = spawn_event_logger(&pipeline);
    pipeline.scheduler.start(config.refresh.refresh_interval);

    tokio::select! {
        _ = console::run(&pipeline) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupt received");
        }
    }

    // Let an in-flight cycle finish publishing before exiting.
    pipeline.scheduler.stop();
    pipeline.scheduler.join().await;
    tracing::info!(
        "Shut down after {} symbols refreshed (state {:?})",
        pipeline.latest.len(),
        pipeline.orchestrator.state()
    );

    event_logger.abort();
    Ok(())
}
