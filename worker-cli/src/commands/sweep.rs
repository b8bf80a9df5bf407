use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info};
use warranty::pipeline::Pipeline;
use warranty::worker::{ReconciliationWorker, SweepScheduler};

use crate::state::AppState;

fn build_worker(state: &AppState) -> anyhow::Result<ReconciliationWorker> {
    let store = state.open_store()?;
    let pipeline = state.pipeline(store)?;
    Ok(ReconciliationWorker::new(
        pipeline,
        Arc::new(state.uploads.clone()),
    ))
}

/// One sweep. Only missing OCR configuration is an error; an unreachable
/// store is logged and the process still exits cleanly.
pub fn run_once(state: &AppState) -> anyhow::Result<()> {
    let ocr = state.ocr_client()?;
    let store = match state.open_store() {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Claim store unreachable, sweep skipped");
            return Ok(());
        }
    };
    let worker = ReconciliationWorker::new(
        Pipeline::new(&state.pipeline_config, ocr, store),
        Arc::new(state.uploads.clone()),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(worker.run());

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Sweeps on a fixed interval until Ctrl-C.
pub fn schedule(state: &AppState, interval_secs: Option<u64>) -> anyhow::Result<()> {
    let interval = Duration::from_secs(
        interval_secs
            .unwrap_or(state.config.worker.interval_secs)
            .max(1),
    );
    let worker = Arc::new(build_worker(state)?);
    let scheduler = SweepScheduler::new(worker, interval);

    let (trigger_tx, trigger_rx) = broadcast::channel(4);
    let handle = scheduler.start(trigger_rx);
    info!(interval_secs = interval.as_secs(), "Sweep scheduler started");

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;
    let _ = stop_rx.recv();

    info!("Shutdown requested, waiting for the current sweep to finish");
    scheduler.stop();
    let _ = trigger_tx.send(());
    if handle.join().is_err() {
        error!("Sweep scheduler thread panicked");
    }

    info!(runs = scheduler.completed_runs(), "Sweep scheduler stopped");
    Ok(())
}
