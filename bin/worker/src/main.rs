//! Worker binary: reads config from the environment, loads the card
//! corpus, and runs one worker session to completion (spec §2, §6.2).

use std::sync::{Arc, OnceLock};
use swgemp_brain::{Brain, EvaluatorBrain, StaticBrain};
use swgemp_cards::CardRegistry;
use swgemp_core::{CoreError, StopFlag, WorkerConfig};
use swgemp_gameroom::Worker;
use swgemp_transport::TransportClient;

static REGISTRY: OnceLock<CardRegistry> = OnceLock::new();

fn select_brain(name: &str) -> Box<dyn Brain> {
    match name {
        "Static" => Box::new(StaticBrain::new()),
        _ => Box::new(EvaluatorBrain::new(REGISTRY.get().expect("registry initialized before brain selection"))),
    }
}

fn main() -> anyhow::Result<()> {
    swgemp_core::init_logging()?;
    let config = WorkerConfig::from_env()?;
    log::info!("[worker] starting with brain {}", config.brain_name);

    let registry = CardRegistry::load(&config.card_json_dir)?;
    let registry: &'static CardRegistry = REGISTRY.get_or_init(|| registry);

    let transport = TransportClient::new(&config)?;
    let brain = select_brain(&config.brain_name);
    let stop = Arc::new(StopFlag::new());

    hard_exit_on_ctrl_c();
    graceful_stop_on_stdin_q(stop.clone());

    let (mut worker, snapshots) = Worker::new(config, transport, registry, brain, stop);
    std::thread::spawn(move || {
        while let Ok(snapshot) = snapshots.recv() {
            log::debug!("[worker] snapshot: {snapshot:?}");
        }
    });

    match worker.run() {
        Ok(()) => {
            log::info!("[worker] stopped cleanly");
            Ok(())
        }
        Err(e @ CoreError::Fatal(_)) => {
            log::error!("[worker] exiting on fatal error: {e}");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Ctrl-C exits immediately without waiting for the cooperative stop path
/// (mirrors the teacher's `rbp_core::kys`). Runs on its own tiny runtime
/// since the worker loop itself never touches tokio.
fn hard_exit_on_ctrl_c() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build signal-watch runtime");
    std::thread::spawn(move || {
        runtime.block_on(async {
            let _ = tokio::signal::ctrl_c().await;
        });
        println!();
        log::warn!("[worker] interrupt received, exiting immediately");
        std::process::exit(0);
    });
}

/// Typing `Q` + Enter on stdin requests a graceful stop instead (mirrors
/// the teacher's `rbp_core::brb`), letting the current poll interval finish
/// before the worker transitions to `Stopped`.
fn graceful_stop_on_stdin_q(stop: Arc<StopFlag>) {
    std::thread::spawn(move || loop {
        let mut buffer = String::new();
        if std::io::stdin().read_line(&mut buffer).is_err() {
            break;
        }
        if buffer.trim().eq_ignore_ascii_case("q") {
            log::warn!("[worker] graceful stop requested, finishing the current poll interval...");
            stop.request_stop();
            break;
        }
    });
}
