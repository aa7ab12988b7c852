use std::sync::Arc;

use clap::Parser;
use tokio::time::{Duration, sleep};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use taskdeck_core::app::{AutoCompleterBuilder, TaskService};
use taskdeck_core::config::Config;
use taskdeck_core::domain::{Actor, NewTask, TaskStatus};
use taskdeck_core::impls::InMemoryTaskStore;
use taskdeck_core::ports::{IdGenerator, SystemClock, UlidGenerator};

/// Runs the auto-completer against an in-memory store.
///
/// Values not given as flags come from the environment (see `Config::from_env`).
#[derive(Parser, Debug)]
#[command(name = "taskdeck", about = "Deferred auto-completion demo")]
struct Args {
    /// Auto-complete delay in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Number of completion workers
    #[arg(long)]
    workers: Option<usize>,

    /// Completion queue capacity
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// How long task creation waits on a full queue, in milliseconds
    #[arg(long)]
    enqueue_timeout_ms: Option<u64>,

    /// Shutdown drain deadline in seconds
    #[arg(long)]
    shutdown_timeout_secs: Option<u64>,

    /// Number of tasks to create
    #[arg(long, default_value = "5")]
    tasks: usize,
}

impl Args {
    fn into_config(self, mut config: Config) -> Config {
        if let Some(ms) = self.delay_ms {
            config.auto_complete_delay = Duration::from_millis(ms);
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
        if let Some(ms) = self.enqueue_timeout_ms {
            config.enqueue_timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = self.shutdown_timeout_secs {
            config.shutdown_timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let tasks = args.tasks;
    let config = args.into_config(Config::from_env());
    info!(?config, "taskdeck starting");

    // (A) Store と auto-completer を用意
    let store = Arc::new(InMemoryTaskStore::new());
    let completer = AutoCompleterBuilder::new(store.clone())
        .config(config.clone())
        .build()?;
    let service = TaskService::new(store, Arc::new(completer.producer()));

    // (B) タスク投入
    let ids = UlidGenerator::new(SystemClock);
    let me = Actor::user(ids.generate_user_id());
    let mut created = Vec::with_capacity(tasks);
    for n in 0..tasks {
        let task = service
            .create(&me, NewTask::new(format!("task #{n}"), "created by the demo"))
            .await?;
        created.push(task.id);
    }

    // (C) 1件は作業中に、1件は削除（auto-complete はどちらも安全に扱う）
    if let Some(&id) = created.first() {
        service.update_status(&me, id, TaskStatus::InProgress).await?;
    }
    if let [_, .., last] = created.as_slice() {
        service.delete(&me, *last).await?;
    }

    // (D) delay を待つ（Ctrl-C で早期終了）
    let wait = config.auto_complete_delay + Duration::from_millis(100);
    tokio::select! {
        _ = sleep(wait) => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            warn!("interrupted, shutting down before the delay elapsed");
        }
    }

    // (E) 結果を表示
    let admin = Actor::admin(ids.generate_user_id());
    for task in service.list(&admin).await? {
        println!("{}", serde_json::to_string(&task)?);
    }
    println!("counts: {}", serde_json::to_string(&completer.counts())?);

    // (F) bounded shutdown
    let report = completer.shutdown().await;
    if report.is_clean() {
        info!(
            stopped = report.stopped.len(),
            discarded = report.discarded.len(),
            "all workers stopped"
        );
    } else {
        warn!(
            unconfirmed = report.unconfirmed.len(),
            panicked = report.panicked.len(),
            "shutdown finished with workers unaccounted for"
        );
    }

    Ok(())
}
