use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use taskwire_channel::{ChannelRegistry, PushChannel};
use taskwire_core::SystemClock;
use taskwire_email::EmailChannel;
use taskwire_ledger::IdempotencyLedger;
use taskwire_lifecycle::TaskLifecycle;
use taskwire_notifier::NotificationDispatcher;
use taskwire_publisher::EventPublisher;
use taskwire_recurrence_engine::RecurrenceEngine;
use taskwire_scheduler::ReminderScheduler;
use taskwire_server::api::{self, AppState};
use taskwire_server::bus::{InProcessBroker, NotifierConsumer, RecurrenceEngineConsumer};
use taskwire_server::config::TaskwireConfig;
use taskwire_store::{
    InMemoryDeliveryStore, InMemoryRecurrenceStore, InMemoryReminderStore, InMemoryTaskStore,
};

/// Task backbone server: reminder scheduler, recurrence engine, and
/// notification dispatcher behind a minimal HTTP cron-trigger edge.
#[derive(Parser, Debug)]
#[command(name = "taskwire-server", about = "Task backbone server")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "taskwire.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config: TaskwireConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        info!(path = %cli.config, "config file not found, using defaults");
        toml::from_str("")?
    };

    let clock = Arc::new(SystemClock);

    let tasks = Arc::new(InMemoryTaskStore::new());
    let reminders = Arc::new(InMemoryReminderStore::new());
    let recurrences = Arc::new(InMemoryRecurrenceStore::new());
    let deliveries = Arc::new(InMemoryDeliveryStore::new());

    let mut registry = ChannelRegistry::new();
    if config.email.enabled {
        match EmailChannel::new(&config.email.smtp) {
            Ok(channel) => {
                registry.register(Arc::new(channel));
                info!("email channel registered");
            }
            Err(err) => tracing::warn!(%err, "failed to initialize email channel, skipping"),
        }
    }
    registry.register(Arc::new(PushChannel::new()));
    let registry = Arc::new(registry);

    // The broker is built before its consumers, since the consumers
    // themselves depend on a publisher that targets this broker.
    let broker = Arc::new(InProcessBroker::new(Vec::new()));

    let publisher = Arc::new(
        EventPublisher::new(broker.clone(), clock.clone())
            .with_max_retries(config.publisher.max_retries)
            .with_buffer(config.publisher.enable_buffer, config.publisher.max_buffer_size),
    );

    let lifecycle = Arc::new(TaskLifecycle::new(
        tasks.clone(),
        reminders.clone(),
        recurrences.clone(),
        publisher.clone(),
        clock.clone(),
    ));

    let scheduler = Arc::new(ReminderScheduler::new(
        tasks.clone(),
        reminders.clone(),
        publisher.clone(),
        clock.clone(),
    ));

    let recurrence_ledger = Arc::new(IdempotencyLedger::new(clock.clone()));
    let recurrence_engine = Arc::new(
        RecurrenceEngine::new(tasks.clone(), lifecycle.clone(), recurrence_ledger)
            .with_ttl_hours(config.ledger.ttl_hours),
    );
    broker.register(Arc::new(RecurrenceEngineConsumer(recurrence_engine)));

    let notifier_ledger = Arc::new(IdempotencyLedger::new(clock.clone()));
    let notifier = Arc::new(
        NotificationDispatcher::new(registry, notifier_ledger, publisher, deliveries, clock)
            .with_ttl_hours(config.ledger.ttl_hours)
            .with_max_retry_attempts(config.dispatcher.max_retry_attempts)
            .with_retry_backoff(config.dispatcher.retry_backoff_base, config.dispatcher.retry_backoff_max),
    );
    broker.register(Arc::new(NotifierConsumer(notifier)));

    let tick_interval = Duration::from_secs(config.scheduler.tick_interval_seconds);
    let ticker_scheduler = scheduler.clone();
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(tick_interval);
        timer.tick().await;
        loop {
            timer.tick().await;
            let summary = ticker_scheduler.tick().await;
            if summary.found > 0 {
                info!(found = summary.found, sent = summary.sent, "scheduler tick");
            }
        }
    });

    let state = AppState { scheduler };
    let app = api::router(state);

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "taskwire-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("taskwire-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
