//! VulnSentinel CLI - runs the scheduler daemon in production, or a single
//! engine pass for manual/cron invocation, grounded on the teacher's
//! `research` CLI shape (clap subcommands, one-shot "poll" commands driving
//! the same pipeline the daemon runs continuously).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use vs_agent::registry::ProviderRegistry;
use vs_core::config::Config;
use vs_github::GitHubClient;
use vs_reachability::HttpReachabilityBackend;
use vs_scheduler::{EngineLoop, Scheduler};

#[derive(Parser)]
#[command(name = "vulnsentinel")]
#[command(about = "Security-fix detection engine pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full scheduler: one loop per engine, chained by wake signals.
    Serve,
    /// Run a single Dependency Scanner pass over due projects.
    Scan,
    /// Run a single Event Collector pass over due libraries.
    Collect,
    /// Run a single Event Classifier pass over unclassified events.
    Classify {
        #[arg(long, default_value = "deepseek/deepseek-chat")]
        model: String,
        #[arg(long)]
        escalation_model: Option<String>,
    },
    /// Run a single Vuln Analyzer pass over unanalyzed bugfix events.
    Analyze,
    /// Run a single Impact Engine pass over published vulns.
    Impact,
    /// Run a single Reachability Analyzer pass over pending client-vulns.
    Reachability,
    /// Run a single Notification Engine pass over verified-and-recorded client-vulns.
    Notify,
}

const BATCH_SIZE: i64 = 50;

#[tokio::main]
async fn main() -> Result<()> {
    vs_core::logging::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = connect(&config).await?;

    match cli.command {
        Commands::Serve => serve(config, pool).await,
        Commands::Scan => {
            let github = GitHubClient::from_env();
            let engine = vs_scanner::ScannerEngine::new(&pool, &github);
            let reports = engine.scan_due_projects(chrono::Duration::from_std(config.scanner_freshness_window)?).await?;
            println!("scanned {} project(s)", reports.len());
            Ok(())
        }
        Commands::Collect => {
            let github = Arc::new(GitHubClient::from_env());
            let engine = vs_collector::CollectorEngine::new(&pool, github, config.concurrency.collector_permits);
            let reports = engine.collect_due_libraries(chrono::Duration::from_std(config.collector_activity_window)?).await?;
            println!("collected {} library/libraries", reports.len());
            Ok(())
        }
        Commands::Classify { model, escalation_model } => {
            let github = Arc::new(GitHubClient::from_env());
            let registry = Arc::new(ProviderRegistry::from_env());
            let engine = vs_classifier::ClassifierEngine::new(&pool, github, registry, model, escalation_model)
                .with_concurrency(config.concurrency.classifier_permits);
            let count = engine.classify_pending(BATCH_SIZE).await?;
            println!("classified {count} event(s)");
            Ok(())
        }
        Commands::Analyze => {
            let github = Arc::new(GitHubClient::from_env());
            let registry = Arc::new(ProviderRegistry::from_env());
            let engine = vs_analyzer::AnalyzerEngine::new(&pool, github, registry)
                .with_concurrency(config.concurrency.analyzer_permits);
            let count = engine.analyze_pending(BATCH_SIZE).await?;
            println!("published {count} upstream vuln(s)");
            Ok(())
        }
        Commands::Impact => {
            let engine = vs_impact::ImpactEngine::new(&pool);
            let reports = engine.process_pending(BATCH_SIZE).await?;
            let created: usize = reports.iter().map(|r| r.created_count).sum();
            println!("fanned out {created} client-vuln row(s) across {} upstream vuln(s)", reports.len());
            Ok(())
        }
        Commands::Reachability => {
            let backend = Arc::new(HttpReachabilityBackend::from_env());
            let engine = vs_reachability::ReachabilityEngine::new(&pool, backend)
                .with_concurrency(config.concurrency.reachability_permits);
            let count = engine.process_pending(BATCH_SIZE).await?;
            println!("checked {count} client-vuln(s)");
            Ok(())
        }
        Commands::Notify => {
            let notifier = vs_notify::Notifier::from_env();
            let engine = vs_notify::NotificationEngine::new(&pool, notifier);
            let count = engine.process_pending(BATCH_SIZE).await?;
            println!("notified {count} client-vuln(s)");
            Ok(())
        }
    }
}

async fn connect(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")
}

/// Wire all seven engine loops into the wake chain from spec.md §4.9 and run
/// until SIGINT/SIGTERM.
async fn serve(config: Config, pool: PgPool) -> Result<()> {
    let github = Arc::new(GitHubClient::from_env());
    let registry = Arc::new(ProviderRegistry::from_env());
    let reachability_backend = Arc::new(HttpReachabilityBackend::from_env());

    let pool = Arc::new(pool);
    let classifier_model = std::env::var("VULNSENTINEL_CLASSIFIER_MODEL").unwrap_or_else(|_| "deepseek/deepseek-chat".to_string());
    let escalation_model = std::env::var("VULNSENTINEL_ESCALATION_MODEL").ok();

    let scanner_window = chrono::Duration::from_std(config.scanner_freshness_window)?;
    let collector_window = chrono::Duration::from_std(config.collector_activity_window)?;

    let notify_trigger = Arc::new(tokio::sync::Notify::new());
    let reachability_trigger = Arc::new(tokio::sync::Notify::new());
    let impact_trigger = Arc::new(tokio::sync::Notify::new());
    let analyzer_trigger = Arc::new(tokio::sync::Notify::new());
    let classifier_trigger = Arc::new(tokio::sync::Notify::new());
    let collector_trigger = Arc::new(tokio::sync::Notify::new());

    let scanner_pool = pool.clone();
    let scanner_github = github.clone();
    let scanner_loop = EngineLoop::new(
        "scanner",
        config.scheduler.scan_interval,
        Arc::new(move || {
            let pool = scanner_pool.clone();
            let github = scanner_github.clone();
            Box::pin(async move {
                let engine = vs_scanner::ScannerEngine::new(&pool, &github);
                let reports = engine.scan_due_projects(scanner_window).await?;
                Ok(reports.len())
            })
        }),
    )
    .with_downstream(collector_trigger.clone());
    let scanner_trigger = scanner_loop.trigger.clone();

    let collector_pool = pool.clone();
    let collector_github = github.clone();
    let collector_permits = config.concurrency.collector_permits;
    let collector_loop = EngineLoop {
        trigger: collector_trigger,
        ..EngineLoop::new(
            "collector",
            config.scheduler.collect_interval,
            Arc::new(move || {
                let pool = collector_pool.clone();
                let github = collector_github.clone();
                Box::pin(async move {
                    let engine = vs_collector::CollectorEngine::new(&pool, github, collector_permits);
                    let reports = engine.collect_due_libraries(collector_window).await?;
                    Ok(reports.len())
                })
            }),
        )
        .with_downstream(classifier_trigger.clone())
    };

    let classifier_pool = pool.clone();
    let classifier_github = github.clone();
    let classifier_registry = registry.clone();
    let classifier_permits = config.concurrency.classifier_permits;
    let classifier_loop = EngineLoop {
        trigger: classifier_trigger,
        ..EngineLoop::new(
            "classifier",
            config.scheduler.classify_interval,
            Arc::new(move || {
                let pool = classifier_pool.clone();
                let github = classifier_github.clone();
                let registry = classifier_registry.clone();
                let model = classifier_model.clone();
                let escalation_model = escalation_model.clone();
                Box::pin(async move {
                    let engine = vs_classifier::ClassifierEngine::new(&pool, github, registry, model, escalation_model)
                        .with_concurrency(classifier_permits);
                    engine.classify_pending(BATCH_SIZE).await
                })
            }),
        )
        .with_downstream(analyzer_trigger.clone())
    };

    let analyzer_pool = pool.clone();
    let analyzer_github = github.clone();
    let analyzer_registry = registry.clone();
    let analyzer_permits = config.concurrency.analyzer_permits;
    let analyzer_loop = EngineLoop {
        trigger: analyzer_trigger,
        ..EngineLoop::new(
            "analyzer",
            config.scheduler.analyze_interval,
            Arc::new(move || {
                let pool = analyzer_pool.clone();
                let github = analyzer_github.clone();
                let registry = analyzer_registry.clone();
                Box::pin(async move {
                    let engine = vs_analyzer::AnalyzerEngine::new(&pool, github, registry).with_concurrency(analyzer_permits);
                    engine.analyze_pending(BATCH_SIZE).await
                })
            }),
        )
        .with_downstream(impact_trigger.clone())
    };

    let impact_pool = pool.clone();
    let impact_loop = EngineLoop {
        trigger: impact_trigger,
        ..EngineLoop::new(
            "impact",
            config.scheduler.impact_interval,
            Arc::new(move || {
                let pool = impact_pool.clone();
                Box::pin(async move {
                    let engine = vs_impact::ImpactEngine::new(&pool);
                    let reports = engine.process_pending(BATCH_SIZE).await?;
                    Ok(reports.iter().map(|r| r.created_count).sum())
                })
            }),
        )
        .with_downstream(reachability_trigger.clone())
    };

    let reachability_pool = pool.clone();
    let reachability_backend_clone = reachability_backend.clone();
    let reachability_permits = config.concurrency.reachability_permits;
    let reachability_loop = EngineLoop {
        trigger: reachability_trigger,
        ..EngineLoop::new(
            "reachability",
            config.scheduler.reachability_interval,
            Arc::new(move || {
                let pool = reachability_pool.clone();
                let backend = reachability_backend_clone.clone();
                Box::pin(async move {
                    let engine = vs_reachability::ReachabilityEngine::new(&pool, backend).with_concurrency(reachability_permits);
                    engine.process_pending(BATCH_SIZE).await
                })
            }),
        )
        .with_downstream(notify_trigger.clone())
    };

    let notify_pool = pool.clone();
    let notify_loop = EngineLoop {
        trigger: notify_trigger,
        ..EngineLoop::new(
            "notification",
            config.scheduler.notify_interval,
            Arc::new(move || {
                let pool = notify_pool.clone();
                Box::pin(async move {
                    let notifier = vs_notify::Notifier::from_env();
                    let engine = vs_notify::NotificationEngine::new(&pool, notifier);
                    engine.process_pending(BATCH_SIZE).await
                })
            }),
        )
    };

    let _ = scanner_trigger;
    let scheduler = Scheduler::start(vec![
        scanner_loop,
        collector_loop,
        classifier_loop,
        analyzer_loop,
        impact_loop,
        reachability_loop,
        notify_loop,
    ]);

    tracing::info!("scheduler started, all seven engine loops running");
    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");
    scheduler.shutdown().await;

    Ok(())
}
