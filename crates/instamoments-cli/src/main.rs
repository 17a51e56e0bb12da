//! InstaMoments CLI: inspect tier limits and run the expiration sweep.
//!
//! Evaluator commands (`tiers`, `check-upload`, `expiration`, `upgrades`) run
//! offline. Event and sweep commands need DATABASE_URL and the storage settings.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use instamoments_cli::{
    describe_error, emit, init_tracing, log_error, render_decision, render_expiration,
    render_expiring, render_limits, render_sweep_report, render_tiers, render_upgrades,
    OutputFormat,
};
use instamoments_core::models::{
    EventLimitsResult, SubscriptionTier, UpgradeRecommendation, UploadDecision,
};
use instamoments_core::validation::parse_timestamp;
use instamoments_core::{
    Config, ExpirationCalculator, LimitEvaluator, TierCatalog, UpgradeAdvisor,
};
use instamoments_db::{setup_database, PgEventRepository};
use instamoments_services::{EventLimitsService, ExpirationSweepService};
use instamoments_storage::create_media_store;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "instamoments", about = "InstaMoments subscription limits and event lifecycle")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MediaType {
    Photo,
    Video,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tier catalog
    Tiers,
    /// Check whether one more upload fits a tier's limits
    CheckUpload {
        /// Tier key (free, basic, standard, premium, pro)
        #[arg(long)]
        tier: SubscriptionTier,
        #[arg(long, value_enum, default_value = "photo")]
        media: MediaType,
        /// Current number of photos or videos in the event
        #[arg(long)]
        count: i64,
        /// Photos already uploaded by this contributor
        #[arg(long)]
        user_count: Option<i64>,
        #[arg(long)]
        video_addon: bool,
    },
    /// Compute the expiration state of an event
    Expiration {
        #[arg(long)]
        tier: SubscriptionTier,
        /// Creation time (RFC 3339)
        #[arg(long)]
        created_at: String,
        /// Explicit expiry overriding the tier's storage period (RFC 3339)
        #[arg(long)]
        custom_expires_at: Option<String>,
        /// Evaluate as of this instant instead of now (RFC 3339)
        #[arg(long)]
        now: Option<String>,
        /// Expiring-soon window in hours
        #[arg(long)]
        hours: Option<i64>,
    },
    /// List upgrade recommendations for a usage profile
    Upgrades {
        #[arg(long)]
        tier: SubscriptionTier,
        #[arg(long, default_value = "0")]
        photos: i64,
        #[arg(long, default_value = "0")]
        videos: i64,
        #[arg(long)]
        video_addon: bool,
        #[arg(long)]
        days_remaining: i64,
    },
    /// Show limits, expiration and upgrade options of a stored event
    Event {
        /// Event UUID
        id: Uuid,
        /// Contributor email to check the per-guest photo cap for
        #[arg(long)]
        contributor: Option<String>,
    },
    /// Run one expiration sweep
    Sweep {
        /// Also delete media objects and records of expired events
        #[arg(long)]
        delete_content: bool,
    },
    /// List events expiring within the given window
    Expiring {
        #[arg(long)]
        hours: Option<i64>,
    },
    /// Run the sweep on its configured interval until interrupted
    Watch,
}

#[derive(serde::Serialize)]
struct EventReport {
    limits: EventLimitsResult,
    photo_upload: UploadDecision,
    video_upload: UploadDecision,
    upgrades: Vec<UpgradeRecommendation>,
}

fn offline_catalog() -> anyhow::Result<TierCatalog> {
    let overrides = Config::video_limits_from_env()?;
    TierCatalog::with_video_caps(&overrides).context("Invalid VIDEO_LIMIT_* configuration")
}

struct Backends {
    config: Config,
    catalog: Arc<TierCatalog>,
    events: Arc<PgEventRepository>,
}

async fn connect() -> anyhow::Result<Backends> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let catalog = Arc::new(TierCatalog::from_config(&config)?);
    let pool = setup_database(&config).await?;
    Ok(Backends {
        config,
        catalog,
        events: Arc::new(PgEventRepository::new(pool)),
    })
}

fn sweep_service(backends: &Backends) -> anyhow::Result<ExpirationSweepService> {
    let media = create_media_store(&backends.config).context("Failed to create media store")?;
    Ok(ExpirationSweepService::new(
        backends.events.clone(),
        Arc::new(media),
        backends.catalog.clone(),
    ))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error(&err);
            eprintln!("Error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Tiers => {
            let catalog = offline_catalog()?;
            let tiers: Vec<_> = catalog.iter().cloned().collect();
            emit(format, &tiers, |_| render_tiers(&catalog))?;
        }
        Commands::CheckUpload {
            tier,
            media,
            count,
            user_count,
            video_addon,
        } => {
            let catalog = offline_catalog()?;
            let evaluator = LimitEvaluator::new(&catalog);
            let decision = match media {
                MediaType::Video => evaluator.can_upload_video(tier, count, video_addon)?,
                MediaType::Photo => {
                    let decision = evaluator.can_upload_photo(tier, count, video_addon)?;
                    match user_count {
                        Some(n) if decision.allowed => evaluator.can_user_upload_photo(tier, n)?,
                        _ => decision,
                    }
                }
            };
            emit(format, &decision, render_decision)?;
        }
        Commands::Expiration {
            tier,
            created_at,
            custom_expires_at,
            now,
            hours,
        } => {
            let catalog = offline_catalog()?;
            let created_at = parse_timestamp("created_at", &created_at)?;
            let custom_expires_at = custom_expires_at
                .map(|s| parse_timestamp("custom_expires_at", &s))
                .transpose()?;
            let now = match now {
                Some(s) => parse_timestamp("now", &s)?,
                None => chrono::Utc::now(),
            };
            let calculator = ExpirationCalculator::new(&catalog);
            let expiration = match hours {
                Some(h) => calculator.calculate_with_threshold(
                    created_at,
                    tier,
                    custom_expires_at,
                    now,
                    h,
                )?,
                None => {
                    calculator.calculate_event_expiration(created_at, tier, custom_expires_at, now)
                }
            };
            emit(format, &expiration, render_expiration)?;
        }
        Commands::Upgrades {
            tier,
            photos,
            videos,
            video_addon,
            days_remaining,
        } => {
            let catalog = offline_catalog()?;
            let recommendations = UpgradeAdvisor::new(&catalog).get_upgrade_recommendations(
                tier,
                photos,
                videos,
                video_addon,
                days_remaining,
            )?;
            emit(format, &recommendations, |r| render_upgrades(r))?;
        }
        Commands::Event { id, contributor } => {
            let backends = connect().await?;
            let limits = EventLimitsService::new(backends.events.clone(), backends.catalog.clone());
            let report = EventReport {
                limits: limits.event_limits(id).await?,
                photo_upload: limits.check_photo_upload(id, contributor.as_deref()).await?,
                video_upload: limits.check_video_upload(id).await?,
                upgrades: limits.upgrade_recommendations(id).await?,
            };
            emit(format, &report, |r| {
                format!(
                    "{}Photo upload:   {}Video upload:   {}\n{}",
                    render_limits(&r.limits),
                    render_decision(&r.photo_upload),
                    render_decision(&r.video_upload),
                    render_upgrades(&r.upgrades)
                )
            })?;
        }
        Commands::Sweep { delete_content } => {
            let backends = connect().await?;
            let sweep = sweep_service(&backends)?;
            let report = sweep.process_expired_events(delete_content).await?;
            emit(format, &report, render_sweep_report)?;
        }
        Commands::Expiring { hours } => {
            let backends = connect().await?;
            let hours = hours.unwrap_or(backends.config.expiring_soon_hours);
            let sweep = sweep_service(&backends)?;
            let events = sweep.get_events_expiring_soon(hours).await?;
            emit(format, &events, |e| render_expiring(e))?;
        }
        Commands::Watch => {
            let backends = connect().await?;
            let sweep = Arc::new(sweep_service(&backends)?.with_schedule(
                Duration::from_secs(backends.config.sweep_interval_secs),
                backends.config.sweep_delete_content,
            ));
            tracing::info!(
                interval_secs = backends.config.sweep_interval_secs,
                delete_content = backends.config.sweep_delete_content,
                "Expiration sweep scheduled"
            );

            let handle = sweep.start();
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutting down expiration sweep");
            handle.abort();
        }
    }

    Ok(())
}
