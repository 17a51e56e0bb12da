//! Output helpers shared by the `instamoments` binary.

use std::fmt::Write;

use anyhow::Context;
use clap::ValueEnum;
use instamoments_core::models::{
    EventExpiration, EventLimitsResult, ExpiringEvent, SweepReport, UpgradeRecommendation,
    UploadDecision,
};
use instamoments_core::{AppError, ErrorMetadata, LogLevel, TierCatalog};
use serde::Serialize;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Print `value` as JSON or as the table produced by `render`.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => {
            print!("{}", render(value));
            Ok(())
        }
    }
}

/// One-line message for a failed command.
///
/// Domain errors show their user-facing message and code; anything else falls
/// back to the full context chain.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(app) => format!("{} [{}]", app.client_message(), app.error_code()),
        None => format!("{:#}", err),
    }
}

/// Log a failed command at the severity its error calls for.
pub fn log_error(err: &anyhow::Error) {
    match err.downcast_ref::<AppError>() {
        Some(app) => {
            let code = app.error_code();
            let details = app.detailed_message();
            match app.log_level() {
                LogLevel::Debug => tracing::debug!(error_code = code, "{}", details),
                LogLevel::Warn => tracing::warn!(error_code = code, "{}", details),
                LogLevel::Error => tracing::error!(error_code = code, "{}", details),
            }
        }
        None => tracing::error!("{:?}", err),
    }
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount in centavos as pesos.
pub fn format_price(centavos: u32) -> String {
    if centavos == 0 {
        return "free".to_string();
    }
    format!("PHP {}.{:02}", centavos / 100, centavos % 100)
}

pub fn render_tiers(catalog: &TierCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>8} {:>10} {:>6} {:>12} {:>14}",
        "Tier", "Photos", "Videos", "Per guest", "Days", "Price", "Video addon"
    );
    let _ = writeln!(out, "{}", "-".repeat(74));
    for def in catalog.iter() {
        let addon = if def.has_video_addon_available {
            format_price(def.video_addon_price)
        } else {
            "-".to_string()
        };
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>8} {:>10} {:>6} {:>12} {:>14}",
            def.tier.as_str(),
            def.max_photos,
            def.max_videos,
            def.max_photos_per_user,
            def.storage_days,
            format_price(def.price),
            addon
        );
    }
    out
}

pub fn render_decision(decision: &UploadDecision) -> String {
    match &decision.reason {
        Some(reason) if !decision.allowed => format!("DENIED: {}\n", reason),
        _ => "ALLOWED\n".to_string(),
    }
}

pub fn render_expiration(expiration: &EventExpiration) -> String {
    let state = if expiration.is_expired {
        "expired"
    } else if expiration.is_expiring_soon {
        "expiring soon"
    } else {
        "active"
    };
    format!(
        "Expires at:     {}\nDays remaining: {}\nState:          {}\n",
        expiration.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        expiration.days_remaining,
        state
    )
}

pub fn render_limits(result: &EventLimitsResult) -> String {
    format!(
        "{}Photos:         {}\nVideos:         {}\nContributors:   {}\n",
        render_expiration(&result.expiration),
        result.total_photos,
        result.total_videos,
        result.total_contributors
    )
}

pub fn render_upgrades(recommendations: &[UpgradeRecommendation]) -> String {
    if recommendations.is_empty() {
        return "No upgrade recommended.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {:>12}  {}", "Tier", "Price", "Reason");
    let _ = writeln!(out, "{}", "-".repeat(50));
    for rec in recommendations {
        let _ = writeln!(
            out,
            "{:<10} {:>12}  {}",
            rec.tier.as_str(),
            format_price(rec.price),
            rec.reason
        );
    }
    out
}

pub fn render_sweep_report(report: &SweepReport) -> String {
    let mut out = format!(
        "Scanned: {}  Expired: {}  Deleted: {}  Errors: {}\n",
        report.scanned, report.expired, report.deleted, report.errors
    );
    for failure in &report.failures {
        let _ = writeln!(
            out,
            "  {} {:<22} {:<22} {}",
            failure.event_id,
            failure.operation.to_string(),
            failure.code,
            truncate_string(&failure.reason, 60)
        );
    }
    out
}

pub fn render_expiring(events: &[ExpiringEvent]) -> String {
    if events.is_empty() {
        return "No events expiring soon.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36} {:<30} {:<10} {:>20}",
        "ID", "Name", "Tier", "Expires At"
    );
    let _ = writeln!(out, "{}", "-".repeat(99));
    for item in events {
        let _ = writeln!(
            out,
            "{:<36} {:<30} {:<10} {:>20}",
            item.event.id,
            truncate_string(&item.event.name, 30),
            item.event.tier.as_str(),
            item.expiration.expires_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    out
}
