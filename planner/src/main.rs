// Planner binary entry point: previews upcoming occurrences for the
// configured calendar events and exits.

use anyhow::Context;
use calendar::pattern::TimePattern;
use calendar::search::next_occurrence;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use planner::config::{ScheduleEntry, Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;

    // Environment filter wins over the configured level.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&settings.observability.log_level)
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting calendar event planner");

    settings
        .validate()
        .map_err(|reason| anyhow::anyhow!(reason))
        .context("Invalid configuration")?;

    info!(
        schedules = settings.schedules.len(),
        count = settings.preview.count,
        timezone = %settings.preview.timezone,
        "Configuration loaded"
    );

    let default_zone: Tz = settings
        .preview
        .timezone
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid preview timezone: {e}"))?;
    let start = settings.preview.start.unwrap_or_else(Utc::now);

    let mut failures = 0usize;
    for entry in &settings.schedules {
        if let Err(e) = preview_entry(entry, default_zone, start, settings.preview.count) {
            error!(schedule = %entry.name, error = %e, "Preview failed");
            failures += 1;
        }
    }

    if !settings.schedules.is_empty() && failures == settings.schedules.len() {
        anyhow::bail!("all {failures} schedules failed");
    }
    Ok(())
}

/// Parse one configured event and emit its next occurrences as JSON lines.
fn preview_entry(
    entry: &ScheduleEntry,
    default_zone: Tz,
    start: DateTime<Utc>,
    count: usize,
) -> anyhow::Result<()> {
    let pattern: TimePattern = entry
        .event
        .parse()
        .with_context(|| format!("failed to parse event '{}'", entry.event))?;
    let zone = match &entry.timezone {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone '{name}': {e}"))?,
        None => default_zone,
    };

    info!(
        schedule = %entry.name,
        pattern = %pattern,
        zone = %zone,
        "Previewing schedule"
    );

    let mut after = start;
    for _ in 0..count {
        let next = next_occurrence(&pattern, after, zone)
            .with_context(|| format!("searching after {after}"))?;
        println!(
            "{}",
            serde_json::json!({
                "schedule": entry.name,
                "occurrence": next.to_rfc3339(),
                "local": next.with_timezone(&zone).to_rfc3339(),
            })
        );
        after = next;
    }
    Ok(())
}
