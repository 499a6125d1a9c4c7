use anyhow::{Result, anyhow};

use crate::core::AppConfig;
use crate::events::format_events;
use crate::google::gcal::insert_event;
use crate::google::oauth::GoogleSession;
use crate::sections::query_sections;

/// Query, format, then print or submit each event, one at a time in
/// result order. The first failing submission halts the run.
pub async fn run(
    config: &AppConfig,
    session: Option<&GoogleSession>,
    courses: &[i64],
    dry_run: bool,
) -> Result<()> {
    let sections = query_sections(&config.db_path, courses)?;
    tracing::debug!("Matched {} sections", sections.len());

    let events = format_events(&sections)?;

    for event in &events {
        println!("{}", serde_json::to_string_pretty(event)?);
        if dry_run {
            continue;
        }
        let session = session
            .ok_or_else(|| anyhow!("Submitting events requires an authorized session"))?;
        let created = insert_event(
            &session.api_base,
            &session.access_token,
            &config.calendar_id,
            event,
        )
        .await?;
        if let Some(link) = created.html_link {
            println!("Event created: {}", link);
        }
    }

    Ok(())
}
