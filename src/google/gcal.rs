//! Google Calendar API client for inserting recurring events

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::events::EventPayload;

/// Production Google API host; tests point this at a local mock server
pub const GOOGLE_API_BASE: &str = "https://www.googleapis.com";

/// The slice of the Calendar API's event resource we care about
#[derive(Debug, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub status: Option<String>,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

/// Insert a recurring event into the given calendar
/// curl -X POST -H "Authorization: Bearer $TOKEN" \
///   https://www.googleapis.com/calendar/v3/calendars/primary/events
pub async fn insert_event(
    api_base: &str,
    access_token: &str,
    calendar_id: &str,
    event: &EventPayload,
) -> Result<CreatedEvent, anyhow::Error> {
    let client = Client::new();
    let url = format!(
        "{}/calendar/v3/calendars/{}/events",
        api_base,
        urlencoding::encode(calendar_id)
    );
    let res = client
        .post(&url)
        .bearer_auth(access_token)
        .json(event)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Event insert failed: {} ({})", status, text);
    }
    let created: CreatedEvent = serde_json::from_str(&text)?;
    Ok(created)
}
