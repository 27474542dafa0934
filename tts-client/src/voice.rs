//! Voice catalog retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};
use crate::protocol;

/// One entry from the service's voice catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Voice {
    pub name: String,
    pub short_name: String,
    pub gender: String,
    pub locale: String,
    #[serde(default)]
    pub suggested_codec: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Voice {
    /// Short display label, e.g. "en-US-GuyNeural" -> "Guy".
    pub fn display_name(&self) -> String {
        self.short_name
            .rsplit('-')
            .next()
            .unwrap_or(&self.short_name)
            .replace("Neural", "")
    }
}

/// Fetch the voice catalog, optionally restricted to voices whose short
/// name contains the given substring (e.g. "en-"). Results are sorted by
/// short name.
pub async fn list_voices(filter: Option<&str>) -> Result<Vec<Voice>> {
    let url = protocol::voice_list_url();
    log::debug!("Fetching voice catalog");

    let response = reqwest::get(&url)
        .await
        .map_err(|e| TtsError::VoiceListUnavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(TtsError::VoiceListUnavailable(format!(
            "HTTP {}",
            response.status()
        )));
    }

    let voices: Vec<Voice> = response
        .json()
        .await
        .map_err(|e| TtsError::VoiceListUnavailable(e.to_string()))?;

    Ok(filter_voices(voices, filter))
}

/// Apply the short-name substring filter and sort by short name.
pub fn filter_voices(voices: Vec<Voice>, filter: Option<&str>) -> Vec<Voice> {
    let mut voices: Vec<Voice> = match filter {
        Some(prefix) => voices
            .into_iter()
            .filter(|v| v.short_name.contains(prefix))
            .collect(),
        None => voices,
    };
    voices.sort_by(|a, b| a.short_name.cmp(&b.short_name));
    voices
}
