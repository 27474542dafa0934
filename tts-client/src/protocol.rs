//! Wire protocol for the Edge read-aloud service.
//!
//! The service speaks a simple framed protocol over WebSocket: text frames
//! carry `Header: Value` pairs separated from an optional body by a blank
//! line; binary frames start with a big-endian u16 header length, then the
//! same header block, then raw audio bytes.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, TtsError};

/// Shared client token used by the Edge browser's read-aloud feature.
pub const TRUSTED_CLIENT_TOKEN: &str = "6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// Chromium version reported alongside the DRM token.
pub const CHROMIUM_FULL_VERSION: &str = "130.0.2849.68";

const WSS_BASE: &str =
    "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1";

const VOICE_LIST_BASE: &str =
    "https://speech.platform.bing.com/consumer/speech/synthesize/readaloud/voices/list";

/// Audio format requested from the service.
pub const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// Seconds between the Windows file time epoch (1601) and the Unix epoch.
const WINDOWS_EPOCH_OFFSET_SECS: u64 = 11_644_473_600;

/// Compute the `Sec-MS-GEC` DRM token: SHA-256 of the current Windows file
/// time (rounded down to 5 minutes, in 100ns ticks) concatenated with the
/// trusted client token, as uppercase hex.
pub fn sec_ms_gec() -> String {
    let unix_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let win_secs = (unix_secs + WINDOWS_EPOCH_OFFSET_SECS) / 300 * 300;
    let ticks = win_secs as u128 * 10_000_000;
    let digest = Sha256::digest(format!("{}{}", ticks, TRUSTED_CLIENT_TOKEN).as_bytes());
    digest.iter().map(|b| format!("{:02X}", b)).collect()
}

/// `Sec-MS-GEC-Version` query parameter value.
pub fn sec_ms_gec_version() -> String {
    format!("1-{}", CHROMIUM_FULL_VERSION)
}

/// Build the WebSocket URL for one synthesis connection.
pub fn synthesis_url(connection_id: &str) -> String {
    format!(
        "{}?TrustedClientToken={}&Sec-MS-GEC={}&Sec-MS-GEC-Version={}&ConnectionId={}",
        WSS_BASE,
        TRUSTED_CLIENT_TOKEN,
        sec_ms_gec(),
        sec_ms_gec_version(),
        connection_id
    )
}

/// Build the voice list URL.
pub fn voice_list_url() -> String {
    format!(
        "{}?trustedclienttoken={}&Sec-MS-GEC={}&Sec-MS-GEC-Version={}",
        VOICE_LIST_BASE,
        TRUSTED_CLIENT_TOKEN,
        sec_ms_gec(),
        sec_ms_gec_version()
    )
}

/// Timestamp in the format the service expects in `X-Timestamp` headers.
pub fn timestamp() -> String {
    Utc::now()
        .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

/// The `speech.config` message sent once per connection.
pub fn speech_config_message() -> String {
    format!(
        "X-Timestamp:{}\r\n\
         Content-Type:application/json; charset=utf-8\r\n\
         Path:speech.config\r\n\r\n\
         {{\"context\":{{\"synthesis\":{{\"audio\":{{\"metadataoptions\":{{\
         \"sentenceBoundaryEnabled\":\"false\",\"wordBoundaryEnabled\":\"true\"}},\
         \"outputFormat\":\"{}\"}}}}}}}}",
        timestamp(),
        OUTPUT_FORMAT
    )
}

/// The SSML request message for one chunk of text.
pub fn ssml_message(request_id: &str, ssml: &str) -> String {
    format!(
        "X-RequestId:{}\r\nContent-Type:application/ssml+xml\r\n\
         X-Timestamp:{}Z\r\nPath:ssml\r\n\r\n{}",
        request_id,
        timestamp(),
        ssml
    )
}

/// Build the SSML document for one chunk.
pub fn build_ssml(text: &str, voice: &str, rate: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
         <voice name='{}'><prosody pitch='+0Hz' rate='{}' volume='+0%'>{}</prosody>\
         </voice></speak>",
        voice,
        rate,
        escape_xml(text)
    )
}

/// Escape characters that would break the SSML document.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Extract the `Path:` header value from a text frame.
pub fn message_path(message: &str) -> Option<&str> {
    let (headers, _) = message.split_once("\r\n\r\n")?;
    headers
        .lines()
        .find_map(|line| line.strip_prefix("Path:"))
        .map(str::trim)
}

/// Body of a text frame (everything after the blank line).
pub fn message_body(message: &str) -> &str {
    message
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or("")
}

/// Parse a binary frame into its audio payload.
///
/// Returns `None` for binary frames whose header is not an audio path
/// (the service also sends zero-payload audio frames, which come back as
/// an empty slice and should be skipped by the caller).
pub fn audio_payload(frame: &[u8]) -> Result<Option<&[u8]>> {
    if frame.len() < 2 {
        return Err(TtsError::Protocol(
            "binary frame shorter than header length prefix".to_string(),
        ));
    }
    let header_len = u16::from_be_bytes([frame[0], frame[1]]) as usize;
    if frame.len() < 2 + header_len {
        return Err(TtsError::Protocol(format!(
            "binary frame truncated: header claims {} bytes, {} available",
            header_len,
            frame.len() - 2
        )));
    }
    let header = std::str::from_utf8(&frame[2..2 + header_len])
        .map_err(|_| TtsError::Protocol("binary frame header is not UTF-8".to_string()))?;
    if header.contains("Path:audio") {
        Ok(Some(&frame[2 + header_len..]))
    } else {
        Ok(None)
    }
}

/// A fresh request/connection identifier (UUID4 without hyphens).
pub fn request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sec_ms_gec_shape() {
        let token = sec_ms_gec();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!token.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_build_ssml_contains_voice_and_rate() {
        let ssml = build_ssml("Hello.", "en-US-AriaNeural", "+10%");
        assert!(ssml.contains("name='en-US-AriaNeural'"));
        assert!(ssml.contains("rate='+10%'"));
        assert!(ssml.contains(">Hello.</prosody>"));
    }

    #[test]
    fn test_message_path() {
        let msg = "X-RequestId:abc\r\nPath:turn.end\r\n\r\n{}";
        assert_eq!(message_path(msg), Some("turn.end"));
        assert_eq!(message_body(msg), "{}");
    }

    #[test]
    fn test_message_path_missing() {
        assert_eq!(message_path("no blank line"), None);
    }

    #[test]
    fn test_audio_payload() {
        let header = b"Path:audio\r\n";
        let mut frame = Vec::new();
        frame.extend_from_slice(&(header.len() as u16).to_be_bytes());
        frame.extend_from_slice(header);
        frame.extend_from_slice(&[1, 2, 3]);
        let payload = audio_payload(&frame).unwrap();
        assert_eq!(payload, Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_audio_payload_non_audio_header() {
        let header = b"Path:other\r\n";
        let mut frame = Vec::new();
        frame.extend_from_slice(&(header.len() as u16).to_be_bytes());
        frame.extend_from_slice(header);
        assert_eq!(audio_payload(&frame).unwrap(), None);
    }

    #[test]
    fn test_audio_payload_truncated() {
        let frame = [0x00, 0xFF, b'x'];
        assert!(audio_payload(&frame).is_err());
    }

    #[test]
    fn test_synthesis_url_carries_connection_id() {
        let url = synthesis_url("deadbeef");
        assert!(url.starts_with("wss://"));
        assert!(url.contains("ConnectionId=deadbeef"));
        assert!(url.contains("Sec-MS-GEC="));
    }

    #[test]
    fn test_request_id_has_no_hyphens() {
        let id = request_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }
}
