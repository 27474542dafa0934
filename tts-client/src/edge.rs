//! Edge read-aloud backend over WebSocket.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::backend::{SpeechBackend, SpeechEvent, SpeechOptions, SpeechStream};
use crate::error::{Result, TtsError};
use crate::protocol;

const ORIGIN: &str = "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 Edg/130.0.0.0";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Backend that talks to the Edge read-aloud service directly.
#[derive(Debug, Default)]
pub struct EdgeBackend;

impl EdgeBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpeechBackend for EdgeBackend {
    async fn open(&self, text: &str, options: &SpeechOptions) -> Result<Box<dyn SpeechStream>> {
        options.validate()?;

        let connection_id = protocol::request_id();
        let url = protocol::synthesis_url(&connection_id);

        let mut request = url.into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("Pragma", HeaderValue::from_static("no-cache"));
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
        headers.insert("Origin", HeaderValue::from_static(ORIGIN));
        headers.insert("User-Agent", HeaderValue::from_static(USER_AGENT));

        log::debug!("Opening synthesis session {}", connection_id);
        let (mut ws, _) = connect_async(request).await?;

        ws.send(Message::Text(protocol::speech_config_message()))
            .await?;

        let ssml = protocol::build_ssml(text, &options.voice, options.rate_str());
        ws.send(Message::Text(protocol::ssml_message(&connection_id, &ssml)))
            .await?;

        Ok(Box::new(EdgeStream { ws, done: false }))
    }

    fn name(&self) -> &'static str {
        "edge"
    }
}

/// One live synthesis session.
struct EdgeStream {
    ws: WsStream,
    done: bool,
}

#[async_trait]
impl SpeechStream for EdgeStream {
    async fn next_event(&mut self) -> Result<Option<SpeechEvent>> {
        if self.done {
            return Ok(None);
        }

        while let Some(message) = self.ws.next().await {
            match message? {
                Message::Text(text) => match protocol::message_path(&text) {
                    Some("turn.end") => {
                        self.done = true;
                        let _ = self.ws.close(None).await;
                        return Ok(None);
                    }
                    Some("audio.metadata") => {
                        return Ok(Some(SpeechEvent::Metadata(
                            protocol::message_body(&text).to_string(),
                        )));
                    }
                    // turn.start, response, etc.
                    _ => continue,
                },
                Message::Binary(frame) => {
                    if let Some(payload) = protocol::audio_payload(&frame)? {
                        if !payload.is_empty() {
                            return Ok(Some(SpeechEvent::Audio(payload.to_vec())));
                        }
                    }
                }
                Message::Close(frame) => {
                    self.done = true;
                    return Err(TtsError::Protocol(format!(
                        "service closed the connection before turn.end: {:?}",
                        frame
                    )));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }

        self.done = true;
        Err(TtsError::Protocol(
            "connection dropped before turn.end".to_string(),
        ))
    }
}
