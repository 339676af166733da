//! Transport for the dashboard session: one connect attempt yields a stream of text frames.

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use std::future::Future;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::USER_AGENT;

use crate::version::user_agent;

/// Text frames from an open channel. The stream ends when the server closes;
/// an `Err` item is a transport failure.
pub type FrameStream = BoxStream<'static, anyhow::Result<String>>;

pub trait Connector: Send {
    fn connect(&mut self) -> impl Future<Output = anyhow::Result<FrameStream>> + Send;
}

/// WebSocket connector; every attempt dials the same URL with no extra parameters.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Connector for WsConnector {
    async fn connect(&mut self) -> anyhow::Result<FrameStream> {
        let mut request = self.url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_str(&user_agent())?);
        let (ws, _response) = connect_async(request).await?;
        let frames = ws.filter_map(|msg| async move {
            match msg {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                // Control frames are answered by tungstenite; binary is not part of the protocol.
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            }
        });
        Ok(frames.boxed())
    }
}
