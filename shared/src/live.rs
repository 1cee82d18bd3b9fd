use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Published to every subscriber of the live-text feed.
#[derive(Debug, Serialize, Deserialize)]
pub struct LiveTextEvent {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTextPayload {
    pub text: String,
}

/// Publish/subscribe hub for the live text value.
///
/// A single watch channel replaces the old process-global string: publishers
/// replace the value, every subscriber observes the same latest snapshot.
#[derive(Clone)]
pub struct LiveTextHub {
    tx: Arc<watch::Sender<String>>,
}

impl LiveTextHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, text: String) {
        self.tx.send_replace(text);
    }

    pub fn snapshot(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for LiveTextHub {
    fn default() -> Self {
        Self::new()
    }
}

/// GET /api/events - current snapshot in SSE framing.
///
/// Lambda responses are buffered, so the timer push degrades to client
/// re-polling; every connection still sees the same snapshot.
pub async fn handle_events(hub: &LiveTextHub) -> Result<Response<Body>, Error> {
    let event = LiveTextEvent {
        text: hub.snapshot(),
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/event-stream")
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", "*")
        .body(format!("data: {}\n\n", serde_json::to_string(&event)?).into())
        .map_err(Box::new)?)
}

/// POST /api/update - publish a new text value.
pub async fn handle_update(hub: &LiveTextHub, body: &[u8]) -> Result<Response<Body>, Error> {
    let payload: UpdateTextPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({ "error": format!("Invalid request body: {}", e) })
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?)
        }
    };

    hub.publish(payload.text);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({ "message": "Text updated successfully" })
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_the_same_latest_value() {
        let hub = LiveTextHub::new();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.publish("hello".to_string());

        first.changed().await.unwrap();
        second.changed().await.unwrap();
        assert_eq!(*first.borrow(), "hello");
        assert_eq!(*second.borrow(), "hello");
        assert_eq!(hub.snapshot(), "hello");
    }

    #[tokio::test]
    async fn publish_replaces_the_snapshot() {
        let hub = LiveTextHub::new();
        hub.publish("one".to_string());
        hub.publish("two".to_string());
        assert_eq!(hub.snapshot(), "two");
    }

    #[tokio::test]
    async fn events_body_is_sse_framed() {
        let hub = LiveTextHub::new();
        hub.publish("ping".to_string());

        let resp = handle_events(&hub).await.unwrap();
        let body = String::from_utf8(resp.body().to_vec()).unwrap();
        assert!(body.starts_with("data: "));
        assert!(body.ends_with("\n\n"));
        assert!(body.contains("\"text\":\"ping\""));
    }
}
