//! In-process side channel for finished report series.
//!
//! The engine publishes each report's numeric rows here; a drain task logs
//! them. Swapping in an external queue later only means replacing this
//! implementation.

use tokio::sync::mpsc;

use engine::{Broker, EngineError, ResultEngine};

#[derive(Clone, Debug)]
pub struct SeriesMessage {
    pub key: String,
    pub payload: String,
}

#[derive(Clone, Debug)]
pub struct ChannelBroker {
    tx: mpsc::Sender<SeriesMessage>,
}

impl ChannelBroker {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SeriesMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Broker for ChannelBroker {
    async fn publish(&self, key: &str, payload: &str) -> ResultEngine<()> {
        self.tx
            .send(SeriesMessage {
                key: key.to_string(),
                payload: payload.to_string(),
            })
            .await
            .map_err(|_| {
                EngineError::transport("broker.publish", "series channel closed".to_string())
            })?;
        Ok(())
    }
}
