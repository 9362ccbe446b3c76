//! TCP line broadcaster.
//!
//! Every attached client receives every event as one NDJSON line. Sending
//! never blocks the agent loop and never fails: with no client attached the
//! line is dropped, and a client that falls behind skips what it missed.
//! The latest background event is remembered and replayed to each client
//! as it attaches, so late joiners start with the right scene.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use vtlife_core::Result;

use crate::events::PresentationEvent;

const CHANNEL_CAPACITY: usize = 256;

type Snapshot = Arc<Mutex<Option<String>>>;

/// Fire-and-forget event sink for presentation clients.
pub struct Bridge {
    tx: Option<broadcast::Sender<String>>,
    background: Snapshot,
    local_addr: Option<SocketAddr>,
    accept_task: Option<JoinHandle<()>>,
}

impl Bridge {
    /// Listen on `host:port` and accept clients in the background.
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((host, port)).await?;
        let local_addr = listener.local_addr()?;
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let background = Snapshot::default();
        let accept_task = tokio::spawn(accept_loop(listener, tx.clone(), background.clone()));
        tracing::info!("🔌 Presentation bridge listening on {local_addr}");
        Ok(Self {
            tx: Some(tx),
            background,
            local_addr: Some(local_addr),
            accept_task: Some(accept_task),
        })
    }

    /// A bridge that discards every event.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            background: Snapshot::default(),
            local_addr: None,
            accept_task: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of attached clients.
    pub fn client_count(&self) -> usize {
        self.tx.as_ref().map(|tx| tx.receiver_count()).unwrap_or(0)
    }

    /// Broadcast one event.
    pub fn send(&self, event: &PresentationEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        let is_background = matches!(event, PresentationEvent::Background { .. });
        if tx.receiver_count() == 0 && !is_background {
            return;
        }
        let mut line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("⚠️ Failed to encode presentation event: {e}");
                return;
            }
        };
        line.push('\n');
        if is_background {
            *lock(&self.background) = Some(line.clone());
        }
        // Err only means no client is attached right now.
        let _ = tx.send(line);
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}

fn lock(snapshot: &Snapshot) -> std::sync::MutexGuard<'_, Option<String>> {
    snapshot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn accept_loop(listener: TcpListener, tx: broadcast::Sender<String>, background: Snapshot) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!("🔌 Presentation client connected from {peer}");
                // Subscribe before reading the snapshot so no change slips between them.
                let rx = tx.subscribe();
                let replay = lock(&background).clone();
                tokio::spawn(serve_client(stream, peer, rx, replay));
            }
            Err(e) => tracing::warn!("⚠️ Bridge accept failed: {e}"),
        }
    }
}

async fn serve_client(
    mut stream: TcpStream,
    peer: SocketAddr,
    mut rx: broadcast::Receiver<String>,
    replay: Option<String>,
) {
    if let Some(line) = replay {
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            tracing::debug!("Client {peer} write failed: {e}");
            return;
        }
    }
    loop {
        match rx.recv().await {
            Ok(line) => {
                if let Err(e) = stream.write_all(line.as_bytes()).await {
                    tracing::debug!("Client {peer} write failed: {e}");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("⚠️ Client {peer} lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::info!("🔌 Presentation client {peer} disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::BackgroundMode;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader};

    async fn wait_for_clients(bridge: &Bridge, n: usize) {
        for _ in 0..200 {
            if bridge.client_count() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("client never attached");
    }

    #[tokio::test]
    async fn test_send_without_client_is_silent() {
        let bridge = Bridge::bind("127.0.0.1", 0).await.unwrap();
        assert_eq!(bridge.client_count(), 0);
        bridge.send(&PresentationEvent::TimeUpdate { time: "08:00".into() });
    }

    #[tokio::test]
    async fn test_disabled_bridge_discards() {
        let bridge = Bridge::disabled();
        assert!(!bridge.is_enabled());
        assert!(bridge.local_addr().is_none());
        bridge.send(&PresentationEvent::TimeUpdate { time: "08:00".into() });
    }

    #[tokio::test]
    async fn test_clients_receive_ndjson_lines() {
        let bridge = Bridge::bind("127.0.0.1", 0).await.unwrap();
        let addr = bridge.local_addr().unwrap();
        let stream = TcpStream::connect(addr).await.unwrap();
        wait_for_clients(&bridge, 1).await;

        bridge.send(&PresentationEvent::TimeUpdate { time: "08:00".into() });
        bridge.send(&PresentationEvent::Background { mode: BackgroundMode::Day });

        let mut lines = BufReader::new(stream).lines();
        let first = lines.next_line().await.unwrap().unwrap();
        let second = lines.next_line().await.unwrap().unwrap();
        let first: serde_json::Value = serde_json::from_str(&first).unwrap();
        let second: serde_json::Value = serde_json::from_str(&second).unwrap();
        assert_eq!(first["event"], "time_update");
        assert_eq!(first["time"], "08:00");
        assert_eq!(second["mode"], "day");
    }

    #[tokio::test]
    async fn test_late_client_receives_current_background_first() {
        let bridge = Bridge::bind("127.0.0.1", 0).await.unwrap();
        bridge.send(&PresentationEvent::Background { mode: BackgroundMode::Day });
        bridge.send(&PresentationEvent::Background { mode: BackgroundMode::Evening });

        let stream = TcpStream::connect(bridge.local_addr().unwrap()).await.unwrap();
        wait_for_clients(&bridge, 1).await;
        bridge.send(&PresentationEvent::TimeUpdate { time: "17:05".into() });

        let mut lines = BufReader::new(stream).lines();
        let first: serde_json::Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        let second: serde_json::Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["event"], "background");
        assert_eq!(first["mode"], "evening");
        assert_eq!(second["event"], "time_update");
    }
}
