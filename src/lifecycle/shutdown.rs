//! Stop signal for the BumBum API listener.
//!
//! # Design Decisions
//! - `main` holds one handle and the signal task holds a clone; both share a
//!   single channel, so either side can stop the service
//! - On trigger the server stops accepting connections. Requests already
//!   being bound or handled run to completion before `HttpServer::run`
//!   returns
//! - A trigger that nobody hears is dropped silently

use tokio::sync::broadcast;

/// Fires once to stop the API server. Clones share the same channel.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to hand to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop accepting requests. Safe to call before any server subscribed.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Servers that have not yet seen the stop signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
