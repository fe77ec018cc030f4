//! Viewer registry and the fan-out thread.

use std::io;
use std::thread::{self, JoinHandle};

use civic_core::{Broadcast, Subscription, SubscriptionId};
use civic_engine::EngineEvent;
use civic_grid::GridChanged;
use crossbeam_channel::{select, Receiver, Sender};

use super::Views;
use crate::protocol::ServerMessage;

/// Every connected viewer's outbound queue.
#[derive(Clone, Debug, Default)]
pub struct ViewerHub {
    viewers: Broadcast<ServerMessage>,
}

impl ViewerHub {
    pub fn connect(&self) -> Subscription<ServerMessage> {
        let sub = self.viewers.subscribe();
        tracing::info!(
            target: "civic::server",
            viewers = self.viewers.subscriber_count(),
            "viewer connected"
        );
        sub
    }

    pub fn disconnect(&self, id: SubscriptionId) {
        if self.viewers.unsubscribe(id) {
            tracing::info!(
                target: "civic::server",
                viewers = self.viewers.subscriber_count(),
                "viewer disconnected"
            );
        }
    }

    /// Queue `message` for every viewer. Returns how many received it.
    pub fn broadcast(&self, message: ServerMessage) -> usize {
        self.viewers.publish(message)
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.subscriber_count()
    }
}

/// Thread forwarding grid and engine events to the hub.
///
/// A grid change sends `map_update`; a finished pass sends
/// `vars_update`, `goals_update` and `counters_update`, in that order.
#[derive(Debug)]
pub struct FanOut {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FanOut {
    pub fn spawn(
        views: Views,
        hub: ViewerHub,
        grid_events: Receiver<GridChanged>,
        engine_events: Receiver<EngineEvent>,
    ) -> io::Result<Self> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let thread = thread::Builder::new()
            .name("civic-fanout".into())
            .spawn(move || run(&views, &hub, &grid_events, &engine_events, &stop_rx))?;
        Ok(Self {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub fn stop(&mut self) {
        // Dropping the sender wakes the thread.
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!(target: "civic::server", "fan-out thread panicked");
            }
        }
    }
}

impl Drop for FanOut {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    views: &Views,
    hub: &ViewerHub,
    grid_events: &Receiver<GridChanged>,
    engine_events: &Receiver<EngineEvent>,
    stop: &Receiver<()>,
) {
    loop {
        select! {
            recv(grid_events) -> msg => match msg {
                Ok(_) => {
                    hub.broadcast(views.map_update());
                }
                Err(_) => break,
            },
            recv(engine_events) -> msg => match msg {
                Ok(EngineEvent::Updated(snapshot)) => {
                    let sent = views
                        .after_pass(&snapshot)
                        .into_iter()
                        .map(|m| hub.broadcast(m))
                        .max()
                        .unwrap_or(0);
                    tracing::trace!(
                        target: "civic::server",
                        pass = %snapshot.pass,
                        viewers = sent,
                        "pass fanned out"
                    );
                }
                Err(_) => break,
            },
            recv(stop) -> _ => break,
        }
    }
}
