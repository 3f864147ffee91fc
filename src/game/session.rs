//! One game session: the state machine driven by transport events.
//!
//! A `Session` is created for every connection attempt and owns all of its
//! mutable state, so nothing carries over between attempts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::chat::ChatPipeline;
use crate::common::types::Position;
use crate::protocol::transport::{Connection, Outbound, TransportEvent};
use crate::relay::Relay;

/// Keep-alive rotation period.
pub const KEEP_ALIVE_PERIOD: Duration = Duration::from_millis(50);

/// Degrees added to the yaw on every keep-alive tick.
pub const KEEP_ALIVE_YAW_STEP: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The connection is gone; the caller may reconnect.
    Disconnected(String),
    /// The process is shutting down.
    Shutdown,
}

/// Per-server settings shared by every session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Chat lines sent once after joining.
    pub greeting: Vec<String>,
    pub keep_alive: bool,
    pub keep_alive_period: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            greeting: Vec::new(),
            keep_alive: true,
            keep_alive_period: KEEP_ALIVE_PERIOD,
        }
    }
}

/// Everything a session needs besides its connection.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub settings: Arc<SessionSettings>,
    pub pipeline: Arc<ChatPipeline>,
    pub relay: Relay,
}

pub struct Session {
    connection: Connection,
    context: SessionContext,
    state: SessionState,
    need_greeting: bool,
    need_keep_alive: bool,
    position: Option<Position>,
    keep_alive: Option<Interval>,
}

impl Session {
    /// Create a session for a connection attempt that has just started.
    pub fn new(connection: Connection, context: SessionContext) -> Self {
        Self {
            connection,
            context,
            state: SessionState::Connecting,
            need_greeting: true,
            need_keep_alive: true,
            position: None,
            keep_alive: None,
        }
    }

    /// Process events until the connection ends or shutdown is requested.
    ///
    /// Dropping the session on return closes the connection and cancels the
    /// keep-alive timer.
    pub async fn run(mut self, shutdown_rx: &mut watch::Receiver<bool>) -> SessionOutcome {
        loop {
            tokio::select! {
                event = self.connection.events.recv() => {
                    let event = event
                        .unwrap_or_else(|| TransportEvent::Closed("transport stopped".to_string()));
                    if let Some(reason) = self.handle_event(event) {
                        return SessionOutcome::Disconnected(reason);
                    }
                }

                _ = next_tick(&mut self.keep_alive) => {
                    self.on_keep_alive_tick();
                }

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Shutdown requested, closing session");
                        self.disconnect();
                        return SessionOutcome::Shutdown;
                    }
                }
            }
        }
    }

    /// Apply one transport event. Returns the reason if the session ended.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<String> {
        match event {
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Error(message) => match self.state {
                SessionState::Connected => {
                    error!("Connection error: {}", message);
                    self.disconnect();
                    return Some(message);
                }
                _ => warn!("Connection error: {}", message),
            },
            TransportEvent::Closed(reason) => {
                if self.state != SessionState::Disconnected {
                    info!("Disconnected: {}", reason);
                    self.disconnect();
                }
                return Some(reason);
            }
            TransportEvent::Chat(raw) => {
                if self.state == SessionState::Connected {
                    if let Some(text) = self.context.pipeline.process(raw.as_bytes()) {
                        self.context.relay.publish(&text);
                    }
                } else {
                    debug!("Ignoring chat while {:?}", self.state);
                }
            }
            TransportEvent::Position(position) => {
                if self.state == SessionState::Connected {
                    self.on_position(position);
                } else {
                    debug!("Ignoring position while {:?}", self.state);
                }
            }
        }
        None
    }

    fn on_connected(&mut self) {
        if self.state == SessionState::Connected {
            debug!("Already connected");
            return;
        }
        self.state = SessionState::Connected;
        info!("Connected, relaying to {}", self.context.relay.channel());

        if self.need_greeting {
            self.need_greeting = false;
            for line in &self.context.settings.greeting {
                debug!(">>> {}", line);
                self.send(Outbound::Chat(line.clone()));
            }
        }
    }

    fn on_position(&mut self, position: Position) {
        self.position = Some(position);
        self.send(Outbound::Position(position));

        if self.need_keep_alive && self.context.settings.keep_alive {
            self.need_keep_alive = false;
            let period = self.context.settings.keep_alive_period;
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.keep_alive = Some(interval);
            debug!("Keep-alive started ({:?})", period);
        }
    }

    fn on_keep_alive_tick(&mut self) {
        if self.state != SessionState::Connected {
            self.keep_alive = None;
            return;
        }
        if let Some(position) = self.position.as_mut() {
            position.yaw = (position.yaw + KEEP_ALIVE_YAW_STEP).rem_euclid(360.0);
            let position = *position;
            self.send(Outbound::Position(position));
        }
    }

    /// Leave the current state for Disconnected. The keep-alive timer is
    /// cancelled in the same step.
    fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        self.keep_alive = None;
    }

    fn send(&self, outbound: Outbound) {
        if self.connection.outbound.send(outbound).is_err() {
            debug!("Transport closed, outbound packet dropped");
        }
    }
}

#[cfg(test)]
impl Session {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn keep_alive_running(&self) -> bool {
        self.keep_alive.is_some()
    }
}

async fn next_tick(keep_alive: &mut Option<Interval>) -> Instant {
    match keep_alive {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}
