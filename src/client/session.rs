//! Dashboard session: owns the channel lifecycle and the client-local view state.

use futures_util::StreamExt;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::connector::Connector;
use super::history::NetworkHistory;
use super::render::{render_connection_table, render_process_table, render_snapshot};
use super::sort::{ConnectionColumn, ProcessColumn, SortState};
use super::surface::Surface;

/// Fixed delay between a close and the next connect attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// An open channel with no frame for this long is treated as closed.
/// The server pushes every sampling tick and pings every 30 s.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

/// Input from the user, independent of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    SortProcesses(ProcessColumn),
    SortConnections(ConnectionColumn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    Frame(String),
    Disconnected,
    Ui(UiEvent),
}

impl From<UiEvent> for SessionEvent {
    fn from(ev: UiEvent) -> Self {
        SessionEvent::Ui(ev)
    }
}

/// Retries forever with a constant delay.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub idle_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: RECONNECT_DELAY,
            idle_timeout: IDLE_TIMEOUT,
        }
    }
}

/// Everything the dashboard keeps between snapshots. Survives reconnects.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub network_history: NetworkHistory,
    pub process_sort: SortState<ProcessColumn>,
    pub connection_sort: SortState<ConnectionColumn>,
    /// Service names drawn by the last render, so vanished ones can be blanked.
    pub known_services: BTreeSet<String>,
    /// Last snapshot rendered, kept so a sort change can re-render without waiting for a push.
    pub last_frame: Option<Value>,
}

pub struct ClientSession<S> {
    state: SessionState,
    dashboard: DashboardState,
    surface: S,
    frames_received: u64,
    last_generation: Option<u64>,
    connects: u64,
}

impl<S: Surface> ClientSession<S> {
    /// A new session starts in `Connecting`; `run` makes the first attempt immediately.
    pub fn new(surface: S) -> Self {
        Self {
            state: SessionState::Connecting,
            dashboard: DashboardState::default(),
            surface,
            frames_received: 0,
            last_generation: None,
            connects: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn dashboard(&self) -> &DashboardState {
        &self.dashboard
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Snapshots rendered so far, across all connections.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn connects(&self) -> u64 {
        self.connects
    }

    pub fn last_generation(&self) -> Option<u64> {
        self.last_generation
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                self.state = SessionState::Open;
                self.connects += 1;
                // A restarted server numbers its snapshots from 1 again.
                self.last_generation = None;
                info!(connects = self.connects, "channel open");
            }
            SessionEvent::Disconnected => {
                self.state = SessionState::Closed;
                info!("channel closed");
            }
            SessionEvent::Frame(text) => self.on_frame(&text),
            SessionEvent::Ui(UiEvent::SortProcesses(column)) => {
                self.dashboard.process_sort.toggle(column);
                if let Some(root) = &self.dashboard.last_frame {
                    render_process_table(root, &self.dashboard.process_sort, &mut self.surface);
                    self.surface.flush();
                }
            }
            SessionEvent::Ui(UiEvent::SortConnections(column)) => {
                self.dashboard.connection_sort.toggle(column);
                if let Some(root) = &self.dashboard.last_frame {
                    render_connection_table(
                        root,
                        &self.dashboard.connection_sort,
                        &mut self.surface,
                    );
                    self.surface.flush();
                }
            }
        }
    }

    fn on_frame(&mut self, text: &str) {
        let root: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "dropping unparseable frame");
                return;
            }
        };

        let generation = root.get("generation").and_then(Value::as_u64);
        if let (Some(generation), Some(last)) = (generation, self.last_generation)
            && generation <= last
        {
            debug!(generation, last, "dropping stale frame");
            return;
        }

        self.frames_received += 1;
        if generation.is_some() {
            self.last_generation = generation;
        }

        let label = chrono::Local::now().format("%H:%M:%S").to_string();
        let failed = render_snapshot(
            &root,
            &mut self.dashboard.network_history,
            &mut self.dashboard.known_services,
            &self.dashboard.process_sort,
            &self.dashboard.connection_sort,
            &label,
            &mut self.surface,
        );
        if failed > 0 {
            debug!(failed, "snapshot rendered with placeholders");
        }
        self.dashboard.last_frame = Some(root);
    }

    /// Connect, render every pushed frame, and reconnect after `policy.delay` whenever the
    /// channel closes, goes silent for `policy.idle_timeout`, or the attempt fails.
    /// Never returns; UI events are handled in every state.
    pub async fn run<C: Connector>(
        &mut self,
        connector: &mut C,
        policy: &ReconnectPolicy,
        mut ui_events: mpsc::Receiver<UiEvent>,
    ) {
        loop {
            self.state = SessionState::Connecting;
            match connector.connect().await {
                Ok(mut frames) => {
                    self.dispatch(SessionEvent::Connected);
                    let idle = tokio::time::sleep(policy.idle_timeout);
                    tokio::pin!(idle);
                    loop {
                        tokio::select! {
                            next = frames.next() => match next {
                                Some(Ok(text)) => {
                                    idle.as_mut()
                                        .reset(tokio::time::Instant::now() + policy.idle_timeout);
                                    self.dispatch(SessionEvent::Frame(text));
                                }
                                Some(Err(e)) => {
                                    warn!(error = %e, "channel error");
                                    break;
                                }
                                None => break,
                            },
                            _ = &mut idle => {
                                warn!(
                                    idle_secs = policy.idle_timeout.as_secs(),
                                    "no frames received; dropping channel"
                                );
                                break;
                            }
                            Some(ev) = ui_events.recv() => self.dispatch(ev.into()),
                        }
                    }
                    self.dispatch(SessionEvent::Disconnected);
                }
                Err(e) => {
                    self.state = SessionState::Closed;
                    warn!(error = %e, "connect failed");
                }
            }

            debug!(delay_ms = policy.delay.as_millis() as u64, "reconnecting");
            let delay = tokio::time::sleep(policy.delay);
            tokio::pin!(delay);
            loop {
                tokio::select! {
                    _ = &mut delay => break,
                    Some(ev) = ui_events.recv() => self.dispatch(ev.into()),
                }
            }
        }
    }
}
