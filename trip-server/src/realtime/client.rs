//! In-process vehicle position client.
//!
//! A [`VehicleTracker`] owns at most one background task polling a
//! [`PositionSource`] for the current topic set. Changing the shown
//! itinerary swaps the topic set on the running task; an empty set
//! stops it. The tracker keeps the latest position per vehicle for
//! the map to read.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::topic::VehicleTopic;

/// One vehicle's latest reported position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePosition {
    /// Stable vehicle identifier within its feed
    pub vehicle_id: String,
    pub feed_id: String,
    /// Route id without the feed prefix
    pub route: String,
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default)]
    pub direction: Option<u8>,
    /// Trip's first scheduled departure, `HH:MM`
    #[serde(default)]
    pub trip_start_time: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Heading in degrees clockwise from north
    #[serde(default)]
    pub heading: Option<f64>,
    /// Report time, unix seconds
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl VehiclePosition {
    /// Whether this position belongs to a topic. Fields the feed does
    /// not report (direction, start time, trip id) are not held
    /// against it; feed and route always have to match.
    pub fn matches_topic(&self, topic: &VehicleTopic) -> bool {
        match topic {
            VehicleTopic::Fuzzy {
                feed_id,
                route,
                direction,
                trip_start_time,
                ..
            } => {
                self.feed_id == *feed_id
                    && self.route == *route
                    && self.direction.is_none_or(|d| d == *direction)
                    && self
                        .trip_start_time
                        .as_deref()
                        .is_none_or(|t| t == trip_start_time.as_str())
            }
            VehicleTopic::Exact {
                feed_id,
                route,
                trip_id,
            } => {
                self.feed_id == *feed_id
                    && self.route == *route
                    && self.trip_id.as_deref().is_none_or(|t| t == trip_id.as_str())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("position request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid position payload: {message}")]
    Json { message: String },
}

/// Source of vehicle positions for a topic set.
///
/// Boxed futures keep the trait object-safe so the tracker can hold
/// any source behind `Arc<dyn PositionSource>`.
pub trait PositionSource: Send + Sync + 'static {
    fn poll<'a>(
        &'a self,
        topics: &'a [VehicleTopic],
    ) -> BoxFuture<'a, Result<Vec<VehiclePosition>, RealtimeError>>;
}

/// HTTP position source.
///
/// Posts the topic list as JSON and expects an array of
/// [`VehiclePosition`] back.
#[derive(Debug, Clone)]
pub struct HttpPositionSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPositionSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, RealtimeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

impl PositionSource for HttpPositionSource {
    fn poll<'a>(
        &'a self,
        topics: &'a [VehicleTopic],
    ) -> BoxFuture<'a, Result<Vec<VehiclePosition>, RealtimeError>> {
        Box::pin(async move {
            let response = self
                .http
                .post(&self.base_url)
                .json(topics)
                .send()
                .await?
                .error_for_status()?;

            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| RealtimeError::Json {
                message: e.to_string(),
            })
        })
    }
}

/// Instruction for the running poll task.
#[derive(Debug)]
pub enum TrackerCommand {
    SetTopics(Vec<VehicleTopic>),
    Stop,
}

type PositionMap = HashMap<String, VehiclePosition>;

/// Latest position per vehicle id, shared with the poll task.
pub type PositionStore = Arc<Mutex<PositionMap>>;

fn lock_store(store: &PositionStore) -> MutexGuard<'_, PositionMap> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

struct RunningClient {
    topics: Vec<VehicleTopic>,
    commands: mpsc::UnboundedSender<TrackerCommand>,
    task: JoinHandle<()>,
}

/// Owns the single live position subscription.
///
/// `update` is called with the topics of whatever itinerary is shown;
/// it starts, retargets or stops the background task as needed. The
/// previous task is always joined before a new one is spawned, so two
/// subscriptions never overlap.
pub struct VehicleTracker {
    source: Arc<dyn PositionSource>,
    poll_interval: Duration,
    positions: PositionStore,
    running: Option<RunningClient>,
}

impl VehicleTracker {
    pub fn new(source: Arc<dyn PositionSource>, poll_interval: Duration) -> Self {
        Self {
            source,
            poll_interval,
            positions: Arc::new(Mutex::new(HashMap::new())),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Topics the running task is subscribed to.
    pub fn current_topics(&self) -> Option<&[VehicleTopic]> {
        self.running.as_ref().map(|r| r.topics.as_slice())
    }

    /// Latest known positions, ordered by vehicle id.
    pub fn positions(&self) -> Vec<VehiclePosition> {
        let mut positions: Vec<VehiclePosition> =
            lock_store(&self.positions).values().cloned().collect();
        positions.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id));
        positions
    }

    /// Point the subscription at a new topic set.
    ///
    /// An unchanged set (order-insensitive) is a no-op. An empty set
    /// stops the task. Otherwise the running task is retargeted, or a
    /// new one started if none is running or the old one has died.
    pub async fn update(&mut self, topics: Vec<VehicleTopic>) {
        if topics.is_empty() {
            self.stop().await;
            return;
        }
        if let Some(running) = self.running.as_mut() {
            if same_topics(&running.topics, &topics) {
                return;
            }
            running.topics.clone_from(&topics);
            if running
                .commands
                .send(TrackerCommand::SetTopics(topics.clone()))
                .is_ok()
            {
                return;
            }
            // The poll task is gone; join its remains and start over
            self.stop().await;
        }
        self.start(topics);
    }

    /// Stop the running task and wait for it to finish.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.commands.send(TrackerCommand::Stop);
        if running.task.await.is_err() {
            tracing::warn!("vehicle poll task panicked during shutdown");
        }
        lock_store(&self.positions).clear();
    }

    fn start(&mut self, topics: Vec<VehicleTopic>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.poll_interval,
            Arc::clone(&self.positions),
            topics.clone(),
            receiver,
        ));
        self.running = Some(RunningClient {
            topics,
            commands,
            task,
        });
    }
}

fn same_topics(a: &[VehicleTopic], b: &[VehicleTopic]) -> bool {
    a.len() == b.len()
        && a.iter().collect::<HashSet<_>>() == b.iter().collect::<HashSet<_>>()
}

async fn poll_loop(
    source: Arc<dyn PositionSource>,
    poll_interval: Duration,
    positions: PositionStore,
    mut topics: Vec<VehicleTopic>,
    mut commands: mpsc::UnboundedReceiver<TrackerCommand>,
) {
    let mut interval = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(TrackerCommand::SetTopics(new_topics)) => {
                    topics = new_topics;
                    // Old positions may not belong to the new topics
                    lock_store(&positions).clear();
                    interval.reset_immediately();
                }
                Some(TrackerCommand::Stop) | None => return,
            },
            _ = interval.tick() => {
                match source.poll(&topics).await {
                    Ok(batch) => {
                        let mut store = lock_store(&positions);
                        for position in batch {
                            if topics.iter().any(|t| position.matches_topic(t)) {
                                store.insert(position.vehicle_id.clone(), position);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "vehicle position poll failed");
                    }
                }
            }
        }
    }
}
