//! Device location tracking
//!
//! A spawned task pumps position updates from a [`LocationSource`] into the
//! shared [`LocationState`]. The first fix of each tracking session moves
//! the map camera; later fixes only update the position. Any error switches
//! the UI to manual mode (search or click the map).

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shared::Coordinate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::external::location::{LocationError, LocationSource, PositionOptions, WatchId};
use crate::external::map::MapSurface;

/// Advisory position shared by the tracker and the place resolver.
/// The last writer wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LocationState {
    pub position: Option<Coordinate>,
    /// Automatic location is unavailable; the user must search or click
    pub manual_mode: bool,
}

pub type SharedLocation = Arc<watch::Sender<LocationState>>;

pub fn shared_location() -> SharedLocation {
    let (sender, _) = watch::channel(LocationState::default());
    Arc::new(sender)
}

/// Single-use trigger for the initial camera move
#[derive(Debug)]
struct FlyToLatch {
    armed: bool,
}

impl FlyToLatch {
    fn armed() -> Self {
        Self { armed: true }
    }

    fn take(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }
}

pub struct GeoTracker {
    source: Arc<dyn LocationSource>,
    map: Arc<dyn MapSurface>,
    location: SharedLocation,
    zoom: u8,
}

impl GeoTracker {
    pub fn new(
        source: Arc<dyn LocationSource>,
        map: Arc<dyn MapSurface>,
        location: SharedLocation,
        zoom: u8,
    ) -> Self {
        Self {
            source,
            map,
            location,
            zoom,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.location.subscribe()
    }

    pub fn location(&self) -> LocationState {
        *self.location.borrow()
    }

    /// Subscribe to continuous position updates.
    ///
    /// Must be called from within a tokio runtime. The returned handle ends
    /// the subscription on `stop()` or when dropped.
    pub fn start_tracking<U, E>(
        &self,
        on_update: U,
        on_error: E,
        options: PositionOptions,
    ) -> TrackingHandle
    where
        U: Fn(LocationState) + Send + 'static,
        E: Fn(&LocationError) + Send + 'static,
    {
        if !self.source.is_supported() {
            warn!("Location services unsupported; staying in manual mode");
            self.location.send_modify(|s| s.manual_mode = true);
            on_error(&LocationError::Unsupported);
            return TrackingHandle::inactive();
        }

        let watch = match self.source.watch_position(options) {
            Ok(watch) => watch,
            Err(e) => {
                warn!(error = %e, "Could not start location watch");
                self.location.send_modify(|s| s.manual_mode = true);
                on_error(&e);
                return TrackingHandle::inactive();
            }
        };

        let watch_id = watch.id;
        let mut updates = watch.updates;
        let location = Arc::clone(&self.location);
        let map = Arc::clone(&self.map);
        let zoom = self.zoom;
        info!(watch_id, ?options, "Location tracking started");

        let task = tokio::spawn(async move {
            let mut fly_to = FlyToLatch::armed();

            while let Some(update) = updates.recv().await {
                match update {
                    Ok(coordinate) => {
                        location.send_modify(|s| {
                            s.position = Some(coordinate);
                            s.manual_mode = false;
                        });
                        if fly_to.take() {
                            debug!(%coordinate, zoom, "Centering map on first fix");
                            map.fly_to(coordinate, zoom);
                        }
                        let state = *location.borrow();
                        on_update(state);
                    }
                    Err(e) => {
                        warn!(error = %e, "Location update failed; switching to manual mode");
                        location.send_modify(|s| s.manual_mode = true);
                        on_error(&e);
                    }
                }
            }
            debug!(watch_id, "Location update stream closed");
        });

        TrackingHandle {
            source: Some(Arc::clone(&self.source)),
            watch_id: Some(watch_id),
            task: Some(task),
        }
    }

    /// One best-effort fix ("locate me"). Success re-centres the map.
    pub async fn get_once(&self, options: PositionOptions) -> AppResult<Coordinate> {
        let result = if !self.source.is_supported() {
            Err(LocationError::Unsupported)
        } else if options.timeout_ms > 0 {
            tokio::time::timeout(
                Duration::from_millis(options.timeout_ms),
                self.source.current_position(options),
            )
            .await
            .unwrap_or(Err(LocationError::Timeout))
        } else {
            self.source.current_position(options).await
        };

        match result {
            Ok(coordinate) => {
                self.location.send_modify(|s| {
                    s.position = Some(coordinate);
                    s.manual_mode = false;
                });
                self.map.fly_to(coordinate, self.zoom);
                info!(%coordinate, "Located device");
                Ok(coordinate)
            }
            Err(e) => {
                warn!(error = %e, "One-shot location failed; switching to manual mode");
                self.location.send_modify(|s| s.manual_mode = true);
                Err(e.into())
            }
        }
    }
}

/// Scoped tracking subscription
pub struct TrackingHandle {
    source: Option<Arc<dyn LocationSource>>,
    watch_id: Option<WatchId>,
    task: Option<JoinHandle<()>>,
}

impl TrackingHandle {
    fn inactive() -> Self {
        Self {
            source: None,
            watch_id: None,
            task: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// End the subscription. Dropping the handle does the same.
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let (Some(source), Some(id)) = (self.source.take(), self.watch_id.take()) {
            source.clear_watch(id);
            debug!(watch_id = id, "Location tracking stopped");
        }
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.release();
    }
}
