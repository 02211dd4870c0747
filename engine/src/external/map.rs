//! Map rendering surface seam

use std::sync::Arc;

use shared::Coordinate;

/// Callback invoked with the geographic position of a map click
pub type ClickListener = Arc<dyn Fn(Coordinate) + Send + Sync>;

/// Registration handle returned by [`MapSurface::on_click`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The interactive map the UI layer renders.
///
/// Implementations must not invoke a listener after `off_click` returns for
/// its id, but a click already dispatched may still arrive late.
pub trait MapSurface: Send + Sync {
    /// Animate the camera to `target` at `zoom`
    fn fly_to(&self, target: Coordinate, zoom: u8);

    fn on_click(&self, listener: ClickListener) -> ListenerId;

    fn off_click(&self, id: ListenerId);
}
