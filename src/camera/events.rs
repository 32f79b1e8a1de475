//! Camera domain: hard-reset requests for error recovery.

use bevy::ecs::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    /// Snap back to the framing cached before the fight
    RestoreOriginal,
    /// Drop all director state and the zoom
    Reset,
}

impl Message for CameraCommand {}
