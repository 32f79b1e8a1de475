//! Camera domain: boss-fight framing state machine.
//!
//! The director never touches the camera itself. `tick` returns the pose the
//! camera should take this frame and the systems write it.

use bevy::prelude::*;

use crate::camera::resources::CameraTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Normal,
    Transitioning,
    BossFight,
}

/// Position and orthographic scale of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec2,
    pub scale: f32,
}

/// World positions the boss framing blends between. Any may be missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowTargets {
    pub player: Option<Vec2>,
    pub boss: Option<Vec2>,
    pub anchor: Option<Vec2>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CameraDirector {
    mode: CameraMode,
    /// 0 is the original framing, 1 is full boss framing
    progress: f32,
    entering: bool,
    original: Option<CameraPose>,
    pose: Option<CameraPose>,
    /// Aggro came back while easing out; re-enter once the exit lands
    resume_after_exit: bool,
}

impl CameraDirector {
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    #[cfg(test)]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[cfg(test)]
    pub fn original(&self) -> Option<CameraPose> {
        self.original
    }

    /// True while boss framing is on or easing in.
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        match self.mode {
            CameraMode::Normal => false,
            CameraMode::Transitioning => self.entering,
            CameraMode::BossFight => true,
        }
    }

    /// Start easing into boss framing, caching `current` for the way back.
    /// No-op if already active or mid-transition. A request during the exit
    /// is remembered and replayed when the exit completes.
    pub fn activate(&mut self, current: CameraPose) -> bool {
        if self.mode != CameraMode::Normal {
            if self.mode == CameraMode::Transitioning && !self.entering {
                self.resume_after_exit = true;
            }
            return false;
        }

        self.mode = CameraMode::Transitioning;
        self.entering = true;
        self.progress = 0.0;
        self.original = Some(current);
        self.pose = Some(current);
        true
    }

    /// Ease back to the cached original framing.
    pub fn deactivate(&mut self) -> bool {
        self.resume_after_exit = false;
        match self.mode {
            CameraMode::Normal => false,
            CameraMode::Transitioning if !self.entering => false,
            _ => {
                self.mode = CameraMode::Transitioning;
                self.entering = false;
                true
            }
        }
    }

    /// Immediately snap back to the cached original. Returns the pose to
    /// apply, if one was cached.
    pub fn restore_original(&mut self) -> Option<CameraPose> {
        let original = self.original.take();
        self.mode = CameraMode::Normal;
        self.progress = 0.0;
        self.entering = false;
        self.pose = None;
        original
    }

    /// Forget everything, including the cached original.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance the director by one frame.
    /// Returns the pose to write, or `None` in normal mode.
    pub fn tick(
        &mut self,
        dt: f32,
        tuning: &CameraTuning,
        targets: FollowTargets,
    ) -> Option<CameraPose> {
        let original = match (self.mode, self.original) {
            (CameraMode::Normal, _) | (_, None) => return None,
            (_, Some(original)) => original,
        };

        let last = self.pose.unwrap_or(original);
        let focus = follow_point(targets, tuning).unwrap_or(last.position);
        let boss_scale = original.scale * tuning.boss_zoom_scale;

        let pose = match self.mode {
            CameraMode::BossFight => {
                let blend = 1.0 - (-tuning.follow_sharpness.max(0.0) * dt).exp();
                CameraPose {
                    position: last.position.lerp(focus, blend),
                    scale: boss_scale,
                }
            }
            _ => {
                let step = if tuning.transition_duration > 0.0 {
                    dt / tuning.transition_duration
                } else {
                    1.0
                };
                let direction = if self.entering { 1.0 } else { -1.0 };
                self.progress = (self.progress + step * direction).clamp(0.0, 1.0);

                let t = ease_in_out(self.progress);
                let pose = CameraPose {
                    position: original.position.lerp(focus, t),
                    scale: original.scale + (boss_scale - original.scale) * t,
                };

                if self.entering && self.progress >= 1.0 {
                    self.mode = CameraMode::BossFight;
                } else if !self.entering && self.progress <= 0.0 {
                    self.pose = None;
                    if std::mem::take(&mut self.resume_after_exit) {
                        self.entering = true;
                    } else {
                        self.mode = CameraMode::Normal;
                        self.original = None;
                    }
                    return Some(original);
                }
                pose
            }
        };

        self.pose = Some(pose);
        Some(pose)
    }
}

/// Weighted blend of player and boss, tethered to the anchor.
pub fn follow_point(targets: FollowTargets, tuning: &CameraTuning) -> Option<Vec2> {
    let weight = tuning.player_weight.clamp(0.0, 1.0);
    let point = match (targets.player, targets.boss) {
        (Some(player), Some(boss)) => boss.lerp(player, weight),
        (Some(player), None) => player,
        (None, Some(boss)) => boss,
        (None, None) => return None,
    };

    Some(match targets.anchor {
        Some(anchor) => anchor + (point - anchor).clamp_length_max(tuning.max_anchor_distance),
        None => point,
    })
}

fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
