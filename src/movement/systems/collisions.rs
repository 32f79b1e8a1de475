//! Movement domain: ground detection.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::movement::{GameLayer, MovementState, Player};

const PROBE_DEPTH: f32 = 4.0;
/// Keeps the foot rays off the side walls
const FOOT_INSET: f32 = 2.0;

/// Cast from both feet so standing on a platform edge still counts.
pub(crate) fn detect_ground(
    spatial_query: SpatialQuery,
    mut query: Query<(&Transform, &Collider, &LinearVelocity, &mut MovementState), With<Player>>,
) {
    let filter = SpatialQueryFilter::from_mask(GameLayer::Ground);

    for (transform, collider, velocity, mut state) in &mut query {
        let half = collider
            .shape_scaled()
            .as_cuboid()
            .map(|c| Vec2::new(c.half_extents.x, c.half_extents.y))
            .unwrap_or(Vec2::new(12.0, 24.0));
        let feet = transform.translation.truncate() - Vec2::new(0.0, half.y);
        let inset = (half.x - FOOT_INSET).max(0.0);

        // Rising through a platform's underside is not a landing
        let grounded = velocity.y < 1.0
            && [-inset, inset].into_iter().any(|dx| {
                spatial_query
                    .cast_ray(feet + Vec2::new(dx, 0.0), Dir2::NEG_Y, PROBE_DEPTH, true, &filter)
                    .is_some()
            });

        if grounded && !state.on_ground {
            state.coyote_timer = 0.0;
            debug!("Player landed at {:?}", feet);
        }
        state.on_ground = grounded;
    }
}
