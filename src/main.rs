mod camera;
mod combat;
mod content;
mod core;
#[cfg(feature = "dev-tools")]
mod debug;
mod movement;

use avian2d::prelude::*;
use bevy::prelude::*;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Cinder Warden".to_string(),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(PhysicsPlugins::default())
    .add_plugins((
        content::ContentPlugin,
        core::CorePlugin,
        movement::MovementPlugin,
        combat::CombatPlugin,
        camera::CameraPlugin,
    ));

    #[cfg(feature = "dev-tools")]
    app.add_plugins(debug::DebugPlugin);

    app.run();
}
