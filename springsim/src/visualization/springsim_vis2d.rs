use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use bevy::math::primitives::Circle;

use crate::simulation::scenario::Scenario;
use crate::simulation::states::{MassPointId, NVec};

#[derive(Component)]
struct MassPointMarker(pub MassPointId);

const SCALE: f32 = 50.0;
const POINT_RADIUS: f32 = 0.1;

/// Bevy viewer for 1-D and 2-D scenarios. 1-D points sit on the x axis.
pub fn run_2d<const D: usize>(scenario: Scenario<D>) {
    ftlog::info!(
        "run_2d: starting Bevy 2D viewer with {} mass points",
        scenario.simulation.mass_points().count()
    );

    App::new()
        .insert_resource(scenario)
        .add_plugins(DefaultPlugins)
        .add_systems(Startup, setup_points_system::<D>)
        .add_systems(Update, (physics_step_system::<D>, sync_transforms_system::<D>, draw_springs_system::<D>).chain())
        .run();
}

fn to_screen<const D: usize>(p: &NVec<D>) -> Vec2 {
    let x = p[0] as f32 * SCALE;
    let y = if D > 1 { p[1] as f32 * SCALE } else { 0.0 };
    Vec2::new(x, y)
}

fn setup_points_system<const D: usize>(
    mut commands: Commands,
    scenario: Res<Scenario<D>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2dBundle::default());

    for (id, position) in scenario.positions() {
        let anchored = scenario.simulation.mass_point(id).is_some_and(|mp| mp.is_anchor());
        let color = if anchored { Color::srgb(1.0, 0.3, 0.3) } else { Color::WHITE };
        let screen = to_screen(&position);

        commands.spawn((
            MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(Circle::new(POINT_RADIUS * SCALE))),
                material: materials.add(ColorMaterial::from(color)),
                transform: Transform::from_xyz(screen.x, screen.y, 0.0),
                ..Default::default()
            },
            MassPointMarker(id),
        ));
    }
}

fn physics_step_system<const D: usize>(mut scenario: ResMut<Scenario<D>>) {
    scenario.step();
}

fn sync_transforms_system<const D: usize>(scenario: Res<Scenario<D>>, mut query: Query<(&MassPointMarker, &mut Transform)>) {
    for (MassPointMarker(id), mut transform) in &mut query {
        if let Some(mp) = scenario.simulation.mass_point(*id) {
            let screen = to_screen(mp.position());
            transform.translation.x = screen.x;
            transform.translation.y = screen.y;
        }
    }
}

fn draw_springs_system<const D: usize>(scenario: Res<Scenario<D>>, mut gizmos: Gizmos) {
    for (a, b) in scenario.segments() {
        gizmos.line_2d(to_screen(&a), to_screen(&b), Color::srgb(0.6, 0.6, 0.6));
    }
}
