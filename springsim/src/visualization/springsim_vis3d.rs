use bevy::prelude::*;
use bevy::math::primitives::{Sphere, Cuboid};
use bevy::ecs::system::Local;

use crate::simulation::scenario::Scenario3D;
use crate::simulation::states::{MassPointId, NVec3};

/// Component tagging each sphere with the mass point it shows
#[derive(Component)]
struct MassPointMarker3(pub MassPointId);

/// World-space → screen-space scaling factor for positions and radii
const SCALE3D: f32 = 50.0;

/// Distance of the camera from the origin along +Z
const CAMERA_DISTANCE: f32 = 1500.0;

/// Visual radius of a mass point, in world units
const POINT_RADIUS: f32 = 0.1;

pub fn run_3d(scenario: Scenario3D) {
    ftlog::info!(
        "run_3d: starting Bevy 3D viewer with {} mass points, {} springs",
        scenario.simulation.mass_points().count(),
        scenario.simulation.spring_count()
    );

    App::new()
        .insert_resource(scenario)
        .add_plugins(DefaultPlugins)
        .add_systems(Startup, setup_3d)
        .add_systems(Update, (physics_step_3d, sync_transforms_3d, draw_springs_3d).chain())
        .run();
}

fn to_world(p: &NVec3) -> Vec3 {
    Vec3::new(p.x as f32, p.y as f32, p.z as f32) * SCALE3D
}

/// Startup system: spawn camera, light, axes and one sphere per mass point
fn setup_3d(mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scenario: Res<Scenario3D>,
) {
    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.0)),
            ..Default::default()
        },
        transform: Transform::from_xyz(200.0, 150.0, CAMERA_DISTANCE)
            .looking_at(Vec3::ZERO, Vec3::Y),
        ..Default::default()
    });

    commands.spawn(PointLightBundle {
        point_light: PointLight {
            intensity: 1500.0,
            range: 1000.0,
            ..Default::default()
        },
        transform: Transform::from_xyz(100.0, 100.0, CAMERA_DISTANCE),
        ..Default::default()
    });

    spawn_axes(&mut commands, &mut meshes, &mut materials);

    for (id, position) in scenario.positions() {
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Sphere::new(POINT_RADIUS * SCALE3D).mesh()),
                material: materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 1.0, 1.0),
                    unlit: true,
                    ..Default::default()
                }),
                transform: Transform::from_translation(to_world(&position)),
                ..Default::default()
            },
            MassPointMarker3(id),
        ));
    }
}

/// Per-frame physics tick for the 3D scenario
fn physics_step_3d(mut scenario: ResMut<Scenario3D>) {
    scenario.step();
}

// ========================================================================================
// Mass point colors: anchors red, moving points blue -> white by speed
// ========================================================================================

fn speed_to_color(speed: f32, max_speed: f32) -> Color {
    if max_speed <= 0.0 {
        return Color::srgb(1.0, 1.0, 1.0);
    }
    let t = (speed / max_speed).clamp(0.0, 1.0);
    Color::srgb(t, t, 1.0)
}

#[derive(Default)]
struct SpeedScale {
    smoothed_max: f32,
}

fn sync_transforms_3d(
    scenario: Res<Scenario3D>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(&MassPointMarker3, &mut Transform, &Handle<StandardMaterial>)>,
    mut speed_scale: Local<SpeedScale>,
) {
    let sim = &scenario.simulation;

    let max_speed_frame = sim
        .mass_points()
        .filter_map(|id| sim.mass_point(id))
        .map(|mp| mp.velocity().norm() as f32)
        .fold(0.0_f32, f32::max);

    // EMA so the palette does not flicker
    let alpha = 0.05;
    speed_scale.smoothed_max = (1.0 - alpha) * speed_scale.smoothed_max + alpha * max_speed_frame;
    let v_norm = speed_scale.smoothed_max.max(1e-6);

    for (MassPointMarker3(id), mut transform, mat_handle) in &mut query {
        let Some(mp) = sim.mass_point(*id) else {
            continue;
        };
        transform.translation = to_world(mp.position());

        let color = if mp.is_anchor() {
            Color::srgb(1.0, 0.3, 0.3)
        } else {
            speed_to_color(mp.velocity().norm() as f32, v_norm)
        };
        if let Some(mat) = materials.get_mut(mat_handle) {
            mat.base_color = color;
        }
    }
}

fn draw_springs_3d(scenario: Res<Scenario3D>, mut gizmos: Gizmos) {
    for (a, b) in scenario.segments() {
        gizmos.line(to_world(&a), to_world(&b), Color::srgb(0.6, 0.6, 0.6));
    }
}

// =========================================================================================
// Draw 3D axes for visual reference
// =========================================================================================

fn spawn_axes(commands: &mut Commands, meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) {
    let axis_len = 10.0 * SCALE3D;
    let axis_thickness = 0.009 * SCALE3D;

    let axes = [
        (Cuboid::new(axis_len, axis_thickness, axis_thickness), Color::srgb(1.0, 0.0, 0.0)), // x
        (Cuboid::new(axis_thickness, axis_len, axis_thickness), Color::srgb(0.0, 1.0, 0.0)), // y
        (Cuboid::new(axis_thickness, axis_thickness, axis_len), Color::srgb(0.0, 0.0, 1.0)), // z
    ];

    for (cuboid, color) in axes {
        commands.spawn(PbrBundle {
            mesh: meshes.add(cuboid.mesh()),
            material: materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..Default::default()
            }),
            transform: Transform::from_xyz(0.0, 0.0, 0.0),
            ..Default::default()
        });
    }
}
