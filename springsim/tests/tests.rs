use approx::{assert_abs_diff_eq, assert_relative_eq};
use test_case::test_case;

use springsim::simulation::directional::rotation_between;
use springsim::simulation::forces::{linear_spring_force, HingeInput};
use springsim::{
    AngledSpring, DirSpring, EulerSolver, Integrator, IntegratorKind, LeapFrogSolver, MassPoint, MassPointId, NVec1,
    NVec2, NVec3, Simulation, Solver, Spring, SpringId,
};

use nalgebra::Vector3;

/// Build a 2-D simulation with two free points `dist` apart on the x-axis
pub fn two_point_system(dist: f64, rest_length: f64) -> (Simulation<2>, MassPointId, MassPointId, SpringId) {
    let mut sim = Simulation::<2>::new();
    sim.set_damping(0.0);
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(-dist / 2.0, 0.0)));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(dist / 2.0, 0.0)));
    let s = sim
        .add_spring(Spring::new(a, b).with_rest_length(rest_length))
        .expect("both endpoints exist");
    (sim, a, b, s)
}

/// Build a 3-D chain through `points`, anchored at the first one.
/// Every spring is directional with rest direction +x.
pub fn chain_3d(points: &[NVec3], dir_stiffness: f64) -> (Simulation<3>, Vec<MassPointId>, Vec<SpringId>) {
    let mut sim = Simulation::<3>::new();
    sim.set_damping(0.0);
    let ids: Vec<MassPointId> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mass = if i == 0 { 0.0 } else { 1.0 };
            sim.create_mass_point(MassPoint::new(mass, *p))
        })
        .collect();
    let springs = ids
        .windows(2)
        .map(|pair| {
            sim.connect_directional(pair[0], pair[1], DirSpring::new(NVec3::x(), dir_stiffness))
                .expect("chain endpoints exist")
        })
        .collect();
    (sim, ids, springs)
}

fn force_of<const D: usize>(sim: &Simulation<D>, id: MassPointId) -> springsim::NVec<D> {
    *sim.mass_point(id).expect("mass point exists").force()
}

fn position_of<const D: usize>(sim: &Simulation<D>, id: MassPointId) -> springsim::NVec<D> {
    *sim.mass_point(id).expect("mass point exists").position()
}

// ==================================================================================
// Mass point tests
// ==================================================================================

#[test]
fn add_force_accumulates() {
    let mut mp = MassPoint::new(2.0, NVec3::zeros());
    mp.add_force(&NVec3::new(1.0, 0.0, 0.0));
    mp.add_force(&NVec3::new(0.5, -1.0, 2.0));
    assert_relative_eq!(*mp.force(), NVec3::new(1.5, -1.0, 2.0));
}

#[test]
fn commit_copies_state_and_clears_force() {
    let mut mp = MassPoint::new(1.0, NVec2::new(1.0, 2.0));
    mp.add_force(&NVec2::new(3.0, 4.0));
    mp.set_velocity(NVec2::new(0.5, 0.5));
    mp.commit();

    assert_eq!(*mp.force(), NVec2::zeros());
    assert_eq!(mp.backup_position(), mp.position());
    assert_eq!(mp.backup_velocity(), mp.velocity());
}

#[test_case(0.0, true ; "zero mass is an anchor")]
#[test_case(-1.0, true ; "negative mass is an anchor")]
#[test_case(1e-6, false ; "tiny mass moves")]
fn anchor_by_mass(mass: f64, anchored: bool) {
    assert_eq!(MassPoint::new(mass, NVec1::zeros()).is_anchor(), anchored);
}

// ==================================================================================
// Linear spring tests
// ==================================================================================

#[test]
fn default_spring_parameters() {
    let (sim, _, _, s) = {
        let mut sim = Simulation::<3>::new();
        let a = sim.create_mass_point(MassPoint::new(1.0, NVec3::zeros()));
        let b = sim.create_mass_point(MassPoint::new(1.0, NVec3::new(0.0, 3.0, 4.0)));
        let s = sim.connect(a, b).expect("both endpoints exist");
        (sim, a, b, s)
    };
    let spring = sim.spring(s).expect("spring exists");
    assert_relative_eq!(spring.stiffness(), 0.9);
    assert_relative_eq!(spring.damping(), 0.9);
    assert_relative_eq!(spring.rest_length(), 5.0);
    assert_relative_eq!(spring.length(), 5.0);
    assert_relative_eq!(*spring.direction(), NVec3::new(0.0, 0.6, 0.8), epsilon = 1e-12);
}

#[test]
fn zero_stiffness_leaves_forces_unchanged() {
    let (mut sim, a, b, s) = two_point_system(3.0, 1.0);
    sim.spring_mut(s).expect("spring exists").set_stiffness(0.0);
    sim.mass_point_mut(b).expect("mass point exists").set_velocity(NVec2::new(5.0, 1.0));
    sim.mass_point_mut(a).expect("mass point exists").add_force(&NVec2::new(0.25, -0.5));

    sim.refresh_springs();
    sim.apply_linear_spring_forces();

    assert_eq!(force_of(&sim, a), NVec2::new(0.25, -0.5));
    assert_eq!(force_of(&sim, b), NVec2::zeros());
}

#[test]
fn rest_length_gives_no_force() {
    let (mut sim, a, b, _) = two_point_system(2.0, 2.0);
    sim.refresh_springs();
    sim.apply_linear_spring_forces();

    assert_abs_diff_eq!(force_of(&sim, a), NVec2::zeros(), epsilon = 1e-12);
    assert_abs_diff_eq!(force_of(&sim, b), NVec2::zeros(), epsilon = 1e-12);
}

#[test]
fn stretched_spring_pulls_points_together() {
    let (mut sim, a, b, _) = two_point_system(3.0, 1.0);
    sim.refresh_springs();
    sim.apply_linear_spring_forces();

    // F = dir * k * (length - rest) = (1, 0) * 0.9 * 2
    assert_relative_eq!(force_of(&sim, a), NVec2::new(1.8, 0.0), epsilon = 1e-12);
    assert_relative_eq!(force_of(&sim, b), NVec2::new(-1.8, 0.0), epsilon = 1e-12);
}

#[test_case(0.5, NVec2::new(0.0, 0.0), NVec2::new(1.0, -2.0) ; "compressed and moving apart")]
#[test_case(3.0, NVec2::new(0.3, 0.1), NVec2::new(-0.7, 2.0) ; "stretched and closing")]
#[test_case(1.0, NVec2::new(-4.0, 0.0), NVec2::new(4.0, 0.0) ; "at rest with relative velocity")]
fn spring_forces_are_equal_and_opposite(dist: f64, v1: NVec2, v2: NVec2) {
    let (mut sim, a, b, _) = two_point_system(dist, 1.0);
    sim.mass_point_mut(a).expect("mass point exists").set_velocity(v1);
    sim.mass_point_mut(b).expect("mass point exists").set_velocity(v2);

    sim.refresh_springs();
    sim.apply_linear_spring_forces();

    assert_eq!(force_of(&sim, a), -force_of(&sim, b));
}

#[test]
fn linear_force_includes_relative_velocity_damping() {
    let f = linear_spring_force(
        &NVec2::new(1.0, 0.0),
        1.0,
        1.0,
        0.9,
        0.5,
        &NVec2::new(0.0, 0.0),
        &NVec2::new(0.0, 2.0),
    );
    assert_relative_eq!(f, NVec2::new(0.0, 1.0));
}

#[test]
fn refresh_is_idempotent() {
    let (mut sim, _, b, s) = two_point_system(2.0, 1.0);
    sim.mass_point_mut(b).expect("mass point exists").set_position(NVec2::new(0.3, 1.7));

    sim.refresh_springs();
    let first = sim.spring(s).expect("spring exists").clone();
    sim.refresh_springs();
    let second = sim.spring(s).expect("spring exists");

    assert_eq!(first.length(), second.length());
    assert_eq!(first.direction(), second.direction());
}

#[test]
fn coincident_points_have_zero_direction() {
    let mut sim = Simulation::<3>::new();
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec3::new(1.0, 1.0, 1.0)));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec3::new(1.0, 1.0, 1.0)));
    let s = sim.connect(a, b).expect("both endpoints exist");

    let spring = sim.spring(s).expect("spring exists");
    assert_eq!(spring.length(), 0.0);
    assert_eq!(*spring.direction(), NVec3::zeros());
}

// ==================================================================================
// Angled spring tests
// ==================================================================================

#[test]
fn planar_angle_follows_direction() {
    let mut sim = Simulation::<2>::new();
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(0.0, 2.0)));
    let s = sim
        .connect_angled(a, b, AngledSpring::planar(std::f64::consts::FRAC_PI_4, 1.0))
        .expect("both endpoints exist");

    let spring = sim.spring(s).expect("spring exists");
    assert_relative_eq!(spring.current_angle1(), std::f64::consts::FRAC_PI_2);
    assert_eq!(spring.current_angle2(), 0.0);
    assert_relative_eq!(spring.relative_angle1().expect("angled"), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
    assert!(sim.angled_springs().any(|id| id == s));
}

#[test_case(NVec3::new(0.0, 0.0, 1.0), 0.0 ; "along z")]
#[test_case(NVec3::new(1.0, 0.0, 0.0), std::f64::consts::FRAC_PI_2 ; "in plane")]
#[test_case(NVec3::new(0.0, 0.0, -3.0), std::f64::consts::PI ; "against z")]
fn polar_angle_in_3d(tip: NVec3, expected: f64) {
    let mut sim = Simulation::<3>::new();
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec3::zeros()));
    let b = sim.create_mass_point(MassPoint::new(1.0, tip));
    let s = sim.connect_angled(a, b, AngledSpring::default()).expect("both endpoints exist");

    assert_relative_eq!(sim.spring(s).expect("spring exists").current_angle2(), expected, epsilon = 1e-12);
}

#[test]
fn angled_springs_apply_only_linear_forces() {
    let mut plain = Simulation::<2>::new();
    let mut angled = Simulation::<2>::new();
    for sim in [&mut plain, &mut angled] {
        sim.set_damping(0.0);
    }

    let pa = plain.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    let pb = plain.create_mass_point(MassPoint::new(1.0, NVec2::new(1.0, 1.0)));
    plain.add_spring(Spring::new(pa, pb).with_rest_length(0.5));

    let aa = angled.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    let ab = angled.create_mass_point(MassPoint::new(1.0, NVec2::new(1.0, 1.0)));
    angled.add_spring(Spring::angled(aa, ab, AngledSpring::planar(0.0, 10.0)).with_rest_length(0.5));

    let solver = LeapFrogSolver::new(0.1);
    plain.step(&solver);
    angled.step(&solver);

    assert_eq!(position_of(&plain, pb), position_of(&angled, ab));
}

// ==================================================================================
// Integrator tests
// ==================================================================================

fn free_fall<S: Solver>(solver: &S) -> (NVec2, NVec2) {
    let mut sim = Simulation::<2>::new();
    sim.set_gravity(NVec2::new(0.0, -9.8));
    sim.set_damping(0.0);
    let p = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(2.0, 5.0)));
    sim.add_mass_point(p);

    sim.step(solver);

    let mp = sim.mass_point(p).expect("mass point exists");
    (*mp.position() - NVec2::new(2.0, 5.0), *mp.velocity())
}

#[test]
fn leapfrog_uses_new_velocity_for_position() {
    let (offset, velocity) = free_fall(&LeapFrogSolver::new(0.1));
    assert_relative_eq!(velocity, NVec2::new(0.0, -0.98), epsilon = 1e-12);
    assert_relative_eq!(offset, NVec2::new(0.0, -0.098), epsilon = 1e-12);
}

#[test]
fn euler_uses_old_velocity_for_position() {
    let (offset, velocity) = free_fall(&EulerSolver::new(0.1));
    assert_relative_eq!(velocity, NVec2::new(0.0, -0.98), epsilon = 1e-12);
    assert_relative_eq!(offset, NVec2::zeros(), epsilon = 1e-12);
}

#[test_case(IntegratorKind::Euler ; "euler")]
#[test_case(IntegratorKind::LeapFrog ; "leapfrog")]
fn runtime_integrator_matches_solver(kind: IntegratorKind) {
    let integrator = Integrator::new(kind, 0.1);
    let expected = match kind {
        IntegratorKind::Euler => free_fall(&EulerSolver::new(0.1)),
        IntegratorKind::LeapFrog => free_fall(&LeapFrogSolver::new(0.1)),
    };
    assert_eq!(free_fall(&integrator), expected);
    assert_eq!(integrator.kind(), kind);
}

#[test]
fn massless_point_never_moves() {
    let mut sim = Simulation::<2>::new();
    sim.set_gravity(NVec2::new(0.0, -9.8));
    let anchor = sim.create_mass_point(MassPoint::anchor(NVec2::new(1.0, 1.0)));
    sim.add_mass_point(anchor);
    sim.add_external_force(anchor, NVec2::new(1e300, -1e300));
    sim.mass_point_mut(anchor).expect("mass point exists").add_force(&NVec2::new(f64::INFINITY, 0.0));

    sim.step(&LeapFrogSolver::new(0.1));

    assert_eq!(position_of(&sim, anchor), NVec2::new(1.0, 1.0));
    assert_eq!(*sim.mass_point(anchor).expect("mass point exists").velocity(), NVec2::zeros());
}

#[test]
fn non_finite_force_is_ignored() {
    let mut sim = Simulation::<2>::new();
    sim.set_damping(0.0);
    let p = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(0.0, 0.0)).with_velocity(NVec2::new(1.0, 0.0)));
    sim.add_mass_point(p);
    sim.mass_point_mut(p).expect("mass point exists").set_force(NVec2::new(f64::NAN, f64::NEG_INFINITY));

    sim.integrate(&LeapFrogSolver::new(0.1));

    let mp = sim.mass_point(p).expect("mass point exists");
    assert!(mp.position().iter().all(|c| c.is_finite()));
    assert!(mp.velocity().iter().all(|c| c.is_finite()));
    assert_relative_eq!(*mp.position(), NVec2::new(0.1, 0.0), epsilon = 1e-12);
}

#[test]
fn overflowing_result_keeps_previous_value() {
    let mut sim = Simulation::<1>::new();
    sim.set_damping(0.0);
    let p = sim.create_mass_point(MassPoint::new(1e-300, NVec1::new(4.0)));
    sim.add_mass_point(p);
    sim.mass_point_mut(p).expect("mass point exists").set_force(NVec1::new(1e300));

    sim.integrate(&EulerSolver::new(1.0));

    let mp = sim.mass_point(p).expect("mass point exists");
    assert_eq!(*mp.velocity(), NVec1::zeros());
    assert_eq!(*mp.position(), NVec1::new(4.0));
}

#[test]
fn global_damping_opposes_velocity() {
    let mut sim = Simulation::<3>::new();
    sim.set_damping(0.5);
    let p = sim.create_mass_point(MassPoint::new(1.0, NVec3::zeros()).with_velocity(NVec3::new(2.0, 0.0, -4.0)));
    sim.add_mass_point(p);

    sim.apply_global_damping();

    assert_relative_eq!(force_of(&sim, p), NVec3::new(-1.0, 0.0, 2.0));
}

#[test]
fn step_advances_counter_and_clears_forces() {
    let (mut sim, a, b, _) = two_point_system(3.0, 1.0);
    sim.step(&LeapFrogSolver::new(0.1));
    sim.step(&LeapFrogSolver::new(0.1));

    assert_eq!(sim.step_count(), 2);
    assert_eq!(force_of(&sim, a), NVec2::zeros());
    assert_eq!(force_of(&sim, b), NVec2::zeros());
    // the stretched spring has pulled the points closer
    assert!((position_of(&sim, b) - position_of(&sim, a)).norm() < 3.0);
}

// ==================================================================================
// External force tests
// ==================================================================================

#[test]
fn external_forces_sum_and_reset_after_step() {
    let mut sim = Simulation::<2>::new();
    sim.set_damping(0.0);
    let p = sim.create_mass_point(MassPoint::new(2.0, NVec2::zeros()));
    sim.add_mass_point(p);

    sim.add_external_force(p, NVec2::new(1.0, 0.0));
    sim.add_external_force(p, NVec2::new(1.0, 2.0));
    assert_eq!(sim.external_force(p), Some(&NVec2::new(2.0, 2.0)));

    sim.step(&LeapFrogSolver::new(0.1));

    assert_relative_eq!(*sim.mass_point(p).expect("mass point exists").velocity(), NVec2::new(0.1, 0.1));
    assert_eq!(sim.external_force(p), None);
}

#[test]
fn external_force_on_untracked_point_is_ignored() {
    let mut sim = Simulation::<2>::new();
    let p = sim.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    sim.add_external_force(p, NVec2::new(1.0, 0.0));
    assert_eq!(sim.external_force(p), None);
}

// ==================================================================================
// Bookkeeping tests
// ==================================================================================

#[test]
fn springs_track_their_endpoints() {
    let mut sim = Simulation::<2>::new();
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(1.0, 0.0)));
    assert_eq!(sim.mass_points().count(), 0);

    sim.connect(a, b);
    assert_eq!(sim.mass_points().collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn removing_last_spring_untracks_point() {
    let mut sim = Simulation::<2>::new();
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(1.0, 0.0)));
    let c = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(2.0, 0.0)));
    let ab = sim.connect(a, b).expect("both endpoints exist");
    let bc = sim.connect(b, c).expect("both endpoints exist");

    sim.remove_spring(ab);
    assert!(!sim.is_tracked(a));
    assert!(sim.is_tracked(b));

    sim.remove_spring(bc);
    assert!(!sim.mass_points().any(|id| id == b || id == c));
    assert_eq!(sim.spring_count(), 0);

    // still in the arena until swept
    assert!(sim.mass_point(b).is_some());
}

#[test]
fn removing_unknown_spring_is_a_no_op() {
    let (mut sim, _, _, s) = two_point_system(1.0, 1.0);
    assert!(sim.remove_spring(s).is_some());
    assert!(sim.remove_spring(s).is_none());
    assert_eq!(sim.spring_count(), 0);
}

#[test]
fn spring_to_missing_point_is_rejected() {
    let mut sim = Simulation::<2>::new();
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(1.0, 0.0)));
    let s = sim.connect(a, b).expect("both endpoints exist");
    sim.remove_spring(s);
    assert_eq!(sim.sweep_orphans(), 2);

    assert!(sim.connect(a, b).is_none());
    assert!(sim.mass_point(a).is_none());
}

#[test]
fn sweep_keeps_explicitly_tracked_points() {
    let mut sim = Simulation::<3>::new();
    let free = sim.create_mass_point(MassPoint::new(1.0, NVec3::zeros()));
    let loose = sim.create_mass_point(MassPoint::new(1.0, NVec3::x()));
    sim.add_mass_point(free);

    assert_eq!(sim.sweep_orphans(), 1);
    assert!(sim.mass_point(free).is_some());
    assert!(sim.mass_point(loose).is_none());
}

#[test]
fn previous_in_chain_finds_the_spring_ending_at_point1() {
    let (sim, _, springs) = chain_3d(
        &[NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), NVec3::new(2.0, 0.0, 0.0), NVec3::new(3.0, 0.0, 0.0)],
        0.9,
    );
    assert_eq!(sim.previous_in_chain(springs[0]), None);
    assert_eq!(sim.previous_in_chain(springs[1]), Some(springs[0]));
    assert_eq!(sim.previous_in_chain(springs[2]), Some(springs[1]));
}

#[test]
fn previous_in_chain_ignores_outgoing_springs() {
    let mut sim = Simulation::<2>::new();
    let hub = sim.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(1.0, 0.0)));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(0.0, 1.0)));
    let first = sim.connect(hub, a).expect("both endpoints exist");
    let second = sim.connect(hub, b).expect("both endpoints exist");

    assert_eq!(sim.previous_in_chain(first), None);
    assert_eq!(sim.previous_in_chain(second), None);
}

#[test]
fn clear_drops_everything() {
    let (mut sim, a, _, _) = two_point_system(2.0, 1.0);
    sim.step(&LeapFrogSolver::default());
    sim.clear();

    assert_eq!(sim.spring_count(), 0);
    assert_eq!(sim.mass_points().count(), 0);
    assert_eq!(sim.step_count(), 0);
    assert!(sim.mass_point(a).is_none());
}

#[test]
fn remove_mass_point_keeps_springed_points_tracked() {
    let mut sim = Simulation::<2>::new();
    sim.set_damping(0.0);
    let a = sim.create_mass_point(MassPoint::anchor(NVec2::zeros()));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec2::new(2.0, 0.0)));
    sim.add_spring(Spring::new(a, b).with_rest_length(1.0).with_damping(0.0));

    assert!(!sim.remove_mass_point(b));
    assert!(sim.is_tracked(b));

    let solver = LeapFrogSolver::new(0.1);
    for _ in 0..100 {
        sim.step(&solver);
        // committed every tick, so no force backlog builds up
        assert_eq!(force_of(&sim, b), NVec2::zeros());
    }
}

#[test]
fn removed_free_point_does_not_carry_force_backlog() {
    let mut sim = Simulation::<2>::new();
    sim.set_damping(0.0);
    sim.set_gravity(NVec2::new(0.0, -9.8));
    let p = sim.create_mass_point(MassPoint::new(1.0, NVec2::zeros()));
    sim.add_mass_point(p);
    sim.mass_point_mut(p).expect("mass point exists").add_force(&NVec2::new(-90.0, 0.0));

    assert!(sim.remove_mass_point(p));
    assert!(!sim.is_tracked(p));
    assert_eq!(force_of(&sim, p), NVec2::zeros());
    // unknown and already removed ids are no-ops
    assert!(!sim.remove_mass_point(p));

    sim.add_mass_point(p);
    sim.step(&LeapFrogSolver::new(0.1));
    assert_relative_eq!(*sim.mass_point(p).expect("mass point exists").velocity(), NVec2::new(0.0, -0.98), epsilon = 1e-12);
}

// ==================================================================================
// Directional spring / bending tests
// ==================================================================================

#[test]
fn rotation_between_is_total() {
    let x = Vector3::x();
    assert_relative_eq!(rotation_between(&x, &Vector3::zeros()) * x, x);
    assert_relative_eq!(rotation_between(&x, &-x) * x, -x, epsilon = 1e-12);
    assert_relative_eq!(rotation_between(&x, &Vector3::new(0.0, 2.0, 0.0)) * x, Vector3::y(), epsilon = 1e-12);
}

#[test]
fn rest_direction_is_chain_relative() {
    // second spring continues straight on from a first spring pointing up
    let (sim, _, springs) = chain_3d(&[NVec3::zeros(), NVec3::new(0.0, 1.0, 0.0), NVec3::new(0.0, 2.0, 0.0)], 0.9);
    let dir = sim.spring(springs[1]).and_then(|s| s.as_directional()).expect("directional spring");

    assert_relative_eq!(*dir.world_rest_dir(), NVec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(*dir.local_dir(), NVec3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
}

#[test]
fn chain_root_has_no_bend_force() {
    let mut sim = Simulation::<3>::new();
    let a = sim.create_mass_point(MassPoint::new(1.0, NVec3::zeros()));
    let b = sim.create_mass_point(MassPoint::new(1.0, NVec3::new(0.0, 1.0, 0.0)));
    // rest direction +x but the spring points along +y
    sim.connect_directional(a, b, DirSpring::new(NVec3::x(), 5.0));

    sim.refresh_springs();
    sim.apply_bend_forces().expect("3-D simulation bends");

    assert_eq!(force_of(&sim, a), NVec3::zeros());
    assert_eq!(force_of(&sim, b), NVec3::zeros());
}

#[test]
fn zero_dir_stiffness_has_no_bend_force() {
    let (mut sim, ids, _) = chain_3d(&[NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), NVec3::new(1.0, 1.0, 0.0)], 0.0);
    sim.refresh_springs();
    sim.apply_bend_forces().expect("3-D simulation bends");

    for id in ids {
        assert_eq!(force_of(&sim, id), NVec3::zeros());
    }
}

#[test]
fn straight_chain_has_no_bend_force() {
    let (mut sim, ids, _) = chain_3d(
        &[NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), NVec3::new(2.0, 0.0, 0.0), NVec3::new(3.0, 0.0, 0.0)],
        0.9,
    );
    sim.refresh_springs();
    sim.apply_bend_forces().expect("3-D simulation bends");

    for id in ids {
        assert_abs_diff_eq!(force_of(&sim, id), NVec3::zeros(), epsilon = 1e-12);
    }
}

#[test]
fn bent_chain_is_pushed_back_toward_rest() {
    let (mut sim, ids, _) = chain_3d(&[NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), NVec3::new(1.0, 1.0, 0.0)], 0.9);
    sim.refresh_springs();
    sim.apply_bend_forces().expect("3-D simulation bends");

    let (root, hinge, tip) = (ids[0], ids[1], ids[2]);
    let preferred_tip = NVec3::new(2.0, 0.0, 0.0);
    let tip_force = force_of(&sim, tip);

    assert!(tip_force.dot(&(preferred_tip - position_of(&sim, tip))) > 0.0);
    assert_relative_eq!(force_of(&sim, hinge), -tip_force, epsilon = 1e-12);
    assert_eq!(force_of(&sim, root), NVec3::zeros());
}

#[test]
fn bent_chain_straightens_over_time() {
    let (mut sim, _, springs) = chain_3d(&[NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), NVec3::new(1.0, 1.0, 0.0)], 0.9);
    let bend = |sim: &Simulation<3>| {
        let first = *sim.spring(springs[0]).expect("spring exists").direction();
        let second = *sim.spring(springs[1]).expect("spring exists").direction();
        first.dot(&second).clamp(-1.0, 1.0).acos()
    };
    let initial = bend(&sim);

    let solver = LeapFrogSolver::new(0.1);
    for _ in 0..50 {
        sim.step(&solver);
    }

    assert!(bend(&sim) < initial, "bend went from {initial} to {}", bend(&sim));
}

#[test]
fn hinge_input_preferred_tip_is_one_unit_out() {
    let input = HingeInput {
        root: Vector3::zeros(),
        hinge: Vector3::new(1.0, 0.0, 0.0),
        tip: Vector3::new(3.0, 0.0, 0.0),
        hinge_velocity: Vector3::zeros(),
        tip_velocity: Vector3::zeros(),
        direction: Vector3::x(),
        world_rest_dir: Vector3::new(0.0, 0.0, 4.0),
        dir_stiffness: 0.9,
        damping: 0.9,
    };
    assert_relative_eq!(input.preferred_tip(), Vector3::new(1.0, 0.0, 1.0));

    let levers = input.levers();
    for lever in levers.preferred.iter().chain(levers.current.iter()) {
        assert_relative_eq!((lever - input.hinge).norm(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn bending_needs_three_dimensions() {
    let mut sim = Simulation::<2>::new();
    assert!(!Simulation::<2>::SUPPORTS_BENDING);
    assert!(Simulation::<3>::SUPPORTS_BENDING);
    assert!(sim.apply_bend_forces().is_err());
}

#[test]
fn step_matches_phase_by_phase_tick() {
    let points = [NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), NVec3::new(1.0, 1.0, 0.0), NVec3::new(1.5, 1.5, 0.5)];
    let (mut stepped, ids, _) = chain_3d(&points, 0.9);
    stepped.set_gravity(NVec3::new(0.0, -0.2, 0.0));
    let mut phased = stepped.clone();
    let solver = LeapFrogSolver::new(0.1);

    stepped.step(&solver);

    phased.refresh_springs();
    phased.apply_linear_spring_forces();
    phased.apply_bend_forces().expect("3-D simulation bends");
    phased.apply_gravity();
    phased.apply_global_damping();
    phased.apply_external_forces();
    phased.integrate(&solver);
    phased.commit();
    phased.reset_external_forces();

    for id in ids {
        assert_eq!(position_of(&stepped, id), position_of(&phased, id));
    }
}

#[test]
fn bend_force_does_not_depend_on_current_levers() {
    let input = HingeInput {
        root: Vector3::zeros(),
        hinge: Vector3::new(1.0, 0.0, 0.0),
        tip: Vector3::new(1.0, 1.0, 0.0),
        hinge_velocity: Vector3::zeros(),
        tip_velocity: Vector3::new(0.0, 0.3, 0.0),
        direction: Vector3::y(),
        world_rest_dir: Vector3::x(),
        dir_stiffness: 0.9,
        damping: 0.9,
    };
    let skewed = HingeInput {
        direction: Vector3::new(0.0, 0.0, -1.0),
        ..input.clone()
    };

    assert_eq!(input.tip_force(), skewed.tip_force());
    assert_eq!(input.levers().preferred, input.preferred_levers());
}
