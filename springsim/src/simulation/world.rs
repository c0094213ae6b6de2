//! The simulation arena and its per-tick phases.
//!
//! [`Simulation`] owns every mass point and spring and hands out ids for
//! them. A tick is a sequence of whole-collection passes that the host may
//! call one by one (to interleave its own forces) or all at once through
//! [`Simulation::step`]:
//!
//! 1. [`refresh_springs`](Simulation::refresh_springs)
//! 2. [`apply_linear_spring_forces`](Simulation::apply_linear_spring_forces)
//! 3. [`apply_bend_forces`](Simulation::apply_bend_forces) (3-D only)
//! 4. [`apply_gravity`](Simulation::apply_gravity),
//!    [`apply_global_damping`](Simulation::apply_global_damping),
//!    [`apply_external_forces`](Simulation::apply_external_forces)
//! 5. [`integrate`](Simulation::integrate)
//! 6. [`commit`](Simulation::commit)
//!
//! Removing a spring never deletes a mass point: the point only leaves the
//! tracked set once nothing references it, and [`Simulation::sweep_orphans`]
//! frees such points explicitly.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{ensure, Result};

use super::angled::AngledSpring;
use super::directional::DirSpring;
use super::forces::{linear_spring_force, velocity_damping_force, HingeInput};
use super::integrator::Solver;
use super::spring::{Spring, SpringKind};
use super::states::{from_vec3, to_vec3, MassPoint, MassPointId, NVec, SpringId};

pub const DEFAULT_GLOBAL_DAMPING: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct Simulation<const D: usize> {
    points: Vec<Option<MassPoint<D>>>,
    springs: Vec<Option<Spring<D>>>,
    tracked: BTreeSet<MassPointId>,
    angled: BTreeSet<SpringId>,
    directional: BTreeSet<SpringId>,
    gravity: NVec<D>,
    damping: f64,
    step_count: u64,
    external_forces: BTreeMap<MassPointId, NVec<D>>,
}

impl<const D: usize> Default for Simulation<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> Simulation<D> {
    /// Whether [`Simulation::apply_bend_forces`] is available.
    pub const SUPPORTS_BENDING: bool = D == 3;

    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            springs: Vec::new(),
            tracked: BTreeSet::new(),
            angled: BTreeSet::new(),
            directional: BTreeSet::new(),
            gravity: NVec::zeros(),
            damping: DEFAULT_GLOBAL_DAMPING,
            step_count: 0,
            external_forces: BTreeMap::new(),
        }
    }

    // =====================================================================================
    // Accessors
    // =====================================================================================

    pub fn gravity(&self) -> &NVec<D> {
        &self.gravity
    }

    pub fn set_gravity(&mut self, gravity: NVec<D>) {
        self.gravity = gravity;
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn set_damping(&mut self, damping: f64) {
        self.damping = damping;
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Tracked mass points, in creation order.
    pub fn mass_points(&self) -> impl Iterator<Item = MassPointId> + '_ {
        self.tracked.iter().copied()
    }

    pub fn is_tracked(&self, id: MassPointId) -> bool {
        self.tracked.contains(&id)
    }

    pub fn mass_point(&self, id: MassPointId) -> Option<&MassPoint<D>> {
        self.points.get(id.0).and_then(Option::as_ref)
    }

    pub fn mass_point_mut(&mut self, id: MassPointId) -> Option<&mut MassPoint<D>> {
        self.points.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Every spring in the simulation, in insertion order.
    pub fn springs(&self) -> impl Iterator<Item = (SpringId, &Spring<D>)> + '_ {
        self.springs
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (SpringId(i), s)))
    }

    pub fn angled_springs(&self) -> impl Iterator<Item = SpringId> + '_ {
        self.angled.iter().copied()
    }

    pub fn directional_springs(&self) -> impl Iterator<Item = SpringId> + '_ {
        self.directional.iter().copied()
    }

    pub fn spring(&self, id: SpringId) -> Option<&Spring<D>> {
        self.springs.get(id.0).and_then(Option::as_ref)
    }

    pub fn spring_mut(&mut self, id: SpringId) -> Option<&mut Spring<D>> {
        self.springs.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn spring_count(&self) -> usize {
        self.springs.iter().flatten().count()
    }

    /// The spring ending at this spring's point1, if any.
    pub fn previous_in_chain(&self, id: SpringId) -> Option<SpringId> {
        let spring = self.spring(id)?;
        self.mass_point(spring.point1())?
            .incoming()
            .iter()
            .copied()
            .find(|&s| s != id)
    }

    pub fn external_force(&self, id: MassPointId) -> Option<&NVec<D>> {
        self.external_forces.get(&id)
    }

    // =====================================================================================
    // Mutators
    // =====================================================================================

    /// Stores a mass point in the arena. It is not tracked (and therefore not
    /// simulated) until a spring references it or it is added explicitly.
    pub fn create_mass_point(&mut self, point: MassPoint<D>) -> MassPointId {
        let id = MassPointId(self.points.len());
        self.points.push(Some(point));
        id
    }

    /// Tracks a free mass point; unknown ids are ignored.
    pub fn add_mass_point(&mut self, id: MassPointId) {
        if self.mass_point(id).is_some() {
            self.tracked.insert(id);
        }
    }

    /// Stops simulating a free mass point and drops its staged external
    /// force. Points still referenced by a spring stay tracked; returns
    /// whether the point was untracked.
    pub fn remove_mass_point(&mut self, id: MassPointId) -> bool {
        let Some(mp) = self.mass_point_mut(id) else {
            return false;
        };
        if !mp.is_orphan() {
            ftlog::debug!("Mass point {} still has springs, not removed", id.0);
            return false;
        }
        mp.set_force(NVec::zeros());
        self.external_forces.remove(&id);
        self.tracked.remove(&id)
    }

    /// Registers a spring on both endpoints and tracks them.
    ///
    /// Returns `None` when an endpoint does not exist. The cached geometry is
    /// computed immediately; a spring without an explicit rest length rests
    /// at its current length.
    pub fn add_spring(&mut self, mut spring: Spring<D>) -> Option<SpringId> {
        let (p1, p2) = (spring.point1(), spring.point2());
        let position1 = *self.mass_point(p1)?.position();
        let position2 = *self.mass_point(p2)?.position();

        let id = SpringId(self.springs.len());
        spring.refresh(&position1, &position2);
        spring.settle_rest_length();

        self.points[p1.0].as_mut()?.attach(id, p1 == p2);
        if p1 != p2 {
            self.points[p2.0].as_mut()?.attach(id, true);
        }

        match spring.kind() {
            SpringKind::Linear => {}
            SpringKind::Angled(_) => {
                self.angled.insert(id);
            }
            SpringKind::Directional(_) => {
                self.directional.insert(id);
            }
        }
        self.springs.push(Some(spring));
        self.tracked.insert(p1);
        self.tracked.insert(p2);
        self.refresh_frame(id);

        ftlog::debug!("Added spring {} between mass points {} and {}", id.0, p1.0, p2.0);
        Some(id)
    }

    /// Connects two mass points with a default plain spring.
    pub fn connect(&mut self, p1: MassPointId, p2: MassPointId) -> Option<SpringId> {
        self.add_spring(Spring::new(p1, p2))
    }

    pub fn connect_angled(&mut self, p1: MassPointId, p2: MassPointId, angled: AngledSpring) -> Option<SpringId> {
        self.add_spring(Spring::angled(p1, p2, angled))
    }

    pub fn connect_directional(&mut self, p1: MassPointId, p2: MassPointId, dir: DirSpring<D>) -> Option<SpringId> {
        self.add_spring(Spring::directional(p1, p2, dir))
    }

    /// Removes a spring and untracks endpoints nothing references anymore.
    /// The mass points stay in the arena. Unknown ids are ignored.
    pub fn remove_spring(&mut self, id: SpringId) -> Option<Spring<D>> {
        let spring = self.springs.get_mut(id.0)?.take()?;
        self.angled.remove(&id);
        self.directional.remove(&id);

        for point in [spring.point1(), spring.point2()] {
            if let Some(mp) = self.points.get_mut(point.0).and_then(Option::as_mut) {
                mp.detach(id);
                if mp.is_orphan() {
                    self.external_forces.remove(&point);
                    self.tracked.remove(&point);
                }
            }
        }

        ftlog::debug!("Removed spring {}", id.0);
        Some(spring)
    }

    /// Frees every untracked mass point without incident springs.
    /// Returns how many were freed.
    pub fn sweep_orphans(&mut self) -> usize {
        let mut freed = 0;
        for (i, slot) in self.points.iter_mut().enumerate() {
            let orphaned = slot
                .as_ref()
                .is_some_and(|mp| mp.is_orphan() && !self.tracked.contains(&MassPointId(i)));
            if orphaned {
                *slot = None;
                freed += 1;
            }
        }
        if freed > 0 {
            ftlog::info!("Swept {freed} orphaned mass points");
        }
        freed
    }

    /// Stages an extra force for a tracked mass point, summed with any force
    /// already staged this tick.
    pub fn add_external_force(&mut self, id: MassPointId, force: NVec<D>) {
        if !self.tracked.contains(&id) {
            return;
        }
        *self.external_forces.entry(id).or_insert_with(NVec::zeros) += force;
    }

    pub fn reset_external_forces(&mut self) {
        self.external_forces.clear();
    }

    /// Drops every spring and mass point.
    pub fn clear(&mut self) {
        ftlog::info!(
            "Clearing {}-D simulation: {} springs, {} mass points",
            D,
            self.spring_count(),
            self.tracked.len()
        );
        self.points.clear();
        self.springs.clear();
        self.tracked.clear();
        self.angled.clear();
        self.directional.clear();
        self.external_forces.clear();
        self.step_count = 0;
    }

    // =====================================================================================
    // Tick phases
    // =====================================================================================

    /// Recomputes length and direction of every spring, then the chain frames
    /// of the directional springs (which read their predecessor's direction).
    pub fn refresh_springs(&mut self) {
        for spring in self.springs.iter_mut().flatten() {
            let (Some(Some(mp1)), Some(Some(mp2))) =
                (self.points.get(spring.point1().0), self.points.get(spring.point2().0))
            else {
                continue;
            };
            spring.refresh(mp1.position(), mp2.position());
        }

        let directional: Vec<SpringId> = self.directional.iter().copied().collect();
        for id in directional {
            self.refresh_frame(id);
        }
    }

    fn refresh_frame(&mut self, id: SpringId) {
        let previous = self
            .previous_in_chain(id)
            .and_then(|p| self.spring(p))
            .map(|p| *p.direction());
        let Some(spring) = self.spring_mut(id) else {
            return;
        };
        let direction = *spring.direction();
        if let Some(dir) = spring.as_directional_mut() {
            dir.refresh_frame(&direction, previous.as_ref());
        }
    }

    /// Linear spring forces: point1 += F, point2 -= F. Springs with zero
    /// stiffness are skipped entirely.
    pub fn apply_linear_spring_forces(&mut self) {
        for spring in self.springs.iter().flatten() {
            if spring.stiffness() == 0.0 {
                continue;
            }
            let (p1, p2) = (spring.point1(), spring.point2());
            let (Some(Some(mp1)), Some(Some(mp2))) = (self.points.get(p1.0), self.points.get(p2.0)) else {
                continue;
            };
            let force = linear_spring_force(
                spring.direction(),
                spring.length(),
                spring.rest_length(),
                spring.stiffness(),
                spring.damping(),
                mp1.velocity(),
                mp2.velocity(),
            );
            if let Some(Some(mp)) = self.points.get_mut(p1.0) {
                mp.add_force(&force);
            }
            if let Some(Some(mp)) = self.points.get_mut(p2.0) {
                mp.add_force(&-force);
            }
        }
    }

    /// Hinge/lever bending forces of the directional springs.
    ///
    /// Needs 3-D rotations; any other dimension is rejected with an error
    /// instead of silently doing nothing. Chain roots and springs with a
    /// non-positive directional stiffness contribute nothing.
    pub fn apply_bend_forces(&mut self) -> Result<()> {
        ensure!(Self::SUPPORTS_BENDING, "bending forces need a 3-D simulation, this one is {}-D", D);
        self.accumulate_bend_forces();
        Ok(())
    }

    /// Body of [`Simulation::apply_bend_forces`]; only called when `D == 3`.
    fn accumulate_bend_forces(&mut self) {
        let inputs: Vec<(MassPointId, MassPointId, HingeInput)> = self
            .directional
            .iter()
            .filter_map(|&id| self.hinge_input(id))
            .collect();

        for (hinge, tip, input) in inputs {
            let force: NVec<D> = from_vec3(&input.tip_force());
            if let Some(mp) = self.mass_point_mut(tip) {
                mp.add_force(&force);
            }
            if let Some(mp) = self.mass_point_mut(hinge) {
                mp.add_force(&-force);
            }
        }
    }

    /// Gathers the bending inputs of one directional spring, or `None` when
    /// it does not bend this tick.
    fn hinge_input(&self, id: SpringId) -> Option<(MassPointId, MassPointId, HingeInput)> {
        let spring = self.spring(id)?;
        let dir = spring.as_directional()?;
        if dir.dir_stiffness() <= 0.0 {
            return None;
        }
        let previous = self.spring(self.previous_in_chain(id)?)?;

        let hinge = self.mass_point(spring.point1())?;
        let tip = self.mass_point(spring.point2())?;
        let root = self.mass_point(previous.point1())?;

        let input = HingeInput {
            root: to_vec3(root.position())?,
            hinge: to_vec3(hinge.position())?,
            tip: to_vec3(tip.position())?,
            hinge_velocity: to_vec3(hinge.velocity())?,
            tip_velocity: to_vec3(tip.velocity())?,
            direction: to_vec3(spring.direction())?,
            world_rest_dir: to_vec3(dir.world_rest_dir())?,
            dir_stiffness: dir.dir_stiffness(),
            damping: spring.damping(),
        };
        Some((spring.point1(), spring.point2(), input))
    }

    pub fn apply_gravity(&mut self) {
        let gravity = self.gravity;
        for id in &self.tracked {
            if let Some(Some(mp)) = self.points.get_mut(id.0) {
                mp.add_force(&gravity);
            }
        }
    }

    pub fn apply_global_damping(&mut self) {
        for id in &self.tracked {
            if let Some(Some(mp)) = self.points.get_mut(id.0) {
                let force = velocity_damping_force(mp.velocity(), self.damping);
                mp.add_force(&force);
            }
        }
    }

    /// Adds the staged external forces. They stay staged until
    /// [`Simulation::reset_external_forces`].
    pub fn apply_external_forces(&mut self) {
        for (id, force) in &self.external_forces {
            if let Some(Some(mp)) = self.points.get_mut(id.0) {
                mp.add_force(force);
            }
        }
    }

    /// Advances every tracked mass point with positive mass.
    ///
    /// Non-finite force components are zeroed before dividing by the mass;
    /// non-finite results keep the pre-integration value.
    pub fn integrate<S: Solver>(&mut self, solver: &S) {
        let mut clamped = 0;
        for id in &self.tracked {
            let Some(Some(mp)) = self.points.get_mut(id.0) else {
                continue;
            };
            clamped += mp.sanitize_force();
            if mp.is_anchor() {
                continue;
            }
            let acceleration = mp.force() / mp.mass();
            let (position, velocity) = solver.solve(mp.position(), mp.velocity(), &acceleration);
            clamped += mp.apply_integration(position, velocity);
        }
        if clamped > 0 {
            ftlog::warn!("Step {}: replaced {clamped} non-finite values", self.step_count);
        }
    }

    /// Commits the integrated state, refreshes the springs and advances the
    /// step counter.
    pub fn commit(&mut self) {
        for id in &self.tracked {
            if let Some(Some(mp)) = self.points.get_mut(id.0) {
                mp.commit();
            }
        }
        self.refresh_springs();
        self.step_count += 1;
    }

    /// Runs one full tick with every phase, bending included when supported.
    ///
    /// Unlike the phase-by-phase API, `step` applies the staged external
    /// forces itself (through [`Simulation::apply_external_forces`]) and then
    /// resets them. Hosts that stage forces and also call
    /// `apply_external_forces` before `step` apply them twice.
    pub fn step<S: Solver>(&mut self, solver: &S) {
        self.refresh_springs();
        self.apply_linear_spring_forces();
        if Self::SUPPORTS_BENDING {
            self.accumulate_bend_forces();
        }
        self.apply_gravity();
        self.apply_global_damping();
        self.apply_external_forces();
        self.integrate(solver);
        self.commit();
        self.reset_external_forces();
    }
}
