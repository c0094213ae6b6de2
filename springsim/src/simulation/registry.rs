//! One simulation per dimensionality, owned by the host.
//!
//! The registry is a plain value the host keeps around (a bevy resource, a
//! field of its app state...). Each slot is created on first access and
//! lives until the registry is dropped; `clear` empties every slot that
//! exists without dropping it.

use super::world::Simulation;

#[derive(Debug, Default)]
pub struct SimulationRegistry {
    sim1: Option<Simulation<1>>,
    sim2: Option<Simulation<2>>,
    sim3: Option<Simulation<3>>,
}

/// Dimensionalities the registry keeps a slot for.
pub trait RegistrySlot: Sized {
    fn slot(registry: &SimulationRegistry) -> &Option<Self>;
    fn slot_mut(registry: &mut SimulationRegistry) -> &mut Option<Self>;
}

impl RegistrySlot for Simulation<1> {
    fn slot(registry: &SimulationRegistry) -> &Option<Self> {
        &registry.sim1
    }

    fn slot_mut(registry: &mut SimulationRegistry) -> &mut Option<Self> {
        &mut registry.sim1
    }
}

impl RegistrySlot for Simulation<2> {
    fn slot(registry: &SimulationRegistry) -> &Option<Self> {
        &registry.sim2
    }

    fn slot_mut(registry: &mut SimulationRegistry) -> &mut Option<Self> {
        &mut registry.sim2
    }
}

impl RegistrySlot for Simulation<3> {
    fn slot(registry: &SimulationRegistry) -> &Option<Self> {
        &registry.sim3
    }

    fn slot_mut(registry: &mut SimulationRegistry) -> &mut Option<Self> {
        &mut registry.sim3
    }
}

impl SimulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `D`-dimensional simulation, created on first access.
    pub fn get<const D: usize>(&mut self) -> &mut Simulation<D>
    where
        Simulation<D>: RegistrySlot,
    {
        Simulation::<D>::slot_mut(self).get_or_insert_with(|| {
            ftlog::debug!("Creating {}-D simulation", D);
            Simulation::new()
        })
    }

    /// The `D`-dimensional simulation if it was ever accessed.
    pub fn peek<const D: usize>(&self) -> Option<&Simulation<D>>
    where
        Simulation<D>: RegistrySlot,
    {
        Simulation::<D>::slot(self).as_ref()
    }

    pub fn contains<const D: usize>(&self) -> bool
    where
        Simulation<D>: RegistrySlot,
    {
        self.peek::<D>().is_some()
    }

    /// Clears every simulation created so far.
    pub fn clear(&mut self) {
        if let Some(sim) = self.sim1.as_mut() {
            sim.clear();
        }
        if let Some(sim) = self.sim2.as_mut() {
            sim.clear();
        }
        if let Some(sim) = self.sim3.as_mut() {
            sim.clear();
        }
    }
}
