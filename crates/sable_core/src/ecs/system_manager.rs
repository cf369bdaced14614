use crate::ecs::{EcsError, System, SystemHandle, SystemRegistrationError, World};
use std::collections::HashMap;
use tracing::debug;

/// Owns registered systems and runs them in registration order.
#[derive(Default)]
pub struct SystemManager {
    systems: Vec<Box<dyn System>>,
    name_lookup: HashMap<String, SystemHandle>,
}

impl SystemManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: System>(&mut self, system: S) -> Result<SystemHandle, SystemRegistrationError> {
        self.register_boxed(Box::new(system))
    }

    pub fn register_boxed(
        &mut self,
        system: Box<dyn System>,
    ) -> Result<SystemHandle, SystemRegistrationError> {
        let name = system.name().to_string();
        if name.is_empty() {
            return Err(SystemRegistrationError::EmptyName);
        }
        if self.name_lookup.contains_key(&name) {
            return Err(SystemRegistrationError::DuplicateName { name });
        }

        let handle = SystemHandle::new(self.systems.len() as u32);
        debug!(system = %name, %handle, "registered system");
        self.name_lookup.insert(name, handle);
        self.systems.push(system);
        Ok(handle)
    }

    pub fn handle_of(&self, name: &str) -> Option<SystemHandle> {
        self.name_lookup.get(name).copied()
    }

    /// Concrete system behind `handle`, if it is an `S`.
    pub fn get<S: System>(&self, handle: SystemHandle) -> Option<&S> {
        self.systems
            .get(handle.index() as usize)
            .and_then(|system| system.downcast_ref::<S>())
    }

    pub fn get_mut<S: System>(&mut self, handle: SystemHandle) -> Option<&mut S> {
        self.systems
            .get_mut(handle.index() as usize)
            .and_then(|system| system.downcast_mut::<S>())
    }

    /// First registered system of concrete type `S`.
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems.iter().find_map(|system| system.downcast_ref::<S>())
    }

    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|system| system.downcast_mut::<S>())
    }

    /// Run every system once. Stops at the first error.
    pub fn update_systems(&mut self, dt: f32, world: &mut World) -> Result<(), EcsError> {
        for system in &mut self.systems {
            system.update(dt, world)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Registered names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.systems.iter().map(|system| system.name())
    }
}
