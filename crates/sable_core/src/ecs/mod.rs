//! Entity Component System core types.
//!
//! The ECS is split into three managers owned by the [`World`] facade:
//! entity id allocation, dense per-type component pools indexed by entity
//! id, and archetype buckets keyed by an exact component signature.
//! Systems are registered separately with a [`SystemManager`] and driven
//! once per frame.

mod archetype;
mod component;
mod entity;
mod error;
mod macros;
mod system;
mod system_handle;
mod system_manager;
mod system_registration_error;
mod world;

pub use archetype::{ArchetypeManager, Signature};
pub use component::{component_id_of, Component, ComponentId, ComponentManager};
pub use entity::{Entity, EntityManager, Generation};
pub use error::EcsError;
pub use system::System;
pub use system_handle::SystemHandle;
pub use system_manager::SystemManager;
pub use system_registration_error::SystemRegistrationError;
pub use world::World;
