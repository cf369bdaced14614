//! World facade over the entity, component and archetype managers
//!
//! The world owns the three managers for the lifetime of a game state and
//! forwards each call to the right one. It does not keep archetype buckets
//! in sync with component pools on its own: callers assign signatures
//! explicitly (or through `spawn!`).

use crate::ecs::{
    ArchetypeManager, Component, ComponentManager, EcsError, Entity, EntityManager, Signature,
};
use tracing::trace;

#[derive(Default)]
pub struct World {
    entities: EntityManager,
    components: ComponentManager,
    archetypes: ArchetypeManager,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Entities ----

    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create();
        trace!(%entity, "created");
        entity
    }

    /// Retire the id only. Component slots and bucket entries are left as
    /// they are; use [`World::despawn`] to clear those too.
    pub fn remove_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.entities.destroy(entity)
    }

    /// Retire the id and drop every component and bucket entry it holds.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.entities.destroy(entity)?;
        let cleared = self.components.clear_entity(entity);
        while self.archetypes.remove(entity).is_some() {}
        trace!(%entity, cleared, "despawned");
        Ok(())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.live_count()
    }

    // ---- Components ----

    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        self.components.add(entity, value)
    }

    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<Option<T>, EcsError> {
        self.components.remove(entity)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components.has::<T>(entity)
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.components.get(entity)
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.components.get_mut(entity)
    }

    // ---- Archetypes ----

    pub fn assign_archetype(&mut self, entity: Entity, signature: Signature) {
        self.archetypes.assign(entity, signature);
    }

    pub fn update_archetype(&mut self, entity: Entity, signature: Signature) {
        self.archetypes.update(entity, signature);
    }

    /// Entities assigned exactly `signature`.
    pub fn entities_by_signature(&self, signature: &Signature) -> &[Entity] {
        self.archetypes.entities(signature)
    }

    /// Entities whose assigned signature contains every id in `signature`.
    pub fn entities_with_all(&self, signature: &Signature) -> Vec<Entity> {
        self.archetypes.entities_with_all(signature)
    }

    // ---- Manager access ----

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn components(&self) -> &ComponentManager {
        &self.components
    }

    pub fn archetypes(&self) -> &ArchetypeManager {
        &self.archetypes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{define_component, signature, spawn};

    #[derive(Clone, Copy, Debug, PartialEq, Default)]
    struct Position {
        x: f32,
        y: f32,
    }
    define_component!(Position, 1, "Position");

    #[derive(Clone, Copy, Debug, PartialEq, Default)]
    struct Velocity {
        x: f32,
        y: f32,
    }
    define_component!(Velocity, 2, "Velocity");

    #[test]
    fn spawn_assigns_exact_signature() {
        let mut world = World::new();
        let e = spawn!(world, Position { x: 1.0, y: 2.0 }, Velocity::default()).unwrap();

        assert_eq!(world.entities_by_signature(&signature![Position, Velocity]), &[e]);
        assert!(world.entities_by_signature(&signature![Position]).is_empty());
        assert_eq!(world.get_component::<Position>(e).unwrap().y, 2.0);
    }

    #[test]
    fn despawn_clears_components_and_buckets() {
        let mut world = World::new();
        let e = spawn!(world, Position::default()).unwrap();
        world.despawn(e).unwrap();

        assert!(!world.is_alive(e));
        assert!(!world.has_component::<Position>(e));
        assert!(world.entities_by_signature(&signature![Position]).is_empty());
    }

    #[test]
    fn remove_entity_keeps_component_data() {
        let mut world = World::new();
        let e = spawn!(world, Position { x: 3.0, y: 0.0 }).unwrap();
        world.remove_entity(e).unwrap();

        assert!(world.has_component::<Position>(e));
        assert_eq!(world.entities_by_signature(&signature![Position]), &[e]);
    }

    #[test]
    fn despawn_of_dead_entity_propagates_error() {
        let mut world = World::new();
        let e = world.create_entity();
        world.despawn(e).unwrap();
        assert_eq!(world.despawn(e), Err(EcsError::EntityNotAlive { entity: e }));
    }

    #[test]
    fn mutation_through_world_is_visible() {
        let mut world = World::new();
        let e = spawn!(world, Velocity { x: 1.0, y: 1.0 }).unwrap();
        world.get_component_mut::<Velocity>(e).unwrap().x = 10.0;
        assert_eq!(world.get_component::<Velocity>(e).unwrap().x, 10.0);
    }

    #[test]
    fn superset_query_finds_richer_entities() {
        let mut world = World::new();
        let a = spawn!(world, Position::default()).unwrap();
        let b = spawn!(world, Position::default(), Velocity::default()).unwrap();

        let found = world.entities_with_all(&signature![Position]);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&a) && found.contains(&b));
    }
}
