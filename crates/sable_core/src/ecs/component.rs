// component.rs - Dense, type-erased component pools
//
// Components are identified by u32 ids declared on the type, not by Rust
// TypeIds, so archetype signatures stay stable across builds. Each id owns
// one pool: a Vec indexed directly by entity id with an explicit presence
// marker per slot.

use crate::ecs::{EcsError, Entity};
use std::any::Any;
use std::collections::HashMap;

pub type ComponentId = u32;

/// Trait for plain-data components.
pub trait Component: 'static + Sized {
    /// Globally unique component id.
    const ID: ComponentId;

    /// Human-readable name for diagnostics.
    const NAME: &'static str;
}

/// Helper macro to implement the `Component` trait.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy)]
/// struct Position { x: f32, y: f32 }
///
/// define_component!(Position, 1, "Position");
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty, $id:expr, $name:expr) => {
        impl $crate::ecs::Component for $ty {
            const ID: $crate::ecs::ComponentId = $id;
            const NAME: &'static str = $name;
        }
    };
}

/// Component id of a value, for building signatures from instances.
#[inline]
pub fn component_id_of<T: Component>(_value: &T) -> ComponentId {
    T::ID
}

/// Pool for one component type. `slots[e]` is `Some` only while entity
/// `e` holds the component.
struct Pool<T> {
    slots: Vec<Option<T>>,
}

impl<T> Pool<T> {
    fn new() -> Self {
        Self { slots: Vec::new() }
    }

    fn insert(&mut self, index: usize, value: T) {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(value);
    }
}

/// Object-safe view of a pool, used where the concrete type is unknown.
trait ErasedPool {
    fn name(&self) -> &'static str;
    fn len(&self) -> usize;
    fn contains(&self, index: usize) -> bool;
    fn clear_slot(&mut self, index: usize) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedPool<T: Component>(Pool<T>);

impl<T: Component> ErasedPool for TypedPool<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn len(&self) -> usize {
        self.0.slots.len()
    }

    fn contains(&self, index: usize) -> bool {
        matches!(self.0.slots.get(index), Some(Some(_)))
    }

    fn clear_slot(&mut self, index: usize) -> bool {
        self.0
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Registry of component pools keyed by component id.
///
/// Pools are created lazily on the first `add` for a type and grow on
/// demand; slots are never reclaimed.
#[derive(Default)]
pub struct ComponentManager {
    pools: HashMap<ComponentId, Box<dyn ErasedPool>>,
}

impl ComponentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or overwrite) `value` for `entity`.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        let pool = self
            .pools
            .entry(T::ID)
            .or_insert_with(|| Box::new(TypedPool::<T>(Pool::new())));
        let existing = pool.name();
        let pool = pool
            .as_any_mut()
            .downcast_mut::<TypedPool<T>>()
            .ok_or(EcsError::ComponentIdCollision {
                id: T::ID,
                existing,
                requested: T::NAME,
            })?;
        pool.0.insert(entity.index(), value);
        Ok(())
    }

    /// Detach the component, returning the old value if one was present.
    ///
    /// Missing pools and out-of-range entities are a no-op.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<Option<T>, EcsError> {
        let Some(pool) = self.pool_mut::<T>()? else {
            return Ok(None);
        };
        Ok(pool
            .0
            .slots
            .get_mut(entity.index())
            .and_then(Option::take))
    }

    /// True only while `entity` holds a value of `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.pool::<T>()
            .ok()
            .flatten()
            .is_some_and(|pool| pool.contains(entity.index()))
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        let pool = self
            .pool::<T>()?
            .ok_or(EcsError::MissingPool { component: T::NAME })?;
        pool.0
            .slots
            .get(entity.index())
            .and_then(Option::as_ref)
            .ok_or(EcsError::ComponentMissing {
                entity,
                component: T::NAME,
            })
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let pool = self
            .pool_mut::<T>()?
            .ok_or(EcsError::MissingPool { component: T::NAME })?;
        pool.0
            .slots
            .get_mut(entity.index())
            .and_then(Option::as_mut)
            .ok_or(EcsError::ComponentMissing {
                entity,
                component: T::NAME,
            })
    }

    /// Clear every slot held by `entity` across all pools.
    /// Returns how many components were detached.
    pub fn clear_entity(&mut self, entity: Entity) -> usize {
        self.pools
            .values_mut()
            .map(|pool| pool.clear_slot(entity.index()))
            .filter(|&cleared| cleared)
            .count()
    }

    /// Iterate `(entity, &T)` over every present slot, in id order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.pool::<T>()
            .ok()
            .flatten()
            .into_iter()
            .flat_map(|pool| pool.0.slots.iter().enumerate())
            .filter_map(|(index, slot)| {
                slot.as_ref()
                    .map(|value| (Entity::from_raw(index as u32), value))
            })
    }

    /// Slot count of the pool for `T` (including empty slots).
    pub fn pool_len<T: Component>(&self) -> Option<usize> {
        self.pools.get(&T::ID).map(|pool| pool.len())
    }

    /// Ids of every component type that has a pool.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.pools.keys().copied()
    }

    fn pool<T: Component>(&self) -> Result<Option<&TypedPool<T>>, EcsError> {
        match self.pools.get(&T::ID) {
            None => Ok(None),
            Some(pool) => pool
                .as_any()
                .downcast_ref::<TypedPool<T>>()
                .map(Some)
                .ok_or(EcsError::ComponentIdCollision {
                    id: T::ID,
                    existing: pool.name(),
                    requested: T::NAME,
                }),
        }
    }

    fn pool_mut<T: Component>(&mut self) -> Result<Option<&mut TypedPool<T>>, EcsError> {
        match self.pools.get_mut(&T::ID) {
            None => Ok(None),
            Some(pool) => {
                let existing = pool.name();
                pool.as_any_mut()
                    .downcast_mut::<TypedPool<T>>()
                    .map(Some)
                    .ok_or(EcsError::ComponentIdCollision {
                        id: T::ID,
                        existing,
                        requested: T::NAME,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Default)]
    struct Health {
        value: i32,
    }
    crate::define_component!(Health, 200, "Health");

    #[derive(Clone, Debug, PartialEq)]
    struct Name(String);
    crate::define_component!(Name, 201, "Name");

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Impostor(u8);
    crate::define_component!(Impostor, 200, "Impostor");

    #[test]
    fn add_then_get_returns_value() {
        let mut components = ComponentManager::new();
        let e = Entity::from_raw(3);
        components.add(e, Health { value: 7 }).unwrap();
        assert_eq!(components.get::<Health>(e), Ok(&Health { value: 7 }));
    }

    #[test]
    fn pool_grows_for_far_entity_ids() {
        let mut components = ComponentManager::new();
        components.add(Entity::from_raw(0), Health { value: 1 }).unwrap();

        let far = Entity::from_raw(10_000);
        components.add(far, Health { value: 2 }).unwrap();

        assert_eq!(components.get::<Health>(far).unwrap().value, 2);
        assert_eq!(components.pool_len::<Health>(), Some(10_001));
        assert!(!components.has::<Health>(Entity::from_raw(5_000)));
    }

    #[test]
    fn add_overwrites_existing_value() {
        let mut components = ComponentManager::new();
        let e = Entity::from_raw(1);
        components.add(e, Name("old".into())).unwrap();
        components.add(e, Name("new".into())).unwrap();
        assert_eq!(components.get::<Name>(e).unwrap().0, "new");
    }

    #[test]
    fn remove_clears_presence_without_shrinking() {
        let mut components = ComponentManager::new();
        let e = Entity::from_raw(2);
        components.add(e, Health { value: 9 }).unwrap();

        assert_eq!(components.remove::<Health>(e), Ok(Some(Health { value: 9 })));
        assert!(!components.has::<Health>(e));
        assert_eq!(components.pool_len::<Health>(), Some(3));
        assert_eq!(
            components.get::<Health>(e),
            Err(EcsError::ComponentMissing {
                entity: e,
                component: "Health"
            })
        );
    }

    #[test]
    fn remove_without_pool_is_noop() {
        let mut components = ComponentManager::new();
        assert_eq!(components.remove::<Health>(Entity::from_raw(0)), Ok(None));
    }

    #[test]
    fn get_without_pool_fails() {
        let components = ComponentManager::new();
        assert_eq!(
            components.get::<Health>(Entity::from_raw(0)),
            Err(EcsError::MissingPool { component: "Health" })
        );
    }

    #[test]
    fn get_out_of_range_fails() {
        let mut components = ComponentManager::new();
        components.add(Entity::from_raw(0), Health::default()).unwrap();
        assert!(matches!(
            components.get::<Health>(Entity::from_raw(1)),
            Err(EcsError::ComponentMissing { .. })
        ));
    }

    #[test]
    fn in_range_but_never_added_is_not_present() {
        let mut components = ComponentManager::new();
        components.add(Entity::from_raw(4), Health::default()).unwrap();
        assert!(!components.has::<Health>(Entity::from_raw(1)));
        assert!(components.has::<Health>(Entity::from_raw(4)));
    }

    #[test]
    fn colliding_ids_are_reported() {
        let mut components = ComponentManager::new();
        components.add(Entity::from_raw(0), Health::default()).unwrap();

        let err = components
            .add(Entity::from_raw(0), Impostor(1))
            .unwrap_err();
        assert_eq!(
            err,
            EcsError::ComponentIdCollision {
                id: 200,
                existing: "Health",
                requested: "Impostor"
            }
        );
        assert!(!components.has::<Impostor>(Entity::from_raw(0)));
    }

    #[test]
    fn clear_entity_detaches_every_component() {
        let mut components = ComponentManager::new();
        let e = Entity::from_raw(1);
        components.add(e, Health::default()).unwrap();
        components.add(e, Name("x".into())).unwrap();

        let other = Entity::from_raw(2);
        components.add(other, Health { value: 4 }).unwrap();

        assert_eq!(components.clear_entity(e), 2);
        assert!(!components.has::<Health>(e));
        assert!(!components.has::<Name>(e));
        assert_eq!(components.clear_entity(e), 0);
        assert_eq!(components.get::<Health>(other).unwrap().value, 4);
    }

    #[test]
    fn iter_visits_present_slots_in_order() {
        let mut components = ComponentManager::new();
        components.add(Entity::from_raw(5), Health { value: 5 }).unwrap();
        components.add(Entity::from_raw(1), Health { value: 1 }).unwrap();

        let seen: Vec<(u32, i32)> = components
            .iter::<Health>()
            .map(|(e, h)| (e.id(), h.value))
            .collect();
        assert_eq!(seen, vec![(1, 1), (5, 5)]);
    }
}
