//! Entity identifiers with recycled indices
//!
//! Entities are plain integer ids with no payload. Destroyed ids go onto a
//! FIFO free queue and are handed out again by later `create` calls. A
//! per-id generation counter records how many times the id was destroyed.

use crate::ecs::EcsError;
use std::collections::VecDeque;
use std::fmt;

/// Destroy counter for an entity id.
pub type Generation = u32;

/// Entity handle (dense index, no generation attached)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }

    /// Slot index used by component pools.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}", self.0)
    }
}

/// Allocates and recycles entity ids.
///
/// Ids are dense from 0 up to the high-water mark. Not thread-safe; a
/// single game loop owns it.
#[derive(Debug, Default)]
pub struct EntityManager {
    next_id: u32,
    generations: Vec<Generation>,
    alive: Vec<bool>,
    free: VecDeque<Entity>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the oldest recycled id, or the next fresh one.
    pub fn create(&mut self) -> Entity {
        if let Some(entity) = self.free.pop_front() {
            self.alive[entity.index()] = true;
            return entity;
        }

        let entity = Entity(self.next_id);
        self.next_id += 1;
        self.generations.push(0);
        self.alive.push(true);
        entity
    }

    /// Retire an id: bump its generation and queue it for reuse.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), EcsError> {
        let index = entity.index();
        if index >= self.generations.len() {
            return Err(EcsError::EntityOutOfRange {
                entity,
                allocated: self.generations.len(),
            });
        }
        if !self.alive[index] {
            return Err(EcsError::EntityNotAlive { entity });
        }

        self.generations[index] = self.generations[index].wrapping_add(1);
        self.alive[index] = false;
        self.free.push_back(entity);
        Ok(())
    }

    /// Current generation of an allocated id.
    pub fn generation(&self, entity: Entity) -> Option<Generation> {
        self.generations.get(entity.index()).copied()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// High-water mark: every id below this has been allocated at least once.
    pub fn allocated(&self) -> usize {
        self.generations.len()
    }

    pub fn live_count(&self) -> usize {
        self.generations.len() - self.free.len()
    }

    /// Ids waiting on the free queue, oldest first.
    pub fn free_ids(&self) -> impl Iterator<Item = Entity> + '_ {
        self.free.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_from_zero() {
        let mut entities = EntityManager::new();
        let ids: Vec<u32> = (0..4).map(|_| entities.create().id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(entities.allocated(), 4);
        assert_eq!(entities.live_count(), 4);
    }

    #[test]
    fn destroyed_id_is_recycled_with_higher_generation() {
        let mut entities = EntityManager::new();
        let e = entities.create();
        let mut last = entities.generation(e).unwrap();

        for _ in 0..3 {
            entities.destroy(e).unwrap();
            let recycled = entities.create();
            assert_eq!(recycled, e);

            let generation = entities.generation(e).unwrap();
            assert!(generation > last);
            last = generation;
        }
    }

    #[test]
    fn free_queue_is_fifo() {
        let mut entities = EntityManager::new();
        let a = entities.create();
        let b = entities.create();
        let _c = entities.create();

        entities.destroy(b).unwrap();
        entities.destroy(a).unwrap();

        assert_eq!(entities.create(), b);
        assert_eq!(entities.create(), a);
        assert_eq!(entities.create(), Entity::from_raw(3));
    }

    #[test]
    fn destroying_unallocated_id_fails() {
        let mut entities = EntityManager::new();
        entities.create();

        let err = entities.destroy(Entity::from_raw(5)).unwrap_err();
        assert_eq!(
            err,
            EcsError::EntityOutOfRange {
                entity: Entity::from_raw(5),
                allocated: 1
            }
        );
    }

    #[test]
    fn double_destroy_is_rejected() {
        let mut entities = EntityManager::new();
        let e = entities.create();
        entities.destroy(e).unwrap();

        assert_eq!(
            entities.destroy(e),
            Err(EcsError::EntityNotAlive { entity: e })
        );
        assert_eq!(entities.free_ids().count(), 1);
        assert_eq!(entities.generation(e), Some(1));
    }
}
