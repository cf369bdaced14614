// archetype.rs - Signature-keyed entity buckets
//
// A bucket holds every entity assigned *exactly* that signature. There is no
// subset matching on the primary lookup; `entities_with_all` is the only
// superset query.

use crate::ecs::{ComponentId, Entity};
use std::collections::HashMap;

/// Normalized set of component ids (sorted, no duplicates).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Signature {
    components: Vec<ComponentId>,
}

impl Signature {
    pub fn new(components: impl IntoIterator<Item = ComponentId>) -> Self {
        let mut components: Vec<ComponentId> = components.into_iter().collect();
        components.sort_unstable();
        components.dedup();
        Self { components }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.binary_search(&id).is_ok()
    }

    /// True if every id in `other` is also in `self`.
    pub fn contains_all(&self, other: &Signature) -> bool {
        other.components.iter().all(|id| self.contains(*id))
    }

    /// Copy of this signature with `id` added.
    pub fn with(&self, id: ComponentId) -> Self {
        Self::new(self.components.iter().copied().chain(std::iter::once(id)))
    }

    /// Copy of this signature with `id` removed.
    pub fn without(&self, id: ComponentId) -> Self {
        Self {
            components: self
                .components
                .iter()
                .copied()
                .filter(|c| *c != id)
                .collect(),
        }
    }
}

impl FromIterator<ComponentId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Build a [`Signature`] from component types.
///
/// ```ignore
/// let sig = signature![Transform2D, Sprite];
/// ```
#[macro_export]
macro_rules! signature {
    () => {
        $crate::ecs::Signature::empty()
    };
    ($($ty:ty),+ $(,)?) => {
        $crate::ecs::Signature::new([$(<$ty as $crate::ecs::Component>::ID),+])
    };
}

/// Maps exact signatures to the entities assigned to them.
#[derive(Debug, Default)]
pub struct ArchetypeManager {
    buckets: HashMap<Signature, Vec<Entity>>,
}

impl ArchetypeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entity` to the bucket for `signature`.
    ///
    /// No duplicate check: assigning twice lists the entity twice.
    pub fn assign(&mut self, entity: Entity, signature: Signature) {
        self.buckets.entry(signature).or_default().push(entity);
    }

    /// Move `entity` to `signature`, removing the first occurrence found in
    /// any existing bucket. Linear in the total number of bucketed entities.
    pub fn update(&mut self, entity: Entity, signature: Signature) {
        self.remove(entity);
        self.assign(entity, signature);
    }

    /// Remove the first occurrence of `entity` from whichever bucket holds it.
    /// Returns the signature it was removed from.
    pub fn remove(&mut self, entity: Entity) -> Option<Signature> {
        let mut removed_from = None;
        for (signature, bucket) in self.buckets.iter_mut() {
            if let Some(pos) = bucket.iter().position(|e| *e == entity) {
                bucket.remove(pos);
                removed_from = Some(signature.clone());
                break;
            }
        }
        removed_from
    }

    /// Entities assigned exactly `signature`, in assignment order.
    ///
    /// Absent signatures yield an empty slice; no bucket is created.
    pub fn entities(&self, signature: &Signature) -> &[Entity] {
        self.buckets
            .get(signature)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entities from every bucket whose signature is a superset of
    /// `signature`. Buckets are visited in signature order.
    pub fn entities_with_all(&self, signature: &Signature) -> Vec<Entity> {
        let mut matching: Vec<(&Signature, &Vec<Entity>)> = self
            .buckets
            .iter()
            .filter(|(bucket_sig, _)| bucket_sig.contains_all(signature))
            .collect();
        matching.sort_by(|a, b| a.0.cmp(b.0));
        matching
            .into_iter()
            .flat_map(|(_, bucket)| bucket.iter().copied())
            .collect()
    }

    /// Signature of the first bucket containing `entity`.
    pub fn signature_of(&self, entity: Entity) -> Option<&Signature> {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.contains(&entity))
            .map(|(signature, _)| signature)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(ids: &[ComponentId]) -> Signature {
        Signature::new(ids.iter().copied())
    }

    #[test]
    fn signature_is_order_insensitive() {
        assert_eq!(sig(&[2, 1]), sig(&[1, 2]));
        assert_eq!(sig(&[3, 3, 1]).components(), &[1, 3]);
    }

    #[test]
    fn with_and_without_keep_normal_form() {
        let s = sig(&[5, 1]);
        assert_eq!(s.with(3).components(), &[1, 3, 5]);
        assert_eq!(s.with(1), s);
        assert_eq!(s.without(5).components(), &[1]);
    }

    #[test]
    fn assign_then_lookup_contains_entity_once() {
        let mut archetypes = ArchetypeManager::new();
        let e = Entity::from_raw(7);
        archetypes.assign(e, sig(&[1, 2]));

        let found = archetypes.entities(&sig(&[1, 2]));
        assert_eq!(found.iter().filter(|x| **x == e).count(), 1);
    }

    #[test]
    fn update_moves_between_buckets() {
        let mut archetypes = ArchetypeManager::new();
        let e = Entity::from_raw(1);
        archetypes.assign(e, sig(&[1]));
        archetypes.update(e, sig(&[1, 2]));

        assert!(!archetypes.entities(&sig(&[1])).contains(&e));
        assert!(archetypes.entities(&sig(&[1, 2])).contains(&e));
        assert_eq!(archetypes.signature_of(e), Some(&sig(&[1, 2])));
    }

    #[test]
    fn matching_is_exact_not_subset() {
        let mut archetypes = ArchetypeManager::new();
        let e = Entity::from_raw(0);
        archetypes.assign(e, sig(&[1, 2, 3]));

        assert!(archetypes.entities(&sig(&[1, 2])).is_empty());
        assert_eq!(archetypes.entities_with_all(&sig(&[1, 2])), vec![e]);
    }

    #[test]
    fn duplicate_assign_lists_entity_twice() {
        let mut archetypes = ArchetypeManager::new();
        let e = Entity::from_raw(4);
        archetypes.assign(e, sig(&[1]));
        archetypes.assign(e, sig(&[1]));
        assert_eq!(archetypes.entities(&sig(&[1])), &[e, e]);

        // update only removes one occurrence
        archetypes.update(e, sig(&[2]));
        assert_eq!(archetypes.entities(&sig(&[1])), &[e]);
        assert_eq!(archetypes.entities(&sig(&[2])), &[e]);
    }

    #[test]
    fn absent_signature_does_not_create_bucket() {
        let archetypes = ArchetypeManager::new();
        assert!(archetypes.entities(&sig(&[9])).is_empty());
        assert_eq!(archetypes.bucket_count(), 0);
    }

    #[test]
    fn superset_query_is_deterministic() {
        let mut archetypes = ArchetypeManager::new();
        archetypes.assign(Entity::from_raw(0), sig(&[1, 3]));
        archetypes.assign(Entity::from_raw(1), sig(&[1, 2]));
        archetypes.assign(Entity::from_raw(2), sig(&[2]));

        let found = archetypes.entities_with_all(&sig(&[1]));
        assert_eq!(found, vec![Entity::from_raw(1), Entity::from_raw(0)]);
    }
}
