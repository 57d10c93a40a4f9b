//! Enemy registry: единственный writer множества активных врагов
//!
//! Stable-identity map `HitVolumeHandle → Entity`. Регистрация и снятие
//! происходят в том же вызове, что spawn / kill, так что stale handle
//! никогда не разыменовывается.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::components::{EnemyId, HitVolumeHandle};

#[derive(Resource, Debug, Default)]
pub struct EnemyRegistry {
    // BTreeMap: детерминированный порядок обхода
    by_handle: BTreeMap<HitVolumeHandle, (EnemyId, Entity)>,
    next_id: u64,
}

impl EnemyRegistry {
    /// Новые id + handle (монотонные, не переиспользуются)
    pub fn allocate(&mut self) -> (EnemyId, HitVolumeHandle) {
        self.next_id += 1;
        (EnemyId(self.next_id), HitVolumeHandle(self.next_id))
    }

    pub fn register(&mut self, handle: HitVolumeHandle, id: EnemyId, entity: Entity) {
        self.by_handle.insert(handle, (id, entity));
    }

    pub fn unregister(&mut self, handle: HitVolumeHandle) -> Option<Entity> {
        self.by_handle.remove(&handle).map(|(_, entity)| entity)
    }

    pub fn entity(&self, handle: HitVolumeHandle) -> Option<Entity> {
        self.by_handle.get(&handle).map(|(_, entity)| *entity)
    }

    pub fn contains(&self, handle: HitVolumeHandle) -> bool {
        self.by_handle.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Активные враги в порядке handle
    pub fn iter(&self) -> impl Iterator<Item = (HitVolumeHandle, EnemyId, Entity)> + '_ {
        self.by_handle
            .iter()
            .map(|(handle, (id, entity))| (*handle, *id, *entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = EnemyRegistry::default();
        let (first_id, first_handle) = registry.allocate();
        registry.register(first_handle, first_id, Entity::from_raw(1));
        registry.unregister(first_handle);

        let (second_id, second_handle) = registry.allocate();
        assert_ne!(first_id, second_id);
        assert_ne!(first_handle, second_handle);
    }

    #[test]
    fn test_unregister_makes_handle_stale() {
        let mut registry = EnemyRegistry::default();
        let (id, handle) = registry.allocate();
        let entity = Entity::from_raw(7);
        registry.register(handle, id, entity);

        assert_eq!(registry.entity(handle), Some(entity));
        assert_eq!(registry.unregister(handle), Some(entity));
        assert!(!registry.contains(handle));
        assert_eq!(registry.entity(handle), None);
        assert_eq!(registry.unregister(handle), None);
    }
}
