use crate::ecs::{ComponentId, Entity};
use thiserror::Error;

/// Invariant violations raised by the ECS managers.
///
/// These indicate a caller bug (stale or unknown ids, reading a component
/// that was never attached) and are propagated to the caller unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EcsError {
    #[error("{entity} was never allocated (allocated ids: {allocated})")]
    EntityOutOfRange { entity: Entity, allocated: usize },

    #[error("{entity} is not alive")]
    EntityNotAlive { entity: Entity },

    #[error("no pool exists for component '{component}'")]
    MissingPool { component: &'static str },

    #[error("{entity} does not have component '{component}'")]
    ComponentMissing {
        entity: Entity,
        component: &'static str,
    },

    #[error("component id {id} is registered as '{existing}', not '{requested}'")]
    ComponentIdCollision {
        id: ComponentId,
        existing: &'static str,
        requested: &'static str,
    },
}
