// system.rs - Per-frame logic units driven by the SystemManager

use crate::ecs::{EcsError, Signature, World};
use std::any::Any;

/// Upcast helper so registered systems can be handed back as their concrete
/// type. Implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of game logic that walks entities matching its signature.
pub trait System: AsAny {
    /// Unique registration name.
    fn name(&self) -> &str;

    /// Components this system operates on. Used by callers to look up the
    /// exact archetype bucket.
    fn signature(&self) -> &Signature;

    fn update(&mut self, dt: f32, world: &mut World) -> Result<(), EcsError>;
}

impl dyn System {
    pub fn downcast_ref<S: System>(&self) -> Option<&S> {
        AsAny::as_any(self).downcast_ref::<S>()
    }

    pub fn downcast_mut<S: System>(&mut self) -> Option<&mut S> {
        AsAny::as_any_mut(self).downcast_mut::<S>()
    }
}
