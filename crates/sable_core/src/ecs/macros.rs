//! Convenience macros for entity spawning

/// Spawn an entity with components and file it under their signature.
///
/// Expands to an expression of type `Result<Entity, EcsError>`. The entity
/// is assigned to the archetype made of exactly the given component ids.
///
/// # Examples
///
/// ```ignore
/// let entity = spawn!(world,
///     Position { x: 0.0, y: 0.0 },
///     Velocity { x: 1.0, y: 1.0 },
/// )?;
/// ```
#[macro_export]
macro_rules! spawn {
    ($world:expr, $($component:expr),+ $(,)?) => {{
        (|| -> ::core::result::Result<$crate::ecs::Entity, $crate::ecs::EcsError> {
            let world: &mut $crate::ecs::World = &mut $world;
            let entity = world.create_entity();
            let mut ids: ::std::vec::Vec<$crate::ecs::ComponentId> = ::std::vec::Vec::new();
            $(
                let component = $component;
                ids.push($crate::ecs::component_id_of(&component));
                world.add_component(entity, component)?;
            )+
            world.assign_archetype(entity, $crate::ecs::Signature::new(ids));
            Ok(entity)
        })()
    }};
}
