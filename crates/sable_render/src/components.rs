//! Components read by the camera and sprite render systems

use crate::backend::TextureHandle;
use crate::batch::Frustum;
use glam::{Mat2, Mat4, Vec2, Vec3, Vec4};
use sable_core::define_component;
use sable_core::math::transform_2d;

/// Placement of a sprite. Rotation is in radians around Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec3,
    pub rotation: f32,
    pub scale: Vec2,
}

define_component!(Transform2D, 100, "Transform2D");

impl Transform2D {
    pub fn new(position: Vec3, rotation: f32, scale: Vec2) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, 0.0, Vec2::ONE)
    }

    /// Model matrix for a unit quad.
    pub fn matrix(&self) -> Mat4 {
        transform_2d(self.position, self.rotation, self.scale)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

/// What a sprite draws: a named atlas sprite, or a region of a texture.
///
/// Atlas lookup wins when both `sprite_name` and `atlas_name` are set.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: Option<TextureHandle>,
    /// Top-left of the sampled region in normalized texture coordinates.
    pub texture_offset: Vec2,
    pub texture_size: Vec2,
    pub color: Vec4,
    pub flip_x: bool,
    pub flip_y: bool,
    pub sprite_name: String,
    pub atlas_name: String,
    pub layer: i32,
}

define_component!(Sprite, 101, "Sprite");

impl Sprite {
    pub fn from_atlas(sprite_name: &str, atlas_name: &str, color: Vec4, layer: i32) -> Self {
        Self {
            sprite_name: sprite_name.to_string(),
            atlas_name: atlas_name.to_string(),
            color,
            layer,
            ..Self::default()
        }
    }

    pub fn from_texture(texture: TextureHandle, color: Vec4) -> Self {
        Self {
            texture: Some(texture),
            color,
            ..Self::default()
        }
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_region(mut self, offset: Vec2, size: Vec2) -> Self {
        self.texture_offset = offset;
        self.texture_size = size;
        self
    }

    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    pub fn is_atlas_sprite(&self) -> bool {
        !self.sprite_name.is_empty() && !self.atlas_name.is_empty()
    }

    /// UV corners of the texture region with flips applied.
    pub fn uv_rect(&self) -> (Vec2, Vec2) {
        let mut min = self.texture_offset;
        let mut max = self.texture_offset + self.texture_size;
        if self.flip_x {
            std::mem::swap(&mut min.x, &mut max.x);
        }
        if self.flip_y {
            std::mem::swap(&mut min.y, &mut max.y);
        }
        (min, max)
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: None,
            texture_offset: Vec2::ZERO,
            texture_size: Vec2::ONE,
            color: Vec4::ONE,
            flip_x: false,
            flip_y: false,
            sprite_name: String::new(),
            atlas_name: String::new(),
            layer: 0,
        }
    }
}

/// Orthographic 2D camera.
///
/// At zoom 1 the view spans `2 * aspect_ratio` by 2 world units. `rotation`
/// is in degrees. `pan` is applied after rotation, in view space.
/// Call [`Camera2D::update_matrices`] after changing any field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub rotation: f32,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
    pub pan: Vec2,
    pub projection: Mat4,
    pub view: Mat4,
}

define_component!(Camera2D, 102, "Camera2D");

impl Camera2D {
    pub fn new(position: Vec2, zoom: f32, aspect_ratio: f32) -> Self {
        let mut camera = Self {
            position,
            rotation: 0.0,
            zoom,
            near: -1.0,
            far: 1.0,
            aspect_ratio,
            pan: Vec2::ZERO,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    /// Zoom with non-positive values treated as 1.
    fn effective_zoom(&self) -> f32 {
        if self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    pub fn update_matrices(&mut self) {
        let zoom = self.effective_zoom();
        let (w, h) = (self.aspect_ratio / zoom, 1.0 / zoom);
        self.projection = Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far);

        let translation = Mat4::from_translation(-self.position.extend(0.0));
        let rotation = Mat4::from_rotation_z(-self.rotation.to_radians());
        let pan = Mat4::from_translation(self.pan.extend(0.0));
        self.view = pan * rotation * translation;
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Half extents of the visible area in view space.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.aspect_ratio, 1.0) / self.effective_zoom()
    }

    /// World-space axis-aligned rectangle covering everything the camera
    /// sees, including when rotated.
    pub fn visible_bounds(&self) -> Frustum {
        let inverse_rotation = Mat2::from_angle(self.rotation.to_radians());
        let center = self.position - inverse_rotation * self.pan;

        let half = self.half_extents();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let rotated = Vec2::new(
            cos.abs() * half.x + sin.abs() * half.y,
            sin.abs() * half.x + cos.abs() * half.y,
        );
        Frustum::new(center - rotated, center + rotated)
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0, 16.0 / 9.0)
    }
}
