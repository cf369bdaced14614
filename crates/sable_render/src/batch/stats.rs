/// Per-frame batching counters. Reset by every `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub sprites_rendered: u32,
    pub sprites_culled: u32,
    pub batches_created: u32,
    /// Wall time from `begin` through the end of `end`, in milliseconds.
    pub last_frame_time_ms: f32,
}

impl RenderStats {
    /// Sprites submitted this frame, visible or not.
    pub fn sprites_submitted(&self) -> u32 {
        self.sprites_rendered + self.sprites_culled
    }
}
