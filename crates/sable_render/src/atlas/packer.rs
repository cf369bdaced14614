// packer.rs - Binary-tree rectangle packer
//
// Each leaf is a free rectangle. Inserting into a leaf that is larger than
// the request splits it in two and recurses into the first half. When more
// width than height is left over, the cut is vertical: a full-height column
// as wide as the request, then the rest to its right. Otherwise the cut is
// horizontal: a full-width row as tall as the request, then the rest below.
// Exact fits mark the leaf occupied.

/// Integer pixel rectangle inside an atlas, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn overlaps(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Shrink by `border` pixels on every side.
    pub fn inset(&self, border: u32) -> PixelRect {
        PixelRect::new(
            self.x + border,
            self.y + border,
            self.width.saturating_sub(border * 2),
            self.height.saturating_sub(border * 2),
        )
    }
}

#[derive(Debug)]
struct AtlasNode {
    rect: PixelRect,
    occupied: bool,
    children: Option<Box<[AtlasNode; 2]>>,
}

impl AtlasNode {
    fn leaf(rect: PixelRect) -> Self {
        Self {
            rect,
            occupied: false,
            children: None,
        }
    }

    fn insert(&mut self, width: u32, height: u32) -> Option<PixelRect> {
        if let Some(children) = self.children.as_mut() {
            let [first, second] = &mut **children;
            return first
                .insert(width, height)
                .or_else(|| second.insert(width, height));
        }

        if self.occupied || width > self.rect.width || height > self.rect.height {
            return None;
        }

        if width == self.rect.width && height == self.rect.height {
            self.occupied = true;
            return Some(self.rect);
        }

        let PixelRect { x, y, width: w, height: h } = self.rect;
        let dw = w - width;
        let dh = h - height;

        let halves = if dw > dh {
            [
                AtlasNode::leaf(PixelRect::new(x, y, width, h)),
                AtlasNode::leaf(PixelRect::new(x + width, y, dw, h)),
            ]
        } else {
            [
                AtlasNode::leaf(PixelRect::new(x, y, w, height)),
                AtlasNode::leaf(PixelRect::new(x, y + height, w, dh)),
            ]
        };
        let children = self.children.insert(Box::new(halves));
        children[0].insert(width, height)
    }
}

/// Packs rectangles into a fixed-size area. One packer per packing attempt;
/// there is no removal.
#[derive(Debug)]
pub struct AtlasPacker {
    root: AtlasNode,
    used: u64,
}

impl AtlasPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            root: AtlasNode::leaf(PixelRect::new(0, 0, width, height)),
            used: 0,
        }
    }

    /// Reserve a `width` x `height` rectangle, or `None` if no free leaf
    /// can hold it.
    pub fn insert(&mut self, width: u32, height: u32) -> Option<PixelRect> {
        if width == 0 || height == 0 {
            return None;
        }
        let rect = self.root.insert(width, height)?;
        self.used += rect.area();
        Some(rect)
    }

    /// Pixels reserved so far.
    pub fn used_area(&self) -> u64 {
        self.used
    }

    pub fn total_area(&self) -> u64 {
        self.root.rect.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fit_fills_root() {
        let mut packer = AtlasPacker::new(16, 16);
        assert_eq!(packer.insert(16, 16), Some(PixelRect::new(0, 0, 16, 16)));
        assert_eq!(packer.insert(1, 1), None);
    }

    #[test]
    fn wide_remainder_splits_vertically() {
        let mut packer = AtlasPacker::new(64, 16);
        let a = packer.insert(10, 16).unwrap();
        let b = packer.insert(10, 16).unwrap();
        assert_eq!(a, PixelRect::new(0, 0, 10, 16));
        assert_eq!(b, PixelRect::new(10, 0, 10, 16));
    }

    #[test]
    fn tall_remainder_splits_horizontally() {
        let mut packer = AtlasPacker::new(16, 64);
        let a = packer.insert(16, 10).unwrap();
        let b = packer.insert(16, 10).unwrap();
        assert_eq!(a, PixelRect::new(0, 0, 16, 10));
        assert_eq!(b, PixelRect::new(0, 10, 16, 10));
    }

    #[test]
    fn placements_never_overlap() {
        let mut packer = AtlasPacker::new(128, 128);
        let mut placed = Vec::new();
        for (w, h) in [(40, 30), (30, 40), (20, 20), (18, 18), (10, 33), (33, 10), (7, 7)] {
            let rect = packer.insert(w, h).expect("fits");
            assert!(rect.right() <= 128 && rect.bottom() <= 128);
            assert!(placed.iter().all(|p: &PixelRect| !p.overlaps(&rect)));
            placed.push(rect);
        }
        let total: u64 = placed.iter().map(PixelRect::area).sum();
        assert_eq!(packer.used_area(), total);
    }

    #[test]
    fn too_large_is_rejected() {
        let mut packer = AtlasPacker::new(32, 32);
        assert_eq!(packer.insert(33, 1), None);
        assert_eq!(packer.insert(0, 4), None);
        assert_eq!(packer.used_area(), 0);
    }

    #[test]
    fn inset_strips_padding() {
        let padded = PixelRect::new(4, 6, 18, 10);
        assert_eq!(padded.inset(1), PixelRect::new(5, 7, 16, 8));
    }
}
