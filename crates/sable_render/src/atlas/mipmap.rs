// mipmap.rs - CPU mip chain for RGBA8 images
//
// Each level halves both dimensions (rounding down, never below 1) and
// averages the 2x2 block of the level above. Odd edges reuse the last
// column or row.

use crate::backend::MipLevel;

/// Number of levels down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Build the full chain starting with `base` as level 0.
pub fn build_mip_chain(base: MipLevel) -> Vec<MipLevel> {
    let count = mip_level_count(base.width, base.height) as usize;
    let mut levels = Vec::with_capacity(count);
    levels.push(base);

    while levels.len() < count {
        let next = downsample(&levels[levels.len() - 1]);
        levels.push(next);
    }
    levels
}

fn downsample(src: &MipLevel) -> MipLevel {
    let width = (src.width / 2).max(1);
    let height = (src.height / 2).max(1);
    let mut pixels = vec![0u8; width as usize * height as usize * 4];

    let at = |x: u32, y: u32| -> usize {
        let x = x.min(src.width - 1) as usize;
        let y = y.min(src.height - 1) as usize;
        (y * src.width as usize + x) * 4
    };

    for y in 0..height {
        for x in 0..width {
            let taps = [
                at(x * 2, y * 2),
                at(x * 2 + 1, y * 2),
                at(x * 2, y * 2 + 1),
                at(x * 2 + 1, y * 2 + 1),
            ];
            let dst = (y as usize * width as usize + x as usize) * 4;
            for channel in 0..4 {
                let sum: u32 = taps.iter().map(|&i| src.pixels[i + channel] as u32).sum();
                pixels[dst + channel] = ((sum + 2) / 4) as u8;
            }
        }
    }

    MipLevel::new(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(64, 64), 7);
        assert_eq!(mip_level_count(64, 16), 7);
        assert_eq!(mip_level_count(5, 3), 3);
    }

    #[test]
    fn chain_halves_to_one_pixel() {
        let base = MipLevel::new(4, 2, vec![200; 4 * 2 * 4]);
        let chain = build_mip_chain(base);
        let dims: Vec<(u32, u32)> = chain.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(dims, vec![(4, 2), (2, 1), (1, 1)]);
        assert!(chain.iter().all(|l| l.pixels.len() == l.expected_len()));
        assert!(chain[2].pixels.iter().all(|&p| p == 200));
    }

    #[test]
    fn box_filter_averages_block() {
        // 2x2: one opaque white pixel, three transparent black
        let mut pixels = vec![0u8; 16];
        pixels[..4].copy_from_slice(&[255, 255, 255, 255]);
        let chain = build_mip_chain(MipLevel::new(2, 2, pixels));
        assert_eq!(chain[1].pixels, vec![64, 64, 64, 64]);
    }

    #[test]
    fn odd_sizes_index_rows_and_clamp_edges() {
        // red channel encodes the source index times ten
        let square: Vec<u8> = (0..9u8).flat_map(|i| [i * 10, 0, 0, 255]).collect();
        let chain = build_mip_chain(MipLevel::new(3, 3, square));
        assert_eq!((chain[1].width, chain[1].height), (1, 1));
        // taps 0, 1, 3, 4
        assert_eq!(chain[1].pixels, vec![20, 0, 0, 255]);

        let column: Vec<u8> = (0..3u8).flat_map(|i| [i * 10, 0, 0, 255]).collect();
        let chain = build_mip_chain(MipLevel::new(1, 3, column));
        // x clamps to the single column: taps 0, 0, 1, 1
        assert_eq!(chain[1].pixels, vec![5, 0, 0, 255]);
    }
}
