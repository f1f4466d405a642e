use std::sync::Mutex;

use super::*;

/// Border padding (in pixels) around each block so a splat from a sample near
/// the block edge can still reach neighboring blocks' border rows (§4.8/§5).
pub const BORDER_SIZE: usize = 2;

/// A rectangular tile of the image, accumulating filter-weighted radiance
/// splats plus their total filter weight (§4.8), grounded in Nori's
/// `ImageBlock`. Interior mutability is behind a mutex so multiple render
/// threads can splat into overlapping borders concurrently.
pub struct ImageBlock {
    offset: (i32, i32),
    size: (u32, u32),
    pixels: Mutex<Vec<ColorRgba>>,
}

impl ImageBlock {
    pub fn new(offset: (i32, i32), size: (u32, u32)) -> Self {
        let stride = size.0 as usize + 2 * BORDER_SIZE;
        let rows = size.1 as usize + 2 * BORDER_SIZE;
        Self {
            offset,
            size,
            pixels: Mutex::new(vec![ColorRgba::new(0.0, 0.0, 0.0, 0.0); stride * rows]),
        }
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn stride(&self) -> usize {
        self.size.0 as usize + 2 * BORDER_SIZE
    }

    /// Splats `value`, weighted by `filter`, at the continuous film position
    /// `pos` (in the block's local pixel space, border included).
    pub fn put(&self, pos: Point2, value: ColorRgb, filter: &GaussianFilter) {
        if !value.is_finite() {
            log::warn!("dropping non-finite radiance sample at {pos:?}");
            return;
        }

        let radius = filter.radius();
        let x0 = ((pos.x - radius).floor() as i32).max(-(BORDER_SIZE as i32));
        let x1 = ((pos.x + radius).ceil() as i32).min(self.size.0 as i32 + BORDER_SIZE as i32 - 1);
        let y0 = ((pos.y - radius).floor() as i32).max(-(BORDER_SIZE as i32));
        let y1 = ((pos.y + radius).ceil() as i32).min(self.size.1 as i32 + BORDER_SIZE as i32 - 1);

        let stride = self.stride();
        let mut pixels = self.pixels.lock().expect("image block mutex poisoned");
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = pos.x - (x as f32 + 0.5);
                let dy = pos.y - (y as f32 + 0.5);
                let weight = filter.eval_tabulated(dx) * filter.eval_tabulated(dy);
                if weight == 0.0 {
                    continue;
                }
                let row = (y + BORDER_SIZE as i32) as usize;
                let col = (x + BORDER_SIZE as i32) as usize;
                let index = row * stride + col;
                let prev = pixels[index];
                pixels[index] = ColorRgba::new(
                    prev.r() + value.r() * weight,
                    prev.g() + value.g() * weight,
                    prev.b() + value.b() * weight,
                    prev.a() + weight,
                );
            }
        }
    }

    /// Adds another block's pixels (including its border) into this one, at
    /// the other block's recorded world offset. Used to merge per-tile blocks
    /// into the full-image accumulator.
    pub fn merge(&self, other: &ImageBlock) {
        let dst_stride = self.stride();
        let src_stride = other.stride();
        let dx = other.offset.0 - self.offset.0;
        let dy = other.offset.1 - self.offset.1;

        let src = other.pixels.lock().expect("image block mutex poisoned");
        let mut dst = self.pixels.lock().expect("image block mutex poisoned");

        for sy in 0..(other.size.1 as i32 + 2 * BORDER_SIZE as i32) {
            for sx in 0..(other.size.0 as i32 + 2 * BORDER_SIZE as i32) {
                let ty = sy + dy;
                let tx = sx + dx;
                if ty < 0
                    || tx < 0
                    || ty >= self.size.1 as i32 + 2 * BORDER_SIZE as i32
                    || tx >= self.size.0 as i32 + 2 * BORDER_SIZE as i32
                {
                    continue;
                }
                let src_index = sy as usize * src_stride + sx as usize;
                let dst_index = ty as usize * dst_stride + tx as usize;
                let s = src[src_index];
                let d = dst[dst_index];
                dst[dst_index] =
                    ColorRgba::new(d.r() + s.r(), d.g() + s.g(), d.b() + s.b(), d.a() + s.a());
            }
        }
    }

    /// Resolves accumulated splats into a final, border-cropped image by
    /// dividing through by each pixel's total filter weight.
    pub fn to_image(&self) -> Vec<ColorRgb> {
        let stride = self.stride();
        let pixels = self.pixels.lock().expect("image block mutex poisoned");
        let mut out = Vec::with_capacity((self.size.0 * self.size.1) as usize);
        for y in 0..self.size.1 {
            for x in 0..self.size.0 {
                let index = (y as usize + BORDER_SIZE) * stride + (x as usize + BORDER_SIZE);
                let p = pixels[index];
                out.push(if p.a() > 0.0 {
                    p.rgb() / p.a()
                } else {
                    ColorRgb::BLACK
                });
            }
        }
        out
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SpiralDirection {
    Right,
    Down,
    Left,
    Up,
}

impl SpiralDirection {
    fn next(self) -> Self {
        match self {
            SpiralDirection::Right => SpiralDirection::Down,
            SpiralDirection::Down => SpiralDirection::Left,
            SpiralDirection::Left => SpiralDirection::Up,
            SpiralDirection::Up => SpiralDirection::Right,
        }
    }
}

/// Generates tile offsets/sizes in an outward spiral starting at the image
/// center (§5), grounded in Nori's `BlockGenerator`. Tile-parallel rendering
/// (`rayon`) drains this generator's full list up front rather than polling it
/// under a lock per-thread.
pub struct BlockGenerator {
    image_size: (u32, u32),
    block_size: u32,
    num_blocks: (i32, i32),
    block: (i32, i32),
    blocks_left: i32,
    direction: SpiralDirection,
    steps_left: i32,
    num_steps: i32,
}

impl BlockGenerator {
    pub fn new(image_size: (u32, u32), block_size: u32) -> Self {
        let num_blocks = (
            (image_size.0 as f32 / block_size as f32).ceil() as i32,
            (image_size.1 as f32 / block_size as f32).ceil() as i32,
        );
        Self {
            image_size,
            block_size,
            num_blocks,
            block: (num_blocks.0 / 2, num_blocks.1 / 2),
            blocks_left: num_blocks.0 * num_blocks.1,
            direction: SpiralDirection::Right,
            steps_left: 1,
            num_steps: 1,
        }
    }

    /// Returns `(offset, size)` for the next tile, or `None` once every tile
    /// has been produced.
    pub fn next(&mut self) -> Option<((i32, i32), (u32, u32))> {
        if self.blocks_left == 0 {
            return None;
        }

        let pos = (self.block.0 * self.block_size as i32, self.block.1 * self.block_size as i32);
        let size = (
            (self.image_size.0 as i32 - pos.0).clamp(0, self.block_size as i32) as u32,
            (self.image_size.1 as i32 - pos.1).clamp(0, self.block_size as i32) as u32,
        );

        self.blocks_left -= 1;
        if self.blocks_left == 0 {
            return Some((pos, size));
        }

        loop {
            match self.direction {
                SpiralDirection::Right => self.block.0 += 1,
                SpiralDirection::Down => self.block.1 += 1,
                SpiralDirection::Left => self.block.0 -= 1,
                SpiralDirection::Up => self.block.1 -= 1,
            }

            self.steps_left -= 1;
            if self.steps_left == 0 {
                self.direction = self.direction.next();
                if matches!(self.direction, SpiralDirection::Left | SpiralDirection::Right) {
                    self.num_steps += 1;
                }
                self.steps_left = self.num_steps;
            }

            if self.block.0 >= 0
                && self.block.0 < self.num_blocks.0
                && self.block.1 >= 0
                && self.block.1 < self.num_blocks.1
            {
                break;
            }
        }

        Some((pos, size))
    }

    /// Drains every remaining tile eagerly, for handing to `rayon`'s
    /// work-stealing pool as one parallel iterator (§5).
    pub fn collect_all(mut self) -> Vec<((i32, i32), (u32, u32))> {
        let mut tiles = Vec::with_capacity((self.num_blocks.0 * self.num_blocks.1) as usize);
        while let Some(tile) = self.next() {
            tiles.push(tile);
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_generator_covers_every_tile_exactly_once() {
        let tiles = BlockGenerator::new((100, 70), 32).collect_all();
        assert_eq!(tiles.len(), 3 * 3);
        let mut covered = vec![vec![false; 70]; 100];
        for (offset, size) in tiles {
            for x in offset.0..(offset.0 + size.0 as i32) {
                for y in offset.1..(offset.1 + size.1 as i32) {
                    assert!(!covered[x as usize][y as usize]);
                    covered[x as usize][y as usize] = true;
                }
            }
        }
        assert!(covered.iter().flatten().all(|&c| c));
    }

    #[test]
    fn test_put_and_resolve_single_sample() {
        let block = ImageBlock::new((0, 0), (4, 4));
        let filter = GaussianFilter::default();
        block.put(point![2.0, 2.0], ColorRgb::WHITE, &filter);
        let image = block.to_image();
        assert_eq!(image.len(), 16);
        assert!(image.iter().any(|c| !c.is_black()));
    }

    #[test]
    fn test_merge_accumulates_overlapping_splats() {
        let a = ImageBlock::new((0, 0), (4, 4));
        let b = ImageBlock::new((0, 0), (4, 4));
        let filter = GaussianFilter::default();
        a.put(point![2.0, 2.0], ColorRgb::WHITE, &filter);
        b.put(point![2.0, 2.0], ColorRgb::WHITE, &filter);
        a.merge(&b);
        let image = a.to_image();
        assert!(image.iter().any(|c| c.r() > 0.9));
    }
}
