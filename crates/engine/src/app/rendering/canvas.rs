/// RGBA8 frame buffer view with clipped, alpha-blended writes.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if frame.len() < expected {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
        })
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn clear(&mut self, color: [u8; 4]) {
        let end = self.width as usize * self.height as usize * 4;
        for chunk in self.frame[..end].chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub(crate) fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(out)
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Source-over blend; the destination stays opaque.
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let alpha = color[3] as u32;
        if alpha == 0 {
            return;
        }
        let dst = &mut self.frame[offset..offset + 4];
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        let inverse = 255 - alpha;
        for channel in 0..3 {
            let mixed = color[channel] as u32 * alpha + dst[channel] as u32 * inverse;
            dst[channel] = ((mixed + 127) / 255) as u8;
        }
        dst[3] = 255;
    }

    pub(crate) fn fill_rect(&mut self, left: i32, top: i32, width: i32, height: i32, color: [u8; 4]) {
        let x_start = left.max(0);
        let y_start = top.max(0);
        let x_end = left.saturating_add(width).min(self.width as i32);
        let y_end = top.saturating_add(height).min(self.height as i32);
        for y in y_start..y_end {
            for x in x_start..x_end {
                self.blend_pixel(x, y, color);
            }
        }
    }

    pub(crate) fn outline_rect(&mut self, left: i32, top: i32, width: i32, height: i32, color: [u8; 4]) {
        if width <= 0 || height <= 0 {
            return;
        }
        let right = left + width - 1;
        let bottom = top + height - 1;
        for x in left..=right {
            self.blend_pixel(x, top, color);
            self.blend_pixel(x, bottom, color);
        }
        for y in (top + 1)..bottom {
            self.blend_pixel(left, y, color);
            self.blend_pixel(right, y, color);
        }
    }

    pub(crate) fn fill_circle(&mut self, center_x: f32, center_y: f32, radius: f32, color: [u8; 4]) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        let top = (center_y - radius).floor() as i32;
        let bottom = (center_y + radius).ceil() as i32;
        let left = (center_x - radius).floor() as i32;
        let right = (center_x + radius).ceil() as i32;
        for y in top.max(0)..bottom.min(self.height as i32) {
            let dy = y as f32 + 0.5 - center_y;
            for x in left.max(0)..right.min(self.width as i32) {
                let dx = x as f32 + 0.5 - center_x;
                if dx * dx + dy * dy <= radius_sq {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }
}
