//! Compositor - indexed particle writes plus source-over overlay blending.
//!
//! Two buffers: `base` accumulates settled particle colors across frames,
//! `frame` is what the consumer sees - base with the overlay and UI queues
//! blended on top. The overlay queue accumulates until it is drained by a
//! render; the UI queue is replaced wholesale every frame.

use crate::core::color::Rgba;
use crate::grid::Particle;

/// One pixel scheduled for overlay or UI composition, by image-space index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayPixel {
    pub index: usize,
    pub color: Rgba,
}

pub struct Compositor {
    width: usize,
    height: usize,
    base: Vec<u8>,
    frame: Vec<u8>,
    particle_queue: Vec<(usize, Rgba)>,
    overlay_queue: Vec<OverlayPixel>,
    ui_queue: Vec<OverlayPixel>,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Compositor {
        let size = (width as usize) * (height as usize) * 4;
        Compositor {
            width: width as usize,
            height: height as usize,
            base: vec![0; size],
            frame: vec![0; size],
            particle_queue: Vec::new(),
            overlay_queue: Vec::new(),
            ui_queue: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Image-space flat index for a sim-space cell (the y-flip).
    #[inline]
    fn pixel_index(&self, x: i32, y: i32) -> usize {
        (self.height - 1 - y as usize) * self.width + x as usize
    }

    /// Schedule cells for repaint. With `debug_color` set, the same pixels
    /// are also queued as overlay tint.
    pub fn queue_particles<'a, I>(&mut self, particles: I, debug_color: Option<Rgba>)
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        for p in particles {
            let index = self.pixel_index(p.x, p.y);
            self.particle_queue.push((index, p.color));
            if let Some(color) = debug_color {
                self.overlay_queue.push(OverlayPixel { index, color });
            }
        }
    }

    /// Queue pixels blended over the frame until the next render.
    pub fn queue_overlay_pixels(&mut self, pixels: &[OverlayPixel]) {
        self.overlay_queue.extend_from_slice(pixels);
    }

    /// Replace the per-frame UI layer (cursor outline and friends).
    pub fn set_ui_pixels(&mut self, pixels: Vec<OverlayPixel>) {
        self.ui_queue = pixels;
    }

    /// Flush particle writes into the base buffer, then compose base +
    /// overlay + UI into the output frame. Particle and overlay queues are
    /// drained; the UI queue is left for the next replacement.
    pub fn render(&mut self) {
        for &(index, color) in &self.particle_queue {
            write_pixel(&mut self.base, index, color);
        }
        self.frame.copy_from_slice(&self.base);
        for i in 0..self.overlay_queue.len() {
            let px = self.overlay_queue[i];
            blend_pixel(&mut self.frame, px);
        }
        for i in 0..self.ui_queue.len() {
            let px = self.ui_queue[i];
            blend_pixel(&mut self.frame, px);
        }
        self.particle_queue.clear();
        self.overlay_queue.clear();
    }

    /// The composed frame: top-left-origin RGBA8, `W*H*4` bytes.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }
}

#[inline]
fn write_pixel(buffer: &mut [u8], index: usize, color: Rgba) {
    let offset = index * 4;
    if let Some(slot) = buffer.get_mut(offset..offset + 4) {
        slot.copy_from_slice(&[color.r, color.g, color.b, color.a]);
    } else {
        debug_assert!(false, "pixel index {} out of range", index);
    }
}

#[inline]
fn blend_pixel(buffer: &mut [u8], px: OverlayPixel) {
    let offset = px.index * 4;
    if let Some(slot) = buffer.get_mut(offset..offset + 4) {
        let dst = Rgba::new(slot[0], slot[1], slot[2], slot[3]);
        let out = dst.blend_over(px.color);
        slot.copy_from_slice(&[out.r, out.g, out.b, out.a]);
    } else {
        debug_assert!(false, "overlay index {} out of range", px.index);
    }
}
