//! Caller-side rendering harness: evaluate a compiled haiku once per
//! pixel and pack the result into an 8-bit RGB image.
//!
//! Engines share no mutable state, so rows are rendered in parallel
//! with one engine clone per worker.

use crate::engine::Engine;
use crate::interp::Vars;
use rayon::prelude::*;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub t: f64,
    pub dt: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            t: 0.0,
            dt: 0.0,
        }
    }
}

/// Render into a `width * height * 3` RGB buffer, row 0 at the top.
/// `x` and `y` run over [0, 1]; `y` grows upward as on the canvas the
/// dialect was made for. The top three stack values are blue, green
/// and red; missing values read as zero.
pub fn render_rgb(engine: &Engine, opts: &RenderOptions) -> Vec<u8> {
    let width = opts.width.max(1) as usize;
    let height = opts.height.max(1) as usize;
    let mut image = vec![0u8; width * height * 3];

    image
        .par_chunks_mut(width * 3)
        .enumerate()
        .for_each_init(
            || engine.clone(),
            |engine, (row, out)| {
                let y = 1.0 - row as f64 / (height - 1).max(1) as f64;
                for col in 0..width {
                    let mut vars = Vars {
                        x: col as f64 / (width - 1).max(1) as f64,
                        y,
                        t: opts.t,
                        dt: opts.dt,
                        ..Default::default()
                    };
                    engine.run(&mut vars);
                    let b = engine.d_stack_pop(&mut vars).unwrap_or(0.0);
                    let g = engine.d_stack_pop(&mut vars).unwrap_or(0.0);
                    let r = engine.d_stack_pop(&mut vars).unwrap_or(0.0);
                    let pixel = &mut out[col * 3..col * 3 + 3];
                    pixel[0] = channel(r);
                    pixel[1] = channel(g);
                    pixel[2] = channel(b);
                }
            },
        );

    image
}

/// Write a binary PPM (P6) image.
pub fn write_ppm(
    mut writer: impl Write,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> io::Result<()> {
    write!(writer, "P6\n{width} {height}\n255\n")?;
    writer.write_all(pixels)
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_fills_the_buffer() {
        // r g b pushed in that order: red on the bottom, blue on top.
        let engine = Engine::compile("1 0.5 0").unwrap();
        let opts = RenderOptions {
            width: 4,
            height: 2,
            ..Default::default()
        };
        let image = render_rgb(&engine, &opts);
        assert_eq!(image.len(), 4 * 2 * 3);
        for pixel in image.chunks(3) {
            assert_eq!(pixel, [255, 127, 0]);
        }
    }

    #[test]
    fn gradient_varies_with_x() {
        let engine = Engine::compile("x x x").unwrap();
        let opts = RenderOptions {
            width: 3,
            height: 1,
            ..Default::default()
        };
        let image = render_rgb(&engine, &opts);
        assert_eq!(&image[0..3], [0, 0, 0]);
        assert_eq!(&image[6..9], [255, 255, 255]);
    }

    #[test]
    fn short_stacks_read_as_black() {
        let engine = Engine::compile("1").unwrap();
        let opts = RenderOptions {
            width: 1,
            height: 1,
            ..Default::default()
        };
        // One value on the stack: blue only.
        assert_eq!(render_rgb(&engine, &opts), vec![0, 0, 255]);
    }

    #[test]
    fn ppm_header_and_payload() {
        let mut out = Vec::new();
        write_ppm(&mut out, 2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert!(out.starts_with(b"P6\n2 1\n255\n"));
        assert!(out.ends_with(&[1, 2, 3, 4, 5, 6]));
    }
}
