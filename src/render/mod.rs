//! Rendering module
//!
//! Turns a [`WorldState`](crate::sim::state::WorldState) snapshot into draw
//! calls against a [`Surface`]. The composer pre-transforms all geometry
//! (projection, sprite scale, ship roll) so surfaces stay stateless: screen
//! coordinates in, pixels out.

pub mod frame;
pub mod term;

pub use frame::render;
pub use term::TermSurface;

use glam::Vec2;

use crate::sim::state::Rgb;

/// Horizontal anchor for [`Surface::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// 8-bit RGBA color. Alpha 255 is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const RED: Rgba = Rgba::opaque(255, 0, 0);
    pub const GREEN: Rgba = Rgba::opaque(0, 128, 0);
    pub const CYAN: Rgba = Rgba::opaque(0, 255, 255);
    pub const YELLOW: Rgba = Rgba::opaque(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scale alpha by `fade` in `[0, 1]`.
    pub fn faded(self, fade: f32) -> Self {
        let a = (self.a as f32 * fade.clamp(0.0, 1.0)) as u8;
        Self { a, ..self }
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        Rgba::opaque(c.r, c.g, c.b)
    }
}

/// Drawing target for one composed frame.
///
/// All coordinates are screen pixels. Calls arrive back-to-front; the surface
/// just paints in order. Implementations decide how (or whether) to blend
/// translucent colors.
pub trait Surface {
    /// Fill the whole viewport.
    fn clear(&mut self, color: Rgba);

    /// Filled circle.
    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Stroked segment.
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);

    /// Filled convex polygon.
    fn polygon(&mut self, points: &[Vec2], color: Rgba);

    /// Filled axis-aligned rectangle with rounded corners.
    fn rounded_rect(&mut self, min: Vec2, max: Vec2, corner: f32, color: Rgba);

    /// Text with its baseline anchor at `pos`.
    fn text(&mut self, text: &str, pos: Vec2, size: f32, align: TextAlign, color: Rgba);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faded_scales_alpha() {
        let c = Rgba::opaque(10, 20, 30).faded(0.5);
        assert_eq!(c.a, 127);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    }

    #[test]
    fn faded_clamps_out_of_range() {
        assert_eq!(Rgba::WHITE.faded(2.0).a, 255);
        assert_eq!(Rgba::WHITE.faded(-1.0).a, 0);
    }

    #[test]
    fn rgb_converts_opaque() {
        let c: Rgba = Rgb { r: 1, g: 2, b: 3 }.into();
        assert_eq!(c, Rgba::opaque(1, 2, 3));
    }
}
