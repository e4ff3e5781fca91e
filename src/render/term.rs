//! Terminal surface
//!
//! Rasterizes [`Surface`] primitives into a character cell grid, then
//! presents the grid with queued crossterm commands. One cell stands for a
//! [`CELL_W`]×[`CELL_H`] pixel block, so an 80×30 terminal covers an 800×600
//! viewport. No blending: translucent colors are darkened toward the black
//! clear when plotted.

use std::io::{self, Write};

use crossterm::{
    QueueableCommand, cursor,
    style::{self, Color, Print},
};
use glam::Vec2;

use super::{Rgba, Surface, TextAlign};
use crate::sim::projection::Viewport;

/// Pixels covered by one cell horizontally.
pub const CELL_W: f32 = 10.0;
/// Pixels covered by one cell vertically; cells are about twice as tall as wide.
pub const CELL_H: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Rgba,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: Rgba::BLACK,
};

/// Cell-grid implementation of [`Surface`] for terminal presentation.
pub struct TermSurface {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl TermSurface {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK; cols as usize * rows as usize],
        }
    }

    /// Pixel-space viewport this grid covers.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.cols as f32 * CELL_W, self.rows as f32 * CELL_H)
    }

    /// Rebuild the grid for a new terminal size.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows);
    }

    /// Queue the grid to `out` and flush.
    ///
    /// Rows are painted left to right with color changes only where a visible
    /// glyph needs one.
    pub fn present<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut last: Option<Rgba> = None;
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            let mut run = String::with_capacity(self.cols as usize);
            for col in 0..self.cols {
                let cell = self.cells[row as usize * self.cols as usize + col as usize];
                if cell.ch != ' ' && last != Some(cell.color) {
                    if !run.is_empty() {
                        out.queue(Print(std::mem::take(&mut run)))?;
                    }
                    out.queue(style::SetForegroundColor(Color::Rgb {
                        r: cell.color.r,
                        g: cell.color.g,
                        b: cell.color.b,
                    }))?;
                    last = Some(cell.color);
                }
                run.push(cell.ch);
            }
            out.queue(Print(run))?;
        }
        out.queue(style::ResetColor)?;
        out.flush()
    }

    fn cell_of(p: Vec2) -> (i32, i32) {
        (
            (p.x / CELL_W).floor() as i32,
            (p.y / CELL_H).floor() as i32,
        )
    }

    fn cell_center(col: i32, row: i32) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * CELL_W,
            (row as f32 + 0.5) * CELL_H,
        )
    }

    fn plot(&mut self, col: i32, row: i32, ch: char, color: Rgba) {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return;
        }
        self.cells[row as usize * self.cols as usize + col as usize] = Cell {
            ch,
            color: premultiply(color),
        };
    }

    fn plot_px(&mut self, p: Vec2, ch: char, color: Rgba) {
        let (col, row) = Self::cell_of(p);
        self.plot(col, row, ch, color);
    }

    #[cfg(test)]
    fn cell_at(&self, col: u16, row: u16) -> (char, Rgba) {
        let cell = self.cells[row as usize * self.cols as usize + col as usize];
        (cell.ch, cell.color)
    }

    #[cfg(test)]
    fn count_char(&self, ch: char) -> usize {
        self.cells.iter().filter(|c| c.ch == ch).count()
    }
}

impl Surface for TermSurface {
    fn clear(&mut self, color: Rgba) {
        let fill = Cell {
            ch: ' ',
            color: premultiply(color),
        };
        self.cells.fill(fill);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let ch = if radius >= 6.0 {
            '●'
        } else if radius >= 2.5 {
            '•'
        } else {
            '·'
        };
        // Sub-cell circles collapse to a single glyph; bigger ones always
        // keep their center cell even when no cell center falls inside.
        self.plot_px(center, ch, color);
        if radius * 2.0 < CELL_H {
            return;
        }
        let (c0, r0) = Self::cell_of(center - Vec2::splat(radius));
        let (c1, r1) = Self::cell_of(center + Vec2::splat(radius));
        for row in r0..=r1 {
            for col in c0..=c1 {
                if Self::cell_center(col, row).distance_squared(center) <= radius * radius {
                    self.plot(col, row, ch, color);
                }
            }
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, _width: f32, color: Rgba) {
        let delta = to - from;
        let ch = if delta.x.abs() > delta.y.abs() {
            '─'
        } else {
            '│'
        };
        let steps = (delta.length() / 4.0).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let p = from + delta * (i as f32 / steps as f32);
            self.plot_px(p, ch, color);
        }
    }

    fn polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        let (c0, r0) = Self::cell_of(min);
        let (c1, r1) = Self::cell_of(max);
        for row in r0..=r1 {
            for col in c0..=c1 {
                if point_in_polygon(Self::cell_center(col, row), points) {
                    self.plot(col, row, '█', color);
                }
            }
        }
        // Slivers thinner than a cell still leave their outline.
        for p in points {
            self.plot_px(*p, '█', color);
        }
    }

    fn rounded_rect(&mut self, min: Vec2, max: Vec2, _corner: f32, color: Rgba) {
        let (c0, r0) = Self::cell_of(min);
        let (c1, r1) = Self::cell_of(max);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.plot(col, row, '░', color);
            }
        }
    }

    fn text(&mut self, text: &str, pos: Vec2, _size: f32, align: TextAlign, color: Rgba) {
        let (mut col, row) = Self::cell_of(pos);
        if align == TextAlign::Center {
            col -= text.chars().count() as i32 / 2;
        }
        for (i, ch) in text.chars().enumerate() {
            self.plot(col + i as i32, row, ch, color);
        }
    }
}

/// Darken by alpha; the grid has no blending and clears to black.
fn premultiply(c: Rgba) -> Rgba {
    let k = c.a as f32 / 255.0;
    Rgba::opaque(
        (c.r as f32 * k) as u8,
        (c.g as f32 * k) as u8,
        (c.b as f32 * k) as u8,
    )
}

/// Even-odd crossing test against the closed polygon `pts`.
fn point_in_polygon(p: Vec2, pts: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = pts.len() - 1;
    for i in 0..pts.len() {
        let (a, b) = (pts[i], pts[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
