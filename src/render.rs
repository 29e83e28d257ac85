//! Braille rendering of a [`Director`] frame
//!
//! Every terminal cell holds a 2x4 braille block, so the canvas has twice the
//! columns and four times the rows of the terminal. Each dot remembers the
//! brightest [`Layer`] drawn on it; a cell takes the color of its brightest dot.

use crate::colors::{layer_color, Layer};
use crate::globe::math::Vec3;
use crate::globe::Director;
use crate::terminal::Terminal;

/// Opacity below which a fading layer is not drawn
const MIN_OPACITY: f64 = 0.05;

/// Braille bit for each dot of a cell, indexed by [row][column]
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

pub struct BrailleCanvas {
    width: usize,
    height: usize,
    dots: Vec<Option<Layer>>,
}

impl BrailleCanvas {
    /// Canvas covering a terminal of `cols`x`rows` cells
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        let width = cols as usize * 2;
        let height = rows as usize * 4;
        Self { width, height, dots: vec![None; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.dots.fill(None);
    }

    /// Light a dot; a dimmer layer never overwrites a brighter one
    pub fn plot(&mut self, x: i32, y: i32, layer: Layer) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let slot = &mut self.dots[y as usize * self.width + x as usize];
        if slot.map_or(true, |current| layer >= current) {
            *slot = Some(layer);
        }
    }

    /// Filled diamond of the given radius
    pub fn blob(&mut self, x: i32, y: i32, radius: i32, layer: Layer) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() + dy.abs() <= radius {
                    self.plot(x + dx, y + dy, layer);
                }
            }
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Layer> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.dots[y * self.width + x]
    }

    /// Braille glyph and brightest layer of terminal cell (cx, cy)
    pub fn cell(&self, cx: usize, cy: usize) -> Option<(char, Layer)> {
        let mut bits: u8 = 0;
        let mut brightest: Option<Layer> = None;

        for (row, row_bits) in DOT_BITS.iter().enumerate() {
            for (col, bit) in row_bits.iter().enumerate() {
                if let Some(layer) = self.get(cx * 2 + col, cy * 4 + row) {
                    bits |= bit;
                    brightest = Some(brightest.map_or(layer, |b| b.max(layer)));
                }
            }
        }

        let layer = brightest?;
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, layer))
    }

    /// Copy the canvas into the terminal buffer
    pub fn draw(&self, term: &mut Terminal, scheme: u8, color: bool) {
        let cols = self.width / 2;
        let rows = self.height / 4;
        for cy in 0..rows {
            for cx in 0..cols {
                if let Some((ch, layer)) = self.cell(cx, cy) {
                    if color {
                        let (fg, bold) = layer_color(scheme, layer, false);
                        term.set(cx as i32, cy as i32, ch, Some(fg), bold);
                    } else {
                        term.set(cx as i32, cy as i32, ch, None, false);
                    }
                }
            }
        }
    }
}

/// Whether the segment from `eye` to `point` passes through the sphere of
/// `radius` at the origin before reaching `point`
pub fn occluded(eye: Vec3, point: Vec3, radius: f64) -> bool {
    let dir = point - eye;
    let a = dir.length_squared();
    if a == 0.0 {
        return false;
    }
    let b = 2.0 * eye.dot(dir);
    let c = eye.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 {
        return false;
    }
    let t = (-b - disc.sqrt()) / (2.0 * a);
    t > 1e-9 && t < 1.0 - 1e-9
}

/// Layer of a cloud dot: country dots stand out, anything behind the shell is dimmed
fn cloud_layer(country: bool, behind: bool) -> Layer {
    match (country, behind) {
        (_, true) => Layer::BackDot,
        (true, false) => Layer::Connector,
        (false, false) => Layer::FrontDot,
    }
}

/// Draws director frames onto a braille canvas
pub struct Renderer {
    canvas: BrailleCanvas,
    cloud: Vec<Vec3>,
}

impl Renderer {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { canvas: BrailleCanvas::for_terminal(cols, rows), cloud: Vec::new() }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas = BrailleCanvas::for_terminal(cols, rows);
    }

    /// Width/height of the canvas in dots
    pub fn aspect(&self) -> f64 {
        if self.canvas.height == 0 {
            return 1.0;
        }
        self.canvas.width as f64 / self.canvas.height as f64
    }

    pub fn canvas(&self) -> &BrailleCanvas {
        &self.canvas
    }

    /// Render the current frame into the terminal buffer. Colors come from
    /// `scheme` unless `color` is false.
    pub fn render(&mut self, director: &mut Director, term: &mut Terminal, scheme: u8, color: bool) {
        if director.take_points_dirty() || self.cloud.is_empty() {
            self.cloud.clear();
            self.cloud.extend_from_slice(director.points().positions());
        }

        self.canvas.clear();
        let w = self.canvas.width as f64;
        let h = self.canvas.height as f64;
        let controls = director.controls();
        let eye = controls.position();
        let shell = director.shell_radius();
        let shell_shown = director.globe_opacity() > MIN_OPACITY;

        if shell_shown {
            self.draw_limb(director, shell);
        }

        // country dots are the tail of the cloud
        let country_start = self.cloud.len().saturating_sub(director.countries().len());
        for (i, &point) in self.cloud.iter().enumerate() {
            let Some(p) = controls.project_to_screen(point, w, h) else { continue };
            let behind = shell_shown && occluded(eye, point, shell);
            let layer = cloud_layer(i >= country_start, behind);
            self.canvas.plot(p.x as i32, p.y as i32, layer);
        }

        if let Some(group) = director.connectors().active_group() {
            if group.visible && group.opacity > MIN_OPACITY {
                for curve in &group.curves {
                    for &point in &curve.points {
                        if occluded(eye, point, shell) {
                            continue;
                        }
                        if let Some(p) = controls.project_to_screen(point, w, h) {
                            self.canvas.plot(p.x as i32, p.y as i32, Layer::Connector);
                        }
                    }
                }
            }
        }

        for dot in director.dots().iter().filter(|d| d.visible) {
            if occluded(eye, dot.position, shell) {
                continue;
            }
            if let Some(p) = controls.project_to_screen(dot.position, w, h) {
                self.canvas.blob(p.x as i32, p.y as i32, 1, Layer::Traveler);
            }
        }

        term.clear();
        self.canvas.draw(term, scheme, color);

        if director.labels_shown() {
            self.draw_labels(director, term, scheme, color);
        }
    }

    /// Outline of the shell as seen from the camera
    fn draw_limb(&mut self, director: &Director, radius: f64) {
        let controls = director.controls();
        let eye = controls.position();
        let d2 = eye.length_squared();
        if d2 <= radius * radius {
            return;
        }

        // silhouette circle of a sphere seen from `eye`
        let center = eye * (radius * radius / d2);
        let rho = radius * (1.0 - radius * radius / d2).sqrt();
        let axis = eye.normalized();
        let mut u = axis.cross(Vec3::UP);
        if u.length_squared() < 1e-12 {
            u = Vec3::new(1.0, 0.0, 0.0);
        }
        let u = u.normalized();
        let v = u.cross(axis);

        let w = self.canvas.width as f64;
        let h = self.canvas.height as f64;
        let steps = ((w + h) as usize * 2).max(90);
        for i in 0..steps {
            let a = i as f64 / steps as f64 * std::f64::consts::TAU;
            let point = center + u * (rho * a.cos()) + v * (rho * a.sin());
            if let Some(p) = controls.project_to_screen(point, w, h) {
                self.canvas.plot(p.x as i32, p.y as i32, Layer::Shell);
            }
        }
    }

    fn draw_labels(&self, director: &Director, term: &mut Terminal, scheme: u8, color: bool) {
        let controls = director.controls();
        let eye = controls.position();
        let w = self.canvas.width as f64;
        let h = self.canvas.height as f64;

        // active label last so it stays on top
        let labels = director.labels();
        let ordered = labels.iter().filter(|l| !l.active).chain(labels.iter().filter(|l| l.active));
        for label in ordered {
            if occluded(eye, label.anchor, director.shell_radius()) {
                continue;
            }
            let Some(p) = controls.project_to_screen(label.anchor, w, h) else { continue };
            let cx = (p.x / 2.0) as i32 + 1;
            let cy = (p.y / 4.0) as i32;

            let text = if label.active {
                format!("{} · {}", label.name, label.caption)
            } else {
                label.name.clone()
            };
            let (fg, bold) = layer_color(scheme, Layer::Label, label.active);
            term.set_str(cx, cy, &text, color.then_some(fg), bold && color);
        }
    }
}
