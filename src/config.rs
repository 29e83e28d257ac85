use crate::error::GlobeError;
use std::path::PathBuf;

/// Globe geometry and population
#[derive(Clone, Debug, PartialEq)]
pub struct GlobeProps {
    pub globe_radius: f64,
    pub dots_amount: usize,
    pub starting_country: String,
    pub globe_alpha: f64,
    pub line_alpha: f64,
    pub curve_segments: usize,
    pub spawn_chance: f64,
    pub camera_distance: f64,  // multiple of globe radius
    pub fov_deg: f64,
}

impl Default for GlobeProps {
    fn default() -> Self {
        Self {
            globe_radius: 200.0,
            dots_amount: 20,
            starting_country: "hongkong".to_string(),
            globe_alpha: 0.4,
            line_alpha: 0.5,
            curve_segments: 200,
            spawn_chance: 0.01,
            camera_distance: 2.2,
            fov_deg: 60.0,
        }
    }
}

/// Stage durations. Frame counts advance once per rendered frame; the two
/// delays are wall-clock values converted at `fps`.
#[derive(Clone, Debug, PartialEq)]
pub struct Timings {
    pub fps: u32,
    pub intro_dots_frames: u32,
    pub intro_globe_frames: u32,
    pub country_cycle_frames: u32,
    pub initial_delay_ms: u64,
    pub cycle_delay_ms: u64,
    pub globe_fade_start: f64,  // fraction of the dot intro
    pub activation_at: f64,     // fraction of the dot intro
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            fps: 60,
            intro_dots_frames: 170,
            intro_globe_frames: 80,
            country_cycle_frames: 120,
            initial_delay_ms: 5000,
            cycle_delay_ms: 2000,
            globe_fade_start: 0.65,
            activation_at: 0.7,
        }
    }
}

impl Timings {
    /// Frames covering `ms` at the configured frame rate, rounded up
    pub fn frames_for(&self, ms: u64) -> u32 {
        let frames = ms.saturating_mul(self.fps as u64).div_ceil(1000);
        frames.min(u32::MAX as u64) as u32
    }

    pub fn initial_delay_frames(&self) -> u32 {
        self.frames_for(self.initial_delay_ms)
    }

    pub fn cycle_delay_frames(&self) -> u32 {
        self.frames_for(self.cycle_delay_ms)
    }

    /// Frames until the intro (dots and globe fade) has fully played
    pub fn intro_frames(&self) -> u32 {
        let fade_start = (self.intro_dots_frames as f64 * self.globe_fade_start).ceil() as u32;
        (self.intro_dots_frames + 1).max(fade_start.max(1) + self.intro_globe_frames)
    }
}

/// Configuration for a globe session
#[derive(Clone, Debug, Default)]
pub struct GlobeConfig {
    pub props: GlobeProps,
    pub timings: Timings,
    pub seed: Option<u64>,
    pub time_step: f32,
    pub data_path: Option<PathBuf>,
    pub color_scheme: u8,
}

impl GlobeConfig {
    pub fn validate(&self) -> Result<(), GlobeError> {
        let p = &self.props;
        let t = &self.timings;
        let fraction = |v: f64| (0.0..=1.0).contains(&v);

        if !(p.globe_radius > 0.0 && p.globe_radius.is_finite()) {
            return Err(GlobeError::Config(format!("globe radius must be positive, got {}", p.globe_radius)));
        }
        if p.curve_segments == 0 {
            return Err(GlobeError::Config("curve segments must be at least 1".into()));
        }
        if !fraction(p.spawn_chance) {
            return Err(GlobeError::Config(format!("spawn chance must be within 0..=1, got {}", p.spawn_chance)));
        }
        if !fraction(p.globe_alpha) || !fraction(p.line_alpha) {
            return Err(GlobeError::Config("alpha values must be within 0..=1".into()));
        }
        if !(p.camera_distance > 1.0) {
            return Err(GlobeError::Config("camera distance must place the camera outside the globe".into()));
        }
        if !(p.fov_deg > 0.0 && p.fov_deg < 180.0) {
            return Err(GlobeError::Config(format!("field of view must be within 0..180, got {}", p.fov_deg)));
        }
        if t.fps == 0 {
            return Err(GlobeError::Config("fps must be positive".into()));
        }
        if t.intro_dots_frames == 0 || t.intro_globe_frames == 0 || t.country_cycle_frames == 0 {
            return Err(GlobeError::Config("stage durations must be at least one frame".into()));
        }
        if !fraction(t.globe_fade_start) || !fraction(t.activation_at) {
            return Err(GlobeError::Config("stage fractions must be within 0..=1".into()));
        }
        Ok(())
    }
}
