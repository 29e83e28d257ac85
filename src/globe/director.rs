//! Frame-driven sequencer for the whole globe animation
//!
//! Stages, in order: the dot cloud explodes out of the centre while the
//! camera swings to the starting country; the globe shell and the starting
//! country's connectors fade in; labels activate; then the steady loop spawns
//! traveling dots and cycles through the countries forever. Every delay is
//! counted in frames, so a paused or unfocused terminal freezes all timers
//! together.

use super::camera::{CameraAdapter, CameraAngleModel, CameraAngles, OrbitControls};
use super::connectors::ConnectorStage;
use super::curve::CurveBuilder;
use super::data::{Country, Dataset};
use super::dots::{TravelingDot, TravelingDotPool};
use super::math::{ease_in_out_cubic, ease_in_out_quad, ease_out_cubic, FrameCounter, Vec3};
use super::points::PointCloud;
use super::projection::Projector;
use crate::config::{GlobeConfig, GlobeProps, Timings};
use crate::error::GlobeError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

/// Camera angles before the intro swing
const INTRO_ANGLES: CameraAngles = CameraAngles::new(-PI, 0.0);

/// Shell radius relative to the globe, so surface dots stay in front of it
pub const SHELL_SCALE: f64 = 0.98;

/// Country-cycle timer state once the intro has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Waiting { frames_left: u32 },
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Dots exploding, labels not yet active
    Intro,
    Steady(CycleState),
}

/// Country caption anchored to its spot on the globe
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub key: String,
    pub name: String,
    pub caption: String,
    pub anchor: Vec3,
    pub active: bool,
}

#[derive(Debug)]
struct CountryCycle {
    index: usize,
    counter: FrameCounter,
    state: Option<CycleState>,
}

pub struct Director {
    props: GlobeProps,
    timings: Timings,
    countries: Vec<Country>,
    projector: Projector,
    points: PointCloud,
    connectors: ConnectorStage,
    dots: Option<TravelingDotPool>,
    camera: CameraAngleModel,
    controls: OrbitControls,
    labels: Vec<Label>,
    labels_shown: bool,
    intro_dots: FrameCounter,
    intro_globe: FrameCounter,
    countries_active: bool,
    finished_intro: bool,
    cycle: CountryCycle,
    globe_opacity: f64,
    visible: bool,
    frame: u64,
    rng: StdRng,
}

impl Director {
    /// Build every stage from the dataset. `aspect` is the viewport
    /// width/height ratio.
    pub fn new(data: &Dataset, config: &GlobeConfig, aspect: f64) -> Result<Self, GlobeError> {
        config.validate()?;
        let props = config.props.clone();
        let timings = config.timings.clone();

        let start = data
            .country_index(&props.starting_country)
            .ok_or_else(|| GlobeError::UnknownCountry(props.starting_country.clone()))?;

        let projector = Projector::new(data.map, props.globe_radius);
        let points = PointCloud::new(data, &projector);
        let builder = CurveBuilder::new(projector);
        let mut connectors =
            ConnectorStage::build_all(&data.countries, &builder, props.curve_segments, props.line_alpha);
        connectors.set_active(start, true);

        let labels = data
            .countries
            .iter()
            .map(|c| Label {
                key: c.key.clone(),
                name: c.name.clone(),
                caption: c.label.clone(),
                anchor: projector.project(c.map_point()),
                active: false,
            })
            .collect();

        let mut camera = CameraAngleModel::new(data.map, INTRO_ANGLES, INTRO_ANGLES);
        camera.target = camera.angles_for(data.countries[start].map_point());

        let controls = OrbitControls::new(
            CameraAdapter::perspective(props.fov_deg, aspect),
            props.globe_radius * props.camera_distance,
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            intro_dots: FrameCounter::new(timings.intro_dots_frames),
            intro_globe: FrameCounter::new(timings.intro_globe_frames),
            cycle: CountryCycle {
                index: start,
                counter: FrameCounter::new(timings.country_cycle_frames),
                state: None,
            },
            props,
            timings,
            countries: data.countries.clone(),
            projector,
            points,
            connectors,
            dots: None,
            camera,
            controls,
            labels,
            labels_shown: false,
            countries_active: false,
            finished_intro: false,
            globe_opacity: 0.0,
            visible: true,
            frame: 0,
            rng,
        })
    }

    /// Advance one frame. Returns false (and changes nothing) while hidden.
    pub fn tick(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        self.frame += 1;

        self.advance_cycle();
        self.advance_intro();

        if self.finished_intro {
            if let (Some(pool), Some(active)) = (self.dots.as_mut(), self.connectors.active()) {
                pool.tick(&self.connectors, active, &mut self.rng);
            }
        }

        self.controls.update();
        true
    }

    fn advance_intro(&mut self) {
        if self.intro_dots.is_running() {
            let progress = self.intro_dots.progress();
            self.points.advance_intro(progress);
            // camera moves with the first dot, which has no stagger
            let angles = self.camera.blend(ease_in_out_cubic(progress));
            self.controls.set_angles(angles);
            self.intro_dots.advance();
            if !self.intro_dots.is_running() {
                self.points.settle();
            }
        }

        if self.intro_dots.reached(self.timings.globe_fade_start) && self.intro_globe.is_running() {
            let progress = ease_out_cubic(self.intro_globe.progress());
            self.globe_opacity = self.props.globe_alpha * progress;
            self.connectors.fade(progress);
            self.intro_globe.advance();
        }

        if self.intro_dots.reached(self.timings.activation_at) && !self.countries_active {
            self.labels_shown = true;
            self.change_country(self.cycle.index, true);
            self.countries_active = true;
        }

        if self.countries_active && !self.finished_intro {
            self.finished_intro = true;
            self.cycle.state = Some(CycleState::Waiting { frames_left: self.timings.initial_delay_frames() });
            self.dots = Some(TravelingDotPool::new(self.props.dots_amount, self.props.spawn_chance));
            tracing::info!(frame = self.frame, "intro finished");
        }
    }

    fn advance_cycle(&mut self) {
        if let Some(CycleState::Waiting { frames_left }) = self.cycle.state {
            if frames_left <= 1 {
                self.show_next_country();
            } else {
                self.cycle.state = Some(CycleState::Waiting { frames_left: frames_left - 1 });
            }
        }

        if self.cycle.state == Some(CycleState::Animating) {
            if self.cycle.counter.is_running() {
                let progress = ease_in_out_quad(self.cycle.counter.progress());
                self.controls.set_angles(self.camera.blend(progress));
                self.cycle.counter.advance();
            } else {
                self.cycle.counter.reset();
                self.cycle.state = Some(CycleState::Waiting { frames_left: self.timings.cycle_delay_frames() });
            }
        }
    }

    /// Move to the next country in dataset order, wrapping around.
    /// Returns the new country index.
    pub fn show_next_country(&mut self) -> usize {
        self.cycle.index = (self.cycle.index + 1) % self.countries.len();
        self.change_country(self.cycle.index, false);
        self.cycle.index
    }

    fn change_country(&mut self, index: usize, init: bool) {
        self.connectors.set_active(index, false);
        for (i, label) in self.labels.iter_mut().enumerate() {
            label.active = i == index;
        }

        if !init {
            let to = self.camera.angles_for(self.countries[index].map_point());
            self.camera.begin_transition(self.controls.angles(), to);
            self.cycle.counter.reset();
            self.cycle.state = Some(CycleState::Animating);
            if let Some(pool) = self.dots.as_mut() {
                pool.reassign_all(&self.connectors, index, &mut self.rng);
            }
        }
        tracing::debug!(country = %self.countries[index].key, init, "country changed");
    }

    /// Pause or resume ticking; nothing is replayed on resume
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            tracing::debug!(visible, frame = self.frame, "visibility changed");
        }
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn phase(&self) -> Phase {
        match (self.finished_intro, self.cycle.state) {
            (true, Some(state)) => Phase::Steady(state),
            _ => Phase::Intro,
        }
    }

    pub fn finished_intro(&self) -> bool {
        self.finished_intro
    }

    pub fn countries_active(&self) -> bool {
        self.countries_active
    }

    /// True while any intro stage still has frames to play
    pub fn intro_running(&self) -> bool {
        self.intro_dots.is_running() || self.intro_globe.is_running() || !self.finished_intro
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn country_index(&self) -> usize {
        self.cycle.index
    }

    pub fn active_country(&self) -> &Country {
        &self.countries[self.cycle.index]
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn points(&self) -> &PointCloud {
        &self.points
    }

    /// Whether the dot positions changed since the last call
    pub fn take_points_dirty(&mut self) -> bool {
        self.points.buffer_mut().take_dirty()
    }

    pub fn connectors(&self) -> &ConnectorStage {
        &self.connectors
    }

    pub fn dots(&self) -> &[TravelingDot] {
        self.dots.as_ref().map(|p| p.dots()).unwrap_or(&[])
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn labels_shown(&self) -> bool {
        self.labels_shown
    }

    pub fn globe_opacity(&self) -> f64 {
        self.globe_opacity
    }

    pub fn shell_radius(&self) -> f64 {
        self.projector.radius * SHELL_SCALE
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn props(&self) -> &GlobeProps {
        &self.props
    }

    pub fn camera(&self) -> &CameraAngleModel {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Resize hook: new viewport aspect ratio
    pub fn set_aspect(&mut self, aspect: f64) {
        self.controls.camera.set_aspect(aspect);
        self.controls.update();
    }

    /// Flip between perspective and orthographic projection
    pub fn toggle_projection(&mut self) {
        let ortho_height = self.props.globe_radius * 2.0 * 1.25;
        self.controls.toggle_projection(self.props.fov_deg, ortho_height);
        self.controls.update();
    }

    pub fn reset_view(&mut self) {
        self.controls.reset_view(self.props.globe_radius * self.props.camera_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::camera::interpolate;

    fn config() -> GlobeConfig {
        let mut config = GlobeConfig { seed: Some(11), ..GlobeConfig::default() };
        config.props.curve_segments = 20;
        config
    }

    fn director_with(config: &GlobeConfig) -> Director {
        Director::new(&Dataset::embedded().unwrap(), config, 2.0).unwrap()
    }

    fn run(director: &mut Director, frames: u32) {
        for _ in 0..frames {
            director.tick();
        }
    }

    #[test]
    fn unknown_starting_country_rejected() {
        let mut config = config();
        config.props.starting_country = "atlantis".into();
        let result = Director::new(&Dataset::embedded().unwrap(), &config, 1.0);
        assert!(matches!(result, Err(GlobeError::UnknownCountry(_))));
    }

    #[test]
    fn starting_group_visible_but_transparent() {
        let d = director_with(&config());
        let group = d.connectors().active_group().unwrap();
        assert_eq!(group.key, "hongkong");
        assert!(group.visible);
        assert_eq!(group.opacity, 0.0);
        assert_eq!(d.phase(), Phase::Intro);
        assert!(d.dots().is_empty());
    }

    #[test]
    fn activation_at_seventy_percent() {
        let mut d = director_with(&config());
        run(&mut d, 118);
        assert!(!d.countries_active());
        assert!(!d.labels_shown());
        d.tick();
        assert!(d.countries_active());
        assert!(d.finished_intro());
        assert!(d.labels_shown());
        assert_eq!(d.dots().len(), 20);
        assert_eq!(d.phase(), Phase::Steady(CycleState::Waiting { frames_left: 300 }));
        let active: Vec<_> = d.labels().iter().filter(|l| l.active).map(|l| l.key.as_str()).collect();
        assert_eq!(active, vec!["hongkong"]);
    }

    #[test]
    fn camera_reaches_starting_country() {
        let mut d = director_with(&config());
        run(&mut d, 171);
        let target = d.camera().target;
        let angles = d.controls().angles();
        assert!((angles.azimuthal - target.azimuthal).abs() < 1e-12);
        assert!((angles.polar - target.polar).abs() < 1e-12);
    }

    #[test]
    fn intro_places_dots_and_fades_globe() {
        let mut d = director_with(&config());
        run(&mut d, 110);
        assert_eq!(d.globe_opacity(), 0.0);
        run(&mut d, 81);
        assert!(!d.intro_running());
        assert_eq!(d.points().positions(), d.points().targets());
        assert!((d.globe_opacity() - 0.4).abs() < 1e-12);
        assert!((d.connectors().active_group().unwrap().opacity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn first_cycle_after_initial_delay() {
        let mut d = director_with(&config());
        run(&mut d, 119);
        run(&mut d, 299);
        assert_eq!(d.country_index(), 11);
        d.tick();
        assert_eq!(d.country_index(), 12);
        assert_eq!(d.phase(), Phase::Steady(CycleState::Animating));
        assert_eq!(d.connectors().active_group().unwrap().key, "philippines");
    }

    #[test]
    fn cycle_animation_then_reschedules() {
        let mut d = director_with(&config());
        run(&mut d, 119 + 300);
        let start = d.camera().current;
        let target = d.camera().target;
        // 121 animated frames including the one that started the cycle
        run(&mut d, 120);
        assert_eq!(d.phase(), Phase::Steady(CycleState::Animating));
        let angles = d.controls().angles();
        assert!((angles.azimuthal - target.azimuthal).abs() < 1e-12);
        assert!((angles.polar - interpolate(start.polar, target.polar, 1.0)).abs() < 1e-12);
        d.tick();
        assert_eq!(d.phase(), Phase::Steady(CycleState::Waiting { frames_left: 120 }));
    }

    #[test]
    fn round_robin_wraps() {
        let mut config = config();
        config.props.starting_country = "pakistan".into();
        let mut d = director_with(&config);
        assert_eq!(d.country_index(), 0);
        let mut last = 0;
        for _ in 0..13 {
            last = d.show_next_country();
        }
        assert_eq!(last, 0);
        assert_eq!(d.active_country().key, "pakistan");
    }

    #[test]
    fn hidden_director_does_not_advance() {
        let mut d = director_with(&config());
        run(&mut d, 50);
        d.set_visible(false);
        assert!(!d.tick());
        run(&mut d, 1000);
        assert_eq!(d.frame(), 50);
        d.set_visible(true);
        assert!(d.tick());
        assert_eq!(d.frame(), 51);
        assert!(!d.finished_intro());
    }

    #[test]
    fn traveling_dots_follow_active_country() {
        let mut config = config();
        config.props.spawn_chance = 1.0;
        let mut d = director_with(&config);
        run(&mut d, 125);
        let active = d.connectors().active().unwrap();
        let attached: Vec<_> = d.dots().iter().filter_map(|dot| dot.path).collect();
        assert_eq!(attached.len(), 20);
        assert!(attached.iter().all(|p| p.group == active));

        let next = d.show_next_country();
        assert!(d.dots().iter().filter_map(|dot| dot.path).all(|p| p.group == next));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let mut a = director_with(&config());
        let mut b = director_with(&config());
        run(&mut a, 400);
        run(&mut b, 400);
        assert_eq!(a.dots(), b.dots());
    }
}
