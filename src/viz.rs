//! Front ends for the globe: the live terminal loop, one-shot printing and
//! the country listing.

use crate::colors::{layer_color, ColorState, Layer};
use crate::config::GlobeConfig;
use crate::error::GlobeError;
use crate::globe::camera::CameraAngleModel;
use crate::globe::projection::Projector;
use crate::globe::{Dataset, Director};
use crate::help::render_help_overlay;
use crate::render::Renderer;
use crate::terminal::{Input, Terminal};
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::tty::IsTty;
use std::fmt::Write as _;
use std::io::stdout;

/// Smallest terminal the globe is drawn in
const MIN_COLS: u16 = 20;
const MIN_ROWS: u16 = 8;

/// Dolly factor per keypress
const ZOOM_STEP: f64 = 1.2;

/// Help text for the live globe
const HELP: &str = "\
GLOBE
─────────────────
n      Next country
+/-    Zoom in/out
←↑↓→   Pan
o      Perspective/orthographic
0      Reset view
space  Pause
!..)   Color scheme
?      Toggle help
q/Esc  Quit";

/// Runtime state for interactive controls
pub struct VizState {
    pub speed: f32, // Seconds per frame
    pub colors: ColorState,
    pub paused: bool,
    pub show_help: bool,
}

impl VizState {
    pub fn new(speed: f32, scheme: u8) -> Self {
        Self {
            speed,
            colors: ColorState::new(scheme),
            paused: false,
            show_help: false,
        }
    }

    /// Handle keypress, returns true if should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            _ => {
                self.colors.handle_key(code);
            }
        }
        false
    }
}

/// Apply a view key to the director. Returns true if the key was used.
fn handle_globe_key(director: &mut Director, code: KeyCode, viewport_height: f64) -> bool {
    let pan_step = viewport_height / 20.0;
    match code {
        KeyCode::Char('n') => {
            if director.finished_intro() {
                director.show_next_country();
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => director.controls_mut().dolly(ZOOM_STEP),
        KeyCode::Char('-') | KeyCode::Char('_') => director.controls_mut().dolly(1.0 / ZOOM_STEP),
        KeyCode::Left => director.controls_mut().pan(-pan_step, 0.0, viewport_height),
        KeyCode::Right => director.controls_mut().pan(pan_step, 0.0, viewport_height),
        KeyCode::Up => director.controls_mut().pan(0.0, pan_step, viewport_height),
        KeyCode::Down => director.controls_mut().pan(0.0, -pan_step, viewport_height),
        KeyCode::Char('o') => director.toggle_projection(),
        KeyCode::Char('0') => director.reset_view(),
        _ => return false,
    }
    true
}

fn check_size(cols: u16, rows: u16) -> Result<(), GlobeError> {
    if cols < MIN_COLS || rows < MIN_ROWS {
        return Err(GlobeError::UnsupportedBackend(format!(
            "terminal is {}x{}, need at least {}x{}",
            cols, rows, MIN_COLS, MIN_ROWS
        )));
    }
    Ok(())
}

/// Run the globe in the alternate screen until the user quits
pub fn run(config: &GlobeConfig) -> Result<(), GlobeError> {
    if !stdout().is_tty() {
        return Err(GlobeError::UnsupportedBackend("stdout is not a terminal".into()));
    }
    let data = Dataset::load_or_embedded(config.data_path.as_deref())?;

    let mut term = Terminal::new()?;
    let (width, height) = term.size();
    check_size(width, height)?;

    let mut renderer = Renderer::new(width, height);
    let mut director = Director::new(&data, config, renderer.aspect())?;
    let mut state = VizState::new(config.time_step, config.color_scheme);

    loop {
        while let Some(input) = term.poll_input()? {
            match input {
                Input::Key(code, mods) => {
                    if state.handle_key(code, mods) {
                        return Ok(());
                    }
                    let viewport = renderer.canvas().height() as f64;
                    handle_globe_key(&mut director, code, viewport);
                }
                Input::Focus(focused) => director.set_visible(focused),
                Input::Resize(w, h) => {
                    term.resize(w, h);
                    term.clear_screen()?;
                    renderer.resize(w, h);
                    director.set_aspect(renderer.aspect());
                }
            }
        }

        if state.paused {
            // view keys still apply while the animation is frozen
            director.controls_mut().update();
        } else {
            director.tick();
        }

        renderer.render(&mut director, &mut term, state.colors.scheme, true);
        if state.show_help {
            let (border, _) = layer_color(state.colors.scheme, Layer::Connector, false);
            render_help_overlay(&mut term, HELP, border);
        }
        term.present()?;
        term.sleep(state.speed);
    }
}

/// Advance `frames` frames off-screen and print the last one.
/// Without `frames` the intro is played to the end.
pub fn print(config: &GlobeConfig, frames: Option<u32>, width: u16, height: u16, color: bool) -> Result<(), GlobeError> {
    let term = render_offscreen(config, frames, width, height, color)?;
    term.print_to_stdout(color)?;
    Ok(())
}

fn render_offscreen(config: &GlobeConfig, frames: Option<u32>, width: u16, height: u16, color: bool) -> Result<Terminal, GlobeError> {
    if width == 0 || height == 0 {
        return Err(GlobeError::Config(format!("cannot print a {}x{} frame", width, height)));
    }
    let data = Dataset::load_or_embedded(config.data_path.as_deref())?;

    let mut term = Terminal::headless(width, height);
    let mut renderer = Renderer::new(width, height);
    let mut director = Director::new(&data, config, renderer.aspect())?;

    let frames = frames.unwrap_or_else(|| config.timings.intro_frames());
    for _ in 0..frames {
        director.tick();
    }
    tracing::debug!(frames, phase = ?director.phase(), "printing frame");

    renderer.render(&mut director, &mut term, config.color_scheme, color);
    Ok(term)
}

/// Table of every country: map point, sphere point and camera target
pub fn country_table(data: &Dataset, radius: f64) -> String {
    let projector = Projector::new(data.map, radius);
    let camera = CameraAngleModel::new(data.map, Default::default(), Default::default());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<14} {:>11}  {:>26}  {:>14}",
        "KEY", "NAME", "MAP", "SPHERE", "AZ/POLAR"
    );
    for country in &data.countries {
        let p = projector.project(country.map_point());
        let angles = camera.angles_for(country.map_point());
        let _ = writeln!(
            out,
            "{:<12} {:<14} {:>5},{:<5}  {:>8.2} {:>8.2} {:>8.2}  {:>6.3} {:>6.3}",
            country.key, country.name, country.x, country.y, p.x, p.y, p.z, angles.azimuthal, angles.polar
        );
    }
    out
}

pub fn countries(config: &GlobeConfig) -> Result<(), GlobeError> {
    let data = Dataset::load_or_embedded(config.data_path.as_deref())?;
    print!("{}", country_table(&data, config.props.globe_radius));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn director() -> Director {
        let mut config = GlobeConfig { seed: Some(5), ..GlobeConfig::default() };
        config.props.curve_segments = 10;
        Director::new(&Dataset::embedded().unwrap(), &config, 2.0).unwrap()
    }

    #[test]
    fn state_keys() {
        let mut state = VizState::new(0.016, 0);
        assert!(!state.handle_key(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(state.paused);
        assert!(!state.handle_key(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(state.show_help);
        assert!(!state.handle_key(KeyCode::Char('#'), KeyModifiers::SHIFT));
        assert_eq!(state.colors.scheme, 3);
        assert!(state.handle_key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(state.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn next_country_waits_for_intro() {
        let mut d = director();
        let start = d.country_index();
        assert!(handle_globe_key(&mut d, KeyCode::Char('n'), 96.0));
        assert_eq!(d.country_index(), start);

        for _ in 0..120 {
            d.tick();
        }
        handle_globe_key(&mut d, KeyCode::Char('n'), 96.0);
        assert_eq!(d.country_index(), (start + 1) % d.countries().len());
    }

    #[test]
    fn view_keys_move_camera() {
        let mut d = director();
        let before = d.controls().distance();
        handle_globe_key(&mut d, KeyCode::Char('+'), 96.0);
        d.controls_mut().update();
        assert!(d.controls().distance() < before);

        handle_globe_key(&mut d, KeyCode::Char('0'), 96.0);
        assert!((d.controls().distance() - before).abs() < 1e-9);

        handle_globe_key(&mut d, KeyCode::Char('o'), 96.0);
        assert!(!d.controls().camera.is_perspective());
        assert!(!handle_globe_key(&mut d, KeyCode::Char('x'), 96.0));
    }

    #[test]
    fn tiny_terminal_rejected() {
        assert!(matches!(check_size(10, 5), Err(GlobeError::UnsupportedBackend(_))));
        assert!(check_size(80, 24).is_ok());
    }

    #[test]
    fn printed_frame_is_plain_without_color() {
        let mut config = GlobeConfig { seed: Some(1), ..GlobeConfig::default() };
        config.props.curve_segments = 20;
        let text = render_offscreen(&config, None, 60, 20, false).unwrap().to_ansi(false);
        assert_eq!(text.lines().count(), 20);
        assert!(text.lines().all(|l| l.chars().count() == 60));
        assert!(!text.contains('\x1b'));
        assert!(matches!(render_offscreen(&config, Some(1), 0, 10, false), Err(GlobeError::Config(_))));
    }

    #[test]
    fn table_lists_every_country() {
        let data = Dataset::embedded().unwrap();
        let table = country_table(&data, 200.0);
        assert_eq!(table.lines().count(), data.countries.len() + 1);
        assert!(table.contains("Hong Kong"));
        assert!(table.contains("philippines"));
    }
}
