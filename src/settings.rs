use crate::config::GlobeConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub globe: GlobeSettings,
    #[serde(default)]
    pub timing: TimingSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct GlobeSettings {
    pub radius: Option<f64>,
    pub dots_amount: Option<usize>,
    pub starting_country: Option<String>,
    pub globe_alpha: Option<f64>,
    pub line_alpha: Option<f64>,
    pub curve_segments: Option<usize>,
    pub spawn_chance: Option<f64>,
    pub color_scheme: Option<u8>,
    pub data: Option<PathBuf>,      // Alternate dataset (same JSON layout as the built-in one)
}

#[derive(Debug, Default, Deserialize)]
pub struct TimingSettings {
    pub fps: Option<u32>,
    pub intro_dots_frames: Option<u32>,
    pub intro_globe_frames: Option<u32>,
    pub country_cycle_frames: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub cycle_delay_ms: Option<u64>,
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed settings");
                Self::default()
            }),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not read settings");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termglobe")
            .join("config.toml")
    }

    /// Overlay the values present in the file onto `config`
    pub fn apply(&self, config: &mut GlobeConfig) {
        let g = &self.globe;
        let props = &mut config.props;
        if let Some(v) = g.radius { props.globe_radius = v; }
        if let Some(v) = g.dots_amount { props.dots_amount = v; }
        if let Some(v) = &g.starting_country { props.starting_country = v.clone(); }
        if let Some(v) = g.globe_alpha { props.globe_alpha = v; }
        if let Some(v) = g.line_alpha { props.line_alpha = v; }
        if let Some(v) = g.curve_segments { props.curve_segments = v; }
        if let Some(v) = g.spawn_chance { props.spawn_chance = v; }
        if let Some(v) = g.color_scheme { config.color_scheme = v; }
        if let Some(v) = &g.data { config.data_path = Some(v.clone()); }

        let t = &self.timing;
        let timings = &mut config.timings;
        if let Some(v) = t.fps { timings.fps = v; }
        if let Some(v) = t.intro_dots_frames { timings.intro_dots_frames = v; }
        if let Some(v) = t.intro_globe_frames { timings.intro_globe_frames = v; }
        if let Some(v) = t.country_cycle_frames { timings.country_cycle_frames = v; }
        if let Some(v) = t.initial_delay_ms { timings.initial_delay_ms = v; }
        if let Some(v) = t.cycle_delay_ms { timings.cycle_delay_ms = v; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_changes_nothing() {
        let settings = Settings::parse("").unwrap();
        let mut config = GlobeConfig::default();
        settings.apply(&mut config);
        assert_eq!(config.props, GlobeConfig::default().props);
        assert_eq!(config.timings, GlobeConfig::default().timings);
    }

    #[test]
    fn values_override_defaults() {
        let settings = Settings::parse(
            r#"
            [globe]
            starting_country = "india"
            dots_amount = 5
            color_scheme = 2

            [timing]
            cycle_delay_ms = 1000
            "#,
        )
        .unwrap();
        let mut config = GlobeConfig::default();
        settings.apply(&mut config);
        assert_eq!(config.props.starting_country, "india");
        assert_eq!(config.props.dots_amount, 5);
        assert_eq!(config.color_scheme, 2);
        assert_eq!(config.timings.cycle_delay_frames(), 60);
        assert_eq!(config.timings.intro_dots_frames, 170);
    }

    #[test]
    fn oversized_delay_from_file_is_usable() {
        let settings = Settings::parse("[timing]\ninitial_delay_ms = 9000000000000000000").unwrap();
        let mut config = GlobeConfig::default();
        settings.apply(&mut config);
        assert!(config.validate().is_ok());
        assert_eq!(config.timings.initial_delay_frames(), u32::MAX);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        assert!(Settings::parse("[globe]\ndots_amount = \"many\"").is_err());

        let path = std::env::temp_dir().join(format!("termglobe-settings-{}.toml", std::process::id()));
        fs::write(&path, "not = [valid").unwrap();
        let settings = Settings::load_from(&path);
        let _ = fs::remove_file(&path);
        assert!(settings.globe.dots_amount.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let settings = Settings::load_from(Path::new("/nonexistent/termglobe/config.toml"));
        assert!(settings.globe.starting_country.is_none());
    }
}
