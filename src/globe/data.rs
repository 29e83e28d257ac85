//! Map dataset: background dot positions and named countries
//!
//! Coordinates are pixels on the source world map image. The bundled dataset
//! is the 2048x1024 dotted map with the thirteen wallet countries.

use crate::error::GlobeError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const EMBEDDED: &str = include_str!("../../data/globe.json");

/// Raw pixel position on the source map image
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(f64, f64)")]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for MapPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Full dimensions of the source map image
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MapSize {
    pub width: f64,
    pub height: f64,
}

impl MapSize {
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }
}

impl Default for MapSize {
    fn default() -> Self {
        Self { width: 2048.0, height: 1024.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Country {
    /// Stable lookup key (connector groups, labels)
    pub key: String,
    pub x: f64,
    pub y: f64,
    /// Display name
    pub name: String,
    /// Short caption drawn next to the marker
    #[serde(default)]
    pub label: String,
}

impl Country {
    pub fn map_point(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub map: MapSize,
    pub countries: Vec<Country>,
    #[serde(default)]
    pub points: Vec<MapPoint>,
}

impl Dataset {
    /// The dataset compiled into the binary
    pub fn embedded() -> Result<Self, GlobeError> {
        Self::from_json(EMBEDDED)
    }

    pub fn load(path: &Path) -> Result<Self, GlobeError> {
        let content = fs::read_to_string(path)
            .map_err(|e| GlobeError::Data(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Load from `path` if given, otherwise the embedded dataset
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, GlobeError> {
        let dataset = match path {
            Some(path) => Self::load(path)?,
            None => Self::embedded()?,
        };
        tracing::info!(
            points = dataset.points.len(),
            countries = dataset.countries.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_json(content: &str) -> Result<Self, GlobeError> {
        let dataset: Dataset =
            serde_json::from_str(content).map_err(|e| GlobeError::Data(e.to_string()))?;
        dataset.validate()?;
        Ok(dataset)
    }

    fn validate(&self) -> Result<(), GlobeError> {
        if !(self.map.width > 0.0 && self.map.height > 0.0) {
            return Err(GlobeError::Data(format!(
                "map size must be positive, got {}x{}",
                self.map.width, self.map.height
            )));
        }
        if self.countries.is_empty() {
            return Err(GlobeError::Data("dataset has no countries".into()));
        }
        let mut seen = HashSet::new();
        for country in &self.countries {
            if !seen.insert(country.key.as_str()) {
                return Err(GlobeError::Data(format!("duplicate country key: {}", country.key)));
            }
        }
        Ok(())
    }

    pub fn country_index(&self, key: &str) -> Option<usize> {
        self.countries.iter().position(|c| c.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_dataset_loads() {
        let data = Dataset::embedded().unwrap();
        assert_eq!(data.countries.len(), 13);
        assert!(data.points.len() > 6000);
        assert_eq!(data.map, MapSize { width: 2048.0, height: 1024.0 });
    }

    #[test]
    fn embedded_country_order_is_file_order() {
        let data = Dataset::embedded().unwrap();
        assert_eq!(data.countries[0].key, "pakistan");
        assert_eq!(data.countries[12].key, "philippines");
        assert_eq!(data.country_index("hongkong"), Some(11));
    }

    #[test]
    fn points_parse_from_pairs() {
        let data = Dataset::from_json(
            r#"{"countries":[{"key":"a","x":1,"y":2,"name":"A"}],"points":[[3,4],[5.5,6]]}"#,
        )
        .unwrap();
        assert_eq!(data.points, vec![MapPoint::new(3.0, 4.0), MapPoint::new(5.5, 6.0)]);
        assert_eq!(data.countries[0].label, "");
        assert_eq!(data.map, MapSize::default());
    }

    #[test]
    fn duplicate_keys_rejected() {
        let result = Dataset::from_json(
            r#"{"countries":[{"key":"a","x":1,"y":2,"name":"A"},{"key":"a","x":3,"y":4,"name":"B"}]}"#,
        );
        assert!(matches!(result, Err(GlobeError::Data(_))));
    }

    #[test]
    fn empty_countries_rejected() {
        let result = Dataset::from_json(r#"{"countries":[]}"#);
        assert!(matches!(result, Err(GlobeError::Data(_))));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(Dataset::from_json("{"), Err(GlobeError::Data(_))));
    }
}
