//! Precomputed connectors between every ordered pair of countries

use super::curve::{ConnectorCurve, CurveBuilder};
use super::data::Country;
use crate::error::GlobeError;

/// Connectors leaving one country
#[derive(Debug, Clone)]
pub struct ConnectorGroup {
    pub key: String,
    pub curves: Vec<ConnectorCurve>,
    pub visible: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone)]
pub struct ConnectorStage {
    groups: Vec<ConnectorGroup>,
    active: Option<usize>,
    fading: Option<usize>,
    line_alpha: f64,
}

impl ConnectorStage {
    /// One curve per ordered pair of distinct countries, grouped by origin.
    /// Pairs whose curve is degenerate are skipped. All groups start hidden.
    pub fn build_all(countries: &[Country], builder: &CurveBuilder, segments: usize, line_alpha: f64) -> Self {
        let mut skipped = 0usize;
        let groups = countries
            .iter()
            .enumerate()
            .map(|(origin, from)| {
                let curves = countries
                    .iter()
                    .enumerate()
                    .filter(|(destination, _)| *destination != origin)
                    .filter_map(|(destination, to)| {
                        match builder.build(from.map_point(), to.map_point()) {
                            Ok(controls) => Some(ConnectorCurve::new(origin, destination, controls, segments)),
                            Err(err) => {
                                tracing::warn!(from = %from.key, to = %to.key, %err, "skipping connector");
                                skipped += 1;
                                None
                            }
                        }
                    })
                    .collect();
                ConnectorGroup { key: from.key.clone(), curves, visible: false, opacity: line_alpha }
            })
            .collect::<Vec<_>>();

        let total: usize = groups.iter().map(|g: &ConnectorGroup| g.curves.len()).sum();
        tracing::info!(connectors = total, skipped, "connectors built");
        Self { groups, active: None, fading: None, line_alpha }
    }

    pub fn groups(&self) -> &[ConnectorGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&ConnectorGroup> {
        self.groups.get(index)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.key == key)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_group(&self) -> Option<&ConnectorGroup> {
        self.active.and_then(|i| self.groups.get(i))
    }

    /// Make `index` the only visible group. With `fade_in` the group starts
    /// transparent and its opacity is driven by [`Self::fade`]; otherwise a
    /// newly shown group gets the full line alpha.
    pub fn set_active(&mut self, index: usize, fade_in: bool) {
        if index >= self.groups.len() {
            return;
        }
        let reactivated = self.active == Some(index);
        if let Some(prev) = self.active.and_then(|i| self.groups.get_mut(i)) {
            prev.visible = false;
        }
        let group = &mut self.groups[index];
        group.visible = true;
        if fade_in {
            group.opacity = 0.0;
            self.fading = Some(index);
        } else if !reactivated && self.fading != Some(index) {
            group.opacity = self.line_alpha;
        }
        self.active = Some(index);
    }

    pub fn set_active_key(&mut self, key: &str, fade_in: bool) -> Result<(), GlobeError> {
        let index = self.index_of(key).ok_or_else(|| GlobeError::UnknownCountry(key.to_string()))?;
        self.set_active(index, fade_in);
        Ok(())
    }

    /// Opacity of the fading group as a fraction (0..=1) of the line alpha.
    /// The fade ends once progress reaches 1.
    pub fn fade(&mut self, progress: f64) {
        let progress = progress.clamp(0.0, 1.0);
        if let Some(group) = self.fading.and_then(|i| self.groups.get_mut(i)) {
            group.opacity = self.line_alpha * progress;
        }
        if progress >= 1.0 {
            self.fading = None;
        }
    }

    /// Curves of a group, empty when the key is unknown
    pub fn visible_paths(&self, key: &str) -> &[ConnectorCurve] {
        self.index_of(key).map(|i| self.paths(i)).unwrap_or(&[])
    }

    pub fn paths(&self, index: usize) -> &[ConnectorCurve] {
        self.groups.get(index).map(|g| g.curves.as_slice()).unwrap_or(&[])
    }

    pub fn curve(&self, group: usize, curve: usize) -> Option<&ConnectorCurve> {
        self.groups.get(group)?.curves.get(curve)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
