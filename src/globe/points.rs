//! Background dot cloud and its exploding intro

use super::data::Dataset;
use super::math::{ease_in_out_cubic, Vec3};
use super::projection::Projector;

/// Positions handed to the renderer, with an explicit dirty flag
#[derive(Debug, Clone, Default)]
pub struct VertexBuffer {
    positions: Vec<Vec3>,
    dirty: bool,
}

impl VertexBuffer {
    pub fn zeroed(len: usize) -> Self {
        Self { positions: vec![Vec3::ZERO; len], dirty: true }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable access; caller must `mark_dirty` after writing
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether an upload is due and clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Every dot on the globe: the background points followed by one dot per
/// country. Final positions are fixed; the rendered copy starts at the centre.
#[derive(Debug, Clone)]
pub struct PointCloud {
    targets: Vec<Vec3>,
    buffer: VertexBuffer,
    country_offset: usize,
}

impl PointCloud {
    pub fn new(data: &Dataset, projector: &Projector) -> Self {
        let targets: Vec<Vec3> = data
            .points
            .iter()
            .copied()
            .chain(data.countries.iter().map(|c| c.map_point()))
            .map(|p| projector.project(p))
            .collect();
        let buffer = VertexBuffer::zeroed(targets.len());
        Self { targets, buffer, country_offset: data.points.len() }
    }

    /// Scale dots out from the centre. Dot `i` of `n` runs `1 + i/n` times
    /// faster than the first, so the cloud expands as a staggered wave.
    pub fn advance_intro(&mut self, progress: f64) {
        let eased = ease_in_out_cubic(progress.clamp(0.0, 1.0));
        let total = self.targets.len() as f64;
        for (i, (pos, target)) in self.buffer.positions_mut().iter_mut().zip(&self.targets).enumerate() {
            let dot_progress = (eased * (1.0 + i as f64 / total)).clamp(0.0, 1.0);
            *pos = *target * dot_progress;
        }
        self.buffer.mark_dirty();
    }

    /// Final positions, as after a completed intro
    pub fn settle(&mut self) {
        self.buffer.positions_mut().copy_from_slice(&self.targets);
        self.buffer.mark_dirty();
    }

    pub fn positions(&self) -> &[Vec3] {
        self.buffer.positions()
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    /// Final position of the dot for country `index`
    pub fn country_target(&self, index: usize) -> Option<Vec3> {
        self.targets.get(self.country_offset + index).copied()
    }

    pub fn buffer_mut(&mut self) -> &mut VertexBuffer {
        &mut self.buffer
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::data::{MapPoint, MapSize};

    fn dataset() -> Dataset {
        Dataset::from_json(
            r#"{"countries":[{"key":"a","x":768,"y":342,"name":"A"},{"key":"b","x":525,"y":279,"name":"B"}],
                "points":[[100,100],[400,500],[1500,200],[900,900]]}"#,
        )
        .unwrap()
    }

    fn projector() -> Projector {
        Projector::new(MapSize::default(), 200.0)
    }

    #[test]
    fn cloud_starts_at_centre() {
        let cloud = PointCloud::new(&dataset(), &projector());
        assert_eq!(cloud.len(), 6);
        assert!(cloud.positions().iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn countries_follow_background_points() {
        let cloud = PointCloud::new(&dataset(), &projector());
        let expected = projector().project(MapPoint::new(525.0, 279.0));
        assert_eq!(cloud.country_target(1), Some(expected));
        assert_eq!(cloud.country_target(2), None);
    }

    #[test]
    fn intro_complete_reaches_targets() {
        let mut cloud = PointCloud::new(&dataset(), &projector());
        cloud.advance_intro(1.0);
        assert_eq!(cloud.positions(), cloud.targets());
    }

    #[test]
    fn later_dots_lead_the_wave() {
        let mut cloud = PointCloud::new(&dataset(), &projector());
        cloud.advance_intro(0.4);
        let fraction = |i: usize| cloud.positions()[i].length() / cloud.targets()[i].length();
        assert!(fraction(0) < fraction(5));
        assert!(fraction(5) <= 1.0);
    }

    #[test]
    fn intro_marks_buffer_dirty() {
        let mut cloud = PointCloud::new(&dataset(), &projector());
        assert!(cloud.buffer_mut().take_dirty());
        assert!(!cloud.buffer_mut().is_dirty());
        cloud.advance_intro(0.1);
        assert!(cloud.buffer_mut().take_dirty());
    }
}
