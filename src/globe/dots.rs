//! Small markers that travel along the active country's connectors

use super::connectors::ConnectorStage;
use super::math::Vec3;
use rand::Rng;

/// Which connector a dot is walking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRef {
    pub group: usize,
    pub curve: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TravelingDot {
    pub path: Option<PathRef>,
    /// Next sample to show; always below the path length while attached
    pub path_index: Option<usize>,
    pub visible: bool,
    pub position: Vec3,
}

impl TravelingDot {
    pub fn is_idle(&self) -> bool {
        self.path.is_none()
    }

    fn detach(&mut self) {
        self.path = None;
        self.path_index = None;
        self.visible = false;
    }
}

/// Fixed-size pool of traveling dots
#[derive(Debug, Clone)]
pub struct TravelingDotPool {
    dots: Vec<TravelingDot>,
    spawn_chance: f64,
}

impl TravelingDotPool {
    pub fn new(size: usize, spawn_chance: f64) -> Self {
        Self {
            dots: vec![TravelingDot::default(); size],
            spawn_chance: spawn_chance.clamp(0.0, 1.0),
        }
    }

    pub fn dots(&self) -> &[TravelingDot] {
        &self.dots
    }

    pub fn set_spawn_chance(&mut self, chance: f64) {
        self.spawn_chance = chance.clamp(0.0, 1.0);
    }

    pub fn active_count(&self) -> usize {
        self.dots.iter().filter(|d| !d.is_idle()).count()
    }

    /// Advance every dot by one frame.
    ///
    /// Idle dots attach to a random connector of `active` with the spawn
    /// chance. Attached dots show their next sample, and detach on the tick
    /// after their last one.
    pub fn tick<R: Rng + ?Sized>(&mut self, stage: &ConnectorStage, active: usize, rng: &mut R) {
        let chance = self.spawn_chance;
        for dot in &mut self.dots {
            let Some(path) = dot.path else {
                if rng.gen_bool(chance) {
                    if let Some(path) = random_path(stage, active, rng) {
                        dot.path = Some(path);
                        dot.path_index = Some(0);
                    }
                }
                continue;
            };

            let Some(curve) = stage.curve(path.group, path.curve) else {
                dot.detach();
                continue;
            };

            let index = dot.path_index.unwrap_or(0);
            if index + 1 < curve.len() {
                dot.visible = true;
                dot.position = curve.points[index];
                dot.path_index = Some(index + 1);
            } else {
                dot.detach();
            }
        }
    }

    /// Point every attached dot at a random connector of `active`, keeping
    /// its progress along the path
    pub fn reassign_all<R: Rng + ?Sized>(&mut self, stage: &ConnectorStage, active: usize, rng: &mut R) {
        for dot in self.dots.iter_mut().filter(|d| !d.is_idle()) {
            match random_path(stage, active, rng) {
                Some(path) => {
                    let len = stage.curve(path.group, path.curve).map_or(0, |c| c.len());
                    dot.path = Some(path);
                    dot.path_index = dot.path_index.map(|i| i.min(len.saturating_sub(1)));
                }
                None => dot.detach(),
            }
        }
    }
}

fn random_path<R: Rng + ?Sized>(stage: &ConnectorStage, group: usize, rng: &mut R) -> Option<PathRef> {
    let count = stage.paths(group).len();
    if count == 0 {
        return None;
    }
    Some(PathRef { group, curve: rng.gen_range(0..count) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::curve::CurveBuilder;
    use crate::globe::data::{Dataset, MapSize};
    use crate::globe::projection::Projector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_country_stage(segments: usize) -> ConnectorStage {
        let data = Dataset::from_json(
            r#"{"countries":[{"key":"a","x":100,"y":50,"name":"A"},{"key":"b","x":300,"y":200,"name":"B"}]}"#,
        )
        .unwrap();
        let builder = CurveBuilder::new(Projector::new(MapSize::default(), 200.0));
        ConnectorStage::build_all(&data.countries, &builder, segments, 0.5)
    }

    #[test]
    fn dot_walks_path_then_goes_idle() {
        let stage = two_country_stage(9);
        assert_eq!(stage.paths(0)[0].len(), 10);
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = TravelingDotPool::new(5, 1.0);

        pool.tick(&stage, 0, &mut rng);
        assert_eq!(pool.active_count(), 5);
        assert!(pool.dots().iter().all(|d| d.path_index == Some(0) && !d.visible));
        pool.set_spawn_chance(0.0);

        for _ in 0..9 {
            pool.tick(&stage, 0, &mut rng);
        }
        let path = &stage.paths(0)[0].points;
        for dot in pool.dots() {
            assert!(dot.visible);
            assert_eq!(dot.position, path[8]);
            assert_eq!(dot.path_index, Some(9));
        }

        // eleventh tick
        pool.tick(&stage, 0, &mut rng);
        for dot in pool.dots() {
            assert!(dot.is_idle());
            assert!(!dot.visible);
            assert_eq!(dot.path_index, None);
        }
    }

    #[test]
    fn path_index_stays_in_bounds() {
        let stage = two_country_stage(6);
        let len = stage.paths(1)[0].len();
        let mut rng = StdRng::seed_from_u64(42);
        let mut pool = TravelingDotPool::new(20, 0.3);
        for _ in 0..500 {
            pool.tick(&stage, 1, &mut rng);
            for dot in pool.dots() {
                if let Some(i) = dot.path_index {
                    assert!(i <= len - 1);
                }
                if dot.is_idle() {
                    assert!(!dot.visible);
                }
            }
        }
    }

    #[test]
    fn reassign_moves_only_attached_dots() {
        let stage = two_country_stage(20);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pool = TravelingDotPool::new(3, 1.0);
        pool.tick(&stage, 0, &mut rng);
        pool.tick(&stage, 0, &mut rng);
        pool.tick(&stage, 0, &mut rng);
        pool.dots[2].detach();

        pool.reassign_all(&stage, 1, &mut rng);
        assert_eq!(pool.dots()[0].path, Some(PathRef { group: 1, curve: 0 }));
        assert_eq!(pool.dots()[0].path_index, Some(2));
        assert_eq!(pool.dots()[1].path, Some(PathRef { group: 1, curve: 0 }));
        assert!(pool.dots()[2].is_idle());
    }

    #[test]
    fn empty_group_never_attaches() {
        let data = Dataset::from_json(r#"{"countries":[{"key":"solo","x":1,"y":1,"name":"Solo"}]}"#).unwrap();
        let builder = CurveBuilder::new(Projector::new(MapSize::default(), 200.0));
        let stage = ConnectorStage::build_all(&data.countries, &builder, 10, 0.5);
        let mut rng = StdRng::seed_from_u64(3);
        let mut pool = TravelingDotPool::new(4, 1.0);
        pool.tick(&stage, 0, &mut rng);
        assert_eq!(pool.active_count(), 0);
    }
}
