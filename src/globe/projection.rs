//! Map pixel → globe surface projection

use super::data::{MapPoint, MapSize};
use super::math::Vec3;

/// Projects map pixels onto a sphere of `radius` centred at the origin.
///
/// The horizontal map axis spans longitude -180..180 and the vertical axis
/// latitude -90..90, both measured from the map centre (sign flipped so the
/// map's top-left lands on the north-west of the globe).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub map: MapSize,
    pub radius: f64,
}

impl Projector {
    pub fn new(map: MapSize, radius: f64) -> Self {
        Self { map, radius }
    }

    /// Longitude and latitude in degrees for a map pixel
    pub fn lon_lat(&self, point: MapPoint) -> (f64, f64) {
        let half_w = self.map.half_width();
        let half_h = self.map.half_height();
        let lon = ((point.x - half_w) / half_w) * -180.0;
        let lat = ((point.y - half_h) / half_h) * -90.0;
        (lon, lat)
    }

    pub fn project(&self, point: MapPoint) -> Vec3 {
        let (lon, lat) = self.lon_lat(point);
        let (lon, lat) = (lon.to_radians(), lat.to_radians());

        let ring = lat.cos() * self.radius;
        Vec3::new(lon.cos() * ring, lat.sin() * self.radius, lon.sin() * ring)
    }

    pub fn project_xy(&self, x: f64, y: f64) -> Vec3 {
        self.project(MapPoint::new(x, y))
    }
}
