//! Camera angles, orbit controls and the camera projection adapters
//!
//! The director never places the camera directly. It computes target orbit
//! angles from map coordinates, blends towards them each frame and pushes the
//! result into [`OrbitControls`], which owns the camera position.

use super::data::{MapPoint, MapSize};
use super::math::Vec3;
use std::f64::consts::{FRAC_PI_2, PI};

/// Offset added to the azimuth so the camera never looks straight down on a
/// country (connectors flatten out from directly above)
const AZIMUTH_OFFSET: f64 = 0.1;

/// Movement threshold for `update()` reporting a change
const EPS: f64 = 0.000_001;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraAngles {
    pub azimuthal: f64,
    pub polar: f64,
}

impl CameraAngles {
    pub const fn new(azimuthal: f64, polar: f64) -> Self {
        Self { azimuthal, polar }
    }
}

/// Blend `current` towards `target`. Exact at both ends.
pub fn interpolate(current: f64, target: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        current
    } else if progress >= 1.0 {
        target
    } else {
        current - (current - target) * progress
    }
}

/// Tracks the angles a camera transition starts from and heads to
#[derive(Debug, Clone, Copy)]
pub struct CameraAngleModel {
    map: MapSize,
    pub current: CameraAngles,
    pub target: CameraAngles,
}

impl CameraAngleModel {
    pub fn new(map: MapSize, current: CameraAngles, target: CameraAngles) -> Self {
        Self { map, current, target }
    }

    /// Orbit angles that centre the camera on a map point. Azimuth runs
    /// roughly 0..π across the map width, polar 0..π down the map height.
    pub fn angles_for(&self, point: MapPoint) -> CameraAngles {
        let half_w = self.map.half_width();
        let azimuthal = ((point.x - half_w) / half_w) * PI + FRAC_PI_2 + AZIMUTH_OFFSET;
        let polar = (point.y / self.map.height) * PI;
        CameraAngles { azimuthal, polar }
    }

    /// Snapshot `from` as the start and aim at `to`
    pub fn begin_transition(&mut self, from: CameraAngles, to: CameraAngles) {
        self.current = from;
        self.target = to;
    }

    pub fn blend(&self, progress: f64) -> CameraAngles {
        CameraAngles {
            azimuthal: interpolate(self.current.azimuthal, self.target.azimuthal, progress),
            polar: interpolate(self.current.polar, self.target.polar, progress),
        }
    }
}

/// Result of a dolly on a particular camera kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dolly {
    /// Orbit distance should be multiplied by this factor
    Distance(f64),
    /// The camera zoom changed in place
    Zoom,
}

/// The two camera kinds the orbit controls know how to drive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAdapter {
    Perspective { fov_deg: f64, aspect: f64, near: f64 },
    Orthographic { height: f64, aspect: f64, zoom: f64, min_zoom: f64, max_zoom: f64 },
}

impl CameraAdapter {
    pub fn perspective(fov_deg: f64, aspect: f64) -> Self {
        CameraAdapter::Perspective { fov_deg, aspect, near: 1.0 }
    }

    pub fn orthographic(height: f64, aspect: f64) -> Self {
        CameraAdapter::Orthographic { height, aspect, zoom: 1.0, min_zoom: 0.25, max_zoom: 8.0 }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, CameraAdapter::Perspective { .. })
    }

    pub fn aspect(&self) -> f64 {
        match *self {
            CameraAdapter::Perspective { aspect, .. } | CameraAdapter::Orthographic { aspect, .. } => aspect,
        }
    }

    pub fn set_aspect(&mut self, new_aspect: f64) {
        match self {
            CameraAdapter::Perspective { aspect, .. } | CameraAdapter::Orthographic { aspect, .. } => {
                *aspect = new_aspect;
            }
        }
        self.update_projection();
    }

    /// Keep projection parameters within usable bounds after a change
    pub fn update_projection(&mut self) {
        match self {
            CameraAdapter::Perspective { fov_deg, aspect, near } => {
                *fov_deg = fov_deg.clamp(1.0, 179.0);
                *near = near.max(f64::MIN_POSITIVE);
                if !(*aspect > 0.0) {
                    *aspect = 1.0;
                }
            }
            CameraAdapter::Orthographic { zoom, aspect, min_zoom, max_zoom, .. } => {
                *zoom = zoom.clamp(*min_zoom, *max_zoom);
                if !(*aspect > 0.0) {
                    *aspect = 1.0;
                }
            }
        }
    }

    /// World distance a pan of `pixels` covers on a `viewport`-tall screen
    /// when the camera is `distance` away from its target
    pub fn pan_distance(&self, pixels: f64, viewport: f64, distance: f64) -> f64 {
        if viewport <= 0.0 {
            return 0.0;
        }
        match *self {
            CameraAdapter::Perspective { fov_deg, .. } => {
                let half_fov = (fov_deg / 2.0).to_radians();
                2.0 * pixels * distance * half_fov.tan() / viewport
            }
            CameraAdapter::Orthographic { height, zoom, .. } => pixels * height / zoom / viewport,
        }
    }

    /// Move closer by `factor` (> 1 zooms in)
    pub fn dolly(&mut self, factor: f64) -> Dolly {
        match self {
            CameraAdapter::Perspective { .. } => Dolly::Distance(1.0 / factor),
            CameraAdapter::Orthographic { zoom, min_zoom, max_zoom, .. } => {
                *zoom = (*zoom * factor).clamp(*min_zoom, *max_zoom);
                Dolly::Zoom
            }
        }
    }

    /// View-space point (x right, y up, z depth ahead) to normalised device
    /// coordinates. `None` when the point is behind the near plane.
    pub fn project(&self, view: Vec3) -> Option<(f64, f64)> {
        match *self {
            CameraAdapter::Perspective { fov_deg, aspect, near } => {
                if view.z < near {
                    return None;
                }
                let half_h = (fov_deg / 2.0).to_radians().tan() * view.z;
                Some((view.x / (half_h * aspect), view.y / half_h))
            }
            CameraAdapter::Orthographic { height, aspect, zoom, .. } => {
                let half_h = height / 2.0 / zoom;
                Some((view.x / (half_h * aspect), view.y / half_h))
            }
        }
    }
}

/// Normalised device coordinates to pixel coordinates, y down
pub fn to_screen(ndc: (f64, f64), width: f64, height: f64) -> (f64, f64) {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    (ndc.0 * half_w + half_w, -(ndc.1 * half_h) + half_h)
}

/// Screen position of a projected point plus its view depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// Orbit camera around a target with y as the orbit axis
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub camera: CameraAdapter,
    target: Vec3,
    theta: f64,
    phi: f64,
    distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_polar: f64,
    pub max_polar: f64,
    pan_offset: Vec3,
    scale: f64,
    zoom_changed: bool,
    position: Vec3,
    last_position: Vec3,
    last_target: Vec3,
}

impl OrbitControls {
    /// Camera starts on +z at `distance`, looking at the origin
    pub fn new(camera: CameraAdapter, distance: f64) -> Self {
        let mut controls = Self {
            camera,
            target: Vec3::ZERO,
            theta: 0.0,
            phi: FRAC_PI_2,
            distance,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            zoom_changed: false,
            position: Vec3::new(0.0, 0.0, distance),
            last_position: Vec3::ZERO,
            last_target: Vec3::ZERO,
        };
        controls.update();
        controls
    }

    pub fn get_azimuthal_angle(&self) -> f64 {
        self.theta
    }

    pub fn get_polar_angle(&self) -> f64 {
        self.phi
    }

    pub fn angles(&self) -> CameraAngles {
        CameraAngles::new(self.theta, self.phi)
    }

    pub fn set_azimuthal_angle(&mut self, angle: f64) {
        self.theta = angle;
        self.update();
    }

    pub fn set_polar_angle(&mut self, angle: f64) {
        self.phi = angle;
        self.update();
    }

    pub fn set_angles(&mut self, angles: CameraAngles) {
        self.set_azimuthal_angle(angles.azimuthal);
        self.set_polar_angle(angles.polar);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Pan by a screen-space delta on a viewport of the given height
    pub fn pan(&mut self, dx: f64, dy: f64, viewport_height: f64) {
        let (right, up, _) = self.basis();
        let offset = self.position.distance(self.target);
        let left = self.camera.pan_distance(dx, viewport_height, offset);
        let upward = self.camera.pan_distance(dy, viewport_height, offset);
        self.pan_offset = self.pan_offset + right * -left + up * upward;
    }

    /// Zoom in (`factor` > 1) or out (`factor` < 1)
    pub fn dolly(&mut self, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        match self.camera.dolly(factor) {
            Dolly::Distance(scale) => self.scale *= scale,
            Dolly::Zoom => self.zoom_changed = true,
        }
    }

    /// Swap between perspective and orthographic, keeping the aspect ratio
    pub fn toggle_projection(&mut self, fov_deg: f64, ortho_height: f64) {
        let aspect = self.camera.aspect();
        self.camera = if self.camera.is_perspective() {
            CameraAdapter::orthographic(ortho_height, aspect)
        } else {
            CameraAdapter::perspective(fov_deg, aspect)
        };
        self.zoom_changed = true;
    }

    /// Drop pan and zoom changes, keep the orbit angles
    pub fn reset_view(&mut self, distance: f64) {
        self.target = Vec3::ZERO;
        self.distance = distance;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
        if let CameraAdapter::Orthographic { zoom, .. } = &mut self.camera {
            *zoom = 1.0;
        }
        self.zoom_changed = true;
        self.update();
    }

    /// Apply pending pan/dolly, clamp the angles and place the camera.
    /// Returns true if the camera moved.
    pub fn update(&mut self) -> bool {
        self.phi = self.phi.clamp(self.min_polar, self.max_polar).clamp(EPS, PI - EPS);
        self.distance = (self.distance * self.scale).clamp(self.min_distance, self.max_distance);
        self.target = self.target + self.pan_offset;

        let sin_phi = self.phi.sin();
        let offset = Vec3::new(
            self.distance * sin_phi * self.theta.sin(),
            self.distance * self.phi.cos(),
            self.distance * sin_phi * self.theta.cos(),
        );
        self.position = self.target + offset;

        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;

        let moved = self.zoom_changed
            || (self.position - self.last_position).length_squared() > EPS
            || (self.target - self.last_target).length_squared() > EPS;
        if moved {
            self.last_position = self.position;
            self.last_target = self.target;
            self.zoom_changed = false;
        }
        moved
    }

    /// Camera right, up and forward unit vectors
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.position).normalized();
        let mut right = forward.cross(Vec3::UP);
        if right.length_squared() < 1e-24 {
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        let right = right.normalized();
        let up = right.cross(forward);
        (right, up, forward)
    }

    /// World point → view space (x right, y up, z depth)
    pub fn to_view(&self, point: Vec3) -> Vec3 {
        let (right, up, forward) = self.basis();
        let rel = point - self.position;
        Vec3::new(rel.dot(right), rel.dot(up), rel.dot(forward))
    }

    /// World point → pixel position on a `width`×`height` viewport
    pub fn project_to_screen(&self, point: Vec3, width: f64, height: f64) -> Option<ScreenPoint> {
        let view = self.to_view(point);
        let ndc = self.camera.project(view)?;
        let (x, y) = to_screen(ndc, width, height);
        Some(ScreenPoint { x, y, depth: view.z })
    }
}
