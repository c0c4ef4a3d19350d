//! Orientation from accelerometer and magnetometer samples.
//!
//! Follows the usual tilt-compensated compass construction: east is the
//! cross product of the magnetic field and gravity, north is gravity
//! crossed with east, and the angles are read off the resulting
//! rotation matrix.

use crate::model::OrientationData;

/// Standard gravity, m/s²
const GRAVITY_EARTH: f32 = 9.806_65;

pub type Vector3 = [f32; 3];

#[derive(Debug, Default, Clone)]
pub struct OrientationEstimator {
    accelerometer: Option<Vector3>,
    magnetometer: Option<Vector3>,
    latest: Option<OrientationData>,
}

impl OrientationEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_accelerometer(&mut self, sample: Vector3) -> Option<OrientationData> {
        self.accelerometer = Some(sample);
        self.recompute()
    }

    pub fn update_magnetometer(&mut self, sample: Vector3) -> Option<OrientationData> {
        self.magnetometer = Some(sample);
        self.recompute()
    }

    pub fn latest(&self) -> Option<OrientationData> {
        self.latest
    }

    fn recompute(&mut self) -> Option<OrientationData> {
        if let (Some(gravity), Some(geomagnetic)) = (self.accelerometer, self.magnetometer) {
            // degenerate inputs keep the previous estimate
            if let Some(r) = rotation_matrix(gravity, geomagnetic) {
                self.latest = Some(orientation(&r));
            }
        }
        self.latest
    }
}

/// Row-major 3×3 rotation matrix from device to world coordinates, or
/// `None` when the device is in free fall or the field is too weak.
pub fn rotation_matrix(gravity: Vector3, geomagnetic: Vector3) -> Option<[f32; 9]> {
    let [mut ax, mut ay, mut az] = gravity;
    let normsq_a = ax * ax + ay * ay + az * az;
    let free_fall_gravity_squared = 0.01 * GRAVITY_EARTH * GRAVITY_EARTH;
    if normsq_a < free_fall_gravity_squared {
        return None;
    }

    let [ex, ey, ez] = geomagnetic;
    let mut hx = ey * az - ez * ay;
    let mut hy = ez * ax - ex * az;
    let mut hz = ex * ay - ey * ax;
    let norm_h = (hx * hx + hy * hy + hz * hz).sqrt();
    if norm_h < 0.1 {
        return None;
    }
    let inv_h = 1.0 / norm_h;
    hx *= inv_h;
    hy *= inv_h;
    hz *= inv_h;

    let inv_a = 1.0 / normsq_a.sqrt();
    ax *= inv_a;
    ay *= inv_a;
    az *= inv_a;

    let mx = ay * hz - az * hy;
    let my = az * hx - ax * hz;
    let mz = ax * hy - ay * hx;

    Some([hx, hy, hz, mx, my, mz, ax, ay, az])
}

pub fn orientation(r: &[f32; 9]) -> OrientationData {
    let azimuth = r[1].atan2(r[4]);
    let pitch = (-r[7]).asin();
    let roll = (-r[6]).atan2(r[8]);
    OrientationData {
        azimuth: azimuth.to_degrees(),
        pitch: pitch.to_degrees(),
        roll: roll.to_degrees(),
    }
}
