use crate::Vec3;

/// Orthonormal basis built around a single axis.
///
/// `w` is the input axis (normalized); `u` and `v` complete a right-handed
/// frame. Used to move locally sampled directions (e.g. cosine lobes around
/// +Z) into world space.
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    pub fn new(n: Vec3) -> Self {
        let w = n.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    #[inline]
    pub fn u(&self) -> Vec3 {
        self.u
    }

    #[inline]
    pub fn v(&self) -> Vec3 {
        self.v
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Transform a vector given in basis coordinates into world space.
    #[inline]
    pub fn transform(&self, local: Vec3) -> Vec3 {
        local.x * self.u + local.y * self.v + local.z * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_is_orthonormal() {
        for n in [Vec3::X, Vec3::Y, Vec3::new(1.0, 2.0, -3.0), Vec3::new(-0.95, 0.1, 0.0)] {
            let onb = Onb::new(n);
            assert!((onb.u().length() - 1.0).abs() < 1e-5);
            assert!((onb.v().length() - 1.0).abs() < 1e-5);
            assert!((onb.w().length() - 1.0).abs() < 1e-5);
            assert!(onb.u().dot(onb.v()).abs() < 1e-5);
            assert!(onb.u().dot(onb.w()).abs() < 1e-5);
            assert!(onb.v().dot(onb.w()).abs() < 1e-5);
        }
    }

    #[test]
    fn test_local_z_maps_to_axis() {
        let n = Vec3::new(0.0, 3.0, 4.0);
        let onb = Onb::new(n);
        let world = onb.transform(Vec3::Z);
        assert!((world - n.normalize()).length() < 1e-5);
    }
}
