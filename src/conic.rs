// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conic sections.

use crate::{GeometryError, SagCurve};

/// A conic section of revolution, given by its apical radius and eccentricity.
///
/// The eccentricity selects the family: `0` is a circle, between `0` and `1`
/// a prolate ellipse, `1` a parabola and above `1` a hyperbola. The conic
/// constant is `k = -e²`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conic {
    /// The apical radius of curvature, in mm.
    pub radius: f64,
    /// The eccentricity.
    pub eccentricity: f64,
}

impl Conic {
    /// A new conic section.
    #[inline]
    pub const fn new(radius: f64, eccentricity: f64) -> Conic {
        Conic {
            radius,
            eccentricity,
        }
    }

    /// A sphere of the given radius.
    #[inline]
    pub const fn sphere(radius: f64) -> Conic {
        Conic::new(radius, 0.0)
    }

    /// The conic constant, `-e²`.
    #[inline]
    pub fn conic_constant(&self) -> f64 {
        -self.eccentricity * self.eccentricity
    }

    /// The largest semi-chord this conic can be evaluated at.
    ///
    /// This is infinite for parabolas and hyperbolas.
    pub fn max_semi_chord(&self) -> f64 {
        let p = 1.0 + self.conic_constant();
        if p <= 0.0 {
            f64::INFINITY
        } else {
            self.radius.abs() / p.sqrt()
        }
    }
}

impl SagCurve for Conic {
    fn sag(&self, y: f64) -> Result<f64, GeometryError> {
        if self.radius == 0.0 {
            return Err(GeometryError::InvalidRadius);
        }
        let r = self.radius;
        let discriminant = 1.0 - (1.0 + self.conic_constant()) * y * y / (r * r);
        if discriminant < 0.0 {
            return Err(GeometryError::OutOfDomain {
                radius: r,
                eccentricity: self.eccentricity,
                y,
            });
        }
        Ok(y * y / (r * (1.0 + discriminant.sqrt())))
    }
}

/// The sag of a conic section at semi-chord `y`.
///
/// This is the standard aspheric sag equation with no higher order terms:
///
/// ```text
/// sag = y² / (R (1 + √(1 - (1 + k) y² / R²)))
/// ```
///
/// # Errors
///
/// [`GeometryError::InvalidRadius`] when `radius` is zero, and
/// [`GeometryError::OutOfDomain`] when `y` is beyond the conic's reach.
///
/// # Examples
///
/// ```
/// use sagitta::conic_sag;
///
/// // A circle of radius 10 reaches a depth of 10 at its equator.
/// let sag = conic_sag(10.0, 0.0, 10.0).unwrap();
/// assert!((sag - 10.0).abs() < 1e-12);
/// ```
#[inline]
pub fn conic_sag(radius: f64, eccentricity: f64, y: f64) -> Result<f64, GeometryError> {
    Conic::new(radius, eccentricity).sag(y)
}

#[cfg(test)]
mod tests {
    use crate::{conic_sag, Conic, GeometryError, SagCurve};

    fn assert_approx_eq(x: f64, y: f64) {
        assert!((x - y).abs() < 1e-9, "{x} != {y}");
    }

    #[test]
    fn circle_reduction() {
        for &r in &[4.0, 7.7, 13.0] {
            for i in 0..=20 {
                let y = r * f64::from(i) / 20.0;
                let expected = y * y / (r + (r * r - y * y).sqrt());
                assert_approx_eq(conic_sag(r, 0.0, y).unwrap(), expected);
            }
        }
    }

    #[test]
    fn back_optic_zone() {
        assert!((conic_sag(7.0, 0.98, 5.0).unwrap() - 1.7948).abs() < 1e-4);
    }

    #[test]
    fn zero_radius() {
        assert_eq!(conic_sag(0.0, 0.5, 1.0), Err(GeometryError::InvalidRadius));
    }

    #[test]
    fn out_of_domain() {
        // A 4mm sphere cannot reach 5mm out.
        assert!(matches!(
            conic_sag(4.0, 0.0, 5.0),
            Err(GeometryError::OutOfDomain { .. })
        ));
        // A parabola reaches everywhere.
        assert!(conic_sag(4.0, 1.0, 50.0).is_ok());
        assert_eq!(Conic::new(4.0, 1.5).max_semi_chord(), f64::INFINITY);
        assert_approx_eq(Conic::sphere(4.0).max_semi_chord(), 4.0);
    }

    #[test]
    fn symmetric_in_y() {
        let c = Conic::new(7.7, 0.5);
        assert_approx_eq(c.sag(-3.0).unwrap(), c.sag(3.0).unwrap());
    }

    #[test]
    fn sag_between() {
        let c = Conic::new(8.5, 0.4);
        let rise = c.sag_between(4.0, 5.0).unwrap();
        assert_approx_eq(rise, c.sag(5.0).unwrap() - c.sag(4.0).unwrap());
        assert!(rise > 0.0);
    }
}
