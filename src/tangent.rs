// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tangent lines.

use crate::{GeometryError, SagCurve};

/// A straight peripheral band, given by its angle to the lens axis.
///
/// The sag at an offset `y` into the band is `y / tan(angle)`, so steeper
/// (smaller) angles drop faster.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tangent {
    /// The angle, in degrees.
    pub angle: f64,
}

impl Tangent {
    /// A new tangent line at `angle` degrees.
    #[inline]
    pub const fn new(angle: f64) -> Tangent {
        Tangent { angle }
    }
}

impl SagCurve for Tangent {
    /// Evaluate the sag `y` millimetres into the band.
    ///
    /// Non-positive offsets give zero, as does an angle of 90° or more: the
    /// line is then vertical and covers no horizontal distance.
    fn sag(&self, y: f64) -> Result<f64, GeometryError> {
        if self.angle == 0.0 {
            return Err(GeometryError::InvalidAngle);
        }
        if y <= 0.0 || self.angle >= 90.0 {
            return Ok(0.0);
        }
        Ok(y / self.angle.to_radians().tan())
    }
}

/// The sag of a tangent band of the given `width` at `angle` degrees.
///
/// # Errors
///
/// [`GeometryError::InvalidAngle`] when `angle` is zero.
#[inline]
pub fn tangent_sag(angle: f64, width: f64) -> Result<f64, GeometryError> {
    Tangent::new(angle).sag(width)
}

#[cfg(test)]
mod tests {
    use crate::{tangent_sag, GeometryError};

    #[test]
    fn forty_five_degrees() {
        assert!((tangent_sag(45.0, 0.75).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn fifty_degrees() {
        assert!((tangent_sag(50.0, 1.0).unwrap() - 0.8391).abs() < 1e-4);
    }

    #[test]
    fn degenerate() {
        assert_eq!(tangent_sag(0.0, 1.0), Err(GeometryError::InvalidAngle));
        assert_eq!(tangent_sag(30.0, 0.0), Ok(0.0));
        assert_eq!(tangent_sag(30.0, -1.0), Ok(0.0));
        assert_eq!(tangent_sag(90.0, 1.0), Ok(0.0));
        assert_eq!(tangent_sag(120.0, 1.0), Ok(0.0));
    }
}
