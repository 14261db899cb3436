// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scleral landing zone.
//!
//! The true shape of the landing zone is not published; all that is known
//! is the sag it adds between its inner edge and the reference point, one
//! value per landing zone code. The curve here is a fit through that single
//! value, not an optical model: a parabola `x = a y²`, rotated about the
//! start of the zone until it passes through the tabulated depth.

use crate::{GeometryError, SagCurve};

/// The half-width of the landing zone, from its inner edge to the
/// reference point, in mm.
pub const LANDING_HALF_WIDTH: f64 = 0.75;

/// Sag between the inner edge of the landing zone and the reference point,
/// in mm, indexed by landing zone code.
pub const LANDING_REFERENCE_SAGS: [f64; 6] = [0.769, 0.722, 0.699, 0.677, 0.635, 0.614];

/// The shape constant of the landing zone parabola.
///
/// Larger values bend the zone more sharply; the depth at the reference
/// point is unaffected. Two values have been in use, [`LandingShape::STANDARD`]
/// and [`LandingShape::SHALLOW`], and neither has been confirmed against
/// measured lenses.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandingShape(pub f64);

impl LandingShape {
    /// `a = 0.6`, the default.
    pub const STANDARD: LandingShape = LandingShape(0.6);
    /// `a = 0.5`.
    pub const SHALLOW: LandingShape = LandingShape(0.5);
}

impl Default for LandingShape {
    #[inline]
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A landing zone code, `0..=5`.
///
/// Higher codes flatten the landing zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandingZoneCode(u8);

impl LandingZoneCode {
    /// The highest code in the table.
    pub const MAX: LandingZoneCode = LandingZoneCode(5);

    /// The code for `value`, if it is in `0..=5`.
    #[inline]
    pub const fn new(value: u8) -> Option<LandingZoneCode> {
        if value <= Self::MAX.0 {
            Some(LandingZoneCode(value))
        } else {
            None
        }
    }

    /// Parse a user-entered code.
    ///
    /// Fractional input is floored, then anything outside `0..=5` (or not a
    /// number at all) falls back to code 0.
    pub fn from_input(value: f64) -> LandingZoneCode {
        let floored = value.floor();
        if floored.is_finite() && (0.0..=5.0).contains(&floored) {
            #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
            let code = floored as u8;
            LandingZoneCode(code)
        } else {
            LandingZoneCode::default()
        }
    }

    /// The numeric value of the code.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The tabulated sag to the reference point for this code, in mm.
    #[inline]
    pub const fn reference_sag(self) -> f64 {
        LANDING_REFERENCE_SAGS[self.0 as usize]
    }
}

/// Look up the reference sag for a possibly fractional code.
///
/// Fractional codes round up; codes outside `0..=5` fail closed to code 0.
pub fn landing_reference_sag(code: f64) -> f64 {
    let ceiled = code.ceil();
    if ceiled.is_finite() && (0.0..=5.0).contains(&ceiled) {
        #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
        let index = ceiled as usize;
        LANDING_REFERENCE_SAGS[index]
    } else {
        LANDING_REFERENCE_SAGS[0]
    }
}

/// The fitted landing zone curve.
///
/// Offsets are measured from the inner edge of the zone. The curve is zero
/// there and equals `target` exactly at `width`; past `width` the same
/// parabola is extrapolated out to the edge of the lens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingCurve {
    /// Distance from the inner edge to the reference point, in mm.
    pub width: f64,
    /// Sag at the reference point, relative to the inner edge, in mm.
    pub target: f64,
    /// The parabola's shape constant.
    pub shape: LandingShape,
}

impl LandingCurve {
    /// A new landing zone curve.
    #[inline]
    pub const fn new(width: f64, target: f64, shape: LandingShape) -> LandingCurve {
        LandingCurve {
            width,
            target,
            shape,
        }
    }

    /// The landing curve for a lens with the given code, at the standard
    /// half-width.
    #[inline]
    pub const fn for_code(code: LandingZoneCode, shape: LandingShape) -> LandingCurve {
        LandingCurve::new(LANDING_HALF_WIDTH, code.reference_sag(), shape)
    }

    /// The angle the parabola is rotated by, in radians.
    pub fn rotation(&self) -> f64 {
        let depth = self.parabola_depth();
        ((self.target - depth) / self.width).atan()
    }

    #[inline]
    fn parabola_depth(&self) -> f64 {
        self.shape.0 * self.width * self.width
    }

    /// Evaluate the curve `y` millimetres into the zone.
    pub fn eval(&self, y: f64) -> f64 {
        let depth = self.parabola_depth();
        let rotation = y * self.rotation().tan();
        let d = y - self.width;
        let parabola = self.shape.0 * d * d - depth;
        rotation - parabola
    }
}

impl SagCurve for LandingCurve {
    #[inline]
    fn sag(&self, y: f64) -> Result<f64, GeometryError> {
        Ok(self.eval(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx_eq(x: f64, y: f64) {
        assert!((x - y).abs() < 1e-12, "{x} != {y}");
    }

    #[test]
    fn table() {
        assert_eq!(LandingZoneCode::default().reference_sag(), 0.769);
        assert_eq!(LandingZoneCode::MAX.reference_sag(), 0.614);
        assert_eq!(LandingZoneCode::new(6), None);
    }

    #[test]
    fn lookup_rounds_up() {
        assert_eq!(landing_reference_sag(0.2), 0.722);
        assert_eq!(landing_reference_sag(3.0), 0.677);
        assert_eq!(landing_reference_sag(4.5), 0.614);
        assert_eq!(landing_reference_sag(5.5), 0.769);
        assert_eq!(landing_reference_sag(-2.0), 0.769);
        assert_eq!(landing_reference_sag(f64::NAN), 0.769);
    }

    #[test]
    fn input_floors() {
        assert_eq!(LandingZoneCode::from_input(2.9).get(), 2);
        assert_eq!(LandingZoneCode::from_input(5.99).get(), 5);
        assert_eq!(LandingZoneCode::from_input(6.0).get(), 0);
        assert_eq!(LandingZoneCode::from_input(-0.5).get(), 0);
        assert_eq!(LandingZoneCode::from_input(f64::INFINITY).get(), 0);
    }

    #[test]
    fn passes_through_both_ends() {
        for &shape in &[LandingShape::SHALLOW, LandingShape::STANDARD, LandingShape(0.1)] {
            for &target in &LANDING_REFERENCE_SAGS {
                let curve = LandingCurve::new(LANDING_HALF_WIDTH, target, shape);
                assert_approx_eq(curve.eval(0.0), 0.0);
                assert_approx_eq(curve.eval(LANDING_HALF_WIDTH), target);
            }
        }
    }

    #[test]
    fn extrapolates_past_reference() {
        let curve = LandingCurve::for_code(LandingZoneCode::default(), LandingShape::STANDARD);
        let at_ref = curve.eval(LANDING_HALF_WIDTH);
        let at_edge = curve.eval(2.0 * LANDING_HALF_WIDTH);
        assert!(at_edge.is_finite());
        assert!(at_edge > at_ref);
    }
}
