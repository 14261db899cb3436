// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A trait for curves that have a sag at a given semi-chord.

use crate::GeometryError;

/// A rotationally symmetric curve, described by its sag.
///
/// The sag is the depth of the curve below the flat chord through its
/// vertex, measured at a semi-chord `y` from the axis. All lengths are in
/// millimetres.
pub trait SagCurve {
    /// Evaluate the sag at semi-chord `y`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the curve is degenerate or `y` lies
    /// outside the region the curve can represent.
    fn sag(&self, y: f64) -> Result<f64, GeometryError>;

    /// The rise of the curve between semi-chords `y0` and `y1`.
    ///
    /// This is how a curve is re-based when it starts part way out from the
    /// axis, as a peripheral band does.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if either end cannot be evaluated.
    fn sag_between(&self, y0: f64, y1: f64) -> Result<f64, GeometryError> {
        Ok(self.sag(y1)? - self.sag(y0)?)
    }
}

impl<T: SagCurve + ?Sized> SagCurve for &T {
    #[inline]
    fn sag(&self, y: f64) -> Result<f64, GeometryError> {
        (**self).sag(y)
    }
}
