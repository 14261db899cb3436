// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interface shared by every kind of lens profile.

use crate::{conic_sag, GeometryError, STANDARD_DIAMETER};

/// Radius of the sphere used to relate reference points on lenses of
/// different diameter, in mm.
pub const SCLERA_RADIUS: f64 = 13.0;

/// A lens profile: total sag as a function of radial distance.
///
/// Implemented by [`KattProfile`] and by each meridian of a
/// [`MultiCurveProfile`]. The sampler and the comparator work with any
/// implementor.
///
/// [`KattProfile`]: crate::KattProfile
/// [`MultiCurveProfile`]: crate::MultiCurveProfile
pub trait SagProfile {
    /// The sag at radial distance `y`, in mm.
    ///
    /// This is zero at and before the axis and beyond the edge of the lens.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if a zone cannot be evaluated at `y`.
    fn sag_at(&self, y: f64) -> Result<f64, GeometryError>;

    /// Half the overall diameter, in mm.
    fn semi_diameter(&self) -> f64;

    /// The sag every point is measured against when profiles are compared.
    ///
    /// This is the sag at the reference point, less the diameter correction
    /// from [`diameter_correction`].
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the reference sag cannot be computed.
    fn reference_offset(&self) -> Result<f64, GeometryError>;

    /// The sag at `y`, measured from the reference point.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if either sag cannot be computed.
    fn sag_relative_to_reference(&self, y: f64) -> Result<f64, GeometryError> {
        Ok(self.sag_at(y)? - self.reference_offset()?)
    }
}

impl<T: SagProfile + ?Sized> SagProfile for &T {
    #[inline]
    fn sag_at(&self, y: f64) -> Result<f64, GeometryError> {
        (**self).sag_at(y)
    }

    #[inline]
    fn semi_diameter(&self) -> f64 {
        (**self).semi_diameter()
    }

    #[inline]
    fn reference_offset(&self) -> Result<f64, GeometryError> {
        (**self).reference_offset()
    }
}

/// How much deeper the sclera sits under the reference point of a lens of
/// `diameter` than under that of a standard lens.
///
/// Larger lenses land further out, where a 13 mm sphere standing in for the
/// sclera has dropped away. Subtracting this from the reference sag anchors
/// lenses of every diameter to the same physical surface.
///
/// # Errors
///
/// Returns [`GeometryError::OutOfDomain`] for diameters beyond 27.5 mm,
/// where the reference point falls off the sphere.
pub fn diameter_correction(diameter: f64) -> Result<f64, GeometryError> {
    let standard = (STANDARD_DIAMETER - 1.5) / 2.0;
    let actual = (diameter - 1.5) / 2.0;
    Ok(conic_sag(SCLERA_RADIUS, 0.0, actual)? - conic_sag(SCLERA_RADIUS, 0.0, standard)?)
}
