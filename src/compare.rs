// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Differential sag between two lenses.

use crate::{microns, CompareError, SagProfile};

/// The widest semi-chord a comparison accepts, in mm.
pub const MAX_COMPARE_SEMI_CHORD: f64 = 10.0;

/// The semi-chords compared by default, in mm: the axis, the middle and edge
/// of the back optic zone, and two points across the tangent bands.
pub const DEFAULT_HALF_CHORDS: [f64; 5] = [0.0, 3.0, 5.0, 6.0, 7.0];

/// The semi-chords a comparison panel shows, one per row.
///
/// Each can be edited; the values are not validated until they are compared.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HalfChordPresets(pub [f64; 5]);

impl Default for HalfChordPresets {
    #[inline]
    fn default() -> Self {
        HalfChordPresets(DEFAULT_HALF_CHORDS)
    }
}

impl HalfChordPresets {
    /// The semi-chord in row `index`, if there is one.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Change the semi-chord in row `index`. Out of range rows are ignored.
    pub fn set(&mut self, index: usize, y: f64) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = y;
        }
    }

    /// Compare two lenses at every preset.
    pub fn compare<P: SagProfile>(
        &self,
        a: Option<&P>,
        b: Option<&P>,
    ) -> [Result<i64, CompareError>; 5] {
        self.0.map(|y| compare_sag_at(a, b, y))
    }
}

/// The difference in sag between lens `a` and lens `b` at semi-chord `y`,
/// in whole micrometres.
///
/// Each sag is measured from its own lens's reference point, so the result
/// compares the two lenses as they would rest on the same sclera. Inside the
/// reference point a negative result means `a` stands further off the eye
/// than `b` at `y`.
///
/// # Errors
///
/// - [`CompareError::MissingLens`] if either lens is `None`.
/// - [`CompareError::InvalidInput`] if `y` is negative or not a number.
/// - [`CompareError::TooWide`] if `y` is past the edge of either lens.
/// - [`CompareError::InvalidInput`] if `y` is above
///   [`MAX_COMPARE_SEMI_CHORD`].
/// - [`CompareError::Geometry`] if either lens cannot be evaluated.
///
/// The width check comes before the upper bound, so a semi-chord that is
/// both too large and past the edge is reported as too wide.
///
/// # Examples
///
/// ```
/// use sagitta::{compare_sag_at, CompareError, KattProfile, LensParams};
///
/// let flat = KattProfile::new("lens1", LensParams::default().with_base_curve(8.0));
/// let steep = KattProfile::new("lens2", LensParams::default().with_base_curve(7.5));
/// assert!(compare_sag_at(Some(&steep), Some(&flat), 3.0).unwrap() < 0);
/// assert_eq!(compare_sag_at(Some(&flat), None, 3.0), Err(CompareError::MissingLens));
/// ```
pub fn compare_sag_at<P: SagProfile>(
    a: Option<&P>,
    b: Option<&P>,
    y: f64,
) -> Result<i64, CompareError> {
    let result = compare(a, b, y);
    if let Err(error) = &result {
        tracing::debug!(y, %error, "sag comparison failed");
    }
    result
}

fn compare<P: SagProfile>(a: Option<&P>, b: Option<&P>, y: f64) -> Result<i64, CompareError> {
    let (Some(a), Some(b)) = (a, b) else {
        return Err(CompareError::MissingLens);
    };
    if !y.is_finite() || y < 0.0 {
        return Err(CompareError::InvalidInput);
    }
    if y > a.semi_diameter() || y > b.semi_diameter() {
        return Err(CompareError::TooWide);
    }
    if y > MAX_COMPARE_SEMI_CHORD {
        return Err(CompareError::InvalidInput);
    }
    let difference = a.sag_relative_to_reference(y)? - b.sag_relative_to_reference(y)?;
    Ok(microns(difference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KattProfile, LensParams};

    fn lens(key: &str, eccentricity: f64) -> KattProfile {
        KattProfile::new(key, LensParams::default().with_eccentricity(eccentricity))
    }

    #[test]
    fn identical_lenses() {
        let a = lens("lens1", 0.98);
        let b = a.clone();
        for y in DEFAULT_HALF_CHORDS {
            assert_eq!(compare_sag_at(Some(&a), Some(&b), y), Ok(0));
        }
        assert_eq!(HalfChordPresets::default().compare(Some(&a), Some(&a)), [Ok(0); 5]);
        assert_eq!(compare_sag_at(Some(&a), Some(&a), 8.25), Ok(0));
    }

    #[test]
    fn eccentricity_changes_clearance() {
        // A more prolate back surface is flatter towards its edge, so it
        // sits closer to the eye everywhere inside the reference point.
        let prolate = lens("lens1", 0.98);
        let spherical_ish = lens("lens2", 0.5);
        let d = compare_sag_at(Some(&prolate), Some(&spherical_ish), 3.0).unwrap();
        assert!(d > 0, "{d}");
        let reverse = compare_sag_at(Some(&spherical_ish), Some(&prolate), 3.0).unwrap();
        assert_eq!(d, -reverse);
    }

    #[test]
    fn errors() {
        let a = lens("lens1", 0.98);
        let missing: Option<&KattProfile> = None;
        assert_eq!(compare_sag_at(missing, Some(&a), 1.0), Err(CompareError::MissingLens));
        assert_eq!(compare_sag_at(Some(&a), missing, 1.0), Err(CompareError::MissingLens));
        assert_eq!(compare_sag_at(Some(&a), Some(&a), -0.1), Err(CompareError::InvalidInput));
        assert_eq!(compare_sag_at(Some(&a), Some(&a), f64::NAN), Err(CompareError::InvalidInput));
        assert_eq!(compare_sag_at(Some(&a), Some(&a), 12.0), Err(CompareError::TooWide));
        assert_eq!(compare_sag_at(Some(&a), Some(&a), 8.3), Err(CompareError::TooWide));
    }

    #[test]
    fn too_wide_for_smaller_lens() {
        let small = lens("lens1", 0.98);
        let mut large = lens("lens2", 0.98);
        large.set_diameter(18.5);
        assert_eq!(compare_sag_at(Some(&large), Some(&small), 9.0), Err(CompareError::TooWide));
        assert!(compare_sag_at(Some(&large), Some(&small), 8.0).is_ok());
    }

    #[test]
    fn geometry_errors_surface() {
        let broken = KattProfile::new("lens1", LensParams::new(4.0, 0.0, 50.0, 45.0, 0.0, 16.5));
        let fine = lens("lens2", 0.98);
        assert!(matches!(
            compare_sag_at(Some(&broken), Some(&fine), 1.0),
            Err(CompareError::Geometry(_))
        ));
    }

    #[test]
    fn presets() {
        let a = lens("lens1", 0.98);
        let mut presets = HalfChordPresets::default();
        assert_eq!(presets.get(4), Some(7.0));
        assert_eq!(presets.get(5), None);
        presets.set(4, 12.0);
        presets.set(9, 1.0);
        let results = presets.compare(Some(&a), Some(&a));
        assert_eq!(results[4], Err(CompareError::TooWide));
        assert_eq!(results[0], Ok(0));
    }

    #[test]
    fn status_text() {
        assert_eq!(CompareError::InvalidInput.to_string(), "Invalid input");
        assert_eq!(CompareError::TooWide.to_string(), "Too wide");
    }
}
