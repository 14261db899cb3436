// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sampling a profile into a point cloud.

use crate::{GeometryError, SagProfile};

/// Default distance between samples, in mm.
pub const DEFAULT_STEP: f64 = 0.05;

/// The finest step a [`Sampler`] accepts, in mm.
pub const MIN_STEP: f64 = 1e-6;

/// One point of a sampled profile.
///
/// The sag is measured from the profile's reference point, so it is
/// negative inside the reference radius and crosses zero there.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SagSample {
    /// Radial distance from the lens axis, mm.
    pub radius: f64,
    /// Sag relative to the reference point, mm.
    pub sag: f64,
}

impl SagSample {
    /// A new sample.
    #[inline]
    pub const fn new(radius: f64, sag: f64) -> SagSample {
        SagSample { radius, sag }
    }
}

/// Walks a profile from the axis to its edge at a fixed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampler {
    step: f64,
}

impl Default for Sampler {
    #[inline]
    fn default() -> Self {
        Sampler { step: DEFAULT_STEP }
    }
}

impl Sampler {
    /// A sampler with the given step, in mm.
    ///
    /// A step that is not a number of at least [`MIN_STEP`] falls back to
    /// [`DEFAULT_STEP`].
    pub fn new(step: f64) -> Sampler {
        if step.is_finite() && step >= MIN_STEP {
            Sampler { step }
        } else {
            tracing::debug!(step, "invalid sample step, using default");
            Sampler::default()
        }
    }

    /// The distance between samples, in mm.
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The number of samples taken over `[0, semi_diameter]`.
    ///
    /// Both ends are included.
    pub fn count(&self, semi_diameter: f64) -> usize {
        if !semi_diameter.is_finite() || semi_diameter < 0.0 {
            return 0;
        }
        // Guard against 8.25 / 0.05 landing just under 165.
        let intervals = (semi_diameter / self.step + 1e-9).floor();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "non-negative; the cast saturates"
        )]
        let intervals = intervals as usize;
        intervals.saturating_add(1)
    }

    /// An iterator over the samples of `profile`.
    ///
    /// The iterator can be cloned to walk the profile again.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the reference offset cannot be computed.
    pub fn samples<P: SagProfile>(&self, profile: P) -> Result<Samples<P>, GeometryError> {
        let offset = profile.reference_offset()?;
        let semi_diameter = profile.semi_diameter();
        Ok(Samples {
            count: self.count(semi_diameter),
            profile,
            step: self.step,
            semi_diameter,
            offset,
            index: 0,
        })
    }

    /// Sample `profile` into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first [`GeometryError`] met along the profile.
    #[tracing::instrument(level = "debug", skip(profile), fields(step = self.step))]
    pub fn sample<P: SagProfile>(&self, profile: P) -> Result<Vec<SagSample>, GeometryError> {
        let points = self.samples(profile)?.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = points.len(), "sampled profile");
        Ok(points)
    }
}

/// Iterator over the samples of a profile, created by [`Sampler::samples`].
#[derive(Clone, Debug)]
pub struct Samples<P> {
    profile: P,
    step: f64,
    semi_diameter: f64,
    offset: f64,
    index: usize,
    count: usize,
}

impl<P> Samples<P> {
    /// Radius of the `index`th sample.
    ///
    /// Computed from the index rather than accumulated, and capped at the
    /// edge so the last sample never rounds off the lens.
    fn radius(&self, index: usize) -> f64 {
        (index as f64 * self.step).min(self.semi_diameter)
    }
}

impl<P: SagProfile> Iterator for Samples<P> {
    type Item = Result<SagSample, GeometryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let radius = self.radius(self.index);
        self.index += 1;
        Some(
            self.profile
                .sag_at(radius)
                .map(|sag| SagSample::new(radius, sag - self.offset)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl<P: SagProfile> ExactSizeIterator for Samples<P> {}
