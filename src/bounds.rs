// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plot extents for sampled profiles.

use core::ops::Range;

use crate::SagSample;

/// Default distance between axis ticks, in mm.
pub const DEFAULT_TICK_STEP: f64 = 2.0;

/// The finest tick step [`Axis::ticks`] accepts, in mm.
pub const MIN_TICK_STEP: f64 = 1e-6;

/// A closed interval on one plot axis, in mm.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axis {
    /// The low end.
    pub min: f64,
    /// The high end.
    pub max: f64,
}

impl Axis {
    /// A new axis.
    #[inline]
    pub const fn new(min: f64, max: f64) -> Axis {
        Axis { min, max }
    }

    /// The length of the axis.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// The smallest axis with integer ends that contains this one.
    #[inline]
    #[must_use]
    pub fn round_out(self) -> Axis {
        Axis::new(self.min.floor(), self.max.ceil())
    }

    /// The smallest axis containing both.
    #[inline]
    #[must_use]
    pub fn union(self, other: Axis) -> Axis {
        Axis::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Tick positions at multiples of `step` that fall on the axis.
    ///
    /// Yields nothing if `step` is not a number of at least
    /// [`MIN_TICK_STEP`].
    pub fn ticks(&self, step: f64) -> Ticks {
        let span = self.span();
        if !step.is_finite() || step < MIN_TICK_STEP || span.is_nan() || span < 0.0 {
            return Ticks {
                first: 0.0,
                step: 1.0,
                indices: 0..0,
            };
        }
        let first = (self.min / step).ceil() * step;
        let intervals = ((self.max - first) / step + 1e-9).floor();
        let count = if intervals < 0.0 {
            0
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "non-negative; the cast saturates"
            )]
            let n = intervals as usize;
            n.saturating_add(1)
        };
        Ticks {
            first,
            step,
            indices: 0..count,
        }
    }
}

/// Iterator over tick positions, created by [`Axis::ticks`].
#[derive(Clone, Debug)]
pub struct Ticks {
    first: f64,
    step: f64,
    indices: Range<usize>,
}

impl Iterator for Ticks {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.indices
            .next()
            .map(|i| self.first + i as f64 * self.step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl ExactSizeIterator for Ticks {}

/// The extents of a plot showing one or two sampled profiles.
///
/// Both axes are widened to whole millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlotBounds {
    /// The radius axis.
    pub radius: Axis,
    /// The sag axis.
    pub sag: Axis,
}

impl PlotBounds {
    /// Bounds covering every sample of both profiles.
    ///
    /// Returns `None` if both are empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sagitta::{PlotBounds, SagSample};
    ///
    /// let a = [SagSample::new(0.0, -4.2), SagSample::new(8.25, 0.3)];
    /// let bounds = PlotBounds::of_pair(&a, &[]).unwrap();
    /// assert_eq!((bounds.sag.min, bounds.sag.max), (-5.0, 1.0));
    /// assert_eq!((bounds.radius.min, bounds.radius.max), (0.0, 9.0));
    /// ```
    pub fn of_pair(a: &[SagSample], b: &[SagSample]) -> Option<PlotBounds> {
        let mut samples = a.iter().chain(b);
        let first = samples.next()?;
        let start = PlotBounds {
            radius: Axis::new(first.radius, first.radius),
            sag: Axis::new(first.sag, first.sag),
        };
        let bounds = samples.fold(start, |bounds, s| bounds.union_sample(*s));
        Some(bounds.round_out())
    }

    /// Extend the bounds to include one sample.
    #[must_use]
    pub fn union_sample(self, sample: SagSample) -> PlotBounds {
        PlotBounds {
            radius: self.radius.union(Axis::new(sample.radius, sample.radius)),
            sag: self.sag.union(Axis::new(sample.sag, sample.sag)),
        }
    }

    /// Widen both axes to whole millimetres.
    #[must_use]
    pub fn round_out(self) -> PlotBounds {
        PlotBounds {
            radius: self.radius.round_out(),
            sag: self.sag.round_out(),
        }
    }

    /// Sag span over radius span, for plotting at true scale.
    ///
    /// Returns zero if the radius axis is empty.
    pub fn aspect_ratio(&self) -> f64 {
        let width = self.radius.span();
        if width == 0.0 {
            0.0
        } else {
            self.sag.span() / width
        }
    }
}
