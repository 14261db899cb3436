// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

/// A failure evaluating one of the closed-form curves.
///
/// These indicate a zone bookkeeping mistake or an impossible parameter
/// combination (a back optic radius too steep to reach the zone edge), so
/// they are surfaced rather than turned into `NaN`.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum GeometryError {
    /// The apical radius of a conic section was zero.
    #[error("conic radius must be non-zero")]
    InvalidRadius,
    /// The requested semi-chord lies beyond what the conic section can reach.
    #[error("semi-chord {y} mm is outside the conic with radius {radius} mm, e = {eccentricity}")]
    OutOfDomain {
        /// Apical radius of the conic, in mm.
        radius: f64,
        /// Eccentricity of the conic.
        eccentricity: f64,
        /// The semi-chord that was requested, in mm.
        y: f64,
    },
    /// A tangent line with a zero angle has no defined sag.
    #[error("tangent angle must be non-zero")]
    InvalidAngle,
    /// A meridian was requested that the lens does not have.
    #[error("meridian {index} requested from a lens with {count}")]
    NoSuchMeridian {
        /// The requested meridian.
        index: usize,
        /// How many meridians the lens has.
        count: usize,
    },
}

/// A failure comparing the sag of two lenses.
///
/// The `Display` text is the short status shown next to a comparison field.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CompareError {
    /// One of the two lenses was not supplied.
    #[error("Invalid lens data")]
    MissingLens,
    /// The semi-chord is negative, not finite, or above 10 mm.
    #[error("Invalid input")]
    InvalidInput,
    /// The semi-chord is beyond the edge of at least one lens.
    #[error("Too wide")]
    TooWide,
    /// One of the lenses could not be evaluated.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A failure reading a band or toricity from its text form.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BandParseError {
    /// A band did not start with `asphere` or `tangent`.
    #[error("unknown band kind {0:?}")]
    UnknownKind(String),
    /// A toricity was not `spherical`, `toric` or `quadrant`.
    #[error("unknown toricity {0:?}")]
    UnknownToricity(String),
    /// A band had the wrong number of values for its kind.
    #[error("expected {expected} values, found {found}")]
    FieldCount {
        /// How many values the band kind takes.
        expected: usize,
        /// How many were given.
        found: usize,
    },
    /// A value was not a number.
    #[error(transparent)]
    Number(#[from] core::num::ParseFloatError),
    /// A band listed more than four meridians.
    #[error("a band has at most 4 meridians, found {0}")]
    MeridianCount(usize),
}

/// A failure decoding a stored parameter set.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The stored text was not valid JSON for the requested type.
    #[error("malformed parameter set: {0}")]
    Json(#[from] serde_json::Error),
}
