// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bands of a multi-curve lens.

use core::fmt;
use core::str::FromStr;

use smallvec::{smallvec, SmallVec};

use crate::{BandParseError, Conic, GeometryError, SagCurve, Tangent};

/// One band of one meridian: either a conic section or a straight line.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Band {
    /// A conic section, concentric with the lens axis.
    Asphere {
        /// Apical radius, mm.
        radius: f64,
        /// Eccentricity.
        eccentricity: f64,
        /// Radial width of the band, mm.
        width: f64,
    },
    /// A straight band at a fixed angle to the lens axis.
    Tangent {
        /// Angle, degrees.
        angle: f64,
        /// Radial width of the band, mm.
        width: f64,
    },
}

impl Band {
    /// A spherical band.
    #[inline]
    pub const fn sphere(radius: f64, width: f64) -> Band {
        Band::Asphere {
            radius,
            eccentricity: 0.0,
            width,
        }
    }

    /// The radial width of the band, in mm.
    ///
    /// A width that is not a positive number counts as zero, so the band
    /// takes up no room.
    pub fn width(&self) -> f64 {
        let width = match *self {
            Band::Asphere { width, .. } | Band::Tangent { width, .. } => width,
        };
        if width.is_finite() && width > 0.0 {
            width
        } else {
            0.0
        }
    }

    /// The sag this band adds between radius `start`, where it begins, and
    /// radius `y`.
    ///
    /// An asphere is evaluated at the true radii and re-based to zero at
    /// `start`, so each band keeps its own apex on the lens axis. A tangent
    /// only sees the distance travelled into the band.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the underlying curve cannot be
    /// evaluated at `start` or `y`.
    pub fn sag_across(&self, start: f64, y: f64) -> Result<f64, GeometryError> {
        match *self {
            Band::Asphere {
                radius,
                eccentricity,
                ..
            } => Conic::new(radius, eccentricity).sag_between(start, y),
            Band::Tangent { angle, .. } => Tangent::new(angle).sag(y - start),
        }
    }
}

/// The text form is the kind followed by its values, separated by spaces:
/// `asphere {radius} {eccentricity} {width}` or `tangent {angle} {width}`.
impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Band::Asphere {
                radius,
                eccentricity,
                width,
            } => write!(f, "asphere {radius} {eccentricity} {width}"),
            Band::Tangent { angle, width } => write!(f, "tangent {angle} {width}"),
        }
    }
}

impl FromStr for Band {
    type Err = BandParseError;

    fn from_str(s: &str) -> Result<Band, BandParseError> {
        let mut words = s.split_whitespace();
        let kind = words.next().unwrap_or_default();
        let expected = match kind {
            "asphere" => 3,
            "tangent" => 2,
            other => return Err(BandParseError::UnknownKind(other.to_owned())),
        };
        let values = words
            .map(str::parse::<f64>)
            .collect::<Result<SmallVec<[f64; 3]>, _>>()?;
        match *values.as_slice() {
            [radius, eccentricity, width] if expected == 3 => Ok(Band::Asphere {
                radius,
                eccentricity,
                width,
            }),
            [angle, width] if expected == 2 => Ok(Band::Tangent { angle, width }),
            _ => Err(BandParseError::FieldCount {
                expected,
                found: values.len(),
            }),
        }
    }
}

/// How many meridians a multi-curve lens is specified in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Toricity {
    /// Rotationally symmetric: one meridian.
    #[default]
    Spherical,
    /// Two principal meridians, each repeated on the opposite side.
    Toric,
    /// Four independent quadrants.
    Quadrant,
}

impl Toricity {
    /// The number of meridians.
    #[inline]
    pub const fn meridian_count(self) -> usize {
        match self {
            Toricity::Spherical => 1,
            Toricity::Toric | Toricity::Quadrant => 4,
        }
    }

    /// The eye axis of each meridian, in degrees.
    #[inline]
    pub fn axes(self) -> &'static [u16] {
        &MERIDIAN_AXES[..self.meridian_count()]
    }
}

/// Eye axes of the meridians, in degrees.
pub const MERIDIAN_AXES: [u16; 4] = [0, 90, 180, 270];

impl fmt::Display for Toricity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Toricity::Spherical => "spherical",
            Toricity::Toric => "toric",
            Toricity::Quadrant => "quadrant",
        })
    }
}

impl FromStr for Toricity {
    type Err = BandParseError;

    fn from_str(s: &str) -> Result<Toricity, BandParseError> {
        match s.trim() {
            "spherical" => Ok(Toricity::Spherical),
            "toric" => Ok(Toricity::Toric),
            "quadrant" => Ok(Toricity::Quadrant),
            other => Err(BandParseError::UnknownToricity(other.to_owned())),
        }
    }
}

/// One band across every meridian.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandSpec {
    meridians: SmallVec<[Band; 4]>,
}

impl BandSpec {
    /// The same band in every meridian.
    pub fn uniform(band: Band) -> BandSpec {
        BandSpec {
            meridians: smallvec![band],
        }
    }

    /// A toric band: `flat` at 0° and 180°, `steep` at 90° and 270°.
    pub fn toric(flat: Band, steep: Band) -> BandSpec {
        BandSpec {
            meridians: smallvec![flat, steep, flat, steep],
        }
    }

    /// A band given separately for each quadrant, starting at 0°.
    pub fn quadrant(bands: [Band; 4]) -> BandSpec {
        BandSpec {
            meridians: SmallVec::from_buf(bands),
        }
    }

    /// The band in each meridian, in axis order.
    #[inline]
    pub fn meridians(&self) -> &[Band] {
        &self.meridians
    }

    /// The band in `meridian`.
    ///
    /// A spec with fewer meridians than asked for repeats its first one.
    pub fn get(&self, meridian: usize) -> Band {
        self.meridians
            .get(meridian)
            .or_else(|| self.meridians.first())
            .copied()
            .unwrap_or(Band::sphere(0.0, 0.0))
    }

    /// Replace the band in `meridian`, growing the list with copies of its
    /// first meridian if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoSuchMeridian`] if `meridian` is not one of
    /// the [`MERIDIAN_AXES`].
    pub fn set(&mut self, meridian: usize, band: Band) -> Result<(), GeometryError> {
        if meridian >= MERIDIAN_AXES.len() {
            return Err(GeometryError::NoSuchMeridian {
                index: meridian,
                count: MERIDIAN_AXES.len(),
            });
        }
        while self.meridians.len() <= meridian {
            let first = self.get(0);
            self.meridians.push(first);
        }
        self.meridians[meridian] = band;
        Ok(())
    }

    /// Resize to exactly `count` meridians.
    ///
    /// With `reseed`, every meridian becomes a copy of the first. Otherwise
    /// missing meridians are copies of the first and extra ones are dropped.
    pub(crate) fn conform(&mut self, count: usize, reseed: bool) {
        let first = self.get(0);
        if reseed {
            self.meridians.clear();
        }
        self.meridians.truncate(count);
        while self.meridians.len() < count {
            self.meridians.push(first);
        }
    }
}

/// The text form is each meridian's band, in axis order, separated by `;`.
impl fmt::Display for BandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, band) in self.meridians.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{band}")?;
        }
        Ok(())
    }
}

impl FromStr for BandSpec {
    type Err = BandParseError;

    fn from_str(s: &str) -> Result<BandSpec, BandParseError> {
        let meridians = s
            .split(';')
            .map(str::parse)
            .collect::<Result<SmallVec<[Band; 4]>, _>>()?;
        if meridians.len() > MERIDIAN_AXES.len() {
            return Err(BandParseError::MeridianCount(meridians.len()));
        }
        Ok(BandSpec { meridians })
    }
}

impl From<Band> for BandSpec {
    #[inline]
    fn from(band: Band) -> Self {
        BandSpec::uniform(band)
    }
}
