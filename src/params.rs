// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens parameters and their valid ranges.
//!
//! Parameters are never rejected. A value outside its range, or one that is
//! not a number, is replaced with the default for that field, so a lens can
//! always be drawn.

use core::fmt;
use core::ops::RangeInclusive;

use crate::LandingZoneCode;

/// The lens diameter every band width is specified against, in mm.
pub const STANDARD_DIAMETER: f64 = 16.5;

/// Diameters come in steps of this size, in mm.
pub const DIAMETER_STEP: f64 = 0.5;

/// The range and default of one numeric input.
#[derive(Clone, Debug, PartialEq)]
pub struct Domain {
    /// Values in this range are accepted.
    pub range: RangeInclusive<f64>,
    /// Replacement for values outside `range`.
    pub default: f64,
}

impl Domain {
    const fn new(min: f64, max: f64, default: f64) -> Domain {
        Domain {
            range: min..=max,
            default,
        }
    }

    /// `value` if it lies in range, otherwise the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() && self.range.contains(&value) {
            value
        } else {
            self.default
        }
    }
}

/// Base curve radius, mm.
pub const BASE_CURVE: Domain = Domain::new(4.0, 15.0, 7.7);
/// Back optic zone eccentricity.
pub const ECCENTRICITY: Domain = Domain::new(0.0, 2.0, 0.98);
/// First tangent band angle, degrees.
pub const T1_ANGLE: Domain = Domain::new(20.0, 80.0, 50.0);
/// Second tangent band angle, degrees.
pub const T2_ANGLE: Domain = Domain::new(20.0, 80.0, 45.0);
/// Overall diameter, mm.
pub const DIAMETER: Domain = Domain::new(16.5, 18.5, STANDARD_DIAMETER);

/// Snap a diameter to the nearest half millimetre.
///
/// A diameter outside the supported range falls back to the standard
/// diameter before snapping, so 18.6 is out of range rather than 18.5.
pub fn clamp_diameter(value: f64) -> f64 {
    let value = DIAMETER.clamp(value);
    (value / DIAMETER_STEP).round() * DIAMETER_STEP
}

/// The identity of a lens, used to pick a display colour and as the key
/// prefix when parameters are stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LensKey(String);

impl LensKey {
    /// A new key.
    pub fn new(key: impl Into<String>) -> LensKey {
        LensKey(key.into())
    }

    /// The key as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The display colour for lenses with this key.
    pub fn default_color(&self) -> &'static str {
        match self.0.as_str() {
            "lens1" => "#007bff",
            "lens2" => "#ff6b6b",
            _ => "#ffff00",
        }
    }
}

impl fmt::Display for LensKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LensKey {
    #[inline]
    fn from(key: &str) -> Self {
        LensKey::new(key)
    }
}

/// The six inputs of a four-zone scleral lens.
///
/// Fields are private so that every value is clamped on the way in; build
/// one with [`LensParams::new`] or start from the defaults and use the
/// `with_` methods.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LensParams {
    base_curve: f64,
    #[cfg_attr(feature = "serde", serde(rename = "eValue"))]
    eccentricity: f64,
    t1: f64,
    t2: f64,
    slz: LandingZoneCode,
    #[cfg_attr(feature = "serde", serde(rename = "lensDiameter"))]
    diameter: f64,
}

impl Default for LensParams {
    fn default() -> Self {
        LensParams {
            base_curve: BASE_CURVE.default,
            eccentricity: ECCENTRICITY.default,
            t1: T1_ANGLE.default,
            t2: T2_ANGLE.default,
            slz: LandingZoneCode::default(),
            diameter: DIAMETER.default,
        }
    }
}

impl LensParams {
    /// Parameters from raw input, each field clamped independently.
    pub fn new(
        base_curve: f64,
        eccentricity: f64,
        t1: f64,
        t2: f64,
        slz: f64,
        diameter: f64,
    ) -> LensParams {
        LensParams::default()
            .with_base_curve(base_curve)
            .with_eccentricity(eccentricity)
            .with_t1(t1)
            .with_t2(t2)
            .with_slz(slz)
            .with_diameter(diameter)
    }

    /// The base curve radius, in mm.
    #[inline]
    pub fn base_curve(&self) -> f64 {
        self.base_curve
    }

    /// The back optic zone eccentricity.
    #[inline]
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// The first tangent angle, in degrees.
    #[inline]
    pub fn t1(&self) -> f64 {
        self.t1
    }

    /// The second tangent angle, in degrees.
    #[inline]
    pub fn t2(&self) -> f64 {
        self.t2
    }

    /// The landing zone code.
    #[inline]
    pub fn slz(&self) -> LandingZoneCode {
        self.slz
    }

    /// The overall diameter, in mm.
    #[inline]
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Set the base curve radius.
    #[must_use]
    pub fn with_base_curve(mut self, value: f64) -> LensParams {
        self.base_curve = clamped("base curve", &BASE_CURVE, value);
        self
    }

    /// Set the eccentricity.
    #[must_use]
    pub fn with_eccentricity(mut self, value: f64) -> LensParams {
        self.eccentricity = clamped("eccentricity", &ECCENTRICITY, value);
        self
    }

    /// Set the first tangent angle.
    #[must_use]
    pub fn with_t1(mut self, value: f64) -> LensParams {
        self.t1 = clamped("T1", &T1_ANGLE, value);
        self
    }

    /// Set the second tangent angle.
    #[must_use]
    pub fn with_t2(mut self, value: f64) -> LensParams {
        self.t2 = clamped("T2", &T2_ANGLE, value);
        self
    }

    /// Set the landing zone code from user input; see
    /// [`LandingZoneCode::from_input`].
    #[must_use]
    pub fn with_slz(mut self, value: f64) -> LensParams {
        self.slz = LandingZoneCode::from_input(value);
        if f64::from(self.slz.get()) != value {
            tracing::debug!(input = value, code = self.slz.get(), "landing zone code adjusted");
        }
        self
    }

    /// Set the diameter; see [`clamp_diameter`].
    #[must_use]
    pub fn with_diameter(mut self, value: f64) -> LensParams {
        self.diameter = clamp_diameter(value);
        if self.diameter != value {
            tracing::debug!(input = value, diameter = self.diameter, "diameter adjusted");
        }
        self
    }

    /// A one-line summary, as used in plot legends.
    pub fn summary(&self) -> String {
        format!(
            "{} e{} T1 {}° T2 {}° SLZ {} Ø{}",
            self.base_curve,
            self.eccentricity,
            self.t1,
            self.t2,
            self.slz.get(),
            self.diameter
        )
    }
}

fn clamped(field: &'static str, domain: &Domain, value: f64) -> f64 {
    let result = domain.clamp(value);
    if result != value {
        tracing::debug!(field, input = value, replacement = result, "parameter out of range");
    }
    result
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for LensParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            base_curve: Option<f64>,
            e_value: Option<f64>,
            t1: Option<f64>,
            t2: Option<f64>,
            slz: Option<f64>,
            lens_diameter: Option<f64>,
        }
        let raw = Raw::deserialize(deserializer)?;
        let mut params = LensParams::default();
        if let Some(v) = raw.base_curve {
            params = params.with_base_curve(v);
        }
        if let Some(v) = raw.e_value {
            params = params.with_eccentricity(v);
        }
        if let Some(v) = raw.t1 {
            params = params.with_t1(v);
        }
        if let Some(v) = raw.t2 {
            params = params.with_t2(v);
        }
        if let Some(v) = raw.slz {
            params = params.with_slz(v);
        }
        if let Some(v) = raw.lens_diameter {
            params = params.with_diameter(v);
        }
        Ok(params)
    }
}
