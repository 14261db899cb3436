// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The four zones of a scleral lens.

use std::borrow::Cow;

use arrayvec::ArrayVec;

use crate::{LANDING_HALF_WIDTH, STANDARD_DIAMETER};

/// Diameter of the back optic zone, in mm.
pub const BACK_OPTIC_ZONE_DIAMETER: f64 = 10.0;

/// One of the four zones, innermost first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Zone {
    /// The central aspheric zone.
    BackOptic,
    /// The first tangent band.
    T1,
    /// The second tangent band.
    T2,
    /// The scleral landing zone, out to the edge of the lens.
    Landing,
}

impl Zone {
    /// All zones, innermost first.
    pub const ALL: [Zone; 4] = [Zone::BackOptic, Zone::T1, Zone::T2, Zone::Landing];

    /// The short name of the zone, as printed on reference lines.
    pub const fn label(self) -> &'static str {
        match self {
            Zone::BackOptic => "BOZD",
            Zone::T1 => "T1",
            Zone::T2 => "T2",
            Zone::Landing => "SLZ",
        }
    }
}

/// Radial widths of the zones for a given diameter.
///
/// The tangent bands widen by a quarter of the extra diameter each, so the
/// landing zone is the same width on every lens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneWidths {
    /// Overall diameter, mm.
    pub diameter: f64,
    /// Radius of the back optic zone, mm.
    pub back_optic: f64,
    /// Width of the first tangent band, mm.
    pub t1: f64,
    /// Width of the second tangent band, mm.
    pub t2: f64,
    /// Distance from the start of the landing zone to the reference point, mm.
    pub landing_half: f64,
}

impl ZoneWidths {
    /// Zone widths for a lens of the given diameter.
    pub fn for_diameter(diameter: f64) -> ZoneWidths {
        let extra = (diameter - STANDARD_DIAMETER) / 4.0;
        ZoneWidths {
            diameter,
            back_optic: BACK_OPTIC_ZONE_DIAMETER / 2.0,
            t1: 1.0 + extra,
            t2: 0.75 + extra,
            landing_half: LANDING_HALF_WIDTH,
        }
    }

    /// Half the overall diameter.
    #[inline]
    pub fn semi_diameter(&self) -> f64 {
        self.diameter / 2.0
    }

    /// The radius at which the reference point sits.
    ///
    /// This is half of `diameter - 1.5`, which is also the landing zone's
    /// start plus its half-width.
    #[inline]
    pub fn reference_radius(&self) -> f64 {
        (self.diameter - 1.5) / 2.0
    }

    /// The outer radius of each zone, innermost first.
    ///
    /// The last entry is the semi-diameter, so the zones partition
    /// `[0, diameter / 2]`.
    pub fn boundaries(&self) -> [f64; 4] {
        let boz = self.back_optic;
        let t1 = boz + self.t1;
        let t2 = t1 + self.t2;
        [boz, t1, t2, self.semi_diameter()]
    }

    /// The radius at which `zone` starts.
    pub fn start_of(&self, zone: Zone) -> f64 {
        let b = self.boundaries();
        match zone {
            Zone::BackOptic => 0.0,
            Zone::T1 => b[0],
            Zone::T2 => b[1],
            Zone::Landing => b[2],
        }
    }

    /// The zone containing radius `y`, or `None` outside the lens.
    ///
    /// Each zone includes its outer boundary. The centre itself is reported
    /// as `None`, since the sag there is zero by definition.
    pub fn zone_at(&self, y: f64) -> Option<Zone> {
        if y.is_nan() || y <= 0.0 {
            return None;
        }
        self.boundaries()
            .iter()
            .zip(Zone::ALL)
            .find(|&(&outer, _)| y <= outer)
            .map(|(_, zone)| zone)
    }

    /// Reference lines marking the zone junctions and the reference point,
    /// for overlaying on a plot.
    pub fn reference_lines(&self) -> ArrayVec<ReferenceLine, 4> {
        let b = self.boundaries();
        let mut lines = ArrayVec::new();
        lines.push(ReferenceLine::new(b[0], Zone::BackOptic.label()));
        lines.push(ReferenceLine::new(b[1], Zone::T1.label()));
        lines.push(ReferenceLine::new(b[2], Zone::T2.label()));
        lines.push(ReferenceLine::new(self.reference_radius(), "Ref Point"));
        lines
    }
}

/// A labelled radius on a profile plot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceLine {
    /// Radial distance from the lens axis, mm.
    pub radius: f64,
    /// Short label.
    pub label: Cow<'static, str>,
}

impl ReferenceLine {
    /// A new reference line.
    #[inline]
    pub fn new(radius: f64, label: impl Into<Cow<'static, str>>) -> ReferenceLine {
        ReferenceLine {
            radius,
            label: label.into(),
        }
    }

    /// The chord the line marks, which is how fitters quote zone sizes.
    #[inline]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }
}
