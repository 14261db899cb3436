// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sagittal profiles of scleral contact lenses.
//!
//! A scleral lens vaults the cornea and rests on the sclera. Whether it fits
//! comes down to its sagittal depth: how far the back surface drops below a
//! flat chord at each distance from the axis. This crate computes that depth
//! for two families of lens:
//!
//! - [`KattProfile`], a four-zone design: a conic back optic zone, two
//!   straight tangent bands, and a landing zone reconstructed from a small
//!   table of reference depths.
//! - [`MultiCurveProfile`], any number of conic and tangent bands, with up
//!   to four independent meridians.
//!
//! Both implement [`SagProfile`], which is what the [`Sampler`] turns into a
//! point cloud and what [`compare_sag_at`] measures the difference between.
//! Every profile is anchored at a reference point in its landing zone, so
//! lenses of different diameters can be overlaid as they would sit on the
//! same eye.
//!
//! # Examples
//!
//! ```
//! use sagitta::{compare_sag_at, KattProfile, LensParams, PlotBounds};
//!
//! let params = LensParams::new(7.0, 0.98, 50.0, 45.0, 0.0, 16.5);
//! let lens1 = KattProfile::new("lens1", params);
//!
//! let sags = lens1.zone_sags().unwrap();
//! assert_eq!(sags.cumulative_microns(), [1795, 2634, 3384, 4153]);
//!
//! let mut lens2 = lens1.clone();
//! lens2.set_t1(45.0);
//! // A steeper first tangent vaults the centre higher above the eye.
//! assert!(compare_sag_at(Some(&lens2), Some(&lens1), 0.0).unwrap() < 0);
//!
//! let bounds = PlotBounds::of_pair(lens1.points().unwrap(), lens2.points().unwrap()).unwrap();
//! assert_eq!(bounds.radius.max, 9.0);
//! ```
//!
//! # Features
//!
//! - `serde`: Implement `serde::Deserialize` and `serde::Serialize` on the
//!   parameter, band and sample types, and read and write parameter sets as
//!   JSON.
//!
//! # Logging
//!
//! Cache recomputation, input clamping and failed comparisons are reported
//! as [`tracing`] events at `debug` level. The crate never installs a
//! subscriber.

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
#![allow(
    clippy::use_self,
    clippy::exhaustive_enums,
    clippy::missing_assert_message,
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason
)]

mod band;
mod bounds;
mod compare;
mod conic;
mod error;
mod landing;
mod multicurve;
pub mod params;
mod profile;
mod sag_curve;
mod sag_profile;
mod sampler;
pub mod store;
mod tangent;
mod zone;

pub use crate::band::*;
pub use crate::bounds::*;
pub use crate::compare::*;
pub use crate::conic::*;
pub use crate::error::*;
pub use crate::landing::*;
pub use crate::multicurve::*;
pub use crate::params::{
    clamp_diameter, Domain, LensKey, LensParams, DIAMETER_STEP, STANDARD_DIAMETER,
};
pub use crate::profile::*;
pub use crate::sag_curve::*;
pub use crate::sag_profile::*;
pub use crate::sampler::*;
pub use crate::store::{MemoryStore, ParamStore};
pub use crate::tangent::*;
pub use crate::zone::*;
