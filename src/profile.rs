// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The four-zone scleral lens.

use core::cell::OnceCell;

use arrayvec::ArrayVec;

use crate::{
    diameter_correction, Conic, GeometryError, LandingCurve, LandingShape, LensKey, LensParams,
    ReferenceLine, SagCurve, SagProfile, SagSample, Sampler, Tangent, Zone, ZoneWidths,
    DEFAULT_STEP,
};

/// Settings that change how a profile is computed, but are not lens
/// parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileConfig {
    /// Shape constant of the landing zone fit.
    pub landing_shape: LandingShape,
    /// Distance between points of the sampled profile, mm.
    pub step: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            landing_shape: LandingShape::default(),
            step: DEFAULT_STEP,
        }
    }
}

impl ProfileConfig {
    /// The configuration with any unusable value replaced by its default.
    ///
    /// A landing shape must be finite, and a step must be one that
    /// [`Sampler::new`] accepts.
    #[must_use]
    pub fn validated(self) -> ProfileConfig {
        let landing_shape = if self.landing_shape.0.is_finite() {
            self.landing_shape
        } else {
            tracing::debug!(a = self.landing_shape.0, "invalid landing shape, using default");
            LandingShape::default()
        };
        ProfileConfig {
            landing_shape,
            step: Sampler::new(self.step).step(),
        }
    }
}

/// Convert millimetres to whole micrometres.
#[inline]
#[expect(clippy::cast_possible_truncation, reason = "sags are a few mm at most")]
pub fn microns(mm: f64) -> i64 {
    (mm * 1000.0).round() as i64
}

/// The sag each zone adds, in mm.
///
/// The landing entry runs only to the reference point, not to the edge of
/// the lens.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ZoneSags {
    /// Sag of the back optic zone at its edge.
    pub back_optic: f64,
    /// Sag added across the first tangent band.
    pub t1: f64,
    /// Sag added across the second tangent band.
    pub t2: f64,
    /// Sag added from the start of the landing zone to the reference point.
    pub landing: f64,
}

impl ZoneSags {
    /// The sag added by `zone`.
    pub fn of(&self, zone: Zone) -> f64 {
        match zone {
            Zone::BackOptic => self.back_optic,
            Zone::T1 => self.t1,
            Zone::T2 => self.t2,
            Zone::Landing => self.landing,
        }
    }

    /// The sag at the outer end of each zone, innermost first.
    ///
    /// The last entry is the total sag at the reference point.
    pub fn cumulative(&self) -> [f64; 4] {
        let boz = self.back_optic;
        let t1 = boz + self.t1;
        let t2 = t1 + self.t2;
        [boz, t1, t2, t2 + self.landing]
    }

    /// The total sag at the reference point.
    #[inline]
    pub fn total(&self) -> f64 {
        self.cumulative()[3]
    }

    /// [`ZoneSags::cumulative`] in whole micrometres.
    pub fn cumulative_microns(&self) -> [i64; 4] {
        self.cumulative().map(microns)
    }
}

/// Values derived from the parameters, computed on first use.
///
/// Widths depend only on the diameter, sags on every parameter; they are
/// kept apart so that each can be reasoned about on its own, but every
/// setter clears both.
#[derive(Clone, Debug, Default)]
struct Cache {
    widths: OnceCell<ZoneWidths>,
    sags: OnceCell<Result<ZoneSags, GeometryError>>,
    points: OnceCell<Result<Vec<SagSample>, GeometryError>>,
}

impl Cache {
    fn invalidate(&mut self) {
        self.widths.take();
        self.sags.take();
        self.points.take();
    }
}

/// A scleral lens made of a back optic zone, two tangent bands and a
/// landing zone.
///
/// Derived values are cached on first read and cleared by every setter, so
/// a reader always sees values consistent with the current parameters. The
/// caches use [`OnceCell`], so a profile can be shared between readers on
/// one thread but not across threads.
///
/// # Examples
///
/// ```
/// use sagitta::{KattProfile, LensParams, SagProfile};
///
/// let mut lens = KattProfile::new("lens1", LensParams::default());
/// let before = lens.sag_at(6.0).unwrap();
/// lens.set_t1(40.0);
/// assert!(lens.sag_at(6.0).unwrap() > before);
/// ```
#[derive(Clone, Debug)]
pub struct KattProfile {
    key: LensKey,
    params: LensParams,
    config: ProfileConfig,
    color: String,
    draw_band_labels: bool,
    draw_sag_labels: bool,
    cache: Cache,
}

impl KattProfile {
    /// A new profile with the default configuration.
    pub fn new(key: impl Into<LensKey>, params: LensParams) -> KattProfile {
        KattProfile::with_config(key, params, ProfileConfig::default())
    }

    /// A new profile.
    pub fn with_config(
        key: impl Into<LensKey>,
        params: LensParams,
        config: ProfileConfig,
    ) -> KattProfile {
        let key = key.into();
        KattProfile {
            color: key.default_color().to_owned(),
            key,
            params,
            config: config.validated(),
            draw_band_labels: false,
            draw_sag_labels: true,
            cache: Cache::default(),
        }
    }

    /// The lens's identity.
    #[inline]
    pub fn key(&self) -> &LensKey {
        &self.key
    }

    /// The current (clamped) parameters.
    #[inline]
    pub fn params(&self) -> &LensParams {
        &self.params
    }

    /// The current configuration.
    #[inline]
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// The overall diameter, in mm.
    #[inline]
    pub fn diameter(&self) -> f64 {
        self.params.diameter()
    }

    // Setters. Each one clamps its input and clears every cached value.

    /// Replace all six parameters.
    pub fn set_params(&mut self, params: LensParams) {
        self.params = params;
        self.cache.invalidate();
    }

    /// Set the base curve radius.
    pub fn set_base_curve(&mut self, value: f64) {
        self.set_params(self.params.with_base_curve(value));
    }

    /// Set the back optic zone eccentricity.
    pub fn set_eccentricity(&mut self, value: f64) {
        self.set_params(self.params.with_eccentricity(value));
    }

    /// Set the first tangent angle.
    pub fn set_t1(&mut self, value: f64) {
        self.set_params(self.params.with_t1(value));
    }

    /// Set the second tangent angle.
    pub fn set_t2(&mut self, value: f64) {
        self.set_params(self.params.with_t2(value));
    }

    /// Set the landing zone code.
    pub fn set_slz(&mut self, value: f64) {
        self.set_params(self.params.with_slz(value));
    }

    /// Set the overall diameter.
    pub fn set_diameter(&mut self, value: f64) {
        self.set_params(self.params.with_diameter(value));
    }

    /// Set the landing zone shape constant. A constant that is not finite
    /// falls back to the default.
    pub fn set_landing_shape(&mut self, landing_shape: LandingShape) {
        self.config = ProfileConfig {
            landing_shape,
            ..self.config
        }
        .validated();
        self.cache.invalidate();
    }

    /// Set the sample step. Only the point cloud depends on it.
    ///
    /// A step [`Sampler::new`] would reject falls back to the default.
    pub fn set_step(&mut self, step: f64) {
        self.config = ProfileConfig {
            step,
            ..self.config
        }
        .validated();
        self.cache.points.take();
    }

    // Display settings. These never touch the geometry.

    /// The plot colour, as a hex string.
    #[inline]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Set the plot colour.
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    /// Whether band labels are drawn.
    #[inline]
    pub fn draw_band_labels(&self) -> bool {
        self.draw_band_labels
    }

    /// Set whether band labels are drawn.
    pub fn set_draw_band_labels(&mut self, draw: bool) {
        self.draw_band_labels = draw;
    }

    /// Whether sag labels are drawn.
    #[inline]
    pub fn draw_sag_labels(&self) -> bool {
        self.draw_sag_labels
    }

    /// Set whether sag labels are drawn.
    pub fn set_draw_sag_labels(&mut self, draw: bool) {
        self.draw_sag_labels = draw;
    }

    // Derived values.

    /// The zone widths for the current diameter.
    pub fn widths(&self) -> ZoneWidths {
        *self
            .cache
            .widths
            .get_or_init(|| ZoneWidths::for_diameter(self.params.diameter()))
    }

    /// The sag each zone adds.
    ///
    /// # Errors
    ///
    /// Fails if the back optic zone cannot reach its edge, which happens for
    /// steep spherical base curves.
    pub fn zone_sags(&self) -> Result<ZoneSags, GeometryError> {
        *self.cache.sags.get_or_init(|| {
            let sags = self.compute_zone_sags();
            tracing::debug!(key = %self.key, ?sags, "computed zone sags");
            sags
        })
    }

    fn compute_zone_sags(&self) -> Result<ZoneSags, GeometryError> {
        let widths = self.widths();
        Ok(ZoneSags {
            back_optic: self.back_optic().sag(widths.back_optic)?,
            t1: Tangent::new(self.params.t1()).sag(widths.t1)?,
            t2: Tangent::new(self.params.t2()).sag(widths.t2)?,
            landing: self.params.slz().reference_sag(),
        })
    }

    /// The total sag at the reference point, in mm.
    ///
    /// # Errors
    ///
    /// See [`KattProfile::zone_sags`].
    pub fn reference_sag(&self) -> Result<f64, GeometryError> {
        Ok(self.zone_sags()?.total())
    }

    /// The back optic zone curve.
    #[inline]
    pub fn back_optic(&self) -> Conic {
        Conic::new(self.params.base_curve(), self.params.eccentricity())
    }

    /// The fitted landing zone curve.
    #[inline]
    pub fn landing_curve(&self) -> LandingCurve {
        LandingCurve::for_code(self.params.slz(), self.config.landing_shape)
    }

    /// The sampled profile, normalized to the reference point.
    ///
    /// The slice borrows the profile; copy it to keep it across a
    /// parameter change.
    ///
    /// # Errors
    ///
    /// Fails if any sample cannot be evaluated.
    pub fn points(&self) -> Result<&[SagSample], GeometryError> {
        self.cache
            .points
            .get_or_init(|| Sampler::new(self.config.step).sample(self))
            .as_deref()
            .map_err(|e| *e)
    }

    /// Lines marking the zone junctions and the reference point.
    pub fn reference_lines(&self) -> ArrayVec<ReferenceLine, 4> {
        self.widths().reference_lines()
    }

    /// A one-line description of the lens, for legends.
    pub fn summary(&self) -> String {
        self.params.summary()
    }
}

impl SagProfile for KattProfile {
    fn sag_at(&self, y: f64) -> Result<f64, GeometryError> {
        let widths = self.widths();
        let Some(zone) = widths.zone_at(y) else {
            return Ok(0.0);
        };
        let local = y - widths.start_of(zone);
        // The zone sags are only needed past the back optic zone, which
        // can be evaluated even when its edge is out of reach.
        match zone {
            Zone::BackOptic => self.back_optic().sag(y),
            Zone::T1 => {
                let [boz, ..] = self.zone_sags()?.cumulative();
                Ok(boz + Tangent::new(self.params.t1()).sag(local)?)
            }
            Zone::T2 => {
                let [_, t1, ..] = self.zone_sags()?.cumulative();
                Ok(t1 + Tangent::new(self.params.t2()).sag(local)?)
            }
            Zone::Landing => {
                let [_, _, t2, _] = self.zone_sags()?.cumulative();
                Ok(t2 + self.landing_curve().eval(local))
            }
        }
    }

    #[inline]
    fn semi_diameter(&self) -> f64 {
        self.params.diameter() / 2.0
    }

    fn reference_offset(&self) -> Result<f64, GeometryError> {
        Ok(self.reference_sag()? - diameter_correction(self.params.diameter())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LANDING_HALF_WIDTH;

    fn assert_approx_eq(x: f64, y: f64, tolerance: f64) {
        assert!((x - y).abs() < tolerance, "{x} != {y}");
    }

    fn scenario() -> KattProfile {
        KattProfile::new("lens1", LensParams::new(7.0, 0.98, 50.0, 45.0, 0.0, 16.5))
    }

    #[test]
    fn concrete_scenario() {
        let lens = scenario();
        let widths = lens.widths();
        assert_eq!(widths.t1, 1.0);
        assert_eq!(widths.t2, 0.75);
        let sags = lens.zone_sags().unwrap();
        assert_approx_eq(sags.back_optic, 1.7948, 1e-4);
        assert_approx_eq(sags.t1, 0.8391, 1e-4);
        assert_approx_eq(sags.t2, 0.75, 1e-12);
        assert_eq!(sags.landing, 0.769);
        assert_approx_eq(lens.reference_sag().unwrap(), 4.153, 1e-3);
        assert_eq!(sags.cumulative_microns()[0], 1795);
    }

    #[test]
    fn continuity_at_boundaries() {
        for d in [16.5, 17.0, 17.5, 18.0, 18.5] {
            let mut lens = scenario();
            lens.set_diameter(d);
            let [boz, t1, t2, _] = lens.widths().boundaries();
            for b in [boz, t1, t2] {
                let inside = lens.sag_at(b).unwrap();
                let outside = lens.sag_at(b + 1e-12).unwrap();
                assert_approx_eq(inside, outside, 1e-9);
            }
        }
    }

    #[test]
    fn landing_hits_table_at_reference_point() {
        let lens = scenario();
        let widths = lens.widths();
        let at_ref = lens.sag_at(widths.reference_radius()).unwrap();
        assert_approx_eq(at_ref, lens.reference_sag().unwrap(), 1e-12);
        let start = widths.start_of(Zone::Landing);
        assert_approx_eq(
            lens.sag_at(start + LANDING_HALF_WIDTH).unwrap() - lens.sag_at(start).unwrap(),
            0.769,
            1e-12,
        );
    }

    #[test]
    fn outside_the_lens() {
        let lens = scenario();
        assert_eq!(lens.sag_at(0.0), Ok(0.0));
        assert_eq!(lens.sag_at(-3.0), Ok(0.0));
        assert_eq!(lens.sag_at(8.3), Ok(0.0));
        assert!(lens.sag_at(8.25).unwrap() > 4.0);
    }

    #[test]
    fn clamping() {
        let lens = KattProfile::new("lens1", LensParams::new(2.0, 0.98, 50.0, 45.0, 0.0, 17.3));
        assert_eq!(lens.params().base_curve(), 7.7);
        assert_eq!(lens.diameter(), 17.5);
    }

    #[test]
    fn setters_invalidate() {
        let mut lens = scenario();
        let sag = lens.reference_sag().unwrap();
        let points = lens.points().unwrap().to_vec();

        lens.set_slz(5.0);
        assert_approx_eq(lens.reference_sag().unwrap(), sag - 0.769 + 0.614, 1e-12);

        lens.set_diameter(18.5);
        assert_eq!(lens.widths().t1, 1.5);
        assert_eq!(lens.points().unwrap().len(), 186);
        assert_eq!(points.len(), 166);

        lens.set_step(0.25);
        assert_eq!(lens.points().unwrap().len(), 38);
        lens.set_step(f64::MIN_POSITIVE);
        assert_eq!(lens.config().step, DEFAULT_STEP);
        assert_eq!(lens.points().unwrap().len(), 186);
    }

    #[test]
    fn landing_shape_invalidates() {
        let mut lens = scenario();
        let start = lens.widths().start_of(Zone::Landing);
        let inside = lens.sag_at(start + 0.3).unwrap();
        let edge = lens.sag_at(8.25).unwrap();
        let reference = lens.reference_sag().unwrap();
        let points = lens.points().unwrap().to_vec();

        lens.set_landing_shape(LandingShape::SHALLOW);
        assert_eq!(lens.config().landing_shape, LandingShape::SHALLOW);
        assert!((lens.sag_at(start + 0.3).unwrap() - inside).abs() > 1e-6);
        assert!((lens.sag_at(8.25).unwrap() - edge).abs() > 1e-6);
        assert_approx_eq(lens.reference_sag().unwrap(), reference, 1e-12);
        assert_ne!(lens.points().unwrap(), &points[..]);

        lens.set_landing_shape(LandingShape(f64::NAN));
        assert_eq!(lens.config().landing_shape, LandingShape::STANDARD);
        assert_approx_eq(lens.sag_at(start + 0.3).unwrap(), inside, 1e-12);
    }

    #[test]
    fn config_is_validated() {
        let config = ProfileConfig {
            landing_shape: LandingShape(f64::INFINITY),
            step: -1.0,
        };
        let lens = KattProfile::with_config("lens1", LensParams::default(), config);
        assert_eq!(lens.config(), &ProfileConfig::default());
    }

    #[test]
    fn point_cloud() {
        let lens = scenario();
        let points = lens.points().unwrap();
        assert_eq!(points.len(), 166);
        let reference = points.iter().find(|p| (p.radius - 7.5).abs() < 1e-9).unwrap();
        assert_approx_eq(reference.sag, 0.0, 1e-12);
        assert_approx_eq(points[0].sag, -lens.reference_sag().unwrap(), 1e-12);
    }

    #[test]
    fn relative_to_reference() {
        let lens = scenario();
        assert_approx_eq(lens.sag_relative_to_reference(7.5).unwrap(), 0.0, 1e-12);
        let mut wide = scenario();
        wide.set_diameter(18.5);
        let correction = diameter_correction(18.5).unwrap();
        let expected = wide.sag_at(8.5).unwrap() - wide.reference_sag().unwrap() + correction;
        assert_approx_eq(wide.sag_relative_to_reference(8.5).unwrap(), expected, 1e-12);
        assert_approx_eq(wide.sag_relative_to_reference(8.5).unwrap(), correction, 1e-12);
    }

    #[test]
    fn unreachable_back_optic_zone() {
        let lens = KattProfile::new("lens1", LensParams::new(4.0, 0.0, 50.0, 45.0, 0.0, 16.5));
        assert!(lens.sag_at(3.0).is_ok());
        assert!(matches!(lens.sag_at(5.0), Err(GeometryError::OutOfDomain { .. })));
        assert!(lens.points().is_err());
        assert!(lens.zone_sags().is_err());
    }

    #[test]
    fn display_settings() {
        let mut lens = KattProfile::new("lens2", LensParams::default());
        assert_eq!(lens.color(), "#ff6b6b");
        assert!(!lens.draw_band_labels());
        assert!(lens.draw_sag_labels());
        lens.set_color("#00ff00");
        lens.set_draw_band_labels(true);
        assert_eq!(lens.color(), "#00ff00");
        assert!(lens.draw_band_labels());
    }

    #[test]
    fn reference_line_labels() {
        let lines = scenario().reference_lines();
        let labels: Vec<_> = lines.iter().map(|l| l.label.as_ref()).collect();
        assert_eq!(labels, ["BOZD", "T1", "T2", "Ref Point"]);
    }
}
