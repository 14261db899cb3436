// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lenses built from an arbitrary list of bands.
//!
//! A [`MultiCurveProfile`] is a stack of bands walked outwards from the
//! axis, each adding its own sag on top of the running total at its inner
//! edge. Joins are continuous by construction; slopes are not matched.

use core::cell::OnceCell;

use smallvec::SmallVec;

use crate::{
    diameter_correction, Band, BandSpec, GeometryError, LensKey, ProfileConfig, ReferenceLine,
    SagProfile, SagSample, Sampler, Toricity, LANDING_HALF_WIDTH, MERIDIAN_AXES,
};

/// A multi-curve lens never has fewer bands than this.
pub const MIN_BANDS: usize = 3;

/// Band positions and sags along one meridian.
#[derive(Clone, Debug)]
struct Layout {
    /// Outer radius of each band.
    ends: Vec<f64>,
    /// Total sag at the inner edge of each band, then at the edge of the lens.
    ///
    /// Once a band fails to evaluate, every entry after it carries the error.
    sags: Vec<Result<f64, GeometryError>>,
}

impl Layout {
    fn new(bands: &[BandSpec], meridian: usize) -> Layout {
        let mut ends = Vec::with_capacity(bands.len());
        let mut sags = Vec::with_capacity(bands.len() + 1);
        let mut start = 0.0;
        let mut sag = Ok(0.0);
        for spec in bands {
            let band = spec.get(meridian);
            let end = start + band.width();
            sags.push(sag);
            sag = sag.and_then(|s| band.sag_across(start, end).map(|rise| s + rise));
            ends.push(end);
            start = end;
        }
        sags.push(sag);
        Layout { ends, sags }
    }

    fn semi_diameter(&self) -> f64 {
        self.ends.last().copied().unwrap_or(0.0)
    }

    /// The band containing `y`, with its inner radius.
    ///
    /// Each band includes its outer edge, and zero-width bands are never
    /// found.
    fn band_at(&self, y: f64) -> Option<(usize, f64)> {
        if y.is_nan() || y <= 0.0 {
            return None;
        }
        let index = self.ends.iter().position(|&end| y <= end)?;
        let start = index.checked_sub(1).map_or(0.0, |i| self.ends[i]);
        Some((index, start))
    }
}

#[derive(Clone, Debug, Default)]
struct Cache {
    layouts: OnceCell<SmallVec<[Layout; 4]>>,
    points: OnceCell<Result<SmallVec<[Vec<SagSample>; 4]>, GeometryError>>,
}

impl Cache {
    fn invalidate(&mut self) {
        self.layouts.take();
        self.points.take();
    }
}

/// A lens made of any number of asphere and tangent bands, specified
/// separately in each meridian.
///
/// Like [`KattProfile`](crate::KattProfile), derived values are cached and
/// every mutation clears them.
///
/// # Examples
///
/// ```
/// use sagitta::{Band, BandSpec, MultiCurveProfile, SagProfile, Toricity};
///
/// let mut lens = MultiCurveProfile::new("lens1");
/// assert_eq!(lens.diameter(), 10.0);
/// lens.add_band(BandSpec::uniform(Band::Tangent { angle: 40.0, width: 0.5 }));
/// assert_eq!(lens.diameter(), 11.0);
///
/// lens.set_toricity(Toricity::Toric);
/// let steep = lens.meridian(1).unwrap();
/// assert_eq!(steep.axis(), 90);
/// assert!(steep.sag_at(4.0).unwrap() > 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct MultiCurveProfile {
    key: LensKey,
    toricity: Toricity,
    bands: Vec<BandSpec>,
    config: ProfileConfig,
    reference_inset: f64,
    color: String,
    draw_band_labels: bool,
    draw_sag_labels: bool,
    cache: Cache,
}

impl MultiCurveProfile {
    /// A toric lens with the default three bands: a back optic zone 8 mm
    /// across, then two flatter 0.5 mm curves. Each band is 0.5 mm steeper
    /// at 90° and 270° than at 0° and 180°.
    pub fn new(key: impl Into<LensKey>) -> MultiCurveProfile {
        let bands = vec![
            BandSpec::toric(Band::sphere(7.7, 4.0), Band::sphere(7.2, 4.0)),
            BandSpec::toric(Band::sphere(8.5, 0.5), Band::sphere(8.0, 0.5)),
            BandSpec::toric(Band::sphere(8.9, 0.5), Band::sphere(8.4, 0.5)),
        ];
        MultiCurveProfile::build(key.into(), Toricity::Toric, bands, ProfileConfig::default())
    }

    /// A lens with the given bands and the default configuration.
    ///
    /// Returns `None` if there are fewer than [`MIN_BANDS`] bands.
    pub fn with_bands(
        key: impl Into<LensKey>,
        toricity: Toricity,
        bands: Vec<BandSpec>,
    ) -> Option<MultiCurveProfile> {
        MultiCurveProfile::with_config(key, toricity, bands, ProfileConfig::default())
    }

    /// A lens with the given bands.
    ///
    /// Each band is given as many meridians as `toricity` calls for; see
    /// [`BandSpec::get`]. Returns `None` if there are fewer than
    /// [`MIN_BANDS`] bands.
    pub fn with_config(
        key: impl Into<LensKey>,
        toricity: Toricity,
        mut bands: Vec<BandSpec>,
        config: ProfileConfig,
    ) -> Option<MultiCurveProfile> {
        if bands.len() < MIN_BANDS {
            return None;
        }
        for band in &mut bands {
            band.conform(toricity.meridian_count(), false);
        }
        Some(MultiCurveProfile::build(key.into(), toricity, bands, config))
    }

    fn build(
        key: LensKey,
        toricity: Toricity,
        bands: Vec<BandSpec>,
        config: ProfileConfig,
    ) -> MultiCurveProfile {
        MultiCurveProfile {
            color: key.default_color().to_owned(),
            key,
            toricity,
            bands,
            config: config.validated(),
            reference_inset: LANDING_HALF_WIDTH,
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

    /// How many meridians the lens is specified in.
    #[inline]
    pub fn toricity(&self) -> Toricity {
        self.toricity
    }

    /// The bands, innermost first.
    #[inline]
    pub fn bands(&self) -> &[BandSpec] {
        &self.bands
    }

    /// The current configuration.
    #[inline]
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Distance from the edge of the lens in to the reference point, in mm.
    #[inline]
    pub fn reference_inset(&self) -> f64 {
        self.reference_inset
    }

    // Mutation. Everything here clears the caches.

    /// Append a band at the edge of the lens.
    pub fn add_band(&mut self, mut band: BandSpec) {
        band.conform(self.toricity.meridian_count(), false);
        self.bands.push(band);
        self.cache.invalidate();
    }

    /// Replace the band at `index`, returning the old one.
    ///
    /// Returns `None` and changes nothing if there is no such band.
    pub fn replace_band(&mut self, index: usize, mut band: BandSpec) -> Option<BandSpec> {
        let slot = self.bands.get_mut(index)?;
        band.conform(self.toricity.meridian_count(), false);
        let old = core::mem::replace(slot, band);
        self.cache.invalidate();
        Some(old)
    }

    /// Remove the outermost band.
    ///
    /// Returns `None` and changes nothing if the lens is already down to
    /// [`MIN_BANDS`].
    pub fn remove_last_band(&mut self) -> Option<BandSpec> {
        if self.bands.len() <= MIN_BANDS {
            tracing::debug!(key = %self.key, "not removing band below the minimum");
            return None;
        }
        let band = self.bands.pop();
        self.cache.invalidate();
        band
    }

    /// Change the toricity.
    ///
    /// Every band is re-seeded from its first meridian, so a lens made
    /// toric starts out the same in every meridian.
    pub fn set_toricity(&mut self, toricity: Toricity) {
        self.toricity = toricity;
        for band in &mut self.bands {
            band.conform(toricity.meridian_count(), true);
        }
        self.cache.invalidate();
    }

    /// Set the distance from the edge in to the reference point.
    ///
    /// An inset that is negative or not finite falls back to
    /// [`LANDING_HALF_WIDTH`]. One wider than the lens puts the reference
    /// point on the axis.
    pub fn set_reference_inset(&mut self, inset: f64) {
        self.reference_inset = if inset.is_finite() && inset >= 0.0 {
            inset
        } else {
            tracing::debug!(key = %self.key, inset, "invalid reference inset, using default");
            LANDING_HALF_WIDTH
        };
        self.cache.invalidate();
    }

    /// Set the sample step. Only the point clouds depend on it.
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

    // Display settings.

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

    fn layouts(&self) -> &[Layout] {
        self.cache.layouts.get_or_init(|| {
            let layouts: SmallVec<[Layout; 4]> = (0..self.toricity.meridian_count())
                .map(|m| Layout::new(&self.bands, m))
                .collect();
            tracing::debug!(
                key = %self.key,
                bands = self.bands.len(),
                meridians = layouts.len(),
                "computed band layout"
            );
            layouts
        })
    }

    /// A view of one meridian, which can be sampled and compared like any
    /// other profile.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NoSuchMeridian`] if the lens has no meridian
    /// `index`.
    pub fn meridian(&self, index: usize) -> Result<Meridian<'_>, GeometryError> {
        let count = self.toricity.meridian_count();
        if index < count {
            Ok(Meridian { lens: self, index })
        } else {
            Err(GeometryError::NoSuchMeridian { index, count })
        }
    }

    /// Every meridian, in axis order.
    pub fn meridians(&self) -> impl Iterator<Item = Meridian<'_>> + '_ {
        (0..self.toricity.meridian_count()).map(move |index| Meridian { lens: self, index })
    }

    /// The sag of `meridian` at radius `y`, in mm.
    ///
    /// # Errors
    ///
    /// Fails if there is no such meridian, or if the band containing `y`
    /// (or one inside it) cannot be evaluated.
    pub fn sag_at(&self, meridian: usize, y: f64) -> Result<f64, GeometryError> {
        self.meridian(meridian)?.sag_at(y)
    }

    /// The overall diameter of the first meridian, in mm.
    pub fn diameter(&self) -> f64 {
        2.0 * self.layouts().first().map_or(0.0, Layout::semi_diameter)
    }

    /// The diameter of the innermost band of the first meridian, in mm.
    pub fn back_optic_zone_diameter(&self) -> f64 {
        self.bands.first().map_or(0.0, |b| 2.0 * b.get(0).width())
    }

    /// The sampled profile of each meridian, normalized to its reference
    /// point.
    ///
    /// # Errors
    ///
    /// Fails if any meridian cannot be sampled.
    pub fn points(&self) -> Result<&[Vec<SagSample>], GeometryError> {
        self.cache
            .points
            .get_or_init(|| {
                let sampler = Sampler::new(self.config.step);
                self.meridians().map(|m| sampler.sample(m)).collect()
            })
            .as_deref()
            .map_err(|e| *e)
    }

    /// Lines marking each band junction of `meridian`, and its reference
    /// point.
    ///
    /// The innermost junction is labelled `BOZD`; the others are numbered
    /// by the band they start, counting the back optic zone as band 1.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NoSuchMeridian`] if there is no such meridian.
    pub fn band_reference_lines(
        &self,
        meridian: usize,
    ) -> Result<Vec<ReferenceLine>, GeometryError> {
        let view = self.meridian(meridian)?;
        let layout = view.layout();
        let junctions = layout.ends.len().saturating_sub(1);
        let mut lines: Vec<_> = layout.ends[..junctions]
            .iter()
            .enumerate()
            .map(|(i, &radius)| match i {
                0 => ReferenceLine::new(radius, "BOZD"),
                _ => ReferenceLine::new(radius, format!("B{}", i + 2)),
            })
            .collect();
        lines.push(ReferenceLine::new(view.reference_radius(), "Ref Point"));
        Ok(lines)
    }
}

/// One meridian of a [`MultiCurveProfile`].
#[derive(Clone, Copy, Debug)]
pub struct Meridian<'a> {
    lens: &'a MultiCurveProfile,
    index: usize,
}

impl<'a> Meridian<'a> {
    fn layout(&self) -> &'a Layout {
        &self.lens.layouts()[self.index]
    }

    /// The position of the meridian among the lens's meridians.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The eye axis of the meridian, in degrees.
    #[inline]
    pub fn axis(&self) -> u16 {
        MERIDIAN_AXES[self.index]
    }

    /// The radius at which the reference point sits.
    pub fn reference_radius(&self) -> f64 {
        (self.semi_diameter() - self.lens.reference_inset).max(0.0)
    }

    /// The total sag at the reference point, in mm.
    ///
    /// # Errors
    ///
    /// Fails if a band inside the reference point cannot be evaluated.
    pub fn reference_sag(&self) -> Result<f64, GeometryError> {
        self.sag_at(self.reference_radius())
    }

    /// The total sag at the edge of the lens, in mm.
    ///
    /// # Errors
    ///
    /// Fails if any band cannot be evaluated.
    pub fn total_sag(&self) -> Result<f64, GeometryError> {
        self.layout().sags.last().copied().unwrap_or(Ok(0.0))
    }
}

impl SagProfile for Meridian<'_> {
    fn sag_at(&self, y: f64) -> Result<f64, GeometryError> {
        let layout = self.layout();
        let Some((index, start)) = layout.band_at(y) else {
            return Ok(0.0);
        };
        let band = self.lens.bands[index].get(self.index);
        Ok(layout.sags[index]? + band.sag_across(start, y)?)
    }

    #[inline]
    fn semi_diameter(&self) -> f64 {
        self.layout().semi_diameter()
    }

    fn reference_offset(&self) -> Result<f64, GeometryError> {
        Ok(self.reference_sag()? - diameter_correction(2.0 * self.semi_diameter())?)
    }
}
