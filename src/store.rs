// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisting lens parameters between sessions.
//!
//! Parameters are stored one field per key, as text, under keys of the form
//! `"{lens}-{field}"`. A missing or garbled field never stops a lens from
//! loading; it just falls back to its default.
//!
//! A multi-curve lens stores its toricity under `"multiCurve-{lens}"` and
//! each band, in its text form, under `"{lens}-rgpBandData-{index}"`.

use std::collections::BTreeMap;

use crate::{
    BandSpec, HalfChordPresets, LensKey, LensParams, MultiCurveProfile, ProfileConfig, Toricity,
};

/// A string key-value store that parameters are saved to.
pub trait ParamStore {
    /// The value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Delete the value stored under `key`, if any.
    fn remove(&mut self, key: &str);
}

impl<T: ParamStore + ?Sized> ParamStore for &mut T {
    #[inline]
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    #[inline]
    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    #[inline]
    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

/// A [`ParamStore`] held in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// An empty store.
    #[inline]
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// The number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ParamStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// The stored name of each parameter field.
pub mod fields {
    /// Base curve radius.
    pub const BASE_CURVE: &str = "baseCurve";
    /// Eccentricity.
    pub const ECCENTRICITY: &str = "eValue";
    /// First tangent angle.
    pub const T1: &str = "t1";
    /// Second tangent angle.
    pub const T2: &str = "t2";
    /// Landing zone code.
    pub const SLZ: &str = "slz";
    /// Overall diameter.
    pub const DIAMETER: &str = "lensDiameter";
}

fn field_key(lens: &LensKey, field: &str) -> String {
    format!("{lens}-{field}")
}

fn read_number(store: &impl ParamStore, key: &str) -> Option<f64> {
    let raw = store.get(key)?;
    match raw.trim().parse::<f64>() {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::debug!(key, %raw, %error, "ignoring unreadable stored value");
            None
        }
    }
}

impl LensParams {
    /// Load the parameters saved for `lens`.
    ///
    /// Each field is read on its own. A field that is absent or does not
    /// parse as a number keeps its default; a field that does is clamped as
    /// if it had been typed in.
    pub fn load(store: &impl ParamStore, lens: &LensKey) -> LensParams {
        let read = |field| read_number(store, &field_key(lens, field));
        let mut params = LensParams::default();
        if let Some(v) = read(fields::BASE_CURVE) {
            params = params.with_base_curve(v);
        }
        if let Some(v) = read(fields::ECCENTRICITY) {
            params = params.with_eccentricity(v);
        }
        if let Some(v) = read(fields::T1) {
            params = params.with_t1(v);
        }
        if let Some(v) = read(fields::T2) {
            params = params.with_t2(v);
        }
        if let Some(v) = read(fields::SLZ) {
            params = params.with_slz(v);
        }
        if let Some(v) = read(fields::DIAMETER) {
            params = params.with_diameter(v);
        }
        tracing::debug!(%lens, summary = %params.summary(), "loaded lens parameters");
        params
    }

    /// Save every field for `lens`.
    pub fn save(&self, store: &mut impl ParamStore, lens: &LensKey) {
        let mut write = |field, value: String| store.set(&field_key(lens, field), &value);
        write(fields::BASE_CURVE, self.base_curve().to_string());
        write(fields::ECCENTRICITY, self.eccentricity().to_string());
        write(fields::T1, self.t1().to_string());
        write(fields::T2, self.t2().to_string());
        write(fields::SLZ, self.slz().get().to_string());
        write(fields::DIAMETER, self.diameter().to_string());
    }
}

#[cfg(feature = "serde")]
impl LensParams {
    /// The parameters as a JSON object, with the same field names as the
    /// key-value store.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::StoreError) if serialization fails.
    pub fn to_json(&self) -> Result<String, crate::StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parameters from a JSON object. Missing fields take their defaults,
    /// and every value is clamped.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::StoreError) if `json` is not an
    /// object of numbers.
    pub fn from_json(json: &str) -> Result<LensParams, crate::StoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn half_chord_key(index: usize) -> String {
    format!("kattHalfChord{index}")
}

impl HalfChordPresets {
    /// Load the presets, keeping the default for any row not stored.
    pub fn load(store: &impl ParamStore) -> HalfChordPresets {
        let mut presets = HalfChordPresets::default();
        for index in 0..presets.0.len() {
            if let Some(y) = read_number(store, &half_chord_key(index)) {
                presets.set(index, y);
            }
        }
        presets
    }

    /// Save every row.
    pub fn save(&self, store: &mut impl ParamStore) {
        for (index, y) in self.0.iter().enumerate() {
            store.set(&half_chord_key(index), &y.to_string());
        }
    }
}

fn multi_curve_key(lens: &LensKey) -> String {
    format!("multiCurve-{lens}")
}

fn band_key(lens: &LensKey, index: usize) -> String {
    format!("{lens}-rgpBandData-{index}")
}

impl MultiCurveProfile {
    /// Load the lens saved under `lens`.
    ///
    /// With nothing saved this is [`MultiCurveProfile::new`]. Otherwise a
    /// toricity that does not parse reads as spherical, and each band that
    /// does not parse is replaced by the default band in its position, or
    /// dropped past the default bands. A lens left with too few bands is
    /// filled out from the defaults.
    pub fn load(store: &impl ParamStore, lens: impl Into<LensKey>) -> MultiCurveProfile {
        let lens = lens.into();
        let defaults = MultiCurveProfile::new(lens.clone());
        let Some(raw) = store.get(&multi_curve_key(&lens)) else {
            return defaults;
        };
        let toricity = raw.parse().unwrap_or_else(|error| {
            tracing::debug!(%lens, %raw, %error, "ignoring unreadable stored toricity");
            Toricity::Spherical
        });
        let mut bands: Vec<BandSpec> = Vec::new();
        let stored = (0..).map_while(|index| store.get(&band_key(&lens, index)));
        for (index, text) in stored.enumerate() {
            match text.parse() {
                Ok(band) => bands.push(band),
                Err(error) => {
                    tracing::debug!(%lens, index, %text, %error, "ignoring unreadable stored band");
                    bands.extend(defaults.bands().get(index).cloned());
                }
            }
        }
        let missing = defaults.bands().get(bands.len()..).unwrap_or_default();
        bands.extend_from_slice(missing);
        tracing::debug!(%lens, %toricity, bands = bands.len(), "loaded multi-curve lens");
        MultiCurveProfile::with_config(lens, toricity, bands, ProfileConfig::default())
            .unwrap_or(defaults)
    }

    /// Save the toricity and every band, and delete any bands stored for a
    /// lens with more of them.
    pub fn save(&self, store: &mut impl ParamStore) {
        let lens = self.key();
        store.set(&multi_curve_key(lens), &self.toricity().to_string());
        for (index, band) in self.bands().iter().enumerate() {
            store.set(&band_key(lens, index), &band.to_string());
        }
        let mut index = self.bands().len();
        while store.get(&band_key(lens, index)).is_some() {
            store.remove(&band_key(lens, index));
            index += 1;
        }
    }
}
