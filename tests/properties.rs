// Copyright 2024 the Sagitta Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the profile invariants.

use proptest::prelude::*;

use sagitta::{
    compare_sag_at, conic_sag, Band, BandSpec, KattProfile, LandingCurve, LandingShape,
    LensParams, MultiCurveProfile, SagProfile, Sampler, Toricity, Zone, LANDING_HALF_WIDTH,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Parameters whose back optic zone always reaches its 5 mm edge.
fn arb_params() -> impl Strategy<Value = LensParams> {
    (5.5f64..15.0, 0.0f64..2.0, 20.0f64..80.0, 20.0f64..80.0, 0u8..=5, 0u8..=4).prop_map(
        |(bc, e, t1, t2, slz, d)| {
            LensParams::new(bc, e, t1, t2, f64::from(slz), 16.5 + 0.5 * f64::from(d))
        },
    )
}

/// A band narrow enough that five of them stay within reach of any asphere.
fn arb_band() -> impl Strategy<Value = Band> {
    prop_oneof![
        (6.0f64..12.0, 0.0f64..1.0, 0.1f64..1.0).prop_map(|(radius, eccentricity, width)| {
            Band::Asphere {
                radius,
                eccentricity,
                width,
            }
        }),
        (20.0f64..80.0, 0.1f64..1.0).prop_map(|(angle, width)| Band::Tangent { angle, width }),
    ]
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Conic sections
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn circle_reduction(r in 4.0f64..15.0, frac in 0.0f64..=1.0) {
        let y = r * frac;
        let expected = y * y / (r + (r * r - y * y).sqrt());
        let sag = conic_sag(r, 0.0, y).unwrap();
        prop_assert!((sag - expected).abs() < TOL, "sag={} expected={}", sag, expected);
    }

    #[test]
    fn conic_monotonic(r in 4.0f64..15.0, e in 0.0f64..2.0, a in 0.0f64..1.0, b in 0.0f64..1.0) {
        // Stay inside the reach of a sphere, which every conic here exceeds.
        let (y0, y1) = (r * a.min(b), r * a.max(b));
        let s0 = conic_sag(r, e, y0).unwrap();
        let s1 = conic_sag(r, e, y1).unwrap();
        prop_assert!(s0 <= s1, "sag({})={} > sag({})={}", y0, s0, y1, s1);
    }
}

// ---------------------------------------------------------------------------
// Landing zone
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn landing_endpoints(a in 0.01f64..1.0, width in 0.1f64..2.0, target in 0.1f64..1.5) {
        let curve = LandingCurve::new(width, target, LandingShape(a));
        prop_assert!(curve.eval(0.0).abs() < TOL);
        prop_assert!((curve.eval(width) - target).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// Four-zone profiles
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn four_zone_continuity(params in arb_params()) {
        let lens = KattProfile::new("lens1", params);
        let [boz, t1, t2, _] = lens.widths().boundaries();
        for b in [boz, t1, t2] {
            let inside = lens.sag_at(b).unwrap();
            let outside = lens.sag_at(b + 1e-12).unwrap();
            prop_assert!((inside - outside).abs() < TOL, "jump at {}: {} vs {}", b, inside, outside);
        }
    }

    #[test]
    fn reference_point_matches_table(params in arb_params()) {
        let lens = KattProfile::new("lens1", params);
        let widths = lens.widths();
        let start = widths.start_of(Zone::Landing);
        let rise = lens.sag_at(widths.reference_radius()).unwrap() - lens.sag_at(start).unwrap();
        prop_assert!((rise - params.slz().reference_sag()).abs() < TOL);
        prop_assert!((widths.reference_radius() - start - LANDING_HALF_WIDTH).abs() < TOL);
    }

    #[test]
    fn compare_with_self(params in arb_params(), frac in 0.0f64..=1.0) {
        let lens = KattProfile::new("lens1", params);
        let y = lens.semi_diameter() * frac;
        prop_assert_eq!(compare_sag_at(Some(&lens), Some(&lens), y), Ok(0));
    }

    #[test]
    fn point_cloud_covers_lens(params in arb_params()) {
        let lens = KattProfile::new("lens1", params);
        let points = lens.points().unwrap();
        prop_assert_eq!(points.len(), Sampler::default().count(lens.semi_diameter()));
        prop_assert_eq!(points[0].radius, 0.0);
        prop_assert_eq!(points[points.len() - 1].radius, lens.semi_diameter());
    }
}

// ---------------------------------------------------------------------------
// Multi-band profiles
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn multi_band_continuity(
        bands in prop::collection::vec(prop::array::uniform4(arb_band()), 3..6),
    ) {
        let specs: Vec<_> = bands.into_iter().map(BandSpec::quadrant).collect();
        let lens = MultiCurveProfile::with_bands("lens1", Toricity::Quadrant, specs).unwrap();
        for m in lens.meridians() {
            let mut end = 0.0;
            for spec in lens.bands() {
                end += spec.get(m.index()).width();
                let inside = m.sag_at(end).unwrap();
                let outside = m.sag_at(end + 1e-12).unwrap();
                if end + 1e-12 <= m.semi_diameter() {
                    prop_assert!((inside - outside).abs() < TOL);
                }
            }
        }
    }

    #[test]
    fn multi_band_reproduces_four_zone(params in arb_params()) {
        let lens = KattProfile::new("lens1", params);
        let widths = lens.widths();
        let specs = vec![
            BandSpec::uniform(Band::Asphere {
                radius: params.base_curve(),
                eccentricity: params.eccentricity(),
                width: widths.back_optic,
            }),
            BandSpec::uniform(Band::Tangent { angle: params.t1(), width: widths.t1 }),
            BandSpec::uniform(Band::Tangent { angle: params.t2(), width: widths.t2 }),
        ];
        let multi = MultiCurveProfile::with_bands("lens2", Toricity::Spherical, specs).unwrap();
        let edge = widths.start_of(Zone::Landing);
        for i in 0..=100 {
            let y = edge * f64::from(i) / 100.0;
            let a = lens.sag_at(y).unwrap();
            let b = multi.sag_at(0, y).unwrap();
            prop_assert!((a - b).abs() < TOL, "y={}: {} vs {}", y, a, b);
        }
    }
}

// ---------------------------------------------------------------------------
// Randomized sweep over raw, unclamped input
// ---------------------------------------------------------------------------

#[test]
fn random_inputs_always_draw() {
    for _ in 0..500 {
        let raw = |scale: f64, offset: f64| rand::random::<f64>() * scale + offset;
        let params = LensParams::new(
            raw(20.0, 0.0),
            raw(3.0, -0.5),
            raw(100.0, 0.0),
            raw(100.0, 0.0),
            raw(8.0, -1.0),
            raw(6.0, 14.0),
        );
        let lens = KattProfile::new("lens1", params);
        let Ok(points) = lens.points() else {
            // Only a back optic zone too steep to reach its edge may fail.
            assert!(lens.back_optic().max_semi_chord() < 5.0);
            continue;
        };
        assert!(points.iter().all(|p| p.sag.is_finite()));
        assert!(points.windows(2).all(|w| w[0].radius < w[1].radius));
    }
}
