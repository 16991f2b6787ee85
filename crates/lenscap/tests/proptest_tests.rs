//! Property-based tests for cap validation and profile construction.

use proptest::prelude::*;

use lenscap::{cap_path, cap_profile, CapError, CapParams, FilletRadii, LensCap};
use lenscap_kernel_math::{Point2, Tolerance};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// A fraction of some limit, kept clear of both ends.
fn arb_fraction() -> impl Strategy<Value = f64> {
    0.05f64..0.95
}

/// How far past a limit a value is pushed (1.0 sits exactly on it).
fn arb_overshoot() -> impl Strategy<Value = f64> {
    1.0f64..1.9
}

/// Parameters inside every limit: each fillet is a fraction of its bound,
/// and the height leaves room for both walls.
fn arb_valid_params() -> impl Strategy<Value = CapParams> {
    (
        12.0f64..200.0,
        0.5f64..5.0,
        0.5f64..5.0,
        0.1f64..40.0,
        (arb_fraction(), arb_fraction()),
        (arb_fraction(), arb_fraction()),
    )
        .prop_map(
            |(inner_diameter, wall, bottom, extra, (k_in, k_out), (rim_share, rim_split))| {
                let rim = rim_share * wall;
                CapParams::new(inner_diameter, wall, bottom + 2.0 * wall + extra)
                    .with_bottom(bottom)
                    .with_fillets(FilletRadii {
                        inner_bottom: k_in * bottom.min(wall),
                        outer_bottom: k_out * wall,
                        outer_rim: rim * rim_split,
                        inner_rim: rim * (1.0 - rim_split),
                    })
            },
        )
}

/// Wall and floor thickness for the limit tests.
fn arb_wall_and_bottom() -> impl Strategy<Value = (f64, f64)> {
    (0.5f64..5.0, 0.5f64..5.0)
}

/// A cap tall and wide enough that only the fillet limits can fail.
fn roomy_cap(wall: f64, bottom: f64, fillets: FilletRadii) -> CapParams {
    CapParams::new(100.0, wall, bottom + 4.0 * wall + 10.0)
        .with_bottom(bottom)
        .with_fillets(fillets)
}

/// Fillets well inside their limits.
fn safe_fillets(wall: f64, bottom: f64) -> FilletRadii {
    FilletRadii {
        inner_bottom: 0.5 * bottom.min(wall),
        outer_bottom: 0.5 * wall,
        outer_rim: 0.3 * wall,
        inner_rim: 0.3 * wall,
    }
}

// ---------------------------------------------------------------------------
// 1. Valid parameters produce a closed, tangent-continuous profile
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn valid_params_build_closed_profile(params in arb_valid_params()) {
        prop_assert!(params.validate().is_ok(), "{:?}", params.validate());

        let path = cap_path(&params).unwrap();
        prop_assert!(path.is_closed());
        prop_assert_eq!(path.len(), 11);

        let profile = cap_profile(&params);
        prop_assert!(profile.is_ok(), "{:?}", profile.err());
        let profile = profile.unwrap();
        prop_assert_eq!(profile.len(), 10);
        let last = profile.segments.last().unwrap();
        prop_assert_eq!(last.end(), Point2::origin());
        prop_assert!(profile.check_tangency(&Tolerance::TANGENCY).is_ok());

        let walls = params.outer_radius() - params.inner_radius();
        prop_assert!((walls - params.wall).abs() <= 1e-12 * params.outer_radius());
    }
}

// ---------------------------------------------------------------------------
// 2. Valid parameters also revolve into the full nine-face solid
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn valid_params_build_solid(params in arb_valid_params()) {
        let cap = LensCap::new(params);
        prop_assert!(cap.is_ok(), "{:?}", cap.err());
        let cap = cap.unwrap();
        prop_assert_eq!(cap.solid().faces.len(), 9);
        prop_assert!(cap.volume() > 0.0);
    }
}

// ---------------------------------------------------------------------------
// 3. OR − IR == wall exactly for binary-representable dimensions
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn wall_is_exact_on_binary_grid(id_units in 64u32..25_600, wall_units in 1u32..640) {
        let params = CapParams::new(
            f64::from(id_units) / 64.0,
            f64::from(wall_units) / 64.0,
            20.0,
        );
        prop_assert_eq!(params.outer_radius() - params.inner_radius(), params.wall);
    }
}

// ---------------------------------------------------------------------------
// 4. Each fillet limit, pushed alone, fails with its own error
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn inner_bottom_fillet_over_limit(
        (wall, bottom) in arb_wall_and_bottom(),
        over in arb_overshoot(),
    ) {
        let fillets = FilletRadii {
            inner_bottom: over * bottom.min(wall),
            ..safe_fillets(wall, bottom)
        };
        let params = roomy_cap(wall, bottom, fillets);
        prop_assert!(matches!(
            params.validate(),
            Err(CapError::InnerBottomFillet { .. })
        ), "expected Err(CapError::InnerBottomFillet)");
        prop_assert!(cap_path(&params).is_err());
    }

    #[test]
    fn outer_bottom_fillet_over_limit(
        (wall, bottom) in arb_wall_and_bottom(),
        over in arb_overshoot(),
    ) {
        let fillets = FilletRadii {
            outer_bottom: over * wall,
            ..safe_fillets(wall, bottom)
        };
        let params = roomy_cap(wall, bottom, fillets);
        prop_assert!(matches!(
            params.validate(),
            Err(CapError::OuterBottomFillet { .. })
        ), "expected Err(CapError::OuterBottomFillet)");
        prop_assert!(cap_path(&params).is_err());
    }

    #[test]
    fn outer_rim_fillet_over_limit(
        (wall, bottom) in arb_wall_and_bottom(),
        over in arb_overshoot(),
    ) {
        let fillets = FilletRadii {
            outer_rim: over * wall,
            ..safe_fillets(wall, bottom)
        };
        let params = roomy_cap(wall, bottom, fillets);
        prop_assert!(matches!(
            params.validate(),
            Err(CapError::OuterRimFillet { .. })
        ), "expected Err(CapError::OuterRimFillet)");
        prop_assert!(cap_path(&params).is_err());
    }

    #[test]
    fn inner_rim_fillet_over_limit(
        (wall, bottom) in arb_wall_and_bottom(),
        over in arb_overshoot(),
    ) {
        let fillets = FilletRadii {
            inner_rim: over * wall,
            ..safe_fillets(wall, bottom)
        };
        let params = roomy_cap(wall, bottom, fillets);
        prop_assert!(matches!(
            params.validate(),
            Err(CapError::InnerRimFillet { .. })
        ), "expected Err(CapError::InnerRimFillet)");
        prop_assert!(cap_path(&params).is_err());
    }

    #[test]
    fn rim_fillets_overlapping(
        (wall, bottom) in arb_wall_and_bottom(),
        share in 0.1f64..0.9,
        excess in 0.0f64..0.9,
    ) {
        // Each rim fillet stays under the wall; only their sum reaches it.
        let outer_rim = share * wall;
        let fillets = FilletRadii {
            outer_rim,
            inner_rim: wall - outer_rim + excess * outer_rim,
            ..safe_fillets(wall, bottom)
        };
        let params = roomy_cap(wall, bottom, fillets);
        prop_assert!(matches!(
            params.validate(),
            Err(CapError::RimFilletsOverlap { .. })
        ), "expected Err(CapError::RimFilletsOverlap)");
        prop_assert!(cap_path(&params).is_err());
    }
}

// ---------------------------------------------------------------------------
// 5. Rim fillets just short of the wall still leave a usable top face
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn near_limit_rim_fillets_validate_or_build(
        (wall, bottom) in arb_wall_and_bottom(),
        share in 0.1f64..0.9,
        gap_exp in -9i32..-2,
    ) {
        let outer_rim = share * wall;
        let fillets = FilletRadii {
            outer_rim,
            inner_rim: wall - outer_rim - 10f64.powi(gap_exp),
            ..safe_fillets(wall, bottom)
        };
        let params = roomy_cap(wall, bottom, fillets);
        // Whatever validation accepts must resolve into a profile.
        if params.validate().is_ok() {
            let profile = cap_profile(&params);
            prop_assert!(profile.is_ok(), "{:?}", profile.err());
        } else {
            prop_assert!(matches!(
                params.validate(),
                Err(CapError::RimFilletsOverlap { .. })
            ), "expected Err(CapError::RimFilletsOverlap)");
        }
    }
}
