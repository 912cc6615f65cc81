//! Tests for coordinate transformation

use super::*;

const TOLERANCE_DEG: f64 = 1e-6;

#[test]
fn test_lambert93_origin_maps_to_reference_point() {
    let pos = transform(700_000.0, 6_600_000.0, SourceCrs::Lambert93)
        .expect("projection origin is a valid position");

    assert!(
        (pos.latitude() - 46.5).abs() < TOLERANCE_DEG,
        "latitude {} should be 46.5",
        pos.latitude()
    );
    assert!(
        (pos.longitude() - 3.0).abs() < TOLERANCE_DEG,
        "longitude {} should be 3.0",
        pos.longitude()
    );
}

#[test]
fn test_forward_projection_of_origin() {
    let (x, y) = project_lambert93(46.5, 3.0);
    assert!((x - 700_000.0).abs() < 1e-6);
    assert!((y - 6_600_000.0).abs() < 1e-6);
}

#[test]
fn test_central_meridian_keeps_longitude() {
    // Moving north along the central meridian only changes latitude
    let pos = transform(700_000.0, 7_000_000.0, SourceCrs::Lambert93).unwrap();
    assert!((pos.longitude() - 3.0).abs() < TOLERANCE_DEG);
    assert!(pos.latitude() > 46.5);
}

#[test]
fn test_lille_parking_lands_near_lille() {
    // Euralille area, coarse check only
    let pos = transform(704_981.2, 7_059_564.9, SourceCrs::Lambert93).unwrap();
    assert!((pos.latitude() - 50.63).abs() < 0.1, "lat {}", pos.latitude());
    assert!((pos.longitude() - 3.07).abs() < 0.1, "lon {}", pos.longitude());
}

#[test]
fn test_wgs84_passthrough_uses_x_as_longitude() {
    let pos = transform(3.0617, 50.6366, SourceCrs::Wgs84).unwrap();
    assert_eq!(pos.latitude(), 50.6366);
    assert_eq!(pos.longitude(), 3.0617);
}

#[test]
fn test_nan_is_rejected() {
    let result = transform(f64::NAN, 50.0, SourceCrs::Wgs84);
    assert!(matches!(result, Err(CoordinateError::NonFinite { .. })));
}

#[test]
fn test_infinity_is_rejected_for_projected_input() {
    let result = transform(700_000.0, f64::INFINITY, SourceCrs::Lambert93);
    assert!(matches!(result, Err(CoordinateError::NonFinite { .. })));
}

#[test]
fn test_out_of_range_latitude_is_not_clamped() {
    let result = transform(3.0, 91.0, SourceCrs::Wgs84);
    assert_eq!(result, Err(CoordinateError::LatitudeOutOfRange(91.0)));
}

#[test]
fn test_out_of_range_longitude_is_not_clamped() {
    let result = transform(-180.5, 10.0, SourceCrs::Wgs84);
    assert_eq!(result, Err(CoordinateError::LongitudeOutOfRange(-180.5)));
}

#[test]
fn test_geographic_values_fed_as_lambert_are_still_finite() {
    // Geographic degrees mislabeled as Lambert-93 meters project far away
    // but never produce NaN.
    let result = transform(3.06, 50.63, SourceCrs::Lambert93);
    if let Ok(pos) = result {
        assert!(pos.latitude().is_finite());
        assert!(pos.longitude().is_finite());
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_lambert93_roundtrip(
            lat in 41.0..51.5_f64,
            lon in -5.5..10.0_f64,
        ) {
            let (x, y) = project_lambert93(lat, lon);
            let pos = transform(x, y, SourceCrs::Lambert93)?;

            prop_assert!(
                (pos.latitude() - lat).abs() < TOLERANCE_DEG,
                "latitude roundtrip failed: {} -> {}", lat, pos.latitude()
            );
            prop_assert!(
                (pos.longitude() - lon).abs() < TOLERANCE_DEG,
                "longitude roundtrip failed: {} -> {}", lon, pos.longitude()
            );
        }
    }
}
