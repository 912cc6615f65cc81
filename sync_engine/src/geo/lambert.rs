//! Lambert conformal conic (2SP) on the GRS80 ellipsoid, with the fixed
//! Lambert-93 parameters (EPSG:2154). Datum shift to WGS84 is zero.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::LazyLock;

const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const INVERSE_FLATTENING: f64 = 298.257_222_101;

const STANDARD_PARALLEL_1: f64 = 49.0;
const STANDARD_PARALLEL_2: f64 = 44.0;
const ORIGIN_LATITUDE: f64 = 46.5;
const ORIGIN_LONGITUDE: f64 = 3.0;
const FALSE_EASTING: f64 = 700_000.0;
const FALSE_NORTHING: f64 = 6_600_000.0;

const LATITUDE_TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 20;

struct ConicParams {
    e: f64,
    n: f64,
    /// `a * F`, the scaled cone constant.
    a_f: f64,
    r0: f64,
    lambda0: f64,
}

static LAMBERT93: LazyLock<ConicParams> = LazyLock::new(|| {
    let f = 1.0 / INVERSE_FLATTENING;
    let e = (2.0 * f - f * f).sqrt();

    let phi1 = STANDARD_PARALLEL_1.to_radians();
    let phi2 = STANDARD_PARALLEL_2.to_radians();
    let phi0 = ORIGIN_LATITUDE.to_radians();

    let m1 = m(phi1, e);
    let m2 = m(phi2, e);
    let t1 = t(phi1, e);
    let t2 = t(phi2, e);
    let t0 = t(phi0, e);

    let n = (m1.ln() - m2.ln()) / (t1.ln() - t2.ln());
    let a_f = SEMI_MAJOR_AXIS * m1 / (n * t1.powf(n));
    let r0 = a_f * t0.powf(n);

    ConicParams {
        e,
        n,
        a_f,
        r0,
        lambda0: ORIGIN_LONGITUDE.to_radians(),
    }
});

fn m(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    phi.cos() / (1.0 - es * es).sqrt()
}

fn t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

/// Projects WGS84 degrees to Lambert-93 `(easting, northing)` meters.
pub fn project_lambert93(latitude: f64, longitude: f64) -> (f64, f64) {
    let p = &*LAMBERT93;
    let phi = latitude.to_radians();
    let r = p.a_f * t(phi, p.e).powf(p.n);
    let theta = p.n * (longitude.to_radians() - p.lambda0);

    (
        FALSE_EASTING + r * theta.sin(),
        FALSE_NORTHING + p.r0 - r * theta.cos(),
    )
}

/// Inverts Lambert-93 `(easting, northing)` meters to WGS84
/// `(latitude, longitude)` degrees. The result is not range-checked.
pub fn unproject_lambert93(easting: f64, northing: f64) -> (f64, f64) {
    let p = &*LAMBERT93;
    let dx = easting - FALSE_EASTING;
    let dy = p.r0 - (northing - FALSE_NORTHING);

    let r = p.n.signum() * dx.hypot(dy);
    let theta = (p.n.signum() * dx).atan2(p.n.signum() * dy);
    let t_prime = (r / p.a_f).powf(1.0 / p.n);

    let lambda = theta / p.n + p.lambda0;

    let half_e = p.e / 2.0;
    let mut phi = FRAC_PI_2 - 2.0 * t_prime.atan();
    for _ in 0..MAX_ITERATIONS {
        let es = p.e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (t_prime * ((1.0 - es) / (1.0 + es)).powf(half_e)).atan();
        let converged = (next - phi).abs() < LATITUDE_TOLERANCE;
        phi = next;
        if converged {
            break;
        }
    }

    (phi.to_degrees(), lambda.to_degrees())
}
