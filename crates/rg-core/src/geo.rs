//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Merge and duplicate thresholds
//! are a few metres, well below what single precision can resolve reliably
//! once coordinates are averaged many times.
//!
//! Two distance functions are provided:
//!
//! | Function                         | Cost | Use                                     |
//! |----------------------------------|------|-----------------------------------------|
//! | [`GeoPoint::distance_m`]         | 1×   | edge weights, speed checks              |
//! | [`GeoPoint::approx_distance_m`]  | ~⅓   | radius / neighbour query refinement     |

/// Mean Earth radius, metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres spanned by one degree of latitude on the mean-radius sphere.
pub const METRES_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Equirectangular approximation in metres.
    ///
    /// Within 0.5 % of [`distance_m`](Self::distance_m) below 10 km and about
    /// three times cheaper.  Only for comparisons against small thresholds.
    #[inline]
    pub fn approx_distance_m(self, other: GeoPoint) -> f64 {
        let mean_lat = ((self.lat + other.lat) * 0.5).to_radians();
        let x = (other.lon - self.lon).to_radians() * mean_lat.cos();
        let y = (other.lat - self.lat).to_radians();
        (x * x + y * y).sqrt() * EARTH_RADIUS_M
    }

    /// Initial (forward) bearing towards `other`, degrees in `[0, 360)`.
    pub fn bearing_deg(self, other: GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let y = d_lambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

        (y.atan2(x).to_degrees() + 360.0) % 360.0
    }

    /// Arithmetic midpoint in lat/lon space.  Exact enough for the short
    /// spans (≤ a few hundred metres) the graph works with.
    #[inline]
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        GeoPoint::new((self.lat + other.lat) * 0.5, (self.lon + other.lon) * 0.5)
    }

    /// The point `north_m` metres north and `east_m` metres east of `self`
    /// (flat-earth offset, fine for synthetic data and small displacements).
    pub fn offset_m(self, north_m: f64, east_m: f64) -> GeoPoint {
        let lat = self.lat + north_m / METRES_PER_DEGREE;
        let lon = self.lon + east_m / (METRES_PER_DEGREE * self.lat.to_radians().cos());
        GeoPoint::new(lat, lon)
    }

    /// Rectangle in `[lat, lon]` degree space that contains every point
    /// within `radius_m` of `self`.
    ///
    /// This is the pre-filter half of every two-phase spatial query; the box
    /// is deliberately generous (longitude span taken at the poleward edge)
    /// and callers must still refine by true distance.
    pub fn degree_envelope(self, radius_m: f64) -> ([f64; 2], [f64; 2]) {
        let d_lat = radius_m / METRES_PER_DEGREE;
        let poleward = (self.lat.abs() + d_lat).min(90.0).to_radians();
        let d_lon = (radius_m / (METRES_PER_DEGREE * poleward.cos().max(1e-9))).min(360.0);
        (
            [self.lat - d_lat, self.lon - d_lon],
            [self.lat + d_lat, self.lon + d_lon],
        )
    }

    /// `true` for coordinates inside the valid WGS-84 range.
    #[inline]
    pub fn in_valid_range(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// `true` near (0, 0), the "null island" sentinel emitted by GPS units
    /// without a fix.
    #[inline]
    pub fn is_null_island(self) -> bool {
        self.lat.abs() < 0.001 && self.lon.abs() < 0.001
    }

    /// `[lat, lon]` array form used as the R-tree key.
    #[inline]
    pub fn as_array(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Smallest angle between two bearings, degrees in `[0, 180]`.
pub fn angular_difference(b1: f64, b2: f64) -> f64 {
    let diff = (b1 - b2).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned operating region in degrees (inclusive bounds).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self { min_lat, max_lat, min_lon, max_lon }
    }

    /// The whole globe.  Disables bounding-box filtering.
    pub fn world() -> Self {
        Self::new(-90.0, 90.0, -180.0, 180.0)
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lon >= self.min_lon
            && p.lon <= self.max_lon
    }
}
