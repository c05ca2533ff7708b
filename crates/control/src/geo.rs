//! Projection seam between geodetic and course-local coordinates.

/// Converts between geodetic positions and the flat metric frame routes are
/// expressed in.
///
/// The station core never computes projections itself; a concrete
/// implementation (UTM or a site-calibrated local tangent plane) is supplied
/// by the embedding application.
pub trait GeoProjector: Send + Sync {
    /// Project latitude/longitude (degrees) into local metres.
    fn to_local(&self, lat: f64, lon: f64) -> (f64, f64);

    /// Invert the projection back to latitude/longitude in degrees.
    fn to_lat_lon(&self, x: f64, y: f64) -> (f64, f64);
}
