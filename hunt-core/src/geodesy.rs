use hunt_types::Coordinate;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

const COMPASS_LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Great-circle distance between two coordinates using the haversine formula.
/// Inputs are expected to be validated already.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

/// Initial compass bearing from `from` to `to`, in degrees within [0, 360).
pub fn bearing_degrees(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let x = delta_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let bearing = x.atan2(y).to_degrees().rem_euclid(360.0);
    // rem_euclid can land on 360.0 for tiny negative inputs
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// Eight-point compass label for a bearing.
pub fn compass_direction(bearing: f64) -> &'static str {
    let index = (bearing.rem_euclid(360.0) / 45.0).round() as usize % COMPASS_LABELS.len();
    COMPASS_LABELS[index]
}

/// Human readable distance: whole meters below 1km, otherwise km to one decimal.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// Point reached by travelling `meters` along a great circle from `from`
/// on the given initial bearing.
pub fn destination_point(from: &Coordinate, bearing: f64, meters: f64) -> Coordinate {
    let angular = meters / EARTH_RADIUS_METERS;
    let theta = bearing.to_radians();
    let lat1 = from.latitude.to_radians();
    let lon1 = from.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinate {
        latitude: lat2.to_degrees(),
        longitude: (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0,
    }
}
