//! Orders locations by great-circle distance from a reference point.

use crate::math::GeoHelper;
use crate::model::Location;
use crate::prelude::Coordinate;

/// How locations without a coordinate take part in the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCoordinates {
    /// A location without a coordinate compares equal to everything and keeps
    /// its input slot; coordinated locations are sorted among the other slots.
    #[default]
    Incomparable,
    /// Uncoordinated locations follow every coordinated one, in input order.
    Last,
}

/// Distance from `reference` to `location`, if the location has a position.
pub fn distance_km(reference: Coordinate, location: &Location) -> Option<f64> {
    location
        .coordinate
        .map(|coordinate| GeoHelper::haversine_km(reference, coordinate))
}

/// Returns a new, stably sorted ordering of `locations`, nearest first.
pub fn rank_by_proximity(reference: Coordinate, locations: &[Location]) -> Vec<Location> {
    rank_with_policy(reference, locations, MissingCoordinates::default())
}

pub fn rank_with_policy(
    reference: Coordinate,
    locations: &[Location],
    policy: MissingCoordinates,
) -> Vec<Location> {
    let mut ranked: Vec<(f64, &Location)> = locations
        .iter()
        .filter_map(|location| distance_km(reference, location).map(|km| (km, location)))
        .collect();
    ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    let mut ranked = ranked.into_iter().map(|(_, location)| location);

    match policy {
        MissingCoordinates::Incomparable => locations
            .iter()
            .map(|location| match location.coordinate {
                Some(_) => ranked.next().unwrap_or(location).clone(),
                None => location.clone(),
            })
            .collect(),
        MissingCoordinates::Last => ranked
            .chain(locations.iter().filter(|location| location.coordinate.is_none()))
            .cloned()
            .collect(),
    }
}
