//! Ranking of workers against a job by skill coverage and distance.

mod geo;
mod ranking;

pub use geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use ranking::{list_job_matches, rank_candidates, JobMatch, MatchCandidate, Page};
