//! Geo-distance resolution of place candidates
//!
//! When several places share a predicted name, the one nearest to anywhere
//! the account holder was that day wins.
//!
//! The default `Planar` metric is Euclidean distance on raw degrees. It is
//! only locally meaningful: one degree of longitude shrinks with latitude,
//! so the error grows towards the poles and over long distances. Use
//! `Haversine` for great-circle distance.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ResolvedRecord, SearchOutcome, VisitedLocation};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between a visited point and a candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Euclidean distance in degrees
    #[default]
    Planar,
    /// Great-circle distance in kilometres
    Haversine,
}

impl DistanceMetric {
    pub fn distance(&self, lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
        match self {
            Self::Planar => ((lat2 - lat1).powi(2) + (lng2 - lng1).powi(2)).sqrt(),
            Self::Haversine => {
                let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
                let d_phi = (lat2 - lat1).to_radians();
                let d_lambda = (lng2 - lng1).to_radians();
                let a = (d_phi / 2.0).sin().powi(2)
                    + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
                2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
            }
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planar" => Ok(Self::Planar),
            "haversine" => Ok(Self::Haversine),
            other => Err(format!(
                "Unknown distance metric '{}' (expected planar or haversine)",
                other
            )),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planar => write!(f, "planar"),
            Self::Haversine => write!(f, "haversine"),
        }
    }
}

/// Picks the resolved place for one transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoResolver {
    metric: DistanceMetric,
}

impl GeoResolver {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    /// Turn a search outcome into the transaction's resolved record
    ///
    /// - no candidates: a blank record
    /// - a predefined company: only the category is filled in
    /// - candidates: the candidate closest to any visited location, carrying
    ///   the candidate's own coordinates
    ///
    /// Candidates with no visited locations for the day cannot be ranked and
    /// fail with `Error::NoVisitedLocations`.
    pub fn resolve(
        &self,
        transaction_id: i64,
        date: NaiveDate,
        visited: &[VisitedLocation],
        outcome: &SearchOutcome,
    ) -> Result<ResolvedRecord> {
        let candidates = match outcome {
            SearchOutcome::NoCandidates => return Ok(ResolvedRecord::blank(transaction_id)),
            SearchOutcome::Predefined(company_type) => {
                return Ok(ResolvedRecord::category_only(transaction_id, company_type))
            }
            SearchOutcome::Candidates(c) if c.is_empty() => {
                return Ok(ResolvedRecord::blank(transaction_id))
            }
            SearchOutcome::Candidates(c) => c,
        };

        if visited.is_empty() {
            return Err(Error::NoVisitedLocations(date));
        }

        let points: Vec<(f64, f64)> = candidates.iter().map(|c| (c.lat, c.lng)).collect();
        let (row, col, distance) = self
            .closest_pair(visited, &points)
            .ok_or_else(|| Error::InvalidData("No finite distance between candidates".into()))?;

        let winner = &candidates[col];
        debug!(
            transaction_id,
            candidates = candidates.len(),
            visited = visited.len(),
            visited_index = row,
            place = %winner.name,
            distance,
            "Resolved place"
        );
        Ok(ResolvedRecord::from_candidate(transaction_id, winner))
    }

    /// Row-major argmin of the visited × candidate distance matrix
    ///
    /// Ties keep the first minimum; NaN distances are skipped.
    pub fn closest_pair(
        &self,
        visited: &[VisitedLocation],
        candidates: &[(f64, f64)],
    ) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;

        for (i, v) in visited.iter().enumerate() {
            for (j, &(lat, lng)) in candidates.iter().enumerate() {
                let d = self.metric.distance(v.lat, v.lng, lat, lng);
                if d.is_nan() {
                    continue;
                }
                if best.map_or(true, |(_, _, min)| d < min) {
                    best = Some((i, j, d));
                }
            }
        }

        best
    }
}
