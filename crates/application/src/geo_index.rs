//! Great-circle placement and radius search.
//!
//! Candidates come from the store (optionally prefiltered by a bounding box);
//! the exact haversine filter, ordering and pagination happen here. Equal
//! distances are broken by entity identifier, ascending.

use civic_issues_common::{PaginatedResult, PaginationParams};
use civic_issues_domain::errors::NotFoundError;
use civic_issues_domain::{haversine_meters, Coordinate, Issue, IssueId, Office, OfficeId};
use std::cmp::Ordering;

/// Something with an identity and a fixed position
pub trait Located {
    type Key: Ord + Copy;

    fn key(&self) -> Self::Key;

    fn location(&self) -> Coordinate;
}

impl Located for Office {
    type Key = OfficeId;

    fn key(&self) -> OfficeId {
        self.id
    }

    fn location(&self) -> Coordinate {
        self.location
    }
}

impl Located for Issue {
    type Key = IssueId;

    fn key(&self) -> IssueId {
        self.id
    }

    fn location(&self) -> Coordinate {
        self.location
    }
}

/// An entity paired with its distance from the query point
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub distance_meters: f64,
}

impl<T> Ranked<T> {
    /// Distance as shown in read models
    pub fn rounded_distance(&self) -> i64 {
        self.distance_meters.round() as i64
    }
}

/// In-memory spatial view over a candidate set
#[derive(Debug, Clone)]
pub struct GeoIndex<T> {
    entries: Vec<T>,
}

impl<T: Located> GeoIndex<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Great-circle distance in meters
    pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
        haversine_meters(a, b)
    }

    /// Closest entry to `point`
    pub fn nearest(&self, point: Coordinate) -> Option<Ranked<&T>> {
        self.ranked(point).min_by(|a, b| by_distance_then_key(a, b))
    }

    /// Every entry within `radius_meters` of `center` that satisfies
    /// `predicate`, nearest first
    pub fn within_radius<F>(
        &self,
        center: Coordinate,
        radius_meters: f64,
        predicate: F,
    ) -> Vec<Ranked<&T>>
    where
        F: Fn(&T) -> bool,
    {
        let mut hits: Vec<_> = self
            .ranked(center)
            .filter(|r| r.distance_meters <= radius_meters)
            .filter(|r| predicate(r.item))
            .collect();
        hits.sort_by(by_distance_then_key);
        hits
    }

    /// One page of [`GeoIndex::within_radius`]
    pub fn within_radius_page<F>(
        &self,
        center: Coordinate,
        radius_meters: f64,
        predicate: F,
        page: &PaginationParams,
    ) -> PaginatedResult<Ranked<T>>
    where
        F: Fn(&T) -> bool,
        T: Clone,
    {
        page.slice(self.within_radius(center, radius_meters, predicate))
            .map(|r| Ranked {
                item: r.item.clone(),
                distance_meters: r.distance_meters,
            })
    }

    fn ranked(&self, point: Coordinate) -> impl Iterator<Item = Ranked<&T>> + '_ {
        self.entries.iter().map(move |entry| Ranked {
            distance_meters: Self::distance(point, entry.location()),
            item: entry,
        })
    }
}

impl GeoIndex<Office> {
    /// Owning office for an issue at `point`
    pub fn nearest_office(&self, point: Coordinate) -> Result<Ranked<&Office>, NotFoundError> {
        self.nearest(point).ok_or(NotFoundError::NoOfficesAvailable)
    }
}

impl GeoIndex<Issue> {
    /// Nearby search over title, description and address
    pub fn search_nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
        search: Option<&str>,
        page: &PaginationParams,
    ) -> PaginatedResult<Ranked<Issue>> {
        self.within_radius_page(
            center,
            radius_meters,
            |issue| search.map_or(true, |term| issue.matches_search(term)),
            page,
        )
    }
}

fn by_distance_then_key<T: Located>(a: &Ranked<&T>, b: &Ranked<&T>) -> Ordering {
    a.distance_meters
        .total_cmp(&b.distance_meters)
        .then_with(|| a.item.key().cmp(&b.item.key()))
}
