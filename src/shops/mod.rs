//! Nearby shops for a product, ranked by distance from the requester.

pub mod geo;
pub mod handlers;

use std::cmp::Ordering;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::external::{Place, PlacesSearch, TextSearch};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

pub const SEARCH_RADIUS_M: f64 = 2000.0;
pub const DEFAULT_QUERY: &str = "healthy snacks";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopResult {
    pub name: String,
    pub vicinity: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance_km: Option<f64>,
    pub open_now: Option<bool>,
}

impl ShopResult {
    fn from_place(place: Place, origin: (f64, f64)) -> Self {
        let (latitude, longitude) = place
            .location
            .map(|l| (l.latitude, l.longitude))
            .unwrap_or((None, None));
        let distance_km = latitude
            .zip(longitude)
            .map(|(lat, lng)| round2(geo::haversine_km(origin.0, origin.1, lat, lng)));

        Self {
            name: place
                .display_name
                .and_then(|d| d.text)
                .unwrap_or_else(|| "Unknown Shop".to_string()),
            vicinity: place
                .formatted_address
                .unwrap_or_else(|| "Address invalid".to_string()),
            rating: place.rating,
            user_ratings_total: place.user_rating_count,
            latitude,
            longitude,
            distance_km,
            open_now: place.regular_opening_hours.and_then(|h| h.open_now),
        }
    }
}

pub struct ShopLocator {
    places: Arc<dyn PlacesSearch>,
}

impl ShopLocator {
    pub fn new(places: Arc<dyn PlacesSearch>) -> Self {
        Self { places }
    }

    /// Shops selling `query` near the requester, nearest first. Without both
    /// coordinates no search is made. Search failures yield an empty list.
    #[instrument(skip(self))]
    pub async fn find_nearby(&self, lat: Option<f64>, lng: Option<f64>, query: &str) -> Vec<ShopResult> {
        let Some((lat, lng)) = lat.zip(lng) else {
            return Vec::new();
        };
        let query = match query.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };
        let search = TextSearch {
            text_query: format!("buy {query}"),
            latitude: lat,
            longitude: lng,
            radius_m: SEARCH_RADIUS_M,
        };

        let places = match self.places.search_text(&search).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "places search failed; returning no shops");
                return Vec::new();
            }
        };

        let mut shops = places
            .into_iter()
            .map(|p| ShopResult::from_place(p, (lat, lng)))
            .collect::<Vec<_>>();
        sort_by_distance(&mut shops);
        info!(count = shops.len(), "shops ranked");
        shops
    }
}

/// Ascending distance; shops without a distance go last, keeping their order.
pub fn sort_by_distance(shops: &mut [ShopResult]) {
    shops.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
