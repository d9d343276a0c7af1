//! Google Places (v1) text search client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ExternalCallPool, ExternalError};

const API_URL: &str = "https://places.googleapis.com/v1/places:searchText";
const FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.location,\
places.rating,places.userRatingCount,places.regularOpeningHours";

/// Text query biased to a circle around a point.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub text_query: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub display_name: Option<LocalizedText>,
    pub formatted_address: Option<String>,
    pub location: Option<PlaceLocation>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<u64>,
    pub regular_opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedText {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

#[async_trait]
pub trait PlacesSearch: Send + Sync {
    async fn search_text(&self, search: &TextSearch) -> Result<Vec<Place>, ExternalError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
    location_bias: LocationBias,
}

#[derive(Serialize)]
struct LocationBias {
    circle: Circle,
}

#[derive(Serialize)]
struct Circle {
    center: Center,
    radius: f64,
}

#[derive(Serialize)]
struct Center {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Clone)]
pub struct GooglePlacesClient {
    http: Client,
    api_key: String,
    url: String,
    pool: ExternalCallPool,
}

impl GooglePlacesClient {
    pub fn new(http: Client, api_key: impl Into<String>, pool: ExternalCallPool) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            url: API_URL.to_string(),
            pool,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    async fn search_once(&self, search: &TextSearch) -> Result<Vec<Place>, ExternalError> {
        let body = SearchTextRequest {
            text_query: &search.text_query,
            location_bias: LocationBias {
                circle: Circle {
                    center: Center {
                        latitude: search.latitude,
                        longitude: search.longitude,
                    },
                    radius: search.radius_m,
                },
            },
        };

        let response = self
            .http
            .post(&self.url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(%status, body = %text, "places search failed");
            return Err(ExternalError::Status {
                service: "places",
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: SearchTextResponse =
            serde_json::from_str(&text).map_err(|e| ExternalError::Malformed(e.to_string()))?;
        Ok(parsed.places)
    }
}

#[async_trait]
impl PlacesSearch for GooglePlacesClient {
    #[instrument(skip(self), fields(query = %search.text_query))]
    async fn search_text(&self, search: &TextSearch) -> Result<Vec<Place>, ExternalError> {
        let places = self.pool.run("places", || self.search_once(search)).await?;
        debug!(count = places.len(), "places search returned");
        Ok(places)
    }
}
