use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::gate::{PageId, Route};

// --- Exchange Contracts ---
//
// Record shapes exchanged with the observation backend and handed to the page
// renderer. Optional fields stay optional on the wire: `None` is omitted from the
// JSON rather than sent as null, and a missing key deserializes to `None`.

/// Comment
///
/// A comment on an observation. Replies nest recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Comment {
    pub id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub user_profile_picture: Option<String>,
    pub comment_text: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub parent_comment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    #[schema(no_recursion)]
    pub replies: Option<Vec<Comment>>,
}

/// Species
///
/// Catalog entry for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Species {
    #[serde(rename = "_id")]
    pub id: String,
    pub species: String,
    pub family: String,
    pub genus: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub common_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub observations_count: Option<i64>,
}

/// SpeciesDetailResponse
///
/// Payload behind the species page: the catalog entry, its latest observations and a
/// count of observations per review status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SpeciesDetailResponse {
    pub species: Species,
    pub recent_observations: Vec<Observation>,
    pub status_counts: BTreeMap<String, i64>,
}

/// GeoJSON feature discriminator. Only point features are exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum FeatureKind {
    #[default]
    Feature,
}

/// GeoJSON geometry discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum GeometryKind {
    #[default]
    Point,
}

/// ObservationLocation
///
/// A GeoJSON point. `coordinates` follows GeoJSON order: `[longitude, latitude]`.
/// Some records also carry the two values as separate fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ObservationLocation {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    #[schema(value_type = Vec<f64>)]
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub longitude: Option<f64>,
}

impl ObservationLocation {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeometryKind::Point,
            coordinates: [longitude, latitude],
            latitude: None,
            longitude: None,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// ObservationProperties
///
/// Metadata attached to an observation feature. Media fields are lists of URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ObservationProperties {
    pub species: String,
    pub genus: String,
    pub family: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub photo: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub audio: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub external_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub user_profile_picture: Option<String>,
}

/// Observation
///
/// A single sighting as a GeoJSON point feature. Imported records carry the
/// `source_id` of the external platform they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Observation {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub source_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub location: ObservationLocation,
    pub properties: ObservationProperties,
}

/// DetailedObservationProperties
///
/// Observation metadata as served on the detail page; the submitter is described by
/// the enclosing record instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DetailedObservationProperties {
    pub species: String,
    pub genus: String,
    pub family: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub photo: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub audio: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub external_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<String>,
}

/// DetailedObservation
///
/// An observation enriched for the detail page: submitter identity, comment thread,
/// and the two flags the page uses to decide which moderation controls to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DetailedObservation {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub source_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub location: ObservationLocation,
    pub properties: DetailedObservationProperties,

    pub species_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub common_name: Option<String>,
    pub family: String,
    pub genus: String,

    // Submitter
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub user_title: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub user_profile_picture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub comments_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub comments: Option<Vec<Comment>>,

    // Viewer flags, computed by the backend for the requesting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub is_current_user: Option<bool>,
}

/// MapCoordinates
///
/// Location of a map marker, `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapCoordinates {
    #[schema(value_type = Vec<f64>)]
    pub coordinates: [f64; 2],
}

/// MapObservationProperties
///
/// Marker popup content. Every field is required on the map projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapObservationProperties {
    pub species: String,
    pub family: String,
    pub genus: String,
    pub timestamp: String,
    pub location_name: String,
    pub region: String,
    pub country: String,
    pub photo: Vec<String>,
    pub external_link: String,
}

/// MapObservation
///
/// The reduced projection of an observation the map view plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapObservation {
    pub location: MapCoordinates,
    pub properties: MapObservationProperties,
}

impl From<&Observation> for MapObservation {
    /// Absent optional metadata becomes an empty string or list, since the map
    /// projection has no optional fields.
    fn from(observation: &Observation) -> Self {
        let props = &observation.properties;
        Self {
            location: MapCoordinates {
                coordinates: observation.location.coordinates,
            },
            properties: MapObservationProperties {
                species: props.species.clone(),
                family: props.family.clone(),
                genus: props.genus.clone(),
                timestamp: props.timestamp.clone(),
                location_name: props.location_name.clone().unwrap_or_default(),
                region: props.region.clone().unwrap_or_default(),
                country: props.country.clone().unwrap_or_default(),
                photo: props.photo.clone().unwrap_or_default(),
                external_link: props.external_link.clone().unwrap_or_default(),
            },
        }
    }
}

// --- Query Options ---

/// FilterOptions
///
/// Map and gallery filter form state. Empty strings mean "no filter" on that field.
/// Dates are ISO `YYYY-MM-DD` strings, sent camelCased as the backend expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FilterOptions {
    pub family: String,
    pub genus: String,
    pub species: String,
    pub continent: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub show_only_my_observations: Option<bool>,
}

/// TaxaOptions
///
/// Distinct taxa available to populate the filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TaxaOptions {
    pub families: Vec<String>,
    pub genera: Vec<String>,
    pub species: Vec<String>,
}

// --- Navigation Responses ---

/// RouteSummary
///
/// One entry of the route table as exposed to clients (GET /api/routes). The flags
/// are the effective ones: an admin route always reports `requires_auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteSummary {
    pub path: String,
    pub page: PageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl From<&Route> for RouteSummary {
    fn from(route: &Route) -> Self {
        Self {
            path: route.pattern().as_str().to_string(),
            page: route.page(),
            name: route.name().map(str::to_string),
            requires_auth: route.requires_auth(),
            requires_admin: route.requires_admin(),
        }
    }
}

/// PageView
///
/// What a permitted page navigation hands to the renderer: the page, the path it
/// was reached through, and the captured parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageView {
    pub page: PageId,
    pub path: String,
    pub params: BTreeMap<String, String>,
}
