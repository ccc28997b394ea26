//! Map-related API definitions.

use axum::{extract::Query, Extension, Json};
use serde::Serialize;
use service::{
    domain::geography::{city, country, region},
    query,
    read::{self, listing::FilterCriteria, map::Bucket},
    Query as _,
};

use crate::{AsError as _, Error, Service};

use super::Params;

/// Map marker of a geography node.
#[derive(Clone, Debug, Serialize)]
pub struct Marker<Id> {
    /// ID of the node.
    pub id: Id,

    /// Display name of the node.
    pub name: String,

    /// Number of games located in the node.
    pub count: u64,

    /// Latitude to display the node at.
    pub lat: f64,

    /// Longitude to display the node at.
    pub lng: f64,
}

impl<Id> From<Bucket<Id>> for Marker<Id> {
    fn from(bucket: Bucket<Id>) -> Self {
        let Bucket {
            id,
            name,
            count,
            coordinates,
        } = bucket;
        Self {
            id,
            name,
            count,
            lat: coordinates.latitude,
            lng: coordinates.longitude,
        }
    }
}

/// Map marker of the games of a country without a region.
#[derive(Clone, Debug, Serialize)]
pub struct CountryOnlyMarker {
    /// ID of the country.
    pub country_id: country::Id,

    /// Display name of the marker.
    pub name: String,

    /// Number of games located in the country without a region.
    pub count: u64,

    /// Latitude to display the marker at.
    pub lat: f64,

    /// Longitude to display the marker at.
    pub lng: f64,
}

impl From<Bucket<country::Id>> for CountryOnlyMarker {
    fn from(bucket: Bucket<country::Id>) -> Self {
        let Marker {
            id,
            name,
            count,
            lat,
            lng,
        } = bucket.into();
        Self {
            country_id: id,
            name,
            count,
            lat,
            lng,
        }
    }
}

/// Map marker of the games of a region without a city.
#[derive(Clone, Debug, Serialize)]
pub struct RegionOnlyMarker {
    /// ID of the region.
    pub region_id: region::Id,

    /// Display name of the marker.
    pub name: String,

    /// Number of games located in the region without a city.
    pub count: u64,

    /// Latitude to display the marker at.
    pub lat: f64,

    /// Longitude to display the marker at.
    pub lng: f64,
}

impl From<Bucket<region::Id>> for RegionOnlyMarker {
    fn from(bucket: Bucket<region::Id>) -> Self {
        let Marker {
            id,
            name,
            count,
            lat,
            lng,
        } = bucket.into();
        Self {
            region_id: id,
            name,
            count,
            lat,
            lng,
        }
    }
}

/// Markers of the games matching a filter.
#[derive(Clone, Debug, Serialize)]
pub struct MapData {
    /// Markers of countries.
    pub countries: Vec<Marker<country::Id>>,

    /// Markers of regions.
    pub regions: Vec<Marker<region::Id>>,

    /// Markers of cities.
    pub cities: Vec<Marker<city::Id>>,

    /// Markers of games located in a country without a region.
    pub country_only: Vec<CountryOnlyMarker>,

    /// Markers of games located in a region without a city.
    pub region_only: Vec<RegionOnlyMarker>,
}

impl From<read::MapData> for MapData {
    fn from(data: read::MapData) -> Self {
        let read::MapData {
            countries,
            regions,
            cities,
            country_only,
            region_only,
        } = data;
        Self {
            countries: countries.into_iter().map(Into::into).collect(),
            regions: regions.into_iter().map(Into::into).collect(),
            cities: cities.into_iter().map(Into::into).collect(),
            country_only: country_only.into_iter().map(Into::into).collect(),
            region_only: region_only.into_iter().map(Into::into).collect(),
        }
    }
}

/// Game shown in a location panel.
#[derive(Clone, Debug, Serialize)]
pub struct PanelGame {
    /// Name of the game.
    pub name: String,

    /// Slug addressing the game.
    pub slug: String,

    /// Human-readable location of the game.
    pub location: String,

    /// Logo of the game.
    pub logo: Option<String>,

    /// Name of the college the game is played at.
    pub college_name: Option<String>,
}

/// Games of the location selected on the map.
#[derive(Clone, Debug, Serialize)]
pub struct LocationGames {
    /// Games located in the selected location.
    pub games: Vec<PanelGame>,

    /// Human-readable label of the selected location.
    pub location_label: String,

    /// URL of the list of the same games.
    pub game_list_url: String,
}

impl From<read::Panel> for LocationGames {
    fn from(panel: read::Panel) -> Self {
        let read::Panel {
            entries,
            label,
            list_url,
        } = panel;
        Self {
            games: entries
                .into_iter()
                .map(|e| PanelGame {
                    name: e.name.to_string(),
                    slug: e.slug.to_string(),
                    location: e.location,
                    logo: e.logo.as_ref().map(ToString::to_string),
                    college_name: e
                        .college_name
                        .as_ref()
                        .map(ToString::to_string),
                })
                .collect(),
            location_label: label,
            game_list_url: list_url,
        }
    }
}

/// Returns the map markers of the games matching the filter in the query
/// parameters.
///
/// # Errors
///
/// If the [`Service`] failed to select the games.
#[tracing::instrument(skip(service))]
pub async fn map_data(
    Extension(service): Extension<Service>,
    Query(params): Query<Params>,
) -> Result<Json<MapData>, Error> {
    let filter =
        FilterCriteria::from_query(params.iter().map(|(k, v)| (k, v)));
    service
        .execute(query::map::MapData { filter })
        .await
        .map(|d| Json(d.into()))
        .map_err(|e| e.as_error())
}

/// Returns the games of the location selected in the query parameters.
///
/// # Errors
///
/// If the [`Service`] failed to select the games.
#[tracing::instrument(skip(service))]
pub async fn location_games(
    Extension(service): Extension<Service>,
    Query(params): Query<Params>,
) -> Result<Json<LocationGames>, Error> {
    let filter =
        FilterCriteria::from_query(params.iter().map(|(k, v)| (k, v)));
    service
        .execute(query::location_panel::LocationPanel { filter })
        .await
        .map(|p| Json(p.into()))
        .map_err(|e| e.as_error())
}

#[cfg(test)]
mod spec {
    use service::{
        domain::geography::{country, Coordinates},
        read::map::Bucket,
    };

    use super::CountryOnlyMarker;

    #[test]
    fn flattens_coordinates() {
        let marker = CountryOnlyMarker::from(Bucket {
            id: country::Id::new(1),
            name: "United States (no state/region)".to_owned(),
            count: 2,
            coordinates: Coordinates {
                latitude: 37.09,
                longitude: -95.71,
            },
        });

        let json = serde_json::to_value(marker).unwrap();

        assert_eq!(json["country_id"], 1);
        assert_eq!(json["count"], 2);
        assert_eq!(json["lat"], 37.09);
        assert_eq!(json["lng"], -95.71);
    }
}
