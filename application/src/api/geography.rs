//! Geography-related API definitions.

use axum::{extract::Query, Extension, Json};
use serde::Serialize;
use service::{
    domain::geography::{city, country, region},
    query::geography::{Cities, Countries, Regions},
    read::geography::{CountrySearch, NameSearch},
    Query as _,
};

use crate::{AsError as _, Error, Service};

use super::{last_param, parse_param, Params};

/// Geography node as returned by the API.
#[derive(Clone, Debug, Serialize)]
pub struct Node<Id> {
    /// ID of the node.
    pub id: Id,

    /// Display name of the node.
    pub name: String,
}

/// Lists countries whose name contains the `q` parameter.
///
/// # Errors
///
/// If the [`Service`] failed to select the countries.
#[tracing::instrument(skip(service))]
pub async fn countries(
    Extension(service): Extension<Service>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<Node<country::Id>>>, Error> {
    let name = NameSearch::new(last_param(&params, "q"));
    let countries = service
        .execute(Countries::by(CountrySearch { name }))
        .await
        .map_err(|e| e.as_error())?;

    Ok(Json(
        countries
            .into_iter()
            .map(|c| Node {
                id: c.id,
                name: c.name.to_string(),
            })
            .collect(),
    ))
}

/// Lists regions of the `country` parameter whose name contains the `q`
/// parameter.
///
/// Nothing is listed without a valid `country`.
///
/// # Errors
///
/// If the [`Service`] failed to select the regions.
#[tracing::instrument(skip(service))]
pub async fn regions(
    Extension(service): Extension<Service>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<Node<region::Id>>>, Error> {
    let regions = service
        .execute(Regions {
            country: parse_param(&params, "country"),
            name: NameSearch::new(last_param(&params, "q")),
        })
        .await
        .map_err(|e| e.as_error())?;

    Ok(Json(
        regions
            .into_iter()
            .map(|r| Node {
                id: r.id,
                name: r.name.to_string(),
            })
            .collect(),
    ))
}

/// Lists cities of the `region` parameter whose name contains the `q`
/// parameter.
///
/// Nothing is listed without a valid `region`.
///
/// # Errors
///
/// If the [`Service`] failed to select the cities.
#[tracing::instrument(skip(service))]
pub async fn cities(
    Extension(service): Extension<Service>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<Node<city::Id>>>, Error> {
    let cities = service
        .execute(Cities {
            region: parse_param(&params, "region"),
            name: NameSearch::new(last_param(&params, "q")),
        })
        .await
        .map_err(|e| e.as_error())?;

    Ok(Json(
        cities
            .into_iter()
            .map(|c| Node {
                id: c.id,
                name: c.name.to_string(),
            })
            .collect(),
    ))
}
