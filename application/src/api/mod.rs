//! HTTP JSON API definitions.

pub mod geography;
pub mod listing;
pub mod map;

use std::str::FromStr;

use axum::{routing::get, Router};

/// Raw query parameters of a request, in their original order.
pub type Params = Vec<(String, String)>;

/// Creates a [`Router`] serving the whole API.
///
/// The [`Service`] is expected in an [`Extension`] layer.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/games", get(listing::list))
        .route("/games/map-data", get(map::map_data))
        .route("/games/map-location-games", get(map::location_games))
        .route("/games/:slug", get(listing::detail))
        .route("/countries", get(geography::countries))
        .route("/regions", get(geography::regions))
        .route("/cities", get(geography::cities))
}

/// Returns the raw value of the last `key` parameter, if any.
#[must_use]
pub fn last_param<'p>(params: &'p Params, key: &str) -> Option<&'p str> {
    params
        .iter()
        .rev()
        .find_map(|(k, v)| (k == key).then_some(v.as_str()))
}

/// Parses the value of the last `key` parameter.
///
/// A missing or malformed value is [`None`].
#[must_use]
pub fn parse_param<T: FromStr>(params: &Params, key: &str) -> Option<T> {
    last_param(params, key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod spec {
    use super::{last_param, parse_param, Params};

    #[test]
    fn reads_last_param() {
        let params: Params = vec![
            ("page".into(), "2".into()),
            ("q".into(), "mole".into()),
            ("page".into(), "x".into()),
        ];

        assert_eq!(last_param(&params, "page"), Some("x"));
        assert_eq!(parse_param::<u32>(&params, "page"), None);
        assert_eq!(last_param(&params, "missing"), None);
    }
}
