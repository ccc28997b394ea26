//! [`Centroids`] definitions.

use std::{collections::HashMap, sync::OnceLock};

use super::{country, Coordinates};

/// Table of display [`Coordinates`] of countries, keyed by their
/// [`country::Code`].
#[derive(Clone, Debug, Default)]
pub struct Centroids(HashMap<String, Coordinates>);

impl Centroids {
    /// Parses [`Centroids`] out of a JSON object mapping two-letter codes to
    /// `[latitude, longitude]` pairs.
    ///
    /// # Errors
    ///
    /// If the `json` is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, [f64; 2]> = serde_json::from_str(json)?;
        Ok(Self(
            raw.into_iter()
                .map(|(code, [latitude, longitude])| {
                    (
                        code.to_ascii_uppercase(),
                        Coordinates {
                            latitude,
                            longitude,
                        },
                    )
                })
                .collect(),
        ))
    }

    /// Returns the [`Centroids`] table bundled with this crate.
    ///
    /// The table is parsed once, on the first call.
    #[expect(clippy::missing_panics_doc, reason = "bundled table is valid")]
    #[must_use]
    pub fn embedded() -> &'static Self {
        static TABLE: OnceLock<Centroids> = OnceLock::new();

        TABLE.get_or_init(|| {
            Self::from_json(include_str!("../../../data/country_centroids.json"))
                .expect("bundled centroid table is valid JSON")
        })
    }

    /// Looks up the centroid of the country with the provided
    /// [`country::Code`].
    #[must_use]
    pub fn get(&self, code: &country::Code) -> Option<Coordinates> {
        self.0.get(AsRef::<str>::as_ref(code)).copied()
    }

    /// Returns the number of countries in this table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether this table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(country::Code, Coordinates)> for Centroids {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (country::Code, Coordinates)>,
    {
        Self(iter.into_iter().map(|(c, p)| (c.into(), p)).collect())
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::geography::country::Code;

    use super::Centroids;

    #[test]
    fn loads_embedded_table() {
        let table = Centroids::embedded();

        assert!(table.len() > 200);
        let us = table.get(&Code::new("US").unwrap()).unwrap();
        assert!((us.latitude - 37.09).abs() < 0.01);
        assert!((us.longitude + 95.71).abs() < 0.01);
        assert!(table.get(&Code::new("XX").unwrap()).is_none());
    }

    #[test]
    fn normalizes_codes() {
        let table = Centroids::from_json(r#"{"ca": [56.13, -106.35]}"#).unwrap();

        assert!(table.get(&Code::new("CA").unwrap()).is_some());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Centroids::from_json(r#"{"US": [1.0]}"#).is_err());
        assert!(Centroids::from_json("[]").is_err());
    }
}
