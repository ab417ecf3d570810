use std::{collections::HashMap, sync::Arc};

use crate::Coordinates;

#[derive(Debug, serde::Deserialize, Clone)]
struct CountryCentroid {
    name: String,
    latitude: f64,
    longitude: f64,
}

// note: centroids of each country, keyed by the canonical names returned by
// [`crate::normalize`].
static COUNTRIES: &'static [u8] = include_bytes!("./countries.csv");

/// Static map between canonical country names and their coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCoordinates(HashMap<Arc<str>, Coordinates>);

impl CountryCoordinates {
    /// Returns a new [`CountryCoordinates`] from the embedded `countries.csv`.
    pub fn new() -> Self {
        Self(
            crate::csv::deserialize::<CountryCentroid>(COUNTRIES)
                .map(|row| row.expect("src/countries.csv to be deserializable"))
                .map(|row| {
                    (
                        row.name.into(),
                        Coordinates::new(row.latitude, row.longitude),
                    )
                })
                .collect(),
        )
    }

    /// Returns a [`CountryCoordinates`] with a custom set of entries
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Coordinates)>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(name, c)| (name.into(), c))
                .collect(),
        )
    }

    /// Returns the coordinates of `country`, if known.
    pub fn get(&self, country: &str) -> Option<Coordinates> {
        self.0.get(country).copied()
    }
}

impl Default for CountryCoordinates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn positive() {
        let table = CountryCoordinates::new();
        assert_eq!(
            table.get("Denmark"),
            Some(Coordinates::new(56.26392, 9.501785))
        );
        assert_eq!(
            table.get("Ivory Coast"),
            Some(Coordinates::new(7.539989, -5.54708))
        );
    }

    #[test]
    fn negative() {
        assert_eq!(CountryCoordinates::new().get("Atlantis"), None);
    }

    #[test]
    fn every_canonical_name_is_known() {
        let table = CountryCoordinates::new();
        let names: HashMap<String, String> =
            serde_json::from_slice(include_bytes!("./country_names.json")).unwrap();
        for canonical in names.values() {
            assert!(table.get(canonical).is_some(), "{canonical} has no coordinates");
        }
    }
}
