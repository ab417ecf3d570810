use std::{collections::HashMap, sync::OnceLock};

// note: the verbose names are the ISO 3166 short names as they appear in the
// capacity statistics published by IRENA, mapped to the common names used by
// `countries.csv` and by geocoding services.
static COUNTRY_NAMES: &'static [u8] = include_bytes!("./country_names.json");

/// Map between verbose dataset country names and their canonical names
#[derive(Debug, Clone, PartialEq)]
pub struct CountryNames(HashMap<String, String>);

impl CountryNames {
    /// Returns a new [`CountryNames`] from the embedded `country_names.json`.
    pub fn new() -> Self {
        Self(
            serde_json::from_slice(COUNTRY_NAMES)
                .expect("src/country_names.json to be deserializable"),
        )
    }

    /// Returns the canonical name of `raw`, or `raw` itself when it has no known alias.
    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.0.get(raw).map(|x| x.as_str()).unwrap_or(raw)
    }
}

/// Returns the canonical name of a dataset country name.
/// Unknown names are returned unchanged.
pub fn normalize(raw: &str) -> &str {
    static NAMES: OnceLock<CountryNames> = OnceLock::new();
    NAMES.get_or_init(CountryNames::new).normalize(raw)
}
