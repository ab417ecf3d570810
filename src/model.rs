use std::{error::Error, sync::Arc};

use serde::{Deserialize, Serialize};

/// One row of the installed capacity dataset
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EnergyRecord {
    /// The country as written in the dataset (e.g. `Viet Nam`)
    pub country: Arc<str>,
    /// The technology (e.g. `Solar photovoltaic`)
    pub technology: Arc<str>,
    /// The kind of value (e.g. `Electricity Installed Capacity (MW)`)
    pub data_type: Arc<str>,
    pub grid_connection: Arc<str>,
    pub year: Arc<str>,
    /// Installed capacity in MW, always positive
    pub capacity: f64,
}

impl EnergyRecord {
    /// Returns an [`EnergyRecord`] from a dataset row, or `None` if the row has fewer
    /// than 6 columns or its capacity is not a positive number.
    /// Bytes that are not UTF-8 are replaced by `U+FFFD`.
    pub fn from_row(row: &csv::ByteRecord) -> Option<Self> {
        if row.len() < 6 {
            return None;
        }
        let field = |i: usize| -> Arc<str> { String::from_utf8_lossy(&row[i]).as_ref().into() };
        let capacity = field(5).trim().parse::<f64>().ok()?;
        if !(capacity > 0.0 && capacity.is_finite()) {
            return None;
        }
        Some(Self {
            country: field(0),
            technology: field(1),
            data_type: field(2),
            grid_connection: field(3),
            year: field(4),
            capacity,
        })
    }
}

/// Parses the dataset, skipping its title and header rows and every invalid row
/// # Error
/// Errors if the data is not valid CSV
pub fn parse_records(data: &[u8]) -> Result<Vec<EnergyRecord>, csv::Error> {
    let mut records = vec![];
    for row in crate::csv::rows(data, 2) {
        let row = row?;
        if std::str::from_utf8(row.as_slice()).is_err() {
            log::warn!("Row {} is not UTF-8", row.position().map_or(0, |p| p.line()));
        }
        if let Some(record) = EnergyRecord::from_row(&row) {
            records.push(record)
        }
    }
    Ok(records)
}

/// Loads the dataset at `path` into memory
/// # Error
/// Errors if the file cannot be read or is not valid CSV
pub fn load_records(path: &str) -> Result<Vec<EnergyRecord>, Box<dyn Error>> {
    let data = std::fs::read(path)?;
    let records = parse_records(&data)?;
    log::info!("Loaded {} records from {path}", records.len());
    Ok(records)
}

/// An inclusive range of capacities in MW
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CapacityRange {
    min: f64,
    max: f64,
}

impl CapacityRange {
    /// Returns a new [`CapacityRange`].
    /// # Error
    /// Errors if any bound is NaN or `min > max`
    pub fn new(min: f64, max: f64) -> Result<Self, String> {
        if min.is_nan() || max.is_nan() {
            return Err("capacity bounds must be numbers".to_string());
        }
        if min > max {
            return Err(format!("minimum capacity {min} is above maximum {max}"));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, capacity: f64) -> bool {
        capacity >= self.min && capacity <= self.max
    }

    /// Returns this range with a new minimum, raising the maximum to it if needed
    /// # Error
    /// Errors if `min` is NaN
    pub fn with_min(self, min: f64) -> Result<Self, String> {
        Self::new(min, self.max.max(min))
    }

    /// Returns this range with a new maximum, lowering the minimum to it if needed
    /// # Error
    /// Errors if `max` is NaN
    pub fn with_max(self, max: f64) -> Result<Self, String> {
        Self::new(self.min.min(max), max)
    }
}

impl Default for CapacityRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static DATA: &str = r#"Installed capacity,,,,,
Country,Technology,Data Type,Grid connection,Year,Capacity
"Viet Nam","Solar photovoltaic","Electricity Installed Capacity (MW)","On-grid","2023","18810.0"
Denmark,Onshore wind energy,Electricity Installed Capacity (MW),On-grid,2023,4783.5

"China, Hong Kong Special Administrative Region",Solar photovoltaic,Electricity Installed Capacity (MW),On-grid,2023,0
Tuvalu,Solar photovoltaic,Electricity Installed Capacity (MW),Off-grid,2023,n/a
Malta,Solar photovoltaic
"#;

    #[test]
    fn parse() {
        let records = parse_records(DATA.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country.as_ref(), "Viet Nam");
        assert_eq!(records[0].year.as_ref(), "2023");
        assert_eq!(records[0].capacity, 18810.0);
        assert_eq!(records[1].technology.as_ref(), "Onshore wind energy");
        assert_eq!(records[1].capacity, 4783.5);
    }

    #[test]
    fn invalid_utf8_row() {
        let data = b"title\nheader\nDenmark,Onshore wind energy,,,2023,4783.5\nC\xf4te d'Ivoire,Solar photovoltaic,,,2023,120\nMalta,Solar photovoltaic,,,2023,247.1\n";
        let records = parse_records(data).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].country.as_ref(), "Denmark");
        assert_eq!(records[1].country.as_ref(), "C\u{FFFD}te d'Ivoire");
        assert_eq!(records[1].capacity, 120.0);
        assert_eq!(records[2].country.as_ref(), "Malta");
    }

    #[test]
    fn range() {
        assert!(CapacityRange::new(10.0, 1.0).is_err());
        assert!(CapacityRange::new(f64::NAN, 1.0).is_err());

        let range = CapacityRange::new(1000.0, 100000.0).unwrap();
        assert!(range.contains(1000.0));
        assert!(range.contains(100000.0));
        assert!(!range.contains(999.0));
        assert!(CapacityRange::default().contains(1e12));
    }

    #[test]
    fn sliders_are_coupled() {
        let range = CapacityRange::new(0.0, 500.0).unwrap();
        assert_eq!(range.with_min(800.0), CapacityRange::new(800.0, 800.0));
        assert_eq!(range.with_max(100.0), CapacityRange::new(0.0, 100.0));
        let range = CapacityRange::new(200.0, 500.0).unwrap();
        assert_eq!(range.with_max(100.0), CapacityRange::new(100.0, 100.0));
    }

    #[test]
    fn sliders_reject_nan() {
        let range = CapacityRange::new(200.0, 500.0).unwrap();
        assert!(range.with_min(f64::NAN).is_err());
        assert!(range.with_max(f64::NAN).is_err());
    }
}
