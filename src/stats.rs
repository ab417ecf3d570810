use serde::Serialize;

use crate::{CapacityRange, EnergyRecord};

/// Aggregates of the records within a [`CapacityRange`]
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    /// Number of records
    pub count: usize,
    /// Sum of their capacities in MW
    pub total: f64,
    /// Mean of their capacities in MW, 0 when there are no records
    pub mean: f64,
}

impl Statistics {
    pub fn of(records: &[EnergyRecord], range: CapacityRange) -> Self {
        let (count, total) = records
            .iter()
            .filter(|record| range.contains(record.capacity))
            .fold((0, 0.0), |(count, total), record| {
                (count + 1, total + record.capacity)
            });
        let mean = if count > 0 { total / count as f64 } else { 0.0 };
        Self { count, total, mean }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn work() {
        let records = crate::parse_records(
            b"title\nheader\nA,,,,,500\nB,,,,,5000\nC,,,,,50000\n",
        )
        .unwrap();

        let stats = Statistics::of(&records, CapacityRange::new(1000.0, 100000.0).unwrap());
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total, 55000.0);
        assert_eq!(stats.mean, 27500.0);

        let stats = Statistics::of(&records, CapacityRange::new(1e6, 1e7).unwrap());
        assert_eq!(stats, Statistics::default());
    }
}
