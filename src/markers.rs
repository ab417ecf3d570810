use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::{encoding::Color, normalize, CapacityRange, Coordinates, EnergyRecord, Resolver, Scale};

/// A record ready to be drawn on a map
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub coordinates: Coordinates,
    pub radius: f64,
    pub color: Color,
    pub record: EnergyRecord,
}

/// Returns the [`MarkerDescriptor`]s of every record within `range` whose country resolves,
/// drawn with the default [`Scale`].
/// # Implementation
/// Countries are resolved concurrently and records that do not resolve are dropped.
/// No resolution happens when no record is within `range`.
pub async fn build_markers(
    records: &[EnergyRecord],
    range: CapacityRange,
    resolver: &Resolver,
) -> Vec<MarkerDescriptor> {
    build_markers_with(records, range, resolver, &Scale::default()).await
}

/// Same as [`build_markers`] with a custom [`Scale`]
pub async fn build_markers_with(
    records: &[EnergyRecord],
    range: CapacityRange,
    resolver: &Resolver,
    scale: &Scale,
) -> Vec<MarkerDescriptor> {
    let filtered = records
        .iter()
        .filter(|record| range.contains(record.capacity))
        .collect::<Vec<_>>();
    if filtered.is_empty() {
        return vec![];
    }

    let tasks = filtered.iter().map(|record| async move {
        resolver
            .resolve(normalize(&record.country))
            .await
            .map(|coordinates| (coordinates, *record))
    });
    let resolved = futures::future::join_all(tasks)
        .await
        .into_iter()
        .flatten()
        .map(|(coordinates, record)| {
            let encoding = scale.encode(record.capacity);
            MarkerDescriptor {
                coordinates,
                radius: encoding.radius,
                color: encoding.color,
                record: record.clone(),
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "Successfully loaded {} countries out of {} total",
        resolved.len(),
        filtered.len()
    );
    resolved
}

/// Builds markers for successive range changes, discarding results that were
/// superseded by a later change while they were being resolved.
pub struct MarkerPipeline {
    resolver: Resolver,
    scale: Scale,
    generation: AtomicU64,
}

impl MarkerPipeline {
    pub fn new(resolver: Resolver, scale: Scale) -> Self {
        Self {
            resolver,
            scale,
            generation: AtomicU64::new(0),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Returns the markers of `records` within `range`, or `None` if another
    /// call to `update` started before this one finished.
    pub async fn update(
        &self,
        records: &[EnergyRecord],
        range: CapacityRange,
    ) -> Option<Vec<MarkerDescriptor>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let markers = build_markers_with(records, range, &self.resolver, &self.scale).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            log::info!("Discarding {} stale markers", markers.len());
            return None;
        }
        Some(markers)
    }
}
