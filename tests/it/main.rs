use std::{
    error::Error,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use energy_map::{
    build_markers,
    geocoder::{self, GeocodingService, HttpService, NamePlacement, ServiceConfig},
    parse_records, CapacityRange, Color, Coordinates, ResolutionCache, Resolver, Statistics,
};

static DATA: &str = r#"IRENA installed capacity,,,,,
Country/area,Technology,Data Type,Grid connection,Year,Electricity statistics (MW)
"United States of America (the)",Solar photovoltaic,Electricity Installed Capacity (MW),On-grid,2023,137725.0
"Viet Nam",Solar photovoltaic,Electricity Installed Capacity (MW),On-grid,2023,18810.0
Denmark,Onshore wind energy,Electricity Installed Capacity (MW),On-grid,2023,4783.5
Malta,Solar photovoltaic,Electricity Installed Capacity (MW),On-grid,2023,247.1
Atlantis,Marine energy,Electricity Installed Capacity (MW),Off-grid,2023,12.0
"#;

/// A service answering `Some` for "Atlantis" only, counting its calls
struct Oracle(Arc<AtomicUsize>);

#[async_trait::async_trait]
impl GeocodingService for Oracle {
    fn name(&self) -> &str {
        "oracle"
    }

    async fn lookup(&self, country: &str) -> Result<Option<Coordinates>, geocoder::Error> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok((country == "Atlantis").then_some(Coordinates::new(31.0, -24.0)))
    }
}

/// Verifies the whole dataset to markers flow, where only one country needs a remote lookup.
#[tokio::test]
async fn acceptance_markers() -> Result<(), Box<dyn Error>> {
    let records = parse_records(DATA.as_bytes())?;
    assert_eq!(records.len(), 5);

    let calls = Arc::new(AtomicUsize::new(0));
    let resolver = Resolver::new(Arc::new(ResolutionCache::new())).with_service(Oracle(calls.clone()));

    let markers = build_markers(&records, CapacityRange::default(), &resolver).await;
    assert_eq!(markers.len(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let colors = records
        .iter()
        .map(|record| {
            markers
                .iter()
                .find(|m| m.record == *record)
                .map(|m| m.color)
                .unwrap()
        })
        .collect::<Vec<_>>();
    assert_eq!(
        colors,
        vec![Color::Teal, Color::Yellow, Color::Blue, Color::Red, Color::Red]
    );
    assert!(markers.iter().all(|m| m.radius >= 3.0 && m.radius <= 50.0));

    // a second range change needs no lookup
    let range = CapacityRange::new(1000.0, 100000.0)?;
    let markers = build_markers(&records, range, &resolver).await;
    assert_eq!(markers.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let stats = Statistics::of(&records, range);
    assert_eq!(stats.count, 2);
    assert_eq!(stats.total, 18810.0 + 4783.5);
    Ok(())
}

/// Verifies that an unreachable service falls through to the next one.
#[tokio::test]
async fn unreachable_service_falls_through() -> Result<(), Box<dyn Error>> {
    let config = ServiceConfig {
        max_retries: 0,
        ..Default::default()
    };
    // nothing listens on the discard port of the loopback interface
    let unreachable = HttpService::new(
        "unreachable",
        "http://127.0.0.1:9/search",
        NamePlacement::Query("q".to_string()),
        &[("limit", "1")],
        config,
    )?;
    assert!(unreachable.lookup("Atlantis").await.is_err());

    let calls = Arc::new(AtomicUsize::new(0));
    let resolver = Resolver::new(Arc::new(ResolutionCache::new()))
        .with_service(unreachable)
        .with_service(Oracle(calls.clone()));

    assert_eq!(
        resolver.resolve("Atlantis").await,
        Some(Coordinates::new(31.0, -24.0))
    );
    assert_eq!(resolver.resolve("Lemuria").await, None);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}
