use std::{error::Error, sync::Arc, time::Duration};

use clap::Parser;
use itertools::Itertools;
use num_format::{Locale, ToFormattedString};
use simple_logger::SimpleLogger;
use tinytemplate::TinyTemplate;

use energy_map::{
    geocoder, load_records, CapacityRange, MarkerDescriptor, MarkerPipeline, ResolutionCache,
    Resolver, Scale, Statistics,
};

static TEMPLATE_NAME: &'static str = "popup";

static POPUP: &'static str = r#"<div class="country-popup">
    <h3>{country}</h3>
    <p><strong>Technology:</strong> {technology}</p>
    <p><strong>Data Type:</strong> {data_type}</p>
    <p><strong>Year:</strong> {year}</p>
    <p class="capacity"><strong>Capacity:</strong> {capacity} MW</p>
</div>"#;

#[derive(clap::ValueEnum, Debug, Clone)]
enum Format {
    Geojson,
    Csv,
}

const ABOUT: &'static str = r#"Places the installed capacity of every country of a dataset on a world map.
Writes one marker per record whose capacity is within the range and whose country can be located.
Countries are located from an embedded table and, unless `--offline`, from remote geocoding services.
"#;

#[derive(Parser, Debug)]
#[command(author, version, about = ABOUT)]
struct Cli {
    /// The dataset; its first two rows are a title and a header
    #[arg(long, default_value = "data.csv")]
    data: String,
    /// The minimum capacity in MW
    #[arg(long, default_value_t = 0.0)]
    min: f64,
    /// The maximum capacity in MW
    #[arg(long, default_value_t = 2_000_000.0)]
    max: f64,
    /// Where to write the markers
    #[arg(long, default_value = "markers.geojson")]
    output: String,
    #[arg(long, value_enum, default_value_t=Format::Geojson)]
    format: Format,
    /// Do not use remote geocoding services
    #[arg(long)]
    offline: bool,
    /// Timeout in seconds of each request to a geocoding service
    #[arg(long, default_value_t = 10)]
    timeout: u64,
    /// Number of retries on transient failures of a geocoding service
    #[arg(long, default_value_t = 2)]
    retries: u32,
    /// Draw capacities above 2,000,000 MW with the largest radius
    #[arg(long)]
    clamp: bool,
    #[arg(long)]
    verbose: bool,
}

/// Logs the loading state until dropped
struct Loading;

impl Loading {
    fn start() -> Self {
        log::info!("Loading markers");
        Self
    }
}

impl Drop for Loading {
    fn drop(&mut self) {
        log::info!("Loading markers - done");
    }
}

#[derive(serde::Serialize)]
struct Popup<'a> {
    country: &'a str,
    technology: &'a str,
    data_type: &'a str,
    year: &'a str,
    capacity: String,
}

fn popup(tt: &TinyTemplate, marker: &MarkerDescriptor) -> Result<String, Box<dyn Error>> {
    let record = &marker.record;
    let context = Popup {
        country: &record.country,
        technology: &record.technology,
        data_type: &record.data_type,
        year: &record.year,
        capacity: (record.capacity.round() as u64).to_formatted_string(&Locale::en),
    };
    Ok(tt.render(TEMPLATE_NAME, &context)?)
}

fn to_geojson(markers: &[MarkerDescriptor]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(TEMPLATE_NAME, POPUP)?;

    let features = markers
        .iter()
        .map(|marker| -> Result<serde_json::Value, Box<dyn Error>> {
            Ok(serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [marker.coordinates.longitude(), marker.coordinates.latitude()],
                },
                "properties": {
                    "radius": marker.radius,
                    "color": marker.color.to_string(),
                    "record": marker.record,
                    "popup": popup(&tt, marker)?,
                },
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(serde_json::to_vec(&serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    }))?)
}

#[derive(serde::Serialize)]
struct MarkerOut<'a> {
    country: &'a str,
    technology: &'a str,
    data_type: &'a str,
    grid_connection: &'a str,
    year: &'a str,
    capacity: f64,
    latitude: f64,
    longitude: f64,
    radius: f64,
    color: String,
}

fn to_csv(markers: &[MarkerDescriptor]) -> Result<Vec<u8>, Box<dyn Error>> {
    let rows = markers.iter().map(|marker| MarkerOut {
        country: &marker.record.country,
        technology: &marker.record.technology,
        data_type: &marker.record.data_type,
        grid_connection: &marker.record.grid_connection,
        year: &marker.record.year,
        capacity: marker.record.capacity,
        latitude: marker.coordinates.latitude(),
        longitude: marker.coordinates.longitude(),
        radius: marker.radius,
        color: marker.color.to_string(),
    });
    Ok(energy_map::csv::serialize(rows)?)
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init()
        .unwrap();

    let range = CapacityRange::new(cli.min, cli.max)?;
    let records = load_records(&cli.data)?;

    let mut resolver = Resolver::new(Arc::new(ResolutionCache::new()));
    if !cli.offline {
        let config = geocoder::ServiceConfig {
            timeout: Duration::from_secs(cli.timeout),
            max_retries: cli.retries,
        };
        for service in geocoder::default_services(config)? {
            resolver = resolver.with_service(service);
        }
    }
    let scale = Scale {
        clamp: cli.clamp,
        ..Default::default()
    };
    let pipeline = MarkerPipeline::new(resolver, scale);

    let markers = {
        let _loading = Loading::start();
        pipeline
            .update(&records, range)
            .await
            .ok_or("markers were superseded")?
    };

    let stats = Statistics::of(&records, range);
    log::info!(
        "Countries: {}, total capacity: {} MW, average capacity: {} MW",
        stats.count.to_formatted_string(&Locale::en),
        (stats.total.round() as u64).to_formatted_string(&Locale::en),
        (stats.mean.round() as u64).to_formatted_string(&Locale::en),
    );

    // largest first so that smaller markers are drawn on top
    let markers = markers
        .into_iter()
        .sorted_by(|a, b| b.record.capacity.total_cmp(&a.record.capacity))
        .collect::<Vec<_>>();

    let data = match cli.format {
        Format::Geojson => to_geojson(&markers)?,
        Format::Csv => to_csv(&markers)?,
    };
    std::fs::write(&cli.output, data)?;
    log::info!("{} markers written to {}", markers.len(), cli.output);

    Ok(())
}
