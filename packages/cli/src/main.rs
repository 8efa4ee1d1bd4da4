#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the zip-cluster toolchain.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zip_cluster_clusters::{DEFAULT_ANALYSIS_TYPES, build_all, default_analysis_types, to_feature_collection};
use zip_cluster_geocoder::config::{GeocodingService, ProviderConfig};
use zip_cluster_geocoder::nominatim::NominatimGeocoder;
use zip_cluster_geocoder::overrides::OverrideTable;
use zip_cluster_geocoder::{AddressResolver, GeocodeClient, RecordOutcome, resolve_batch};
use zip_cluster_geography_models::AnalysisType;
use zip_cluster_ingest::{AddressTable, ZipTable};
use zip_cluster_spatial::DEFAULT_MAX_DISTANCE_KM;

#[derive(Parser)]
#[command(name = "zip_cluster", about = "ZIP geocoding and cluster boundary tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode every address in a CSV and write the coordinates back
    Geocode {
        /// Address table with an `Address` column
        #[arg(long)]
        input: PathBuf,
        /// Where to write the annotated table (defaults to the input file)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Clustered ZIP table used for the nearby-ZIP fallback
        #[arg(long)]
        reference: Option<PathBuf>,
        /// TOML override table replacing the built-in one
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Nominatim search endpoint
        #[arg(long)]
        base_url: Option<String>,
        /// `User-Agent` sent to the provider; public Nominatim requires a
        /// real contact
        #[arg(long)]
        user_agent: Option<String>,
        /// Maximum distance for the nearby-ZIP fallback, in kilometers
        #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE_KM)]
        max_distance_km: f64,
        /// Keep rows that already have coordinates instead of re-resolving them
        #[arg(long)]
        keep_existing: bool,
    },
    /// Build cluster boundaries and write them as `GeoJSON`
    Clusters {
        /// Clustered ZIP table
        #[arg(long)]
        input: PathBuf,
        /// Analysis types to build, repeatable or comma-separated
        /// (defaults to the conventional set)
        #[arg(long = "analysis", value_delimiter = ',')]
        analyses: Vec<String>,
        /// Output `GeoJSON` path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the conventional analysis types
    AnalysisTypes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Geocode {
            input,
            output,
            reference,
            overrides,
            base_url,
            user_agent,
            max_distance_km,
            keep_existing,
        } => {
            let mut service = GeocodingService::embedded()?;
            {
                let ProviderConfig::Nominatim {
                    base_url: configured_url,
                    user_agent: configured_agent,
                    ..
                } = &mut service.provider;
                if let Some(url) = base_url {
                    *configured_url = url;
                }
                if let Some(agent) = user_agent {
                    *configured_agent = agent;
                }
            }

            let overrides = match overrides {
                Some(path) => OverrideTable::from_path(&path)?,
                None => OverrideTable::embedded()?,
            };
            log::info!("Loaded {} address overrides", overrides.len());

            let geocoder = NominatimGeocoder::from_service(&service)?;
            let mut resolver =
                AddressResolver::new(GeocodeClient::new(geocoder, service.retry_policy()), overrides)
                    .with_country(service.country())
                    .with_nearby_max_distance_km(max_distance_km);

            if let Some(path) = reference {
                let zips = ZipTable::from_path(&path)?;
                log::info!("Loaded ZIP code data for nearby location lookup");
                resolver = resolver.with_reference_set(zips.reference_set());
            }

            let mut table = AddressTable::from_path(&input)?;
            let records = table.raw_addresses();
            let mut options = service.batch_options();
            options.reresolve_existing = !keep_existing;

            if options.reresolve_existing {
                log::info!("Processing all {} addresses", records.len());
            }
            let report = resolve_batch(&resolver, &records, options).await;

            table.set_coordinates(report.outcomes.iter().map(RecordOutcome::coordinate));
            let output = output.unwrap_or(input);
            table.write_path(&output)?;
            log::info!("Wrote {}", output.display());

            println!();
            println!("Geocoding complete!");
            println!("{report}");
            println!(
                "Rows with coordinates in {}: {} of {}",
                output.display(),
                table.geocoded_count(),
                table.len()
            );
        }
        Commands::Clusters {
            input,
            analyses,
            output,
        } => {
            let analyses: Vec<AnalysisType> = if analyses.is_empty() {
                default_analysis_types()
            } else {
                analyses.into_iter().map(AnalysisType::new).collect()
            };

            let table = ZipTable::from_path(&input)?;
            let built = build_all(&table.cluster_members(&analyses));

            for (analysis, clusters) in &built {
                log::info!("Built {} {analysis} clusters", clusters.len());
            }

            let collection = to_feature_collection(built.values().flat_map(BTreeMap::values));
            let json = serde_json::to_string_pretty(&collection)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!(
                        "Wrote {} cluster boundaries to {}",
                        collection.features.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::AnalysisTypes => {
            for name in DEFAULT_ANALYSIS_TYPES {
                println!("{name}");
            }
        }
    }

    Ok(())
}
