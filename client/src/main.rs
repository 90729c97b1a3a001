use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use cragclient::{ClientConfig, FunctionsClient, Geocoder, HoldDetector, RestGateway, SecretsClient};
use cragcore::math::GeoHelper;
use cragcore::proximity::distance_km;
use cragcore::view::{AttemptsView, FeedbackView, LocationsView, Notice};
use cragcore::{Coordinate, Session, SessionStore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use uuid::Uuid;

const TOKEN_ENV: &str = "CRAG_ACCESS_TOKEN";
const USER_ENV: &str = "CRAG_USER_ID";

#[derive(Parser)]
#[command(author, version, about = "Command-line client for the bouldering tracker")]
struct Args {
    /// Load the client config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the backend base URL
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List locations, nearest first when a position is given
    Locations {
        /// Reference position as `lat,lng`
        #[arg(long, value_parser = parse_coordinate)]
        near: Option<Coordinate>,
    },
    /// Show attempt statistics
    Stats {
        #[arg(long)]
        location: Option<Uuid>,
    },
    /// Show approved feedback
    Feedback,
    /// Detect holds in a JPEG and print them as JSON
    Detect { image: PathBuf },
    /// Resolve a `lat,lng` position to an address
    Geocode {
        #[arg(value_parser = parse_coordinate)]
        position: Coordinate,
    },
}

fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lng`, got `{}`", raw))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("bad latitude `{}`", lat))?;
    let lng: f64 = lng.trim().parse().map_err(|_| format!("bad longitude `{}`", lng))?;
    Ok(Coordinate::new(lat, lng))
}

fn session_from_env() -> anyhow::Result<SessionStore> {
    let store = SessionStore::new();
    if let (Ok(token), Ok(user)) = (std::env::var(TOKEN_ENV), std::env::var(USER_ENV)) {
        let user_id = Uuid::parse_str(&user).with_context(|| format!("parsing {}", USER_ENV))?;
        store.sign_in(Session::new(user_id, token));
    }
    Ok(store)
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        eprintln!("{:?}: {}", notice.level, notice.message);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    let session = session_from_env()?;

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating client runtime")?;

    runtime.block_on(async move {
        let functions = FunctionsClient::new(&config, session.clone());
        let gateway = Arc::new(RestGateway::new(&config, session));

        match args.command {
            Command::Locations { near } => {
                let mut view = LocationsView::new(gateway);
                if !view.load().await {
                    print_notices(view.take_notices());
                    bail!("could not load locations");
                }
                let locations = match near {
                    Some(reference) => view.nearest_first(reference),
                    None => view.locations().to_vec(),
                };
                for location in &locations {
                    let distance = near
                        .and_then(|reference| distance_km(reference, location))
                        .map(GeoHelper::distance_label)
                        .unwrap_or_default();
                    println!(
                        "{}\t{:?}\t{}\t{}",
                        location.name, location.kind, location.owner_name, distance
                    );
                }
            }
            Command::Stats { location } => {
                let mut view = AttemptsView::new(gateway);
                let loaded = view.set_filter(location, None).await;
                print_notices(view.take_notices());
                if !loaded {
                    bail!("could not load statistics");
                }
                println!("{}", serde_json::to_string_pretty(view.stats())?);
            }
            Command::Feedback => {
                let mut view = FeedbackView::new(gateway);
                if !view.load().await {
                    print_notices(view.take_notices());
                    bail!("could not load feedback");
                }
                for entry in view.approved() {
                    println!("{}/5\t{:?}\t{}", entry.rating, entry.category, entry.message);
                }
                if let Some(average) = view.average_rating() {
                    println!("average {:.1}", average);
                }
            }
            Command::Detect { image } => {
                let jpeg = fs::read(&image)
                    .with_context(|| format!("reading image {}", image.display()))?;
                let holds = HoldDetector::new(functions).detect_jpeg(&jpeg).await;
                println!("{}", serde_json::to_string_pretty(&holds)?);
            }
            Command::Geocode { position } => {
                let secrets = SecretsClient::new(functions);
                let geocoder = Geocoder::from_secrets(&config.geocode, &secrets).await;
                println!("{}", geocoder.reverse(position).await);
            }
        }
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
