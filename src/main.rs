use chrono_tz::Tz;
use clap::{ArgAction, Parser};
use nearby_resources::config::{AppConfig, DEFAULT_API_BASE, MAX_LOCATION_DISTANCE_MILES, USE_STATIC_DATASET};
use nearby_resources::geo::Coordinate;
use nearby_resources::hours::{is_open_now, local_now, next_open_description};
use nearby_resources::location::{
    Acquisition, IpGeolocator, Liveness, ManualPosition, PositionProvider, PositionResolver, RegionCache,
};
use nearby_resources::ranking::{rank_with_distance, RankOptions, RankedLocation};
use nearby_resources::resources::ResourceSource;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Nearby: community resources around you
///
/// Finds food banks, shelters and other community resources near a position,
/// shows whether they are open, and can serve the same data as a JSON API.
///
/// Examples:
///   nearby
///   nearby --lat 37.7749 --lon -122.4194 --max-miles 50
///   nearby --open-now --tz America/Los_Angeles
///   nearby --static-only false --api-base http://localhost:8000/api
///   nearby --serve --port 8080
#[derive(Parser)]
#[command(name = "nearby", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90). Skips IP geolocation.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Hide locations farther than this many miles.
    #[arg(long, env = "NEARBY_MAX_MILES", default_value_t = MAX_LOCATION_DISTANCE_MILES)]
    max_miles: f64,

    /// Show every location regardless of distance.
    #[arg(long)]
    all: bool,

    /// Only show locations that are open right now.
    #[arg(long)]
    open_now: bool,

    /// IANA timezone for opening hours (e.g. America/Los_Angeles).
    #[arg(long, env = "NEARBY_TZ")]
    tz: Option<String>,

    /// Use the bundled dataset instead of the API.
    #[arg(long, env = "NEARBY_STATIC_ONLY", default_value_t = USE_STATIC_DATASET, action = ArgAction::Set)]
    static_only: bool,

    /// Base URL of the community-resources API.
    #[arg(long, env = "NEARBY_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Offline mode: use the cached region only, no geolocation.
    #[arg(long)]
    offline: bool,

    /// Region cache file (default ~/.nearby/last_region.json).
    #[arg(long)]
    cache_path: Option<PathBuf>,

    /// Print at most this many locations.
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Run the JSON API instead of printing a list.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Log filter when RUST_LOG is unset (e.g. "debug", "nearby_resources=trace").
    #[arg(long, env = "NEARBY_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
struct ListedLocation {
    #[serde(flatten)]
    ranked: RankedLocation,
    is_open: bool,
    status: String,
    next_open: String,
}

#[derive(Serialize)]
struct Output {
    position: Acquisition,
    source: String,
    tz: String,
    locations: Vec<ListedLocation>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = build_config(&cli);
    let resources = ResourceSource::new(&config).load();

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = runtime.block_on(nearby_resources::server::start(&cli.host, cli.port, resources, config)) {
            eprintln!("Error: Server failed on {}:{}: {}", cli.host, cli.port, e);
            std::process::exit(1);
        }
        return;
    }

    // ── Acquire position ────────────────────────────────────────

    let cache = match &config.cache_path {
        Some(p) => RegionCache::load_from(p.clone()),
        None => RegionCache::load(),
    };
    let mut resolver = PositionResolver::with_cache(cache);
    resolver.set_offline(cli.offline);

    let provider: Box<dyn PositionProvider> = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => {
            let at = Coordinate::validated(lat, lon).unwrap_or_else(|e| {
                eprintln!("Error: Invalid coordinates ({}). Lat: -90..90, Lon: -180..180", e);
                std::process::exit(1);
            });
            Box::new(ManualPosition(at))
        }
        _ => Box::new(IpGeolocator::default()),
    };

    let position = resolver.acquire_with(provider.as_ref(), &Liveness::new(), |fix| {
        tracing::info!(accuracy = %fix.accuracy, "position updated");
    });

    // ── Rank ────────────────────────────────────────────────────

    let now = local_now(config.timezone);
    let options = RankOptions {
        max_distance_miles: config.max_distance_miles,
        nearby_only: !cli.all,
        open_at: cli.open_now.then_some(now),
    };

    let mut ranked = rank_with_distance(&resources.records, position.region.center(), &options);
    if let Some(n) = cli.limit {
        ranked.truncate(n);
    }

    let locations: Vec<ListedLocation> = ranked
        .into_iter()
        .map(|ranked| {
            let hours = ranked.record.hours.as_ref();
            let open = is_open_now(hours, now);
            let next_open = next_open_description(hours, now);
            ListedLocation {
                is_open: open.is_open,
                status: open.status,
                next_open,
                ranked,
            }
        })
        .collect();

    // ── Output ──────────────────────────────────────────────────

    eprint!("{}", render_list(&position, &locations, resources.origin.to_string().as_str()));

    let output = Output {
        position,
        source: resources.origin.to_string(),
        tz: config.timezone.name().to_string(),
        locations,
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Cannot serialize output: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> AppConfig {
    let timezone = match &cli.tz {
        Some(tz_str) => tz_str.parse::<Tz>().unwrap_or_else(|_| {
            eprintln!("Error: Unknown timezone '{}'. Use IANA format (e.g. America/Los_Angeles).", tz_str);
            std::process::exit(1);
        }),
        None => AppConfig::default().timezone,
    };

    if !cli.max_miles.is_finite() || cli.max_miles < 0.0 {
        eprintln!("Error: --max-miles must be a non-negative number");
        std::process::exit(1);
    }

    AppConfig {
        static_only: cli.static_only,
        max_distance_miles: cli.max_miles,
        api_base_url: cli.api_base.clone(),
        cache_path: cli.cache_path.clone(),
        timezone,
        ..AppConfig::default()
    }
}

fn render_list(position: &Acquisition, locations: &[ListedLocation], source: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  \u{1F4CD} {:.4}, {:.4} ({})\n",
        position.region.latitude, position.region.longitude, position.accuracy
    ));
    if let Some(status) = &position.status {
        out.push_str(&format!("  \u{26A0}\u{FE0F}  {}\n", status));
    }
    out.push_str(&format!("  {} location(s) from {}\n\n", locations.len(), source));

    for (i, l) in locations.iter().enumerate() {
        let marker = if l.is_open { "\u{25CF}" } else { "\u{25CB}" };
        out.push_str(&format!(
            "  {:>2}. {} {:<40} {:>7.1} mi\n",
            i + 1,
            marker,
            l.ranked.record.title,
            l.ranked.distance_miles
        ));
        out.push_str(&format!("        {}\n", l.ranked.record.address));
        out.push_str(&format!("        {}\n", l.next_open));
    }
    out
}
