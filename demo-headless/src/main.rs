use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wildfire_map_core::site::parse_day;
use wildfire_map_core::{
    BoundingBox, ConfigError, EngineConfig, FileStore, FrameSnapshot, GeoPoint, MapEngine,
    MemoryStore, Meters, SimulationStore, SiteData, METERS_PER_DEGREE,
};

/// Headless driver for the wildfire map engine
#[derive(Parser, Debug)]
#[command(name = "wildfire-map-demo")]
#[command(about = "Run the wildfire map engine against a fixed viewport", long_about = None)]
struct Args {
    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site data file with perimeters and firewalls (JSON)
    #[arg(short, long)]
    site: Option<PathBuf>,

    /// Directory for persisted simulation results (in-memory when omitted)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Camera center latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Camera center longitude
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Grid spacing in meters (5-50)
    #[arg(short, long)]
    grid_size: Option<f64>,

    /// Wind speed in m/s (switches weather to manual)
    #[arg(short, long)]
    wind_speed: Option<f64>,

    /// Wind direction in degrees, 0 = north, clockwise (switches weather to manual)
    #[arg(long)]
    wind_direction: Option<f64>,

    /// Width and height of the simulated viewport in meters
    #[arg(long, default_value_t = 200.0)]
    span: f64,

    /// Number of grid vertices to mark as ignition points
    #[arg(short, long, default_value_t = 3)]
    ignitions: usize,

    /// Project from this day's perimeter (YYYY-MM-DD) instead of ignition points
    #[arg(short, long)]
    day: Option<String>,

    /// Seed for reproducible jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Time step in seconds
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Print the final frame snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = build_config(args)?;
    let site = match &args.site {
        Some(path) => SiteData::load(path)?,
        None => SiteData::default(),
    };
    let store: Box<dyn SimulationStore> = match &args.store_dir {
        Some(dir) => Box::new(FileStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    };

    let viewport = viewport_around(config.center, args.span);
    let mut engine = MapEngine::new(config, store).with_site(site);
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }

    engine.attach(&viewport);
    engine.on_idle(&viewport);
    info!(
        "Viewport {:.6}..{:.6} N, {:.6}..{:.6} E: {} vertices",
        viewport.south,
        viewport.north,
        viewport.west,
        viewport.east,
        engine.grid().vertices.len()
    );

    let started = match &args.day {
        Some(key) => {
            let Some(day) = parse_day(key) else {
                return Err(ConfigError::ParseFailed(format!("invalid day '{key}'")).into());
            };
            if !engine.select_day(day) {
                return Err(ConfigError::LoadFailed(format!("no perimeter for {day}")).into());
            }
            engine.process_perimeter()
        }
        None => {
            mark_ignitions(&mut engine, args.ignitions);
            engine.process()
        }
    };
    if !started {
        warn!("Simulation did not start");
    }

    let dt = if args.dt > 0.0 { args.dt } else { 0.1 };
    let mut elapsed = 0.0;
    while engine.is_processing() && elapsed < 60.0 {
        engine.update(dt, &viewport);
        elapsed += dt;
    }

    let snapshot = engine.snapshot();
    if args.json {
        println!("{}", render_json(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<EngineConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    if let Some(lat) = args.lat {
        config.center.lat = lat;
    }
    if let Some(lng) = args.lng {
        config.center.lng = lng;
    }
    if let Some(size) = args.grid_size {
        config.grid_size = Meters::new(size);
    }
    if let Some(speed) = args.wind_speed {
        config.weather.auto = false;
        config.weather.set_wind_speed(speed);
    }
    if let Some(direction) = args.wind_direction {
        config.weather.auto = false;
        config.weather.set_wind_direction(direction);
    }
    Ok(config.normalized())
}

/// Square viewport `span_m` meters across, centered on `center`
fn viewport_around(center: GeoPoint, span_m: f64) -> BoundingBox {
    let half_lat = span_m * 0.5 / METERS_PER_DEGREE;
    let half_lng = span_m * 0.5 / (METERS_PER_DEGREE * center.lat.to_radians().cos()).max(1.0);
    BoundingBox::new(
        center.lat + half_lat,
        center.lat - half_lat,
        center.lng + half_lng,
        center.lng - half_lng,
    )
}

/// Select `count` vertices spread evenly through the grid
fn mark_ignitions(engine: &mut MapEngine, count: usize) {
    let vertices = engine.grid().vertices.clone();
    if vertices.is_empty() || count == 0 {
        return;
    }
    let count = count.min(vertices.len());
    for i in 0..count {
        let idx = (2 * i + 1) * vertices.len() / (2 * count);
        engine.toggle_point(vertices[idx]);
    }
}

fn render_json(snapshot: &FrameSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

fn print_summary(snapshot: &FrameSnapshot) {
    println!("=== Wildfire Map ===\n");
    println!("Center: {} (zoom {:.1})", snapshot.center, snapshot.zoom);
    println!(
        "Grid: {} h-lines, {} v-lines, {} vertices",
        snapshot.grid.h_lines.len(),
        snapshot.grid.v_lines.len(),
        snapshot.grid.vertices.len()
    );
    println!(
        "Weather: wind {} m/s toward {}, {}, humidity {}{}",
        snapshot.weather.wind_speed.value(),
        snapshot.weather.wind_direction,
        snapshot.weather.temperature,
        snapshot.weather.humidity,
        if snapshot.weather.auto { " (auto)" } else { "" }
    );
    if let Some(day) = snapshot.day {
        println!("Perimeter {}: {} points", day, snapshot.perimeter.len());
    }
    if let Some(radar) = snapshot.radar {
        println!(
            "Radar: {} radius {:.0} m",
            radar.center, radar.radius_meters
        );
    }

    println!("\nIgnition points ({}):", snapshot.selection.len());
    for p in &snapshot.selection {
        println!("  {p}");
    }

    println!("\nFire vectors ({}):", snapshot.fire_vectors.len());
    for v in &snapshot.fire_vectors {
        println!("  {} -> {}", v.start, v.end);
    }

    println!("\nAction plans ({}):", snapshot.action_plans.len());
    for plan in &snapshot.action_plans {
        println!("  [{}] {}", plan.at, plan.summary);
    }

    if !snapshot.firewalls.is_empty() {
        println!("\nFirewalls ({}):", snapshot.firewalls.len());
        for p in &snapshot.firewalls {
            println!("  {p}");
        }
    }
}
