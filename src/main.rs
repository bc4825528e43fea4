use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use comps_api::{ApiState, RestApi};
use comps_engine::{
    BaselineModel, DistanceScales, EstimatorConfig, FeatureWeights, SelectorConfig,
    SimilarityEngine, DEFAULT_K, DEFAULT_MAX_CANDIDATES, DEFAULT_MIN_SIMILARITY,
};
use comps_store::StoreManager;

/// A comparable-sales valuation engine for residential listings
#[derive(Parser, Debug)]
#[command(name = "comps")]
#[command(about = "Comparable-sales valuation server", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Number of neighbors used per valuation
    #[arg(long, default_value_t = DEFAULT_K)]
    k: usize,

    /// Minimum similarity a comparable must exceed
    #[arg(long, default_value_t = DEFAULT_MIN_SIMILARITY)]
    min_similarity: f64,

    /// Upper bound on candidates scored per request
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    max_candidates: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting comps v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);
    info!("HTTP API port: {}", args.http_port);
    info!(
        "Valuation: k={}, min_similarity={}, max_candidates={}",
        args.k, args.min_similarity, args.max_candidates
    );

    let store = Arc::new(StoreManager::open(&args.data_dir)?);
    info!("Store initialized with {} listings", store.count());

    let engine = SimilarityEngine::new(FeatureWeights::default(), DistanceScales::default())
        .map_err(comps_core::Error::from)?;
    let selector_config = SelectorConfig {
        k: args.k,
        max_candidates: args.max_candidates,
    };
    let estimator_config = EstimatorConfig {
        k: args.k,
        min_similarity: args.min_similarity,
        ..EstimatorConfig::default()
    };

    let state = ApiState::new(
        store.clone(),
        engine,
        selector_config,
        estimator_config,
        Box::new(BaselineModel::default()),
    );

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("comps started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Saving corpus before shutdown...");
    store.save()?;
    info!("Shutting down...");
    Ok(())
}
