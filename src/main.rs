use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scenes_engine::background_jobs::jobs::{RecommendationCacheCleanupJob, RelationshipRebuildJob};
use scenes_engine::background_jobs::{JobContext, JobScheduler};
use scenes_engine::config::{AppConfig, CliConfig, FileConfig};
use scenes_engine::seed_import::{import_seed, load_seed};
use scenes_engine::{
    metrics, HttpSignalsClient, RecommendationEngine, RelationshipEngine, SceneStore,
    SignalAdapters, SqliteScenesStore,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "scenes-engine")]
#[command(about = "Scene relationship graph and scene recommendations")]
struct CliArgs {
    /// Path to the SQLite scenes database file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Base URL of the signals service. Without it every external signal is unavailable.
    #[clap(long)]
    pub signals_url: Option<String>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Print metrics in the Prometheus text format before exiting.
    #[clap(long, default_value_t = false)]
    pub print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Imports scenes, microgenres and memberships from a JSON seed file.
    Import {
        #[clap(value_parser = parse_path)]
        seed: PathBuf,
    },

    /// Rebuilds the relationships between all scene pairs.
    Rebuild,

    /// Shows the relationships of a scene.
    Relationships { scene: String },

    /// Shows the cluster around a scene.
    Cluster {
        scene: String,

        /// Number of hops to expand, defaults to the configured cluster depth.
        #[clap(long)]
        depth: Option<usize>,
    },

    /// Recommends scenes to a user.
    RecommendUser { user_id: String },

    /// Recommends scenes and microgenres to an artist.
    RecommendArtist { artist: String },

    /// Recommends microgenres to an artist.
    Microgenres { artist: String },

    /// Shows the hottest scenes.
    Trending {
        #[clap(long, default_value_t = 10)]
        limit: usize,
    },

    /// Shows the fastest growing emerging scenes.
    Emerging {
        #[clap(long, default_value_t = 3)]
        limit: usize,
    },

    /// Runs the background jobs until Ctrl-C.
    Watch,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        signals_url: cli_args.signals_url.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    metrics::init_metrics();

    info!("Opening scenes database at {:?}...", config.db_path);
    let store: Arc<dyn SceneStore> = Arc::new(SqliteScenesStore::new(&config.db_path)?);

    let signals = match &config.signals_url {
        Some(url) => {
            info!("Using signals service at {}", url);
            let client = HttpSignalsClient::new(url, config.adapters.http_timeout_sec)?;
            SignalAdapters::from_single(Arc::new(client))
        }
        None => {
            warn!("No signals service configured, external signals are unavailable");
            SignalAdapters::unavailable()
        }
    };

    let relationship_engine = RelationshipEngine::new(
        Arc::clone(&store),
        signals.clone(),
        config.relationships.clone(),
        config.adapters.call_timeout,
    );
    let recommendation_engine = RecommendationEngine::new(
        Arc::clone(&store),
        signals,
        config.recommendations.clone(),
        config.adapters.call_timeout,
    );

    match cli_args.command {
        Command::Import { seed } => {
            let seed = load_seed(&seed)?;
            let summary = import_seed(store.as_ref(), &seed);
            println!(
                "Imported {} scenes, {} microgenres, {} memberships ({} rejected)",
                summary.scenes, summary.microgenres, summary.memberships, summary.rejected
            );
        }
        Command::Rebuild => {
            let report = relationship_engine.rebuild_scene_relationships().await;
            println!(
                "Analyzed {} pairs ({} failed), stored {} relationships",
                report.pairs_analyzed, report.pairs_failed, report.edges_upserted
            );
        }
        Command::Relationships { scene } => {
            print_json(&relationship_engine.get_scene_relationships(&scene))?;
        }
        Command::Cluster { scene, depth } => {
            let depth = depth.unwrap_or(config.relationships.default_cluster_depth);
            print_json(&relationship_engine.get_scene_cluster(&scene, depth))?;
        }
        Command::RecommendUser { user_id } => {
            print_json(&recommendation_engine.recommend_scenes_for_user(&user_id).await)?;
        }
        Command::RecommendArtist { artist } => {
            print_json(&recommendation_engine.recommend_scenes_for_artist(&artist).await)?;
        }
        Command::Microgenres { artist } => {
            print_json(
                &recommendation_engine
                    .recommend_microgenres_for_artist(&artist)
                    .await,
            )?;
        }
        Command::Trending { limit } => {
            print_json(&recommendation_engine.get_global_trending_scenes(limit).await)?;
        }
        Command::Emerging { limit } => {
            print_json(&recommendation_engine.get_emerging_scenes(limit).await)?;
        }
        Command::Watch => {
            let shutdown_token = CancellationToken::new();
            let job_context = JobContext::new(
                shutdown_token.child_token(),
                Arc::clone(&store),
                relationship_engine.clone(),
                tokio::runtime::Handle::current(),
            );

            let mut scheduler = JobScheduler::new(shutdown_token.clone(), job_context);
            scheduler.register_job(Arc::new(RelationshipRebuildJob::new(
                config.jobs.rebuild_interval_hours,
            )));
            scheduler.register_job(Arc::new(RecommendationCacheCleanupJob::new(
                config.jobs.cache_cleanup_interval_hours,
            )));

            let scheduler_task = tokio::spawn(async move { scheduler.run().await });

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            info!("Received Ctrl-C, shutting down...");
            shutdown_token.cancel();
            scheduler_task.await?;
        }
    }

    if cli_args.print_metrics {
        print!("{}", metrics::render_metrics());
    }

    Ok(())
}
