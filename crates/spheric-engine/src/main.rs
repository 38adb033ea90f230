//! World engine binary for the Spheric simulation.
//!
//! Wires together configuration, the `PostgreSQL`/`Dragonfly` data
//! layer, the generated (and possibly reloaded) world, the observer API
//! server, and the tick loop. Runs until a termination condition is met
//! (spec.md 6.1, 6.3).
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging
//! 2. Load configuration
//! 3. Connect to `PostgreSQL`, run migrations, connect to `Dragonfly`
//! 4. Look up or create the world row, generate the world with its seed
//! 5. Overlay any saved tile resources and buildings onto the generated world
//! 6. Spawn the observer API server
//! 7. Spawn the background persistence task
//! 8. Run the tick loop until a termination condition is met

mod error;
mod load;
mod observer_callback;
mod persistence;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use spheric_core::config::SimulationConfig;
use spheric_core::operator::OperatorState;
use spheric_core::runner;
use spheric_core::tick::SimulationState;
use spheric_db::{DragonflyPool, PostgresPool, WorldRepository};
use spheric_observer::AppState;
use spheric_world::{generate_world, WorldStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::EngineCallback;
use crate::persistence::PersistenceHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("spheric-engine starting");

    let config = load_config().context("loading configuration")?;
    info!(
        world_name = config.world.name,
        seed = config.world.world_seed,
        tick_period_ms = config.world.tick_period_ms,
        "Configuration loaded"
    );

    let postgres = PostgresPool::connect_url(&config.infrastructure.postgres_url)
        .await
        .map_err(EngineError::from)
        .context("connecting to PostgreSQL")?;
    postgres.run_migrations().await.map_err(EngineError::from).context("running migrations")?;

    let dragonfly = Arc::new(
        DragonflyPool::connect(&config.infrastructure.dragonfly_url)
            .await
            .map_err(EngineError::from)
            .context("connecting to Dragonfly")?,
    );

    let repo = WorldRepository::new(postgres.pool());
    let world_row = repo
        .create_or_get_world(&config.world.name, config.world.world_seed, config.world.subdivisions)
        .await
        .map_err(EngineError::from)
        .context("looking up or creating the world row")?;
    let world_seed = u64::try_from(world_row.seed).unwrap_or(config.world.world_seed);

    let mut world_store = WorldStore::new();
    generate_world(world_seed, &mut world_store);
    load::overlay_saved_state(&repo, world_row.id, &mut world_store)
        .await
        .context("overlaying saved tiles and buildings")?;
    info!(
        tiles = world_store.tile_count(),
        buildings = world_store.building_count(),
        "World ready"
    );

    let mut sim_state = SimulationState::new(world_store, world_seed);

    let operator = Arc::new(OperatorState::new(config.world.tick_period_ms, &config.simulation));
    let app_state = Arc::new(AppState::with_operator(Arc::clone(&operator)));

    spheric_observer::spawn_observer(config.infrastructure.observer_port, Arc::clone(&app_state))
        .await
        .map_err(|source| EngineError::Observer { message: source.to_string() })
        .context("starting the observer API server")?;
    info!(port = config.infrastructure.observer_port, "Observer API server started");

    let (persistence_handle, _persistence_task) =
        PersistenceHandle::spawn(postgres.pool().clone(), world_row.id);

    let ledger_batch_size = usize::try_from(config.logging.event_store_batch_size).unwrap_or(usize::MAX);
    let mut callback = EngineCallback::new(
        app_state,
        dragonfly,
        Arc::new(persistence_handle),
        world_row.id,
        config.world.save_interval_ticks,
        ledger_batch_size,
    );

    info!("Simulation state assembled, entering tick loop");

    let result = runner::run_simulation(&mut sim_state, &operator, &mut callback)
        .await
        .map_err(EngineError::from)
        .context("running the simulation")?;

    runner::log_simulation_end(&result);
    info!(end_reason = ?result.end_reason, total_ticks = result.total_ticks, "spheric-engine shutdown complete");

    Ok(())
}

/// Load simulation configuration from `spheric-config.yaml` relative to
/// the current working directory, falling back to defaults if absent.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("spheric-config.yaml");
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
