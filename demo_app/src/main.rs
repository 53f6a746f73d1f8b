//! Scene objects demo
//!
//! Spawns a few animated characters plus a particle fountain and runs a
//! fixed-step simulation, logging entity statistics as it goes.
//!
//! Usage: `scene_demo [config.toml|config.ron]`

mod behaviours;
mod demo_config;

use behaviours::{Spawner, Wanderer, WandererArgs};
use demo_config::DemoConfig;
use scene_objects::config::{Config, ConfigError};
use scene_objects::foundation::logging;
use scene_objects::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_CONFIG: &str = "demo_app/config/demo.toml";

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

fn load_config() -> Result<DemoConfig, DemoError> {
    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);

    if path.exists() {
        let config = DemoConfig::load_from_file(&path)?;
        logging::init(&config.log_filter);
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    } else {
        let config = DemoConfig::default();
        logging::init(&config.log_filter);
        log::warn!("No configuration at {}, using defaults", path.display());
        Ok(config)
    }
}

fn build_scene(config: &DemoConfig) -> Result<EntityManager, DemoError> {
    let mut tree = NodeTree::new();
    let model = Arc::new(SkinnedModel::from_config(&mut tree, &config.model)?);
    log::info!("Model '{}' clips: {:?}", model.name(), model.clip_names());

    let mut manager = EntityManager::with_config(tree, config.manager.clone());
    let root = manager.scene().root();

    for character in &config.characters {
        let entity = manager.create_entity(root, &character.name)?;
        let (id, node) = (entity.id(), entity.node());
        let [x, y, z] = character.position;
        if let Some(transform) = manager.scene_mut().transform_mut(node) {
            *transform = Transform::from_position(Vec3::new(x, y, z));
        }

        manager.add_component::<SkinInstance>(id, Arc::clone(&model))?;
        manager.add_component::<Wanderer>(
            id,
            WandererArgs {
                idle_clip: character.idle_clip.clone(),
                walk_clip: character.walk_clip.clone(),
                interval: character.switch_interval,
                speed: character.walk_speed,
            },
        )?;
    }

    let fountain = manager.create_entity(root, "fountain")?.id();
    let spawner = &config.spawner;
    manager.add_component::<Spawner>(fountain, (spawner.interval, spawner.lifetime, spawner.max_alive))?;

    Ok(manager)
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    let mut manager = build_scene(&config)?;

    let step = 1.0 / config.frame_rate.max(1.0);
    let mut clock = FrameClock::new();
    let wall = std::time::Instant::now();

    log::info!("Simulating {} frames at {} fps", config.frames, config.frame_rate);
    for _ in 0..config.frames {
        manager.update(clock.advance(step))?;
    }

    let stats = manager.stats();
    log::info!(
        "Finished {} frames ({:.1}s simulated, {:.1} ms wall): {} entities, {} scene nodes",
        clock.frame_count(),
        clock.total_time(),
        wall.elapsed().as_secs_f64() * 1000.0,
        stats.entity_count,
        manager.scene().node_count()
    );

    for id in manager.ids() {
        let Some(entity) = manager.entity(id) else {
            continue;
        };
        let animation = entity
            .component::<SkinInstance>()
            .and_then(|skin| skin.current_animation())
            .unwrap_or("-");
        log::info!("  {:<10} components={} animation={}", entity.name(), entity.component_count(), animation);
    }
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        log::error!("Demo failed: {}", error);
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
