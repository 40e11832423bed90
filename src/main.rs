//! mazeway: walk a procedurally carved 3D maze.
//!
//! The maze is carved at startup by a randomized depth-first search, an exit is cut into its
//! outer wall, and the open cells are dressed with poster sculptures and small figures.
//! Sculptures shatter after a few clicks and play their soundtrack; figures open a preview card;
//! clicking the exit lifts the walls away.
//!
//! # Architecture
//! - `maze/`: grid, carving, exit selection and placement sampling
//! - `game/`: the session with its entities, collision, player, interaction rules and audio
//! - `renderer/`: wgpu scene, preview and text passes
//! - `app/`: winit event routing and the frame loop
//! - `config`: RON configuration with defaults
//!
//! # Usage
//! Run the binary. `MAZEWAY_CONFIG` names a RON config file; otherwise `mazeway.ron` in the
//! working directory is used when present, and the built-in defaults when not.

pub mod app;
pub mod assets;
pub mod config;
pub mod game;
pub mod math;
pub mod maze;
pub mod renderer;
pub mod ui;

use crate::config::GameConfig;
use crate::game::Session;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

const CONFIG_ENV: &str = "MAZEWAY_CONFIG";
const DEFAULT_CONFIG: &str = "mazeway.ron";

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();
    tracing_subscriber::fmt::init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = GameConfig::load(&path)?;

    let mut rng = match config.seed {
        Some(seed) => {
            tracing::info!("using seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let session = Session::new(config, &mut rng)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(session);
    event_loop.run_app(&mut app)?;
    Ok(())
}
