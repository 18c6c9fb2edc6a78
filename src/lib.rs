//! Importance-sampled game trees for extensive-form games with chance
//! transitions and factored, multi-dimensional actions.
//!
//! # Module Structure
//!
//! - `distribution` — Discrete and continuous action/outcome distributions
//! - `gradient` — Quasi-Newton displacement used as a bounded gradient estimate
//! - `tree` — Arena of chance nodes, action schemas and state nodes
//! - `save` — Parameter checkpoints
//! - `config` — Options forwarded to games and estimators
//! - `rps` — Rock-Paper-Scissors with stakes, a reference game
//!
//! # Usage
//!
//! A driver grows a [`Tree`] one [`Tree::episode`] at a time and
//! periodically calls [`Tree::optimize`] to back-propagate payoffs and
//! move every chance node's on-policy distribution toward the actions with
//! positive realized advantage.

mod config;
mod distribution;
mod gradient;
mod rps;
mod save;
mod tree;

pub use config::*;
pub use distribution::*;
pub use gradient::*;
pub use rps::*;
pub use save::*;
pub use tree::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Expected values, rewards and payoffs.
pub type Utility = f32;
/// Sampling weights, policy entries and importance ratios.
pub type Probability = f32;
/// Seat index of the acting player.
pub type Player = usize;

// ============================================================================
// QUASI-NEWTON GRADIENT ESTIMATION
// Iteration and line-search budgets scale with the parameter count.
// ============================================================================
/// Default budget multiplier: iterations = parameters × cover factor.
pub const PARAM_COVER_FACTOR: f32 = 8.0;
/// Number of (s, y) correction pairs kept by L-BFGS.
pub const LBFGS_MEMORY: usize = 10;
/// Early stopping threshold on gradient norm and relative objective change.
pub const LBFGS_TOLERANCE: f32 = 1e-7;
/// Sufficient decrease constant of the Armijo condition.
pub const LBFGS_ARMIJO: f32 = 1e-4;
/// Step shrink factor between line-search trials.
pub const LBFGS_BACKTRACK: f32 = 0.5;

// ============================================================================
// CONTINUOUS DISTRIBUTIONS
// ============================================================================
/// Floor added to the softplus scale so a fit never collapses to a point mass.
pub const SCALE_MIN: f32 = 1e-3;

// ============================================================================
// TREE GROWTH
// ============================================================================
/// Maximum number of state transitions in a single episode.
pub const MAX_EPISODE_DEPTH: usize = 1 << 16;

// ============================================================================
// REFERENCE GAME
// ============================================================================
/// Asymmetric payoff for any RPS outcome involving Scissors.
pub const ASYMMETRIC_UTILITY: Utility = 2.0;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])?;
    Ok(())
}
