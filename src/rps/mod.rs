//! Rock-Paper-Scissors with stakes as a reference game.
//!
//! Each player's move is a factored two-dimensional action: a throw and a
//! stake. Scissors outcomes are worth more (`ASYMMETRIC_UTILITY`), and the
//! larger stake scales the result.
//!
//! - [`RpsThrow`], [`RpsStake`] — Action dimensions
//! - [`RpsState`] — P1 to act, or P2 to act with P1's move face up
//! - [`Rps`] — The [`Game`](crate::Game) wiring

mod edge;
mod game;
mod state;

pub use edge::*;
pub use game::*;
pub use state::*;
