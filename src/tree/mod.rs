//! Game-tree arena with chance nodes, factored action schemas and states.
//!
//! This module holds the two recursive algorithms of the crate:
//! - payoff propagation, memoized per episode in a [`Memo`]
//! - policy improvement, a regret-matching step at every [`ChanceNode`]
//!
//! A [`Game`] supplies states, information sets and per-infoset
//! [`Layout`]s; the [`Tree`] does the rest.

mod chance;
mod memo;
mod payoff;
mod schema;
mod state;
mod tree;
mod vertex;

pub use chance::*;
pub use memo::*;
pub use payoff::*;
pub use schema::*;
pub use state::*;
pub use tree::*;
pub use vertex::*;
