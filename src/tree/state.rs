use crate::*;
use petgraph::graph::NodeIndex;

/// What the acting player observes. States with equal information sets
/// share one [`ActionSchema`], and therefore one set of policies.
pub trait InfoSet: Clone + Eq + std::hash::Hash + std::fmt::Debug {}

/// A decision point of a game.
pub trait State: Clone + std::fmt::Debug {
    type I: InfoSet;
    fn player(&self) -> Player;
    fn info(&self) -> Self::I;
}

/// The environment a [`Tree`] is grown against.
///
/// # Required Methods
///
/// - `players()` — Width of every payoff vector
/// - `start(options)` — Initial decision point
/// - `layout(info)` — Composite action available at an information set
/// - `act(state, values)` — Immediate reward and successor, `None` when terminal
pub trait Game {
    type S: State;
    fn players(&self) -> usize;
    fn start(&self, options: &Options) -> anyhow::Result<Self::S>;
    fn layout(&self, info: &<Self::S as State>::I) -> Layout;
    fn act(&self, state: &Self::S, values: &[Value]) -> anyhow::Result<(Payoff, Option<Self::S>)>;
}

/// A game state in the arena, bound to the schema of its information set.
#[derive(Debug, Clone)]
pub struct StateNode<S>
where
    S: State,
{
    pub state: S,
    pub info: S::I,
    pub schema: NodeIndex,
}

/// One transition of an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub node: NodeIndex,
    pub values: Vec<Value>,
    pub reward: Payoff,
}

/// Transitions taken by one rollout, root first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory(Vec<Step>);

impl Trajectory {
    pub fn push(&mut self, node: NodeIndex, values: Vec<Value>, reward: Payoff) {
        self.0.push(Step {
            node,
            values,
            reward,
        });
    }
    pub fn steps(&self) -> &[Step] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Undiscounted sum of rewards.
    pub fn total(&self, players: usize) -> Payoff {
        self.0
            .iter()
            .map(|s| s.reward.clone())
            .fold(Payoff::zeros(players), |acc, r| acc + r)
    }
}
