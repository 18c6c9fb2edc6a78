use crate::*;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use std::collections::HashSet;

/// Payoffs computed during one sampling episode.
///
/// Sampling a chance node or an action schema forgets the affected
/// entries; a fresh `Memo` starts a new episode. Nodes whose payoff is
/// still being computed are tracked so that a request re-entering one of
/// them is reported instead of recursing forever.
#[derive(Debug, Default, Clone)]
pub struct Memo {
    payoffs: HashMap<NodeIndex, Payoff>,
    pending: HashSet<NodeIndex>,
}

impl Memo {
    pub fn get(&self, node: NodeIndex) -> Option<&Payoff> {
        self.payoffs.get(&node)
    }
    pub fn forget(&mut self, node: NodeIndex) {
        self.payoffs.remove(&node);
    }
    pub fn clear(&mut self) {
        self.payoffs.clear();
        self.pending.clear();
    }
    pub fn len(&self) -> usize {
        self.payoffs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.payoffs.is_empty()
    }
    pub fn store(&mut self, node: NodeIndex, payoff: Payoff) {
        self.payoffs.insert(node, payoff);
    }
    /// Mark a node as being computed.
    pub fn enter(&mut self, node: NodeIndex) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.pending.insert(node),
            "cyclic payoff dependency through node {}",
            node.index()
        );
        Ok(())
    }
    /// Finish a node: memoize and hand back its payoff.
    pub fn leave(&mut self, node: NodeIndex, payoff: Payoff) -> Payoff {
        self.pending.remove(&node);
        self.payoffs.insert(node, payoff.clone());
        payoff
    }
    /// Abandon a node whose computation failed.
    pub fn abort(&mut self, node: NodeIndex) {
        self.pending.remove(&node);
    }
}
