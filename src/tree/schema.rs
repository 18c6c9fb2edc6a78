use crate::*;
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

/// Declarative shape of a composite action, as a game describes it.
///
/// Members are chance nodes addressed by their position in the layout.
/// Routes say which member is visited next given the value just drawn at
/// a member; a default route applies to every value without an explicit
/// one. Members with no outgoing route end the composite action.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    members: Vec<(Distribution, Option<Distribution>)>,
    routes: BTreeMap<(usize, Value), usize>,
    defaults: BTreeMap<usize, usize>,
    root: usize,
}

impl Layout {
    /// Add a member sampled from its own on-policy distribution.
    pub fn member(&mut self, on_policy: Distribution) -> usize {
        self.members.push((on_policy, None));
        self.members.len() - 1
    }
    /// Add a member sampled from a behavior distribution.
    pub fn explored(&mut self, on_policy: Distribution, off_policy: Distribution) -> usize {
        self.members.push((on_policy, Some(off_policy)));
        self.members.len() - 1
    }
    pub fn route(mut self, from: usize, value: Value, to: usize) -> Self {
        self.routes.insert((from, value), to);
        self
    }
    pub fn follow(mut self, from: usize, to: usize) -> Self {
        self.defaults.insert(from, to);
        self
    }
    pub fn root(mut self, root: usize) -> Self {
        self.root = root;
        self
    }
    pub fn n(&self) -> usize {
        self.members.len()
    }

    fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.routes
            .iter()
            .map(|((from, _), to)| (*from, *to))
            .chain(self.defaults.iter().map(|(from, to)| (*from, *to)))
    }

    /// Indices in range and routes acyclic.
    pub fn validate(&self) -> anyhow::Result<()> {
        let n = self.n();
        anyhow::ensure!(n > 0, "layout has no members");
        anyhow::ensure!(self.root < n, "root {} outside {} members", self.root, n);
        for (from, to) in self.edges() {
            anyhow::ensure!(from < n && to < n, "route {} -> {} outside {} members", from, to, n);
        }
        let mut indegree = vec![0usize; n];
        let mut outgoing = vec![Vec::new(); n];
        for (from, to) in self.edges() {
            indegree[to] += 1;
            outgoing[from].push(to);
        }
        let mut ready = (0..n).filter(|i| indegree[*i] == 0).collect::<Vec<_>>();
        let mut seen = 0;
        while let Some(i) = ready.pop() {
            seen += 1;
            for &j in outgoing[i].iter() {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    ready.push(j);
                }
            }
        }
        anyhow::ensure!(seen == n, "layout routes contain a cycle");
        Ok(())
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Vec<(Distribution, Option<Distribution>)>,
        BTreeMap<(usize, Value), usize>,
        BTreeMap<usize, usize>,
        usize,
    ) {
        (self.members, self.routes, self.defaults, self.root)
    }
}

/// A composite action factored into member chance nodes of the arena.
///
/// Leaves are members that end the composite action; every other member
/// is intermediate and routes each drawn value to another member.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSchema {
    pub(crate) members: Vec<NodeIndex>,
    pub(crate) leaves: Vec<NodeIndex>,
    pub(crate) routes: BTreeMap<(NodeIndex, Value), NodeIndex>,
    pub(crate) defaults: BTreeMap<NodeIndex, NodeIndex>,
    pub(crate) root: NodeIndex,
    pub(crate) player: Player,
}

impl ActionSchema {
    pub fn members(&self) -> &[NodeIndex] {
        &self.members
    }
    pub fn leaves(&self) -> &[NodeIndex] {
        &self.leaves
    }
    pub fn root(&self) -> NodeIndex {
        self.root
    }
    pub fn player(&self) -> Player {
        self.player
    }
    pub fn is_leaf(&self, member: NodeIndex) -> bool {
        self.leaves.contains(&member)
    }
    /// Member visited after drawing `value` at `member`, if any.
    pub fn next(&self, member: NodeIndex, value: &Value) -> anyhow::Result<Option<NodeIndex>> {
        if let Some(next) = self.routes.get(&(member, *value)) {
            return Ok(Some(*next));
        }
        if let Some(next) = self.defaults.get(&member) {
            return Ok(Some(*next));
        }
        anyhow::ensure!(
            self.is_leaf(member),
            "value {} has no route from member {}",
            value,
            member.index()
        );
        Ok(None)
    }
}

/// Outcome of sampling one composite action.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampled {
    pub probabilities: Vec<Probability>,
    pub importances: Vec<Probability>,
    pub values: Vec<Value>,
    /// Member that drew the final value.
    pub last: NodeIndex,
    /// Node reached by this composite action when it was seen before.
    pub next: Option<NodeIndex>,
}
