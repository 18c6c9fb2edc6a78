use crate::*;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use std::collections::HashSet;

/// An incrementally grown game tree.
///
/// Every chance node, action schema, state and leaf lives in one petgraph
/// arena; edges run from a chance node to the child of each value it has
/// sampled and are labeled with that value. States that share an
/// information set share one [`ActionSchema`].
///
/// # Growth
///
/// - `start(game, options)` — Arena holding the initial state
/// - `episode(game, root, rng, memo)` — One rollout, registering new children
///
/// # Evaluation
///
/// - `payoff(node, discount, memo)` — Importance- and visit-weighted average payoff
/// - `optimize(discount)` — Regret-matching step at every chance node
#[derive(Debug)]
pub struct Tree<S>
where
    S: State,
{
    graph: DiGraph<Vertex<S>, Value>,
    shared: HashMap<S::I, NodeIndex>,
    players: usize,
    estimator: Estimator,
}

impl<S> Tree<S>
where
    S: State,
{
    pub fn new(players: usize) -> Self {
        Self {
            graph: DiGraph::default(),
            shared: HashMap::default(),
            players,
            estimator: Estimator::default(),
        }
    }
    /// Search settings for fitting continuous chance nodes.
    pub fn with_estimator(self, estimator: Estimator) -> Self {
        Self { estimator, ..self }
    }
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
    /// Width of every payoff vector.
    pub fn players(&self) -> usize {
        self.players
    }
    /// Number of vertices in the arena.
    pub fn n(&self) -> usize {
        self.graph.node_count()
    }
    pub fn at(&self, node: NodeIndex) -> anyhow::Result<&Vertex<S>> {
        self.graph
            .node_weight(node)
            .ok_or_else(|| anyhow::anyhow!("node {} not in tree", node.index()))
    }
    pub fn chance_at(&self, node: NodeIndex) -> anyhow::Result<&ChanceNode> {
        match self.at(node)? {
            Vertex::Chance(chance) => Ok(chance),
            vertex => Err(anyhow::anyhow!("node {} is a {} vertex, not chance", node.index(), vertex.kind())),
        }
    }
    pub fn schema_at(&self, node: NodeIndex) -> anyhow::Result<&ActionSchema> {
        match self.at(node)? {
            Vertex::Schema(schema) => Ok(schema),
            vertex => Err(anyhow::anyhow!("node {} is a {} vertex, not schema", node.index(), vertex.kind())),
        }
    }
    pub fn state_at(&self, node: NodeIndex) -> anyhow::Result<&StateNode<S>> {
        match self.at(node)? {
            Vertex::State(state) => Ok(state),
            vertex => Err(anyhow::anyhow!("node {} is a {} vertex, not state", node.index(), vertex.kind())),
        }
    }
    pub(crate) fn chance_mut(&mut self, node: NodeIndex) -> anyhow::Result<&mut ChanceNode> {
        match self.graph.node_weight_mut(node) {
            Some(Vertex::Chance(chance)) => Ok(chance),
            Some(vertex) => Err(anyhow::anyhow!("node {} is a {} vertex, not chance", node.index(), vertex.kind())),
            None => Err(anyhow::anyhow!("node {} not in tree", node.index())),
        }
    }
    pub fn chances(&self) -> impl Iterator<Item = (NodeIndex, &ChanceNode)> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |i| match &self.graph[i] {
                Vertex::Chance(chance) => Some((i, chance)),
                _ => None,
            })
    }
    pub fn schemas(&self) -> impl Iterator<Item = (NodeIndex, &ActionSchema)> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |i| match &self.graph[i] {
                Vertex::Schema(schema) => Some((i, schema)),
                _ => None,
            })
    }
    /// Schema shared by every state of an information set.
    pub fn schema_of(&self, info: &S::I) -> Option<NodeIndex> {
        self.shared.get(info).copied()
    }
}

/// Low-level construction.
impl<S> Tree<S>
where
    S: State,
{
    pub fn leaf(&mut self) -> NodeIndex {
        self.graph.add_node(Vertex::Leaf)
    }
    pub fn chance(&mut self, on_policy: Distribution) -> NodeIndex {
        self.graph.add_node(Vertex::Chance(ChanceNode::new(on_policy)))
    }
    /// Sample `node` from a behavior distribution from now on.
    pub fn explore(&mut self, node: NodeIndex, behavior: Distribution) -> anyhow::Result<()> {
        self.chance_mut(node)?.explore(behavior);
        Ok(())
    }
    /// Payoff reported by `node` while it has no children.
    pub fn prior(&mut self, node: NodeIndex, prior: Payoff) -> anyhow::Result<()> {
        anyhow::ensure!(prior.players() == self.players, "prior has width {}, tree has {}", prior.players(), self.players);
        self.chance_mut(node)?.set_prior(prior);
        Ok(())
    }
    /// Materialize a layout as member chance nodes plus a schema vertex.
    pub fn schema(&mut self, layout: Layout, player: Player) -> anyhow::Result<NodeIndex> {
        anyhow::ensure!(player < self.players, "player {} outside {} players", player, self.players);
        layout.validate()?;
        let (members, routes, defaults, root) = layout.into_parts();
        let members = members
            .into_iter()
            .map(|(on, off)| {
                let node = self.chance(on);
                if let Some(off) = off {
                    if let Some(Vertex::Chance(chance)) = self.graph.node_weight_mut(node) {
                        chance.explore(off);
                    }
                }
                node
            })
            .collect::<Vec<NodeIndex>>();
        let routes = routes
            .into_iter()
            .map(|((from, value), to)| ((members[from], value), members[to]))
            .collect::<std::collections::BTreeMap<_, _>>();
        let defaults = defaults
            .into_iter()
            .map(|(from, to)| (members[from], members[to]))
            .collect::<std::collections::BTreeMap<_, _>>();
        let intermediates = routes
            .keys()
            .map(|(from, _)| *from)
            .chain(defaults.keys().copied())
            .collect::<HashSet<NodeIndex>>();
        for node in intermediates.iter() {
            self.chance_mut(*node)?.mark_intermediate();
        }
        let leaves = members
            .iter()
            .copied()
            .filter(|m| !intermediates.contains(m))
            .collect::<Vec<NodeIndex>>();
        let schema = ActionSchema {
            root: members[root],
            members,
            leaves,
            routes,
            defaults,
            player,
        };
        Ok(self.graph.add_node(Vertex::Schema(schema)))
    }
    pub fn state(&mut self, state: S, schema: NodeIndex) -> anyhow::Result<NodeIndex> {
        self.schema_at(schema)?;
        let info = state.info();
        Ok(self.graph.add_node(Vertex::State(StateNode { state, info, schema })))
    }
    /// Register the first visit to `value` at chance node `node`.
    pub fn add(
        &mut self,
        node: NodeIndex,
        probability: Probability,
        importance: Probability,
        value: Value,
        reward: Payoff,
        child: NodeIndex,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(reward.players() == self.players, "reward has width {}, tree has {}", reward.players(), self.players);
        self.at(child)?;
        self.chance_mut(node)?
            .add(probability, importance, value, reward, child)?;
        self.graph.add_edge(node, child, value);
        Ok(())
    }
    /// Sample one value at `node`, forgetting its memoized payoff.
    pub fn draw<R>(&mut self, node: NodeIndex, rng: &mut R, memo: &mut Memo) -> anyhow::Result<Draw>
    where
        R: rand::Rng + ?Sized,
    {
        memo.forget(node);
        self.chance_mut(node)?.sample(rng)
    }
}

/// Payoff propagation and policy improvement.
impl<S> Tree<S>
where
    S: State,
{
    /// Payoff of any vertex, memoized per chance node.
    pub fn payoff(&self, node: NodeIndex, discount: Utility, memo: &mut Memo) -> anyhow::Result<Payoff> {
        match self.at(node)? {
            Vertex::Leaf => Ok(Payoff::zeros(self.players)),
            Vertex::State(state) => self.payoff(state.schema, discount, memo),
            Vertex::Schema(schema) => self.schema_payoff(schema, discount, memo),
            Vertex::Chance(chance) => self.chance_payoff(node, chance, discount, memo),
        }
    }
    /// Leaves first at the real discount, then every member undiscounted,
    /// so the composite action is discounted exactly once.
    fn schema_payoff(&self, schema: &ActionSchema, discount: Utility, memo: &mut Memo) -> anyhow::Result<Payoff> {
        for leaf in schema.leaves() {
            self.payoff(*leaf, discount, memo)?;
        }
        for member in schema.members() {
            self.payoff(*member, 1., memo)?;
        }
        self.payoff(schema.root(), 1., memo)
    }
    fn chance_payoff(
        &self,
        node: NodeIndex,
        chance: &ChanceNode,
        discount: Utility,
        memo: &mut Memo,
    ) -> anyhow::Result<Payoff> {
        if let Some(payoff) = memo.get(node) {
            return Ok(payoff.clone());
        }
        if chance.children().is_empty() {
            let payoff = chance
                .prior()
                .cloned()
                .unwrap_or_else(|| Payoff::zeros(self.players));
            memo.store(node, payoff.clone());
            return Ok(payoff);
        }
        memo.enter(node)?;
        match self.aggregate(chance, chance.discount(discount), memo) {
            Ok(payoff) => Ok(memo.leave(node, payoff)),
            Err(e) => {
                memo.abort(node);
                Err(e)
            }
        }
    }
    fn aggregate(&self, chance: &ChanceNode, discount: Utility, memo: &mut Memo) -> anyhow::Result<Payoff> {
        let mut total = Payoff::zeros(self.players);
        let mut visits = 0;
        for child in chance.children().values() {
            let value = self.action_value(child, discount, memo)?;
            total += value * (child.visits as Utility * child.importance);
            visits += child.visits;
        }
        Ok(match visits {
            0 => Payoff::zeros(self.players),
            n => total / n as Utility,
        })
    }
    fn action_value(&self, child: &Child, discount: Utility, memo: &mut Memo) -> anyhow::Result<Payoff> {
        Ok(child.reward.clone() + self.payoff(child.node, discount, memo)? * discount)
    }

    /// Reallocate on-policy mass at `node` toward values whose action
    /// value beats the memoized payoff for `player`.
    pub fn optimize_chance(
        &mut self,
        node: NodeIndex,
        player: Player,
        discount: Utility,
        memo: &mut Memo,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(player < self.players, "player {} outside {} players", player, self.players);
        let baseline = memo
            .get(node)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("optimize before payoff at node {}", node.index()))?;
        let chance = self.chance_at(node)?;
        if chance.children().is_empty() {
            return Ok(());
        }
        let discount = chance.discount(discount);
        let mut values = Vec::with_capacity(chance.children().len());
        let mut advantages = Vec::with_capacity(chance.children().len());
        for (value, child) in chance.children() {
            let action = self.action_value(child, discount, memo)?;
            values.push(*value);
            advantages.push(action[player] - baseline[player]);
        }
        let target = ChanceNode::target(&advantages);
        log::trace!("node {} advantages {:?} target {:?}", node.index(), advantages, target);
        let estimator = self.estimator;
        self.chance_mut(node)?.optimize(&values, &target, &estimator)
    }

    /// Sample a composite action, growing routes between members on first use.
    pub fn sample<R>(&mut self, schema: NodeIndex, rng: &mut R, memo: &mut Memo) -> anyhow::Result<Sampled>
    where
        R: rand::Rng + ?Sized,
    {
        let schema = self.schema_at(schema)?.clone();
        for member in schema.members() {
            memo.forget(*member);
        }
        let mut probabilities = Vec::new();
        let mut importances = Vec::new();
        let mut values = Vec::new();
        let mut current = schema.root();
        loop {
            let draw = self.draw(current, rng, memo)?;
            probabilities.push(draw.probability);
            importances.push(draw.importance);
            values.push(draw.value);
            match schema.next(current, &draw.value)? {
                None => {
                    return Ok(Sampled {
                        probabilities,
                        importances,
                        values,
                        last: current,
                        next: draw.next,
                    });
                }
                Some(member) => {
                    if draw.next.is_none() {
                        let reward = Payoff::zeros(self.players);
                        self.add(current, draw.probability, draw.importance, draw.value, reward, member)?;
                    }
                    debug_assert!(draw.next.is_none_or(|n| n == member));
                    current = member;
                }
            }
        }
    }

    /// Payoff of the schema, then a regret-matching step at each member.
    pub fn optimize_schema(
        &mut self,
        schema: NodeIndex,
        player: Player,
        discount: Utility,
        memo: &mut Memo,
    ) -> anyhow::Result<Payoff> {
        let payoff = self.payoff(schema, discount, memo)?;
        let members = self.schema_at(schema)?.members().to_vec();
        for member in members {
            self.optimize_chance(member, player, discount, memo)?;
        }
        Ok(payoff)
    }

    /// One improvement pass over every schema, each for its own player.
    pub fn optimize(&mut self, discount: Utility) -> anyhow::Result<()> {
        let ref mut memo = Memo::default();
        let schemas = self
            .schemas()
            .map(|(node, schema)| (node, schema.player()))
            .collect::<Vec<_>>();
        for (schema, player) in schemas.iter().copied() {
            self.optimize_schema(schema, player, discount, memo)?;
        }
        log::debug!("optimized {} schemas, {} payoffs memoized", schemas.len(), memo.len());
        Ok(())
    }
}

/// Growth against a [`Game`].
impl<S> Tree<S>
where
    S: State,
{
    /// Arena holding the initial state of `game`. Estimator overrides in
    /// `options` apply to every continuous fit in this tree.
    pub fn start<G>(game: &G, options: &Options) -> anyhow::Result<(Self, NodeIndex)>
    where
        G: Game<S = S>,
    {
        let estimator = Estimator::try_from(options)?;
        let mut tree = Self::new(game.players()).with_estimator(estimator);
        let state = game.start(options)?;
        let root = tree.visit(game, state)?;
        Ok((tree, root))
    }
    /// New state node, reusing the schema of its information set.
    pub fn visit<G>(&mut self, game: &G, state: S) -> anyhow::Result<NodeIndex>
    where
        G: Game<S = S>,
    {
        let info = state.info();
        let schema = match self.shared.get(&info) {
            Some(schema) => *schema,
            None => {
                let schema = self.schema(game.layout(&info), state.player())?;
                self.shared.insert(info, schema);
                schema
            }
        };
        self.state(state, schema)
    }
    /// One rollout from `root` until a leaf.
    pub fn episode<G, R>(&mut self, game: &G, root: NodeIndex, rng: &mut R, memo: &mut Memo) -> anyhow::Result<Trajectory>
    where
        G: Game<S = S>,
        R: rand::Rng + ?Sized,
    {
        let mut trajectory = Trajectory::default();
        let mut current = root;
        for _ in 0..MAX_EPISODE_DEPTH {
            let (state, schema) = match self.at(current)? {
                Vertex::State(node) => (node.state.clone(), node.schema),
                _ => {
                    log::trace!("episode ended after {} transitions", trajectory.len());
                    return Ok(trajectory);
                }
            };
            let sampled = self.sample(schema, rng, memo)?;
            let value = *sampled
                .values
                .last()
                .ok_or_else(|| anyhow::anyhow!("schema {} sampled no values", schema.index()))?;
            let (reward, next) = match sampled.next {
                Some(next) => {
                    let reward = self
                        .chance_at(sampled.last)?
                        .child(&value)
                        .map(|child| child.reward.clone())
                        .ok_or_else(|| anyhow::anyhow!("value {} lost its child", value))?;
                    (reward, next)
                }
                None => {
                    let (reward, successor) = game.act(&state, &sampled.values)?;
                    let next = match successor {
                        Some(successor) => self.visit(game, successor)?,
                        None => self.leaf(),
                    };
                    let probability = sampled.probabilities.last().copied().unwrap_or_default();
                    let importance = sampled.importances.last().copied().unwrap_or_default();
                    self.add(sampled.last, probability, importance, value, reward.clone(), next)?;
                    (reward, next)
                }
            };
            trajectory.push(current, sampled.values, reward);
            current = next;
        }
        anyhow::bail!("episode exceeded {} transitions", MAX_EPISODE_DEPTH)
    }
}

impl<S> Tree<S>
where
    S: State,
{
    /// display the members reachable from a chance node
    fn show(
        &self,
        f: &mut std::fmt::Formatter,
        node: NodeIndex,
        prefix: &str,
        visited: &mut HashSet<NodeIndex>,
    ) -> std::fmt::Result {
        let Ok(chance) = self.chance_at(node) else {
            return Ok(());
        };
        if !visited.insert(node) {
            return Ok(());
        }
        let n = chance.children().len();
        for (i, (value, child)) in chance.children().iter().enumerate() {
            let last = i == n - 1;
            let gaps = if last { "    " } else { "│   " };
            let stem = if last { "└" } else { "├" };
            let kind = self.graph[child.node].kind();
            writeln!(
                f,
                "{}{}──{} → {} #{} (visits {}, w {:.3}, r {})",
                prefix,
                stem,
                value,
                kind,
                child.node.index(),
                child.visits,
                child.importance,
                child.reward
            )?;
            self.show(f, child.node, &format!("{}{}", prefix, gaps), visited)?;
        }
        Ok(())
    }
}

impl<S> std::fmt::Display for Tree<S>
where
    S: State,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, schema) in self.schemas() {
            let root = schema.root();
            let policy = self
                .chance_at(root)
                .map(|c| c.on_policy().parameters())
                .unwrap_or_default();
            writeln!(f, "\nSCHEMA #{} player {} root {:?}", index.index(), schema.player(), policy)?;
            self.show(f, root, "", &mut HashSet::new())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Solo(u8);
    impl InfoSet for Solo {}
    impl State for Solo {
        type I = Self;
        fn player(&self) -> Player {
            0
        }
        fn info(&self) -> Self::I {
            self.clone()
        }
    }

    fn payoff(utilities: [Utility; 2]) -> Payoff {
        Payoff::from(utilities.to_vec())
    }

    /// chance node over three values with fixed rewards into leaves
    fn fan(tree: &mut Tree<Solo>, rewards: [Utility; 3], importances: [Probability; 3]) -> NodeIndex {
        let node = tree.chance(Distribution::discrete(3));
        for (i, (r, w)) in rewards.into_iter().zip(importances).enumerate() {
            let leaf = tree.leaf();
            tree.add(node, 1. / 3., w, Value::Discrete(i), payoff([r, 0.]), leaf)
                .unwrap();
        }
        node
    }

    #[test]
    fn payoff_is_memoized() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let node = fan(&mut tree, [1., 2., 3.], [1., 1., 1.]);
        for _ in 0..10 {
            tree.draw(node, rng, memo).unwrap();
        }
        let a = tree.payoff(node, 0.9, memo).unwrap();
        let b = tree.payoff(node, 0.9, memo).unwrap();
        assert_eq!(a, b);
        assert_eq!(memo.get(node), Some(&a));
        tree.draw(node, rng, memo).unwrap();
        assert_eq!(memo.get(node), None);
    }

    #[test]
    fn composite_action_discounted_once() {
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let mut inner = Layout::default();
        inner.member(Distribution::discrete(1));
        let b = tree.schema(inner, 0).unwrap();
        let b0 = tree.schema_at(b).unwrap().root();
        let state = tree.state(Solo(1), b).unwrap();
        let leaf = tree.leaf();
        tree.add(b0, 1., 1., Value::Discrete(0), payoff([4., -4.]), leaf)
            .unwrap();
        let mut outer = Layout::default();
        let x = outer.member(Distribution::discrete(1));
        let y = outer.member(Distribution::discrete(1));
        let a = tree.schema(outer.follow(x, y).root(x), 0).unwrap();
        let (a0, a1) = match tree.schema_at(a).unwrap().members() {
            [a0, a1] => (*a0, *a1),
            _ => unreachable!(),
        };
        tree.add(a0, 1., 1., Value::Discrete(0), payoff([0., 0.]), a1)
            .unwrap();
        tree.add(a1, 1., 1., Value::Discrete(0), payoff([0., 0.]), state)
            .unwrap();
        assert!(tree.chance_at(a0).unwrap().is_intermediate());
        assert!(!tree.chance_at(a1).unwrap().is_intermediate());
        assert_eq!(tree.schema_at(a).unwrap().leaves(), &[a1]);
        assert_eq!(tree.payoff(a, 0.5, memo).unwrap(), payoff([2., -2.]));
        assert_eq!(memo.get(a0), Some(&payoff([2., -2.])));
        assert_eq!(memo.get(a1), Some(&payoff([2., -2.])));
        assert_eq!(memo.get(b0), Some(&payoff([4., -4.])));
    }

    #[test]
    fn positive_advantage_takes_all_mass() {
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let node = fan(&mut tree, [2., 5., 3.], [1.5, 0., 2.]);
        assert_eq!(tree.payoff(node, 1., memo).unwrap(), payoff([3., 0.]));
        tree.optimize_chance(node, 0, 1., memo).unwrap();
        let policy = tree.chance_at(node).unwrap().on_policy().parameters();
        assert_eq!(policy, vec![0., 1., 0.]);
    }

    #[test]
    fn no_advantage_is_uniform_over_visited() {
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let node = tree.chance(Distribution::discrete(3));
        for i in [0, 2] {
            let leaf = tree.leaf();
            tree.add(node, 1. / 3., 1., Value::Discrete(i), payoff([1., 0.]), leaf)
                .unwrap();
        }
        tree.payoff(node, 1., memo).unwrap();
        tree.optimize_chance(node, 0, 1., memo).unwrap();
        let policy = tree.chance_at(node).unwrap().on_policy().parameters();
        assert_eq!(policy, vec![0.5, 0., 0.5]);
    }

    #[test]
    fn optimize_requires_payoff() {
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let node = fan(&mut tree, [1., 2., 3.], [1., 1., 1.]);
        assert!(tree.optimize_chance(node, 0, 1., memo).is_err());
        let empty = tree.chance(Distribution::discrete(2));
        assert!(tree.optimize_chance(empty, 0, 1., memo).is_err());
        tree.payoff(empty, 1., memo).unwrap();
        assert!(tree.optimize_chance(empty, 0, 1., memo).is_ok());
    }

    #[test]
    fn learns_the_better_value() {
        let ref mut rng = SmallRng::seed_from_u64(11);
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let node = tree.chance(Distribution::discrete(2));
        let leaf = tree.leaf();
        for _ in 0..100 {
            let draw = tree.draw(node, rng, memo).unwrap();
            if draw.next.is_none() {
                let reward = match draw.value {
                    Value::Discrete(0) => payoff([1., 0.]),
                    _ => payoff([0., 1.]),
                };
                tree.add(node, draw.probability, draw.importance, draw.value, reward, leaf)
                    .unwrap();
            }
        }
        assert_eq!(tree.chance_at(node).unwrap().visits(), 100);
        tree.payoff(node, 1., memo).unwrap();
        tree.optimize_chance(node, 0, 1., memo).unwrap();
        let chance = tree.chance_at(node).unwrap();
        assert_eq!(chance.on_policy().parameters(), vec![1., 0.]);
        for _ in 0..20 {
            let (p, value) = chance.on_policy().sample(rng).unwrap();
            assert_eq!((p, value), (1., Value::Discrete(0)));
        }
    }

    #[test]
    fn unexplored_and_leaf_payoffs() {
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(3);
        let leaf = tree.leaf();
        let bare = tree.chance(Distribution::discrete(2));
        let primed = tree.chance(Distribution::discrete(2));
        tree.prior(primed, Payoff::from(vec![1., 2., 3.])).unwrap();
        assert!(tree.prior(primed, Payoff::zeros(2)).is_err());
        assert_eq!(tree.payoff(leaf, 0.5, memo).unwrap(), Payoff::zeros(3));
        assert_eq!(tree.payoff(bare, 0.5, memo).unwrap(), Payoff::zeros(3));
        assert_eq!(tree.payoff(primed, 0.5, memo).unwrap(), Payoff::from(vec![1., 2., 3.]));
    }

    #[test]
    fn cycles_are_reported() {
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let a = tree.chance(Distribution::discrete(1));
        let b = tree.chance(Distribution::discrete(1));
        tree.add(a, 1., 1., Value::Discrete(0), Payoff::zeros(2), b)
            .unwrap();
        tree.add(b, 1., 1., Value::Discrete(0), Payoff::zeros(2), a)
            .unwrap();
        assert!(tree.payoff(a, 1., memo).is_err());
        assert!(memo.is_empty());
    }

    /// one continuous member per move, paying the sampled point to player 0
    struct Dial;
    impl Game for Dial {
        type S = Solo;
        fn players(&self) -> usize {
            2
        }
        fn start(&self, _: &Options) -> anyhow::Result<Self::S> {
            Ok(Solo(0))
        }
        fn layout(&self, _: &Solo) -> Layout {
            let mut layout = Layout::default();
            let x = layout.member(Distribution::continuous(0., 10.));
            layout.root(x)
        }
        fn act(&self, _: &Self::S, values: &[Value]) -> anyhow::Result<(Payoff, Option<Self::S>)> {
            let x = values
                .first()
                .and_then(Value::point)
                .ok_or_else(|| anyhow::anyhow!("expected one point"))?;
            Ok((payoff([x, 0.]), None))
        }
    }

    fn dial(options: &Options) -> (Vec<f32>, Vec<f32>) {
        let ref mut rng = SmallRng::seed_from_u64(17);
        let (mut tree, root) = Tree::start(&Dial, options).unwrap();
        for _ in 0..64 {
            let trajectory = tree.episode(&Dial, root, rng, &mut Memo::default()).unwrap();
            assert_eq!(trajectory.len(), 1);
        }
        let schema = tree.schema_of(&Solo(0)).unwrap();
        let member = tree.schema_at(schema).unwrap().root();
        let before = tree.chance_at(member).unwrap().on_policy().parameters();
        tree.optimize(1.).unwrap();
        let after = tree.chance_at(member).unwrap().on_policy().parameters();
        (before, after)
    }

    #[test]
    fn options_reach_continuous_fits() {
        let frozen = Options::default().with("cover_factor", 0.).unwrap();
        let (before, after) = dial(&frozen);
        assert_eq!(before, vec![5., 1.]);
        assert_eq!(after[0], before[0]);
        assert!((after[1] - before[1]).abs() < 1e-5);
        let (before, after) = dial(&Options::default());
        assert!(after[0] > before[0]);
        let invalid = Options::default().with("cover_factor", -1.).unwrap();
        assert!(Tree::start(&Dial, &invalid).is_err());
    }

    #[test]
    fn continuous_member_moves_toward_reward() {
        let ref mut rng = SmallRng::seed_from_u64(23);
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(2);
        let node = tree.chance(Distribution::continuous(0., 10.));
        let leaf = tree.leaf();
        for _ in 0..200 {
            let draw = tree.draw(node, rng, memo).unwrap();
            assert_eq!((draw.probability, draw.importance), (0., 1.));
            let x = draw.value.point().unwrap();
            if draw.next.is_none() {
                tree.add(node, draw.probability, draw.importance, draw.value, payoff([x, 0.]), leaf)
                    .unwrap();
            }
        }
        assert_eq!(tree.chance_at(node).unwrap().visits(), 200);
        let mean = tree.payoff(node, 1., memo).unwrap();
        assert!((mean[0] - 5.).abs() < 0.5);
        tree.optimize_chance(node, 0, 1., memo).unwrap();
        let gaussian = match tree.chance_at(node).unwrap().on_policy() {
            Distribution::Continuous(gaussian) => gaussian.clone(),
            Distribution::Discrete(_) => unreachable!(),
        };
        assert!(gaussian.loc() > 5.5, "loc {}", gaussian.loc());
        assert!(gaussian.scale() >= SCALE_MIN);
        assert!(tree.estimator().cover() == PARAM_COVER_FACTOR);
    }

    #[test]
    fn schema_sampling_grows_routes() {
        let ref mut rng = SmallRng::seed_from_u64(5);
        let ref mut memo = Memo::default();
        let mut tree = Tree::<Solo>::new(1);
        let mut layout = Layout::default();
        let x = layout.member(Distribution::discrete(2));
        let y = layout.member(Distribution::discrete(2));
        let z = layout.member(Distribution::discrete(2));
        let layout = layout
            .route(x, Value::Discrete(0), y)
            .route(x, Value::Discrete(1), z)
            .root(x);
        let schema = tree.schema(layout, 0).unwrap();
        for _ in 0..20 {
            let sampled = tree.sample(schema, rng, memo).unwrap();
            assert_eq!(sampled.values.len(), 2);
            assert_eq!(sampled.next, None);
            assert!(tree.schema_at(schema).unwrap().is_leaf(sampled.last));
        }
        let root = tree.schema_at(schema).unwrap().root();
        assert_eq!(tree.chance_at(root).unwrap().children().len(), 2);
        assert_eq!(tree.chance_at(root).unwrap().visits(), 20);
        assert!(tree.schema(Layout::default(), 0).is_err());
        assert!(tree.schema(Layout::default(), 1).is_err());
    }
}
