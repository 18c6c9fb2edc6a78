use crate::*;
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

/// Statistics of one value sampled at a [`ChanceNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    /// Probability the value was first drawn with.
    pub probability: Probability,
    /// On-policy over sampling probability at the first draw.
    pub importance: Probability,
    pub visits: u32,
    pub reward: Payoff,
    pub node: NodeIndex,
}

/// Result of a single draw from a [`ChanceNode`].
///
/// `next` is `None` the first time a value comes up, in which case the
/// caller is expected to register the child with [`ChanceNode::add`].
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub probability: Probability,
    pub importance: Probability,
    pub value: Value,
    pub next: Option<NodeIndex>,
}

/// One stochastic decision: a learnable on-policy distribution, an
/// optional behavior distribution used for sampling, and a sparse map
/// from every value sampled so far to its child.
#[derive(Debug, Clone)]
pub struct ChanceNode {
    on_policy: Distribution,
    off_policy: Option<Distribution>,
    children: BTreeMap<Value, Child>,
    prior: Option<Payoff>,
    intermediate: bool,
}

impl ChanceNode {
    pub fn new(on_policy: Distribution) -> Self {
        Self {
            on_policy,
            off_policy: None,
            children: BTreeMap::new(),
            prior: None,
            intermediate: false,
        }
    }
    pub fn explore(&mut self, behavior: Distribution) {
        self.off_policy = Some(behavior);
    }
    pub fn set_prior(&mut self, prior: Payoff) {
        self.prior = Some(prior);
    }
    pub fn prior(&self) -> Option<&Payoff> {
        self.prior.as_ref()
    }
    pub fn on_policy(&self) -> &Distribution {
        &self.on_policy
    }
    pub fn off_policy(&self) -> Option<&Distribution> {
        self.off_policy.as_ref()
    }
    pub(crate) fn on_policy_mut(&mut self) -> &mut Distribution {
        &mut self.on_policy
    }
    pub(crate) fn off_policy_mut(&mut self) -> Option<&mut Distribution> {
        self.off_policy.as_mut()
    }
    pub fn children(&self) -> &BTreeMap<Value, Child> {
        &self.children
    }
    pub fn child(&self, value: &Value) -> Option<&Child> {
        self.children.get(value)
    }
    pub fn is_intermediate(&self) -> bool {
        self.intermediate
    }
    pub(crate) fn mark_intermediate(&mut self) {
        self.intermediate = true;
    }
    /// Total visits across all sampled values.
    pub fn visits(&self) -> u32 {
        self.children.values().map(|c| c.visits).sum()
    }
    /// Edges inside a composite action are never discounted.
    pub fn discount(&self, discount: Utility) -> Utility {
        match self.intermediate {
            true => 1.,
            false => discount,
        }
    }

    /// Draw a value, from the behavior distribution when there is one.
    /// A value seen before counts one more visit and resolves to its child.
    pub fn sample<R>(&mut self, rng: &mut R) -> anyhow::Result<Draw>
    where
        R: rand::Rng + ?Sized,
    {
        let (probability, value, importance) = match self.off_policy {
            None => {
                let (p, value) = self.on_policy.sample(rng)?;
                (p, value, 1.)
            }
            Some(ref behavior) => {
                let (p, value) = behavior.sample(rng)?;
                anyhow::ensure!(p > 0., "behavior drew {} with zero probability", value);
                let q = self.on_policy.probability(&value)?;
                (p, value, q / p)
            }
        };
        let next = self.children.get_mut(&value).map(|child| {
            child.visits += 1;
            child.node
        });
        log::trace!("drew {} (p {:.3}, w {:.3}, seen {})", value, probability, importance, next.is_some());
        Ok(Draw {
            probability,
            importance,
            value,
            next,
        })
    }

    /// Register the first visit to `value`.
    pub fn add(
        &mut self,
        probability: Probability,
        importance: Probability,
        value: Value,
        reward: Payoff,
        node: NodeIndex,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(!self.children.contains_key(&value), "value {} already has a child", value);
        self.children.insert(
            value,
            Child {
                probability,
                importance,
                visits: 1,
                reward,
                node,
            },
        );
        Ok(())
    }

    /// Move the on-policy distribution to `targets` over `values`.
    pub fn optimize(&mut self, values: &[Value], targets: &[Probability], estimator: &Estimator) -> anyhow::Result<()> {
        self.on_policy.fit(estimator, values, targets)
    }

    /// Regret-matching target: positive advantages normalised to one,
    /// uniform when no advantage is positive.
    pub fn target(advantages: &[Utility]) -> Vec<Probability> {
        let clipped = advantages.iter().map(|a| a.max(0.)).collect::<Vec<Probability>>();
        let sum = clipped.iter().sum::<Probability>();
        match sum > 0. {
            true => clipped.into_iter().map(|a| a / sum).collect(),
            false => vec![1. / advantages.len() as Probability; advantages.len()],
        }
    }
}
