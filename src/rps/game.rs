use super::*;
use crate::*;

/// Rock-Paper-Scissors where each move is a (throw, stake) pair.
///
/// The composite action is tree-shaped: the throw member routes each throw
/// to its own stake member, so each (throw, stake) pair has its own leaf
/// slot. Every member samples from a uniform behavior distribution.
/// The outcome is paid on P2's move, scaled by the larger stake.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rps;

impl Rps {
    fn decode(values: &[Value]) -> anyhow::Result<(RpsThrow, RpsStake)> {
        match values {
            [throw, stake] => Ok((RpsThrow::try_from(*throw)?, RpsStake::try_from(*stake)?)),
            _ => Err(anyhow::anyhow!("expected (throw, stake), got {} values", values.len())),
        }
    }
}

impl Game for Rps {
    type S = RpsState;
    fn players(&self) -> usize {
        2
    }
    fn start(&self, _: &Options) -> anyhow::Result<Self::S> {
        Ok(RpsState::P1)
    }
    fn layout(&self, _: &RpsState) -> Layout {
        let n = RpsThrow::ALL.len();
        let m = RpsStake::ALL.len();
        let mut layout = Layout::default();
        let throw = layout.explored(Distribution::discrete(n), Distribution::discrete(n));
        for t in RpsThrow::ALL {
            let stake = layout.explored(Distribution::discrete(m), Distribution::discrete(m));
            layout = layout.route(throw, t.into(), stake);
        }
        layout.root(throw)
    }
    fn act(&self, state: &Self::S, values: &[Value]) -> anyhow::Result<(Payoff, Option<Self::S>)> {
        let (throw, stake) = Self::decode(values)?;
        match state {
            RpsState::P1 => Ok((Payoff::zeros(2), Some(RpsState::P2(throw, stake)))),
            RpsState::P2(first, bet) => {
                let utility = first.against(&throw) * bet.multiplier().max(stake.multiplier());
                Ok((Payoff::from(vec![utility, -utility]), None))
            }
        }
    }
}
