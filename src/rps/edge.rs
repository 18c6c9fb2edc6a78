use crate::*;

/// Throws in Rock-Paper-Scissors.
///
/// Standard RPS rules apply: R beats S, S beats P, P beats R.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum RpsThrow {
    /// Rock — beats Scissors, loses to Paper.
    R,
    /// Paper — beats Rock, loses to Scissors.
    P,
    /// Scissors — beats Paper, loses to Rock.
    S,
}

/// Multiplier a player puts on the outcome.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum RpsStake {
    Single,
    Double,
}

impl RpsThrow {
    pub const ALL: [Self; 3] = [Self::R, Self::P, Self::S];
    /// Utility of `self` against `other` before stakes.
    pub fn against(&self, other: &Self) -> Utility {
        const P_WIN: Utility = 1.;
        const S_WIN: Utility = P_WIN * ASYMMETRIC_UTILITY;
        match (self, other) {
            (Self::P, Self::R) => 0. + P_WIN,
            (Self::R, Self::P) => 0. - P_WIN,
            (Self::R, Self::S) => 0. + S_WIN,
            (Self::S, Self::P) => 0. + S_WIN,
            (Self::S, Self::R) => 0. - S_WIN,
            (Self::P, Self::S) => 0. - S_WIN,
            _ => 0.,
        }
    }
}

impl RpsStake {
    pub const ALL: [Self; 2] = [Self::Single, Self::Double];
    pub fn multiplier(&self) -> Utility {
        match self {
            Self::Single => 1.,
            Self::Double => 2.,
        }
    }
}

impl From<RpsThrow> for Value {
    fn from(throw: RpsThrow) -> Self {
        Value::Discrete(throw as usize)
    }
}
impl From<RpsStake> for Value {
    fn from(stake: RpsStake) -> Self {
        Value::Discrete(stake as usize)
    }
}

impl TryFrom<Value> for RpsThrow {
    type Error = anyhow::Error;
    fn try_from(value: Value) -> anyhow::Result<Self> {
        match value {
            Value::Discrete(0) => Ok(Self::R),
            Value::Discrete(1) => Ok(Self::P),
            Value::Discrete(2) => Ok(Self::S),
            _ => Err(anyhow::anyhow!("{} is not a throw", value)),
        }
    }
}
impl TryFrom<Value> for RpsStake {
    type Error = anyhow::Error;
    fn try_from(value: Value) -> anyhow::Result<Self> {
        match value {
            Value::Discrete(0) => Ok(Self::Single),
            Value::Discrete(1) => Ok(Self::Double),
            _ => Err(anyhow::anyhow!("{} is not a stake", value)),
        }
    }
}
