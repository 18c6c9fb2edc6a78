use super::*;
use crate::*;

/// Decision points of staked RPS.
///
/// P1 throws and stakes face up, so P2 decides knowing both; the state is
/// its own information set.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum RpsState {
    P1,
    P2(RpsThrow, RpsStake),
}

impl InfoSet for RpsState {}

impl State for RpsState {
    type I = Self;
    fn player(&self) -> Player {
        match self {
            Self::P1 => 0,
            Self::P2(..) => 1,
        }
    }
    fn info(&self) -> Self::I {
        *self
    }
}
