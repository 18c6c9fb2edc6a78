use crate::*;

/// Utility vector indexed by player.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Payoff(Vec<Utility>);

impl Payoff {
    pub fn zeros(players: usize) -> Self {
        Self(vec![0.; players])
    }
    pub fn players(&self) -> usize {
        self.0.len()
    }
    pub fn utilities(&self) -> &[Utility] {
        &self.0
    }
}

impl From<Vec<Utility>> for Payoff {
    fn from(utilities: Vec<Utility>) -> Self {
        Self(utilities)
    }
}

impl std::ops::Index<Player> for Payoff {
    type Output = Utility;
    fn index(&self, player: Player) -> &Self::Output {
        &self.0[player]
    }
}

impl std::ops::Add for Payoff {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}
impl std::ops::AddAssign for Payoff {
    fn add_assign(&mut self, rhs: Self) {
        debug_assert!(self.players() == rhs.players());
        self.0.iter_mut().zip(rhs.0).for_each(|(a, b)| *a += b);
    }
}
impl std::ops::Mul<Utility> for Payoff {
    type Output = Self;
    fn mul(self, rhs: Utility) -> Self::Output {
        Self(self.0.into_iter().map(|u| u * rhs).collect())
    }
}
impl std::ops::Div<Utility> for Payoff {
    type Output = Self;
    fn div(self, rhs: Utility) -> Self::Output {
        Self(self.0.into_iter().map(|u| u / rhs).collect())
    }
}

impl std::fmt::Display for Payoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let utilities = self
            .0
            .iter()
            .map(|u| format!("{:+.3}", u))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "[{}]", utilities)
    }
}
