use crate::*;

/// Arena entry of a [`Tree`].
#[derive(Debug, Clone)]
pub enum Vertex<S>
where
    S: State,
{
    Leaf,
    Chance(ChanceNode),
    Schema(ActionSchema),
    State(StateNode<S>),
}

impl<S> Vertex<S>
where
    S: State,
{
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf => "leaf",
            Self::Chance(_) => "chance",
            Self::Schema(_) => "schema",
            Self::State(_) => "state",
        }
    }
}
