use std::cmp::Ordering;
use std::hash::Hash;
use std::hash::Hasher;

/// A point in the support of a [`Distribution`](crate::Distribution).
///
/// Chance nodes key their children by the value that was sampled, so
/// values are totally ordered and hashable. Reals compare by
/// [`f32::total_cmp`], which makes two continuous values equal only
/// when their bit patterns are identical: a sampled real is its own key.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Discrete(usize),
    Continuous(f32),
}

impl Value {
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Discrete(i) => Some(*i),
            Self::Continuous(_) => None,
        }
    }
    pub fn point(&self) -> Option<f32> {
        match self {
            Self::Discrete(_) => None,
            Self::Continuous(x) => Some(*x),
        }
    }
}

impl From<usize> for Value {
    fn from(index: usize) -> Self {
        Self::Discrete(index)
    }
}
impl From<f32> for Value {
    fn from(point: f32) -> Self {
        Self::Continuous(point)
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Discrete(a), Self::Discrete(b)) => a.cmp(b),
            (Self::Continuous(a), Self::Continuous(b)) => a.total_cmp(b),
            (Self::Discrete(_), Self::Continuous(_)) => Ordering::Less,
            (Self::Continuous(_), Self::Discrete(_)) => Ordering::Greater,
        }
    }
}
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Value {}

impl Hash for Value {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        match self {
            Self::Discrete(i) => (0u8, *i as u64).hash(state),
            Self::Continuous(x) => (1u8, x.to_bits() as u64).hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discrete(i) => write!(f, "#{}", i),
            Self::Continuous(x) => write!(f, "{:.4}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn reals_key_by_exact_bits() {
        let mut map = BTreeMap::new();
        map.insert(Value::Continuous(0.5), 1);
        map.insert(Value::Continuous(0.5), 2);
        map.insert(Value::Continuous(0.5 + f32::EPSILON), 3);
        map.insert(Value::Discrete(0), 4);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&Value::Continuous(0.5)], 2);
        assert_eq!(map.keys().next(), Some(&Value::Discrete(0)));
    }

    #[test]
    fn discrete_and_continuous_never_collide() {
        assert_ne!(Value::Discrete(0), Value::Continuous(0.));
        assert_eq!(Value::from(3usize).index(), Some(3));
        assert_eq!(Value::from(1.5f32).point(), Some(1.5));
    }
}
