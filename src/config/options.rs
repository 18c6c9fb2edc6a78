use std::collections::BTreeMap;

/// Opaque settings forwarded to [`Game::start`](crate::Game::start) and
/// read by [`Estimator`](crate::Estimator).
///
/// Stored as a JSON object; lookups deserialize on demand so each reader
/// decides the type of the keys it cares about.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, serde_json::Value>);

impl Options {
    /// Typed lookup; `None` when absent, error when present with the wrong type.
    pub fn get<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        self.0
            .get(key)
            .map(|value| serde_json::from_value::<T>(value.clone()))
            .transpose()
            .map_err(|e| anyhow::anyhow!("option {}: {}", key, e))
    }
    pub fn with<T>(mut self, key: &str, value: T) -> anyhow::Result<Self>
    where
        T: serde::Serialize,
    {
        self.0.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::str::FromStr for Options {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| anyhow::anyhow!(e))
    }
}
