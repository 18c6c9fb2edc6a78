use crate::*;
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw parameters of one chance node.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameters {
    pub on_policy: Vec<f32>,
    pub off_policy: Option<Vec<f32>>,
}

/// Parameters of every chance node of a tree, keyed by arena index.
///
/// Only parameters are stored, not tree structure: a checkpoint restores
/// onto a tree grown the same way, and anything else is an error.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Checkpoint(BTreeMap<usize, Parameters>);

impl Checkpoint {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, index: usize) -> Option<&Parameters> {
        self.0.get(&index)
    }
    /// write as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer(file, self)?;
        log::debug!("saved {} chance nodes to {}", self.len(), path.display());
        Ok(())
    }
    /// read from JSON
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::io::BufReader::new(std::fs::File::open(path)?);
        let checkpoint = serde_json::from_reader::<_, Self>(file)?;
        log::debug!("loaded {} chance nodes from {}", checkpoint.len(), path.display());
        Ok(checkpoint)
    }
}

impl<S> Tree<S>
where
    S: State,
{
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(
            self.chances()
                .map(|(node, chance)| {
                    let parameters = Parameters {
                        on_policy: chance.on_policy().parameters(),
                        off_policy: chance.off_policy().map(|d| d.parameters()),
                    };
                    (node.index(), parameters)
                })
                .collect(),
        )
    }
    /// Overwrite every chance node's parameters. Nothing is written unless
    /// the whole checkpoint fits this tree.
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> anyhow::Result<()> {
        let nodes = self.chances().map(|(node, _)| node.index()).collect::<Vec<usize>>();
        anyhow::ensure!(
            nodes.iter().eq(checkpoint.0.keys()),
            "checkpoint holds {} chance nodes, tree has {}",
            checkpoint.len(),
            nodes.len()
        );
        let mut staged = Vec::with_capacity(nodes.len());
        for (index, parameters) in checkpoint.0.iter() {
            let node = NodeIndex::new(*index);
            let chance = self.chance_at(node)?;
            let mut on = chance.on_policy().clone();
            on.set_parameters(parameters.on_policy.clone())?;
            let off = match (chance.off_policy(), parameters.off_policy.as_ref()) {
                (None, None) => None,
                (Some(off), Some(values)) => {
                    let mut off = off.clone();
                    off.set_parameters(values.clone())?;
                    Some(off)
                }
                _ => anyhow::bail!("off-policy presence differs at node {}", index),
            };
            staged.push((node, on, off));
        }
        for (node, on, off) in staged {
            let chance = self.chance_mut(node)?;
            *chance.on_policy_mut() = on;
            if let (Some(slot), Some(off)) = (chance.off_policy_mut(), off) {
                *slot = off;
            }
        }
        Ok(())
    }
}
