//! Offline registry state.
//!
//! A [`RegistrySnapshot`] describes the quorums, their strategies and the registered operators
//! at one block. It implements [`RegistryCoordinator`] and [`StakeRegistry`], so a migration can
//! be planned or a strategy query answered without a live registry.
//!
//! ```toml
//! block = 1200
//!
//! [[quorums]]
//! strategies = [{ strategy = "0x...01", multiplier = 1000000000000000000 }]
//!
//! [[operators]]
//! id = "0x...aa"
//! address = "0x...0a"
//! quorums = [0]
//! ```

use std::{
    collections::{HashMap, HashSet},
    fs, io,
    path::{Path, PathBuf},
};

use opset_primitives::{
    Address, BitmapError, OperatorId, QuorumBitmap, QuorumNumber, StrategyParam,
    MAX_QUORUM_COUNT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::traits::{
    BlockNumber, Collaborator, CollaboratorError, RegistryCoordinator, StakeRegistry,
};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("snapshot declares {0} quorums, at most {MAX_QUORUM_COUNT} are supported")]
    TooManyQuorums(usize),

    #[error("operator {operator} is registered in quorum {quorum}, which does not exist")]
    UnknownQuorum { operator: Address, quorum: usize },

    #[error("operator id {0} is declared more than once")]
    DuplicateOperatorId(OperatorId),

    #[error("operator address {0} is declared more than once")]
    DuplicateAddress(Address),

    #[error("operator {0} has the zero address")]
    ZeroAddress(OperatorId),

    #[error(transparent)]
    Bitmap(#[from] BitmapError),
}

/// On-disk form of a snapshot.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Block the snapshot was taken at.
    #[serde(default)]
    pub block: BlockNumber,

    /// Quorums in quorum-number order.
    #[serde(default)]
    pub quorums: Vec<QuorumEntry>,

    #[serde(default)]
    pub operators: Vec<OperatorEntry>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct QuorumEntry {
    #[serde(default)]
    pub strategies: Vec<StrategyEntry>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    pub strategy: Address,

    // TOML integers are 64-bit.
    pub multiplier: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OperatorEntry {
    pub id: OperatorId,
    pub address: Address,

    /// Quorums the operator is currently registered in.
    #[serde(default)]
    pub quorums: Vec<QuorumNumber>,
}

#[derive(Clone, Debug)]
struct OperatorRecord {
    address: Address,
    bitmap: QuorumBitmap,
}

/// Validated, indexed registry state at a single block.
#[derive(Clone, Debug)]
pub struct RegistrySnapshot {
    block: BlockNumber,
    strategies: Vec<Vec<StrategyParam>>,
    operators: HashMap<OperatorId, OperatorRecord>,
    ids: HashMap<Address, OperatorId>,

    /// Members of each quorum, sorted by address.
    members: Vec<Vec<OperatorId>>,
}

impl RegistrySnapshot {
    pub fn from_toml_str(s: &str) -> Result<Self, SnapshotError> {
        let doc: SnapshotDocument = toml::from_str(s)?;
        Self::try_from(doc)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn block(&self) -> BlockNumber {
        self.block
    }

    pub fn num_quorums(&self) -> usize {
        self.members.len()
    }

    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    fn unknown_quorum(call: &'static str, quorum: QuorumNumber, count: usize) -> CollaboratorError {
        CollaboratorError::new(
            Collaborator::RegistryCoordinator,
            call,
            format!("quorum {quorum} does not exist, snapshot has {count} quorums"),
        )
    }
}

impl TryFrom<SnapshotDocument> for RegistrySnapshot {
    type Error = SnapshotError;

    fn try_from(doc: SnapshotDocument) -> Result<Self, Self::Error> {
        let quorum_count = doc.quorums.len();
        if quorum_count > MAX_QUORUM_COUNT {
            return Err(SnapshotError::TooManyQuorums(quorum_count));
        }

        let strategies: Vec<Vec<StrategyParam>> = doc
            .quorums
            .into_iter()
            .map(|q| {
                q.strategies
                    .into_iter()
                    .map(|s| StrategyParam::new(s.strategy, s.multiplier.into()))
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut operators = HashMap::with_capacity(doc.operators.len());
        let mut ids = HashMap::with_capacity(doc.operators.len());
        let mut members: Vec<Vec<(Address, OperatorId)>> = vec![Vec::new(); quorum_count];
        let mut seen_addresses = HashSet::with_capacity(doc.operators.len());

        for entry in doc.operators {
            if entry.address.is_zero() {
                return Err(SnapshotError::ZeroAddress(entry.id));
            }
            if !seen_addresses.insert(entry.address) {
                return Err(SnapshotError::DuplicateAddress(entry.address));
            }
            if operators.contains_key(&entry.id) {
                return Err(SnapshotError::DuplicateOperatorId(entry.id));
            }

            for quorum in &entry.quorums {
                let quorum = *quorum as usize;
                if quorum >= quorum_count {
                    return Err(SnapshotError::UnknownQuorum {
                        operator: entry.address,
                        quorum,
                    });
                }
                members[quorum].push((entry.address, entry.id));
            }

            let bitmap = QuorumBitmap::from_quorum_numbers(entry.quorums)?;
            ids.insert(entry.address, entry.id);
            operators.insert(
                entry.id,
                OperatorRecord {
                    address: entry.address,
                    bitmap,
                },
            );
        }

        // Addresses are unique, so sorting by address gives a strict order.
        let members: Vec<Vec<OperatorId>> = members
            .into_iter()
            .map(|mut quorum| {
                quorum.sort_unstable_by_key(|(address, _)| *address);
                quorum.dedup();
                quorum.into_iter().map(|(_, id)| id).collect::<Vec<_>>()
            })
            .collect();

        Ok(Self {
            block: doc.block,
            strategies,
            operators,
            ids,
            members,
        })
    }
}

impl RegistryCoordinator for RegistrySnapshot {
    fn quorum_count(&self) -> Result<u8, CollaboratorError> {
        // Bounded by `MAX_QUORUM_COUNT` at construction.
        Ok(self.members.len() as u8)
    }

    fn current_block(&self) -> Result<BlockNumber, CollaboratorError> {
        Ok(self.block)
    }

    fn operator_snapshot(
        &self,
        quorum: QuorumNumber,
        block: BlockNumber,
    ) -> Result<Vec<OperatorId>, CollaboratorError> {
        if block != self.block {
            return Err(CollaboratorError::new(
                Collaborator::RegistryCoordinator,
                "operator_snapshot",
                format!("snapshot only covers block {}, not {block}", self.block),
            ));
        }
        self.members
            .get(quorum as usize)
            .cloned()
            .ok_or_else(|| Self::unknown_quorum("operator_snapshot", quorum, self.members.len()))
    }

    fn resolve_address(&self, operator_id: OperatorId) -> Result<Address, CollaboratorError> {
        self.operators
            .get(&operator_id)
            .map(|record| record.address)
            .ok_or_else(|| {
                CollaboratorError::new(
                    Collaborator::RegistryCoordinator,
                    "resolve_address",
                    format!("unknown operator id {operator_id}"),
                )
            })
    }

    fn operator_id(&self, operator: Address) -> Result<OperatorId, CollaboratorError> {
        Ok(self.ids.get(&operator).copied().unwrap_or_default())
    }

    fn current_bitmap(&self, operator_id: OperatorId) -> Result<QuorumBitmap, CollaboratorError> {
        Ok(self
            .operators
            .get(&operator_id)
            .map(|record| record.bitmap)
            .unwrap_or_default())
    }
}

impl StakeRegistry for RegistrySnapshot {
    fn strategy_param_count(&self, quorum: QuorumNumber) -> Result<usize, CollaboratorError> {
        self.strategies
            .get(quorum as usize)
            .map(Vec::len)
            .ok_or_else(|| {
                let mut err =
                    Self::unknown_quorum("strategy_param_count", quorum, self.strategies.len());
                err.collaborator = Collaborator::StakeRegistry;
                err
            })
    }

    fn strategy_param_at(
        &self,
        quorum: QuorumNumber,
        index: usize,
    ) -> Result<StrategyParam, CollaboratorError> {
        self.strategies
            .get(quorum as usize)
            .and_then(|params| params.get(index))
            .copied()
            .ok_or_else(|| {
                CollaboratorError::new(
                    Collaborator::StakeRegistry,
                    "strategy_param_at",
                    format!("no strategy at index {index} of quorum {quorum}"),
                )
            })
    }
}
