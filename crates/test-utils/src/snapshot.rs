//! Random registry snapshots.

use opset_primitives::{Address, QuorumNumber, B256};
use opset_service_manager::{OperatorEntry, QuorumEntry, SnapshotDocument, StrategyEntry};
use rand::Rng;

/// Generates a snapshot with `quorum_count` quorums and `operator_count` operators.
///
/// Each operator joins each quorum with probability one half, and each quorum gets up to three
/// strategies. Operator ids and addresses are distinct.
pub fn random_snapshot_document<R: Rng>(
    rng: &mut R,
    quorum_count: usize,
    operator_count: usize,
) -> SnapshotDocument {
    let quorums = (0..quorum_count)
        .map(|_| QuorumEntry {
            strategies: (0..rng.gen_range(0..=3))
                .map(|_| StrategyEntry {
                    strategy: Address::from(rng.gen::<[u8; 20]>()),
                    multiplier: rng.gen_range(1..=1_000_000),
                })
                .collect(),
        })
        .collect();

    let operators = (0..operator_count)
        .map(|i| {
            // Index-derived prefixes keep ids and addresses distinct.
            let mut id = rng.gen::<[u8; 32]>();
            id[..8].copy_from_slice(&(i as u64).to_be_bytes());
            let mut address = rng.gen::<[u8; 20]>();
            address[..8].copy_from_slice(&(i as u64 + 1).to_be_bytes());

            let quorums = (0..quorum_count)
                .filter(|_| rng.gen_bool(0.5))
                .map(|q| q as QuorumNumber)
                .collect();

            OperatorEntry {
                id: B256::from(id),
                address: Address::from(address),
                quorums,
            }
        })
        .collect();

    SnapshotDocument {
        block: rng.gen_range(1..1_000_000),
        quorums,
        operators,
    }
}
