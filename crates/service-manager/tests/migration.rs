//! Migration runs against in-memory collaborators.

use opset_primitives::{Address, B256};
use opset_service_manager::{
    OperatorEntry, QuorumEntry, RegistryCoordinator, RegistrySnapshot, ServiceEvent,
    ServiceManagerError, SnapshotDocument,
};
use opset_test_utils::{random_snapshot_document, DirectoryCall, TestHarness, OWNER};
use rand::{rngs::StdRng, SeedableRng};

fn operator(byte: u8, quorums: Vec<u8>) -> OperatorEntry {
    OperatorEntry {
        id: B256::with_last_byte(byte),
        address: Address::with_last_byte(byte),
        quorums,
    }
}

/// q0 = {X, Y}, q1 = {Y, Z} with X < Y < Z.
fn overlapping_quorums() -> SnapshotDocument {
    SnapshotDocument {
        block: 7,
        quorums: vec![QuorumEntry::default(), QuorumEntry::default()],
        operators: vec![
            operator(0x30, vec![1]),
            operator(0x10, vec![0]),
            operator(0x20, vec![0, 1]),
        ],
    }
}

#[test]
fn test_overlapping_quorums_migrate_to_operator_sets() {
    let mut harness = TestHarness::from_document(overlapping_quorums());
    let (x, y, z) = (
        Address::with_last_byte(0x10),
        Address::with_last_byte(0x20),
        Address::with_last_byte(0x30),
    );

    let plan = harness
        .manager
        .migrate_and_create_operator_sets(OWNER)
        .unwrap();

    assert_eq!(plan.operators, vec![x, y, z]);
    assert_eq!(plan.operator_set_ids, vec![vec![0], vec![0, 1], vec![1]]);
    assert_eq!(
        harness.directory.calls(),
        vec![
            DirectoryCall::BecomeOperatorSetAuthority,
            DirectoryCall::CreateOperatorSets(vec![0, 1]),
            DirectoryCall::MigrateOperators {
                operators: vec![x, y, z],
                operator_set_ids: vec![vec![0], vec![0, 1], vec![1]],
            },
        ]
    );
    assert_eq!(
        harness.events.events(),
        vec![ServiceEvent::OperatorsMigrated {
            operator_sets_created: 2,
            operators: 3,
        }]
    );
}

#[test]
fn test_plan_matches_executed_migration() {
    let mut harness = TestHarness::from_document(overlapping_quorums());

    let planned = harness.manager.operators_to_migrate().unwrap();
    assert!(harness.directory.calls().is_empty());

    let executed = harness
        .manager
        .migrate_and_create_operator_sets(OWNER)
        .unwrap();
    assert_eq!(planned, executed);
}

#[test]
fn test_zero_quorums_create_no_operator_sets() {
    let mut harness = TestHarness::empty();

    let plan = harness
        .manager
        .migrate_and_create_operator_sets(OWNER)
        .unwrap();

    assert!(plan.is_empty());
    assert!(harness.directory.created_operator_sets().is_empty());
    assert_eq!(
        harness.directory.calls(),
        vec![DirectoryCall::BecomeOperatorSetAuthority]
    );
    assert!(harness.manager.restakeable_strategies().unwrap().is_empty());
}

#[test]
fn test_failed_final_call_keeps_authority_switch() {
    let mut harness = TestHarness::from_document(overlapping_quorums());
    harness.directory.failures().fail_on("migrate_operators");

    let err = harness
        .manager
        .migrate_and_create_operator_sets(OWNER)
        .unwrap_err();

    assert!(matches!(err, ServiceManagerError::Collaborator(_)));
    // The authority switch and the set creation already happened and are not undone.
    assert!(harness.directory.is_operator_set_authority());
    assert_eq!(harness.directory.created_operator_sets(), vec![0, 1]);
    assert!(harness.events.events().is_empty());
}

#[test]
fn test_registry_failure_aborts_migration() {
    let mut harness = TestHarness::from_document(overlapping_quorums());
    harness.registry.registry_failures().fail_on("current_bitmap");

    let err = harness
        .manager
        .migrate_and_create_operator_sets(OWNER)
        .unwrap_err();

    assert!(matches!(err, ServiceManagerError::Collaborator(_)));
    assert!(harness.directory.created_operator_sets().is_empty());
}

#[test]
fn test_migration_can_rerun_until_finalized() {
    let mut harness = TestHarness::from_document(overlapping_quorums());

    harness
        .manager
        .migrate_and_create_operator_sets(OWNER)
        .unwrap();

    // An operator joined q0 after the first run.
    let mut doc = overlapping_quorums();
    doc.operators.push(operator(0x40, vec![0]));
    harness
        .registry
        .replace_snapshot(RegistrySnapshot::try_from(doc).unwrap());

    let second = harness
        .manager
        .migrate_and_create_operator_sets(OWNER)
        .unwrap();
    assert_eq!(second.operators.len(), 4);

    harness.manager.finalize_migration(OWNER).unwrap();
    assert_eq!(
        harness
            .manager
            .migrate_and_create_operator_sets(OWNER)
            .unwrap_err(),
        ServiceManagerError::MigrationFinalized
    );
}

#[test]
fn test_random_snapshots_migrate_every_member_once() {
    let mut rng = StdRng::seed_from_u64(0x0b5e7);

    for _ in 0..16 {
        let doc = random_snapshot_document(&mut rng, 6, 40);
        let mut harness = TestHarness::from_document(doc.clone());

        let plan = harness
            .manager
            .migrate_and_create_operator_sets(OWNER)
            .unwrap();

        // Exactly the operators with at least one quorum, sorted and unique.
        let mut expected: Vec<Address> = doc
            .operators
            .iter()
            .filter(|op| !op.quorums.is_empty())
            .map(|op| op.address)
            .collect();
        expected.sort_unstable();
        assert_eq!(plan.operators, expected);

        for (address, assignment) in plan.operators.iter().zip(&plan.operator_set_ids) {
            let entry = doc
                .operators
                .iter()
                .find(|op| op.address == *address)
                .unwrap();
            let mut quorums: Vec<u32> = entry.quorums.iter().map(|q| u32::from(*q)).collect();
            quorums.sort_unstable();
            assert_eq!(assignment, &quorums);
        }

        assert_eq!(
            harness.directory.created_operator_sets(),
            (0..harness.registry.quorum_count().unwrap() as u32).collect::<Vec<_>>()
        );
    }
}
