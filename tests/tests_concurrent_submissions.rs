use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::FromStr;
use rust_decimal::Decimal;

use splitledger::models::{
    CreateExpenseRequest, CreateGroupRequest, Group, MemberRecord, ParticipantShare, SplitKind,
};
use splitledger::service::ExpenseService;
use splitledger::store::{LedgerStore, MemoryLedgerStore};

fn setup_group(store: &MemoryLedgerStore, name: &str, member_count: usize) -> Group {
    store
        .create_group(&CreateGroupRequest {
            name: name.to_string(),
            description: None,
            members: (0..member_count)
                .map(|i| MemberRecord {
                    name: format!("{}-user{}", name, i),
                    email: format!("{}-user{}@example.com", name, i),
                })
                .collect(),
        })
        .unwrap()
}

fn equal_request(amount: &str, paid_by: u64, participants: &[u64]) -> CreateExpenseRequest {
    CreateExpenseRequest {
        description: "shared".to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        paid_by,
        split_kind: SplitKind::Equal,
        participants: participants
            .iter()
            .map(|id| ParticipantShare { user_id: *id, percentage: None })
            .collect(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_group_no_lost_updates() {
    let store = Arc::new(MemoryLedgerStore::new());
    let group = setup_group(&store, "flat", 3);
    let service = Arc::new(ExpenseService::new(store, Duration::from_secs(10)));
    let members = group.members.clone();

    const WRITERS: usize = 32;
    let mut handles = Vec::with_capacity(WRITERS);
    for i in 0..WRITERS {
        let service = service.clone();
        let members = members.clone();
        let group_id = group.id;
        handles.push(tokio::spawn(async move {
            let payer = members[i % members.len()];
            service
                .create_expense(group_id, &equal_request("10.01", payer, &members))
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // All N reflected exactly once
    let expenses = service.group_expenses(group.id).unwrap();
    assert_eq!(expenses.len(), WRITERS);
    let ids: HashSet<u64> = expenses.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), WRITERS);

    // Every committed expense froze exact shares
    for expense in &expenses {
        let total: i64 = expense.splits.iter().map(|s| s.amount_minor).sum();
        assert_eq!(total, expense.amount_minor);
    }

    let balances = service.group_balances(group.id).unwrap();
    let sum: Decimal = balances.iter().map(|b| b.amount).sum();
    assert_eq!(sum, Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_observe_consistent_snapshots() {
    let store = Arc::new(MemoryLedgerStore::new());
    let group = setup_group(&store, "trip", 3);
    let service = Arc::new(ExpenseService::new(store, Duration::from_secs(10)));
    let members = group.members.clone();

    let writer = {
        let service = service.clone();
        let members = members.clone();
        let group_id = group.id;
        tokio::spawn(async move {
            for i in 0..20 {
                let payer = members[i % members.len()];
                service
                    .create_expense(group_id, &equal_request("3.33", payer, &members))
                    .await
                    .unwrap();
            }
        })
    };

    // Balance reads never block on the write region and must sum to zero
    // at every observation, however they interleave with commits.
    let reader = {
        let service = service.clone();
        let group_id = group.id;
        tokio::spawn(async move {
            for _ in 0..50 {
                let balances = service.group_balances(group_id).unwrap();
                let sum: Decimal = balances.iter().map(|b| b.amount).sum();
                assert_eq!(sum, Decimal::ZERO);
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();

    assert_eq!(service.group_expenses(group.id).unwrap().len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_groups_commit_in_parallel() {
    let store = Arc::new(MemoryLedgerStore::new());
    let group_a = setup_group(&store, "a", 2);
    let group_b = setup_group(&store, "b", 2);
    let service = Arc::new(ExpenseService::new(store, Duration::from_secs(10)));

    let mut handles = Vec::new();
    for group in [group_a.clone(), group_b.clone()] {
        for i in 0..10 {
            let service = service.clone();
            let members = group.members.clone();
            let group_id = group.id;
            handles.push(tokio::spawn(async move {
                let payer = members[i % members.len()];
                service
                    .create_expense(group_id, &equal_request("5.00", payer, &members))
                    .await
                    .unwrap();
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for group in [&group_a, &group_b] {
        assert_eq!(service.group_expenses(group.id).unwrap().len(), 10);
        let balances = service.group_balances(group.id).unwrap();
        let sum: Decimal = balances.iter().map(|b| b.amount).sum();
        assert_eq!(sum, Decimal::ZERO);
    }
}

#[tokio::test]
async fn test_abandoned_submission_has_no_effect() {
    let store = Arc::new(MemoryLedgerStore::new());
    let group = setup_group(&store, "flat", 2);
    let service = Arc::new(ExpenseService::new(store, Duration::from_secs(10)));
    let members = group.members.clone();

    // Drop the future before it completes: nothing may be persisted
    {
        let req = equal_request("8.00", members[0], &members);
        let fut = service.create_expense(group.id, &req);
        drop(fut);
    }

    assert!(service.group_expenses(group.id).unwrap().is_empty());

    // The write region was released; later submissions proceed
    service
        .create_expense(group.id, &equal_request("8.00", members[0], &members))
        .await
        .unwrap();
    assert_eq!(service.group_expenses(group.id).unwrap().len(), 1);
}
