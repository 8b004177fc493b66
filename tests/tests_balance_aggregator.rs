use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::FromStr;
use rust_decimal::Decimal;

use splitledger::models::{
    CreateExpenseRequest, CreateGroupRequest, Group, LedgerError, MemberRecord, ParticipantShare,
    SplitKind,
};
use splitledger::service::ExpenseService;
use splitledger::store::{LedgerStore, MemoryLedgerStore};

fn setup() -> (Arc<MemoryLedgerStore>, ExpenseService, Group) {
    let store = Arc::new(MemoryLedgerStore::new());
    let group = store
        .create_group(&CreateGroupRequest {
            name: "flat".to_string(),
            description: Some("shared flat".to_string()),
            members: vec![
                MemberRecord { name: "Ana".to_string(), email: "ana@example.com".to_string() },
                MemberRecord { name: "Bo".to_string(), email: "bo@example.com".to_string() },
                MemberRecord { name: "Cy".to_string(), email: "cy@example.com".to_string() },
            ],
        })
        .unwrap();
    let service = ExpenseService::new(store.clone(), Duration::from_secs(5));
    (store, service, group)
}

fn equal_request(amount: &str, paid_by: u64, participants: &[u64]) -> CreateExpenseRequest {
    CreateExpenseRequest {
        description: "expense".to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        paid_by,
        split_kind: SplitKind::Equal,
        participants: participants
            .iter()
            .map(|id| ParticipantShare { user_id: *id, percentage: None })
            .collect(),
    }
}

#[tokio::test]
async fn test_group_balances_with_names_and_zero_sum() {
    let (_, service, group) = setup();
    let m = group.members.clone();

    service
        .create_expense(group.id, &equal_request("9.00", m[0], &m))
        .await
        .unwrap();
    service
        .create_expense(group.id, &equal_request("4.97", m[1], &[m[1], m[2]]))
        .await
        .unwrap();

    let balances = service.group_balances(group.id).unwrap();
    assert_eq!(balances.len(), 3);
    assert_eq!(balances[0].user_name, "Ana");

    // Ana paid 900, owes 300 -> +600
    assert_eq!(balances[0].amount, Decimal::from_str("6.00").unwrap());
    // Bo paid 497, owes 300 + 249 -> -52
    assert_eq!(balances[1].amount, Decimal::from_str("-0.52").unwrap());
    // Cy owes 300 + 248 -> -548
    assert_eq!(balances[2].amount, Decimal::from_str("-5.48").unwrap());

    let sum: Decimal = balances.iter().map(|b| b.amount).sum();
    assert_eq!(sum, Decimal::ZERO);
}

#[tokio::test]
async fn test_empty_log_yields_all_zero() {
    let (_, service, group) = setup();
    let balances = service.group_balances(group.id).unwrap();
    assert_eq!(balances.len(), 3);
    assert!(balances.iter().all(|b| b.amount == Decimal::ZERO));
}

#[tokio::test]
async fn test_recomputation_is_idempotent() {
    let (_, service, group) = setup();
    let m = group.members.clone();
    service
        .create_expense(group.id, &equal_request("10.01", m[2], &m))
        .await
        .unwrap();

    let first = service.group_balances(group.id).unwrap();
    let second = service.group_balances(group.id).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rejected_expense_leaves_balances_unchanged() {
    let (_, service, group) = setup();
    let m = group.members.clone();
    service
        .create_expense(group.id, &equal_request("9.00", m[0], &m))
        .await
        .unwrap();
    let before = service.group_balances(group.id).unwrap();

    // Payer is not a member of the group
    let err = service
        .create_expense(group.id, &equal_request("50.00", 999, &m))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::PayerNotMember { user_id: 999, group_id: group.id });

    let after = service.group_balances(group.id).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_user_balances_across_groups() {
    let (store, service, group) = setup();
    let m = group.members.clone();

    // Second group shares Ana and Bo (dedupe by email)
    let other = store
        .create_group(&CreateGroupRequest {
            name: "trip".to_string(),
            description: None,
            members: vec![
                MemberRecord { name: "Ana".to_string(), email: "ana@example.com".to_string() },
                MemberRecord { name: "Bo".to_string(), email: "bo@example.com".to_string() },
            ],
        })
        .unwrap();

    // flat: Ana +600
    service
        .create_expense(group.id, &equal_request("9.00", m[0], &m))
        .await
        .unwrap();
    // trip: Ana pays 10.00 split two ways -> +500
    service
        .create_expense(other.id, &equal_request("10.00", m[0], &[m[0], m[1]]))
        .await
        .unwrap();

    let summary = service.user_balances(m[0]).unwrap();
    assert_eq!(summary.user_name, "Ana");
    assert_eq!(summary.net, Decimal::from_str("11.00").unwrap());
    assert_eq!(summary.groups.len(), 2);
    assert_eq!(summary.groups[0].group_name, "flat");
    assert_eq!(summary.groups[0].amount, Decimal::from_str("6.00").unwrap());
    assert_eq!(summary.groups[1].group_name, "trip");
    assert_eq!(summary.groups[1].amount, Decimal::from_str("5.00").unwrap());

    // Bo owes in both groups
    let bo = service.user_balances(m[1]).unwrap();
    assert_eq!(bo.net, Decimal::from_str("-8.00").unwrap());

    let err = service.user_balances(12345).unwrap_err();
    assert_eq!(err, LedgerError::UserNotFound(12345));
}

#[tokio::test]
async fn test_reordered_log_same_balances() {
    // Two independent stores fed the same expenses in different orders
    // must agree on every balance.
    let (_, service_a, group_a) = setup();
    let (_, service_b, group_b) = setup();
    let m_a = group_a.members.clone();
    let m_b = group_b.members.clone();

    let first = equal_request("10.01", m_a[0], &m_a);
    let second = equal_request("7.77", m_a[1], &[m_a[1], m_a[2]]);

    service_a.create_expense(group_a.id, &first).await.unwrap();
    service_a.create_expense(group_a.id, &second).await.unwrap();

    service_b.create_expense(group_b.id, &second).await.unwrap();
    service_b.create_expense(group_b.id, &first).await.unwrap();

    let a = service_a.group_balances(group_a.id).unwrap();
    let b = service_b.group_balances(group_b.id).unwrap();
    assert_eq!(a, b);
}
