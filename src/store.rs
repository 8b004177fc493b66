//! Ledger storage: append-only expense log plus the group/user directory.
//!
//! The core requires three things of a store: append an expense with its
//! frozen splits atomically, list a group's expenses, and resolve
//! membership and display names. Directory creation exists so the service
//! is usable end-to-end; the guarded write path never mutates it.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::{
    CreateGroupRequest, Expense, Group, GroupId, LedgerError, Split, SplitKind, User, UserId,
};
use crate::split::ShareAmount;

/// A validated expense awaiting commit. Ids and the timestamp are assigned
/// by the store at append time.
#[derive(Debug, Clone)]
pub struct PendingExpense {
    pub group_id: GroupId,
    pub description: String,
    pub amount_minor: i64,
    pub paid_by: UserId,
    pub split_kind: SplitKind,
    pub shares: Vec<ShareAmount>,
}

pub trait LedgerStore: Send + Sync {
    // Directory (plumbing; the expense write path only reads it)
    fn create_group(&self, req: &CreateGroupRequest) -> Result<Group, LedgerError>;
    fn list_groups(&self) -> Result<Vec<Group>, LedgerError>;
    fn group(&self, group_id: GroupId) -> Result<Option<Group>, LedgerError>;
    fn user(&self, user_id: UserId) -> Result<Option<User>, LedgerError>;
    fn groups_for_user(&self, user_id: UserId) -> Result<Vec<Group>, LedgerError>;

    // Append-only ledger
    fn append_expense(&self, pending: PendingExpense) -> Result<Expense, LedgerError>;
    fn expenses_for_group(&self, group_id: GroupId) -> Result<Vec<Expense>, LedgerError>;
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn freeze_expense(id: u64, mut next_split_id: impl FnMut() -> u64, pending: PendingExpense) -> Expense {
    let splits = pending
        .shares
        .iter()
        .map(|share| Split {
            id: next_split_id(),
            expense_id: id,
            user_id: share.user_id,
            amount_minor: share.amount_minor,
            percentage: share.percentage,
        })
        .collect();

    Expense {
        id,
        group_id: pending.group_id,
        description: pending.description,
        amount_minor: pending.amount_minor,
        paid_by: pending.paid_by,
        split_kind: pending.split_kind,
        created_at: now_ms(),
        splits,
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    users: HashMap<UserId, User>,
    users_by_email: HashMap<String, UserId>,
    groups: HashMap<GroupId, Group>,
    expenses: HashMap<GroupId, Vec<Expense>>,
    next_user_id: u64,
    next_group_id: u64,
    next_expense_id: u64,
    next_split_id: u64,
}

/// RwLock-guarded maps. Canonical store for tests and the default server
/// configuration.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn create_group(&self, req: &CreateGroupRequest) -> Result<Group, LedgerError> {
        let mut inner = self.inner.write().unwrap();

        let mut members = Vec::with_capacity(req.members.len());
        for record in &req.members {
            let existing = inner.users_by_email.get(&record.email).copied();
            let user_id = match existing {
                Some(id) => id,
                None => {
                    inner.next_user_id += 1;
                    let id = inner.next_user_id;
                    inner.users.insert(
                        id,
                        User {
                            id,
                            name: record.name.clone(),
                            email: record.email.clone(),
                        },
                    );
                    inner.users_by_email.insert(record.email.clone(), id);
                    id
                }
            };
            if !members.contains(&user_id) {
                members.push(user_id);
            }
        }

        inner.next_group_id += 1;
        let group = Group {
            id: inner.next_group_id,
            name: req.name.clone(),
            description: req.description.clone(),
            members,
        };
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    fn list_groups(&self) -> Result<Vec<Group>, LedgerError> {
        let inner = self.inner.read().unwrap();
        let mut groups: Vec<Group> = inner.groups.values().cloned().collect();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    fn group(&self, group_id: GroupId) -> Result<Option<Group>, LedgerError> {
        Ok(self.inner.read().unwrap().groups.get(&group_id).cloned())
    }

    fn user(&self, user_id: UserId) -> Result<Option<User>, LedgerError> {
        Ok(self.inner.read().unwrap().users.get(&user_id).cloned())
    }

    fn groups_for_user(&self, user_id: UserId) -> Result<Vec<Group>, LedgerError> {
        let inner = self.inner.read().unwrap();
        let mut groups: Vec<Group> = inner
            .groups
            .values()
            .filter(|g| g.is_member(user_id))
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    fn append_expense(&self, pending: PendingExpense) -> Result<Expense, LedgerError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.groups.contains_key(&pending.group_id) {
            return Err(LedgerError::GroupNotFound(pending.group_id));
        }

        inner.next_expense_id += 1;
        let expense_id = inner.next_expense_id;
        let mut next_split_id = inner.next_split_id;
        let expense = freeze_expense(
            expense_id,
            || {
                next_split_id += 1;
                next_split_id
            },
            pending,
        );
        inner.next_split_id = next_split_id;

        inner
            .expenses
            .entry(expense.group_id)
            .or_default()
            .push(expense.clone());
        Ok(expense)
    }

    fn expenses_for_group(&self, group_id: GroupId) -> Result<Vec<Expense>, LedgerError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.expenses.get(&group_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Sled-backed store
// ---------------------------------------------------------------------------

/// Durable store: one tree per record family, big-endian ids as keys,
/// serde_json values. An expense and its splits are one value under one
/// key, so the append is atomic by construction.
pub struct SledLedgerStore {
    db: sled::Db,
    users: sled::Tree,
    users_by_email: sled::Tree,
    groups: sled::Tree,
    expenses: sled::Tree,
}

fn storage<E: std::fmt::Display>(e: E) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

impl SledLedgerStore {
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let db = sled::open(path).map_err(storage)?;
        Ok(Self {
            users: db.open_tree("users").map_err(storage)?,
            users_by_email: db.open_tree("users_by_email").map_err(storage)?,
            groups: db.open_tree("groups").map_err(storage)?,
            expenses: db.open_tree("expenses").map_err(storage)?,
            db,
        })
    }

    fn next_id(&self) -> Result<u64, LedgerError> {
        // Single monotonic counter shared by all record families
        Ok(self.db.generate_id().map_err(storage)? + 1)
    }

    fn flush(&self) -> Result<(), LedgerError> {
        self.db.flush().map_err(storage)?;
        Ok(())
    }

    /// Expense keys: group id then expense id, both big-endian, so a
    /// group's log is one contiguous prefix scan in append order.
    fn expense_key(group_id: GroupId, expense_id: u64) -> [u8; 16] {
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&group_id.to_be_bytes());
        key[8..].copy_from_slice(&expense_id.to_be_bytes());
        key
    }
}

impl LedgerStore for SledLedgerStore {
    fn create_group(&self, req: &CreateGroupRequest) -> Result<Group, LedgerError> {
        let mut members = Vec::with_capacity(req.members.len());
        for record in &req.members {
            let user_id = match self.users_by_email.get(record.email.as_bytes()).map_err(storage)? {
                Some(raw) => u64::from_be_bytes(raw.as_ref().try_into().map_err(storage)?),
                None => {
                    let id = self.next_id()?;
                    let user = User {
                        id,
                        name: record.name.clone(),
                        email: record.email.clone(),
                    };
                    let encoded = serde_json::to_vec(&user).map_err(storage)?;
                    self.users.insert(id.to_be_bytes(), encoded).map_err(storage)?;
                    self.users_by_email
                        .insert(record.email.as_bytes(), &id.to_be_bytes())
                        .map_err(storage)?;
                    id
                }
            };
            if !members.contains(&user_id) {
                members.push(user_id);
            }
        }

        let group = Group {
            id: self.next_id()?,
            name: req.name.clone(),
            description: req.description.clone(),
            members,
        };
        let encoded = serde_json::to_vec(&group).map_err(storage)?;
        self.groups
            .insert(group.id.to_be_bytes(), encoded)
            .map_err(storage)?;
        self.flush()?;
        Ok(group)
    }

    fn list_groups(&self) -> Result<Vec<Group>, LedgerError> {
        let mut groups = Vec::new();
        for entry in self.groups.iter() {
            let (_, raw) = entry.map_err(storage)?;
            groups.push(serde_json::from_slice(&raw).map_err(storage)?);
        }
        Ok(groups)
    }

    fn group(&self, group_id: GroupId) -> Result<Option<Group>, LedgerError> {
        match self.groups.get(group_id.to_be_bytes()).map_err(storage)? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw).map_err(storage)?)),
            None => Ok(None),
        }
    }

    fn user(&self, user_id: UserId) -> Result<Option<User>, LedgerError> {
        match self.users.get(user_id.to_be_bytes()).map_err(storage)? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw).map_err(storage)?)),
            None => Ok(None),
        }
    }

    fn groups_for_user(&self, user_id: UserId) -> Result<Vec<Group>, LedgerError> {
        Ok(self
            .list_groups()?
            .into_iter()
            .filter(|g| g.is_member(user_id))
            .collect())
    }

    fn append_expense(&self, pending: PendingExpense) -> Result<Expense, LedgerError> {
        if self.group(pending.group_id)?.is_none() {
            return Err(LedgerError::GroupNotFound(pending.group_id));
        }

        let expense_id = self.next_id()?;
        let mut split_id = expense_id * 1000;
        let expense = freeze_expense(
            expense_id,
            || {
                split_id += 1;
                split_id
            },
            pending,
        );

        let key = Self::expense_key(expense.group_id, expense.id);
        let encoded = serde_json::to_vec(&expense).map_err(storage)?;
        self.expenses.insert(key, encoded).map_err(storage)?;
        self.flush()?;
        Ok(expense)
    }

    fn expenses_for_group(&self, group_id: GroupId) -> Result<Vec<Expense>, LedgerError> {
        let mut expenses = Vec::new();
        for entry in self.expenses.scan_prefix(group_id.to_be_bytes()) {
            let (_, raw) = entry.map_err(storage)?;
            expenses.push(serde_json::from_slice(&raw).map_err(storage)?);
        }
        Ok(expenses)
    }
}
