//! # State Store Contract
//!
//! The evaluator reads through [`StateStore`] and never writes; writes happen
//! when the host hands an accepted mutation set to [`apply`].
//!
//! ## Atomicity
//!
//! `apply` validates every mutation before performing any write. A mutation
//! set that cannot be applied in full leaves the store untouched.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use credreg_core::{Address, ByteString, InstanceId};

use crate::decision::Mutation;

/// The one global record of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRecord {
    pub registrar: Address,
}

/// Per-(instance, account) credential record.
///
/// Exists only while the account is opted in. Absent fields are absent, not
/// zeroed: a revoked record has neither key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diploma: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree_duration: Option<u64>,
}

impl LocalRecord {
    pub fn is_empty(&self) -> bool {
        self.diploma.is_none() && self.degree_duration.is_none()
    }
}

/// Store-level failures. All of them are state-consistency rejections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("instance {0} does not exist")]
    InstanceNotFound(InstanceId),

    #[error("account {account} has not opted in to instance {instance}")]
    NotOptedIn {
        instance: InstanceId,
        account: Address,
    },
}

/// Global and local state of deployed instances.
pub trait StateStore {
    /// `Ok(None)` while an instance exists but has not been initialized.
    fn read_global(&self, instance: InstanceId) -> Result<Option<GlobalRecord>, StoreError>;

    fn write_global(&mut self, instance: InstanceId, record: GlobalRecord) -> Result<(), StoreError>;

    /// `Ok(None)` when `account` is not opted in.
    fn read_local(
        &self,
        instance: InstanceId,
        account: &Address,
    ) -> Result<Option<LocalRecord>, StoreError>;

    /// Replace an existing local record. Fails with `NotOptedIn` if there is none.
    fn write_local(
        &mut self,
        instance: InstanceId,
        account: &Address,
        record: LocalRecord,
    ) -> Result<(), StoreError>;

    /// Remove a local record. Fails with `NotOptedIn` if there is none.
    fn delete_local(&mut self, instance: InstanceId, account: &Address) -> Result<(), StoreError>;

    fn is_opted_in(&self, instance: InstanceId, account: &Address) -> Result<bool, StoreError> {
        Ok(self.read_local(instance, account)?.is_some())
    }
}

/// Apply an accepted mutation set, all or nothing.
pub fn apply<S: StateStore + ?Sized>(
    store: &mut S,
    instance: InstanceId,
    mutations: &[Mutation],
) -> Result<(), StoreError> {
    validate(store, instance, mutations)?;
    for mutation in mutations {
        match mutation {
            Mutation::SetRegistrar(registrar) => {
                store.write_global(
                    instance,
                    GlobalRecord {
                        registrar: registrar.clone(),
                    },
                )?;
            }
            Mutation::WriteCredential {
                account,
                diploma,
                degree_duration,
            } => {
                let record = LocalRecord {
                    diploma: Some(diploma.clone()),
                    degree_duration: Some(*degree_duration),
                };
                store.write_local(instance, account, record)?;
            }
            Mutation::RevokeCredential { account } => {
                store.write_local(instance, account, LocalRecord::default())?;
            }
            Mutation::RemoveLocal { account } => {
                store.delete_local(instance, account)?;
            }
        }
    }
    Ok(())
}

fn validate<S: StateStore + ?Sized>(
    store: &S,
    instance: InstanceId,
    mutations: &[Mutation],
) -> Result<(), StoreError> {
    // Existence check for the instance itself.
    store.read_global(instance)?;

    let mut removed = BTreeSet::new();
    for mutation in mutations {
        let Some(account) = mutation.target_account() else {
            continue;
        };
        if removed.contains(account) || !store.is_opted_in(instance, account)? {
            return Err(StoreError::NotOptedIn {
                instance,
                account: account.clone(),
            });
        }
        if matches!(mutation, Mutation::RemoveLocal { .. }) {
            removed.insert(account.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MapStore;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn id() -> InstanceId {
        InstanceId::new(1).unwrap()
    }

    #[test]
    fn write_credential_overwrites() {
        let mut store = MapStore::with_instance(id(), addr("REG"));
        store.opt_in(id(), addr("S"));
        let issue = |d: &str, n| Mutation::WriteCredential {
            account: addr("S"),
            diploma: ByteString::from(d),
            degree_duration: n,
        };
        apply(&mut store, id(), &[issue("first", 3)]).unwrap();
        apply(&mut store, id(), &[issue("second", 4)]).unwrap();
        let rec = store.read_local(id(), &addr("S")).unwrap().unwrap();
        assert_eq!(rec.diploma.unwrap().as_utf8(), Some("second"));
        assert_eq!(rec.degree_duration, Some(4));
    }

    #[test]
    fn revoke_leaves_empty_record() {
        let mut store = MapStore::with_instance(id(), addr("REG"));
        store.opt_in(id(), addr("S"));
        apply(
            &mut store,
            id(),
            &[Mutation::WriteCredential {
                account: addr("S"),
                diploma: ByteString::from("d"),
                degree_duration: 4,
            }],
        )
        .unwrap();
        apply(&mut store, id(), &[Mutation::RevokeCredential { account: addr("S") }]).unwrap();
        let rec = store.read_local(id(), &addr("S")).unwrap().unwrap();
        assert!(rec.is_empty());
    }

    #[test]
    fn non_opted_in_target_aborts_whole_set() {
        let mut store = MapStore::with_instance(id(), addr("REG"));
        let result = apply(
            &mut store,
            id(),
            &[
                Mutation::SetRegistrar(addr("NEW")),
                Mutation::RevokeCredential { account: addr("GHOST") },
            ],
        );
        assert!(matches!(result, Err(StoreError::NotOptedIn { .. })));
        // The registrar write that preceded the failing mutation never happened.
        let global = store.read_global(id()).unwrap().unwrap();
        assert_eq!(global.registrar.as_str(), "REG");
    }

    #[test]
    fn removal_then_write_is_rejected() {
        let mut store = MapStore::with_instance(id(), addr("REG"));
        store.opt_in(id(), addr("S"));
        let result = apply(
            &mut store,
            id(),
            &[
                Mutation::RemoveLocal { account: addr("S") },
                Mutation::RevokeCredential { account: addr("S") },
            ],
        );
        assert!(result.is_err());
        assert!(store.is_opted_in(id(), &addr("S")).unwrap());
    }

    #[test]
    fn missing_instance() {
        let mut store = MapStore::default();
        let result = apply(&mut store, id(), &[Mutation::SetRegistrar(addr("R"))]);
        assert_eq!(result, Err(StoreError::InstanceNotFound(id())));
    }

    #[test]
    fn local_record_serde_omits_absent_fields() {
        let empty = LocalRecord::default();
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
        let full = LocalRecord {
            diploma: Some(ByteString::from("hi")),
            degree_duration: Some(4),
        };
        assert_eq!(
            serde_json::to_string(&full).unwrap(),
            r#"{"diploma":"aGk=","degree_duration":4}"#
        );
    }
}
