//! # In-Memory State Store
//!
//! Two tables keyed the way the evaluator addresses them: instance →
//! global record, and (instance, account) → local record. Locals are nested
//! under their instance so deleting an instance drops them in one step and
//! the JSON snapshot stays a plain tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use credreg_core::{Address, ContentDigest, InstanceId, Sha256Accumulator};
use credreg_state::{GlobalRecord, LocalRecord, StateStore, StoreError};

/// Digests of the two programs an instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Programs {
    pub approval: ContentDigest,
    pub clear: ContentDigest,
}

impl Programs {
    /// Digest raw program bytes.
    pub fn digest(approval: &[u8], clear: &[u8]) -> Self {
        let hash = |bytes: &[u8]| {
            let mut acc = Sha256Accumulator::new();
            acc.update(bytes);
            acc.finalize()
        };
        Self {
            approval: hash(approval),
            clear: hash(clear),
        }
    }
}

/// Everything the store holds for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    pub creator: Address,
    pub programs: Programs,
    /// `None` only between allocation and the Init mutation.
    #[serde(default)]
    pub global: Option<GlobalRecord>,
    #[serde(default)]
    pub locals: BTreeMap<Address, LocalRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    instances: BTreeMap<InstanceId, InstanceState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly allocated instance with no global record yet.
    pub fn create_instance(&mut self, id: InstanceId, creator: Address, programs: Programs) {
        self.instances.insert(
            id,
            InstanceState {
                creator,
                programs,
                global: None,
                locals: BTreeMap::new(),
            },
        );
    }

    /// Drop an instance together with every local record under it.
    pub fn remove_instance(&mut self, id: InstanceId) -> Option<InstanceState> {
        self.instances.remove(&id)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&InstanceState> {
        self.instances.get(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &InstanceState)> {
        self.instances.iter().map(|(id, state)| (*id, state))
    }

    pub fn set_programs(&mut self, id: InstanceId, programs: Programs) -> Result<(), StoreError> {
        self.instance_mut(id)?.programs = programs;
        Ok(())
    }

    /// Create an empty local record. Returns `false` if one already existed.
    pub fn insert_local(&mut self, id: InstanceId, account: Address) -> Result<bool, StoreError> {
        let locals = &mut self.instance_mut(id)?.locals;
        if locals.contains_key(&account) {
            return Ok(false);
        }
        locals.insert(account, LocalRecord::default());
        Ok(true)
    }

    fn instance_ref(&self, id: InstanceId) -> Result<&InstanceState, StoreError> {
        self.instances
            .get(&id)
            .ok_or(StoreError::InstanceNotFound(id))
    }

    fn instance_mut(&mut self, id: InstanceId) -> Result<&mut InstanceState, StoreError> {
        self.instances
            .get_mut(&id)
            .ok_or(StoreError::InstanceNotFound(id))
    }
}

impl StateStore for MemoryStore {
    fn read_global(&self, instance: InstanceId) -> Result<Option<GlobalRecord>, StoreError> {
        Ok(self.instance_ref(instance)?.global.clone())
    }

    fn write_global(&mut self, instance: InstanceId, record: GlobalRecord) -> Result<(), StoreError> {
        self.instance_mut(instance)?.global = Some(record);
        Ok(())
    }

    fn read_local(
        &self,
        instance: InstanceId,
        account: &Address,
    ) -> Result<Option<LocalRecord>, StoreError> {
        Ok(self.instance_ref(instance)?.locals.get(account).cloned())
    }

    fn write_local(
        &mut self,
        instance: InstanceId,
        account: &Address,
        record: LocalRecord,
    ) -> Result<(), StoreError> {
        let slot = self
            .instance_mut(instance)?
            .locals
            .get_mut(account)
            .ok_or_else(|| StoreError::NotOptedIn {
                instance,
                account: account.clone(),
            })?;
        *slot = record;
        Ok(())
    }

    fn delete_local(&mut self, instance: InstanceId, account: &Address) -> Result<(), StoreError> {
        self.instance_mut(instance)?
            .locals
            .remove(account)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotOptedIn {
                instance,
                account: account.clone(),
            })
    }

    fn is_opted_in(&self, instance: InstanceId, account: &Address) -> Result<bool, StoreError> {
        Ok(self.instance_ref(instance)?.locals.contains_key(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credreg_core::ByteString;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn id(n: u64) -> InstanceId {
        InstanceId::new(n).unwrap()
    }

    fn store_with_instance() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.create_instance(id(1), addr("REG"), Programs::digest(b"approve", b"clear"));
        store
    }

    #[test]
    fn fresh_instance_has_no_global() {
        let store = store_with_instance();
        assert_eq!(store.read_global(id(1)).unwrap(), None);
        assert_eq!(
            store.read_global(id(2)),
            Err(StoreError::InstanceNotFound(id(2)))
        );
    }

    #[test]
    fn insert_local_reports_duplicates() {
        let mut store = store_with_instance();
        assert!(store.insert_local(id(1), addr("S")).unwrap());
        assert!(!store.insert_local(id(1), addr("S")).unwrap());
        assert!(store.is_opted_in(id(1), &addr("S")).unwrap());
    }

    #[test]
    fn write_local_requires_opt_in() {
        let mut store = store_with_instance();
        let err = store
            .write_local(id(1), &addr("S"), LocalRecord::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotOptedIn { .. }));
    }

    #[test]
    fn delete_local_twice_fails() {
        let mut store = store_with_instance();
        store.insert_local(id(1), addr("S")).unwrap();
        store.delete_local(id(1), &addr("S")).unwrap();
        assert!(store.delete_local(id(1), &addr("S")).is_err());
    }

    #[test]
    fn remove_instance_drops_locals() {
        let mut store = store_with_instance();
        store.insert_local(id(1), addr("S")).unwrap();
        let removed = store.remove_instance(id(1)).unwrap();
        assert_eq!(removed.locals.len(), 1);
        assert!(store.read_local(id(1), &addr("S")).is_err());
    }

    #[test]
    fn program_digests_differ_by_content() {
        let a = Programs::digest(b"v1", b"clear");
        let b = Programs::digest(b"v2", b"clear");
        assert_ne!(a.approval, b.approval);
        assert_eq!(a.clear, b.clear);
    }

    #[test]
    fn snapshot_shape() {
        let mut store = store_with_instance();
        store
            .write_global(id(1), GlobalRecord { registrar: addr("REG") })
            .unwrap();
        store.insert_local(id(1), addr("S")).unwrap();
        store
            .write_local(
                id(1),
                &addr("S"),
                LocalRecord {
                    diploma: Some(ByteString::from("d")),
                    degree_duration: Some(4),
                },
            )
            .unwrap();
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["1"]["global"]["registrar"], "REG");
        assert_eq!(json["1"]["locals"]["S"]["degree_duration"], 4);
        let back: MemoryStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }
}
