//! In-crate fixture store for unit tests.

use std::collections::BTreeMap;

use credreg_core::{Address, InstanceId};

use crate::store::{GlobalRecord, LocalRecord, StateStore, StoreError};

#[derive(Debug, Default)]
pub(crate) struct MapStore {
    globals: BTreeMap<InstanceId, Option<GlobalRecord>>,
    locals: BTreeMap<(InstanceId, Address), LocalRecord>,
}

impl MapStore {
    pub(crate) fn with_instance(instance: InstanceId, registrar: Address) -> Self {
        let mut store = Self::default();
        store
            .globals
            .insert(instance, Some(GlobalRecord { registrar }));
        store
    }

    pub(crate) fn opt_in(&mut self, instance: InstanceId, account: Address) {
        self.locals.insert((instance, account), LocalRecord::default());
    }
}

impl StateStore for MapStore {
    fn read_global(&self, instance: InstanceId) -> Result<Option<GlobalRecord>, StoreError> {
        self.globals
            .get(&instance)
            .cloned()
            .ok_or(StoreError::InstanceNotFound(instance))
    }

    fn write_global(&mut self, instance: InstanceId, record: GlobalRecord) -> Result<(), StoreError> {
        let slot = self
            .globals
            .get_mut(&instance)
            .ok_or(StoreError::InstanceNotFound(instance))?;
        *slot = Some(record);
        Ok(())
    }

    fn read_local(
        &self,
        instance: InstanceId,
        account: &Address,
    ) -> Result<Option<LocalRecord>, StoreError> {
        self.read_global(instance)?;
        Ok(self.locals.get(&(instance, account.clone())).cloned())
    }

    fn write_local(
        &mut self,
        instance: InstanceId,
        account: &Address,
        record: LocalRecord,
    ) -> Result<(), StoreError> {
        let slot = self
            .locals
            .get_mut(&(instance, account.clone()))
            .ok_or_else(|| StoreError::NotOptedIn {
                instance,
                account: account.clone(),
            })?;
        *slot = record;
        Ok(())
    }

    fn delete_local(&mut self, instance: InstanceId, account: &Address) -> Result<(), StoreError> {
        self.locals
            .remove(&(instance, account.clone()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotOptedIn {
                instance,
                account: account.clone(),
            })
    }
}
