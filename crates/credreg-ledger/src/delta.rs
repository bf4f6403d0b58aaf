//! # State Deltas
//!
//! Key-level differences between two snapshots of a global or local record,
//! reported with every confirmed transaction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use credreg_core::{Address, ByteString};
use credreg_state::{GlobalRecord, LocalRecord};

pub const REGISTRAR_KEY: &str = "registrar";
pub const DIPLOMA_KEY: &str = "diploma";
pub const DEGREE_DURATION_KEY: &str = "degree_duration";

/// A stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    Address(Address),
    Bytes(ByteString),
    Uint(u64),
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "{a}"),
            Self::Bytes(b) => write!(f, "{b}"),
            Self::Uint(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDelta {
    Set(StateValue),
    Deleted,
}

impl fmt::Display for ValueDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(v) => write!(f, "= {v}"),
            Self::Deleted => f.write_str("deleted"),
        }
    }
}

/// Changed keys only. Empty when nothing changed.
pub type StateDelta = BTreeMap<String, ValueDelta>;

fn global_entries(record: Option<&GlobalRecord>) -> BTreeMap<&'static str, StateValue> {
    record
        .map(|r| (REGISTRAR_KEY, StateValue::Address(r.registrar.clone())))
        .into_iter()
        .collect()
}

fn local_entries(record: Option<&LocalRecord>) -> BTreeMap<&'static str, StateValue> {
    let mut entries = BTreeMap::new();
    if let Some(r) = record {
        if let Some(diploma) = &r.diploma {
            entries.insert(DIPLOMA_KEY, StateValue::Bytes(diploma.clone()));
        }
        if let Some(duration) = r.degree_duration {
            entries.insert(DEGREE_DURATION_KEY, StateValue::Uint(duration));
        }
    }
    entries
}

fn diff(
    before: BTreeMap<&'static str, StateValue>,
    mut after: BTreeMap<&'static str, StateValue>,
) -> StateDelta {
    let mut delta = StateDelta::new();
    for (key, old) in before {
        match after.remove(key) {
            Some(new) if new == old => {}
            Some(new) => {
                delta.insert(key.to_string(), ValueDelta::Set(new));
            }
            None => {
                delta.insert(key.to_string(), ValueDelta::Deleted);
            }
        }
    }
    for (key, new) in after {
        delta.insert(key.to_string(), ValueDelta::Set(new));
    }
    delta
}

pub fn global_delta(before: Option<&GlobalRecord>, after: Option<&GlobalRecord>) -> StateDelta {
    diff(global_entries(before), global_entries(after))
}

pub fn local_delta(before: Option<&LocalRecord>, after: Option<&LocalRecord>) -> StateDelta {
    diff(local_entries(before), local_entries(after))
}
