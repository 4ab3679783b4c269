// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Result records and the arenas owning their values.

use crate::value::Value;
use std::sync::Arc;

/// The allocation region owning the values of one decoded record.
///
/// Arenas are shared between all handles onto the record and are released as
/// a unit when the last handle drops.
#[derive(Debug)]
pub struct ValueArena {
    values: Vec<Value>,
}

impl ValueArena {
    /// Take ownership of a decoded row of values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// The values held in this arena.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// One row of a result set: an ordered tuple of [`Value`]s.
///
/// A `Record` is a cheap handle onto a shared [`ValueArena`]; the arena's
/// strong count is the record's retain count. [`Record::retain`] (or
/// [`Clone`]) raises it, dropping a handle lowers it, and the values are
/// released when the last handle goes away. Keep a handle around to use a
/// record beyond the next fetch from its stream.
#[derive(Debug, Clone)]
pub struct Record {
    arena: Arc<ValueArena>,
}

impl Record {
    /// Build a record owning the given row of values.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            arena: Arc::new(ValueArena::new(values)),
        }
    }

    /// The number of fields in the record.
    pub fn len(&self) -> usize {
        self.arena.values().len()
    }

    /// Does the record have no fields at all?
    pub fn is_empty(&self) -> bool {
        self.arena.values().is_empty()
    }

    /// The `i`-th field of the record, or the null value if `i` is out of
    /// range.
    pub fn field(&self, i: usize) -> &Value {
        self.arena.values().get(i).unwrap_or(Value::NULL)
    }

    /// The `i`-th field of the record, or `None` if `i` is out of range.
    pub fn get(&self, i: usize) -> Option<&Value> {
        self.arena.values().get(i)
    }

    /// All fields of the record, in server order.
    pub fn values(&self) -> &[Value] {
        self.arena.values()
    }

    /// Take another handle onto this record, extending the lifetime of its
    /// values until that handle is dropped. Equivalent to [`Clone::clone`].
    pub fn retain(&self) -> Record {
        self.clone()
    }

    /// How many handles onto this record currently exist.
    pub fn retain_count(&self) -> usize {
        Arc::strong_count(&self.arena)
    }
}

impl std::ops::Index<usize> for Record {
    type Output = Value;

    fn index(&self, i: usize) -> &Value {
        self.field(i)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> Record {
        Record::from_values(vec![Value::Int(1), Value::String("a".into())])
    }

    #[test]
    fn fields_index_in_server_order() {
        let r = record();
        assert_eq!(r.len(), 2);
        assert_eq!(r.field(0), &Value::Int(1));
        assert_eq!(r.field(1), &Value::String("a".into()));
        assert_eq!(r[0], Value::Int(1));
    }

    #[test]
    fn out_of_range_fields_are_null_not_an_error() {
        let r = record();
        assert_eq!(r.field(2), &Value::Null);
        assert_eq!(r.field(usize::MAX), &Value::Null);
        assert_eq!(r.get(2), None);
    }

    #[test]
    fn retained_handles_share_one_arena() {
        let r = record();
        assert_eq!(r.retain_count(), 1);

        let held = r.retain();
        assert_eq!(r.retain_count(), 2);

        drop(r);
        assert_eq!(held.retain_count(), 1);
        // The values survive as long as any handle does.
        assert_eq!(held.field(0), &Value::Int(1));
    }
}
