//! Field accessors used by `#[derive(Mappable)]` generated code.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;

use crate::error::FieldError;
use crate::shape::ContainerKind;
use crate::value::{LeafType, Scalar, Value};

pub fn read_leaf<L: LeafType>(slot: &L) -> Value<'static> {
    Value::Scalar(slot.to_scalar())
}

pub fn read_optional_leaf<L: LeafType>(slot: &Option<L>) -> Value<'static> {
    slot.as_ref().map_or(Value::Null, read_leaf)
}

pub fn write_leaf<L: LeafType>(slot: &mut L, value: Scalar, field: &str) -> Result<(), FieldError> {
    *slot = L::from_scalar(value)
        .map_err(|found| FieldError::incompatible_type(field, L::KIND, found.kind()))?;
    Ok(())
}

pub fn write_optional_leaf<L: LeafType>(
    slot: &mut Option<L>,
    value: Scalar,
    field: &str,
) -> Result<(), FieldError> {
    let leaf = L::from_scalar(value)
        .map_err(|found| FieldError::incompatible_type(field, L::KIND, found.kind()))?;
    *slot = Some(leaf);
    Ok(())
}

/// Sequence container a mapped element can be appended to.
pub trait Container: Default {
    type Item;

    const KIND: ContainerKind;

    fn append(&mut self, item: Self::Item);
}

impl<T> Container for Vec<T> {
    type Item = T;
    const KIND: ContainerKind = ContainerKind::List;

    fn append(&mut self, item: T) {
        self.push(item);
    }
}

impl<T> Container for VecDeque<T> {
    type Item = T;
    const KIND: ContainerKind = ContainerKind::Deque;

    fn append(&mut self, item: T) {
        self.push_back(item);
    }
}

impl<T: Ord> Container for BTreeSet<T> {
    type Item = T;
    const KIND: ContainerKind = ContainerKind::OrderedSet;

    fn append(&mut self, item: T) {
        self.insert(item);
    }
}

impl<T: Hash + Eq> Container for HashSet<T> {
    type Item = T;
    const KIND: ContainerKind = ContainerKind::HashSet;

    fn append(&mut self, item: T) {
        self.insert(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_leaf_rejects_other_kind() {
        let mut slot = String::new();
        let err = write_leaf(&mut slot, Scalar::Int64(1), "value").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::IncompatibleType);
        assert!(err.message.contains("'value'"));
        assert!(slot.is_empty());
    }

    #[test]
    fn optional_leaf_reads_null_when_absent() {
        let slot: Option<i32> = None;
        assert!(read_optional_leaf(&slot).is_null());

        let mut slot = slot;
        write_optional_leaf(&mut slot, Scalar::Int32(7), "age").unwrap();
        assert_eq!(slot, Some(7));
    }

    #[test]
    fn set_containers_deduplicate() {
        let mut set = BTreeSet::new();
        Container::append(&mut set, 1);
        Container::append(&mut set, 1);
        assert_eq!(set.len(), 1);
        assert_eq!(<BTreeSet<i32> as Container>::KIND, ContainerKind::OrderedSet);
    }
}
