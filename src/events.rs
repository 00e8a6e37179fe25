//! Events: partial, schema-checked assignments of attribute values.
//!
//! An event assigns values to a subset of the schema; attributes that are
//! never assigned (or explicitly marked undefined) stay undefined and make
//! the literals that test them evaluate to the third truth value.

use crate::{
    error::EventError,
    schema::{AttributeId, AttributeKind, Schema},
    strings::{StringId, StringTable},
};
use itertools::Itertools;
use rust_decimal::Decimal;

/// A typed value carried by an event for one attribute. List values are kept
/// sorted so membership checks can binary-search them.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Float(Decimal),
    String(StringId),
    IntegerList(Vec<i64>),
    StringList(Vec<StringId>),
}

impl AttributeValue {
    fn kind(&self) -> AttributeKind {
        match self {
            Self::Boolean(_) => AttributeKind::Boolean,
            Self::Integer(_) => AttributeKind::Integer,
            Self::Float(_) => AttributeKind::Float,
            Self::String(_) => AttributeKind::String,
            Self::IntegerList(_) => AttributeKind::IntegerList,
            Self::StringList(_) => AttributeKind::StringList,
        }
    }
}

enum Slot {
    Unset,
    Undefined,
    Defined(AttributeValue),
}

/// Accumulates attribute values for one search call, validating each against
/// the schema as it is added. Consumed by [`EventBuilder::build`].
pub struct EventBuilder<'a> {
    schema: &'a Schema,
    strings: &'a StringTable,
    slots: Vec<Slot>,
}

impl<'a> EventBuilder<'a> {
    pub(crate) fn new(schema: &'a Schema, strings: &'a StringTable) -> Self {
        Self {
            schema,
            strings,
            slots: (0..schema.len()).map(|_| Slot::Unset).collect(),
        }
    }

    pub fn with_boolean(&mut self, name: &str, value: bool) -> Result<(), EventError> {
        self.assign(name, AttributeValue::Boolean(value))
    }

    pub fn with_integer(&mut self, name: &str, value: i64) -> Result<(), EventError> {
        self.assign(name, AttributeValue::Integer(value))
    }

    pub fn with_float(&mut self, name: &str, value: Decimal) -> Result<(), EventError> {
        self.assign(name, AttributeValue::Float(value))
    }

    pub fn with_string(&mut self, name: &str, value: &str) -> Result<(), EventError> {
        self.assign(name, AttributeValue::String(self.strings.lookup(value)))
    }

    pub fn with_integer_list(&mut self, name: &str, values: &[i64]) -> Result<(), EventError> {
        let values = values.iter().copied().sorted_unstable().dedup().collect();
        self.assign(name, AttributeValue::IntegerList(values))
    }

    pub fn with_string_list(&mut self, name: &str, values: &[&str]) -> Result<(), EventError> {
        let values = values
            .iter()
            .map(|value| self.strings.lookup(value))
            .sorted_unstable()
            .dedup()
            .collect();
        self.assign(name, AttributeValue::StringList(values))
    }

    /// Marks an attribute as explicitly undefined. Equivalent to never
    /// assigning it, but lets boundary layers distinguish "not yet set" from
    /// "known to be absent".
    pub fn with_undefined(&mut self, name: &str) -> Result<(), EventError> {
        let id = self.resolve(name)?;
        self.claim(id, name)?;
        self.slots[id.index()] = Slot::Undefined;
        Ok(())
    }

    pub fn build(self) -> Event {
        Event {
            values: self
                .slots
                .into_iter()
                .map(|slot| match slot {
                    Slot::Defined(value) => Some(value),
                    Slot::Unset | Slot::Undefined => None,
                })
                .collect(),
        }
    }

    fn assign(&mut self, name: &str, value: AttributeValue) -> Result<(), EventError> {
        let id = self.resolve(name)?;
        let expected = self.schema.kind(id);
        let found = value.kind();
        if expected != found {
            return Err(EventError::TypeMismatch {
                name: name.to_owned(),
                expected,
                found,
            });
        }
        self.claim(id, name)?;
        self.slots[id.index()] = Slot::Defined(value);
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<AttributeId, EventError> {
        self.schema
            .resolve(name)
            .ok_or_else(|| EventError::UnknownAttribute(name.to_owned()))
    }

    fn claim(&self, id: AttributeId, name: &str) -> Result<(), EventError> {
        if matches!(self.slots[id.index()], Slot::Unset) {
            Ok(())
        } else {
            Err(EventError::AlreadyDefined(name.to_owned()))
        }
    }
}

/// An immutable, partial assignment of attribute values, ready for search.
pub struct Event {
    values: Vec<Option<AttributeValue>>,
}

impl Event {
    pub(crate) fn value(&self, attribute: AttributeId) -> Option<&AttributeValue> {
        self.values[attribute.index()].as_ref()
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}
