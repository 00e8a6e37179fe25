//! The attribute schema: the fixed, ordered set of typed attribute names an
//! index instance is constructed over. Immutable once built.

use crate::error::SchemaError;
use std::collections::HashMap;

/// Position of an attribute within its schema.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Debug)]
pub(crate) struct AttributeId(usize);

impl AttributeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// The declared type of an attribute.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum AttributeKind {
    Boolean,
    Integer,
    Float,
    String,
    IntegerList,
    StringList,
}

/// A named, typed attribute declaration used to build a schema.
#[derive(Clone, Debug)]
pub struct AttributeDefinition {
    name: String,
    kind: AttributeKind,
}

impl AttributeDefinition {
    pub fn boolean(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::Boolean)
    }

    pub fn integer(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::Integer)
    }

    pub fn float(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::Float)
    }

    pub fn string(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::String)
    }

    pub fn integer_list(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::IntegerList)
    }

    pub fn string_list(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::StringList)
    }

    fn with_kind(name: &str, kind: AttributeKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
        }
    }
}

pub(crate) struct Schema {
    by_names: HashMap<String, AttributeId>,
    names: Vec<String>,
    kinds: Vec<AttributeKind>,
}

impl Schema {
    pub fn new(definitions: &[AttributeDefinition]) -> Result<Self, SchemaError> {
        let size = definitions.len();
        let mut by_names = HashMap::with_capacity(size);
        let mut names = Vec::with_capacity(size);
        let mut kinds = Vec::with_capacity(size);
        for (index, definition) in definitions.iter().enumerate() {
            if definition.name.is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if by_names.contains_key(&definition.name) {
                return Err(SchemaError::DuplicateAttribute(definition.name.clone()));
            }

            by_names.insert(definition.name.clone(), AttributeId::new(index));
            names.push(definition.name.clone());
            kinds.push(definition.kind);
        }

        Ok(Self {
            by_names,
            names,
            kinds,
        })
    }

    pub fn resolve(&self, name: &str) -> Option<AttributeId> {
        self.by_names.get(name).copied()
    }

    pub fn kind(&self, id: AttributeId) -> AttributeKind {
        self.kinds[id.index()]
    }

    pub fn name(&self, id: AttributeId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_build_a_schema() {
        let definitions = [
            AttributeDefinition::boolean("private"),
            AttributeDefinition::string_list("deals"),
            AttributeDefinition::integer("exchange_id"),
            AttributeDefinition::float("bidfloor"),
            AttributeDefinition::string("country"),
            AttributeDefinition::integer_list("segment_ids"),
        ];

        let result = Schema::new(&definitions);

        assert!(result.is_ok());
    }

    #[test]
    fn return_an_error_on_duplicate_definitions() {
        let definitions = [
            AttributeDefinition::string("country"),
            AttributeDefinition::integer("exchange_id"),
            AttributeDefinition::integer("country"),
        ];

        let result = Schema::new(&definitions);

        assert_eq!(
            Err(SchemaError::DuplicateAttribute("country".to_owned())),
            result.map(|_| ())
        );
    }

    #[test]
    fn return_an_error_on_an_empty_attribute_name() {
        let definitions = [AttributeDefinition::integer("")];

        let result = Schema::new(&definitions);

        assert_eq!(Err(SchemaError::EmptyName), result.map(|_| ()));
    }

    #[test]
    fn resolve_finds_declared_attributes_in_order() {
        let definitions = [
            AttributeDefinition::string("country"),
            AttributeDefinition::integer("exchange_id"),
        ];
        let schema = Schema::new(&definitions).unwrap();

        assert_eq!(Some(AttributeId::new(0)), schema.resolve("country"));
        assert_eq!(Some(AttributeId::new(1)), schema.resolve("exchange_id"));
        assert_eq!(None, schema.resolve("bidfloor"));
    }

    #[test]
    fn kind_and_name_round_trip() {
        let definitions = [AttributeDefinition::float("bidfloor")];
        let schema = Schema::new(&definitions).unwrap();
        let id = schema.resolve("bidfloor").unwrap();

        assert_eq!(AttributeKind::Float, schema.kind(id));
        assert_eq!("bidfloor", schema.name(id));
    }
}
