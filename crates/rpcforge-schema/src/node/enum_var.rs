use crate::{
    SchemaError,
    field_map::Fields,
    node::{RpcKind, RpcType},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// EnumWithVar
///
/// An enumeration together with the variable and module that exported it.
/// Two instances denote the same enum when their names match, or when their
/// descriptions and member key sets match.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EnumWithVar {
    pub var_name: String,
    pub module_name: String,
    pub enum_type: RpcType,
}

impl EnumWithVar {
    /// Wrap an enum type; a nameless enum adopts the variable name.
    #[must_use]
    pub fn new(
        var_name: impl Into<String>,
        module_name: impl Into<String>,
        enum_type: RpcType,
    ) -> Self {
        let var_name = var_name.into();
        let mut enum_type = enum_type;

        if let RpcKind::Enum { name, .. } = &mut enum_type.kind
            && name.as_deref().is_none_or(str::is_empty)
            && !var_name.is_empty()
        {
            *name = Some(var_name.clone());
        }

        Self {
            var_name,
            module_name: module_name.into(),
            enum_type,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.enum_type.kind {
            RpcKind::Enum { name, .. } => name.as_deref().filter(|n| !n.is_empty()),
            _ => None,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.enum_type.description
    }

    #[must_use]
    pub fn members(&self) -> Option<&Fields> {
        match &self.enum_type.kind {
            RpcKind::Enum { members, .. } => Some(members),
            _ => None,
        }
    }

    #[must_use]
    pub fn underlying(&self) -> Option<&RpcType> {
        match &self.enum_type.kind {
            RpcKind::Enum { underlying, .. } => Some(underlying),
            _ => None,
        }
    }

    // same_enum
    #[must_use]
    pub fn same_enum(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.name(), other.name())
            && a == b
        {
            return true;
        }

        match (self.members(), other.members()) {
            (Some(a), Some(b)) => {
                self.description() == other.description() && a.key_set() == b.key_set()
            }
            _ => false,
        }
    }

    /// Fold a colliding instance in, adopting its name when this one has none.
    pub fn merge(&mut self, other: Self) {
        if self.name().is_some() {
            return;
        }
        if other.name().is_some() {
            *self = other;
        }
    }
}

///
/// EnumSet
/// merging collection of discovered enums, in first-seen order
///

#[derive(Clone, Debug, Default)]
pub struct EnumSet {
    enums: Vec<EnumWithVar>,
}

impl EnumSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { enums: Vec::new() }
    }

    // insert
    pub fn insert(&mut self, value: EnumWithVar) {
        match self.enums.iter_mut().find(|e| e.same_enum(&value)) {
            Some(existing) => existing.merge(value),
            None => self.enums.push(value),
        }
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = EnumWithVar>) {
        for value in values {
            self.insert(value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumWithVar> {
        self.enums.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.enums.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    /// Two distinct enums sharing a final name cannot both be emitted.
    pub fn check_names(&self) -> Result<(), SchemaError> {
        let mut seen: BTreeMap<&str, &EnumWithVar> = BTreeMap::new();

        for e in &self.enums {
            let Some(name) = e.name() else { continue };
            if let Some(first) = seen.insert(name, e) {
                return Err(SchemaError::DuplicateEnum {
                    name: name.to_string(),
                    first: first.module_name.clone(),
                    second: e.module_name.clone(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<EnumWithVar> {
        self.enums
    }
}

///
/// TESTS
///
