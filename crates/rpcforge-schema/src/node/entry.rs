use crate::{
    field_map::Fields,
    node::{Arg, RpcType},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Entry
/// one exposed method of a service
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Entry {
    pub name: String,
    pub args: Vec<Arg>,
    pub result: RpcType,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status_code_results: BTreeMap<u16, RpcType>,
}

impl Entry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            result: RpcType::void(),
            description: String::new(),
            status_code_results: BTreeMap::new(),
        }
    }

    /// Record the result for a status code; the primary result follows the
    /// lowest 2xx code, or the lowest code when no 2xx code is declared.
    pub fn set_result(&mut self, status_code: u16, result: RpcType) {
        self.status_code_results.insert(status_code, result);

        let primary = self
            .status_code_results
            .range(200..300)
            .next()
            .or_else(|| self.status_code_results.iter().next());

        if let Some((_, ty)) = primary {
            self.result = ty.clone();
        }
    }

    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Arg> {
        self.args.iter().find(|a| a.name == name)
    }

    /// Arguments as an ordered dict of fields.
    #[must_use]
    pub fn args_fields(&self) -> Fields {
        self.args.iter().map(|a| (a.name.clone(), a.as_field())).collect()
    }

    /// Arguments as a dict type, the shape of the generated Arg message.
    #[must_use]
    pub fn args_type(&self) -> RpcType {
        RpcType::dict(self.args_fields()).with_description(self.description.clone())
    }
}

///
/// TESTS
///
