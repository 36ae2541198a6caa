//! Explicit declaration model for the program being generated from.
//!
//! A host project exports what its modules contain; the registry holds
//! those module declarations keyed by name. Modules reference each other
//! by name, so the graph may contain cycles.

mod descriptor;

pub use descriptor::*;

use derive_more::Display;
use rpcforge_schema::prelude::*;
use serde::de::Deserializer;
use std::collections::BTreeMap;

///
/// Capability
/// marker a class declaration carries
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    #[default]
    None,
    ServiceBase,
    ServiceRoot,
    Implementation,
    ImplementationRoot,
}

///
/// MemberKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    #[default]
    Function,
    StaticMethod,
    ClassMethod,
    Property,
    Attribute,
}

impl MemberKind {
    #[must_use]
    pub const fn is_function_like(self) -> bool {
        matches!(self, Self::Function | Self::StaticMethod | Self::ClassMethod)
    }
}

///
/// Param
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Param {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeDescriptor>,
}

///
/// Signature
/// positional parameters in order; defaults align to the trailing ones
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(default)]
    pub defaults: Vec<Value>,
}

impl Signature {
    /// Parameters excluding a leading receiver.
    #[must_use]
    pub fn positional(&self) -> &[Param] {
        match self.params.first() {
            Some(p) if p.name == "self" || p.name == "cls" => &self.params[1..],
            _ => &self.params,
        }
    }

    #[must_use]
    pub fn annotated_count(&self) -> usize {
        self.params.iter().filter(|p| p.annotation.is_some()).count()
    }

    /// Default bound to a positional parameter, if any.
    #[must_use]
    pub fn default_for(&self, name: &str) -> Option<&Value> {
        let positional = self.positional();
        let offset = positional.len().checked_sub(self.defaults.len())?;
        let index = positional.iter().position(|p| p.name == name)?;

        index
            .checked_sub(offset)
            .and_then(|i| self.defaults.get(i))
    }
}

///
/// ParamSpec
///
/// A per-method parameter: either a web field, or a dict spec whose `type`
/// key holds the descriptor and whose other keys are overrides.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamSpec {
    Field(WebField),
    Dict(Addition),
}

///
/// ResponseSpec
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseSpec {
    /// name -> descriptor, adapted into a required dict
    Model(FieldMap<TypeDescriptor>),
    Descriptor(TypeDescriptor),
}

impl<'de> Deserialize<'de> for ResponseSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_model = matches!(
            &value,
            Value::Object(map) if !map.contains_key("field") && !map.contains_key("builtin")
        );

        if is_model {
            serde_json::from_value(value)
                .map(Self::Model)
                .map_err(serde::de::Error::custom)
        } else {
            Ok(Self::Descriptor(TypeDescriptor::from_value(&value)))
        }
    }
}

///
/// ResponseDecl
/// `[description, spec]`
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResponseDecl(pub Option<String>, pub Option<ResponseSpec>);

///
/// ApiDoc
/// rich per-method documentation payload
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ApiDoc {
    #[serde(default)]
    pub params: FieldMap<ParamSpec>,

    #[serde(default)]
    pub expect: Vec<FieldMap<ParamSpec>>,

    #[serde(default)]
    pub responses: BTreeMap<String, ResponseDecl>,
}

///
/// ClassApiDoc
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ClassApiDoc {
    #[serde(default)]
    pub params: FieldMap<Addition>,
}

///
/// MemberDecl
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MemberDecl {
    #[serde(default)]
    pub kind: MemberKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    /// legacy argument channel, always a dict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_doc_args: Option<RpcType>,

    /// legacy result channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_doc_resp: Option<RpcType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apidoc: Option<ApiDoc>,

    #[serde(default)]
    pub signature: Signature,
}

///
/// ClassDecl
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ClassDecl {
    /// class name; defaults to the attribute key
    #[serde(default)]
    pub name: String,

    /// declaring module; defaults to the containing module
    #[serde(default)]
    pub module: String,

    #[serde(default)]
    pub capability: Capability,

    /// implementation class name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impl_rename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apidoc: Option<ClassApiDoc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,

    /// class body in declaration order
    #[serde(default)]
    pub members: FieldMap<MemberDecl>,
}

impl ClassDecl {
    #[must_use]
    pub fn class_ref(&self) -> ClassRef {
        ClassRef::new(self.module.clone(), self.name.clone())
    }

    #[must_use]
    pub fn impl_name(&self) -> &str {
        self.impl_rename.as_deref().unwrap_or(&self.name)
    }
}

///
/// Attr
/// one attribute of a module
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attr {
    Module {
        target: String,
    },
    Class(ClassDecl),
    Model {
        #[serde(default)]
        tag: Option<String>,
        model: Value,
    },
    Type {
        value: Value,
    },
    Opaque,
    Broken {
        error: String,
    },
}

///
/// ModuleDecl
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ModuleDecl {
    pub name: String,

    #[serde(default)]
    pub attrs: FieldMap<Attr>,
}

impl ModuleDecl {
    // normalize
    // fills class names and declaring modules left implicit
    fn normalize(mut self) -> Self {
        let module = self.name.clone();
        self.attrs = self
            .attrs
            .into_iter()
            .map(|(key, attr)| match attr {
                Attr::Class(mut class) => {
                    if class.name.is_empty() {
                        class.name.clone_from(&key);
                    }
                    if class.module.is_empty() {
                        class.module.clone_from(&module);
                    }
                    (key, Attr::Class(class))
                }
                other => (key, other),
            })
            .collect();

        self
    }
}

///
/// Declarations
/// one exported declaration document
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Declarations {
    #[serde(default)]
    pub modules: Vec<ModuleDecl>,
}

///
/// Registry
///

#[derive(Clone, Debug, Default)]
pub struct Registry {
    modules: BTreeMap<String, ModuleDecl>,
    order: Vec<String>,
}

impl Registry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modules: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a module; a later declaration of the same name replaces it.
    pub fn register(&mut self, module: ModuleDecl) {
        let module = module.normalize();
        if !self.modules.contains_key(&module.name) {
            self.order.push(module.name.clone());
        }
        self.modules.insert(module.name.clone(), module);
    }

    pub fn extend(&mut self, declarations: Declarations) {
        for module in declarations.modules {
            self.register(module);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.get(name)
    }

    /// Modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDecl> {
        self.order.iter().filter_map(|name| self.modules.get(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_names_default_to_attr_key() {
        let decls: Declarations = serde_json::from_value(json!({
            "modules": [{
                "name": "app.service",
                "attrs": {
                    "Demo": {"kind": "class", "capability": "service_base"},
                    "other": {"kind": "module", "target": "app.models"}
                }
            }]
        }))
        .expect("valid declarations");

        let mut registry = Registry::new();
        registry.extend(decls);

        let module = registry.get("app.service").expect("registered");
        let Some(Attr::Class(class)) = module.attrs.get("Demo") else {
            panic!("expected class attr");
        };
        assert_eq!(class.class_ref(), ClassRef::new("app.service", "Demo"));
        assert_eq!(class.impl_name(), "Demo");
    }

    #[test]
    fn defaults_align_to_trailing_params() {
        let sig: Signature = serde_json::from_value(json!({
            "params": [{"name": "self"}, {"name": "a"}, {"name": "b"}, {"name": "c"}],
            "defaults": [2, 3]
        }))
        .expect("valid signature");

        assert_eq!(sig.positional().len(), 3);
        assert_eq!(sig.default_for("a"), None);
        assert_eq!(sig.default_for("b"), Some(&json!(2)));
        assert_eq!(sig.default_for("c"), Some(&json!(3)));
    }

    #[test]
    fn response_specs_distinguish_models_from_fields() {
        let model: ResponseDecl =
            serde_json::from_value(json!(["ok", {"id": "int", "name": "str"}])).expect("valid");
        assert!(matches!(model.1, Some(ResponseSpec::Model(ref m)) if m.len() == 2));

        let field: ResponseDecl =
            serde_json::from_value(json!(["ok", {"field": "Integer"}])).expect("valid");
        assert!(matches!(
            field.1,
            Some(ResponseSpec::Descriptor(TypeDescriptor::Field(_)))
        ));

        let empty: ResponseDecl = serde_json::from_value(json!([null, null])).expect("valid");
        assert!(empty.0.is_none() && empty.1.is_none());
    }
}
