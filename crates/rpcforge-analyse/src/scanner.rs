//! Depth-first walk over the declared module graph.

use crate::decl::{Attr, Capability, ClassDecl, ModuleDecl, Registry};
use rpcforge_schema::{
    MAX_SCAN_DEPTH, MODEL_TAG,
    node::{ClassRef, EnumSet, EnumWithVar, ModelDef, ModelWithVar, RpcType},
};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

///
/// AttrKind
/// what a module attribute turned out to be
///

#[derive(Debug)]
pub enum AttrKind<'a> {
    Module(&'a str),
    Service(&'a ClassDecl),
    Implementation(&'a ClassDecl),
    Model(ModelDef),
    Enum(RpcType),
    Broken(&'a str),
    Ignored,
}

// classify
fn classify(attr: &Attr) -> AttrKind<'_> {
    match attr {
        Attr::Module { target } => AttrKind::Module(target),
        Attr::Class(class) => match class.capability {
            Capability::ServiceBase => AttrKind::Service(class),
            Capability::Implementation => AttrKind::Implementation(class),
            Capability::None | Capability::ServiceRoot | Capability::ImplementationRoot => {
                AttrKind::Ignored
            }
        },
        Attr::Model {
            tag: Some(tag),
            model,
        } if tag == MODEL_TAG => serde_json::from_value(model.clone())
            .map_or(AttrKind::Ignored, AttrKind::Model),
        Attr::Type { value } => match serde_json::from_value::<RpcType>(value.clone()) {
            Ok(ty) if ty.is_enum() => AttrKind::Enum(ty),
            _ => AttrKind::Ignored,
        },
        Attr::Broken { error } => AttrKind::Broken(error),
        Attr::Model { .. } | Attr::Opaque => AttrKind::Ignored,
    }
}

///
/// ScanIssue
/// an attribute that could not be inspected
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanIssue {
    pub module: String,
    pub attr: String,
    pub message: String,
    pub silenced: bool,
}

///
/// ScanResult
///

#[derive(Clone, Debug, Default)]
pub struct ScanResult {
    pub services: Vec<ClassDecl>,
    pub implementations: Vec<ClassDecl>,
    pub models: Vec<ModelWithVar>,
    pub enums: EnumSet,
    pub issues: Vec<ScanIssue>,
}

// collecting state for one walk
#[derive(Default)]
struct Collector<'a> {
    visited: HashSet<&'a str>,
    classes: HashSet<(Capability, ClassRef)>,
    models: HashSet<ModelWithVar>,
    result: ScanResult,
}

///
/// Scanner
///

pub struct Scanner<'a> {
    registry: &'a Registry,
    max_depth: usize,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            max_depth: MAX_SCAN_DEPTH,
        }
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walk from every registered module.
    #[must_use]
    pub fn scan_all(&self) -> ScanResult {
        let mut collector = Collector::default();
        for module in self.registry.modules() {
            self.check(module, 0, &mut collector);
        }

        Self::finish(collector)
    }

    /// Walk from a single module.
    #[must_use]
    pub fn scan_module(&self, name: &str) -> ScanResult {
        let mut collector = Collector::default();
        match self.registry.get(name) {
            Some(module) => self.check(module, 0, &mut collector),
            None => warn!(module = name, "root module is not declared"),
        }

        Self::finish(collector)
    }

    fn finish(collector: Collector<'_>) -> ScanResult {
        let result = collector.result;
        debug!(
            services = result.services.len(),
            implementations = result.implementations.len(),
            models = result.models.len(),
            enums = result.enums.len(),
            issues = result.issues.len(),
            "scan finished"
        );

        result
    }

    // check
    fn check(&self, module: &'a ModuleDecl, depth: usize, out: &mut Collector<'a>) {
        if depth > self.max_depth {
            trace!(module = %module.name, depth, "depth ceiling reached");
            return;
        }
        if !out.visited.insert(module.name.as_str()) {
            return;
        }

        for (attr_name, attr) in module.attrs.iter() {
            match classify(attr) {
                AttrKind::Module(target) => match self.registry.get(target) {
                    Some(next) => self.check(next, depth + 1, out),
                    None => warn!(
                        module = %module.name,
                        attr = attr_name,
                        target,
                        "module reference does not resolve"
                    ),
                },
                AttrKind::Service(class) => {
                    if out.classes.insert((Capability::ServiceBase, class.class_ref())) {
                        out.result.services.push(class.clone());
                    }
                }
                AttrKind::Implementation(class) => {
                    if out.classes.insert((Capability::Implementation, class.class_ref())) {
                        out.result.implementations.push(class.clone());
                    }
                }
                AttrKind::Model(model) => {
                    let model = ModelWithVar::new(attr_name, module.name.clone(), model);
                    if out.models.insert(model.clone()) {
                        out.result.models.push(model);
                    }
                }
                AttrKind::Enum(ty) => {
                    out.result
                        .enums
                        .insert(EnumWithVar::new(attr_name, module.name.clone(), ty));
                }
                AttrKind::Broken(error) => {
                    let silenced = is_noisy(&module.name, error);
                    if silenced {
                        trace!(
                            module = %module.name,
                            attr = attr_name,
                            error,
                            "ignoring known noisy import"
                        );
                    } else {
                        warn!(
                            module = %module.name,
                            attr = attr_name,
                            error,
                            "attribute could not be inspected"
                        );
                    }
                    out.result.issues.push(ScanIssue {
                        module: module.name.clone(),
                        attr: attr_name.to_string(),
                        message: error.to_string(),
                        silenced,
                    });
                }
                AttrKind::Ignored => {}
            }
        }
    }
}

// toolkit imports known to fail on headless hosts
fn is_noisy(module: &str, error: &str) -> bool {
    error.contains("_tkinter") || module.contains("six.moves")
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Declarations;
    use serde_json::{Value, json};

    fn registry(value: Value) -> Registry {
        let decls: Declarations = serde_json::from_value(value).expect("valid declarations");
        let mut registry = Registry::new();
        registry.extend(decls);

        registry
    }

    fn sample() -> Registry {
        registry(json!({"modules": [
            {"name": "app", "attrs": {
                "service": {"kind": "module", "target": "app.service"},
                "models": {"kind": "module", "target": "app.models"},
                "CommonBase": {"kind": "class", "capability": "service_root"},
                "CommonImpl": {"kind": "class", "capability": "implementation_root"},
                "tk": {"kind": "broken", "error": "No module named '_tkinter'"},
                "bad": {"kind": "broken", "error": "boom"}
            }},
            {"name": "app.service", "attrs": {
                "Demo": {"kind": "class", "capability": "service_base"},
                "DemoImpl": {"kind": "class", "capability": "implementation"},
                "back": {"kind": "module", "target": "app"},
                "missing": {"kind": "module", "target": "app.nowhere"}
            }},
            {"name": "app.models", "attrs": {
                "User": {"kind": "model", "tag": "MT", "model": {
                    "name": "she_user",
                    "fields": {"id": {"type": "int", "column": {"primary_key": true}}}
                }},
                "Untagged": {"kind": "model", "model": {"name": "x", "fields": {}}},
                "Status": {"kind": "type", "value": {
                    "type": "enum", "description": "status",
                    "underlying": {"type": "int"},
                    "members": {"OK": {"type": "int", "default": 0}}
                }},
                "limit": {"kind": "type", "value": {"type": "int"}},
                "Demo": {"kind": "class", "capability": "service_base", "module": "app.service"}
            }}
        ]}))
    }

    #[test]
    fn classifies_and_dedupes() {
        let registry = sample();
        let result = Scanner::new(&registry).scan_all();

        assert_eq!(result.services.len(), 1, "re-exported class counted once");
        assert_eq!(result.services[0].name, "Demo");
        assert_eq!(result.implementations.len(), 1);
        assert_eq!(result.models.len(), 1);
        assert_eq!(result.models[0].var_name, "User");
        assert_eq!(result.enums.len(), 1);
        assert_eq!(result.enums.iter().next().and_then(EnumWithVar::name), Some("Status"));
    }

    #[test]
    fn broken_attributes_are_recorded_not_fatal() {
        let registry = sample();
        let result = Scanner::new(&registry).scan_all();

        let silenced: Vec<_> = result
            .issues
            .iter()
            .map(|i| (i.attr.as_str(), i.silenced))
            .collect();
        assert_eq!(silenced, vec![("tk", true), ("bad", false)]);
    }

    #[test]
    fn rescanning_is_idempotent() {
        let registry = sample();
        let first = Scanner::new(&registry).scan_all();
        let second = Scanner::new(&registry).scan_all();

        assert_eq!(first.models, second.models);
        assert_eq!(first.enums.len(), second.enums.len());
        assert_eq!(first.services, second.services);
    }

    #[test]
    fn depth_ceiling_bounds_chains() {
        let modules: Vec<Value> = (0..15)
            .map(|i| {
                let mut attrs = serde_json::Map::new();
                attrs.insert(
                    "next".into(),
                    json!({"kind": "module", "target": format!("m{}", i + 1)}),
                );
                attrs.insert(
                    format!("S{i}"),
                    json!({"kind": "class", "capability": "service_base"}),
                );

                json!({"name": format!("m{i}"), "attrs": attrs})
            })
            .collect();
        let registry = registry(json!({ "modules": modules }));

        let result = Scanner::new(&registry).scan_module("m0");
        assert_eq!(result.services.len(), MAX_SCAN_DEPTH + 1);
    }
}
