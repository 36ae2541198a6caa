//! Normalization of loosely typed descriptors into [`RpcType`].

use crate::decl::{AttrLookup, BuiltinType, TypeDescriptor, WebField, WebFieldKind};
use rpcforge_schema::{
    field_map::Fields,
    node::{Constraints, RpcType},
    types::ScalarKind,
    value::truthy,
};
use serde_json::Value;
use tracing::debug;

const INT_LITERALS: [&str; 2] = ["int", "integer"];

///
/// Slot
/// one keyword a schema builder fills
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
    Description,
    DefaultValue,
    Required,
    Minimum,
    Maximum,
    MinLength,
    MaxLength,
    MinItems,
    MaxItems,
    MustTrue,
    MustFalse,
}

impl Slot {
    const fn key(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::DefaultValue => "default_value",
            Self::Required => "required",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::MinItems => "min_items",
            Self::MaxItems => "max_items",
            Self::MustTrue => "must_true",
            Self::MustFalse => "must_false",
        }
    }

    // alias
    // the web-annotation spelling of the keyword
    const fn alias(self) -> Option<&'static str> {
        match self {
            Self::Minimum => Some("min"),
            Self::Maximum => Some("max"),
            Self::DefaultValue => Some("default"),
            _ => None,
        }
    }
}

const BASE_SLOTS: [Slot; 3] = [Slot::Description, Slot::DefaultValue, Slot::Required];

///
/// Schema
/// keyword builder selected by descriptor identity
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Schema {
    Number,
    Str,
    Bool,
    List,
}

impl Schema {
    fn for_descriptor(desc: &TypeDescriptor) -> Option<Self> {
        match desc {
            TypeDescriptor::Literal(s) => match s.as_str() {
                "int" | "integer" | "float" => Some(Self::Number),
                "bool" => Some(Self::Bool),
                "list" => Some(Self::List),
                _ => Some(Self::Str),
            },
            TypeDescriptor::Builtin { builtin } => Some(match builtin {
                BuiltinType::Int | BuiltinType::Float => Self::Number,
                BuiltinType::Str => Self::Str,
                BuiltinType::Bool => Self::Bool,
            }),
            TypeDescriptor::Field(field) => match field.kind() {
                WebFieldKind::Integer | WebFieldKind::Float => Some(Self::Number),
                WebFieldKind::String => Some(Self::Str),
                WebFieldKind::Boolean => Some(Self::Bool),
                WebFieldKind::List => Some(Self::List),
                WebFieldKind::Nested | WebFieldKind::Other => None,
            },
            TypeDescriptor::Other(_) => None,
        }
    }

    fn slots(self) -> Vec<Slot> {
        let extra: &[Slot] = match self {
            Self::Number => &[Slot::Minimum, Slot::Maximum],
            Self::Str => &[Slot::MinLength, Slot::MaxLength],
            Self::Bool => &[Slot::MustTrue, Slot::MustFalse],
            Self::List => return vec![Slot::Description, Slot::MinItems, Slot::MaxItems],
        };

        BASE_SLOTS.iter().chain(extra).copied().collect()
    }

    // build
    // baseline per slot, replaced by any present override
    fn build(self, addition: Option<&dyn AttrLookup>) -> Kwargs {
        let mut kwargs = Kwargs::default();

        for slot in self.slots() {
            kwargs.baseline(slot);

            let Some(addition) = addition else { continue };
            let value = addition
                .present(slot.key())
                .or_else(|| slot.alias().and_then(|alias| addition.present(alias)));

            if let Some(value) = value {
                kwargs.set(slot, value);
            }
        }

        kwargs
    }
}

///
/// Kwargs
///

#[derive(Clone, Debug, Default)]
struct Kwargs {
    description: String,
    required: bool,
    default_value: Option<Value>,
    constraints: Constraints,
}

impl Kwargs {
    fn baseline(&mut self, slot: Slot) {
        if slot == Slot::Required {
            self.required = true;
        }
    }

    fn set(&mut self, slot: Slot, value: &Value) {
        let c = &mut self.constraints;
        match slot {
            Slot::Description => {
                self.description = value
                    .as_str()
                    .map_or_else(|| value.to_string(), str::to_string);
            }
            Slot::DefaultValue => self.default_value = Some(value.clone()),
            Slot::Required => self.required = truthy(value),
            Slot::Minimum => c.minimum = value.as_f64(),
            Slot::Maximum => c.maximum = value.as_f64(),
            Slot::MinLength => c.min_length = value.as_u64(),
            Slot::MaxLength => c.max_length = value.as_u64(),
            Slot::MinItems => c.min_items = value.as_u64(),
            Slot::MaxItems => c.max_items = value.as_u64(),
            Slot::MustTrue => c.must_true = Some(truthy(value)),
            Slot::MustFalse => c.must_false = Some(truthy(value)),
        }
    }

    fn apply(self, mut ty: RpcType) -> RpcType {
        ty.description = self.description;
        ty.required = self.required;
        ty.default_value = self.default_value;
        ty.constraints = self.constraints;

        ty
    }
}

///
/// Diagnostics
/// counters for silent degradations
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Diagnostics {
    /// descriptors no rule understood
    pub void_fallbacks: usize,

    /// lists dropped because their element adapted to void
    pub void_list_elements: usize,
}

///
/// TypeAdapter
///

#[derive(Debug, Default)]
pub struct TypeAdapter {
    diagnostics: Diagnostics,
}

impl TypeAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Adapt a descriptor, applying `addition` overrides on top of the
    /// builder defaults. A missing descriptor adapts to `Void`.
    pub fn switch_type(
        &mut self,
        desc: Option<&TypeDescriptor>,
        addition: Option<&dyn AttrLookup>,
    ) -> RpcType {
        let Some(desc) = desc else {
            return self.fallback("missing descriptor");
        };

        let ty = self.resolve(desc, addition);

        // an explicit required override always wins
        match addition.and_then(|a| a.present("required")) {
            Some(required) if !ty.is_void() => ty.with_required(truthy(required)),
            _ => ty,
        }
    }

    /// Adapt a web field using its own attributes as the overrides.
    pub fn switch_field(&mut self, field: &WebField) -> RpcType {
        let desc = TypeDescriptor::Field(field.clone());
        self.switch_type(Some(&desc), Some(field))
    }

    fn resolve(&mut self, desc: &TypeDescriptor, addition: Option<&dyn AttrLookup>) -> RpcType {
        let kwargs = Schema::for_descriptor(desc)
            .map(|schema| schema.build(addition))
            .unwrap_or_default();

        match desc {
            TypeDescriptor::Literal(s) if INT_LITERALS.contains(&s.as_str()) => {
                kwargs.apply(RpcType::scalar(ScalarKind::Int))
            }
            // any other literal is a string
            TypeDescriptor::Literal(_) => kwargs.apply(RpcType::scalar(ScalarKind::String)),
            TypeDescriptor::Builtin { builtin } => {
                let kind = match builtin {
                    BuiltinType::Bool => ScalarKind::Bool,
                    BuiltinType::Float => ScalarKind::Float,
                    BuiltinType::Int => ScalarKind::Int,
                    BuiltinType::Str => ScalarKind::String,
                };
                kwargs.apply(RpcType::scalar(kind))
            }
            TypeDescriptor::Field(field) => self.resolve_field(field, kwargs),
            other => self.fallback(&format!("{other:?}")),
        }
    }

    fn resolve_field(&mut self, field: &WebField, kwargs: Kwargs) -> RpcType {
        let scalar = match field.kind() {
            WebFieldKind::Integer => Some(ScalarKind::Int),
            WebFieldKind::Float => Some(ScalarKind::Float),
            WebFieldKind::Boolean => Some(ScalarKind::Bool),
            WebFieldKind::String => Some(ScalarKind::String),
            _ => None,
        };
        if let Some(kind) = scalar {
            return kwargs.apply(RpcType::scalar(kind));
        }

        match field.kind() {
            WebFieldKind::List => {
                let elem = self.switch_type(field.container.as_deref(), None);
                if elem.is_void() {
                    self.diagnostics.void_list_elements += 1;
                    debug!(field = %field.field, "list element adapted to void; list dropped");
                    return RpcType::void();
                }

                kwargs.apply(RpcType::list(elem))
            }
            WebFieldKind::Nested => {
                let mut fields = Fields::new();
                for (name, sub) in field.model.iter().flat_map(|m| m.iter()) {
                    fields.insert(name, self.switch_type(Some(sub), sub.attrs()));
                }

                RpcType::dict(fields)
                    .with_description(field.text("description").unwrap_or_default())
                    .with_required(field.present("required").is_some_and(truthy))
            }
            _ => self.fallback(&field.field),
        }
    }

    fn fallback(&mut self, what: &str) -> RpcType {
        self.diagnostics.void_fallbacks += 1;
        debug!(descriptor = what, "no type rule matched; adapted to void");

        RpcType::void()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Addition;
    use proptest::prelude::*;
    use rpcforge_schema::node::RpcKind;
    use serde_json::json;

    fn desc(value: Value) -> TypeDescriptor {
        TypeDescriptor::from_value(&value)
    }

    fn addition(value: Value) -> Addition {
        match value {
            Value::Object(map) => map,
            _ => Addition::new(),
        }
    }

    #[test]
    fn literals_defaults_and_aliases() {
        let mut adapter = TypeAdapter::new();
        let extra = addition(json!({"description": "age", "min": 1, "max": 99, "default": 18}));

        let ty = adapter.switch_type(Some(&desc(json!("integer"))), Some(&extra));
        assert!(matches!(ty.kind, RpcKind::Int));
        assert!(ty.required, "number builder defaults to required");
        assert_eq!(ty.description, "age");
        assert_eq!(ty.default_value, Some(json!(18)));
        assert_eq!(ty.constraints.minimum, Some(1.0));
        assert_eq!(ty.constraints.maximum, Some(99.0));

        let ty = adapter.switch_type(Some(&desc(json!("string"))), None);
        assert!(matches!(ty.kind, RpcKind::String));
        assert_eq!(adapter.diagnostics(), Diagnostics::default());
    }

    #[test]
    fn addition_key_wins_over_alias() {
        let mut adapter = TypeAdapter::new();
        let extra = addition(json!({"minimum": 5, "min": 1}));

        let ty = adapter.switch_type(Some(&desc(json!("int"))), Some(&extra));
        assert_eq!(ty.constraints.minimum, Some(5.0));
    }

    #[test]
    fn other_literals_construct_strings() {
        let mut adapter = TypeAdapter::new();

        for literal in ["float", "bool", "datetime", "list"] {
            let ty = adapter.switch_type(Some(&desc(json!(literal))), None);
            assert!(matches!(ty.kind, RpcKind::String), "'{literal}' adapted to {ty:?}");
        }
        assert_eq!(adapter.diagnostics(), Diagnostics::default());

        // keywords still follow the literal's own builder
        let extra = addition(json!({"min": 0.5, "max_length": 4}));
        let ty = adapter.switch_type(Some(&desc(json!("float"))), Some(&extra));
        assert_eq!(ty.constraints.minimum, Some(0.5));
        assert_eq!(ty.constraints.max_length, None);
        assert!(ty.required);

        let extra = addition(json!({"max_length": 4}));
        let ty = adapter.switch_type(Some(&desc(json!("datetime"))), Some(&extra));
        assert_eq!(ty.constraints.max_length, Some(4));
    }

    #[test]
    fn builtins_and_fields_construct_scalars() {
        let mut adapter = TypeAdapter::new();

        let ty = adapter.switch_type(Some(&desc(json!({"builtin": "float"}))), None);
        assert!(matches!(ty.kind, RpcKind::Float));

        let field = desc(json!({"field": "Boolean", "description": "flag", "required": false}));
        let ty = adapter.switch_type(Some(&field), field.attrs());
        assert!(matches!(ty.kind, RpcKind::Bool));
        assert_eq!(ty.description, "flag");
        assert!(!ty.required);

        let field = desc(json!({"field": "String", "max_length": 8}));
        let ty = adapter.switch_type(Some(&field), field.attrs());
        assert!(matches!(ty.kind, RpcKind::String));
        assert_eq!(ty.constraints.max_length, Some(8));
    }

    #[test]
    fn list_recurses_into_container() {
        let mut adapter = TypeAdapter::new();
        let field = desc(json!({
            "field": "List",
            "container": {"field": "Integer"},
            "description": "ids",
            "max_items": 3
        }));

        let ty = adapter.switch_type(Some(&field), field.attrs());
        let elem = ty.elem().expect("list element");
        assert!(matches!(elem.kind, RpcKind::Int));
        assert_eq!(ty.description, "ids");
        assert_eq!(ty.constraints.max_items, Some(3));
        assert!(!ty.required, "list builder has no required baseline");
    }

    #[test]
    fn list_of_unknown_degrades_to_void() {
        let mut adapter = TypeAdapter::new();
        let field = desc(json!({"field": "List", "container": {"class": "datetime"}}));

        assert!(adapter.switch_type(Some(&field), None).is_void());
        assert_eq!(adapter.diagnostics().void_list_elements, 1);
    }

    #[test]
    fn nested_fields_use_their_own_attributes() {
        let mut adapter = TypeAdapter::new();
        let field = desc(json!({
            "field": "Nested",
            "description": "user info",
            "model": {
                "age": {"field": "Integer", "description": "age info", "default": 0},
                "nick": "str"
            }
        }));

        let ty = adapter.switch_type(Some(&field), None);
        let fields = ty.fields().expect("dict fields");
        assert_eq!(ty.description, "user info");
        assert!(!ty.required);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["age", "nick"]);
        assert_eq!(
            fields.get("age").map(|f| f.description.as_str()),
            Some("age info")
        );
    }

    #[test]
    fn unknown_descriptor_is_counted() {
        let mut adapter = TypeAdapter::new();

        assert!(adapter.switch_type(Some(&desc(json!({"class": "Decimal"}))), None).is_void());
        assert!(adapter.switch_type(None, None).is_void());
        assert_eq!(adapter.diagnostics().void_fallbacks, 2);
    }

    proptest! {
        #[test]
        fn falsy_required_override_always_clears_required(
            literal in prop::sample::select(vec!["int", "integer", "str", "string"]),
            falsy in prop::sample::select(vec![json!(false), json!(0), json!(""), json!(0.0)]),
        ) {
            let mut adapter = TypeAdapter::new();
            let extra = addition(json!({"required": falsy}));

            let ty = adapter.switch_type(Some(&TypeDescriptor::literal(literal)), Some(&extra));
            prop_assert!(!ty.required);
        }

        #[test]
        fn falsy_required_override_applies_to_fields(
            field in prop::sample::select(vec!["Integer", "Float", "String", "Boolean"]),
        ) {
            let mut adapter = TypeAdapter::new();
            let desc = desc(json!({"field": field, "required": 0}));

            let ty = adapter.switch_type(Some(&desc), desc.attrs());
            prop_assert!(!ty.required);
        }
    }
}
