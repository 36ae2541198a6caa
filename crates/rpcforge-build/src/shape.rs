//! Container shapes shared by the descriptor and class emitters.
//!
//! Every entry has an Arg container (its arguments) and a Result container
//! (its result, wrapped in a `data` field unless it already is a dict).
//! Nested containers are addressed by a [`TypePath`].

use rpcforge_schema::{
    field_map::Fields,
    naming::pretty_name,
    node::{Entry, RpcKind, RpcType},
};

/// Field name scalar and list results are wrapped in.
pub const DATA_FIELD: &str = "data";

///
/// Container
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Container {
    Arg,
    Result,
}

impl Container {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arg => "Arg",
            Self::Result => "Result",
        }
    }
}

///
/// TypePath
///
/// Stacked name segments of a generated container. The class name joins
/// every segment; the wire name joins the service-qualified top with `.`
/// before each nested segment.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypePath {
    service: String,
    entry: String,
    container: Container,
    nested: Vec<String>,
}

impl TypePath {
    #[must_use]
    pub fn new(service: &str, entry: &str, container: Container) -> Self {
        Self {
            service: pretty_name(service),
            entry: pretty_name(entry),
            container,
            nested: Vec::new(),
        }
    }

    /// Path of the container nested under `field`.
    #[must_use]
    pub fn child(&self, field: &str) -> Self {
        let mut next = self.clone();
        next.nested.push(pretty_name(field));
        next
    }

    /// `<Entry><Arg|Result><Nested...>`
    #[must_use]
    pub fn class_name(&self) -> String {
        format!("{}{}{}", self.entry, self.container.as_str(), self.nested.concat())
    }

    /// `<Service><Entry><Arg|Result>.<Nested>...`
    #[must_use]
    pub fn wire_name(&self) -> String {
        let mut name = self.message_name();
        for segment in &self.nested {
            name.push('.');
            name.push_str(segment);
        }

        name
    }

    /// Top-level message name, `<Service><Entry><Arg|Result>`.
    #[must_use]
    pub fn message_name(&self) -> String {
        format!("{}{}{}", self.service, self.entry, self.container.as_str())
    }

    /// Name of the innermost container.
    #[must_use]
    pub fn local_name(&self) -> String {
        self.nested
            .last()
            .cloned()
            .unwrap_or_else(|| self.message_name())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.nested
    }
}

/// Emitted argument fields; void arguments are dropped.
#[must_use]
pub fn arg_fields(entry: &Entry) -> Fields {
    entry
        .args
        .iter()
        .filter(|a| !a.arg_type.is_void())
        .map(|a| (a.name.clone(), a.as_field()))
        .collect()
}

/// Emitted result fields: a dict result is used as is, a void result is
/// empty and anything else is wrapped in `data`.
#[must_use]
pub fn result_fields(entry: &Entry) -> Fields {
    match &entry.result.kind {
        RpcKind::Void => Fields::new(),
        RpcKind::Dict { fields } => emitted(fields),
        _ => [(DATA_FIELD, entry.result.clone())].into_iter().collect(),
    }
}

/// Fields of a nested dict with void members dropped.
#[must_use]
pub fn emitted(fields: &Fields) -> Fields {
    fields
        .iter()
        .filter(|(_, f)| !f.is_void())
        .map(|(name, f)| (name, f.clone()))
        .collect()
}

/// True for types carried as a single wire scalar.
#[must_use]
pub const fn is_scalar_like(ty: &RpcType) -> bool {
    ty.is_base_type() || ty.is_enum()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use rpcforge_schema::{node::Arg, types::ScalarKind};

    #[test]
    fn three_level_names_are_distinct_and_reconstructible() {
        let top = TypePath::new("demo", "get_user", Container::Arg);
        let a = top.child("addr");
        let b = a.child("road_info");
        let c = b.child("geo");

        let classes = [a.class_name(), b.class_name(), c.class_name()];
        assert_eq!(
            classes,
            ["GetUserArgAddr", "GetUserArgAddrRoadInfo", "GetUserArgAddrRoadInfoGeo"]
        );

        assert_eq!(c.wire_name(), "DemoGetUserArg.Addr.RoadInfo.Geo");
        let wire = c.wire_name();
        let rebuilt: Vec<&str> = wire.split('.').skip(1).collect();
        assert_eq!(rebuilt, c.segments());
        assert_eq!(c.local_name(), "Geo");
    }

    #[test]
    fn results_wrap_non_dicts() {
        let mut entry = Entry::new("hello");
        assert!(result_fields(&entry).is_empty());

        entry.result = RpcType::scalar(ScalarKind::String);
        assert_eq!(result_fields(&entry).keys().collect::<Vec<_>>(), vec!["data"]);

        let fields: Fields = [
            ("id", RpcType::scalar(ScalarKind::Int)),
            ("gone", RpcType::void()),
        ]
        .into_iter()
        .collect();
        entry.result = RpcType::dict(fields);
        assert_eq!(result_fields(&entry).keys().collect::<Vec<_>>(), vec!["id"]);

        entry.args.push(Arg::new("skip", RpcType::void()));
        assert!(arg_fields(&entry).is_empty());
    }
}
