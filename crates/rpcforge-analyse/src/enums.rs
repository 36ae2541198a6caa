//! Enum collection across the scan and the assembled metadata.

use rpcforge_schema::{
    SchemaError,
    node::{EnumSet, EnumWithVar, MetaData, RpcKind, RpcType},
};

/// Merge scanned enums with every inline enum reachable from `metas`,
/// failing when two distinct enums share a name.
pub fn collect_enums(metas: &[MetaData], scanned: &EnumSet) -> Result<EnumSet, SchemaError> {
    let mut set = scanned.clone();

    for meta in metas {
        for entry in &meta.entries {
            for arg in &entry.args {
                find_inline(&arg.arg_type, &mut set);
            }
            find_inline(&entry.result, &mut set);
        }
    }

    set.check_names()?;

    Ok(set)
}

// find_inline
fn find_inline(ty: &RpcType, set: &mut EnumSet) {
    match &ty.kind {
        RpcKind::Enum { .. } => set.insert(EnumWithVar::new("", "", ty.clone())),
        RpcKind::List { elem } => find_inline(elem, set),
        RpcKind::Dict { fields } => {
            for field in fields.values() {
                find_inline(field, set);
            }
        }
        _ => {}
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use rpcforge_schema::{
        field_map::Fields,
        node::{Arg, ClassRef, Entry},
        types::ScalarKind,
    };

    fn color(name: Option<&str>) -> RpcType {
        let members: Fields = [("RED", RpcType::scalar(ScalarKind::Int))].into_iter().collect();
        RpcType::enumeration(name.map(String::from), RpcType::scalar(ScalarKind::Int), members)
            .with_description("color")
    }

    #[test]
    fn inline_enums_merge_with_scanned_names() {
        let mut entry = Entry::new("paint");
        let nested: Fields = [("tint", color(None))].into_iter().collect();
        entry.args.push(Arg::new("style", RpcType::dict(nested)));
        let meta = MetaData {
            name: "Paint".into(),
            service: ClassRef::new("app", "Paint"),
            entries: vec![entry],
            implementation: None,
            namespace: None,
        };

        let mut scanned = EnumSet::new();
        scanned.insert(EnumWithVar::new("Color", "app.enums", color(None)));

        let set = collect_enums(&[meta], &scanned).expect("collects");
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().and_then(EnumWithVar::name), Some("Color"));
    }
}
