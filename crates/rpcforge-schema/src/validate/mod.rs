//! Structural validation of assembled metadata.

mod visitor;

pub use visitor::ValidateVisitor;

use crate::{SchemaError, error::ErrorTree, node::MetaData};
use std::collections::BTreeSet;

/// Validate every service, collecting all problems before failing.
pub fn validate_metadata(metas: &[MetaData]) -> Result<(), SchemaError> {
    let mut errs = ErrorTree::new();

    for meta in metas {
        errs.add_child(meta.name.clone(), validate_meta(meta));
    }

    errs.result().map_err(SchemaError::Validation)
}

// validate_meta
fn validate_meta(meta: &MetaData) -> ErrorTree {
    let mut errs = ErrorTree::new();

    for entry in &meta.entries {
        let mut visitor = ValidateVisitor::new();
        let mut seen = BTreeSet::new();

        for arg in &entry.args {
            if !seen.insert(arg.name.as_str()) {
                crate::err!(visitor.errors, "duplicate argument '{}'", arg.name);
            }
            visitor.visit(&arg.name, &arg.arg_type);
        }
        visitor.visit("result", &entry.result);

        errs.add_child(entry.name.clone(), visitor.errors);
    }

    errs
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        node::{Arg, ClassRef, Entry, RpcType},
        types::ScalarKind,
    };

    fn meta(entry: Entry) -> MetaData {
        MetaData {
            name: "Demo".into(),
            service: ClassRef::new("app.service", "Demo"),
            entries: vec![entry],
            implementation: None,
            namespace: None,
        }
    }

    #[test]
    fn duplicate_args_are_reported_with_route() {
        let mut entry = Entry::new("hello");
        entry.args.push(Arg::new("name", RpcType::scalar(ScalarKind::String)));
        entry.args.push(Arg::new("name", RpcType::scalar(ScalarKind::String)));

        let err = validate_metadata(&[meta(entry)]).expect_err("duplicate args must fail");
        let rendered = err.to_string();
        assert!(
            rendered.contains("Demo.hello: duplicate argument 'name'"),
            "unexpected error: {rendered}"
        );
    }

    #[test]
    fn void_list_elements_are_rejected() {
        let mut entry = Entry::new("hello");
        entry.args.push(Arg::new("items", RpcType::list(RpcType::void())));

        let err = validate_metadata(&[meta(entry)]).expect_err("void elements must fail");
        assert!(
            err.to_string().contains("list element cannot be void"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn nested_lists_are_rejected() {
        let mut entry = Entry::new("hello");
        let grid = RpcType::list(RpcType::list(RpcType::scalar(ScalarKind::Int)));
        entry.args.push(Arg::new("grid", grid));

        let err = validate_metadata(&[meta(entry)]).expect_err("nested lists must fail");
        assert!(
            err.to_string().contains("Demo.hello.grid: list element cannot be a list"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn well_formed_metadata_passes() {
        let mut entry = Entry::new("hello");
        entry.args.push(Arg::new("name", RpcType::scalar(ScalarKind::String)));

        assert!(validate_metadata(&[meta(entry)]).is_ok());
    }
}
