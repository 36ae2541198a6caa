//! ORM modules for persisted data models.
//!
//! Models are grouped by the last segment of their declaring module. Each
//! group yields a declarative module `<group>.py` and a schema-table module
//! `<group>_schema.py`; `__init__.py` imports every group.

use crate::{
    GeneratedFile, cw_writeln,
    mapping::{py_bool, py_str},
    writer::CodeWriter,
};
use rpcforge_schema::node::{ModelWithVar, RpcType};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Persisted models whose module name contains `filter`.
#[must_use]
pub fn persisted<'a>(models: &'a [ModelWithVar], filter: &str) -> Vec<&'a ModelWithVar> {
    models
        .iter()
        .filter(|m| m.model.is_persisted())
        .filter(|m| {
            let keep = m.module_name.contains(filter);
            if !keep {
                debug!(model = %m.model.name, module = %m.module_name, "filtered out");
            }
            keep
        })
        .collect()
}

/// Persisted models by module group, each group sorted by variable name.
#[must_use]
pub fn groups<'a>(models: &[&'a ModelWithVar]) -> BTreeMap<String, Vec<&'a ModelWithVar>> {
    let mut groups: BTreeMap<String, Vec<&ModelWithVar>> = BTreeMap::new();
    for &model in models {
        groups
            .entry(model.module_group().to_string())
            .or_default()
            .push(model);
    }
    for members in groups.values_mut() {
        members.sort_by_cached_key(|m| m.var_name.to_lowercase());
    }

    groups
}

/// Every ORM module for the given models.
#[must_use]
pub fn generate(models: &[ModelWithVar], api_path: &str, filter: &str) -> Vec<GeneratedFile> {
    let persisted = persisted(models, filter);
    let mut files = Vec::new();
    let mut init = Vec::new();

    for (group, members) in groups(&persisted) {
        files.push(GeneratedFile::new(
            format!("{group}.py"),
            module(&members, api_path, Form::Declarative),
        ));
        files.push(GeneratedFile::new(
            format!("{group}_schema.py"),
            module(&members, api_path, Form::Schema),
        ));

        init.push(format!("from .{group} import *"));
        init.push(format!("from .{group}_schema import *"));
    }

    init.sort();
    let mut init_text = init.join("\n");
    init_text.push('\n');
    files.push(GeneratedFile::new("__init__.py", init_text));

    files
}

///
/// Form
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Form {
    Declarative,
    Schema,
}

// module
fn module(models: &[&ModelWithVar], api_path: &str, form: Form) -> String {
    let mut w = CodeWriter::new();
    w.writeln(&import_line(models, form));
    match form {
        Form::Declarative => cw_writeln!(w, "from {api_path} import Base"),
        Form::Schema => cw_writeln!(w, "from {api_path} import meta_data"),
    }

    for model in models {
        w.blank_line();
        w.blank_line();
        match form {
            Form::Declarative => declarative(&mut w, model),
            Form::Schema => schema_table(&mut w, model),
        }
    }

    w.finish()
}

/// `from sqlalchemy import ...` with every name the group uses.
fn import_line(models: &[&ModelWithVar], form: Form) -> String {
    let mut types = BTreeSet::new();
    let mut has_index = false;

    for model in models {
        for (_, field) in model.model.columns() {
            if let Some(column) = &field.column {
                types.insert(column.column_type(field.scalar_kind()));
                if column.foreign_target().is_some() {
                    types.insert("ForeignKey".to_string());
                }
            }
        }
        has_index |= !model.model.indexes.is_empty();
    }

    let mut names = Vec::new();
    if form == Form::Schema {
        names.push("Table".to_string());
    }
    names.push("Column".to_string());
    names.extend(types);
    if has_index {
        names.push("Index".to_string());
    }

    format!("from sqlalchemy import {}", names.join(", "))
}

// declarative
fn declarative(w: &mut CodeWriter, model: &ModelWithVar) {
    let table = &model.model.name;

    w.colon_block(&format!("class {}(Base)", model.var_name), |w| {
        cw_writeln!(w, "__tablename__ = {}", py_str(table));
        w.blank_line();

        w.writeln("__table_args__ = (");
        w.indented(|w| {
            for index in index_specs(model) {
                cw_writeln!(w, "{index},");
            }
            cw_writeln!(w, "{{\"comment\": {}}},", py_str(&model.model.description));
        });
        w.writeln(")");

        for (name, field) in model.model.columns() {
            w.blank_line();
            w.writeln(&format!("{name} = Column("));
            w.indented(|w| column_body(w, field));
            w.writeln(")");
        }
    });
}

// schema_table
fn schema_table(w: &mut CodeWriter, model: &ModelWithVar) {
    cw_writeln!(w, "{} = Table(", model.var_name);
    w.indented(|w| {
        cw_writeln!(w, "{},", py_str(&model.model.name));
        w.writeln("meta_data,");

        for (name, field) in model.model.columns() {
            w.writeln("Column(");
            w.indented(|w| {
                cw_writeln!(w, "{},", py_str(name));
                column_body(w, field);
            });
            w.writeln("),");
        }
        for index in index_specs(model) {
            cw_writeln!(w, "{index},");
        }

        cw_writeln!(w, "comment = {}", py_str(&model.model.description));
    });
    w.writeln(")");
}

// column_body
// type, then foreign / primary_key / nullable / index / unique, then comment
fn column_body(w: &mut CodeWriter, field: &RpcType) {
    let Some(column) = &field.column else {
        return;
    };

    let ty = column.column_type(field.scalar_kind());
    match column.length {
        Some(length) => cw_writeln!(w, "{ty}({length}),"),
        None => cw_writeln!(w, "{ty},"),
    }

    if let Some(target) = column.foreign_target() {
        cw_writeln!(w, "ForeignKey({}),", py_str(target));
    }
    if column.primary_key == Some(true) {
        w.writeln("primary_key = True,");
    }
    if let Some(nullable) = column.nullable {
        cw_writeln!(w, "nullable = {},", py_bool(nullable));
    }
    if column.index == Some(true) {
        w.writeln("index = True,");
    }
    if column.unique == Some(true) {
        w.writeln("unique = True,");
    }

    cw_writeln!(w, "comment = {}", py_str(&field.description));
}

// index_specs
fn index_specs(model: &ModelWithVar) -> Vec<String> {
    model
        .model
        .indexes
        .iter()
        .map(|index| {
            let columns: Vec<_> = index.columns.iter().map(|c| py_str(c)).collect();
            format!(
                "Index({}, {}, mysql_using=\"{}\")",
                py_str(&index.resolved_name(&model.model.name)),
                columns.join(", "),
                index.index_type
            )
        })
        .collect()
}

///
/// TESTS
///
