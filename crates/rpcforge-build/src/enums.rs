//! Enumeration holders and the enum web resource.

use crate::{
    BuildError, cw_writeln,
    mapping::{py_str, python_default, python_type, web_field},
    writer::CodeWriter,
};
use rpcforge_schema::{naming::pretty_name, node::EnumWithVar};

///
/// EnumFiles
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumFiles {
    /// Holder classes, one instance per enum.
    pub holders: String,

    /// `ss_enum.py`, the `enum` namespace resources.
    pub resources: String,
}

/// Name used for every generated symbol of an enum.
fn enum_name(e: &EnumWithVar) -> Result<&str, BuildError> {
    e.name().ok_or_else(|| BuildError::UnnamedEnum {
        module: e.module_name.clone(),
    })
}

/// Both enum files, enums ordered by lowercase name.
pub fn generate(enums: &[EnumWithVar], api_path: &str) -> Result<EnumFiles, BuildError> {
    let mut named = enums
        .iter()
        .map(|e| enum_name(e).map(|name| (name, e)))
        .collect::<Result<Vec<_>, _>>()?;
    named.sort_by_cached_key(|(name, _)| name.to_lowercase());

    let mut holders = CodeWriter::new();
    let mut resources = CodeWriter::new();
    resources.writeln("from flask_restplus import fields, Resource");
    cw_writeln!(resources, "from {api_path} import api");
    resources.blank_line();
    resources.blank_line();
    resources.writeln("ns = api.namespace(\"enum\", description=\"enum definitions\")");

    for (name, e) in named {
        holder(&mut holders, name, e);
        resource(&mut resources, name, e);
    }

    Ok(EnumFiles {
        holders: holders.finish(),
        resources: resources.finish(),
    })
}

// holder
fn holder(w: &mut CodeWriter, name: &str, e: &EnumWithVar) {
    let Some(members) = e.members() else { return };
    let literal = e.underlying().map_or("bool", python_type);

    w.colon_block(&format!("class _{name}(object)"), |w| {
        w.writeln("\"\"\"");
        w.lines(e.description());
        w.writeln("\"\"\"");
        w.blank_line();

        w.writeln("enum_description = {");
        w.indented(|w| {
            for (_, member) in members.iter() {
                cw_writeln!(w, "{}: {},", python_default(member), py_str(&member.description));
            }
        });
        w.writeln("}");

        for (key, member) in members.iter() {
            w.blank_line();
            w.writeln("@property");
            w.colon_block(&format!("def {key}(self) -> {}", python_type(member)), |w| {
                w.writeln("\"\"\"");
                w.lines(&member.description);
                w.writeln("\"\"\"");
                cw_writeln!(w, "return {}", python_default(member));
            });
        }

        w.blank_line();
        w.writeln("@classmethod");
        w.colon_block(&format!("def get_desc(cls, value: {literal}) -> str"), |w| {
            w.writeln("return cls.enum_description.get(value, \"\")");
        });
    });

    w.blank_line();
    w.blank_line();
    cw_writeln!(w, "{name} = _{name}()");
    w.blank_line();
    w.blank_line();
}

// resource
fn resource(w: &mut CodeWriter, name: &str, e: &EnumWithVar) {
    let Some(members) = e.members() else { return };
    let class = pretty_name(name);
    let value_field = e.underlying().map_or("fields.String", web_field);

    w.blank_line();
    w.blank_line();
    cw_writeln!(w, "{class}EnumResultModel = ns.response(");
    w.indented(|w| {
        w.writeln("200,");
        w.writeln(&py_str(&format!("{}<br/>", e.description())));
        for (key, member) in members.iter() {
            let line = format!("{}: {key} - {}<br/>", python_default(member), member.description);
            w.writeln(&py_str(&line));
        }
        w.writeln(",");

        cw_writeln!(w, "api.model(\"{class}EnumResultDefine\", {{");
        w.indented(|w| {
            w.writeln("\"info\": fields.List(");
            w.indented(|w| {
                w.writeln("fields.Nested(");
                w.indented(|w| {
                    cw_writeln!(w, "model=api.model(\"{class}EnumResultInfoDefine\", {{");
                    w.indented(|w| {
                        w.writeln("\"key\": fields.String(description=\"enum name\"),");
                        cw_writeln!(w, "\"value\": {value_field}(");
                        w.indented(|w| {
                            w.writeln("description=\"enum value\",");
                            if e.enum_type.default_value.as_ref().is_some_and(|v| !v.is_null()) {
                                cw_writeln!(w, "default={},", python_default(&e.enum_type));
                            }
                        });
                        w.writeln("),");
                    });
                    w.writeln("}),");
                });
                w.writeln(")");
            });
            w.writeln(")");
        });
        w.writeln("})");
    });
    w.writeln(")");
    w.blank_line();
    w.blank_line();

    cw_writeln!(w, "@ns.route(\"/{name}\")");
    w.colon_block(&format!("class {class}(Resource)"), |w| {
        cw_writeln!(w, "@{class}EnumResultModel");
        w.colon_block("def get(self)", |w| {
            w.writeln("return {");
            w.indented(|w| {
                w.writeln("\"info\": [");
                w.indented(|w| {
                    for (key, member) in members.iter() {
                        w.writeln("{");
                        w.indented(|w| {
                            cw_writeln!(w, "\"key\": {},", py_str(key));
                            cw_writeln!(w, "\"value\": {},", python_default(member));
                            cw_writeln!(w, "\"description\": {},", py_str(&member.description));
                        });
                        w.writeln("},");
                    }
                });
                w.writeln("]");
            });
            w.writeln("}");
        });
    });
}

///
/// TESTS
///
