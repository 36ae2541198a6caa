//! Argument and result container classes.
//!
//! Every container becomes an `RPCDict` subclass with a typed constructor
//! and conversions from a plain dict. In [`ClassMode::Wire`] the class can
//! also convert to and from its wire message.

use crate::{
    cw_writeln,
    mapping::{python_default, python_type},
    shape::{Container, TypePath, arg_fields, emitted, is_scalar_like, result_fields},
    writer::CodeWriter,
};
use rpcforge_schema::{
    field_map::Fields,
    node::{Entry, MetaData, RpcKind, RpcType},
};

///
/// ClassMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassMode {
    /// Definitions with wire conversions, for server and client stubs.
    Wire,

    /// Definitions converting from dicts only.
    Definitions,
}

impl ClassMode {
    const fn wire(self) -> bool {
        matches!(self, Self::Wire)
    }
}

/// Emit the Arg and Result classes of every entry.
pub fn emit_entries(w: &mut CodeWriter, meta: &MetaData, mode: ClassMode) {
    for entry in &meta.entries {
        emit_entry(w, meta, entry, mode);
    }
}

// emit_entry
fn emit_entry(w: &mut CodeWriter, meta: &MetaData, entry: &Entry, mode: ClassMode) {
    let arg = TypePath::new(&meta.name, &entry.name, Container::Arg);
    def_class(w, &arg, &arg_fields(entry), &entry.description, mode);
    w.blank_line();

    let result = TypePath::new(&meta.name, &entry.name, Container::Result);
    def_class(w, &result, &result_fields(entry), "", mode);
    w.blank_line();
}

/// Class name used to annotate a field: the nested class for composites.
fn field_annotation(path: &TypePath, name: &str, ty: &RpcType) -> String {
    match &ty.kind {
        RpcKind::List { elem } if elem.is_dict() => {
            format!("typing.List[{}]", path.child(name).class_name())
        }
        RpcKind::List { elem } => format!("typing.List[{}]", python_type(elem)),
        RpcKind::Dict { .. } => path.child(name).class_name(),
        _ => python_type(ty).to_string(),
    }
}

// def_class
// nested classes are written before the class that refers to them
fn def_class(
    w: &mut CodeWriter,
    path: &TypePath,
    fields: &Fields,
    description: &str,
    mode: ClassMode,
) {
    let fields = emitted(fields);

    for (name, ty) in fields.iter() {
        match &ty.kind {
            RpcKind::List { elem } => {
                if let Some(inner) = elem.fields() {
                    def_class(w, &path.child(name), inner, &elem.description, mode);
                    w.blank_line();
                }
            }
            RpcKind::Dict { fields: inner } => {
                def_class(w, &path.child(name), inner, &ty.description, mode);
                w.blank_line();
            }
            _ => {}
        }
    }

    w.colon_block(&format!("class {}(RPCDict)", path.class_name()), |w| {
        docstring(w, description, &fields);
        constructor(w, path, &fields);
        w.blank_line();

        if fields.is_empty() {
            empty_conversions(w, path, mode);
        } else {
            if mode.wire() {
                convert_pb2(w, path, &fields);
                w.blank_line();
                from_source(w, path, &fields, Source::Wire);
                w.blank_line();
            }
            from_source(w, path, &fields, Source::Dict);
        }
    });
}

// docstring
fn docstring(w: &mut CodeWriter, description: &str, fields: &Fields) {
    w.writeln("\"\"\"");
    for line in description.lines().map(str::trim).filter(|l| !l.is_empty()) {
        w.writeln(line);
    }
    w.blank_line();

    if !fields.is_empty() {
        w.writeln("Properties:");
        w.indented(|w| {
            for (name, ty) in fields.iter() {
                let mut lines = ty.description.lines();
                let first = lines.next().unwrap_or_default().trim();
                w.writeln(format!("{name}: {first}").trim_end());
                w.indented(|w| {
                    for line in lines {
                        w.writeln(line.trim());
                    }
                });
            }
        });
    }
    w.writeln("\"\"\"");
}

// constructor
fn constructor(w: &mut CodeWriter, path: &TypePath, fields: &Fields) {
    w.writeln("def __init__(");
    w.indented(|w| {
        w.writeln("self,");
        for (name, ty) in fields.iter() {
            let annotation = field_annotation(path, name, ty);
            let default = if is_scalar_like(ty) {
                python_default(ty)
            } else {
                "None".to_string()
            };
            cw_writeln!(w, "{name}: {annotation} = {default},");
        }
    });

    w.colon_block(")", |w| {
        if fields.is_empty() {
            w.writeln("pass");
            return;
        }

        for (name, ty) in fields.iter() {
            match &ty.kind {
                RpcKind::List { .. } => cw_writeln!(w, "self.{name} = {name} or []"),
                RpcKind::Dict { .. } => {
                    cw_writeln!(w, "self.{name} = {name} or {}()", path.child(name).class_name());
                }
                _ => cw_writeln!(w, "self.{name} = {name}"),
            }
        }
    });
}

// empty_conversions
fn empty_conversions(w: &mut CodeWriter, path: &TypePath, mode: ClassMode) {
    if mode.wire() {
        w.colon_block("def convert_pb2(self)", |w| {
            cw_writeln!(w, "return pb2.{}()", path.wire_name());
        });
        w.blank_line();
        w.colon_block("def from_pb2(self, context, allow_addition: bool = False)", |w| {
            w.writeln("return None");
        });
        w.blank_line();
    }
    w.colon_block("def from_dict(self, context, allow_addition: bool = False)", |w| {
        w.writeln("return None");
    });
}

// convert_pb2
fn convert_pb2(w: &mut CodeWriter, path: &TypePath, fields: &Fields) {
    w.colon_block("def convert_pb2(self)", |w| {
        cw_writeln!(w, "result = pb2.{}()", path.wire_name());

        for (name, ty) in fields.iter() {
            match &ty.kind {
                RpcKind::List { elem } => {
                    let item = if elem.is_dict() { "item.convert_pb2()" } else { "item" };
                    w.colon_block(&format!("for item in self.{name}"), |w| {
                        cw_writeln!(w, "result.{name}.append({item})");
                    });
                }
                RpcKind::Dict { .. } => {
                    cw_writeln!(w, "result.{name}.MergeFrom(self.{name}.convert_pb2())");
                }
                _ if is_scalar_like(ty) => cw_writeln!(w, "result.{name} = self.{name}"),
                _ => {}
            }
        }

        w.writeln("return result");
    });
}

///
/// Source
/// where a `from_*` conversion reads its values
///

#[derive(Clone, Copy, Debug)]
enum Source {
    Wire,
    Dict,
}

impl Source {
    const fn method(self) -> &'static str {
        match self {
            Self::Wire => "from_pb2",
            Self::Dict => "from_dict",
        }
    }

    fn read(self, name: &str) -> String {
        match self {
            Self::Wire => format!("context.{name}"),
            Self::Dict => format!("context.get(\"{name}\")"),
        }
    }
}

// from_source
fn from_source(w: &mut CodeWriter, path: &TypePath, fields: &Fields, source: Source) {
    let method = source.method();

    w.colon_block(
        &format!("def {method}(self, context, allow_addition: bool = False)"),
        |w| {
            if matches!(source, Source::Dict) {
                w.colon_block("if context is None", |w| w.writeln("context = {}"));
                w.blank_line();
                w.colon_block("if allow_addition", |w| {
                    w.writeln("# inject all items from dict to entity");
                    w.colon_block("for k, v in context.items()", |w| {
                        w.colon_block("if hasattr(self, k)", |w| w.writeln("continue"));
                        w.writeln("setattr(self, k, v)");
                    });
                });
                w.blank_line();
            }

            for (name, ty) in fields.iter() {
                let value = source.read(name);

                match &ty.kind {
                    RpcKind::List { elem } => {
                        cw_writeln!(w, "self.{name} = []");
                        w.colon_block(&format!("for item in {value} or []"), |w| {
                            if elem.is_dict() {
                                cw_writeln!(w, "new_item = {}()", path.child(name).class_name());
                                cw_writeln!(w, "new_item.{method}(item)");
                                cw_writeln!(w, "self.{name}.append(new_item)");
                            } else {
                                cw_writeln!(w, "self.{name}.append(item)");
                            }
                        });
                    }
                    RpcKind::Dict { .. } => cw_writeln!(w, "self.{name}.{method}({value})"),
                    _ => match ty.default_value.as_ref().filter(|v| !v.is_null()) {
                        Some(_) => cw_writeln!(
                            w,
                            "self.{name} = self.choose_default({value}, {})",
                            python_default(ty)
                        ),
                        None => cw_writeln!(w, "self.{name} = {value}"),
                    },
                }
            }
        },
    );
}

///
/// TESTS
///
