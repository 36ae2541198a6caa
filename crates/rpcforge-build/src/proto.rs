//! Protocol descriptor emitter.
//!
//! Metadata is lowered into a message IR first; rendering walks the IR.
//! Whether a field is singular or repeated is decided while lowering.

use crate::{
    ServiceBuilder, cw_writeln,
    mapping::wire_type,
    shape::{Container, DATA_FIELD, TypePath, arg_fields, result_fields},
    writer::CodeWriter,
};
use rpcforge_schema::{
    field_map::Fields,
    naming::{file_stem, pretty_name},
    node::{Entry, RpcKind, RpcType},
};
use tracing::warn;

///
/// Label
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Label {
    Singular,
    Repeated,
}

///
/// FieldType
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldType {
    Scalar(&'static str),
    Message(String),
}

///
/// ProtoField
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtoField {
    pub label: Label,
    pub ty: FieldType,
    pub name: String,
    pub number: u32,
}

///
/// Item
/// message body entries in emission order
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Item {
    Message(ProtoMessage),
    Field(ProtoField),
}

///
/// ProtoMessage
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProtoMessage {
    pub name: String,
    pub items: Vec<Item>,
}

impl ProtoMessage {
    pub fn fields(&self) -> impl Iterator<Item = &ProtoField> {
        self.items.iter().filter_map(|item| match item {
            Item::Field(f) => Some(f),
            Item::Message(_) => None,
        })
    }

    pub fn nested(&self) -> impl Iterator<Item = &ProtoMessage> {
        self.items.iter().filter_map(|item| match item {
            Item::Message(m) => Some(m),
            Item::Field(_) => None,
        })
    }
}

///
/// Rpc
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rpc {
    pub name: String,
    pub arg: String,
    pub result: String,
}

///
/// ProtoFile
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtoFile {
    pub file_name: String,
    pub service: String,
    pub messages: Vec<ProtoMessage>,
    pub rpcs: Vec<Rpc>,
}

/// Lower a service into its descriptor IR.
#[must_use]
pub fn lower(builder: &ServiceBuilder) -> ProtoFile {
    let meta = builder.meta;
    let mut messages = Vec::new();
    let mut rpcs = Vec::new();

    for entry in &meta.entries {
        let arg = TypePath::new(&meta.name, &entry.name, Container::Arg);
        let result = TypePath::new(&meta.name, &entry.name, Container::Result);

        messages.push(message(arg.message_name(), &arg_fields(entry)));
        messages.push(result_message(&result, entry));
        rpcs.push(Rpc {
            name: entry.name.clone(),
            arg: arg.message_name(),
            result: result.message_name(),
        });
    }

    ProtoFile {
        file_name: format!("{}.proto", file_stem(&meta.name)),
        service: pretty_name(&meta.name),
        messages,
        rpcs,
    }
}

// result_message
// a list of composites wraps its element as the nested `Data` message
fn result_message(path: &TypePath, entry: &Entry) -> ProtoMessage {
    match entry.result.elem() {
        Some(elem) if elem.is_dict() => {
            let mut msg = ProtoMessage {
                name: path.message_name(),
                items: Vec::new(),
            };
            let nested = elem.fields().map(|f| message(pretty_name(DATA_FIELD), f));
            if let Some(nested) = nested {
                msg.items.push(Item::Message(nested));
            }
            msg.items.push(Item::Field(ProtoField {
                label: Label::Repeated,
                ty: FieldType::Message(pretty_name(DATA_FIELD)),
                name: DATA_FIELD.to_string(),
                number: 1,
            }));

            msg
        }
        _ => message(path.message_name(), &result_fields(entry)),
    }
}

// message
fn message(name: String, fields: &Fields) -> ProtoMessage {
    let mut msg = ProtoMessage {
        name,
        items: Vec::new(),
    };
    let mut number = 0;

    for (field_name, ty) in fields.iter() {
        if ty.is_void() {
            continue;
        }
        number += 1;
        lower_field(&mut msg, field_name, ty, number);
    }

    msg
}

// lower_field
fn lower_field(msg: &mut ProtoMessage, name: &str, ty: &RpcType, number: u32) {
    let (label, inner) = match &ty.kind {
        RpcKind::List { elem } => (Label::Repeated, elem.as_ref()),
        _ => (Label::Singular, ty),
    };

    let field_ty = if let Some(scalar) = wire_type(inner) {
        FieldType::Scalar(scalar)
    } else if let Some(fields) = inner.fields() {
        let nested_name = pretty_name(name);
        msg.items.push(Item::Message(message(nested_name.clone(), fields)));
        FieldType::Message(nested_name)
    } else {
        warn!(field = name, kind = inner.kind_name(), "no wire encoding; field skipped");
        return;
    };

    msg.items.push(Item::Field(ProtoField {
        label,
        ty: field_ty,
        name: name.to_string(),
        number,
    }));
}

/// Render the descriptor file text.
#[must_use]
pub fn render(file: &ProtoFile) -> String {
    let mut w = CodeWriter::new();
    w.writeln("syntax = 'proto3';");
    w.blank_line();

    for msg in &file.messages {
        render_message(&mut w, msg);
        w.blank_line();
    }

    w.brace_block(&format!("service {}", file.service), |w| {
        for rpc in &file.rpcs {
            cw_writeln!(w, "rpc {} ({}) returns ({}) {{}}", rpc.name, rpc.arg, rpc.result);
        }
    });

    w.finish()
}

fn render_message(w: &mut CodeWriter, msg: &ProtoMessage) {
    w.brace_block(&format!("message {}", msg.name), |w| {
        for item in &msg.items {
            match item {
                Item::Message(nested) => render_message(w, nested),
                Item::Field(field) => {
                    let ty = match &field.ty {
                        FieldType::Scalar(s) => *s,
                        FieldType::Message(m) => m.as_str(),
                    };
                    let label = match field.label {
                        Label::Singular => "",
                        Label::Repeated => "repeated ",
                    };
                    cw_writeln!(w, "{label}{ty} {} = {};", field.name, field.number);
                }
            }
        }
    });
}

/// Descriptor file name and text for a service.
#[must_use]
pub fn generate(builder: &ServiceBuilder) -> (String, String) {
    let file = lower(builder);
    let text = render(&file);

    (file.file_name, text)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_meta, options};
    use rpcforge_schema::{node::Arg, types::ScalarKind};

    #[test]
    fn renders_messages_and_service() {
        let meta = demo_meta();
        let opts = options();
        let (name, text) = generate(&ServiceBuilder::new(&meta, &opts));

        assert_eq!(name, "demo.proto");
        let expected = "\
syntax = 'proto3';

message DemoHelloArg {
    string name = 1;
    repeated int32 tags = 2;
}

message DemoHelloResult {
    string data = 1;
}

service Demo {
    rpc hello (DemoHelloArg) returns (DemoHelloResult) {}
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn nested_messages_precede_their_fields() {
        let geo: Fields = [("lat", RpcType::scalar(ScalarKind::Float))].into_iter().collect();
        let road: Fields = [
            ("no", RpcType::scalar(ScalarKind::Int)),
            ("geo", RpcType::dict(geo)),
        ]
        .into_iter()
        .collect();
        let addr: Fields = [("road_info", RpcType::list(RpcType::dict(road)))]
            .into_iter()
            .collect();

        let mut meta = demo_meta();
        meta.entries[0].args = vec![Arg::new("addr", RpcType::dict(addr))];
        let opts = options();
        let file = lower(&ServiceBuilder::new(&meta, &opts));

        let arg = &file.messages[0];
        let addr = arg.nested().next().expect("Addr");
        assert_eq!(addr.name, "Addr");
        let road = addr.nested().next().expect("RoadInfo");
        assert_eq!(road.name, "RoadInfo");
        assert_eq!(road.nested().next().map(|m| m.name.as_str()), Some("Geo"));

        let road_field = addr.fields().next().expect("road_info field");
        assert_eq!(road_field.label, Label::Repeated);
        assert_eq!(road_field.ty, FieldType::Message("RoadInfo".into()));
        assert!(matches!(addr.items[0], Item::Message(_)), "message defined before use");
    }

    #[test]
    fn result_wrapping() {
        let mut meta = demo_meta();
        let opts = options();

        meta.entries[0].result = RpcType::list(RpcType::scalar(ScalarKind::Int));
        let text = generate(&ServiceBuilder::new(&meta, &opts)).1;
        assert!(text.contains("message DemoHelloResult {\n    repeated int32 data = 1;\n}"));

        let item: Fields = [("id", RpcType::scalar(ScalarKind::Int))].into_iter().collect();
        meta.entries[0].result = RpcType::list(RpcType::dict(item));
        let text = generate(&ServiceBuilder::new(&meta, &opts)).1;
        assert!(
            text.contains(
                "message DemoHelloResult {\n    message Data {\n        int32 id = 1;\n    }\n    repeated Data data = 1;\n}"
            ),
            "unexpected descriptor:\n{text}"
        );

        meta.entries[0].result = RpcType::void();
        let text = generate(&ServiceBuilder::new(&meta, &opts)).1;
        assert!(text.contains("message DemoHelloResult {\n}"));
    }

    #[test]
    fn enums_use_their_underlying_scalar() {
        let members: Fields = [("OK", RpcType::scalar(ScalarKind::Int))].into_iter().collect();
        let status = RpcType::enumeration(
            Some("Status".into()),
            RpcType::scalar(ScalarKind::Int),
            members,
        );

        let mut meta = demo_meta();
        meta.entries[0].args = vec![Arg::new("status", status), Arg::new("gone", RpcType::void())];
        let opts = options();
        let text = generate(&ServiceBuilder::new(&meta, &opts)).1;

        assert!(text.contains("message DemoHelloArg {\n    int32 status = 1;\n}"));
    }
}
