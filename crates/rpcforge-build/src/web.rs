//! Web resource modules in the Flask-RESTPlus dialect.
//!
//! Each service becomes a namespace with one argument doc model and one
//! response model per entry, and a resource class whose methods extract
//! their arguments and dispatch to the implementation.

use crate::{
    BuildError, GeneratedFile, ServiceBuilder, cw_writeln,
    mapping::{py_bool, py_str, python_default, python_type, web_field},
    python,
    shape::{Container, DATA_FIELD, TypePath},
    writer::CodeWriter,
};
use rpcforge_schema::{
    field_map::Fields,
    naming::{pretty_name, snake_name},
    node::{Entry, MetaData, Namespace, RpcKind, RpcType},
    types::ArgSource,
};
use std::path::PathBuf;

/// Module segment after which the declaring package mirrors the output tree.
const API_PACKAGE: &str = "define.api.";

/// Entry name that documents its arguments as query parameters.
const GET: &str = "get";

/// Output path of a service's resource module, without extension.
#[must_use]
pub fn module_path(meta: &MetaData) -> PathBuf {
    let mut path = PathBuf::new();
    if let Some(index) = meta.service.module.find(API_PACKAGE) {
        for segment in meta.service.module[index + API_PACKAGE.len()..].split('.') {
            path.push(segment);
        }
    }
    path.push(snake_name(&meta.name));

    path
}

/// Resource and argument-definition modules of one service.
pub fn generate(builder: &ServiceBuilder) -> Result<Vec<GeneratedFile>, BuildError> {
    let path = module_path(builder.meta);
    let resource = resource_module(builder)?;
    let definitions = python::definitions_module(builder);

    Ok(vec![
        GeneratedFile::new(path.with_extension("py"), resource),
        GeneratedFile::new(
            path.with_file_name(format!("{}_def.py", snake_name(&builder.meta.name))),
            definitions,
        ),
    ])
}

/// `api_reg.py`, importing every resource module and the enum resources.
#[must_use]
pub fn api_registry(metas: &[MetaData]) -> String {
    let mut lines: Vec<String> = metas
        .iter()
        .map(|meta| {
            let segments: Vec<_> = module_path(meta)
                .iter()
                .map(|s| s.to_string_lossy().into_owned())
                .collect();
            format!("from .{} import *", segments.join("."))
        })
        .collect();
    lines.sort();
    lines.push("from .ss_enum import *".to_string());

    let mut text = lines.join("\n");
    text.push('\n');

    text
}

// namespace
// a service without a declared namespace is mounted at its file stem
fn namespace(meta: &MetaData) -> Namespace {
    let stem = snake_name(&meta.name);
    let mut ns = meta.namespace.clone().unwrap_or_else(|| Namespace {
        name: stem.clone(),
        ..Namespace::default()
    });
    if ns.urls.is_empty() {
        ns.urls.push(format!("/{stem}"));
    }

    ns
}

// resource_module
fn resource_module(builder: &ServiceBuilder) -> Result<String, BuildError> {
    let meta = builder.meta;
    let class = builder.class_name();
    let ns = namespace(meta);
    let mut w = CodeWriter::new();

    w.writeln("from flask_restplus import fields");
    cw_writeln!(w, "from {}.runtime.web import SSResource", builder.options.runtime_path);
    cw_writeln!(w, "from {} import api", builder.options.api_path);
    if let Some(implementation) = builder.implementation() {
        let alias = format!("{class}Impl");
        if implementation.name == alias {
            cw_writeln!(w, "from {} import {alias}", implementation.module);
        } else {
            cw_writeln!(
                w,
                "from {} import {} as {alias}",
                implementation.module,
                implementation.name
            );
        }
    }
    cw_writeln!(w, "from {} import {} as {class}Define", meta.service.module, meta.service.name);

    let containers: Vec<_> = meta
        .entries
        .iter()
        .flat_map(|e| {
            [Container::Arg, Container::Result]
                .map(|c| TypePath::new(&meta.name, &e.name, c).class_name())
        })
        .collect();
    if !containers.is_empty() {
        cw_writeln!(w, "from .{}_def import {}", snake_name(&meta.name), containers.join(", "));
    }
    w.blank_line();
    w.blank_line();

    cw_writeln!(
        w,
        "ns = api.namespace({}, description={})",
        py_str(&ns.name),
        py_str(&ns.description)
    );
    w.blank_line();

    for entry in &meta.entries {
        w.blank_line();
        arg_model(&mut w, &class, entry)?;
        w.blank_line();
        result_model(&mut w, &class, entry);
    }

    w.blank_line();
    w.blank_line();
    for url in &ns.urls {
        cw_writeln!(w, "@ns.route({})", py_str(url));
    }
    for (name, field) in ns.params.iter() {
        cw_writeln!(w, "@ns.param({}, {})", py_str(name), py_str(&field.description));
    }
    w.colon_block(&format!("class {class}Resource(SSResource)"), |w| {
        for entry in &meta.entries {
            w.blank_line();
            method(w, builder, &class, entry);
        }
    });

    Ok(w.finish())
}

// arg_model
// path and header arguments are documented elsewhere
fn arg_model(w: &mut CodeWriter, class: &str, entry: &Entry) -> Result<(), BuildError> {
    let model = pretty_name(&format!("{class}_{}_arg_model", entry.name));
    let args: Fields = entry
        .args
        .iter()
        .filter(|a| !matches!(a.source, ArgSource::Path | ArgSource::Header))
        .filter(|a| !a.arg_type.is_void())
        .map(|a| (a.name.clone(), a.as_field()))
        .collect();

    cw_writeln!(w, "{model} = ns.doc(");
    {
        let _indent = w.indent();
        cw_writeln!(w, "{},", py_str(&model));

        if entry.name == GET {
            w.writeln("params={");
            {
                let _indent = w.indent();
                for (name, ty) in args.iter() {
                    if !(ty.is_base_type() || ty.is_enum()) {
                        return Err(BuildError::NestedGetParam {
                            service: class.to_string(),
                            entry: entry.name.clone(),
                            param: name.to_string(),
                        });
                    }
                    cw_writeln!(w, "{}: {{", py_str(name));
                    w.indented(|w| {
                        cw_writeln!(w, "\"type\": {},", python_type(ty));
                        cw_writeln!(w, "\"required\": {},", py_bool(ty.required));
                        cw_writeln!(w, "\"description\": {},", py_str(&ty.description));
                        if has_default(ty) {
                            cw_writeln!(w, "\"default\": {},", python_default(ty));
                        }
                    });
                    w.writeln("},");
                }
            }
            w.writeln("}");
        } else {
            cw_writeln!(w, "expect=[api.model({}, {{", py_str(&model));
            w.indented(|w| fields_body(w, &args, &model));
            w.writeln("})]");
        }
    }
    w.writeln(")");

    Ok(())
}

// result_model
fn result_model(w: &mut CodeWriter, class: &str, entry: &Entry) {
    let model = pretty_name(&format!("{class}_{}_result_model", entry.name));
    let fields: Fields = match &entry.result.kind {
        RpcKind::Void => Fields::new(),
        RpcKind::Dict { fields } => fields.clone(),
        _ => [(DATA_FIELD, entry.result.clone())].into_iter().collect(),
    };

    cw_writeln!(w, "{model} = ns.response(");
    w.indented(|w| {
        w.writeln("200,");
        cw_writeln!(w, "{},", py_str(&entry.result.description));
        cw_writeln!(w, "api.model({}, {{", py_str(&model));
        w.indented(|w| fields_body(w, &fields, &model));
        w.writeln("})");
    });
    w.writeln(")");
}

// fields_body
fn fields_body(w: &mut CodeWriter, fields: &Fields, prefix: &str) {
    for (name, ty) in fields.iter() {
        if ty.is_void() || ty.source == ArgSource::Header {
            continue;
        }

        cw_writeln!(w, "{}: {}(", py_str(name), web_field(ty));
        w.indented(|w| {
            let nested = pretty_name(&format!("{prefix}_{name}"));
            match &ty.kind {
                RpcKind::Dict { fields: inner } => nested_model(w, inner, &nested),
                RpcKind::List { elem } => list_elem(w, elem, &nested),
                _ => {}
            }
            field_kwargs(w, ty);
        });
        w.writeln("),");
    }
}

// list_elem
fn list_elem(w: &mut CodeWriter, elem: &RpcType, model: &str) {
    cw_writeln!(w, "{}(", web_field(elem));
    w.indented(|w| {
        if let Some(inner) = elem.fields() {
            nested_model(w, inner, model);
        }
        field_kwargs(w, elem);
    });
    w.writeln("),");
}

// nested_model
fn nested_model(w: &mut CodeWriter, fields: &Fields, model: &str) {
    cw_writeln!(w, "model=api.model({}, {{", py_str(model));
    w.indented(|w| fields_body(w, fields, model));
    w.writeln("}),");
}

fn has_default(ty: &RpcType) -> bool {
    ty.default_value.as_ref().is_some_and(|v| !v.is_null())
}

// field_kwargs
fn field_kwargs(w: &mut CodeWriter, ty: &RpcType) {
    cw_writeln!(w, "required={},", py_bool(ty.required));
    cw_writeln!(w, "description={},", py_str(&ty.description));
    if has_default(ty) {
        cw_writeln!(w, "default={},", python_default(ty));
    }

    let c = &ty.constraints;
    if let Some(v) = c.minimum {
        cw_writeln!(w, "min={v},");
    }
    if let Some(v) = c.maximum {
        cw_writeln!(w, "max={v},");
    }
    if let Some(v) = c.min_length {
        cw_writeln!(w, "min_length={v},");
    }
    if let Some(v) = c.max_length {
        cw_writeln!(w, "max_length={v},");
    }
    if let Some(v) = c.min_items {
        cw_writeln!(w, "min_items={v},");
    }
    if let Some(v) = c.max_items {
        cw_writeln!(w, "max_items={v},");
    }
}

// method
fn method(w: &mut CodeWriter, builder: &ServiceBuilder, class: &str, entry: &Entry) {
    let arg_class = TypePath::new(&builder.meta.name, &entry.name, Container::Arg).class_name();
    let result_class =
        TypePath::new(&builder.meta.name, &entry.name, Container::Result).class_name();

    cw_writeln!(w, "@{}", pretty_name(&format!("{class}_{}_arg_model", entry.name)));
    cw_writeln!(w, "@{}", pretty_name(&format!("{class}_{}_result_model", entry.name)));
    for header in entry.args.iter().filter(|a| a.source == ArgSource::Header) {
        w.writeln("@api.header(");
        w.indented(|w| {
            cw_writeln!(w, "{},", py_str(&header.name));
            cw_writeln!(w, "description={},", py_str(&header.description));
            cw_writeln!(w, "required={},", py_bool(header.required));
            cw_writeln!(w, "type={},", python_type(&header.arg_type));
            cw_writeln!(w, "default={},", python_default(&header.as_field()));
        });
        w.writeln(")");
    }

    w.colon_block(
        &format!("def {}(self, *args, **kwargs) -> {result_class}", entry.name),
        |w| {
            w.writeln("\"\"\"");
            w.lines(&entry.description);
            w.writeln("\"\"\"");
            w.writeln("# extract args with method_name, define class, args type, addition args");
            cw_writeln!(
                w,
                "args = self.extract_args(\"{}\", {class}Define, {arg_class}, *args, **kwargs)",
                entry.name
            );
            if builder.implementation().is_some() {
                cw_writeln!(w, "impl = {class}Impl()");
                cw_writeln!(w, "return impl.{}(args)", entry.name);
            } else {
                w.writeln("raise NotImplementedError(\"Please Implement the logic first\")");
            }
        },
    );
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_meta, options};
    use rpcforge_schema::{
        node::{Arg, ClassRef},
        types::ScalarKind,
    };
    use serde_json::json;

    fn get_meta() -> MetaData {
        let mut meta = demo_meta();
        meta.implementation = Some(ClassRef::new("app.impl.demo", "DemoService"));

        let mut entry = Entry::new("get");
        entry.description = "fetch a user".into();
        entry.args = vec![
            Arg::new(
                "id",
                RpcType::scalar(ScalarKind::Int)
                    .with_required(true)
                    .with_default(json!(0)),
            )
            .with_source(ArgSource::Params),
            Arg::new("token", RpcType::scalar(ScalarKind::String))
                .with_source(ArgSource::Header)
                .with_description("auth token"),
        ];
        let result: Fields = [("name", RpcType::scalar(ScalarKind::String))].into_iter().collect();
        entry.result = RpcType::dict(result);
        meta.entries.insert(0, entry);

        meta
    }

    fn resource(meta: &MetaData) -> String {
        let opts = options();
        let files = generate(&ServiceBuilder::new(meta, &opts)).expect("web modules");
        files[0].contents.clone()
    }

    #[test]
    fn files_mirror_the_api_package() {
        let meta = demo_meta();
        let opts = options();
        let files = generate(&ServiceBuilder::new(&meta, &opts)).expect("web modules");

        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("user/demo/demo.py"), PathBuf::from("user/demo/demo_def.py")]
        );
        assert_eq!(
            api_registry(&[meta]),
            "from .user.demo.demo import *\nfrom .ss_enum import *\n"
        );
    }

    #[test]
    fn header_imports_and_namespace() {
        let text = resource(&get_meta());

        assert!(text.starts_with(
            "from flask_restplus import fields\nfrom runtime.runtime.web import SSResource\nfrom src import api\n"
        ));
        assert!(text.contains("from app.impl.demo import DemoService as DemoImpl\n"));
        assert!(text.contains("from app.define.api.user.demo import Demo as DemoDefine\n"));
        assert!(text.contains("from .demo_def import GetArg, GetResult, HelloArg, HelloResult\n"));
        assert!(text.contains("ns = api.namespace(\"demo\", description=\"\")\n"));
        assert!(text.contains("@ns.route(\"/demo\")\nclass DemoResource(SSResource):\n"));
    }

    #[test]
    fn get_arguments_are_query_params() {
        let text = resource(&get_meta());

        let expected = "\
DemoGetArgModel = ns.doc(
    \"DemoGetArgModel\",
    params={
        \"id\": {
            \"type\": int,
            \"required\": True,
            \"description\": \"\",
            \"default\": 0,
        },
    }
)
";
        assert!(text.contains(expected), "unexpected module:\n{text}");
        assert!(!text.contains("\"token\": {"), "headers are not query params");
    }

    #[test]
    fn post_arguments_use_an_expect_model_and_results_are_wrapped() {
        let text = resource(&demo_meta());

        let expected = "\
DemoHelloArgModel = ns.doc(
    \"DemoHelloArgModel\",
    expect=[api.model(\"DemoHelloArgModel\", {
        \"name\": fields.String(
            required=False,
            description=\"user name\",
        ),
        \"tags\": fields.List(
            fields.Integer(
                required=False,
                description=\"\",
            ),
            required=False,
            description=\"\",
        ),
    })]
)
";
        assert!(text.contains(expected), "unexpected module:\n{text}");
        assert!(text.contains(
            "api.model(\"DemoHelloResultModel\", {\n        \"data\": fields.String(\n"
        ));
        assert!(text.contains(
            "        raise NotImplementedError(\"Please Implement the logic first\")\n"
        ));
    }

    #[test]
    fn methods_carry_headers_and_dispatch() {
        let text = resource(&get_meta());

        let expected = "\
    @DemoGetArgModel
    @DemoGetResultModel
    @api.header(
        \"token\",
        description=\"auth token\",
        required=False,
        type=str,
        default=\"\",
    )
    def get(self, *args, **kwargs) -> GetResult:
        \"\"\"
        fetch a user
        \"\"\"
        # extract args with method_name, define class, args type, addition args
        args = self.extract_args(\"get\", DemoDefine, GetArg, *args, **kwargs)
        impl = DemoImpl()
        return impl.get(args)
";
        assert!(text.contains(expected), "unexpected module:\n{text}");
    }

    #[test]
    fn nested_get_params_are_rejected() {
        let mut meta = get_meta();
        let inner: Fields = [("a", RpcType::scalar(ScalarKind::Int))].into_iter().collect();
        meta.entries[0].args.push(Arg::new("filter", RpcType::dict(inner)));
        let opts = options();

        let err = generate(&ServiceBuilder::new(&meta, &opts)).expect_err("nested get param");
        assert!(
            matches!(&err, BuildError::NestedGetParam { param, .. } if param == "filter"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn constraints_become_field_kwargs() {
        let mut meta = demo_meta();
        let mut name = RpcType::scalar(ScalarKind::String);
        name.constraints.min_length = Some(2);
        name.constraints.max_length = Some(8);
        meta.entries[0].args = vec![Arg::new("name", name)];

        let text = resource(&meta);
        assert!(text.contains("            min_length=2,\n            max_length=8,\n"));
    }
}
