//! Per-class method extraction over the two annotation channels.

use crate::{
    AnalyseError,
    adapter::{Diagnostics, TypeAdapter},
    decl::{
        Addition, ApiDoc, AttrLookup, ClassDecl, MemberDecl, ParamSpec, ResponseDecl, ResponseSpec,
        TypeDescriptor,
    },
    doc::{method_description, param_doc},
};
use rpcforge_schema::prelude::*;
use tracing::{debug, warn};

/// Source implied by an HTTP-style method name, overridden by a declared one.
#[must_use]
pub fn get_source_type(method_name: &str, field: &RpcType) -> ArgSource {
    if !field.source.is_unknown() {
        return field.source;
    }

    match method_name {
        "get" => ArgSource::Params,
        "post" => ArgSource::Body,
        _ => ArgSource::Unknown,
    }
}

///
/// Analyser
///

#[derive(Debug, Default)]
pub struct Analyser {
    adapter: TypeAdapter,
}

impl Analyser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn diagnostics(&self) -> Diagnostics {
        self.adapter.diagnostics()
    }

    /// Entries of every public function-like member, sorted by lowercase name.
    pub fn extract_methods(&mut self, class: &ClassDecl) -> Result<Vec<Entry>, AnalyseError> {
        let class_args = self.process_cls_args(class);
        let mut entries = Vec::new();

        for (name, member) in class.members.iter() {
            if name.starts_with('_') || !member.kind.is_function_like() {
                continue;
            }

            // the rich channel replaces the legacy one entirely
            let entry = match &member.apidoc {
                Some(api_doc) => {
                    let mut entry = self.analyse_doc(class, name, member, api_doc, &class_args)?;
                    let mut args = class_args.clone();
                    args.append(&mut entry.args);
                    entry.args = args;
                    entry
                }
                None => Self::legacy_entry(name, member, &class_args),
            };

            entries.push(entry);
        }

        entries.sort_by_cached_key(|e| e.name.to_lowercase());

        Ok(entries)
    }

    // legacy_entry
    fn legacy_entry(name: &str, member: &MemberDecl, class_args: &[Arg]) -> Entry {
        let mut args = class_args.to_vec();

        if let Some(fields) = member.rpc_doc_args.as_ref().and_then(RpcType::fields) {
            for (field_name, field) in fields.iter() {
                args.push(
                    Arg::new(field_name, field.clone())
                        .with_source(get_source_type(name, field)),
                );
            }
        }
        args.sort_by_cached_key(|a| a.name.to_lowercase());

        let mut entry = Entry::new(name);
        entry.args = args;
        entry.result = member.rpc_doc_resp.clone().unwrap_or_else(RpcType::void);
        entry.description = method_description(member.doc.as_deref().unwrap_or_default());

        entry
    }

    /// Class-level args: api-doc params (default source path) then
    /// namespace params (always path).
    pub fn process_cls_args(&mut self, class: &ClassDecl) -> Vec<Arg> {
        let mut args = Vec::new();

        if let Some(api_doc) = &class.apidoc {
            for (key, spec) in api_doc.params.iter() {
                let desc = spec
                    .present("type")
                    .map_or_else(|| TypeDescriptor::literal("str"), TypeDescriptor::from_value);
                let ty = self.adapter.switch_type(Some(&desc), Some(spec));

                let source = match spec.present("in").and_then(Value::as_str).unwrap_or("path") {
                    "path" => ArgSource::Path,
                    "body" => ArgSource::Body,
                    "header" => ArgSource::Header,
                    _ => ArgSource::Params,
                };

                args.push(Arg::new(key, ty).with_source(source));
            }
        }

        if let Some(namespace) = &class.namespace {
            for (name, ty) in namespace.params.iter() {
                args.push(Arg::new(name, ty.clone()).with_source(ArgSource::Path));
            }
        }

        args
    }

    // analyse_doc
    fn analyse_doc(
        &mut self,
        class: &ClassDecl,
        name: &str,
        member: &MemberDecl,
        api_doc: &ApiDoc,
        class_args: &[Arg],
    ) -> Result<Entry, AnalyseError> {
        let raw_doc = member.doc.as_deref().unwrap_or_default();

        let mut entry = Entry::new(name);
        entry.description = method_description(raw_doc);
        entry.args = self.analyse_args(class, name, member, api_doc, class_args)?;

        for (code, response) in &api_doc.responses {
            let Ok(status) = code.parse::<u16>() else {
                warn!(
                    class = %class.name,
                    method = name,
                    code = %code,
                    "skipping non-numeric status code"
                );
                continue;
            };
            entry.set_result(status, self.analyse_result(response));
        }

        Ok(entry)
    }

    /// Response type for one status code.
    pub fn analyse_result(&mut self, response: &ResponseDecl) -> RpcType {
        let ResponseDecl(desc, spec) = response;
        let desc = desc.as_deref().unwrap_or_default();

        match spec {
            None if desc.is_empty() => RpcType::void(),
            None => RpcType::void().with_description(desc),
            Some(ResponseSpec::Model(model)) => {
                let fields = model
                    .iter()
                    .map(|(key, d)| (key, self.adapter.switch_type(Some(d), None)))
                    .collect();

                RpcType::dict(fields)
                    .with_required(true)
                    .with_description(desc)
            }
            // response descriptors take their builder defaults only
            Some(ResponseSpec::Descriptor(d)) => self.adapter.switch_type(Some(d), None),
        }
    }

    /// Merged argument list: method params, expected bodies, then signature
    /// parameters not already declared by those or by the class.
    pub fn analyse_args(
        &mut self,
        class: &ClassDecl,
        method: &str,
        member: &MemberDecl,
        api_doc: &ApiDoc,
        class_args: &[Arg],
    ) -> Result<Vec<Arg>, AnalyseError> {
        let signature = &member.signature;
        let positional = signature.positional();
        let annotated = signature.annotated_count();

        if positional.len() > annotated {
            let missing = positional
                .iter()
                .filter(|p| p.annotation.is_none())
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>();
            let params = positional
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>();

            return Err(AnalyseError::MissingAnnotations {
                class: class.name.clone(),
                method: method.to_string(),
                positional: positional.len(),
                annotated,
                missing: missing.join(", "),
                params: params.join(", "),
            });
        }

        let mut params = self.analyse_web_args(class, method, &api_doc.params, false)?;
        for expect in &api_doc.expect {
            params.extend(self.analyse_web_args(class, method, expect, true)?);
        }

        let raw_doc = member.doc.as_deref().unwrap_or_default();
        for param in positional {
            let ty = self.adapter.switch_type(param.annotation.as_ref(), None);
            if ty.is_void() {
                debug!(
                    class = %class.name,
                    method,
                    param = %param.name,
                    "skipping void-typed parameter"
                );
                continue;
            }

            let is_dup = params.iter().chain(class_args).any(|a| a.name == param.name);
            if is_dup {
                continue;
            }

            let arg = Arg::new(param.name.clone(), ty)
                .with_description(param_doc(raw_doc, &param.name).unwrap_or_default())
                .with_default(signature.default_for(&param.name).filter(|v| !v.is_null()).cloned());
            params.push(arg);
        }

        Ok(params)
    }

    // analyse_web_args
    fn analyse_web_args(
        &mut self,
        class: &ClassDecl,
        method: &str,
        specs: &FieldMap<ParamSpec>,
        in_body: bool,
    ) -> Result<Vec<Arg>, AnalyseError> {
        let mut args = Vec::new();

        for (key, spec) in specs.iter() {
            let arg = match spec {
                ParamSpec::Dict(addition) => {
                    self.dict_param(class, method, key, addition, in_body)?
                }
                ParamSpec::Field(field) => {
                    let ty = self.adapter.switch_field(field);
                    if ty.is_void() {
                        warn!(
                            class = %class.name,
                            method,
                            param = key,
                            "skipping untyped web field"
                        );
                        continue;
                    }

                    let required = field.present("required").is_none_or(truthy);
                    let source = if in_body { ArgSource::Body } else { ArgSource::Params };
                    Arg::new(key, ty)
                        .with_required(required)
                        .with_source(source)
                }
            };

            args.push(arg);
        }

        Ok(args)
    }

    fn dict_param(
        &mut self,
        class: &ClassDecl,
        method: &str,
        key: &str,
        addition: &Addition,
        in_body: bool,
    ) -> Result<Arg, AnalyseError> {
        let desc = addition.present("type").map(TypeDescriptor::from_value);
        let ty = self.adapter.switch_type(desc.as_ref(), Some(addition));
        if ty.is_void() {
            return Err(AnalyseError::UntypedParam {
                class: class.name.clone(),
                method: method.to_string(),
                param: key.to_string(),
            });
        }

        let source = if in_body {
            ArgSource::Body
        } else if addition.present("in").and_then(Value::as_str).unwrap_or("params") == "params" {
            ArgSource::Params
        } else {
            ArgSource::Header
        };

        Ok(Arg::new(key, ty)
            .with_default(addition.present("default").cloned())
            .with_description(addition.text("description").unwrap_or_default())
            .with_source(source))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn class(value: Value) -> ClassDecl {
        let mut class: ClassDecl = serde_json::from_value(value).expect("valid class");
        class.module = "app.service".into();
        class
    }

    fn names(entry: &Entry) -> Vec<&str> {
        entry.args.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn legacy_channel_sorts_args_and_infers_sources() {
        let demo = class(json!({
            "name": "Demo",
            "members": {
                "post": {
                    "doc": "create a user\n:param name: user name",
                    "rpc_doc_args": {"type": "dict", "fields": {
                        "name": {"type": "string", "required": true},
                        "Age": {"type": "int", "source": "header"}
                    }},
                    "rpc_doc_resp": {"type": "bool"}
                },
                "_hidden": {},
                "value": {"kind": "attribute"}
            }
        }));

        let entries = Analyser::new().extract_methods(&demo).expect("analysed");
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.description, "create a user");
        assert_eq!(names(entry), vec!["Age", "name"]);
        assert_eq!(entry.arg("name").map(|a| a.source), Some(ArgSource::Body));
        assert_eq!(entry.arg("Age").map(|a| a.source), Some(ArgSource::Header));
        assert_eq!(entry.result.scalar_kind(), Some(ScalarKind::Bool));
    }

    #[test]
    fn rich_channel_merges_sources_in_order() {
        let demo = class(json!({
            "name": "Demo",
            "apidoc": {"params": {"tenant": {"in": "header", "description": "tenant id"}}},
            "namespace": {"name": "demo", "params": {"user_id": {"type": "int"}}},
            "members": {
                "get": {
                    "doc": "fetch\n:param limit: page size",
                    "rpc_doc_args": {"type": "dict", "fields": {"ignored": {"type": "int"}}},
                    "apidoc": {
                        "params": {
                            "q": {"type": "str", "description": "query", "in": "params"},
                            "token": {"type": "str", "in": "header"}
                        },
                        "expect": [{"body": {"field": "String", "required": false}}],
                        "responses": {"200": ["ok", {"total": "int"}]}
                    },
                    "signature": {
                        "params": [
                            {"name": "self"},
                            {"name": "limit", "annotation": "int"},
                            {"name": "q", "annotation": "str"},
                            {"name": "user_id", "annotation": "int"},
                            {"name": "raw", "annotation": {"class": "Request"}}
                        ],
                        "defaults": [null, 10]
                    }
                }
            }
        }));

        let entries = Analyser::new().extract_methods(&demo).expect("analysed");
        let entry = &entries[0];

        assert_eq!(names(entry), vec!["tenant", "user_id", "q", "token", "body", "limit"]);
        assert_eq!(entry.arg("tenant").map(|a| a.source), Some(ArgSource::Header));
        assert_eq!(entry.arg("user_id").map(|a| a.source), Some(ArgSource::Path));
        assert_eq!(entry.arg("q").map(|a| a.source), Some(ArgSource::Params));
        assert_eq!(entry.arg("token").map(|a| a.source), Some(ArgSource::Header));

        let body = entry.arg("body").expect("body arg");
        assert_eq!(body.source, ArgSource::Body);
        assert!(!body.required);

        let limit = entry.arg("limit").expect("limit arg");
        assert_eq!(limit.description, "page size");
        assert_eq!(limit.default, None);

        let fields = entry.result.fields().expect("dict result");
        assert!(entry.result.required);
        assert_eq!(entry.result.description, "ok");
        assert!(fields.contains_key("total"));
        assert!(entry.arg("ignored").is_none(), "legacy args are not merged");
    }

    #[test]
    fn missing_annotations_fail_naming_class_and_method() {
        let demo = class(json!({
            "name": "Demo",
            "members": {
                "hello": {
                    "apidoc": {},
                    "signature": {"params": [
                        {"name": "self"},
                        {"name": "name", "annotation": "str"},
                        {"name": "age"}
                    ]}
                }
            }
        }));

        let err = Analyser::new()
            .extract_methods(&demo)
            .expect_err("missing annotation must fail");
        let rendered = err.to_string();

        assert!(rendered.contains("'hello'"), "method missing: {rendered}");
        assert!(rendered.contains("'Demo'"), "class missing: {rendered}");
        assert!(rendered.contains("[age]"), "missing params not listed: {rendered}");
        assert!(rendered.contains("[name, age]"), "params not listed: {rendered}");
    }

    #[test]
    fn untyped_dict_param_is_fatal() {
        let demo = class(json!({
            "name": "Demo",
            "members": {
                "get": {"apidoc": {"params": {"q": {"description": "no type"}}}}
            }
        }));

        let err = Analyser::new()
            .extract_methods(&demo)
            .expect_err("untyped param must fail");
        assert!(
            err.to_string().contains("parameter 'q' of 'Demo.get' has no type definition"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn any_string_type_literal_is_a_typed_param() {
        let demo = class(json!({
            "name": "Demo",
            "members": {
                "get": {"apidoc": {"params": {
                    "ratio": {"type": "float", "in": "params", "description": "ratio"},
                    "since": {"type": "datetime", "in": "header"}
                }}}
            }
        }));

        let mut analyser = Analyser::new();
        let entries = analyser.extract_methods(&demo).expect("string literals are typed");
        let entry = &entries[0];

        let ratio = entry.arg("ratio").expect("ratio arg");
        assert_eq!(ratio.arg_type.scalar_kind(), Some(ScalarKind::String));
        assert_eq!(ratio.source, ArgSource::Params);
        assert_eq!(ratio.description, "ratio");

        let since = entry.arg("since").expect("since arg");
        assert_eq!(since.arg_type.scalar_kind(), Some(ScalarKind::String));
        assert_eq!(since.source, ArgSource::Header);
        assert_eq!(analyser.diagnostics(), Diagnostics::default());
    }

    #[test]
    fn response_fields_ignore_their_own_attributes() {
        let demo = class(json!({
            "name": "Demo",
            "members": {
                "get": {"apidoc": {"responses": {
                    "200": ["ok", {"name": {"field": "String", "required": false, "max_length": 3}}]
                }}}
            }
        }));

        let entries = Analyser::new().extract_methods(&demo).expect("analysed");
        let fields = entries[0].result.fields().expect("dict result");
        let name = fields.get("name").expect("name field");

        assert_eq!(name.scalar_kind(), Some(ScalarKind::String));
        assert!(name.required, "builder default applies");
        assert_eq!(name.constraints.max_length, None);
    }

    #[test]
    fn empty_response_is_void() {
        let mut analyser = Analyser::new();
        let response = ResponseDecl(None, None);

        assert!(analyser.analyse_result(&response).is_void());
    }

    #[test]
    fn entries_sorted_case_insensitively() {
        let demo = class(json!({
            "name": "Demo",
            "members": {
                "zeta": {}, "Alpha": {}, "beta": {}
            }
        }));

        let entries = Analyser::new().extract_methods(&demo).expect("analysed");
        let order = entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>();

        assert_eq!(order, vec!["Alpha", "beta", "zeta"]);
    }
}
