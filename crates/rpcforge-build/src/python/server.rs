//! Servicer stub dispatching each call to the bound implementation.

use crate::{
    ServiceBuilder, cw_writeln,
    shape::{Container, TypePath},
    writer::CodeWriter,
};

/// Servicer module text, written to `rpc/<stem>.py`.
#[must_use]
pub fn generate(builder: &ServiceBuilder) -> String {
    let meta = builder.meta;
    let class = builder.class_name();
    let stem = builder.stem();
    let mut w = CodeWriter::new();

    w.writeln("# coding: utf-8");
    w.blank_line();
    w.writeln("import typing");
    cw_writeln!(w, "from .encode import {stem}_pb2_grpc as pb2_grpc");
    cw_writeln!(w, "from .impl.{stem} import *");
    w.writeln("from .runtime.runtime import Context, TraceInfo, reg_servicer");
    w.writeln("from .runtime.runtime.concurrency.local_trace import TraceContext");
    if let Some(implementation) = builder.implementation() {
        cw_writeln!(w, "from {} import {}", implementation.module, implementation.name);
    }
    w.blank_line();
    w.blank_line();

    w.colon_block(&format!("class {class}Servicer(pb2_grpc.{class}Servicer)"), |w| {
        cw_writeln!(w, "from_project = \"{}\"", builder.options.from_project);
        cw_writeln!(w, "rpc_name = \"{class}\"");

        for entry in &meta.entries {
            let arg = TypePath::new(&meta.name, &entry.name, Container::Arg).class_name();
            let result = TypePath::new(&meta.name, &entry.name, Container::Result).class_name();

            w.blank_line();
            w.colon_block(&format!("def {}(self, request, context)", entry.name), |w| {
                cw_writeln!(w, "arg = {arg}()");
                w.writeln("arg.from_pb2(request)");
                cw_writeln!(
                    w,
                    "ctx = Context(TraceInfo(\"{class}.{}\"), impl_context=context)",
                    entry.name
                );
                w.colon_block("with TraceContext(ctx)", |w| match builder.implementation() {
                    Some(implementation) => {
                        cw_writeln!(w, "impl = {}(ctx)", implementation.name);
                        cw_writeln!(w, "result = impl.{}(arg)", entry.name);
                        w.writeln("return result.convert_pb2()");
                    }
                    None => {
                        cw_writeln!(w, "# implement the call here; it must return {result}");
                        w.writeln("raise NotImplementedError()");
                    }
                });
            });
        }
    });

    w.finish()
}

///
/// TESTS
///
