//! Client stub: one `ServiceClient` subclass per service.

use crate::{
    ServiceBuilder, cw_writeln,
    shape::{Container, TypePath},
    writer::CodeWriter,
};

/// Client stub module text, written to `<client>/<stem>.py`.
#[must_use]
pub fn generate(builder: &ServiceBuilder) -> String {
    let meta = builder.meta;
    let class = builder.class_name();
    let stem = builder.stem();
    let mut w = CodeWriter::new();

    w.writeln("# coding: utf-8");
    w.blank_line();
    w.writeln("import typing");
    cw_writeln!(w, "from .src.encode.{stem}_pb2_grpc import {class}Stub");
    cw_writeln!(w, "from .src.impl.{stem} import *");
    w.writeln("from .runtime.runtime import ServiceClient, reg_client, RPCOption");
    w.writeln("from .runtime.runtime.concurrency.local_trace import TraceContext");
    w.blank_line();
    w.blank_line();

    w.colon_block(&format!("class {class}(ServiceClient)"), |w| {
        cw_writeln!(w, "from_project = \"{}\"", builder.options.from_project);
        cw_writeln!(w, "rpc_name = \"{class}\"");

        for entry in &meta.entries {
            let arg = TypePath::new(&meta.name, &entry.name, Container::Arg).class_name();
            let result = TypePath::new(&meta.name, &entry.name, Container::Result).class_name();

            w.blank_line();
            w.colon_block(
                &format!(
                    "def {}(self, arg: {arg}, option: typing.Union[RPCOption, None] = None) -> {result}",
                    entry.name
                ),
                |w| {
                    cw_writeln!(w, "context = self.get_context(\"{}\")", entry.name);
                    w.colon_block("with TraceContext(context)", |w| {
                        w.writeln("return_result = context.call(arg, option=option)");
                        cw_writeln!(w, "result = {result}()");
                        w.writeln("result.from_pb2(return_result)");
                        w.writeln("return result");
                    });
                },
            );
        }
    });

    w.blank_line();
    w.blank_line();
    cw_writeln!(w, "reg_client({class}.rpc_name, {class}Stub)");

    w.finish()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_meta, options};

    #[test]
    fn client_stub_calls_through_context() {
        let meta = demo_meta();
        let opts = options();
        let text = generate(&ServiceBuilder::new(&meta, &opts));

        assert!(text.contains("from .src.encode.demo_pb2_grpc import DemoStub\n"));
        assert!(text.contains("from .src.impl.demo import *\n"));

        let expected = "\
class Demo(ServiceClient):
    from_project = \"shop\"
    rpc_name = \"Demo\"

    def hello(self, arg: HelloArg, option: typing.Union[RPCOption, None] = None) -> HelloResult:
        context = self.get_context(\"hello\")
        with TraceContext(context):
            return_result = context.call(arg, option=option)
            result = HelloResult()
            result.from_pb2(return_result)
            return result


reg_client(Demo.rpc_name, DemoStub)
";
        assert!(text.ends_with(expected), "unexpected stub:\n{text}");
    }
}
