//! Python sources for the RPC server and client.
//!
//! Both sides share the data-class module written to `impl/<stem>.py`;
//! they differ in where the runtime package sits relative to it.

pub mod classes;
pub mod client;
pub mod server;

use crate::{
    ServiceBuilder, cw_writeln,
    python::classes::{ClassMode, emit_entries},
    writer::CodeWriter,
};

///
/// Side
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Server,
    Client,
}

impl Side {
    /// Relative import prefix of the runtime package from `impl/`.
    const fn runtime_prefix(self) -> &'static str {
        match self {
            Self::Server => "..",
            Self::Client => "...",
        }
    }
}

/// Data-class module text for one service.
#[must_use]
pub fn impl_module(builder: &ServiceBuilder, side: Side) -> String {
    let mut w = CodeWriter::new();

    w.writeln("# coding: utf-8");
    w.blank_line();
    w.writeln("import typing");
    cw_writeln!(w, "from ..encode import {}_pb2 as pb2", builder.stem());
    cw_writeln!(w, "from {}runtime.runtime.common import RPCDict", side.runtime_prefix());
    w.blank_line();
    w.blank_line();

    emit_entries(&mut w, builder.meta, ClassMode::Wire);

    w.finish()
}

/// Definitions-only module used next to web resources.
#[must_use]
pub fn definitions_module(builder: &ServiceBuilder) -> String {
    let mut w = CodeWriter::new();

    w.writeln("import typing");
    cw_writeln!(w, "from {}.runtime.common import RPCDict", builder.options.runtime_path);
    w.blank_line();
    w.blank_line();

    emit_entries(&mut w, builder.meta, ClassMode::Definitions);

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
    fn impl_headers_differ_by_side() {
        let meta = demo_meta();
        let opts = options();
        let builder = ServiceBuilder::new(&meta, &opts);

        let server = impl_module(&builder, Side::Server);
        assert!(server.starts_with(
            "# coding: utf-8\n\nimport typing\nfrom ..encode import demo_pb2 as pb2\nfrom ..runtime.runtime.common import RPCDict\n\n\nclass "
        ));

        let client = impl_module(&builder, Side::Client);
        assert!(client.contains("from ...runtime.runtime.common import RPCDict\n"));
    }

    #[test]
    fn definitions_import_the_configured_runtime() {
        let meta = demo_meta();
        let mut opts = options();
        opts.runtime_path = "app.runtime".into();

        let text = definitions_module(&ServiceBuilder::new(&meta, &opts));
        assert!(text.starts_with(
            "import typing\nfrom app.runtime.runtime.common import RPCDict\n"
        ));
        assert!(!text.contains("pb2"));
    }
}
