//! Servicer registration file and server launcher.
//!
//! `rpc/__init__.py` is shared by every project generated into the same
//! server. Each project owns one `# project:` block; regeneration replaces
//! only that block and keeps the others in order.

use crate::{ServiceBuilder, cw_writeln, writer::CodeWriter};
use regex::Regex;
use std::sync::LazyLock;

static PROJECT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"# project: (?P<name>[^\n]+)(?P<body>[\s\S]+?)# end project")
        .expect("project block pattern is valid")
});

const HEADER: &str = "\
# coding: utf8
# DONT TOUCH THIS FILE!

from .runtime.runtime import reg_servicer
";

/// Registration lines for the services of one project.
#[must_use]
pub fn project_body(builders: &[ServiceBuilder]) -> String {
    let mut w = CodeWriter::new();

    for b in builders {
        let stem = b.stem();
        cw_writeln!(
            w,
            "from .{stem} import {}Servicer, pb2_grpc as {stem}_pb2_grpc",
            b.class_name()
        );
    }
    w.blank_line();
    for b in builders {
        let class = b.class_name();
        cw_writeln!(
            w,
            "reg_servicer({class}Servicer, {}_pb2_grpc.add_{class}Servicer_to_server)",
            b.stem()
        );
    }

    w.finish()
}

/// Existing `(project, body)` blocks of a registration file, in order.
#[must_use]
pub fn project_blocks(existing: &str) -> Vec<(String, String)> {
    PROJECT_BLOCK
        .captures_iter(existing)
        .map(|caps| {
            (
                caps["name"].trim().to_string(),
                caps["body"].trim().to_string(),
            )
        })
        .collect()
}

/// Registration file text with `project`'s block replaced or appended.
#[must_use]
pub fn registration(existing: &str, project: &str, body: &str) -> String {
    let mut out = String::from(HEADER);
    let mut replaced = false;

    for (name, old_body) in project_blocks(existing) {
        if name == project {
            replaced = true;
            push_block(&mut out, &name, body);
        } else {
            push_block(&mut out, &name, &old_body);
        }
    }
    if !replaced {
        push_block(&mut out, project, body);
    }

    out
}

fn push_block(out: &mut String, name: &str, body: &str) {
    out.push('\n');
    out.push_str(&format!("# project: {name}\n\n{}\n\n# end project\n", body.trim()));
}

/// `rpc_server.py`; a detached server first puts its packages on the path.
#[must_use]
pub fn launcher(package_dirs: Option<&[String]>) -> String {
    let mut w = CodeWriter::new();
    w.writeln("# coding: utf8");
    w.blank_line();

    if let Some(dirs) = package_dirs {
        w.writeln("import sys");
        for dir in dirs {
            cw_writeln!(w, "sys.path.append('./{dir}')");
        }
        w.blank_line();
        w.blank_line();
    }

    w.writeln("from rpc.runtime.runtime import server");
    w.blank_line();
    w.blank_line();
    w.colon_block("if __name__ == '__main__'", |w| w.writeln("server.loop()"));

    w.finish()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_meta, options};
    use proptest::prelude::*;

    fn demo_body() -> String {
        let meta = demo_meta();
        let opts = options();
        project_body(&[ServiceBuilder::new(&meta, &opts)])
    }

    #[test]
    fn body_imports_then_registers() {
        assert_eq!(
            demo_body(),
            "from .demo import DemoServicer, pb2_grpc as demo_pb2_grpc\n\nreg_servicer(DemoServicer, demo_pb2_grpc.add_DemoServicer_to_server)\n"
        );
    }

    #[test]
    fn other_projects_are_preserved_in_order() {
        let first = registration("", "alpha", "from .a import A");
        let second = registration(&first, "shop", &demo_body());
        let third = registration(&second, "alpha", "from .a import B");

        let blocks = project_blocks(&third);
        let names: Vec<_> = blocks.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["alpha", "shop"]);
        assert_eq!(blocks[0].1, "from .a import B");
        assert!(blocks[1].1.starts_with("from .demo import DemoServicer"));
        assert!(third.starts_with(HEADER));
    }

    #[test]
    fn regeneration_is_idempotent() {
        let body = demo_body();
        let once = registration("", "shop", &body);
        let twice = registration(&once, "shop", &body);

        assert_eq!(once, twice);
        assert_eq!(
            once,
            format!("{HEADER}\n# project: shop\n\n{}\n\n# end project\n", body.trim())
        );
    }

    proptest! {
        #[test]
        fn any_project_name_round_trips(name in "[a-z][a-z0-9_-]{0,12}") {
            let text = registration("", &name, "from .x import X");
            let blocks = project_blocks(&text);

            prop_assert_eq!(blocks.len(), 1);
            prop_assert_eq!(&blocks[0].0, &name);
            prop_assert_eq!(registration(&text, &name, "from .x import X"), text);
        }
    }

    #[test]
    fn launcher_forms() {
        let plain = launcher(None);
        assert_eq!(
            plain,
            "# coding: utf8\n\nfrom rpc.runtime.runtime import server\n\n\nif __name__ == '__main__':\n    server.loop()\n"
        );

        let dirs = vec!["shop".to_string(), "tools".to_string()];
        let detached = launcher(Some(dirs.as_slice()));
        assert!(detached.starts_with(
            "# coding: utf8\n\nimport sys\nsys.path.append('./shop')\nsys.path.append('./tools')\n\n\nfrom rpc"
        ));
    }
}
