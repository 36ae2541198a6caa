//! Line writer with indentation tracking for generated sources.

use std::{cell::Cell, rc::Rc};

/// Indent unit of every generated file.
pub const INDENT: &str = "    ";

///
/// CodeWriter
///
/// Writes into an owned buffer. Indentation is held behind an `Rc<Cell<_>>`
/// so an [`IndentGuard`] can live alongside further writes.
///

#[derive(Debug)]
pub struct CodeWriter {
    out: String,
    indent_level: Rc<Cell<usize>>,
    at_line_start: bool,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent_level: Rc::new(Cell::new(0)),
            at_line_start: true,
        }
    }

    /// Write text without a newline, indenting at line start.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start && !text.trim().is_empty() {
            for _ in 0..self.indent_level.get() {
                self.out.push_str(INDENT);
            }
            self.at_line_start = false;
        }

        self.out.push_str(text);
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.out.push('\n');
        self.at_line_start = true;
    }

    pub fn blank_line(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Write each line of a multi-line text at the current indentation.
    pub fn lines(&mut self, text: &str) {
        for line in text.lines() {
            self.writeln(line.trim_end());
        }
    }

    /// Indentation increases while the guard is alive.
    #[must_use]
    pub fn indent(&self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);

        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// `header {` ... `}`
    pub fn brace_block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.writeln(&format!("{header} {{"));
        {
            let _indent = self.indent();
            body(self);
        }
        self.writeln("}");
    }

    /// `header:` followed by an indented body.
    pub fn colon_block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.writeln(&format!("{header}:"));
        let _indent = self.indent();
        body(self);
    }

    /// Run `body` one level deeper.
    pub fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        let _indent = self.indent();
        body(self);
    }

    #[must_use]
    pub fn indent_level(&self) -> usize {
        self.indent_level.get()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    #[doc(hidden)]
    pub fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        self.write(&args.to_string());
    }

    #[doc(hidden)]
    pub fn writeln_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        self.writeln(&args.to_string());
    }
}

///
/// IndentGuard
///

#[derive(Debug)]
pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        self.indent_level
            .set(self.indent_level.get().saturating_sub(1));
    }
}

/// Formatted `write` on a [`CodeWriter`].
#[macro_export]
macro_rules! cw_write {
    ($writer:expr, $($arg:tt)*) => {
        $writer.write_fmt(format_args!($($arg)*))
    };
}

/// Formatted `writeln` on a [`CodeWriter`].
#[macro_export]
macro_rules! cw_writeln {
    ($writer:expr, $($arg:tt)*) => {
        $writer.writeln_fmt(format_args!($($arg)*))
    };
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_blocks_nest() {
        let mut w = CodeWriter::new();
        w.colon_block("class A(object)", |w| {
            w.colon_block("def f(self)", |w| w.writeln("return 1"));
            w.blank_line();
            w.writeln("x = 2");
        });
        w.writeln("done");

        assert_eq!(
            w.finish(),
            "class A(object):\n    def f(self):\n        return 1\n\n    x = 2\ndone\n"
        );
    }

    #[test]
    fn brace_blocks_and_macros() {
        let mut w = CodeWriter::new();
        w.brace_block("message A", |w| {
            cw_writeln!(w, "string {} = {};", "name", 1);
        });

        assert_eq!(w.finish(), "message A {\n    string name = 1;\n}\n");
    }

    #[test]
    fn guards_restore_level() {
        let mut w = CodeWriter::new();
        {
            let _a = w.indent();
            let _b = w.indent();
            assert_eq!(w.indent_level(), 2);
        }
        assert_eq!(w.indent_level(), 0);

        w.lines("a\n  b  \n");
        assert_eq!(w.as_str(), "a\n  b\n");
    }
}
