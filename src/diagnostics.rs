//! Error reporting and feature gated development logging

use colored::Colorize;

use crate::frontend::{SourceFile, lexer::Span};

/// Name of the enclosing function, for error backtraces
#[allow(unused_macros)]
macro_rules! function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        type_name_of(f)
            .rsplit("::")
            .find(|&part| part != "f" && part != "{{closure}}")
            .unwrap_or("<unknown>")
    }};
}

/// Reports an error against a source file. With the `error-backtrace`
/// feature the report names the compiler function which raised it.
macro_rules! report_error {
    ($source:expr, $span:expr, $message:expr $(,)?) => {{
        let message = format!("{}", $message);

        #[cfg(feature = "error-backtrace")]
        let message = format!(
            "{}\n{}: {}",
            message,
            colored::Colorize::blue("backtrace"),
            colored::Colorize::white(
                format!(
                    "{}::{} (at {}:{}:{})",
                    module_path!(),
                    $crate::diagnostics::function!(),
                    file!(),
                    line!(),
                    column!()
                )
                .as_str()
            ),
        );

        $crate::diagnostics::emit_error($source, $span, &message)
    }};
}

#[cfg(feature = "show_codegen")]
macro_rules! codegen_log {
    ($($arg:tt)*) => {
        eprintln!("{} {}", colored::Colorize::dimmed("codegen:"), format!($($arg)*))
    };
}

#[cfg(not(feature = "show_codegen"))]
macro_rules! codegen_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

#[cfg(feature = "show_ast")]
macro_rules! ast_log {
    ($ast:expr) => {
        eprintln!("{:#?}", $ast)
    };
}

#[cfg(not(feature = "show_ast"))]
macro_rules! ast_log {
    ($ast:expr) => {
        // Nothing
    };
}

#[allow(unused_imports)]
pub(crate) use ast_log;
pub(crate) use codegen_log;
#[allow(unused_imports)]
pub(crate) use function;
pub(crate) use report_error;

pub fn emit_error(source: &SourceFile, span: Option<Span>, message: &str) {
    match span {
        Some(span) => {
            eprintln!(
                "{}: {} {}",
                "error".red(),
                message,
                format!("(at {})", source.format_span_position(span)).white()
            );
            source.highlight_span(span);
        }
        None => {
            eprintln!(
                "{}: {} {}",
                "error".red(),
                message,
                format!("(in {})", source.origin).white()
            );
        }
    }
}
