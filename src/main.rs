use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{CommandFactory, Parser as ClapParser, error::ErrorKind};
use colored::Colorize;

use crate::{
    diagnostics::{ast_log, report_error},
    frontend::{SourceFile, SourceFileOrigin, parser::ParseError, parser::Parser},
    middle::{
        codegen::{TranslationError, generate_code},
        lir::{
            self,
            pretty_print::{pretty_print_module, render_module_plain},
            verify::{VerificationError, verify_module},
        },
    },
};

mod diagnostics;
mod frontend;
mod index;
mod middle;

#[derive(Debug, ClapParser)]
#[command(version, about, long_about = None)]
pub struct Args {
    source_files: Vec<PathBuf>,
    /// Also write the generated LIR as plain text to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Skip the structural checks on the generated module
    #[arg(long)]
    no_verify: bool,
    /// Do not print the generated LIR
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug)]
enum CompileError {
    Parse(ParseError),
    Translation(TranslationError),
    Verification(Vec<VerificationError>),
}

fn read_source_file(path: &Path) -> std::io::Result<SourceFile> {
    Ok(SourceFile {
        contents: std::fs::read_to_string(path)?,
        origin: SourceFileOrigin::File(path.to_owned()),
    })
}

/// Parses and lowers one source file into a module
fn compile(source_file: &SourceFile, verify: bool) -> Result<lir::Module, CompileError> {
    let program = Parser::parse_program(source_file).map_err(CompileError::Parse)?;

    ast_log!(program);

    let module = generate_code(&program).map_err(CompileError::Translation)?;

    if verify {
        verify_module(&module).map_err(CompileError::Verification)?;
    }

    Ok(module)
}

fn report_compile_error(source_file: &SourceFile, error: &CompileError) {
    match error {
        CompileError::Parse(error) => report_error!(source_file, Some(error.span), error),
        CompileError::Translation(error) => report_error!(source_file, Some(error.span), error),
        CompileError::Verification(errors) => {
            for error in errors {
                report_error!(source_file, None, error);
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.source_files.is_empty() {
        Args::command()
            .error(ErrorKind::MissingRequiredArgument, "Missing source files!")
            .exit();
    }

    for source_file in &args.source_files {
        if !source_file.exists() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Source file '{}' does not exist!", source_file.display()),
                )
                .exit()
        }

        if !source_file.is_file() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Input path '{}' is not a file!", source_file.display()),
                )
                .exit()
        }
    }

    let mut plain_output = String::new();

    for path in &args.source_files {
        let source_file = match read_source_file(path) {
            Ok(source_file) => source_file,
            Err(error) => Args::command()
                .error(
                    ErrorKind::Io,
                    format!("Failed to read '{}': {error}", path.display()),
                )
                .exit(),
        };

        let module = match compile(&source_file, !args.no_verify) {
            Ok(module) => module,
            Err(error) => {
                report_compile_error(&source_file, &error);
                return ExitCode::FAILURE;
            }
        };

        if !args.quiet {
            pretty_print_module(&module);
        }

        plain_output.push_str(&render_module_plain(&module));
    }

    if let Some(output) = &args.output {
        if let Err(error) = std::fs::write(output, plain_output) {
            eprintln!(
                "{}: failed to write '{}': {error}",
                "error".red(),
                output.display()
            );
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn compile_text(text: &str) -> Result<lir::Module, CompileError> {
        compile(&SourceFile::from_memory(text), true)
    }

    #[test]
    fn compiles_a_source_file_from_disk() {
        let temp = mktemp::Temp::new_file().unwrap();
        std::fs::write(
            temp.as_path(),
            indoc! {"
                int add(int a, int b) {
                    a + b
                }

                int x = add(1, 2)
                x = x * 2
            "},
        )
        .unwrap();

        let source_file = read_source_file(temp.as_path()).unwrap();
        let module = compile(&source_file, true).unwrap();

        assert_eq!(
            render_module_plain(&module),
            indoc! {"
                fn main() -> void {
                .label_0:
                    %0 = alloc i64
                    %1 = call add(1, 2)
                    store %0 <- %1
                    %2 = load %0
                    %3 = mul %2, 2
                    store %0 <- %3
                    ret
                }

                fn add(%0: i64, %1: i64) -> i64 {
                .label_0:
                    %2 = alloc i64
                    %3 = alloc i64
                    %4 = load %2
                    %5 = load %3
                    %6 = add %4, %5
                    ret
                }
            "}
        );
    }

    #[test]
    fn stops_at_parse_errors() {
        let error = compile_text("int x = ").unwrap_err();

        assert!(matches!(error, CompileError::Parse(_)));
    }

    #[test]
    fn stops_at_translation_errors() {
        let error = compile_text("int x = y").unwrap_err();

        let CompileError::Translation(error) = error else {
            panic!("expected a translation error but got {error:?}");
        };
        assert_eq!(error.to_string(), "undeclared variable `y`");
    }

    #[test]
    fn verification_catches_call_arity_mismatches() {
        let error = compile_text("int one(int a) { a } one()").unwrap_err();

        let CompileError::Verification(errors) = error else {
            panic!("expected verification errors but got {error:?}");
        };
        assert_eq!(errors.len(), 1);

        assert!(compile(&SourceFile::from_memory("int one(int a) { a } one()"), false).is_ok());
    }
}
