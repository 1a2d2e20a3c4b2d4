use std::fmt::Write;

use colored::Colorize;
use itertools::Itertools;

use crate::{index::Index, middle::lir};

pub fn pretty_print_module(module: &lir::Module) {
    println!("{}", format!("; module {}", module.name).dimmed());
    print!("{}", render_module(module));
}

/// Renders the module without terminal colors, for files and comparisons
pub fn render_module_plain(module: &lir::Module) -> String {
    strip_ansi_escapes::strip_str(render_module(module))
}

pub fn render_module(module: &lir::Module) -> String {
    let mut output = String::new();

    for (index, function) in module.functions.iter().enumerate() {
        if index != 0 {
            output.push('\n');
        }

        // Writing into a String cannot fail
        let _ = render_function(&mut output, module, function);
    }

    output
}

fn render_function(
    output: &mut String,
    module: &lir::Module,
    function: &lir::FunctionDefinition,
) -> std::fmt::Result {
    write!(
        output,
        "{} {}{}",
        "fn".magenta(),
        function.name.blue(),
        "(".white()
    )?;

    write!(
        output,
        "{}",
        function
            .arguments
            .iter()
            .map(|arg| format!("{arg}: {}", function.registers[*arg].ty))
            .join(", ")
            .white()
    )?;

    writeln!(
        output,
        "{} {} {}",
        ")".white(),
        format!("-> {}", function.return_type).white(),
        "{".white()
    )?;

    for block in &function.blocks {
        writeln!(output, "{}", format!("{}:", block.id).bright_red())?;

        for instruction in &block.instructions {
            writeln!(output, "    {}", InModule::new(module, instruction))?;
        }
    }

    writeln!(output, "{}", "}".white())
}

/// Displays an instruction with call targets resolved to function names
struct InModule<'m> {
    module: &'m lir::Module,
    instruction: &'m lir::Instruction,
}

impl<'m> InModule<'m> {
    fn new(module: &'m lir::Module, instruction: &'m lir::Instruction) -> Self {
        Self {
            module,
            instruction,
        }
    }
}

impl core::fmt::Display for InModule<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.instruction {
            lir::Instruction::FunctionCall {
                target,
                arguments,
                destination,
            } => match self.module.functions.get(*target) {
                Some(callee) => write_call(f, callee.name.as_str(), arguments, *destination),
                None => write!(f, "{}", self.instruction),
            },
            instruction => write!(f, "{instruction}"),
        }
    }
}

fn write_call(
    f: &mut std::fmt::Formatter<'_>,
    target: &str,
    arguments: &[lir::Operand],
    destination: Option<lir::RegisterId>,
) -> std::fmt::Result {
    if let Some(dest) = destination {
        write!(f, "{dest} {} ", "=".white())?;
    }

    write!(
        f,
        "{} {}({})",
        "call".cyan(),
        target.blue(),
        arguments.iter().map(|op| op.to_string()).join(", ")
    )
}

impl core::fmt::Display for lir::Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            lir::Instruction::AllocStack { destination, ty } => {
                write!(f, "{destination} {} {} {ty}", "=".white(), "alloc".cyan())
            }
            lir::Instruction::LoadMem {
                destination,
                source,
            } => write!(
                f,
                "{destination} {} {} {source}",
                "=".white(),
                "load".cyan()
            ),
            lir::Instruction::StoreMem {
                destination,
                source,
            } => {
                write!(
                    f,
                    "{} {destination} {} {source}",
                    "store".cyan(),
                    "<-".white()
                )
            }
            lir::Instruction::BinaryOperation {
                operator,
                destination,
                lhs,
                rhs,
            } => {
                write!(
                    f,
                    "{destination} {} {} {lhs}, {rhs}",
                    "=".white(),
                    operator.to_string().cyan()
                )
            }
            lir::Instruction::FunctionCall {
                target,
                arguments,
                destination,
            } => write_call(f, &target.to_string(), arguments, *destination),
            lir::Instruction::Return { value: Some(value) } => {
                write!(f, "{} {value}", "ret".cyan())
            }
            lir::Instruction::Return { value: None } => {
                write!(f, "{}", "ret".cyan())
            }
        }
    }
}

impl core::fmt::Display for lir::FunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.index())
    }
}

impl core::fmt::Display for lir::RegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("%{}", self.index()).yellow())
    }
}

impl core::fmt::Display for lir::BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".label_{}", self.index())
    }
}

impl core::fmt::Display for lir::Immediate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            lir::Immediate::Int(value) => write!(f, "{value}"),
            lir::Immediate::Float(value) => write!(f, "{value:?}"),
        }
    }
}

impl core::fmt::Display for lir::Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            lir::Operand::Immediate(immediate) => write!(f, "{}", immediate.to_string().purple()),
            lir::Operand::Register(register_id) => write!(f, "{register_id}"),
        }
    }
}

impl core::fmt::Display for lir::Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            lir::Type::I64 => write!(f, "i64"),
            lir::Type::F64 => write!(f, "f64"),
            lir::Type::Void => write!(f, "void"),
            lir::Type::Pointer => write!(f, "ptr"),
        }
    }
}
