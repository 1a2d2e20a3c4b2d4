//! LIR (Low-level Intermediate Representation). Each function is a list of
//! blocks holding flat instructions over typed virtual registers. Locals live
//! in stack slots which are read and written through explicit loads and
//! stores.

use hashbrown::HashMap;

use crate::index::{IndexVec, simple_index};

pub mod pretty_print;
pub mod verify;

/// The emission target for one compilation. Functions and instructions are
/// only ever appended.
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub functions: IndexVec<FunctionId, FunctionDefinition>,
    /// Name lookup for calls. Redeclaring a name points it at the newest
    /// definition; older definitions stay in `functions`.
    symbols: HashMap<String, FunctionId>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexVec::new(),
            symbols: HashMap::new(),
        }
    }

    /// Creates an empty function and registers it under its name. Each
    /// parameter gets an incoming argument register.
    pub fn declare_function(
        &mut self,
        name: &str,
        return_type: Type,
        parameter_types: &[Type],
    ) -> FunctionId {
        let id = self.functions.next_index();

        let mut registers = IndexVec::new();
        let arguments = parameter_types
            .iter()
            .map(|ty| registers.push(Register { ty: *ty }))
            .collect();

        self.functions.push(FunctionDefinition {
            id,
            name: name.to_owned(),
            return_type,
            arguments,
            registers,
            blocks: IndexVec::new(),
        });
        self.symbols.insert(name.to_owned(), id);

        id
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.symbols.get(name).copied()
    }

    pub fn function(&self, id: FunctionId) -> &FunctionDefinition {
        &self.functions[id]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionDefinition {
        &mut self.functions[id]
    }
}

#[derive(Debug)]
pub struct FunctionDefinition {
    pub id: FunctionId,
    pub name: String,
    pub return_type: Type,
    /// Registers holding the incoming parameter values
    pub arguments: Vec<RegisterId>,
    /// Allocated virtual registers used to store temporary data
    pub registers: IndexVec<RegisterId, Register>,
    pub blocks: IndexVec<BlockId, Block>,
}

impl FunctionDefinition {
    pub fn create_register(&mut self, ty: Type) -> RegisterId {
        self.registers.push(Register { ty })
    }

    pub fn create_block(&mut self) -> BlockId {
        let id = self.blocks.next_index();
        self.blocks.push(Block {
            id,
            instructions: Vec::new(),
        })
    }

    pub fn type_of(&self, operand: Operand) -> Type {
        match operand {
            Operand::Immediate(Immediate::Int(_)) => Type::I64,
            Operand::Immediate(Immediate::Float(_)) => Type::F64,
            Operand::Register(id) => self.registers[id].ty,
        }
    }
}

#[derive(Debug)]
pub struct Block {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
}

simple_index! {
    /// Identifies a function within a module
    pub struct FunctionId;
}

simple_index! {
    /// Identifies an LIR block within a function
    pub struct BlockId;
}

/// A temporary virtual register of some type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    pub ty: Type,
}

simple_index! {
    /// Identifies a virtual LIR register which holds a temporary value
    pub struct RegisterId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    I64,
    F64,
    /// Type of functions without a result and of slots declared with an
    /// unknown type name
    Void,
    /// Address of a stack slot
    Pointer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Reserves a stack slot for a value of `ty`, `destination` holds its
    /// address
    AllocStack {
        destination: RegisterId,
        ty: Type,
    },
    LoadMem {
        destination: RegisterId,
        source: RegisterId,
    },
    StoreMem {
        destination: RegisterId,
        source: Operand,
    },
    BinaryOperation {
        operator: ArithmeticOperator,
        destination: RegisterId,
        lhs: Operand,
        rhs: Operand,
    },
    FunctionCall {
        target: FunctionId,
        arguments: Vec<Operand>,
        destination: Option<RegisterId>,
    },
    Return {
        value: Option<Operand>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArithmeticOperator {
    Add,
    #[strum(serialize = "sub")]
    Subtract,
    #[strum(serialize = "mul")]
    Multiply,
    #[strum(serialize = "sdiv")]
    SignedDivide,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Immediate(Immediate),
    Register(RegisterId),
}
