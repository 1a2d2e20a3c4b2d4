//! Everything after parsing: the LIR data structures and the code generator
//! which lowers the syntax tree into them.

pub mod codegen;
pub mod lir;
pub mod primitive;
