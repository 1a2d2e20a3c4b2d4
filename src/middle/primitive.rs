use strum::EnumString;

use crate::middle::lir;

/// Type names understood by the code generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
    Int,
    Double,
}

impl PrimitiveKind {
    pub fn lir_type(self) -> lir::Type {
        match self {
            PrimitiveKind::Int => lir::Type::I64,
            PrimitiveKind::Double => lir::Type::F64,
        }
    }
}

/// Maps a declared type name to its LIR type. Names that are not primitives
/// lower to `void` instead of failing.
pub fn lower_type_name(name: &str) -> lir::Type {
    name.parse::<PrimitiveKind>()
        .map_or(lir::Type::Void, PrimitiveKind::lir_type)
}
