pub mod asm;
pub mod generator;
pub mod liveness;
pub mod regalloc;

use thiserror::Error;

use crate::backend::asm::AsmInstruction;
use crate::backend::generator::CodeGenerator;
use crate::backend::regalloc::RegAllocError;
use crate::ir::{Instruction, Variable};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error(transparent)]
    Registers(#[from] RegAllocError),

    #[error("CMOV at instruction {index} targets {dest}, which holds no value yet")]
    UndefinedConditionalTarget { index: usize, dest: Variable },

    #[error("{kind} at instruction {index} reached instruction selection")]
    UnexpectedInstruction { index: usize, kind: &'static str },

    #[error("program ends without a return")]
    MissingReturn,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Reject programs whose lowering never reaches a RET.
    pub require_return: bool,
}

pub fn generate(
    instructions: Vec<Instruction>,
    options: CodegenOptions,
) -> Result<Vec<AsmInstruction>, CodegenError> {
    CodeGenerator::load(instructions, options).run()
}

/// One instruction per line, no header.
pub fn emit(program: &[AsmInstruction]) -> String {
    let mut output = String::new();
    for instr in program {
        output.push_str(&instr.to_string());
        output.push('\n');
    }
    output
}
