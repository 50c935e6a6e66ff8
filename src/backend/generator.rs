use log::{debug, warn};

use crate::backend::asm::{AsmInstruction, Reg};
use crate::backend::liveness::LiveRanges;
use crate::backend::regalloc::RegisterFile;
use crate::backend::{CodegenError, CodegenOptions};
use crate::ir::{BinaryOp, Instruction, Temporaries, Value, Variable};

/// Single forward pass from IR to target instructions, allocating registers
/// as it goes.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    instructions: Vec<Instruction>,
    live: LiveRanges,
    options: CodegenOptions,
}

impl CodeGenerator {
    pub fn load(mut instructions: Vec<Instruction>, options: CodegenOptions) -> Self {
        canonicalize_comparisons(&mut instructions);
        let live = LiveRanges::compute(&instructions);
        debug!(
            "loaded {} instructions, {} variables with live ranges",
            instructions.len(),
            live.len()
        );

        Self { instructions, live, options }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn run(&self) -> Result<Vec<AsmInstruction>, CodegenError> {
        self.run_with(RegisterFile::new())
    }

    /// Lower using the given register pool. Any bindings it still carries are
    /// dropped first.
    pub fn run_with(&self, mut regs: RegisterFile) -> Result<Vec<AsmInstruction>, CodegenError> {
        regs.reset();
        let mut lowering = Lowering {
            regs,
            temps: Temporaries::new(),
            output: Vec::new(),
        };

        for (index, instr) in self.instructions.iter().enumerate() {
            debug!("[{}] {}", index, instr);
            if let Flow::Return = lowering.lower(index, instr)? {
                return Ok(lowering.output);
            }

            for var in self.live.expiring_at(index) {
                lowering.regs.release(var)?;
            }
        }

        if self.options.require_return {
            return Err(CodegenError::MissingReturn);
        }
        warn!("program has no return; x10 is never written");
        Ok(lowering.output)
    }
}

/// `GT a, b` becomes `LT b, a`; the target only has set-less-than.
fn canonicalize_comparisons(instructions: &mut [Instruction]) {
    for instr in instructions.iter_mut() {
        if let Instruction::Binary { op, lhs, rhs, .. } = instr {
            if *op == BinaryOp::Gt {
                *op = BinaryOp::Lt;
                std::mem::swap(lhs, rhs);
            }
        }
    }
}

enum Flow {
    Continue,
    Return,
}

/// Per-run mutable state.
struct Lowering {
    regs: RegisterFile,
    temps: Temporaries,
    output: Vec<AsmInstruction>,
}

impl Lowering {
    fn emit(&mut self, instr: AsmInstruction) {
        self.output.push(instr);
    }

    fn lower(&mut self, index: usize, instr: &Instruction) -> Result<Flow, CodegenError> {
        match instr {
            Instruction::Mov { dest, src } => {
                let rd = self.regs.acquire(dest)?;
                match src {
                    Value::Imm(imm) => self.emit(AsmInstruction::Li { rd, imm: *imm }),
                    Value::Var(var) => {
                        let rs = self.regs.acquire(var)?;
                        self.emit(AsmInstruction::copy(rd, rs));
                    }
                }
            }

            Instruction::Ret { value } => {
                match value {
                    Value::Imm(imm) => self.emit(AsmInstruction::Li { rd: Reg::RETURN, imm: *imm }),
                    Value::Var(var) => {
                        let rs = self.regs.acquire(var)?;
                        self.emit(AsmInstruction::copy(Reg::RETURN, rs));
                    }
                }
                return Ok(Flow::Return);
            }

            // Addition commutes, so the immediate always goes last.
            Instruction::Binary { op: BinaryOp::Add, dest, lhs: Value::Var(var), rhs: Value::Imm(imm) }
            | Instruction::Binary { op: BinaryOp::Add, dest, lhs: Value::Imm(imm), rhs: Value::Var(var) } => {
                let rd = self.regs.acquire(dest)?;
                let rs = self.regs.acquire(var)?;
                self.emit(AsmInstruction::Addi { rd, rs, imm: *imm });
            }

            Instruction::Binary { op, dest, lhs, rhs } => {
                self.lower_binary(index, *op, dest, lhs, rhs)?;
            }
        }

        Ok(Flow::Continue)
    }

    fn lower_binary(
        &mut self,
        index: usize,
        op: BinaryOp,
        dest: &Variable,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<(), CodegenError> {
        // The ternary's else value must already sit in the result register.
        if op == BinaryOp::CMov && self.regs.lookup(dest).is_none() {
            return Err(CodegenError::UndefinedConditionalTarget { index, dest: dest.clone() });
        }

        let rd = self.regs.acquire(dest)?;

        if let (Value::Imm(a), Value::Imm(b)) = (lhs, rhs) {
            let folded = match op {
                BinaryOp::Add => Some(a.wrapping_add(*b)),
                BinaryOp::Sub => Some(a.wrapping_sub(*b)),
                BinaryOp::Mul => Some(a.wrapping_mul(*b)),
                BinaryOp::Lt => Some(i32::from(a < b)),
                BinaryOp::CMov => (*a != 0).then_some(*b),
                BinaryOp::Gt => return Err(CodegenError::UnexpectedInstruction { index, kind: op.name() }),
            };
            debug!("folded {} {} {} -> {:?}", op.name(), a, b, folded);
            if let Some(imm) = folded {
                self.emit(AsmInstruction::Li { rd, imm });
            }
            return Ok(());
        }

        let mut scratch = Vec::new();
        let rs1 = self.operand(lhs, &mut scratch)?;
        let rs2 = self.operand(rhs, &mut scratch)?;

        match op {
            BinaryOp::Add => self.emit(AsmInstruction::Add { rd, rs1, rs2 }),
            BinaryOp::Sub => self.emit(AsmInstruction::Sub { rd, rs1, rs2 }),
            BinaryOp::Lt => self.emit(AsmInstruction::Slt { rd, rs1, rs2 }),
            BinaryOp::Mul => self.emit(AsmInstruction::Mul { rd, rs1, rs2 }),
            BinaryOp::CMov => {
                let label = format!("L{}", index);
                self.emit(AsmInstruction::Beq { rs1, rs2: Reg::ZERO, target: label.clone() });
                self.emit(AsmInstruction::copy(rd, rs2));
                self.emit(AsmInstruction::Label(label));
            }
            BinaryOp::Gt => return Err(CodegenError::UnexpectedInstruction { index, kind: op.name() }),
        }

        for tmp in &scratch {
            self.regs.release(tmp)?;
        }
        Ok(())
    }

    /// Register holding `value`. Immediates are loaded into a fresh scratch variable
    /// which is pushed onto `scratch` for release after the instruction.
    fn operand(&mut self, value: &Value, scratch: &mut Vec<Variable>) -> Result<Reg, CodegenError> {
        match value {
            Value::Var(var) => Ok(self.regs.acquire(var)?),
            Value::Imm(imm) => {
                let tmp = self.temps.fresh();
                let reg = self.regs.acquire(&tmp)?;
                self.emit(AsmInstruction::Li { rd: reg, imm: *imm });
                scratch.push(tmp);
                Ok(reg)
            }
        }
    }
}
