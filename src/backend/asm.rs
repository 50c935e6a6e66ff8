use std::fmt;

/// A RISC-V integer register, rendered as `x<N>`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reg(pub u8);

impl Reg {
    pub const ZERO: Reg = Reg(0);
    /// `a0`, holds the program's return value.
    pub const RETURN: Reg = Reg(10);
}

/// General-purpose pool for virtual values, in allocation order (t0-t6).
pub const TEMPORARIES: [Reg; 7] = [Reg(5), Reg(6), Reg(7), Reg(28), Reg(29), Reg(30), Reg(31)];

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmInstruction {
    Li { rd: Reg, imm: i32 },
    Addi { rd: Reg, rs: Reg, imm: i32 },
    Add { rd: Reg, rs1: Reg, rs2: Reg },
    Sub { rd: Reg, rs1: Reg, rs2: Reg },
    Slt { rd: Reg, rs1: Reg, rs2: Reg },
    Mul { rd: Reg, rs1: Reg, rs2: Reg },
    Beq { rs1: Reg, rs2: Reg, target: String },
    Label(String),
}

impl AsmInstruction {
    /// Register copy, encoded as `addi rd rs 0`.
    pub fn copy(rd: Reg, rs: Reg) -> Self {
        AsmInstruction::Addi { rd, rs, imm: 0 }
    }

    pub fn mnemonic(&self) -> String {
        match self {
            AsmInstruction::Li { .. } => "li".to_string(),
            AsmInstruction::Addi { .. } => "addi".to_string(),
            AsmInstruction::Add { .. } => "add".to_string(),
            AsmInstruction::Sub { .. } => "sub".to_string(),
            AsmInstruction::Slt { .. } => "slt".to_string(),
            AsmInstruction::Mul { .. } => "mul".to_string(),
            AsmInstruction::Beq { .. } => "beq".to_string(),
            AsmInstruction::Label(name) => format!("{}:", name),
        }
    }

    pub fn operands(&self) -> Vec<String> {
        match self {
            AsmInstruction::Li { rd, imm } => vec![rd.to_string(), imm.to_string()],
            AsmInstruction::Addi { rd, rs, imm } => {
                vec![rd.to_string(), rs.to_string(), imm.to_string()]
            }
            AsmInstruction::Add { rd, rs1, rs2 }
            | AsmInstruction::Sub { rd, rs1, rs2 }
            | AsmInstruction::Slt { rd, rs1, rs2 }
            | AsmInstruction::Mul { rd, rs1, rs2 } => {
                vec![rd.to_string(), rs1.to_string(), rs2.to_string()]
            }
            AsmInstruction::Beq { rs1, rs2, target } => {
                vec![rs1.to_string(), rs2.to_string(), target.clone()]
            }
            AsmInstruction::Label(_) => vec![],
        }
    }
}

/// Mnemonic followed by its operands, separated by single spaces.
impl fmt::Display for AsmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())?;
        for operand in self.operands() {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
