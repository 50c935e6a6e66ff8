pub mod parser;

use std::fmt;

/// A virtual value slot. Declared variables compare by name, compiler
/// temporaries by their numeric identity. `Scratch` values are minted by
/// the backend only and never appear in parsed IR.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Variable {
    Named(String),
    Temporary(u32),
    Scratch(u32),
}

impl Variable {
    pub fn named(name: impl Into<String>) -> Self {
        Variable::Named(name.into())
    }

    pub fn temp(id: u32) -> Self {
        Variable::Temporary(id)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Named(name) => write!(f, "{}", name),
            Variable::Temporary(id) => write!(f, "${}", id),
            Variable::Scratch(id) => write!(f, "%{}", id),
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Value {
    Var(Variable),
    Imm(i32),
}

impl Value {
    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            Value::Var(var) => Some(var),
            Value::Imm(_) => None,
        }
    }
}

impl From<Variable> for Value {
    fn from(var: Variable) -> Self {
        Value::Var(var)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Imm(val)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Var(var) => write!(f, "{}", var),
            Value::Imm(val) => write!(f, "{}", val),
        }
    }
}

/// Two-operand instruction kinds. For `CMov` the left operand is the
/// condition and the right operand the value moved when it is nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Gt,
    Lt,
    CMov,
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Gt => "GT",
            BinaryOp::Lt => "LT",
            BinaryOp::CMov => "CMOV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Mov {
        dest: Variable,
        src: Value,
    },
    Ret {
        value: Value,
    },
    Binary {
        op: BinaryOp,
        dest: Variable,
        lhs: Value,
        rhs: Value,
    },
}

impl Instruction {
    pub fn mov(dest: Variable, src: impl Into<Value>) -> Self {
        Instruction::Mov { dest, src: src.into() }
    }

    pub fn ret(value: impl Into<Value>) -> Self {
        Instruction::Ret { value: value.into() }
    }

    pub fn binary(
        op: BinaryOp,
        dest: Variable,
        lhs: impl Into<Value>,
        rhs: impl Into<Value>,
    ) -> Self {
        Instruction::Binary { op, dest, lhs: lhs.into(), rhs: rhs.into() }
    }

    pub fn add(dest: Variable, lhs: impl Into<Value>, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Add, dest, lhs, rhs)
    }

    pub fn sub(dest: Variable, lhs: impl Into<Value>, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Sub, dest, lhs, rhs)
    }

    pub fn mul(dest: Variable, lhs: impl Into<Value>, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Mul, dest, lhs, rhs)
    }

    pub fn gt(dest: Variable, lhs: impl Into<Value>, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Gt, dest, lhs, rhs)
    }

    pub fn lt(dest: Variable, lhs: impl Into<Value>, rhs: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::Lt, dest, lhs, rhs)
    }

    pub fn cmov(dest: Variable, cond: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self::binary(BinaryOp::CMov, dest, cond, value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Mov { .. } => "MOV",
            Instruction::Ret { .. } => "RET",
            Instruction::Binary { op, .. } => op.name(),
        }
    }

    pub fn destination(&self) -> Option<&Variable> {
        match self {
            Instruction::Mov { dest, .. } | Instruction::Binary { dest, .. } => Some(dest),
            Instruction::Ret { .. } => None,
        }
    }

    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Mov { src, .. } => vec![src],
            Instruction::Ret { value } => vec![value],
            Instruction::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }
}

/// Renders in the textual IR form accepted by [`parser::parse`].
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, ", self.name())?;
        if let Some(dest) = self.destination() {
            write!(f, "{}", dest)?;
        }
        for operand in self.operands() {
            write!(f, ", {}", operand)?;
        }
        write!(f, ")")
    }
}

/// Hands out scratch variables for a single lowering run.
#[derive(Debug, Clone, Default)]
pub struct Temporaries {
    next: u32,
}

impl Temporaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Variable {
        let var = Variable::Scratch(self.next);
        self.next = self.next.wrapping_add(1);
        var
    }
}
