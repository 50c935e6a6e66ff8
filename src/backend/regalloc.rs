use std::collections::HashMap;

use log::trace;
use thiserror::Error;

use crate::backend::asm::{Reg, TEMPORARIES};
use crate::ir::Variable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegAllocError {
    #[error("No available register for {0}")]
    OutOfRegisters(Variable),

    #[error("Released {0} while it holds no register")]
    NotBound(Variable),

    #[error("Register {0} is reserved and cannot join the allocation pool")]
    ReservedRegister(Reg),
}

/// Bidirectional binding between live virtual values and a fixed pool of
/// physical registers. There is no spilling: a full pool is an error.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    /// Pool in allocation order, with the variable currently held by each slot.
    slots: Vec<(Reg, Option<Variable>)>,
    /// Slot index per bound variable.
    bindings: HashMap<Variable, usize>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::from_pool(TEMPORARIES.to_vec())
    }

    /// Use a custom pool. The return and zero registers may not be part of it.
    pub fn with_registers(regs: Vec<Reg>) -> Result<Self, RegAllocError> {
        if let Some(&reg) = regs.iter().find(|&&r| r == Reg::RETURN || r == Reg::ZERO) {
            return Err(RegAllocError::ReservedRegister(reg));
        }
        Ok(Self::from_pool(regs))
    }

    fn from_pool(regs: Vec<Reg>) -> Self {
        Self {
            slots: regs.into_iter().map(|reg| (reg, None)).collect(),
            bindings: HashMap::new(),
        }
    }

    /// Register bound to `var`, binding the first free slot if it has none yet.
    pub fn acquire(&mut self, var: &Variable) -> Result<Reg, RegAllocError> {
        if let Some(&slot) = self.bindings.get(var) {
            return Ok(self.slots[slot].0);
        }

        let slot = self
            .slots
            .iter()
            .position(|(_, holder)| holder.is_none())
            .ok_or_else(|| RegAllocError::OutOfRegisters(var.clone()))?;

        let reg = self.slots[slot].0;
        self.slots[slot].1 = Some(var.clone());
        self.bindings.insert(var.clone(), slot);
        trace!("bind {} -> {}", var, reg);
        Ok(reg)
    }

    pub fn release(&mut self, var: &Variable) -> Result<(), RegAllocError> {
        let slot = self
            .bindings
            .remove(var)
            .ok_or_else(|| RegAllocError::NotBound(var.clone()))?;
        trace!("unbind {} <- {}", var, self.slots[slot].0);
        self.slots[slot].1 = None;
        Ok(())
    }

    pub fn lookup(&self, var: &Variable) -> Option<Reg> {
        self.bindings.get(var).map(|&slot| self.slots[slot].0)
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every binding, keeping the pool.
    pub fn reset(&mut self) {
        for (_, holder) in &mut self.slots {
            *holder = None;
        }
        self.bindings.clear();
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_acquire_in_pool_order() {
        let mut regs = RegisterFile::new();
        let a = Variable::named("a");
        let b = Variable::temp(0);

        assert_eq!(regs.acquire(&a).unwrap(), Reg(5));
        assert_eq!(regs.acquire(&b).unwrap(), Reg(6));
        assert_eq!(regs.lookup(&b), Some(Reg(6)));
    }

    #[test]
    fn test_acquire_is_idempotent() {
        let mut regs = RegisterFile::new();
        let a = Variable::named("a");

        let first = regs.acquire(&a).unwrap();
        assert_eq!(regs.acquire(&a).unwrap(), first);
        assert_eq!(regs.bound_count(), 1);
    }

    #[test]
    fn test_released_register_is_reused_first() {
        let mut regs = RegisterFile::new();
        let vars: Vec<Variable> = (0..3).map(Variable::temp).collect();
        for var in &vars {
            regs.acquire(var).unwrap();
        }

        regs.release(&vars[0]).unwrap();
        assert_eq!(regs.lookup(&vars[0]), None);
        assert_eq!(regs.acquire(&Variable::temp(9)).unwrap(), Reg(5));
    }

    #[test]
    fn test_exhaustion() {
        let mut regs = RegisterFile::new();
        for i in 0..7 {
            assert!(regs.acquire(&Variable::temp(i)).is_ok());
        }
        assert_eq!(regs.bound_count(), regs.capacity());

        let overflow = Variable::temp(7);
        assert_eq!(
            regs.acquire(&overflow),
            Err(RegAllocError::OutOfRegisters(overflow.clone()))
        );
        // A variable already bound still resolves on a full pool.
        assert_eq!(regs.acquire(&Variable::temp(6)).unwrap(), Reg(31));
    }

    #[test]
    fn test_release_unbound() {
        let mut regs = RegisterFile::new();
        let a = Variable::named("a");
        assert_eq!(regs.release(&a), Err(RegAllocError::NotBound(a.clone())));

        regs.acquire(&a).unwrap();
        regs.release(&a).unwrap();
        assert!(regs.release(&a).is_err());
    }

    #[test]
    fn test_reset_clears_bindings() {
        let mut regs = RegisterFile::new();
        regs.acquire(&Variable::named("a")).unwrap();
        regs.acquire(&Variable::named("b")).unwrap();

        regs.reset();
        assert_eq!(regs.bound_count(), 0);
        assert_eq!(regs.acquire(&Variable::named("b")).unwrap(), Reg(5));
    }

    #[test]
    fn test_custom_pool() {
        let mut regs = RegisterFile::with_registers(vec![Reg(7), Reg(6)]).unwrap();
        assert_eq!(regs.capacity(), 2);
        assert_eq!(regs.acquire(&Variable::temp(0)).unwrap(), Reg(7));

        assert_eq!(
            RegisterFile::with_registers(vec![Reg(5), Reg::RETURN]).unwrap_err(),
            RegAllocError::ReservedRegister(Reg::RETURN)
        );
    }
}
