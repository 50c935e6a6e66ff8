use std::collections::{BTreeMap, HashMap};

use crate::ir::{Instruction, Value, Variable};

/// First and last instruction index at which a variable is written or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveRange {
    pub start: usize,
    pub end: usize,
}

impl LiveRange {
    fn extend(&mut self, index: usize) {
        self.start = self.start.min(index);
        self.end = self.end.max(index);
    }
}

/// Live ranges of a straight-line instruction list. Computed once, read-only after.
#[derive(Debug, Clone, Default)]
pub struct LiveRanges {
    ranges: HashMap<Variable, LiveRange>,
    /// Instruction index -> variables whose last use is that index.
    expiring: BTreeMap<usize, Vec<Variable>>,
}

impl LiveRanges {
    pub fn compute(instructions: &[Instruction]) -> Self {
        let mut ranges: HashMap<Variable, LiveRange> = HashMap::new();
        let mut touch = |var: &Variable, index: usize| {
            ranges
                .entry(var.clone())
                .and_modify(|range| range.extend(index))
                .or_insert(LiveRange { start: index, end: index });
        };

        for (index, instr) in instructions.iter().enumerate() {
            if let Some(dest) = instr.destination() {
                touch(dest, index);
            }
            for var in instr.operands().into_iter().filter_map(Value::as_var) {
                touch(var, index);
            }
        }

        let mut expiring: BTreeMap<usize, Vec<Variable>> = BTreeMap::new();
        for (var, range) in &ranges {
            expiring.entry(range.end).or_default().push(var.clone());
        }
        for vars in expiring.values_mut() {
            vars.sort();
        }

        Self { ranges, expiring }
    }

    pub fn range(&self, var: &Variable) -> Option<LiveRange> {
        self.ranges.get(var).copied()
    }

    pub fn last_use(&self, var: &Variable) -> Option<usize> {
        self.ranges.get(var).map(|range| range.end)
    }

    /// Variables whose registers may be reclaimed once instruction `index` is lowered.
    pub fn expiring_at(&self, index: usize) -> &[Variable] {
        self.expiring.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_liveness() {
        // x = 10; y = x + 5; return y
        let x = Variable::named("x");
        let y = Variable::named("y");
        let ir = vec![
            Instruction::mov(x.clone(), 10),
            Instruction::add(y.clone(), x.clone(), 5),
            Instruction::ret(y.clone()),
        ];

        let live = LiveRanges::compute(&ir);
        assert_eq!(live.range(&x), Some(LiveRange { start: 0, end: 1 }));
        assert_eq!(live.range(&y), Some(LiveRange { start: 1, end: 2 }));
        assert_eq!(live.expiring_at(1), &[x][..]);
        assert_eq!(live.expiring_at(2), &[y][..]);
        assert!(live.expiring_at(0).is_empty());
    }

    #[test]
    fn test_unused_definition_expires_where_defined() {
        let dead = Variable::temp(0);
        let ir = vec![Instruction::mov(dead.clone(), 1), Instruction::ret(0)];

        let live = LiveRanges::compute(&ir);
        assert_eq!(live.last_use(&dead), Some(0));
        assert_eq!(live.expiring_at(0), &[dead][..]);
    }

    #[test]
    fn test_last_use_is_maximum_index() {
        let a = Variable::named("a");
        let ir = vec![
            Instruction::mov(a.clone(), 1),
            Instruction::add(Variable::temp(0), a.clone(), 2),
            Instruction::mov(a.clone(), Variable::temp(0)),
            Instruction::mul(Variable::temp(1), a.clone(), a.clone()),
            Instruction::ret(Variable::temp(1)),
        ];

        let live = LiveRanges::compute(&ir);
        assert_eq!(live.last_use(&a), Some(3));
        assert_eq!(live.last_use(&Variable::temp(0)), Some(2));
        assert_eq!(live.len(), 3);
    }

    #[test]
    fn test_expiring_is_sorted() {
        let ir = vec![
            Instruction::mov(Variable::named("b"), 1),
            Instruction::mov(Variable::named("a"), 2),
            Instruction::add(Variable::temp(0), Variable::named("b"), Variable::named("a")),
            Instruction::ret(Variable::temp(0)),
        ];

        let live = LiveRanges::compute(&ir);
        assert_eq!(
            live.expiring_at(2),
            &[Variable::named("a"), Variable::named("b")][..]
        );
    }
}
