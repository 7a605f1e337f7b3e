//! Row filters.
//!
//! The in-memory store keeps each entity alongside a flat row of column
//! values. [`RowTranslator`] compiles a specification into a postfix program
//! over such rows: condition tests push a boolean, combinators pop their
//! operands and push the result.

use super::{Condition, QueryTranslator};
use crate::error::SpecResult;
use crate::spec::{Operator, Value};
use std::collections::BTreeMap;

/// Column name to value. Absent columns are simply missing keys.
pub type Row = BTreeMap<&'static str, Value>;

#[derive(Debug, Clone, PartialEq)]
enum Instr {
    Test {
        column: &'static str,
        operator: Operator,
        operand: Value,
    },
    All(usize),
    Any(usize),
    Not,
}

/// Compiled filter over [`Row`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    program: Vec<Instr>,
}

impl RowFilter {
    pub fn matches(&self, row: &Row) -> bool {
        let mut stack: Vec<bool> = Vec::with_capacity(self.program.len());
        for instr in &self.program {
            match instr {
                Instr::Test {
                    column,
                    operator,
                    operand,
                } => stack.push(operator.test(row.get(column), operand)),
                Instr::All(n) => {
                    let at = stack.len().saturating_sub(*n);
                    let result = stack[at..].iter().all(|b| *b);
                    stack.truncate(at);
                    stack.push(result);
                }
                Instr::Any(n) => {
                    let at = stack.len().saturating_sub(*n);
                    let result = stack[at..].iter().any(|b| *b);
                    stack.truncate(at);
                    stack.push(result);
                }
                Instr::Not => {
                    if let Some(top) = stack.last_mut() {
                        *top = !*top;
                    }
                }
            }
        }
        stack.pop().unwrap_or(false)
    }

    /// Number of instructions in the compiled program.
    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }
}

/// Compiles specifications into [`RowFilter`]s. Supports every operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowTranslator;

impl RowTranslator {
    fn fold(parts: Vec<RowFilter>, combine: fn(usize) -> Instr) -> RowFilter {
        let n = parts.len();
        let mut program: Vec<Instr> = parts.into_iter().flat_map(|p| p.program).collect();
        // A single part needs no combinator.
        if n > 1 {
            program.push(combine(n));
        }
        RowFilter { program }
    }
}

impl QueryTranslator for RowTranslator {
    type Filter = RowFilter;

    fn backend(&self) -> &'static str {
        "row"
    }

    fn condition(&self, condition: Condition<'_>) -> SpecResult<RowFilter> {
        Ok(RowFilter {
            program: vec![Instr::Test {
                column: condition.column,
                operator: condition.operator,
                operand: condition.value.clone(),
            }],
        })
    }

    fn all(&self, parts: Vec<RowFilter>) -> SpecResult<RowFilter> {
        Ok(Self::fold(parts, Instr::All))
    }

    fn any(&self, parts: Vec<RowFilter>) -> SpecResult<RowFilter> {
        Ok(Self::fold(parts, Instr::Any))
    }

    fn negate(&self, mut part: RowFilter) -> SpecResult<RowFilter> {
        part.program.push(Instr::Not);
        Ok(part)
    }
}
