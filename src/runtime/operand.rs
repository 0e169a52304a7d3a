//! Operators and operands accepted by register arithmetic

use std::fmt;

use super::Word;
use crate::error::Result;

/// Value usable on the right-hand side of register arithmetic
///
/// Implemented for literals and registers. Memory cells are not operands; a
/// cell has to be loaded into a register first.
pub trait Operand {
    /// Reads the operand, failing if it is an inactive register
    fn operand_value(&self) -> Result<Word>;
}

impl Operand for Word {
    fn operand_value(&self) -> Result<Word> {
        Ok(*self)
    }
}

impl<T: Operand + ?Sized> Operand for &T {
    fn operand_value(&self) -> Result<Word> {
        (**self).operand_value()
    }
}

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`, wrapping
    Add,
    /// `-`, wrapping
    Sub,
    /// `*`, wrapping
    Mul,
    /// `/`, panics on a zero divisor
    Div,
    /// `%`, panics on a zero divisor
    Rem,
}

impl ArithOp {
    /// Applies the operator to two scalars
    pub fn apply(self, lhs: Word, rhs: Word) -> Word {
        match self {
            ArithOp::Add => lhs.wrapping_add(rhs),
            ArithOp::Sub => lhs.wrapping_sub(rhs),
            ArithOp::Mul => lhs.wrapping_mul(rhs),
            ArithOp::Div => lhs.wrapping_div(rhs),
            ArithOp::Rem => lhs.wrapping_rem(rhs),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
            ArithOp::Rem => write!(f, "%"),
        }
    }
}

/// Relational operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
}

impl CmpOp {
    /// Applies the comparison to two scalars
    pub fn apply(self, lhs: Word, rhs: Word) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CmpOp::Lt => write!(f, "<"),
            CmpOp::Le => write!(f, "<="),
            CmpOp::Gt => write!(f, ">"),
            CmpOp::Ge => write!(f, ">="),
            CmpOp::Eq => write!(f, "=="),
        }
    }
}
