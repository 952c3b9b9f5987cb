// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for kernel operations

use std::fmt;
use thiserror::Error;

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Which side of a binary operation an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::First => write!(f, "first"),
            Operand::Second => write!(f, "second"),
        }
    }
}

/// Errors surfaced to callers of the kernel.
///
/// Repair and validation findings are never errors; they are carried by
/// the report types in [`crate::topology`].
#[derive(Debug, Error)]
pub enum KernelError {
    /// An operand has no faces left after repair.
    #[error("{operand} operand has no faces after repair")]
    DegenerateOperand {
        /// Which operand collapsed.
        operand: Operand,
    },

    /// Flat mesh buffers are malformed.
    #[error("invalid mesh buffers: {reason}")]
    InvalidBuffers {
        /// What is wrong with the buffers.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Which value is wrong and why.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_operand_message() {
        let err = KernelError::DegenerateOperand {
            operand: Operand::Second,
        };
        assert_eq!(err.to_string(), "second operand has no faces after repair");
    }
}
