//! Strategy selection for workflow steps.

use apimend_types::step::ExecutionMode;

/// The execution strategy chosen for a step.
///
/// A closed variant selected by exhaustive match so that adding a new mode
/// is a compile-time decision, not a runtime lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Direct,
    Loop,
}

impl ExecutionStrategy {
    /// Map a step's declared execution mode to its strategy. Pure.
    pub fn for_mode(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Loop => ExecutionStrategy::Loop,
            ExecutionMode::Direct => ExecutionStrategy::Direct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_mapping() {
        assert_eq!(
            ExecutionStrategy::for_mode(ExecutionMode::Loop),
            ExecutionStrategy::Loop
        );
        assert_eq!(
            ExecutionStrategy::for_mode(ExecutionMode::Direct),
            ExecutionStrategy::Direct
        );
    }
}
