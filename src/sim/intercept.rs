//! Interception between walkers sharing a closed table
//!
//! A pursuer moving from index `a` by `steps` samples sweeps the closed arc
//! `[a, b]` (wrapping past the end of the table when `b < a`). If the target
//! index lies in that arc the pursuer snaps onto the target and the samples
//! it would have overshot are carried back into its fractional accumulator.

/// Whether the closed arc from `current` forward to `next` contains `target`
#[inline]
pub fn arc_contains(current: usize, next: usize, target: usize) -> bool {
    if current <= next {
        target >= current && target <= next
    } else {
        // Wrapped past the end of the table
        target >= current || target <= next
    }
}

/// Result of resolving one pursuer step against a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Target not reached, pursuer moves to `index`
    Moved { index: usize },
    /// Target reached at `index`; `overshoot` whole samples go back into the fraction
    Intercepted { index: usize, overshoot: usize },
}

impl StepOutcome {
    #[inline]
    pub fn index(&self) -> usize {
        match *self {
            StepOutcome::Moved { index } | StepOutcome::Intercepted { index, .. } => index,
        }
    }

    #[inline]
    pub fn is_intercepted(&self) -> bool {
        matches!(self, StepOutcome::Intercepted { .. })
    }
}

/// Resolve a pursuer at `current` taking `steps` samples on a closed table of
/// `len` samples against a target at `target`
pub fn resolve_step(len: usize, current: usize, steps: usize, target: usize) -> StepOutcome {
    if len == 0 {
        return StepOutcome::Moved { index: 0 };
    }
    let current = current % len;
    let target = target % len;

    // A full lap or more sweeps every sample
    if steps >= len {
        let overshoot = steps - crate::forward_distance(current, target, len);
        return StepOutcome::Intercepted { index: target, overshoot };
    }

    let unwrapped = current + steps;
    let next = unwrapped % len;
    if !arc_contains(current, next, target) {
        return StepOutcome::Moved { index: next };
    }

    let target_unwrapped = if target >= current { target } else { target + len };
    StepOutcome::Intercepted {
        index: target,
        overshoot: unwrapped - target_unwrapped,
    }
}
