//! Stack safety for the recursive parser and evaluator.
//!
//! Deeply nested source (long `((((…))))` chains, deep Lox recursion) would
//! otherwise overflow the native stack.  Recursive entry points wrap their
//! bodies in [`ensure_sufficient_stack`], which grows the stack on the heap
//! when less than the red zone remains.

/// Minimum stack space to keep available (128KB red zone).
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below [`RED_ZONE`].
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
