//! Stack growth for deeply recursive elaboration.
//!
//! Nested template instantiation recurses once per level, and the depth
//! limit is user-configurable, so recursive entry points grow the stack on
//! demand instead of relying on the thread's default size.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the red zone has been reached.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_recursion_does_not_overflow() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(50_000), 50_000);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("nope"));
        assert_eq!(result, Err("nope"));
    }
}
