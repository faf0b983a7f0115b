//! Scroll-driven workspace navigation arithmetic.
//!
//! [`navigate`] computes the next workspace index for a scroll input. It is
//! a pure function: the caller decides whether to activate the result.
//! Activation itself goes through [`activate_checked`], which refuses
//! indices outside the live workspace range (a stale callback can reference
//! a workspace that was just removed).

use crate::event::ScrollDirection;
use crate::traits::WorkspaceProvider;
use log::{debug, warn};

/// Compute the workspace index a scroll should activate.
///
/// `current` must be in `[0, count)` and `count` must be at least 1; the
/// result is always in `[0, count)`.
///
/// * `invert` flips the direction sign, nothing more.
/// * `cyclic` wraps past either end; otherwise the index saturates.
pub fn navigate(
    current: usize,
    count: usize,
    direction: ScrollDirection,
    invert: bool,
    cyclic: bool,
) -> usize {
    debug_assert!(count >= 1);
    debug_assert!(current < count);

    let delta = if invert {
        -direction.delta()
    } else {
        direction.delta()
    };
    let candidate = current as i64 + delta;
    let count = count as i64;

    let next = if cyclic {
        candidate.rem_euclid(count)
    } else {
        candidate.clamp(0, count - 1)
    };
    next as usize
}

/// Activate `index` on the provider if it is within the live range.
///
/// Returns `true` if the activation call was made. Out-of-range indices are
/// logged and dropped; activating the already-active index is a no-op the
/// host accepts, so no equality check is made here.
pub fn activate_checked<W: WorkspaceProvider>(provider: &W, index: usize) -> bool {
    let count = provider.count();
    if index >= count {
        warn!("refusing to activate workspace {} (count is {})", index, count);
        return false;
    }
    debug!("activating workspace {}", index);
    provider.activate(index, provider.current_time());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ScrollDirection::{Down, Up};

    #[test]
    fn result_is_always_in_range() {
        for count in 1..=6 {
            for current in 0..count {
                for direction in [Up, Down] {
                    for invert in [false, true] {
                        for cyclic in [false, true] {
                            let next = navigate(current, count, direction, invert, cyclic);
                            assert!(
                                next < count,
                                "navigate({current},{count},{direction},{invert},{cyclic}) = {next}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn cyclic_wraps_at_both_ends() {
        for count in 1..=5 {
            assert_eq!(navigate(count - 1, count, Up, false, true), 0);
            assert_eq!(navigate(0, count, Down, false, true), count - 1);
        }
    }

    #[test]
    fn clamped_saturates_at_both_ends() {
        for count in 1..=5 {
            assert_eq!(navigate(count - 1, count, Up, false, false), count - 1);
            assert_eq!(navigate(0, count, Down, false, false), 0);
        }
    }

    #[test]
    fn invert_is_a_pure_sign_flip() {
        for count in 1..=5 {
            for current in 0..count {
                for cyclic in [false, true] {
                    assert_eq!(
                        navigate(current, count, Up, true, cyclic),
                        navigate(current, count, Down, false, cyclic)
                    );
                    assert_eq!(
                        navigate(current, count, Down, true, cyclic),
                        navigate(current, count, Up, false, cyclic)
                    );
                }
            }
        }
    }

    #[test]
    fn interior_moves_are_single_steps() {
        assert_eq!(navigate(1, 4, Up, false, false), 2);
        assert_eq!(navigate(2, 4, Down, false, false), 1);
        assert_eq!(navigate(1, 4, Up, false, true), 2);
    }

    #[test]
    fn wrap_from_last_to_first() {
        // N=4, current=3, scroll up, cyclic: expect 0.
        assert_eq!(navigate(3, 4, Up, false, true), 0);
    }

    #[test]
    fn clamp_at_first_is_a_noop() {
        // N=4, current=0, scroll down, clamped: stays at 0.
        assert_eq!(navigate(0, 4, Down, false, false), 0);
    }

    #[test]
    fn single_workspace_always_yields_zero() {
        for direction in [Up, Down] {
            for invert in [false, true] {
                for cyclic in [false, true] {
                    assert_eq!(navigate(0, 1, direction, invert, cyclic), 0);
                }
            }
        }
    }
}
