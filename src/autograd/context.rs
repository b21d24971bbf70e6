//! Gradient-recording mode

use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether operations currently record backward ops
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

struct GradModeGuard {
    previous: bool,
}

impl Drop for GradModeGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|g| g.set(self.previous));
    }
}

/// Run `f` without recording any graph (inference mode)
///
/// Nested calls are fine; the previous mode is restored on exit, including
/// on unwind.
pub fn no_grad<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = GRAD_ENABLED.with(|g| g.replace(false));
    let _guard = GradModeGuard { previous };
    f()
}
