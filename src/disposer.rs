// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Scoped Registrations

use std::fmt;

/// Teardown action for a registration (listener, frame loop, observer).
///
/// Runs at most once: either through [`Disposer::dispose`] or when dropped.
#[must_use = "dropping a Disposer immediately tears the registration down"]
pub struct Disposer {
    action: Option<Box<dyn FnOnce()>>,
}

impl Disposer {
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self { action: Some(Box::new(action)) }
    }

    /// A disposer with nothing to tear down.
    pub fn noop() -> Self {
        Self { action: None }
    }

    pub fn dispose(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.action.is_none()
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer").field("disposed", &self.is_disposed()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runs_exactly_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let mut d = Disposer::new(move || c.set(c.get() + 1));
        d.dispose();
        d.dispose();
        drop(d);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn drop_disposes() {
        let count = Rc::new(Cell::new(0));
        {
            let c = count.clone();
            let _d = Disposer::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }
}
