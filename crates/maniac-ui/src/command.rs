use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A FIFO of deferred UI actions.
///
/// Widget callbacks cannot borrow the application that owns them, so they
/// push a command here and the application drains the queue after event
/// dispatch. Clones share the same queue.
#[derive(Debug)]
pub struct CommandQueue<C> {
    inner: Rc<RefCell<VecDeque<C>>>,
}

impl<C> CommandQueue<C> {
    pub fn new() -> Self {
        Self { inner: Rc::new(RefCell::new(VecDeque::new())) }
    }

    pub fn push(&self, command: C) {
        self.inner.borrow_mut().push_back(command);
    }

    /// Removes and returns everything queued so far.
    pub fn drain(&self) -> Vec<C> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<C> Clone for CommandQueue<C> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<C> Default for CommandQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}
