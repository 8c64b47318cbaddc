use super::fault::RuntimeFault;
use parking_lot::{Condvar, Mutex};
use std::mem;
use std::thread::{self, ThreadId};

/// Re-entrant mutual exclusion token attached to every heap object
///
/// This is what `monitorenter` and `monitorexit` act on. A thread that already owns the monitor
/// may enter it again, and the monitor is only released once every entry has been matched by an
/// exit.
#[derive(Default)]
pub struct Monitor {
    state: Mutex<MonitorState>,
    released: Condvar,
}

#[derive(Default)]
struct MonitorState {
    owner: Option<ThreadId>,
    depth: usize,
}

impl Monitor {
    pub fn new() -> Monitor {
        Monitor::default()
    }

    /// Acquire the monitor, blocking until no other thread owns it
    pub fn enter(&self) {
        let current = thread::current().id();
        let mut state = self.state.lock();
        loop {
            match state.owner {
                None => {
                    state.owner = Some(current);
                    state.depth = 1;
                    return;
                }
                Some(owner) if owner == current => {
                    state.depth += 1;
                    return;
                }
                Some(_) => self.released.wait(&mut state),
            }
        }
    }

    /// Release one level of ownership
    pub fn exit(&self) -> Result<(), RuntimeFault> {
        let current = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(current) {
            return Err(RuntimeFault::IllegalMonitorState);
        }
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            drop(state);
            self.released.notify_one();
        }
        Ok(())
    }

    /// Enter the monitor for the lifetime of the returned guard
    pub fn lock(&self) -> MonitorGuard<'_> {
        self.enter();
        MonitorGuard { monitor: self }
    }

    /// Run a block while holding the monitor (`monitorenter`, the block, `monitorexit`)
    ///
    /// A release that fails (because the block already exited the monitor) replaces whatever
    /// the block produced. If the block unwinds, the guard still releases the monitor.
    pub fn scoped<T, E: From<RuntimeFault>>(
        &self,
        block: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let guard = self.lock();
        let result = block();
        guard.release()?;
        result
    }

    /// Number of unmatched entries made by the owning thread (0 when free)
    pub fn depth(&self) -> usize {
        self.state.lock().depth
    }

    pub fn owned_by_current_thread(&self) -> bool {
        self.state.lock().owner == Some(thread::current().id())
    }
}

/// Exits the monitor when dropped
pub struct MonitorGuard<'m> {
    monitor: &'m Monitor,
}

impl<'m> MonitorGuard<'m> {
    /// Exit the monitor now, reporting a thread that no longer owns it
    pub fn release(self) -> Result<(), RuntimeFault> {
        let monitor = self.monitor;
        mem::forget(self);
        monitor.exit()
    }
}

impl<'m> Drop for MonitorGuard<'m> {
    fn drop(&mut self) {
        if self.monitor.exit().is_err() {
            log::error!("Monitor guard dropped by a thread that does not own the monitor");
        }
    }
}
