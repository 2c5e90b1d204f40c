//! Process-wide lifetime of the engine's shared lookup tables.
//!
//! The tables are expensive, read-only after initialization, and shared by
//! every concurrent session. A refcount tied to live sessions guarantees they
//! are initialized at most once before first use and torn down at most once,
//! only after the last session has released its guard.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::engine::JvetEngine;

static ACTIVE_SESSIONS: Mutex<usize> = Mutex::new(0);

pub struct RomGuard<E: JvetEngine> {
    engine: Arc<E>,
}

impl<E: JvetEngine> RomGuard<E> {
    pub fn acquire(engine: Arc<E>) -> Self {
        let mut count = ACTIVE_SESSIONS.lock();
        if *count == 0 {
            debug!("initializing shared encoder tables");
            engine.init_rom();
        }
        *count += 1;
        Self { engine }
    }
}

impl<E: JvetEngine> Drop for RomGuard<E> {
    fn drop(&mut self) {
        let mut count = ACTIVE_SESSIONS.lock();
        *count -= 1;
        if *count == 0 {
            debug!("tearing down shared encoder tables");
            self.engine.destroy_rom();
        }
    }
}
