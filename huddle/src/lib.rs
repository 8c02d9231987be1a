pub mod sync {
    pub use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
    pub use std::sync::Arc;
}

pub mod config;
pub mod error;
pub mod listeners;
pub mod notification;
pub mod platform;
pub mod roster;
pub mod screen;
pub mod session;
pub mod utils;

pub trait Extension {
    /// Returns an id of the extension. Should be the crate name (eg in a `huddle-session-ext` format)
    fn id(&self) -> String;

    /// Returns the name of an extension
    fn name(&self) -> String;

    /// Returns the description of the extension
    fn description(&self) -> String {
        format!(
            "{} is an extension that provides a call session to the huddle screen",
            self.name()
        )
    }
}
