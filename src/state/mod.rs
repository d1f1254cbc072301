//! Client-side state shared across views.

pub mod session;
pub mod storage;

pub use session::{Credentials, Gate, Session, SessionError, SessionStatus, SessionStore};
pub use storage::{Clock, FileStorage, ManualClock, MemoryStorage, SessionStorage, StoredEntry, SystemClock};
