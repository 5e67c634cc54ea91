//! Session store and append engine for Password Purgatory.

pub mod backend;
pub mod clock;
pub mod engine;
pub mod error;
pub mod file;
pub mod notify;
pub mod store;
pub mod view;

pub use backend::{KvBackend, MemoryBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AppendOutcome, EngineSettings, SessionEngine};
pub use error::SessionError;
pub use file::FileBackend;
pub use notify::{NewSessionNotice, NotificationSink};
pub use store::{SessionStore, StoredValue};
pub use view::{AttemptView, SessionView};
