//! Session orchestration: the per-conflict state machine and the driver
//! that sequences it over every discovered conflict.

pub mod console;
pub mod driver;
pub mod mode;
pub mod summary;

pub use console::{Clipboard, Console, SystemClipboard};
pub use driver::{SessionDriver, SessionOutcome};
pub use mode::{ConflictOutcome, Mode, ModeController};
pub use summary::SessionSummary;
