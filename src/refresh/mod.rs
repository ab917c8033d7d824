mod scheduler;
mod state;

pub use scheduler::{Scheduler, SourceHandle};
pub use state::RefreshState;
