mod plan;
mod progress;
mod state;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use plan::sample;
pub use progress::SessionProgress;
pub use state::Phase;
pub use view::{Advance, ModuleOverview, QuizSnapshot, SessionResult};
pub use workflow::QuizService;
