//! The interrupt/resume control loop.
//!
//! [`SessionLoop`] reads user lines and hands each to a [`ResumeLoop`] turn.
//! A turn drains engine passes with [`drain_pass`], resolves any suspensions
//! through a [`DecisionChannel`], and resumes until a pass ends cleanly.

mod decision;
mod resume;
mod session;
mod stream;

pub use decision::{DecisionChannel, APPROVAL_PROMPT};
pub use resume::{ResumeLoop, TurnReport};
pub use session::{SessionLoop, SessionOutcome, FAREWELL, PROMPT, WELCOME};
pub use stream::drain_pass;
