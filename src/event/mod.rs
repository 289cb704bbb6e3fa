//! Input: normalized platform events, the pending queue and pointer state.

pub mod input;
pub mod queue;
pub mod state;

pub use input::InputEvent;
pub use queue::InputQueue;
pub use state::InputState;
