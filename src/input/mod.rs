//! Edge-triggered input tracking.
//!
//! Raw hardware callbacks feed the trackers at any time between ticks. Once per
//! tick, during `update`, each tracker emits its derived events through the bus;
//! during `afterUpdate` the one-shot sets are cleared.

pub mod keyboard;
pub mod mouse;

pub use keyboard::{Key, Keyboard};
pub use mouse::{Mouse, MouseButton};
