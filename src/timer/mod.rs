pub mod clock;
pub mod controller;
pub mod snapshot;
pub mod state;

pub use clock::{PreciseInterval, TickTarget};
pub use controller::{TimerConfig, TimerController};
pub use snapshot::{RoutineSnapshot, SegmentState, SegmentView};
pub use state::{TimerState, TimerStatus};
