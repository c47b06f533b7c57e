pub mod habit;
pub mod period;
pub mod session;
pub mod task;

pub use habit::Habit;
pub use period::{day_key, PeriodWindow};
pub use session::WorkSession;
pub use task::{Priority, Task};
