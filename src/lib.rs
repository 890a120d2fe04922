pub mod core;
pub mod scheduler;
pub mod testing;

pub use crate::core::queue::PriorityQueue;
pub use crate::core::retry::RetryPolicy;
pub use crate::core::task::{FnTask, Task, TaskError};
pub use crate::scheduler::{
    Hooks, Scheduler, SchedulerConfig, SchedulerError, SchedulerHandle, SchedulerState,
    SchedulerStats,
};
