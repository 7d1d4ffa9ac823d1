//! Scheduling layer: cron triggers, a bounded invocation queue, a fixed
//! worker pool, and the dispatcher that executes invocations against the
//! sources, pipelines and aggregator. On-demand CLI commands go through
//! the same dispatcher as timed work.

pub mod dispatcher;
pub mod invocation;
pub mod queue;
pub mod scheduler;

pub use dispatcher::Dispatcher;
pub use invocation::{yesterday_utc, Invocation};
pub use queue::{InvocationHandler, InvocationQueue, WorkerPool};
pub use scheduler::Scheduler;
