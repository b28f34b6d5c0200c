//! Serialized access to one engine from many threads.
//!
//! [`SerialMachine`] owns a [`Machine`](crate::Machine) and a single worker
//! thread. Runtime calls are queued FIFO and executed one at a time, so no
//! two engine operations ever overlap. Calls from one thread keep their
//! relative order; calls racing from different threads are ordered by arrival
//! in the queue.
//!
//! Lock order is always engine, then queue. The worker takes the engine lock
//! before popping a job, which lets `terminate` cancel everything not yet
//! running while it holds the engine. After each job the worker unlocks
//! fairly, so a caller blocked in `terminate` runs before the next job.

mod handle;
mod machine;
mod queue;

pub use handle::SerialHandle;
pub use machine::{SerialMachine, SerialOptions};
