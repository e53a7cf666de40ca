//! Application layer containing the payroll orchestration.
//!
//! The `Registry`, `Scanner`, `AllowanceGate` and `Dispatcher` each borrow a
//! shared `PayrollContext` for the span of one call. `PayrollEngine` owns
//! that context and serializes every state-changing call; `Poller` drives
//! the engine from a timer.

pub mod context;
pub mod dispatcher;
pub mod engine;
pub mod gate;
pub mod poller;
pub mod registry;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testing;
