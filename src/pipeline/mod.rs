//! Pipeline entry points for endpoint provisioning.
//!
//! - `LifecycleHandler`: Create, update or delete an endpoint
//! - `CompletionPoller`: Report whether the last operation has settled
//! - `wait_for_completion`: Drive the poller until it does

pub mod handler;
pub mod poller;
pub mod waiter;

pub use handler::LifecycleHandler;
pub use poller::CompletionPoller;
pub use waiter::wait_for_completion;
