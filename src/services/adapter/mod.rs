//! Adapters: wiring between a host window, the coalescer and the consumer.
//!
//! Every shape owns exactly one coalescer and at most one raw subscription.
//! They differ only in how "resizestop" is delivered:
//! - `ResizeStop` installed as the process-wide global (`install_global`);
//! - `ResizeStop` instances kept in a caller-supplied `Namespace`;
//! - `ResizeStopPlugin`, a special event on an `EventBus`.

mod global;
mod namespaced;
mod plugin;
mod raw_subscription;
mod resize_stop;
mod r#trait;

pub use self::global::{global, install_global};
pub use self::namespaced::Namespace;
pub use self::plugin::{ResizeStopPlugin, RESIZE_STOP_EVENT};
pub use self::r#trait::ResizeAdapter;
