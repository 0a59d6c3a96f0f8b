pub mod adapter;
pub mod callback_registry;
pub mod coalescer;
pub mod event_bus;
pub mod host_window;

pub use adapter::{global, install_global, Namespace, ResizeAdapter, ResizeStopPlugin, RESIZE_STOP_EVENT};
pub use event_bus::{Event, EventBus};
pub use host_window::create_host_window;
