//! HostWindow: the raw "size changed" stream.
//!
//! A host only reports that its size changed and what the size is now. It knows
//! nothing about debouncing; adapters subscribe to it and feed the coalescer.

mod simulated;
mod terminal;
mod r#trait;

pub use self::r#trait::{create_host_window, HostWindow};
pub use self::simulated::SimulatedWindow;
