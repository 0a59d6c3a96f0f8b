pub mod resize;

pub use resize::{ResizeNotification, Settled, WindowSize};
