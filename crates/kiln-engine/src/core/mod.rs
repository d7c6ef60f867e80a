//! Application contract driven by the windowed runtime.

mod app;

pub use app::{App, AppControl, FrameCtx, FrameTime};
