//! Live モードのキャプチャ制御。

pub mod live;

pub use live::{LivePhase, LiveSession};
