mod backend;
mod font;
mod platform;
mod runner;

pub use backend::{DrawCall, RecordingBackend, RecordingFontCache, TextLog, TextWrite};
pub use font::TestFont;
pub use platform::MockPlatform;
pub use runner::{TestDriver, TestRunner, TestRunnerBuilder};
