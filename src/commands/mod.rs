pub mod extract;

pub use extract::{extract_batch, extract_batch_async, extract_screenshot, BatchLimits};
