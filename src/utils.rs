pub use noisy_float::prelude::*;
pub use tap::{Pipe, Tap};

/// Whole milliseconds of a duration, used to key prepared audio.
pub fn millis(duration: P32) -> u32 {
    (duration.raw() * 1000.).round() as u32
}
