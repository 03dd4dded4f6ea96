//! Audio output backends for the pmpc synthesizer.

mod cpal_backend;
mod hold;
mod traits;

pub use cpal_backend::CpalOutput;
pub use hold::{to_f32, ZeroOrderHold};
pub use traits::{AudioError, AudioOutput};
