//! Feature flows invoked by the Lambda handler

pub mod speak;

pub use speak::{SpeakSettings, Speaker};
