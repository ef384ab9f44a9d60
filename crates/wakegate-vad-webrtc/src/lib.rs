pub mod detector;

pub use detector::{Aggressiveness, WebRtcDetector};
