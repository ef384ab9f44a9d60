//! Audio capture and hand-off for wakegate.
//!
//! A cpal callback thread writes into a lock-free ring; a reader thread
//! assembles fixed-size blocks and feeds the bounded channel consumed by
//! the processing pipeline.

pub mod block_reader;
pub mod capture;
pub mod ring_buffer;

pub use block_reader::{AudioBlock, BlockReader, BlockReaderHandle};
pub use capture::{CaptureConfig, CaptureThread};
pub use ring_buffer::{AudioConsumer, AudioProducer, AudioRingBuffer};
