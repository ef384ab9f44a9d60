use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

/// Lock-free SPSC ring between the audio callback and the reader thread
/// (rtrb, real-time safe).
pub struct AudioRingBuffer {
    producer: Producer<i16>,
    consumer: Consumer<i16>,
}

impl AudioRingBuffer {
    pub fn new(capacity: usize) -> Self {
        let (producer, consumer) = RingBuffer::new(capacity);
        Self { producer, consumer }
    }

    /// Split into the producer half (audio callback) and consumer half
    /// (reader thread).
    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        (
            AudioProducer {
                producer: self.producer,
            },
            AudioConsumer {
                consumer: self.consumer,
            },
        )
    }
}

pub struct AudioProducer {
    producer: Producer<i16>,
}

impl AudioProducer {
    /// Write samples from the audio callback. Never blocks; a full ring
    /// drops the whole write and returns 0.
    pub fn write(&mut self, samples: &[i16]) -> usize {
        let mut chunk = match self.producer.write_chunk(samples.len()) {
            Ok(chunk) => chunk,
            Err(_) => {
                warn!(
                    "Ring buffer overflow: dropped {} samples, reader is behind",
                    samples.len()
                );
                return 0;
            }
        };

        // The chunk may wrap; fill both slices.
        let (first, second) = chunk.as_mut_slices();
        let split = first.len();
        first.copy_from_slice(&samples[..split]);
        if !second.is_empty() {
            second.copy_from_slice(&samples[split..]);
        }
        chunk.commit_all();
        samples.len()
    }

    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}

pub struct AudioConsumer {
    consumer: Consumer<i16>,
}

impl AudioConsumer {
    /// Read up to `buffer.len()` samples. Never blocks; returns the number
    /// of samples copied.
    pub fn read(&mut self, buffer: &mut [i16]) -> usize {
        let chunk = match self.consumer.read_chunk(buffer.len()) {
            Ok(chunk) => chunk,
            Err(rtrb::chunks::ChunkError::TooFewSlots(available)) => {
                if available == 0 {
                    return 0;
                }
                match self.consumer.read_chunk(available) {
                    Ok(chunk) => chunk,
                    Err(_) => return 0,
                }
            }
        };

        let len = chunk.len();
        let (first, second) = chunk.as_slices();
        let split = first.len();
        buffer[..split].copy_from_slice(first);
        if !second.is_empty() {
            buffer[split..split + second.len()].copy_from_slice(second);
        }
        chunk.commit_all();
        len
    }

    pub fn slots(&self) -> usize {
        self.consumer.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_roundtrip() {
        let ring = AudioRingBuffer::new(1024);
        let (mut producer, mut consumer) = ring.split();

        let samples: Vec<i16> = (0..640).map(|i| i as i16).collect();
        assert_eq!(producer.write(&samples), 640);

        let mut out = vec![0i16; 640];
        assert_eq!(consumer.read(&mut out), 640);
        assert_eq!(out, samples);
    }

    #[test]
    fn overflow_drops_the_write() {
        let ring = AudioRingBuffer::new(64);
        let (mut producer, mut consumer) = ring.split();

        assert_eq!(producer.write(&[1i16; 64]), 64);
        assert_eq!(producer.write(&[2i16; 8]), 0);

        let mut out = vec![0i16; 64];
        assert_eq!(consumer.read(&mut out), 64);
        assert!(out.iter().all(|&s| s == 1));
    }

    #[test]
    fn partial_read_when_fewer_samples_available() {
        let ring = AudioRingBuffer::new(256);
        let (mut producer, mut consumer) = ring.split();

        producer.write(&[5i16; 100]);
        let mut out = vec![0i16; 256];
        assert_eq!(consumer.read(&mut out), 100);
    }

    #[test]
    fn wrapping_writes_survive() {
        let ring = AudioRingBuffer::new(128);
        let (mut producer, mut consumer) = ring.split();
        let mut out = vec![0i16; 128];

        for round in 0..10 {
            let samples = vec![round as i16; 96];
            assert_eq!(producer.write(&samples), 96);
            assert_eq!(consumer.read(&mut out), 96);
            assert!(out[..96].iter().all(|&s| s == round as i16));
        }
    }
}
