// Lock-free transfer buffer pool for the capture -> detection hand-off
//
// Object pool over two SPSC ring buffers so the capture callback never
// heap-allocates:
// - data queue: capture thread pushes filled buffers, detection thread pops
// - pool queue: detection thread returns drained buffers for reuse
//
// All allocation happens in `BufferPool::new`; afterwards buffers only
// circulate between the two queues.

use rtrb::{Consumer, Producer, RingBuffer};

/// Pre-allocated sample transfer buffer
pub type SampleBuffer = Vec<f32>;

/// Queue ends owned by the capture callback
pub struct CaptureChannels {
    /// Source of empty buffers to fill
    pub pool_consumer: Consumer<SampleBuffer>,
    /// Destination for filled buffers
    pub data_producer: Producer<SampleBuffer>,
}

/// Queue ends owned by the detection thread
pub struct DetectionChannels {
    /// Source of filled buffers to process
    pub data_consumer: Consumer<SampleBuffer>,
    /// Return path for drained buffers
    pub pool_producer: Producer<SampleBuffer>,
}

/// Factory for the dual-queue buffer pool
pub struct BufferPool;

impl BufferPool {
    /// Allocate `count` buffers of `capacity` samples and wire the queues
    ///
    /// `capacity` should be at least the capture device's period size so
    /// filling a buffer in the callback never grows it.
    ///
    /// # Panics
    /// Panics if `count` or `capacity` is zero; both come from validated
    /// configuration.
    pub fn new(count: usize, capacity: usize) -> (CaptureChannels, DetectionChannels) {
        assert!(count > 0, "buffer count must be greater than 0");
        assert!(capacity > 0, "buffer capacity must be greater than 0");

        let (mut pool_producer, pool_consumer) = RingBuffer::new(count);
        let (data_producer, data_consumer) = RingBuffer::new(count);

        for _ in 0..count {
            let buffer = SampleBuffer::with_capacity(capacity);
            pool_producer
                .push(buffer)
                .expect("pool queue sized to hold every pre-allocated buffer");
        }

        (
            CaptureChannels {
                pool_consumer,
                data_producer,
            },
            DetectionChannels {
                data_consumer,
                pool_producer,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_buffers_start_in_pool() {
        let (mut capture, mut detection) = BufferPool::new(8, 1024);

        let mut available = 0;
        while capture.pool_consumer.pop().is_ok() {
            available += 1;
        }
        assert_eq!(available, 8);
        assert!(detection.data_consumer.pop().is_err());
    }

    #[test]
    fn test_buffers_are_preallocated_and_empty() {
        let (mut capture, _detection) = BufferPool::new(1, 2048);
        let buffer = capture.pool_consumer.pop().unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2048);
    }

    #[test]
    fn test_buffer_circulates_between_queues() {
        let (mut capture, mut detection) = BufferPool::new(2, 256);

        // Capture side: fill and ship
        let mut buffer = capture.pool_consumer.pop().unwrap();
        buffer.extend_from_slice(&[0.25; 128]);
        capture.data_producer.push(buffer).unwrap();

        // Detection side: consume and return
        let mut buffer = detection.data_consumer.pop().unwrap();
        assert_eq!(buffer.len(), 128);
        buffer.clear();
        detection.pool_producer.push(buffer).unwrap();

        // The returned buffer is available again without reallocation
        let buffer = capture.pool_consumer.pop().unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 256);
    }

    #[test]
    fn test_channel_halves_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CaptureChannels>();
        assert_send::<DetectionChannels>();
    }

    #[test]
    #[should_panic(expected = "buffer count must be greater than 0")]
    fn test_zero_count_panics() {
        BufferPool::new(0, 1024);
    }

    #[test]
    #[should_panic(expected = "buffer capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        BufferPool::new(8, 0);
    }
}
