// BeatEngine - capture lifecycle and event emission
//
// Owns the cpal input stream, the detection thread and the beat event
// channel. The capture callback only moves pooled buffers; all DSP runs
// on the detection thread; subscribers receive events over a bounded
// broadcast channel and never execute on the audio path.
//
// Lifecycle guarantees:
// - start() on a running engine fails with AlreadyRunning
// - a failed start() leaves the engine inert and retryable
// - every start() builds a fresh detector: no history or gate state
//   survives a stop/start cycle
// - stop() synchronizes with any in-flight callback (dropping the cpal
//   stream joins it), then joins the detection thread; frames still
//   queued at that point are discarded, so no event is sent after
//   stop() returns

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rtrb::PopError;
use tokio::sync::broadcast;

use super::buffer_pool::{BufferPool, DetectionChannels};
use super::capture;
use crate::config::AppConfig;
use crate::dsp::BeatDetector;
use crate::error::{log_audio_error, AudioError};
use crate::events::{BeatEvent, BeatReceiver, EVENT_CHANNEL_CAPACITY};

/// Real-time beat detection engine over the default input device
pub struct BeatEngine {
    config: AppConfig,
    input_stream: Option<cpal::Stream>,
    detection_thread: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    event_tx: broadcast::Sender<BeatEvent>,
}

impl BeatEngine {
    /// Create an engine; no audio resources are acquired until `start`
    pub fn new(config: AppConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            input_stream: None,
            detection_thread: None,
            running: Arc::new(AtomicBool::new(false)),
            event_tx,
        }
    }

    /// Engine with default configuration
    pub fn with_defaults() -> Self {
        Self::new(AppConfig::default())
    }

    /// Subscribe to beat events
    ///
    /// May be called before or after `start`. A receiver that falls more
    /// than the channel capacity behind loses the oldest events
    /// (drop-oldest) and observes a `Lagged` error in their place; the
    /// detection thread never blocks on a slow subscriber. With no live
    /// receiver, events are silently dropped.
    pub fn subscribe(&self) -> BeatReceiver {
        self.event_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Open the capture stream and begin detection
    ///
    /// Fails with `AlreadyRunning` if called twice without an intervening
    /// `stop`. Capture failures (no device, device busy, bad format) are
    /// logged once and returned; the engine stays inert and `start` can
    /// be retried.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.is_running() {
            let err = AudioError::AlreadyRunning;
            log_audio_error(&err, "start");
            return Err(err);
        }

        let (capture_channels, detection_channels) = BufferPool::new(
            self.config.capture.buffer_pool_size,
            self.config.capture.buffer_capacity,
        );

        let (stream, sample_rate) = match capture::build_input_stream(capture_channels) {
            Ok(pair) => pair,
            Err(err) => {
                log_audio_error(&err, "start");
                return Err(err);
            }
        };

        // Fresh detector per session: empty history, Idle gate, zeroed clock
        let detector = BeatDetector::new(&self.config.detector, sample_rate)?;

        use cpal::traits::StreamTrait;
        stream.play().map_err(|e| {
            let err = AudioError::HardwareError {
                details: format!("Failed to start input stream: {}", e),
            };
            log_audio_error(&err, "start");
            err
        })?;

        self.running.store(true, Ordering::SeqCst);
        self.detection_thread = Some(spawn_detection_thread(
            detection_channels,
            detector,
            Arc::clone(&self.running),
            self.event_tx.clone(),
        ));
        self.input_stream = Some(stream);

        log::info!(
            "[BeatEngine] Started: sample_rate={} frame_size={}",
            sample_rate,
            self.config.detector.frame_size
        );
        Ok(())
    }

    /// Stop capture and detection
    ///
    /// No-op on a stopped engine. On return, no pipeline invocation is in
    /// flight and no further beat event will be sent; frames queued but
    /// unprocessed at the moment of the call are discarded.
    pub fn stop(&mut self) {
        // Clear the flag first so the detection thread discards anything
        // still queued instead of processing it.
        self.running.store(false, Ordering::SeqCst);

        // Dropping the stream deregisters the device callback and blocks
        // until any in-flight invocation has returned.
        if let Some(stream) = self.input_stream.take() {
            drop(stream);
        }

        if let Some(handle) = self.detection_thread.take() {
            if handle.join().is_err() {
                log::warn!("[BeatEngine] Detection thread panicked during shutdown");
            }
        }

        log::info!("[BeatEngine] Stopped");
    }
}

impl Drop for BeatEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the detection thread
///
/// Consumes filled buffers from the pool, slices them into analysis
/// frames, runs the detector and broadcasts each beat. Exposed so
/// harnesses can drive the thread from a synthetic producer instead of a
/// capture device.
pub fn spawn_detection_thread(
    mut channels: DetectionChannels,
    mut detector: BeatDetector,
    running: Arc<AtomicBool>,
    event_tx: broadcast::Sender<BeatEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tracing::info!("[DetectionThread] Started");
        let frame_size = detector.frame_size();
        let mut accumulator: Vec<f32> = Vec::with_capacity(frame_size * 4);

        loop {
            // Checked before popping: frames queued at stop are discarded
            if !running.load(Ordering::SeqCst) {
                break;
            }

            let buffer = match channels.data_consumer.pop() {
                Ok(buffer) => buffer,
                Err(PopError::Empty) => {
                    thread::sleep(Duration::from_millis(1));
                    continue;
                }
            };

            accumulator.extend_from_slice(&buffer);
            if channels.pool_producer.push(buffer).is_err() {
                tracing::warn!("[DetectionThread] Pool queue full, dropping buffer");
            }

            let mut offset = 0;
            while accumulator.len() - offset >= frame_size {
                let frame = &accumulator[offset..offset + frame_size];
                if let Some(event) = detector.process(frame) {
                    tracing::debug!(
                        "[DetectionThread] Beat at {} ms (energy {:.4} > threshold {:.4})",
                        event.timestamp_ms,
                        event.energy,
                        event.threshold
                    );
                    // Send fails only with no subscriber; the beat is
                    // dropped silently in that case.
                    let _ = event_tx.send(event);
                }
                offset += frame_size;
            }
            accumulator.drain(..offset);
        }

        tracing::info!("[DetectionThread] Exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;

    fn bass_frame(frame_size: usize, sample_rate: u32, amplitude: f32) -> Vec<f32> {
        (0..frame_size)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * 60.0 * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_engine_starts_inert() {
        let engine = BeatEngine::with_defaults();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_stop_on_stopped_engine_is_noop() {
        let mut engine = BeatEngine::with_defaults();
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_subscribe_before_start() {
        let engine = BeatEngine::with_defaults();
        let rx = engine.subscribe();
        assert_eq!(rx.len(), 0);
    }

    #[test]
    fn test_detection_thread_emits_beats_in_order() {
        let (mut capture, detection) = BufferPool::new(16, 2048);
        let detector = BeatDetector::new(&DetectorConfig::default(), 44100).unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let (event_tx, mut event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let handle =
            spawn_detection_thread(detection, detector, Arc::clone(&running), event_tx);

        // One second of quiet baseline, a spike, a full cooldown of
        // quiet, then a second spike.
        let quiet = bass_frame(1024, 44100, 0.01);
        let loud = bass_frame(1024, 44100, 0.5);
        let mut feed = |samples: &[f32]| loop {
            match capture.pool_consumer.pop() {
                Ok(mut buffer) => {
                    buffer.clear();
                    buffer.extend_from_slice(samples);
                    capture.data_producer.push(buffer).unwrap();
                    break;
                }
                Err(_) => thread::sleep(Duration::from_millis(1)),
            }
        };

        for _ in 0..43 {
            feed(&quiet);
        }
        feed(&loud);
        for _ in 0..12 {
            feed(&quiet);
        }
        feed(&loud);

        let first = loop {
            match event_rx.try_recv() {
                Ok(event) => break event,
                Err(broadcast::error::TryRecvError::Empty) => {
                    thread::sleep(Duration::from_millis(5))
                }
                Err(err) => panic!("unexpected receive error: {:?}", err),
            }
        };
        let second = loop {
            match event_rx.try_recv() {
                Ok(event) => break event,
                Err(broadcast::error::TryRecvError::Empty) => {
                    thread::sleep(Duration::from_millis(5))
                }
                Err(err) => panic!("unexpected receive error: {:?}", err),
            }
        };

        assert!(
            first.timestamp_ms < second.timestamp_ms,
            "events must arrive in temporal order"
        );

        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
    }

    #[test]
    fn test_detection_thread_discards_queue_after_shutdown() {
        let (mut capture, detection) = BufferPool::new(16, 2048);
        let detector = BeatDetector::new(&DetectorConfig::default(), 44100).unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let (event_tx, mut event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        // Stop immediately so the worker exits before touching the queue
        running.store(false, Ordering::SeqCst);
        let handle =
            spawn_detection_thread(detection, detector, Arc::clone(&running), event_tx);
        handle.join().unwrap();

        // A loud frame left in the queue must not produce an event
        let mut buffer = capture.pool_consumer.pop().unwrap();
        buffer.extend_from_slice(&bass_frame(1024, 44100, 0.9));
        capture.data_producer.push(buffer).unwrap();

        assert!(matches!(
            event_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed)
        ));
    }
}
