// Audio capture via cpal
//
// Opens the default input device and feeds mono f32 samples into the
// transfer buffer pool. The callback pops a pre-allocated buffer, copies
// the first channel and ships it to the detection thread; if the pool is
// momentarily exhausted the chunk is dropped rather than blocking the
// audio thread.

use cpal::traits::{DeviceTrait, HostTrait};

use super::buffer_pool::CaptureChannels;
use crate::error::AudioError;

/// Build an input stream feeding the buffer pool
///
/// Returns the (not yet started) stream together with the device's
/// sample rate, which the detector must be constructed against.
pub fn build_input_stream(
    mut channels: CaptureChannels,
) -> Result<(cpal::Stream, u32), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| AudioError::StreamOpenFailed {
            reason: "No default input device found".to_string(),
        })?;

    let config = device
        .default_input_config()
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("Failed to get default input config: {:?}", e),
        })?;

    let stream_config: cpal::StreamConfig = config.clone().into();
    let sample_rate = stream_config.sample_rate.0;
    let channel_count = stream_config.channels as usize;

    let err_fn = |err| log::error!("Input stream error: {}", err);

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buffer) = channels.pool_consumer.pop() {
                    buffer.clear();
                    if channel_count == 1 {
                        buffer.extend_from_slice(data);
                    } else {
                        // De-interleave: take the first channel
                        for frame in data.chunks(channel_count) {
                            buffer.push(frame.first().copied().unwrap_or(0.0));
                        }
                    }
                    let _ = channels.data_producer.push(buffer);
                }
            },
            err_fn,
            None,
        ),
        other => {
            return Err(AudioError::StreamOpenFailed {
                reason: format!("Unsupported input sample format {:?} (need F32)", other),
            })
        }
    }
    .map_err(|e| AudioError::StreamOpenFailed {
        reason: format!("{:?}", e),
    })?;

    Ok((stream, sample_rate))
}
