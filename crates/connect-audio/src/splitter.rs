//! Sample buffer splitter: reassembles SDK deliveries into whole periods.
//!
//! The SDK pushes arbitrary-sized sample batches from its own dispatch
//! thread. This stage truncates each batch to whole frames, accumulates the
//! bytes, slices off full periods for the queue, and keeps the remainder for
//! the next call. It never blocks: a full queue stops the slicing and the
//! shortfall is reported back to the SDK as backpressure.

use std::sync::Arc;

use crate::config::{SAMPLE_BYTES, SinkConfig};
use crate::queue::PeriodQueue;

/// Outcome of one sample-delivery call, reported back to the SDK.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleDelivery {
    /// Input samples accepted by this call. When fewer than delivered, the
    /// SDK is expected to re-deliver the rest later.
    pub consumed_samples: u32,
    /// Samples the sink already holds (queued periods plus the pending
    /// remainder); the SDK throttles delivery on this.
    pub queued_samples: u32,
}

/// Byte accumulator between the SDK delivery callback and the period queue.
///
/// Owned by the callback's calling thread (single producer); the dispatcher
/// wraps it in a mutex only to present a `&self` event-sink surface.
pub struct SampleSplitter {
    queue: Arc<PeriodQueue>,
    channels: usize,
    period_samples: usize,
    period_bytes: usize,
    /// Backpressure cap for `pending`, in bytes (a multiple of the period size).
    pending_cap_bytes: usize,
    pending: Vec<u8>,
}

impl SampleSplitter {
    pub fn new(queue: Arc<PeriodQueue>, config: &SinkConfig) -> Self {
        let period_bytes = config.period_bytes();
        Self {
            pending_cap_bytes: queue.max_periods() * period_bytes,
            queue,
            channels: config.channels,
            period_samples: config.period_samples(),
            period_bytes,
            pending: Vec::new(),
        }
    }

    /// Bytes currently buffered between calls.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    /// Accept one SDK sample delivery.
    ///
    /// `num_samples` is truncated down to whole frames so no partial frame
    /// ever reaches the device. Full periods are forwarded to the queue until
    /// it reports full; everything else stays pending. Under sustained
    /// backpressure the pending buffer is capped at the queue depth and the
    /// oldest period is dropped.
    pub fn on_samples(&mut self, data: &[u8], num_samples: u32) -> SampleDelivery {
        let mut samples = (num_samples as usize).min(data.len() / SAMPLE_BYTES);
        samples -= samples % self.channels;
        self.pending.extend_from_slice(&data[..samples * SAMPLE_BYTES]);

        let mut forwarded_samples = 0usize;
        let mut start = 0usize;
        let mut queue_full = false;
        while self.pending.len() - start >= self.period_bytes {
            let period = self.pending[start..start + self.period_bytes].to_vec();
            if self.queue.try_push(period).is_err() {
                queue_full = true;
                break;
            }
            start += self.period_bytes;
            forwarded_samples += self.period_samples;
        }
        self.pending.drain(..start);

        // On the success path every truncated input sample was absorbed
        // (queued or pending). On backpressure only the queued periods count,
        // clamped because a period may carry bytes from an earlier remainder.
        let consumed = if queue_full {
            forwarded_samples.min(samples)
        } else {
            samples
        };

        if self.pending.len() > self.pending_cap_bytes {
            let excess = self.pending.len() - self.pending_cap_bytes;
            let drop_bytes = excess.div_ceil(self.period_bytes) * self.period_bytes;
            self.pending.drain(..drop_bytes.min(self.pending.len()));
            tracing::debug!(
                dropped_bytes = drop_bytes,
                "backpressure overflow; dropped oldest pending audio"
            );
        }

        SampleDelivery {
            consumed_samples: consumed as u32,
            queued_samples: (self.queue.len() * self.period_samples
                + self.pending.len() / SAMPLE_BYTES) as u32,
        }
    }
}
