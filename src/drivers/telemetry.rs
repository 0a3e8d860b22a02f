//! Display/telemetry sink

use crate::core::Telemetry;

/// Outbound pose and encoder telemetry (OLED, serial console, recorder).
///
/// Accepts no input back into the core.
pub trait TelemetrySink {
    /// Push one telemetry snapshot
    fn publish(&mut self, telemetry: &Telemetry);
}

/// Writes telemetry lines through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry {
    /// Only print encoder totals (skip the pose line)
    pub encoders_only: bool,
}

impl LogTelemetry {
    /// Log both pose and encoder totals
    pub fn new() -> Self {
        Self::default()
    }

    /// Log encoder totals only
    pub fn encoders_only() -> Self {
        Self {
            encoders_only: true,
        }
    }
}

impl TelemetrySink for LogTelemetry {
    fn publish(&mut self, telemetry: &Telemetry) {
        log::info!(
            "encoders: left={}, right={}",
            telemetry.encoders.left,
            telemetry.encoders.right
        );
        if !self.encoders_only {
            log::info!(
                "odom: x={:.4}, y={:.4}, theta(deg)={:.2}",
                telemetry.pose.x,
                telemetry.pose.y,
                telemetry.pose.theta.to_degrees()
            );
        }
    }
}

/// Keeps every published snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    /// Snapshots in publish order
    pub history: Vec<Telemetry>,
}

impl RecordingTelemetry {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent snapshot
    pub fn last(&self) -> Option<&Telemetry> {
        self.history.last()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn publish(&mut self, telemetry: &Telemetry) {
        self.history.push(*telemetry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EncoderTotals, Pose2D};

    #[test]
    fn test_recording_keeps_order() {
        let mut sink = RecordingTelemetry::new();
        assert!(sink.last().is_none());

        for i in 0..3 {
            sink.publish(&Telemetry {
                pose: Pose2D::new(i as f32, 0.0, 0.0),
                encoders: EncoderTotals {
                    left: i,
                    right: -i,
                },
            });
        }

        assert_eq!(sink.history.len(), 3);
        assert_eq!(sink.history[0].encoders.left, 0);
        let last = sink.last().unwrap();
        assert_eq!(last.pose.x, 2.0);
        assert_eq!(last.encoders.right, -2);
    }

    #[test]
    fn test_log_sink_accepts_snapshots() {
        let telemetry = Telemetry {
            pose: Pose2D::identity(),
            encoders: EncoderTotals::default(),
        };
        LogTelemetry::new().publish(&telemetry);
        LogTelemetry::encoders_only().publish(&telemetry);
        assert!(LogTelemetry::encoders_only().encoders_only);
    }
}
