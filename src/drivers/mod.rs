//! Hardware boundary traits
//!
//! The motion core only talks to hardware through these traits:
//! motors take commands, encoders and the gyro are sampled, the clock
//! provides time and blocking delays, telemetry is pushed outward.

pub mod clock;
pub mod encoder;
pub mod imu;
pub mod motor;
pub mod telemetry;

pub use clock::{Clock, SystemClock};
pub use encoder::EncoderDriver;
pub use imu::GyroDriver;
pub use motor::MotorDriver;
pub use telemetry::{LogTelemetry, RecordingTelemetry, TelemetrySink};
