//! Motor driver trait

/// Differential drive motor pair.
///
/// Speeds are signed device units in the hardware range (±400 on the
/// Pololu 3pi+). The boundary is fire-and-forget: there is no return
/// value and no error signaling.
pub trait MotorDriver: Send {
    /// Set left and right wheel speeds
    fn set_speeds(&mut self, left: i16, right: i16);
}

