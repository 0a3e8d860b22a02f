//! Wheel encoder driver trait

/// Quadrature encoder pair with 16-bit signed hardware counters.
///
/// The counters wrap silently after ±32767 ticks, so they must be drained
/// regularly with the `*_and_reset` variants. Only the navigator drains
/// them; everything else uses the raw reads.
pub trait EncoderDriver: Send {
    /// Left counter without resetting it
    fn counts_left(&self) -> i16;

    /// Right counter without resetting it
    fn counts_right(&self) -> i16;

    /// Left counter since the previous reset, then reset it to zero
    fn counts_and_reset_left(&mut self) -> i16;

    /// Right counter since the previous reset, then reset it to zero
    fn counts_and_reset_right(&mut self) -> i16;
}
