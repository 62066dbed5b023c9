//! The `Model` trait — the implementation behind one agent component
//! (§4.3 "Model (component implementation)").

use op_core::{ComponentState, LinkId, Signal, TimeMs};

/// Pluggable component behavior, bound to an agent's component slot.
///
/// The scheduler drives every component through the same three-step
/// per-tick sequence (§4.3 "Per-tick ordering"):
///
/// 1. [`update_input`][Self::update_input] — once per connected input link,
///    before the trigger.
/// 2. [`trigger`][Self::trigger] — exactly once, computing the component's
///    new internal state from whatever inputs were just delivered.
/// 3. [`update_output`][Self::update_output] — once per output link, after
///    the trigger, to publish into the channel's staging slot.
///
/// Implementations are free to ignore inputs they don't care about and to
/// return `None` from `update_output` for links they don't drive this tick.
///
/// # Thread safety
///
/// Components may be triggered from worker threads during the task phase,
/// so implementations must be `Send`.
pub trait Model: Send + 'static {
    /// Run the component's compute step at `time`, using whatever inputs
    /// `update_input` delivered since the last trigger.
    fn trigger(&mut self, time: TimeMs);

    /// Deliver `signal` arriving on `link` at `time`. Called before
    /// `trigger` for every connected input this tick.
    fn update_input(&mut self, link: LinkId, signal: Signal, time: TimeMs);

    /// Publish this component's output for `link` at `time`, or `None` if
    /// this link has nothing new to publish this tick.
    fn update_output(&mut self, link: LinkId, time: TimeMs) -> Option<Signal>;

    /// Force the component into `state`, bypassing whatever internal logic
    /// would otherwise drive its state transitions. A manipulator's
    /// `SetComponentState` mutation is the only caller; most models have no
    /// notion of being externally forced and can leave this a no-op.
    fn set_state(&mut self, _state: ComponentState) {}
}
