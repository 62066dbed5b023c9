//! A component that never produces output.

use op_core::{LinkId, Signal, TimeMs};

use crate::Model;

/// A [`Model`] that ignores every input and never publishes. Useful as a
/// placeholder component slot in tests.
pub struct NoopModel;

impl Model for NoopModel {
    fn trigger(&mut self, _time: TimeMs) {}

    fn update_input(&mut self, _link: LinkId, _signal: Signal, _time: TimeMs) {}

    fn update_output(&mut self, _link: LinkId, _time: TimeMs) -> Option<Signal> {
        None
    }
}
