//! Event/manipulator pipeline (§4.6).
//!
//! Event detectors read world state and post events; manipulators
//! subscribe by event kind and, when matching events are active, queue
//! agent mutations or post events of their own. The scheduler clears
//! active events (subject to each event's `retain` flag) after the
//! synchronize phase of every tick.
//!
//! # Crate layout
//!
//! | Module       | Contents                                          |
//! |--------------|----------------------------------------------------|
//! | [`event`]    | `Event`, `EventPayload`                            |
//! | [`mutation`] | `Mutation` — the agent/component change a manipulator queues |
//! | [`network`]  | `EventDetector`, `Manipulator`, `ChainedManipulator`, `EventNetwork` |

pub mod event;
pub mod mutation;
pub mod network;


pub use event::{Event, EventPayload};
pub use mutation::Mutation;
pub use network::{ChainedManipulator, EventDetector, EventNetwork, Manipulator, ManipulatorExt};
