//! Keyboard shortcuts for mmdpad.
//!
//! Bindings pair a [`Chord`] with an action. A [`ShortcutDispatcher`] picks at
//! most one binding per key press and keeps plain shortcuts out of the way
//! while the user types, except for ctrl chords on the always-active keys.

mod chord;
mod dispatch;
mod listeners;

pub use chord::{Chord, KeyPress, ParseChordError};
pub use dispatch::{ALWAYS_ACTIVE_KEYS, Dispatch, Focus, ShortcutBinding, ShortcutDispatcher};
pub use listeners::{KeyListeners, ListenerId, ShortcutScope};
