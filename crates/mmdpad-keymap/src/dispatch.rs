//! Ordered shortcut table and the per-event dispatch decision.

use tracing::debug;

use crate::chord::{Chord, KeyPress};

/// Keys that stay live with ctrl held even while typing (save, export, share)
pub const ALWAYS_ACTIVE_KEYS: [&str; 3] = ["s", "e", "p"];

/// Where keyboard focus sits when an event arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// An editable field: the title input or the code editor
    TextEntry,
    #[default]
    Other,
}

/// A chord mapped to an action
#[derive(Debug, Clone)]
pub struct ShortcutBinding<A> {
    pub chord: Chord,
    pub action: A,
    /// Label for help surfaces, never matched
    pub description: String,
}

impl<A> ShortcutBinding<A> {
    pub fn new(chord: Chord, action: A, description: impl Into<String>) -> Self {
        Self {
            chord,
            action,
            description: description.into(),
        }
    }
}

/// Outcome of dispatching one key press
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch<'a, A> {
    /// A binding won; the key must not reach the focused widget
    Fired(&'a A),
    /// Nothing fired; the focused widget handles the key as usual
    PassThrough,
}

impl<A> Dispatch<'_, A> {
    pub fn is_fired(&self) -> bool {
        matches!(self, Dispatch::Fired(_))
    }
}

/// Matches key presses against an ordered list of bindings.
///
/// The first binding whose chord matches wins. Duplicate chords are allowed;
/// the later one is never reached.
#[derive(Debug, Clone)]
pub struct ShortcutDispatcher<A> {
    bindings: Vec<ShortcutBinding<A>>,
    enabled: bool,
    always_active: Vec<String>,
}

impl<A> ShortcutDispatcher<A> {
    pub fn new(bindings: Vec<ShortcutBinding<A>>) -> Self {
        Self {
            bindings,
            enabled: true,
            always_active: ALWAYS_ACTIVE_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replace the keys that fire with ctrl even inside text entry
    pub fn with_always_active<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.always_active = keys.into_iter().map(|k| k.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bindings(&self) -> &[ShortcutBinding<A>] {
        &self.bindings
    }

    /// Chord and description of every binding, in registration order
    pub fn describe(&self) -> impl Iterator<Item = (&Chord, &str)> {
        self.bindings
            .iter()
            .map(|binding| (&binding.chord, binding.description.as_str()))
    }

    fn is_always_active(&self, chord: &Chord) -> bool {
        chord.ctrl && self.always_active.iter().any(|key| key == chord.key())
    }

    /// Index of the binding that should fire for this press
    fn winner(&self, press: &KeyPress, focus: Focus) -> Option<usize> {
        if !self.enabled {
            return None;
        }

        let index = self
            .bindings
            .iter()
            .position(|binding| binding.chord.matches(press))?;
        let chord = &self.bindings[index].chord;

        if self.is_always_active(chord) {
            debug!(chord = %chord, "shortcut fired (always active)");
            return Some(index);
        }
        if focus == Focus::TextEntry {
            debug!(chord = %chord, "shortcut suppressed in text entry");
            return None;
        }
        debug!(chord = %chord, "shortcut fired");
        Some(index)
    }

    /// Decide which action, if any, a press triggers
    pub fn dispatch(&self, press: &KeyPress, focus: Focus) -> Dispatch<'_, A> {
        match self.winner(press, focus) {
            Some(index) => Dispatch::Fired(&self.bindings[index].action),
            None => Dispatch::PassThrough,
        }
    }
}

impl<A: FnMut()> ShortcutDispatcher<A> {
    /// Dispatch and invoke the winning action once. Returns whether it fired.
    pub fn fire(&mut self, press: &KeyPress, focus: Focus) -> bool {
        match self.winner(press, focus) {
            Some(index) => {
                (self.bindings[index].action)();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Action {
        Save,
        Export,
        Share,
        New,
        Undo,
        Redo,
        Help,
        Close,
    }

    fn editor_bindings() -> Vec<ShortcutBinding<Action>> {
        vec![
            ShortcutBinding::new(Chord::new("s").ctrl(), Action::Save, "Save diagram"),
            ShortcutBinding::new(Chord::new("e").ctrl(), Action::Export, "Export diagram"),
            ShortcutBinding::new(Chord::new("p").ctrl(), Action::Share, "Share diagram"),
            ShortcutBinding::new(Chord::new("n").ctrl(), Action::New, "New diagram"),
            ShortcutBinding::new(Chord::new("z").ctrl(), Action::Undo, "Undo"),
            ShortcutBinding::new(Chord::new("z").ctrl().shift(), Action::Redo, "Redo"),
            ShortcutBinding::new(Chord::new("y").ctrl(), Action::Redo, "Redo (alternative)"),
            ShortcutBinding::new(Chord::new("?").shift(), Action::Help, "Show keyboard shortcuts"),
            ShortcutBinding::new(Chord::new("Escape"), Action::Close, "Close dialogs"),
        ]
    }

    fn counter() -> (Rc<Cell<u32>>, Box<dyn FnMut()>) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, Box::new(move || inner.set(inner.get() + 1)))
    }

    #[test]
    fn save_fires_in_and_out_of_text_entry() {
        let (count, save) = counter();
        let mut dispatcher =
            ShortcutDispatcher::new(vec![ShortcutBinding::new(Chord::new("s").ctrl(), save, "Save")]);
        let press = KeyPress::new("s").ctrl();

        assert!(dispatcher.fire(&press, Focus::TextEntry));
        assert_eq!(count.get(), 1);
        assert!(dispatcher.fire(&press, Focus::Other));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn shift_separates_undo_from_redo() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings());
        let redo = KeyPress::new("z").ctrl().shift();
        assert_eq!(dispatcher.dispatch(&redo, Focus::Other), Dispatch::Fired(&Action::Redo));

        let undo = KeyPress::new("Z").ctrl();
        assert_eq!(dispatcher.dispatch(&undo, Focus::Other), Dispatch::Fired(&Action::Undo));
    }

    #[test]
    fn ctrl_n_passes_through_while_typing() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings());
        let press = KeyPress::new("n").ctrl();
        assert_eq!(dispatcher.dispatch(&press, Focus::TextEntry), Dispatch::PassThrough);
        assert_eq!(dispatcher.dispatch(&press, Focus::Other), Dispatch::Fired(&Action::New));
    }

    #[test]
    fn undo_and_help_are_suppressed_while_typing() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings());
        for press in [
            KeyPress::new("z").ctrl(),
            KeyPress::new("z").ctrl().shift(),
            KeyPress::new("?").shift(),
            KeyPress::new("Escape"),
        ] {
            assert!(!dispatcher.dispatch(&press, Focus::TextEntry).is_fired());
            assert!(dispatcher.dispatch(&press, Focus::Other).is_fired());
        }
    }

    #[test]
    fn export_and_share_stay_active_while_typing() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings());
        assert_eq!(
            dispatcher.dispatch(&KeyPress::new("e").ctrl(), Focus::TextEntry),
            Dispatch::Fired(&Action::Export)
        );
        assert_eq!(
            dispatcher.dispatch(&KeyPress::new("p").meta(), Focus::TextEntry),
            Dispatch::Fired(&Action::Share)
        );
    }

    #[test]
    fn plain_letter_on_allow_list_needs_ctrl() {
        let dispatcher =
            ShortcutDispatcher::new(vec![ShortcutBinding::new(Chord::new("s"), Action::Save, "Save")]);
        let press = KeyPress::new("s");
        assert_eq!(dispatcher.dispatch(&press, Focus::TextEntry), Dispatch::PassThrough);
        assert_eq!(dispatcher.dispatch(&press, Focus::Other), Dispatch::Fired(&Action::Save));
    }

    #[test]
    fn modifiers_must_match_exactly() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings());
        assert!(!dispatcher.dispatch(&KeyPress::new("s").ctrl().alt(), Focus::Other).is_fired());
        assert!(!dispatcher.dispatch(&KeyPress::new("s"), Focus::Other).is_fired());
        assert!(!dispatcher.dispatch(&KeyPress::new("?"), Focus::Other).is_fired());
        assert!(!dispatcher.dispatch(&KeyPress::new("Escape").ctrl(), Focus::Other).is_fired());
    }

    #[test]
    fn earlier_duplicate_shadows_later() {
        let dispatcher = ShortcutDispatcher::new(vec![
            ShortcutBinding::new(Chord::new("k"), Action::Help, "first"),
            ShortcutBinding::new(Chord::new("k"), Action::Close, "second"),
        ]);
        assert_eq!(
            dispatcher.dispatch(&KeyPress::new("k"), Focus::Other),
            Dispatch::Fired(&Action::Help)
        );
    }

    #[test]
    fn disabled_dispatcher_passes_everything_through() {
        let (count, save) = counter();
        let mut dispatcher =
            ShortcutDispatcher::new(vec![ShortcutBinding::new(Chord::new("s").ctrl(), save, "Save")])
                .with_enabled(false);
        assert!(!dispatcher.fire(&KeyPress::new("s").ctrl(), Focus::Other));
        assert_eq!(count.get(), 0);

        dispatcher.set_enabled(true);
        assert!(dispatcher.fire(&KeyPress::new("s").ctrl(), Focus::Other));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn custom_allow_list_can_include_new() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings()).with_always_active(["S", "e", "p", "n"]);
        assert_eq!(
            dispatcher.dispatch(&KeyPress::new("n").ctrl(), Focus::TextEntry),
            Dispatch::Fired(&Action::New)
        );
        assert_eq!(
            dispatcher.dispatch(&KeyPress::new("s").ctrl(), Focus::TextEntry),
            Dispatch::Fired(&Action::Save)
        );
    }

    #[test]
    fn describe_lists_bindings_in_order() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings());
        let rows: Vec<String> = dispatcher
            .describe()
            .map(|(chord, description)| format!("{chord} {description}"))
            .collect();
        assert_eq!(rows[0], "Ctrl+S Save diagram");
        assert_eq!(rows[5], "Ctrl+Shift+Z Redo");
        assert_eq!(rows[7], "Shift+? Show keyboard shortcuts");
        assert_eq!(rows.len(), 9);
    }

    fn press() -> impl Strategy<Value = KeyPress> {
        (
            prop::sample::select(vec!["s", "e", "p", "n", "z", "y", "?", "a", "escape"]),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(key, ctrl, meta, shift, alt)| KeyPress {
                key: key.to_string(),
                ctrl,
                meta,
                shift,
                alt,
            })
    }

    proptest! {
        #[test]
        fn at_most_one_action_fires(press in press(), typing in any::<bool>()) {
            let counts: Vec<Rc<Cell<u32>>> = (0..3).map(|_| Rc::new(Cell::new(0))).collect();
            let bindings = ["s", "z", "z"]
                .iter()
                .zip(counts.iter())
                .map(|(key, count)| {
                    let count = Rc::clone(count);
                    let action: Box<dyn FnMut()> = Box::new(move || count.set(count.get() + 1));
                    ShortcutBinding::new(Chord::new(key).ctrl(), action, *key)
                })
                .collect();
            let mut dispatcher = ShortcutDispatcher::new(bindings);
            let focus = if typing { Focus::TextEntry } else { Focus::Other };

            let fired = dispatcher.fire(&press, focus);
            let total: u32 = counts.iter().map(|c| c.get()).sum();
            prop_assert_eq!(total, u32::from(fired));
            prop_assert_eq!(counts[2].get(), 0);
        }
    }
}
