//! Installed shortcut listeners and their per-view lifecycle.
//!
//! A view owns a [`ShortcutScope`]. Updating the scope installs its dispatcher
//! into the shared [`KeyListeners`] registry, replacing the previous one;
//! disabling or tearing it down removes it, so nothing dangles once the view
//! is gone.

use tracing::debug;

use crate::chord::KeyPress;
use crate::dispatch::{Dispatch, Focus, ShortcutDispatcher};

/// Identifies one installed dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of installed dispatchers, consulted in install order
#[derive(Debug)]
pub struct KeyListeners<A> {
    listeners: Vec<(ListenerId, ShortcutDispatcher<A>)>,
    next_id: u64,
}

impl<A> KeyListeners<A> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn install(&mut self, dispatcher: ShortcutDispatcher<A>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, dispatcher));
        debug!(?id, installed = self.listeners.len(), "key listener installed");
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> Option<ShortcutDispatcher<A>> {
        let index = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        let (_, dispatcher) = self.listeners.remove(index);
        debug!(?id, installed = self.listeners.len(), "key listener removed");
        Some(dispatcher)
    }

    pub fn get(&self, id: ListenerId) -> Option<&ShortcutDispatcher<A>> {
        self.listeners
            .iter()
            .find(|(lid, _)| *lid == id)
            .map(|(_, dispatcher)| dispatcher)
    }

    pub fn is_installed(&self, id: ListenerId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// First installed listener that fires for this press wins
    pub fn dispatch(&self, press: &KeyPress, focus: Focus) -> Dispatch<'_, A> {
        self.listeners
            .iter()
            .map(|(_, dispatcher)| dispatcher.dispatch(press, focus))
            .find(Dispatch::is_fired)
            .unwrap_or(Dispatch::PassThrough)
    }
}

impl<A> Default for KeyListeners<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// A view's slot in the listener registry
#[derive(Debug, Default)]
pub struct ShortcutScope {
    listener: Option<ListenerId>,
}

impl ShortcutScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-register after the bindings or the enabled flag changed.
    ///
    /// The previous listener is always removed first; a disabled dispatcher
    /// leaves the scope without any listener.
    pub fn update<A>(&mut self, listeners: &mut KeyListeners<A>, dispatcher: ShortcutDispatcher<A>) {
        self.teardown(listeners);
        if dispatcher.is_enabled() {
            self.listener = Some(listeners.install(dispatcher));
        }
    }

    /// Remove this scope's listener, if any
    pub fn teardown<A>(&mut self, listeners: &mut KeyListeners<A>) {
        if let Some(id) = self.listener.take() {
            listeners.remove(id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }

    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Chord;
    use crate::dispatch::ShortcutBinding;

    fn dispatcher(key: &str, action: u8) -> ShortcutDispatcher<u8> {
        ShortcutDispatcher::new(vec![ShortcutBinding::new(Chord::new(key).ctrl(), action, key)])
    }

    #[test]
    fn updates_replace_instead_of_stacking() {
        let mut listeners = KeyListeners::new();
        let mut scope = ShortcutScope::new();

        scope.update(&mut listeners, dispatcher("s", 1));
        scope.update(&mut listeners, dispatcher("s", 2));
        scope.update(&mut listeners, dispatcher("s", 3));

        assert_eq!(listeners.len(), 1);
        assert_eq!(
            listeners.dispatch(&KeyPress::new("s").ctrl(), Focus::Other),
            Dispatch::Fired(&3)
        );
    }

    #[test]
    fn disabling_removes_the_listener() {
        let mut listeners = KeyListeners::new();
        let mut scope = ShortcutScope::new();
        scope.update(&mut listeners, dispatcher("s", 1));
        assert!(scope.is_active());

        scope.update(&mut listeners, dispatcher("s", 1).with_enabled(false));
        assert!(!scope.is_active());
        assert!(listeners.is_empty());
        assert_eq!(
            listeners.dispatch(&KeyPress::new("s").ctrl(), Focus::Other),
            Dispatch::PassThrough
        );
    }

    #[test]
    fn teardown_leaves_no_listener_behind() {
        let mut listeners = KeyListeners::new();
        let mut editor = ShortcutScope::new();
        let mut dashboard = ShortcutScope::new();
        editor.update(&mut listeners, dispatcher("s", 1));
        dashboard.update(&mut listeners, dispatcher("n", 2));
        let editor_id = editor.listener().unwrap();

        editor.teardown(&mut listeners);
        editor.teardown(&mut listeners);

        assert!(!listeners.is_installed(editor_id));
        assert_eq!(listeners.len(), 1);
        assert_eq!(
            listeners.dispatch(&KeyPress::new("n").ctrl(), Focus::Other),
            Dispatch::Fired(&2)
        );
        assert!(!listeners.dispatch(&KeyPress::new("s").ctrl(), Focus::Other).is_fired());
    }
}
