//! Shortcut tables for each view, in registration (= priority) order.

use mmdpad_keymap::{Chord, ShortcutBinding};

/// Everything a shortcut can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Save,
    Export,
    Share,
    NewDiagram,
    Undo,
    Redo,
    Help,
    CloseDialogs,
    ShowDashboard,
    ShowTemplates,
    SelectPrev,
    SelectNext,
    OpenSelected,
    DeleteSelected,
    Quit,
}

fn bind(chord: Chord, action: Action, description: &str) -> ShortcutBinding<Action> {
    ShortcutBinding::new(chord, action, description)
}

pub fn editor_bindings() -> Vec<ShortcutBinding<Action>> {
    vec![
        bind(Chord::new("s").ctrl(), Action::Save, "Save diagram"),
        bind(Chord::new("e").ctrl(), Action::Export, "Export diagram"),
        bind(Chord::new("p").ctrl(), Action::Share, "Share diagram"),
        bind(Chord::new("n").ctrl(), Action::NewDiagram, "New diagram"),
        bind(Chord::new("z").ctrl(), Action::Undo, "Undo"),
        bind(Chord::new("z").ctrl().shift(), Action::Redo, "Redo"),
        bind(Chord::new("y").ctrl(), Action::Redo, "Redo (alternative)"),
        bind(Chord::new("?").shift(), Action::Help, "Show keyboard shortcuts"),
        bind(Chord::new("Escape"), Action::CloseDialogs, "Close dialogs"),
        bind(Chord::new("o").ctrl(), Action::ShowDashboard, "Open dashboard"),
        bind(Chord::new("t").ctrl(), Action::ShowTemplates, "Browse templates"),
    ]
}

fn list_bindings() -> Vec<ShortcutBinding<Action>> {
    vec![
        bind(Chord::new("ArrowUp"), Action::SelectPrev, "Previous"),
        bind(Chord::new("k"), Action::SelectPrev, "Previous"),
        bind(Chord::new("ArrowDown"), Action::SelectNext, "Next"),
        bind(Chord::new("j"), Action::SelectNext, "Next"),
        bind(Chord::new("?").shift(), Action::Help, "Show keyboard shortcuts"),
        bind(Chord::new("q"), Action::Quit, "Quit"),
    ]
}

pub fn dashboard_bindings() -> Vec<ShortcutBinding<Action>> {
    let mut bindings = vec![
        bind(Chord::new("Enter"), Action::OpenSelected, "Open diagram"),
        bind(Chord::new("d"), Action::DeleteSelected, "Delete diagram"),
        bind(Chord::new("n"), Action::NewDiagram, "New diagram"),
        bind(Chord::new("t"), Action::ShowTemplates, "Browse templates"),
        bind(Chord::new("Escape"), Action::CloseDialogs, "Close dialogs"),
    ];
    bindings.extend(list_bindings());
    bindings
}

pub fn templates_bindings() -> Vec<ShortcutBinding<Action>> {
    let mut bindings = vec![
        bind(Chord::new("Enter"), Action::OpenSelected, "Use template"),
        bind(Chord::new("n"), Action::NewDiagram, "Blank diagram"),
        bind(Chord::new("Escape"), Action::ShowDashboard, "Back to dashboard"),
    ];
    bindings.extend(list_bindings());
    bindings
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use mmdpad_keymap::{Dispatch, Focus, KeyPress, ShortcutDispatcher};

    use super::*;

    #[test]
    fn no_table_shadows_its_own_chords() {
        for bindings in [editor_bindings(), dashboard_bindings(), templates_bindings()] {
            let chords: HashSet<_> = bindings.iter().map(|b| b.chord.clone()).collect();
            assert_eq!(chords.len(), bindings.len());
        }
    }

    #[test]
    fn editor_redo_has_two_chords() {
        let dispatcher = ShortcutDispatcher::new(editor_bindings());
        for press in [KeyPress::new("z").ctrl().shift(), KeyPress::new("y").ctrl()] {
            assert_eq!(dispatcher.dispatch(&press, Focus::Other), Dispatch::Fired(&Action::Redo));
        }
    }
}
