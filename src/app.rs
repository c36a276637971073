use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use mmdpad_core::{DEFAULT_TITLE, Diagram, DiagramId, DiagramStore, DiagramType, Template, system_templates};
use mmdpad_export::{ExportFormat, export_to_dir};
use mmdpad_history::History;
use mmdpad_keymap::{
    Dispatch, Focus, KeyListeners, KeyPress, ShortcutBinding, ShortcutDispatcher, ShortcutScope,
};

use crate::config::Config;
use crate::editor::{self, Cursor, Edit, Motion};
use crate::recent_files::RecentFiles;
use crate::shortcuts::{Action, dashboard_bindings, editor_bindings, templates_bindings};

/// Lines moved by PageUp/PageDown in the code pane
const PAGE_LINES: usize = 10;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Editor,
    Dashboard,
    Templates,
}

/// Overlays drawn above the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Help,
    Export { selected: usize },
    Share,
    ConfirmNew,
    ConfirmDelete { id: DiagramId, title: String },
}

impl Dialog {
    /// Modal dialogs block every shortcut until answered
    pub fn is_modal(&self) -> bool {
        matches!(self, Dialog::ConfirmNew | Dialog::ConfirmDelete { .. })
    }
}

/// Editor panes that can hold focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Title,
    Code,
    Preview,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::Title => Pane::Code,
            Pane::Code => Pane::Preview,
            Pane::Preview => Pane::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Pane::Title => Pane::Preview,
            Pane::Code => Pane::Title,
            Pane::Preview => Pane::Code,
        }
    }
}

/// Summary shown in the preview pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewInfo {
    pub diagram_type: DiagramType,
    pub lines: usize,
    pub chars: usize,
}

impl PreviewInfo {
    fn of(content: &str) -> Self {
        Self {
            diagram_type: DiagramType::detect(content),
            lines: content.lines().count(),
            chars: content.chars().count(),
        }
    }
}

/// Main application state
pub struct App {
    pub config: Config,
    pub store: DiagramStore,
    /// Diagram source with undo/redo
    pub history: History<String>,
    pub cursor: Cursor,
    pub title: String,
    /// Last saved or loaded version of the open diagram
    pub diagram: Option<Diagram>,
    pub view: View,
    pub dialog: Option<Dialog>,
    pub pane: Pane,
    /// Dashboard listing
    pub diagrams: Vec<Diagram>,
    /// Cursor in the dashboard or template list
    pub selected: usize,
    pub preview: PreviewInfo,
    pub recent_files: RecentFiles,
    pub status_message: Option<String>,
    pub running: bool,
    listeners: KeyListeners<Action>,
    editor_scope: ShortcutScope,
    dashboard_scope: ShortcutScope,
    templates_scope: ShortcutScope,
    registered: Option<(View, bool)>,
    content_changed: Rc<Cell<bool>>,
}

impl App {
    pub fn new(config: Config, store: DiagramStore, recent_files: RecentFiles) -> Self {
        let mut history = History::with_max_history(String::new(), config.max_history);
        let content_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&content_changed);
        history.subscribe(move |_: &String| flag.set(true));

        let mut app = Self {
            config,
            store,
            history,
            cursor: Cursor::default(),
            title: DEFAULT_TITLE.to_string(),
            diagram: None,
            view: View::Editor,
            dialog: None,
            pane: Pane::Code,
            diagrams: Vec::new(),
            selected: 0,
            preview: PreviewInfo::default(),
            recent_files,
            status_message: None,
            running: true,
            listeners: KeyListeners::new(),
            editor_scope: ShortcutScope::new(),
            dashboard_scope: ShortcutScope::new(),
            templates_scope: ShortcutScope::new(),
            registered: None,
            content_changed,
        };
        app.sync_shortcuts();
        app
    }

    /// Current diagram source
    pub fn content(&self) -> &str {
        self.history.present()
    }

    /// Whether the present source or title differs from the stored version
    pub fn is_modified(&self) -> bool {
        match &self.diagram {
            Some(saved) => saved.content != *self.history.present() || saved.title != self.title,
            None => !self.history.present().is_empty(),
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Focus context for shortcut suppression
    pub fn focus(&self) -> Focus {
        if self.view == View::Editor && self.dialog.is_none() && self.pane != Pane::Preview {
            Focus::TextEntry
        } else {
            Focus::Other
        }
    }

    /// Number of shortcut listeners currently installed
    #[cfg(test)]
    pub fn installed_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Bindings of the active view, for the help dialog
    pub fn shortcut_rows(&self) -> Vec<(String, String)> {
        let scope = match self.view {
            View::Editor => &self.editor_scope,
            View::Dashboard => &self.dashboard_scope,
            View::Templates => &self.templates_scope,
        };
        scope
            .listener()
            .and_then(|id| self.listeners.get(id))
            .map(|dispatcher| {
                dispatcher
                    .describe()
                    .map(|(chord, description)| (chord.to_string(), description.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Install the active view's shortcuts and tear down the others.
    ///
    /// Only re-registers when the view or the enabled flag changed.
    fn sync_shortcuts(&mut self) {
        let enabled = !self.dialog.as_ref().is_some_and(Dialog::is_modal);
        let wanted = (self.view, enabled);
        if self.registered == Some(wanted) {
            return;
        }

        let keys = &self.config.always_active_keys;
        let dispatcher = |bindings: Vec<ShortcutBinding<Action>>| {
            ShortcutDispatcher::new(bindings)
                .with_always_active(keys)
                .with_enabled(enabled)
        };
        match self.view {
            View::Editor => {
                self.dashboard_scope.teardown(&mut self.listeners);
                self.templates_scope.teardown(&mut self.listeners);
                self.editor_scope.update(&mut self.listeners, dispatcher(editor_bindings()));
            }
            View::Dashboard => {
                self.editor_scope.teardown(&mut self.listeners);
                self.templates_scope.teardown(&mut self.listeners);
                self.dashboard_scope.update(&mut self.listeners, dispatcher(dashboard_bindings()));
            }
            View::Templates => {
                self.editor_scope.teardown(&mut self.listeners);
                self.dashboard_scope.teardown(&mut self.listeners);
                self.templates_scope.update(&mut self.listeners, dispatcher(templates_bindings()));
            }
        }
        debug!(view = ?self.view, enabled, "shortcuts registered");
        self.registered = Some(wanted);
    }

    /// Recompute the preview summary if the source changed
    pub fn refresh_preview(&mut self) {
        if self.content_changed.replace(false) {
            self.preview = PreviewInfo::of(self.history.present());
        }
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.clear_status();
        // View changes made outside key handling must be live before dispatch
        self.sync_shortcuts();

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.running = false;
            return;
        }

        let consumed = self.dialog.is_some() && self.handle_dialog_key(key);
        if !consumed {
            let press = KeyPress::from(key);
            let fired = match self.listeners.dispatch(&press, self.focus()) {
                Dispatch::Fired(action) => Some(*action),
                Dispatch::PassThrough => None,
            };
            match fired {
                Some(action) => self.run(action),
                None if self.dialog.is_none() => self.handle_unbound_key(key),
                None => {}
            }
        }

        self.sync_shortcuts();
        self.refresh_preview();
    }

    /// Run a shortcut action
    pub fn run(&mut self, action: Action) {
        debug!(?action, view = ?self.view, "action");
        match action {
            Action::Save => self.save(),
            Action::Export => {
                let preferred = self.config.default_export_format;
                let selected = ExportFormat::ALL.iter().position(|f| *f == preferred).unwrap_or(0);
                self.dialog = Some(Dialog::Export { selected });
            }
            Action::Share => {
                if self.diagram.is_some() {
                    self.dialog = Some(Dialog::Share);
                } else {
                    self.set_status("Save the diagram before sharing");
                }
            }
            Action::NewDiagram => {
                if self.view == View::Editor {
                    self.dialog = Some(Dialog::ConfirmNew);
                } else {
                    self.new_document();
                }
            }
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::Help => self.dialog = Some(Dialog::Help),
            Action::CloseDialogs => self.dialog = None,
            Action::ShowDashboard => self.show_dashboard(),
            Action::ShowTemplates => self.show_templates(),
            Action::SelectPrev => self.selected = self.selected.saturating_sub(1),
            Action::SelectNext => {
                let max = self.list_len().saturating_sub(1);
                self.selected = (self.selected + 1).min(max);
            }
            Action::OpenSelected => self.open_selected(),
            Action::DeleteSelected => {
                if let Some(diagram) = self.diagrams.get(self.selected) {
                    self.dialog = Some(Dialog::ConfirmDelete {
                        id: diagram.id,
                        title: diagram.title.clone(),
                    });
                }
            }
            Action::Quit => self.running = false,
        }
        self.sync_shortcuts();
    }

    fn list_len(&self) -> usize {
        match self.view {
            View::Dashboard => self.diagrams.len(),
            View::Templates => system_templates().len(),
            View::Editor => 0,
        }
    }

    /// Dialog-specific keys. Returns true when the key was used.
    fn handle_dialog_key(&mut self, key: KeyEvent) -> bool {
        let Some(dialog) = self.dialog.clone() else {
            return false;
        };
        match dialog {
            Dialog::Help => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
                    self.dialog = None;
                    true
                }
                _ => false,
            },
            Dialog::Export { selected } => {
                let last = ExportFormat::ALL.len() - 1;
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.dialog = Some(Dialog::Export { selected: selected.saturating_sub(1) });
                        true
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.dialog = Some(Dialog::Export { selected: (selected + 1).min(last) });
                        true
                    }
                    KeyCode::Char(c @ '1'..='3') => {
                        let index = c as usize - '1' as usize;
                        self.dialog = None;
                        self.export(ExportFormat::ALL[index]);
                        true
                    }
                    KeyCode::Enter => {
                        self.dialog = None;
                        self.export(ExportFormat::ALL[selected.min(last)]);
                        true
                    }
                    _ => false,
                }
            }
            Dialog::Share => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.toggle_sharing();
                    true
                }
                _ => false,
            },
            Dialog::ConfirmNew => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        self.dialog = None;
                        self.new_document();
                    }
                    KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
                    _ => {}
                }
                true
            }
            Dialog::ConfirmDelete { id, title } => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        self.dialog = None;
                        self.delete(id, &title);
                    }
                    KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
                    _ => {}
                }
                true
            }
        }
    }

    /// Keys no shortcut claimed go to the focused widget
    fn handle_unbound_key(&mut self, key: KeyEvent) {
        if self.view != View::Editor {
            return;
        }
        if key.code == KeyCode::BackTab {
            self.pane = self.pane.prev();
            return;
        }
        match self.pane {
            Pane::Title => self.handle_title_key(key),
            Pane::Code => self.handle_code_key(key),
            Pane::Preview => match key.code {
                KeyCode::Tab => self.pane = self.pane.next(),
                KeyCode::Enter | KeyCode::Char('i') => self.pane = Pane::Code,
                _ => {}
            },
        }
    }

    fn handle_title_key(&mut self, key: KeyEvent) {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        match key.code {
            KeyCode::Char(c) => self.title.push(c),
            KeyCode::Backspace => {
                self.title.pop();
            }
            KeyCode::Tab | KeyCode::Enter => self.pane = Pane::Code,
            KeyCode::Esc => self.pane = Pane::Preview,
            _ => {}
        }
    }

    fn handle_code_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        // The code pane's own undo keys, reached when the shortcut stayed quiet
        if ctrl {
            match key.code {
                KeyCode::Char('z') if !shift => self.undo(),
                KeyCode::Char('z') | KeyCode::Char('Z') | KeyCode::Char('y') => self.redo(),
                KeyCode::Home => self.move_cursor(Motion::DocStart),
                KeyCode::End => self.move_cursor(Motion::DocEnd),
                _ => {}
            }
            return;
        }
        if key.modifiers.contains(KeyModifiers::ALT) {
            return;
        }

        match key.code {
            KeyCode::Char(c) => self.edit(Edit::Insert(c)),
            KeyCode::Enter => self.edit(Edit::Newline),
            KeyCode::Tab => self.edit(Edit::Indent),
            KeyCode::Backspace => self.edit(Edit::Backspace),
            KeyCode::Delete => self.edit(Edit::Delete),
            KeyCode::Left => self.move_cursor(Motion::Left),
            KeyCode::Right => self.move_cursor(Motion::Right),
            KeyCode::Up => self.move_cursor(Motion::Up),
            KeyCode::Down => self.move_cursor(Motion::Down),
            KeyCode::Home => self.move_cursor(Motion::LineStart),
            KeyCode::End => self.move_cursor(Motion::LineEnd),
            KeyCode::PageUp => self.move_cursor(Motion::PageUp(PAGE_LINES)),
            KeyCode::PageDown => self.move_cursor(Motion::PageDown(PAGE_LINES)),
            KeyCode::Esc => self.pane = Pane::Preview,
            _ => {}
        }
    }

    /// Apply an edit to the source, recording it in history
    pub fn edit(&mut self, edit: Edit) {
        if let Some((text, cursor)) =
            editor::apply(self.history.present(), self.cursor, edit, self.config.tab_width)
        {
            self.history.set(text);
            self.cursor = cursor;
        }
    }

    fn move_cursor(&mut self, motion: Motion) {
        self.cursor = editor::motion(self.history.present(), self.cursor, motion);
    }

    pub fn undo(&mut self) {
        if self.history.undo() {
            self.cursor = editor::clamp(self.history.present(), self.cursor);
            self.set_status("Undo");
        } else {
            self.set_status("Nothing to undo");
        }
    }

    pub fn redo(&mut self) {
        if self.history.redo() {
            self.cursor = editor::clamp(self.history.present(), self.cursor);
            self.set_status("Redo");
        } else {
            self.set_status("Nothing to redo");
        }
    }

    /// Put new content into the editor without making it undoable
    fn load_source(&mut self, title: String, content: String, diagram: Option<Diagram>) {
        self.history.load(content);
        self.title = title;
        self.diagram = diagram;
        self.cursor = Cursor::default();
        self.pane = Pane::Code;
        self.view = View::Editor;
        self.dialog = None;
        self.sync_shortcuts();
    }

    pub fn open_diagram(&mut self, diagram: Diagram) {
        self.recent_files.add(diagram.id, diagram.title.clone());
        self.set_status(format!("Opened {}", diagram.title));
        self.load_source(diagram.title.clone(), diagram.content.clone(), Some(diagram));
    }

    pub fn use_template(&mut self, template: &Template) {
        self.load_source(template.document_title(), template.content.to_string(), None);
        self.set_status(format!("Template: {}", template.title));
    }

    pub fn new_document(&mut self) {
        self.load_source(DEFAULT_TITLE.to_string(), String::new(), None);
        self.set_status("New diagram");
    }

    /// Create or update the stored diagram
    pub fn save(&mut self) {
        let content = self.history.present().clone();
        let existing = self.diagram.as_ref().map(|d| d.id);
        let result = match existing {
            Some(id) => self.store.update(id, &self.title, &content),
            None => self.store.create(&self.title, &content),
        };
        match result {
            Ok(saved) => {
                self.recent_files.add(saved.id, saved.title.clone());
                self.title = saved.title.clone();
                self.diagram = Some(saved);
                self.set_status(if existing.is_some() { "Diagram updated" } else { "Diagram saved" });
            }
            Err(e) => {
                warn!("save failed: {:#}", e);
                self.set_status(format!("{:#}", e));
            }
        }
    }

    /// Write the current source (saved or not) to the export directory
    pub fn export(&mut self, format: ExportFormat) {
        let content = self.history.present().clone();
        if content.trim().is_empty() {
            self.set_status("Nothing to export");
            return;
        }
        let mut snapshot = self
            .diagram
            .clone()
            .unwrap_or_else(|| Diagram::new(self.title.as_str(), content.as_str()));
        snapshot.edit(self.title.as_str(), content);

        match export_to_dir(&snapshot, format, &self.config.export_dir()) {
            Ok(path) => self.set_status(format!("Exported to {}", path.display())),
            Err(e) => self.set_status(format!("Export failed: {:#}", e)),
        }
    }

    fn toggle_sharing(&mut self) {
        let Some((id, public)) = self.diagram.as_ref().map(|d| (d.id, d.is_public)) else {
            return;
        };
        match self.store.set_sharing(id, !public) {
            Ok(updated) => {
                self.set_status(if updated.is_public { "Sharing enabled" } else { "Sharing disabled" });
                self.diagram = Some(updated);
            }
            Err(e) => self.set_status(format!("Share failed: {:#}", e)),
        }
    }

    fn delete(&mut self, id: DiagramId, title: &str) {
        match self.store.delete(id) {
            Ok(()) => {
                self.recent_files.remove(id);
                if self.diagram.as_ref().is_some_and(|d| d.id == id) {
                    self.diagram = None;
                }
                self.set_status(format!("Deleted {title}"));
            }
            Err(e) => self.set_status(format!("{:#}", e)),
        }
        self.refresh_list();
    }

    fn refresh_list(&mut self) {
        match self.store.list() {
            Ok(diagrams) => self.diagrams = diagrams,
            Err(e) => self.set_status(format!("Error listing diagrams: {:#}", e)),
        }
        self.selected = self.selected.min(self.diagrams.len().saturating_sub(1));
    }

    pub fn show_dashboard(&mut self) {
        self.view = View::Dashboard;
        self.dialog = None;
        self.selected = 0;
        self.refresh_list();
        self.sync_shortcuts();
    }

    pub fn show_templates(&mut self) {
        self.view = View::Templates;
        self.dialog = None;
        self.selected = 0;
        self.sync_shortcuts();
    }

    fn open_selected(&mut self) {
        match self.view {
            View::Dashboard => {
                if let Some(diagram) = self.diagrams.get(self.selected).cloned() {
                    self.open_diagram(diagram);
                }
            }
            View::Templates => {
                if let Some(template) = system_templates().get(self.selected) {
                    self.use_template(template);
                }
            }
            View::Editor => {}
        }
    }
}
