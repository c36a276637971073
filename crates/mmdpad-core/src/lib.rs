//! Diagram documents, built-in templates and the local store for mmdpad.

pub mod diagram;
pub mod store;
pub mod templates;

pub use diagram::{DEFAULT_TITLE, Diagram, DiagramId, DiagramType};
pub use store::{DiagramStore, default_data_dir};
pub use templates::{Template, TemplateCategory, find_template, system_templates, templates_in};
