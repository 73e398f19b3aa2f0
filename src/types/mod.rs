mod draft;
mod field_value;
mod project;
mod settings;
mod template;

pub(crate) use draft::null_as_default;
pub use draft::{parse_field_assignment, FieldInput, ImageAttachment, IssueRow};
pub use field_value::{FieldLookup, ProjectFieldValue};
pub use project::{FieldOption, FieldType, Project, ProjectField, ProjectRepository, Repository};
pub use settings::{Settings, SettingsUpdate, Theme};
pub use template::{IssueForm, IssueTemplate, TemplateFile};
