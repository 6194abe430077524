//! The course dialog as an explicit state machine.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::{FormError, SubmitError};
use crate::models::{Course, CourseField, CourseFields};
use crate::validation::{Schema, ValidationResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    /// Dialog closed, no draft.
    #[default]
    Idle,
    Creating { fields: CourseFields },
    /// `fields` is a snapshot of the source course taken when editing began.
    Editing { id: String, fields: CourseFields },
}

/// The in-progress values of an open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub id: Option<String>,
    pub fields: CourseFields,
}

/// The mutation a valid submit resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(CourseFields),
    Update { id: String, fields: CourseFields },
}

impl Submission {
    pub fn verb(&self) -> &'static str {
        match self {
            Submission::Create(_) => "create",
            Submission::Update { .. } => "update",
        }
    }
}

pub struct FormController {
    schema: Arc<Schema>,
    state: FormState,
    errors: ValidationResult,
    touched: BTreeSet<CourseField>,
}

impl FormController {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            state: FormState::Idle,
            errors: ValidationResult::default(),
            touched: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, FormState::Idle)
    }

    pub fn draft(&self) -> Option<Draft> {
        match &self.state {
            FormState::Idle => None,
            FormState::Creating { fields } => Some(Draft {
                id: None,
                fields: fields.clone(),
            }),
            FormState::Editing { id, fields } => Some(Draft {
                id: Some(id.clone()),
                fields: fields.clone(),
            }),
        }
    }

    /// Errors for the current draft, whether or not they are shown yet.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    /// The error to display for `field`: only once the field has been touched.
    pub fn visible_error(&self, field: CourseField) -> Option<&str> {
        if self.touched.contains(&field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    pub fn title(&self) -> &'static str {
        "Course"
    }

    pub fn submit_label(&self) -> Option<&'static str> {
        match self.state {
            FormState::Idle => None,
            FormState::Creating { .. } => Some("Add"),
            FormState::Editing { .. } => Some("Update"),
        }
    }

    pub fn open_create(&mut self) -> Result<(), FormError> {
        self.ensure_idle()?;
        self.enter(FormState::Creating {
            fields: CourseFields::default(),
        });
        Ok(())
    }

    pub fn open_edit(&mut self, course: &Course) -> Result<(), FormError> {
        self.ensure_idle()?;
        self.enter(FormState::Editing {
            id: course.id.clone(),
            fields: course.fields(),
        });
        Ok(())
    }

    /// Changes one draft field and re-validates the whole draft.
    pub fn set_field(
        &mut self,
        field: CourseField,
        value: impl Into<String>,
    ) -> Result<&ValidationResult, FormError> {
        let fields = self.fields_mut().ok_or(FormError::NotOpen)?;
        fields.set(field, value);
        self.touched.insert(field);
        self.revalidate();
        Ok(&self.errors)
    }

    pub fn blur(&mut self, field: CourseField) -> Result<(), FormError> {
        if !self.is_open() {
            return Err(FormError::NotOpen);
        }
        self.touched.insert(field);
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        match self.draft() {
            Some(draft) => self.schema.can_submit(&draft.fields),
            None => false,
        }
    }

    /// Closes the dialog and drops the draft. Nothing is sent.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Validates the draft and, when it passes, closes the dialog and hands
    /// back the mutation to issue. A failing draft stays open with every
    /// field marked touched.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        let draft = self.draft().ok_or(SubmitError::NotOpen)?;

        self.touched.extend(CourseField::ALL);
        self.errors = self.schema.validate(&draft.fields);
        if !self.errors.is_empty() {
            debug!("submit rejected: {}", self.errors);
            return Err(SubmitError::Validation(self.errors.clone()));
        }

        self.reset();
        Ok(match draft.id {
            Some(id) => Submission::Update {
                id,
                fields: draft.fields,
            },
            None => Submission::Create(draft.fields),
        })
    }

    fn ensure_idle(&self) -> Result<(), FormError> {
        if self.is_open() {
            Err(FormError::AlreadyOpen)
        } else {
            Ok(())
        }
    }

    fn enter(&mut self, state: FormState) {
        self.state = state;
        self.touched.clear();
        self.revalidate();
    }

    fn reset(&mut self) {
        self.state = FormState::Idle;
        self.errors = ValidationResult::default();
        self.touched.clear();
    }

    fn fields_mut(&mut self) -> Option<&mut CourseFields> {
        match &mut self.state {
            FormState::Idle => None,
            FormState::Creating { fields } | FormState::Editing { fields, .. } => Some(fields),
        }
    }

    fn revalidate(&mut self) {
        self.errors = match self.draft() {
            Some(draft) => self.schema.validate(&draft.fields),
            None => ValidationResult::default(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationConfig;

    fn controller() -> FormController {
        let schema = Schema::course(&ValidationConfig::default()).unwrap();
        FormController::new(Arc::new(schema))
    }

    fn old_course() -> Course {
        Course {
            id: "c1".to_string(),
            name: "Old".to_string(),
            description: "Old description text".to_string(),
        }
    }

    #[test]
    fn add_opens_an_empty_draft() {
        let mut form = controller();
        form.open_create().unwrap();
        assert_eq!(
            form.state(),
            &FormState::Creating {
                fields: CourseFields::default()
            }
        );
        assert_eq!(form.submit_label(), Some("Add"));
        // Errors are computed but hidden until a field is touched.
        assert!(!form.errors().is_empty());
        assert_eq!(form.visible_error(CourseField::Name), None);
    }

    #[test]
    fn edit_snapshots_the_source_course() {
        let mut form = controller();
        let mut course = old_course();
        form.open_edit(&course).unwrap();
        course.name = "Changed elsewhere".to_string();

        let draft = form.draft().unwrap();
        assert_eq!(draft.id.as_deref(), Some("c1"));
        assert_eq!(draft.fields, old_course().fields());
        assert_eq!(form.submit_label(), Some("Update"));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn cancel_discards_the_draft() {
        let mut form = controller();
        form.open_edit(&old_course()).unwrap();
        form.set_field(CourseField::Name, "Renamed").unwrap();
        form.cancel();
        assert_eq!(form.state(), &FormState::Idle);
        assert!(form.draft().is_none());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn cannot_open_twice() {
        let mut form = controller();
        form.open_create().unwrap();
        assert_eq!(form.open_edit(&old_course()), Err(FormError::AlreadyOpen));
        assert_eq!(form.open_create(), Err(FormError::AlreadyOpen));
    }

    #[test]
    fn set_field_requires_an_open_form() {
        let mut form = controller();
        assert_eq!(
            form.set_field(CourseField::Name, "x").map(|_| ()),
            Err(FormError::NotOpen)
        );
        assert_eq!(form.blur(CourseField::Name), Err(FormError::NotOpen));
    }

    #[test]
    fn every_change_revalidates() {
        let mut form = controller();
        form.open_create().unwrap();

        let errors = form.set_field(CourseField::Name, "123").unwrap();
        assert_eq!(errors.get(CourseField::Name), Some("Invalid name"));
        assert_eq!(form.visible_error(CourseField::Name), Some("Invalid name"));
        assert_eq!(form.visible_error(CourseField::Description), None);

        form.set_field(CourseField::Name, "Algorithms").unwrap();
        assert_eq!(form.visible_error(CourseField::Name), None);

        form.blur(CourseField::Description).unwrap();
        assert_eq!(
            form.visible_error(CourseField::Description),
            Some("Description is required")
        );
    }

    #[test]
    fn invalid_submit_keeps_the_form_open() {
        let mut form = controller();
        form.open_create().unwrap();
        form.set_field(CourseField::Name, "123").unwrap();
        form.set_field(CourseField::Description, "short").unwrap();
        assert!(!form.can_submit());

        match form.begin_submit() {
            Err(SubmitError::Validation(result)) => {
                assert_eq!(result.get(CourseField::Name), Some("Invalid name"));
                assert_eq!(
                    result.get(CourseField::Description),
                    Some("Must be at least 10 characters")
                );
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert!(form.is_open());
    }

    #[test]
    fn failed_submit_reveals_untouched_errors() {
        let mut form = controller();
        form.open_create().unwrap();
        assert!(form.begin_submit().is_err());
        assert_eq!(
            form.visible_error(CourseField::Name),
            Some("Course name is required")
        );
    }

    #[test]
    fn valid_submit_closes_and_yields_the_mutation() {
        let mut form = controller();
        form.open_create().unwrap();
        form.set_field(CourseField::Name, "Algorithms 101").unwrap();
        form.set_field(CourseField::Description, "Covers sorting and graphs")
            .unwrap();
        assert!(form.can_submit());

        let submission = form.begin_submit().unwrap();
        assert_eq!(
            submission,
            Submission::Create(CourseFields::new("Algorithms 101", "Covers sorting and graphs"))
        );
        assert_eq!(form.state(), &FormState::Idle);

        form.open_edit(&old_course()).unwrap();
        form.set_field(CourseField::Description, "A much newer description")
            .unwrap();
        assert_eq!(
            form.begin_submit().unwrap(),
            Submission::Update {
                id: "c1".to_string(),
                fields: CourseFields::new("Old", "A much newer description"),
            }
        );
    }

    #[test]
    fn submit_while_idle_is_rejected() {
        let mut form = controller();
        assert!(matches!(form.begin_submit(), Err(SubmitError::NotOpen)));
        assert!(!form.can_submit());
    }
}
