//! The course management panel: form, store and client wired together.
//!
//! Every mutation ends in a full reload, whether or not the server accepted
//! it, so the visible list always comes from a completed read.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::ResourceClient;
use crate::config::{env_lookup, parse_or};
use crate::error::{ConfigError, FormError, NetworkFailure, SubmitError};
use crate::form::{FormController, FormState, Submission};
use crate::grid::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use crate::models::{Course, CourseField};
use crate::store::{ReloadOutcome, ResourceStore};
use crate::validation::{Schema, ValidationResult};

#[derive(Clone, Debug)]
pub struct PanelConfig {
    pub page_size: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PanelConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let page_size = parse_or(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(ConfigError::invalid(
                "PAGE_SIZE",
                format!("must be one of {:?}", PAGE_SIZE_OPTIONS),
            ));
        }
        Ok(Self { page_size })
    }
}

/// Snapshot of the dialog for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: &'static str,
    pub state: FormState,
    pub submit_label: Option<&'static str>,
    pub visible_errors: Vec<(CourseField, String)>,
    pub submitting: bool,
}

pub struct CoursePanel {
    client: Arc<dyn ResourceClient>,
    store: ResourceStore,
    form: Mutex<FormController>,
    submitting: AtomicBool,
}

/// Clears the in-flight flag however the submission ends, including when
/// the future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CoursePanel {
    pub fn new(client: Arc<dyn ResourceClient>, schema: Arc<Schema>) -> Self {
        Self {
            store: ResourceStore::new(client.clone()),
            client,
            form: Mutex::new(FormController::new(schema)),
            submitting: AtomicBool::new(false),
        }
    }

    /// Initial load when the panel is shown. Mounting again after
    /// [`CoursePanel::unmount`] resumes loading; reads left over from the
    /// earlier mount are dropped.
    pub async fn mount(&self) -> ReloadOutcome {
        info!("course panel mounted");
        self.store.attach();
        self.store.reload().await
    }

    /// Tears the panel down. Responses still in flight are ignored.
    pub fn unmount(&self) {
        info!("course panel unmounted");
        self.store.detach();
    }

    pub async fn reload(&self) -> ReloadOutcome {
        self.store.reload().await
    }

    pub async fn courses(&self) -> Vec<Course> {
        self.store.current().await
    }

    pub async fn last_reload_error(&self) -> Option<String> {
        self.store.last_error().await
    }

    pub async fn form_state(&self) -> FormState {
        self.form.lock().await.state().clone()
    }

    pub async fn form_view(&self) -> FormView {
        let form = self.form.lock().await;
        let visible_errors = CourseField::ALL
            .into_iter()
            .filter_map(|field| {
                form.visible_error(field)
                    .map(|message| (field, message.to_string()))
            })
            .collect();
        FormView {
            title: form.title(),
            state: form.state().clone(),
            submit_label: form.submit_label(),
            visible_errors,
            submitting: self.is_submitting(),
        }
    }

    pub async fn errors(&self) -> ValidationResult {
        self.form.lock().await.errors().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// "Add Course" clicked.
    pub async fn open_create(&self) -> Result<(), FormError> {
        self.form.lock().await.open_create()
    }

    /// Edit clicked on a row.
    pub async fn open_edit(&self, course: &Course) -> Result<(), FormError> {
        self.form.lock().await.open_edit(course)
    }

    pub async fn set_field(
        &self,
        field: CourseField,
        value: impl Into<String>,
    ) -> Result<ValidationResult, FormError> {
        let mut form = self.form.lock().await;
        form.set_field(field, value).cloned()
    }

    pub async fn blur(&self, field: CourseField) -> Result<(), FormError> {
        self.form.lock().await.blur(field)
    }

    pub async fn cancel(&self) {
        self.form.lock().await.cancel();
    }

    /// Validate, mutate, reload, close. Only one submission may be in flight;
    /// a second one is refused with [`SubmitError::Busy`] and leaves the
    /// first untouched. A mutation the server refuses still reloads the list
    /// before the failure is returned.
    pub async fn submit(&self) -> Result<(), SubmitError> {
        let Some(_in_flight) = InFlight::acquire(&self.submitting) else {
            warn!("submit ignored: another submission is still in flight");
            return Err(SubmitError::Busy);
        };

        let submission = self.form.lock().await.begin_submit()?;

        let result = match &submission {
            Submission::Create(fields) => {
                info!("creating course {:?}", fields.name);
                self.client.create(fields).await
            }
            Submission::Update { id, fields } => {
                info!("updating course {}", id);
                self.client.update(id, fields).await
            }
        };
        if let Err(e) = &result {
            warn!("course {} failed: {}", submission.verb(), e);
        }

        self.store.reload().await;
        result.map_err(SubmitError::Network)
    }

    /// Delete clicked on a row. No confirmation, no draft involvement.
    pub async fn delete(&self, id: &str) -> Result<(), NetworkFailure> {
        info!("deleting course {}", id);
        let result = self.client.delete(id).await;
        if let Err(e) = &result {
            warn!("course delete failed for {}: {}", id, e);
        }
        self.store.reload().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_must_be_an_offered_option() {
        assert_eq!(PanelConfig::from_lookup(|_| None).unwrap().page_size, 5);
        let ten = PanelConfig::from_lookup(|_| Some("10".to_string())).unwrap();
        assert_eq!(ten.page_size, 10);
        assert!(PanelConfig::from_lookup(|_| Some("7".to_string())).is_err());
    }
}
