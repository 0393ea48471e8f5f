use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{CardType, StagedFile};
use super::gateway::CardRegistry;
use super::submission::{SubmissionError, SubmissionPipeline, UploadOutcome};
use super::views::{ConfirmationView, SuccessView, WizardView};
use super::wizard::{Wizard, WizardError};

/// Opaque key for a wizard session held by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WizardHandle(pub u64);

impl std::fmt::Display for WizardHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a confirmed submission handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedApplication {
    #[serde(flatten)]
    pub success: SuccessView,
    pub uploads: Vec<UploadOutcome>,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardServiceError {
    #[error("wizard session {0} not found")]
    NotFound(WizardHandle),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("wizard session store unavailable")]
    Poisoned,
}

/// Owns every live wizard session and routes operations to them by handle.
pub struct WizardService<G> {
    sessions: Mutex<HashMap<WizardHandle, Wizard>>,
    next_handle: AtomicU64,
    pipeline: SubmissionPipeline<G>,
}

impl<G> WizardService<G>
where
    G: CardRegistry + 'static,
{
    pub fn new(registry: Arc<G>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            pipeline: SubmissionPipeline::new(registry),
        }
    }

    fn with_wizard<T>(
        &self,
        handle: WizardHandle,
        operation: impl FnOnce(&mut Wizard) -> Result<T, WizardError>,
    ) -> Result<T, WizardServiceError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| WizardServiceError::Poisoned)?;
        let wizard = sessions
            .get_mut(&handle)
            .ok_or(WizardServiceError::NotFound(handle))?;
        Ok(operation(wizard)?)
    }

    pub fn start(&self, card_type: CardType) -> Result<(WizardHandle, WizardView), WizardServiceError> {
        let handle = WizardHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let wizard = Wizard::new(card_type);
        let view = wizard.view();

        self.sessions
            .lock()
            .map_err(|_| WizardServiceError::Poisoned)?
            .insert(handle, wizard);
        info!(%handle, ?card_type, "wizard session started");
        Ok((handle, view))
    }

    pub fn view(&self, handle: WizardHandle) -> Result<WizardView, WizardServiceError> {
        self.with_wizard(handle, |wizard| Ok(wizard.view()))
    }

    /// Apply a batch of field edits; nothing is kept unless every edit is accepted.
    pub fn update_fields<I, K, V>(
        &self,
        handle: WizardHandle,
        values: I,
    ) -> Result<WizardView, WizardServiceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.with_wizard(handle, |wizard| {
            let mut staged = wizard.clone();
            for (key, value) in values {
                staged.set_field_by_key(key.as_ref(), value)?;
            }
            *wizard = staged;
            Ok(wizard.view())
        })
    }

    pub fn attach_document(
        &self,
        handle: WizardHandle,
        file: StagedFile,
    ) -> Result<WizardView, WizardServiceError> {
        self.with_wizard(handle, |wizard| {
            wizard.attach_document(file)?;
            Ok(wizard.view())
        })
    }

    pub fn remove_document(
        &self,
        handle: WizardHandle,
        index: usize,
    ) -> Result<WizardView, WizardServiceError> {
        self.with_wizard(handle, |wizard| {
            wizard.remove_document(index)?;
            Ok(wizard.view())
        })
    }

    pub fn set_profile_picture(
        &self,
        handle: WizardHandle,
        file: StagedFile,
    ) -> Result<WizardView, WizardServiceError> {
        self.with_wizard(handle, |wizard| {
            wizard.set_profile_picture(file)?;
            Ok(wizard.view())
        })
    }

    pub fn next(&self, handle: WizardHandle) -> Result<WizardView, WizardServiceError> {
        self.with_wizard(handle, |wizard| {
            wizard.next()?;
            Ok(wizard.view())
        })
    }

    pub fn prev(&self, handle: WizardHandle) -> Result<WizardView, WizardServiceError> {
        self.with_wizard(handle, |wizard| {
            wizard.prev()?;
            Ok(wizard.view())
        })
    }

    pub fn open_confirmation(
        &self,
        handle: WizardHandle,
    ) -> Result<ConfirmationView, WizardServiceError> {
        self.with_wizard(handle, Wizard::open_confirmation)
    }

    pub fn modify(&self, handle: WizardHandle) -> Result<WizardView, WizardServiceError> {
        self.with_wizard(handle, |wizard| {
            wizard.modify()?;
            Ok(wizard.view())
        })
    }

    pub fn success(&self, handle: WizardHandle) -> Result<Option<SuccessView>, WizardServiceError> {
        self.with_wizard(handle, |wizard| Ok(wizard.success_view()))
    }

    /// Drop a session. No remote cleanup is needed since drafts never leave memory.
    pub fn abandon(&self, handle: WizardHandle) -> Result<(), WizardServiceError> {
        let removed = self
            .sessions
            .lock()
            .map_err(|_| WizardServiceError::Poisoned)?
            .remove(&handle);
        match removed {
            Some(_) => {
                debug!(%handle, "wizard session abandoned");
                Ok(())
            }
            None => Err(WizardServiceError::NotFound(handle)),
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions
            .lock()
            .map(|sessions| sessions.len())
            .unwrap_or_default()
    }

    /// Run the submission pipeline for a wizard whose confirmation is open.
    ///
    /// The session lock is released while the registry calls are in flight; the
    /// wizard's submitting stage rejects a second confirm in the meantime. Only a
    /// create that never reached the registry reopens the gate for a retry.
    pub async fn confirm_and_submit(
        &self,
        handle: WizardHandle,
    ) -> Result<SubmittedApplication, WizardServiceError> {
        let (strategy, draft) = self.with_wizard(handle, |wizard| {
            let draft = wizard.begin_submission()?;
            Ok((wizard.config().strategy, draft))
        })?;

        match self.pipeline.submit(strategy, &draft).await {
            Ok(report) => {
                let success = match self
                    .with_wizard(handle, |wizard| wizard.complete_submission(report.result.clone()))
                {
                    Ok(view) => view,
                    Err(WizardServiceError::NotFound(_)) => {
                        info!(%handle, "session closed while submitting; application kept");
                        SuccessView::new(report.result.id, draft.card_type())
                    }
                    Err(other) => return Err(other),
                };
                Ok(SubmittedApplication {
                    success,
                    uploads: report.uploads,
                })
            }
            Err(err @ SubmissionError::Unconfirmed { .. }) => {
                if let Err(close) = self.with_wizard(handle, |wizard| {
                    wizard.settle_unconfirmed();
                    Ok(())
                }) {
                    debug!(%handle, error = %close, "could not close unconfirmed session");
                }
                Err(err.into())
            }
            Err(err) => {
                if let Err(reopen) = self.with_wizard(handle, |wizard| {
                    wizard.fail_submission();
                    Ok(())
                }) {
                    debug!(%handle, error = %reopen, "could not reopen confirmation");
                }
                Err(err.into())
            }
        }
    }
}
