//! Drives one scan from staged files to a verdict entry in the transcript.
//!
//! A send is split in two so the UI can render while the request is out:
//! [`ScanController::begin_send`] records the user's side and hands back the
//! request, [`ScanController::finish_send`] records the outcome. `busy` is
//! true exactly between the two. [`ScanController::send`] runs both around a
//! [`PredictionClient`] call.
//!
//! Overlapping sends are not prevented here; the UI disables its send
//! button while `is_busy()` is true.

use crate::api::{PredictionClient, UploadFile};
use crate::error::ScanError;
use crate::parser::PredictResponse;
use crate::storage::Storage;
use crate::store::SessionStore;
use crate::types::{Entry, ScanModel, SessionId};

pub const NO_FILES_MESSAGE: &str = "Please select a file to scan.";
pub const NO_DATA_MESSAGE: &str = "No response data.";

/// Everything needed to dispatch one prediction request.
#[derive(Debug)]
pub struct ScanRequest<F> {
    /// Session that receives the outcome.
    pub session: SessionId,
    pub files: Vec<F>,
    pub model: ScanModel,
}

pub struct ScanController<S: Storage, F: UploadFile> {
    store: SessionStore<S>,
    staged: Vec<F>,
    model: ScanModel,
    busy: bool,
}

impl<S: Storage, F: UploadFile> ScanController<S, F> {
    pub fn new(store: SessionStore<S>) -> Self {
        Self {
            store,
            staged: Vec::new(),
            model: ScanModel::default(),
            busy: false,
        }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    /// Adds files after the ones already staged. Duplicates are kept.
    pub fn stage_files(&mut self, files: impl IntoIterator<Item = F>) {
        let before = self.staged.len();
        self.staged.extend(files);
        tracing::debug!(added = self.staged.len() - before, staged = self.staged.len(), "Staged files");
    }

    /// Removes the staged file at `index`. Out-of-range indexes change nothing and return `None`.
    pub fn unstage_file(&mut self, index: usize) -> Option<F> {
        if index >= self.staged.len() {
            tracing::warn!(index, staged = self.staged.len(), "Ignoring unstage of missing file");
            return None;
        }
        Some(self.staged.remove(index))
    }

    pub fn staged_files(&self) -> &[F] {
        &self.staged
    }

    pub fn selected_model(&self) -> ScanModel {
        self.model
    }

    pub fn select_model(&mut self, model: ScanModel) {
        self.model = model;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Records the user's side of a scan and returns the request to dispatch.
    ///
    /// With nothing staged this appends a single notice and returns `None`.
    /// Otherwise the active session (created if there is none) receives the
    /// file list and the model notice, the staged list is emptied and the
    /// controller becomes busy.
    pub fn begin_send(&mut self) -> Option<ScanRequest<F>> {
        if self.staged.is_empty() {
            self.store.append_entry(Entry::ai_text(NO_FILES_MESSAGE));
            return None;
        }

        let session = match self.store.active() {
            Some(id) => id,
            None => self.store.create_session(),
        };

        let files = std::mem::take(&mut self.staged);
        let refs = files.iter().map(UploadFile::to_ref).collect();
        self.store.append_to(session, Entry::user_files(refs));

        self.busy = true;
        self.store.append_to(session, Entry::user_status(self.model));

        tracing::info!(session_id = %session, files = files.len(), model = %self.model, "Scan started");
        Some(ScanRequest {
            session,
            files,
            model: self.model,
        })
    }

    /// Records the outcome of a request started by [`begin_send`](Self::begin_send).
    pub fn finish_send(
        &mut self,
        session: SessionId,
        outcome: Result<PredictResponse, ScanError>,
    ) {
        self.busy = false;

        match &outcome {
            Ok(PredictResponse::Results(results)) => {
                tracing::info!(session_id = %session, results = results.len(), "Scan finished")
            }
            Ok(PredictResponse::NoData) => {
                tracing::warn!(session_id = %session, "Scan returned no results")
            }
            Err(e) => tracing::warn!(session_id = %session, error = %e, "Scan request failed"),
        }

        if !self.store.append_to(session, outcome_entry(outcome)) {
            tracing::warn!(session_id = %session, "Session was evicted before the scan finished; dropping result");
        }
    }

    /// Runs a whole scan against `client`. Failures end up in the transcript, never in the caller.
    pub async fn send<C>(&mut self, client: &C)
    where
        C: PredictionClient<File = F>,
    {
        let Some(request) = self.begin_send() else {
            return;
        };
        let outcome = client.predict(&request.files, request.model).await;
        self.finish_send(request.session, outcome);
    }
}

fn outcome_entry(outcome: Result<PredictResponse, ScanError>) -> Entry {
    match outcome {
        Ok(PredictResponse::Results(results)) => Entry::ai_results(results),
        Ok(PredictResponse::NoData) => Entry::ai_text(NO_DATA_MESSAGE),
        Err(e) => Entry::ai_text(format!("Prediction request failed: {}", e)),
    }
}
