//! Public theme operation surface.
//!
//! Every operation enqueues one request and returns immediately. Outcomes are
//! only visible through the worker's event stream.

use tracing::warn;

use crate::worker::{
    spawn_worker, RequestId, ThemeContext, ThemeRequest, ThemeSection, ThemeWorkerHandle,
    WorkerEventStream,
};

#[derive(Clone)]
pub struct ThemeService {
    worker: ThemeWorkerHandle,
}

impl ThemeService {
    /// Start a worker over `ctx` and wrap it. The event stream is returned
    /// for callers that want to observe progress; dropping it is fine.
    pub fn start(ctx: ThemeContext) -> (Self, WorkerEventStream) {
        let (worker, events) = spawn_worker(ctx);
        (Self { worker }, events)
    }

    pub fn from_handle(worker: ThemeWorkerHandle) -> Self {
        Self { worker }
    }

    pub fn worker(&self) -> &ThemeWorkerHandle {
        &self.worker
    }

    /// Install the theme package at `uri`, replacing the current theme.
    pub fn apply_theme(&self, uri: &str) {
        self.enqueue(ThemeRequest::ApplyFromSource {
            uri: uri.to_string(),
        });
    }

    pub fn remove_theme(&self) {
        self.enqueue(ThemeRequest::RemoveTheme);
    }

    pub fn remove_theme_and_apply(&self) {
        self.enqueue(ThemeRequest::RemoveThenApplyCurrent);
    }

    pub fn apply_installed_theme(&self) {
        self.enqueue(ThemeRequest::ApplyCurrent);
    }

    pub fn apply_theme_icons(&self) {
        self.apply_section(ThemeSection::Icons);
    }

    pub fn apply_theme_wallpaper(&self) {
        self.apply_section(ThemeSection::Wallpaper);
    }

    pub fn apply_theme_system_ui(&self) {
        self.apply_section(ThemeSection::SystemUi);
    }

    pub fn apply_theme_framework(&self) {
        self.apply_section(ThemeSection::Framework);
    }

    pub fn apply_theme_ringtones(&self) {
        self.apply_section(ThemeSection::Ringtones);
    }

    pub fn apply_theme_lockscreen(&self) {
        self.apply_section(ThemeSection::Lockscreen);
    }

    pub fn apply_theme_bootanimation(&self) {
        self.apply_section(ThemeSection::BootAnimation);
    }

    pub fn apply_theme_mms(&self) {
        self.apply_section(ThemeSection::Mms);
    }

    fn apply_section(&self, section: ThemeSection) {
        self.enqueue(ThemeRequest::ApplySection { section });
    }

    /// Submit and log; a stopped worker only loses the request.
    pub fn enqueue(&self, request: ThemeRequest) -> Option<RequestId> {
        match self.worker.submit(request.clone()) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%request, error = %err, "theme request dropped");
                None
            }
        }
    }
}
