mod state;
mod ui;

use crate::config::AppConfig;
use crate::upload::{CandidateFile, HttpAnalysisService, UploadSession, SUPPORTED_EXTENSIONS};
use eframe::{egui, App};
use rfd::FileDialog;
pub use state::{DashboardState, SuggestionDecision, Toast};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{info, warn};

pub struct LegalDocAnalyzer {
    api_url: String,
    session: UploadSession,
    state: DashboardState,
}

impl LegalDocAnalyzer {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: &AppConfig, runtime: Handle) -> Self {
        info!("Initializing Legal Document Analyzer against {}", config.api_url);

        let (analysis_sender, analysis_receiver) = std_mpsc::channel();
        let service = Arc::new(HttpAnalysisService::new(config.api_url.clone()));
        let session = UploadSession::new(service, runtime).with_callback(Box::new(
            move |result| {
                analysis_sender.send(result).unwrap_or_default();
            },
        ));

        Self {
            api_url: config.api_url.clone(),
            session,
            state: DashboardState::new(analysis_receiver),
        }
    }

    pub fn submit_path(&mut self, path: PathBuf) {
        match CandidateFile::from_path(&path) {
            Ok(candidate) => {
                // Rejections are already queued as notifications by the session.
                let _ = self.session.submit(candidate);
            }
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                self.state
                    .push_error(format!("Could not read {}: {}", path.display(), e), Instant::now());
            }
        }
    }

    pub fn pick_file(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("PDF or Word document", &SUPPORTED_EXTENSIONS)
            .pick_file()
        {
            self.submit_path(path);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            match file.path {
                Some(path) => self.submit_path(path),
                None => self.state.push_error(
                    format!("{} was dropped without a file path", file.name),
                    Instant::now(),
                ),
            }
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.session.poll();
        self.state
            .push_notifications(self.session.take_notifications(), now);
        self.state.receive_analysis();
        self.state.expire_toasts(now);

        // Uploads finish off the UI thread, so keep frames coming while waiting.
        if self.session.in_flight() > 0 || !self.state.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for LegalDocAnalyzer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.update_state(ctx);
        self.render(ctx);
    }
}
