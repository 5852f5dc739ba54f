mod propagator;
mod session;
mod submitter;
mod tracker;
mod types;
mod validator;

pub use propagator::{AnalysisCallback, ResultPropagator};
pub use session::UploadSession;
pub use submitter::{
    interpret_response, AnalysisService, HealthStatus, HttpAnalysisService, StageReporter,
};
pub use tracker::UploadTracker;
pub use types::{
    CandidateFile, FileStatus, Notification, NotificationKind, RecordId, UploadEvent,
    UploadedFileRecord,
};
pub use validator::{is_supported_name, validate, AcceptedFile, MAX_UPLOAD_BYTES, SUPPORTED_EXTENSIONS};
