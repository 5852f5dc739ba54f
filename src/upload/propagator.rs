use tracing::debug;

use crate::analysis::AnalysisResult;

pub type AnalysisCallback = Box<dyn FnMut(AnalysisResult) + Send>;

/// Hands results to the host. Keeps nothing.
#[derive(Default)]
pub struct ResultPropagator {
    callback: Option<AnalysisCallback>,
}

impl ResultPropagator {
    pub fn new(callback: Option<AnalysisCallback>) -> Self {
        Self { callback }
    }

    pub fn set_callback(&mut self, callback: AnalysisCallback) {
        self.callback = Some(callback);
    }

    /// Returns whether a callback received the result.
    pub fn propagate(&mut self, result: AnalysisResult) -> bool {
        match self.callback.as_mut() {
            Some(callback) => {
                callback(result);
                true
            }
            None => {
                debug!("No analysis callback configured, dropping result");
                false
            }
        }
    }
}
