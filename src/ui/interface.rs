use crate::image_source::ImageSource;
use crate::ranker::Ranked;
use std::error::Error;
use std::sync::Arc;

/// What the result dialog shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    pub image: Arc<ImageSource>,
    pub top_label: String,
    pub top_score_percent: String,
}

/// Host surface the classifier renders into.
pub trait Ui: Send + Sync {
    /// Status line shown while the model loads
    fn render_loading_status(&mut self, text: &str, visible: bool) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Ranked labels of the last classification, empty when there is none
    fn render_result_list(&mut self, results: &[Ranked]) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn render_modal(
        &mut self,
        modal: Option<&ModalView>,
        visible: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn show_warning(&mut self, message: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}
