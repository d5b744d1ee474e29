use crate::art_classifier::core::{ImageState, State};
use crate::ui::interface::{ModalView, Ui};
use std::error::Error;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Render {
    ui: Arc<Mutex<dyn Ui + Send + Sync>>,
}

impl Render {
    pub fn new(ui: Arc<Mutex<dyn Ui + Send + Sync>>) -> Self {
        Self { ui }
    }

    pub fn render(&self, state: &State) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut ui = self.ui.lock().map_err(|e| e.to_string())?;

        ui.render_loading_status(&state.loading_status.text, state.loading_status.visible)?;

        match &state.image {
            ImageState::ImageSelected {
                image,
                result: Some(result),
            } => {
                ui.render_result_list(result)?;

                let modal = result.first().map(|top| ModalView {
                    image: image.clone(),
                    top_label: top.label.clone(),
                    top_score_percent: top.percent(),
                });
                let visible = state.modal_visible && modal.is_some();
                ui.render_modal(modal.as_ref(), visible)?;
            }
            // nothing ranked for the current image yet
            _ => {
                ui.render_result_list(&[])?;
                ui.render_modal(None, false)?;
            }
        }

        Ok(())
    }
}
