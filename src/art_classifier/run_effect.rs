use crate::art_classifier::core::{Effect, Event};
use crate::art_classifier::main::ArtClassifier;

impl ArtClassifier {
    pub fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::LoadModel => {
                let loaded = self.gateway.load();
                self.send(Event::ModelLoadDone(loaded));
            }
            Effect::HideLoadingStatus { after } => {
                std::thread::sleep(after);
                self.send(Event::LoadingStatusExpired);
            }
            Effect::Predict { request, image } => {
                let result = self.session.run(&image);
                self.send(Event::PredictDone { request, result });
            }
            Effect::ShowWarning { message } => {
                let _ = self.logger.warn(&message);
                let shown = match self.ui.lock() {
                    Ok(mut ui) => ui.show_warning(&message),
                    Err(e) => Err(e.to_string().into()),
                };
                if let Err(e) = shown {
                    let _ = self.logger.error(&format!("Could not show warning: {}", e));
                }
            }
        }
    }
}
