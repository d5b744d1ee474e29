use crate::art_classifier::core::{init, transition, Effect, Event};
use crate::art_classifier::render::Render;
use crate::config::Config;
use crate::inference_session::InferenceSession;
use crate::library::logger::interface::Logger;
use crate::model_gateway::gateway::ModelGateway;
use crate::ui::interface::Ui;
use std::error::Error;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Event loop tying the state machine to the model and the UI.
///
/// Transitions run one at a time on the thread calling `run`. Effects run on
/// their own threads and report back through the event channel.
#[derive(Clone)]
pub struct ArtClassifier {
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub gateway: Arc<ModelGateway>,
    pub session: InferenceSession,
    pub ui: Arc<Mutex<dyn Ui + Send + Sync>>,
    render: Render,
    event_sender: Sender<Event>,
    event_receiver: Arc<Mutex<Receiver<Event>>>,
}

impl ArtClassifier {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        gateway: Arc<ModelGateway>,
        ui: Arc<Mutex<dyn Ui + Send + Sync>>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let session = InferenceSession::new(
            gateway.clone(),
            config.labels.clone(),
            config.input_size,
            config.top_k,
            logger.clone(),
        );

        Self {
            render: Render::new(ui.clone()),
            logger: logger.with_namespace("app"),
            config,
            gateway,
            session,
            ui,
            event_sender,
            event_receiver: Arc::new(Mutex::new(event_receiver)),
        }
    }

    /// Handle for the UI to send commands into the loop.
    pub fn sender(&self) -> Sender<Event> {
        self.event_sender.clone()
    }

    pub(super) fn send(&self, event: Event) {
        if self.event_sender.send(event).is_err() {
            let _ = self.logger.warn("Event loop is gone, dropping event");
        }
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let self_clone = self.clone();
            std::thread::spawn(move || self_clone.run_effect(effect));
        }
    }

    /// Runs until an `Event::Quit` arrives.
    pub fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let receiver = self.event_receiver.lock().map_err(|e| e.to_string())?;
        let (mut state, effects) = init();

        self.render.render(&state)?;
        self.spawn_effects(effects);

        loop {
            let event = receiver.recv()?;
            if matches!(event, Event::Quit) {
                let _ = self.logger.info("Quit requested, stopping");
                return Ok(());
            }

            let _ = self
                .logger
                .info(&format!("Processing event: {}", event.to_display_string()));

            let (new_state, effects) = transition(&self.config, state, event);
            state = new_state;

            if !effects.is_empty() {
                let _ = self.logger.info(&format!(
                    "Effects: {:?}",
                    effects
                        .iter()
                        .map(|effect| effect.to_display_string())
                        .collect::<Vec<_>>()
                ));
            }

            self.render.render(&state)?;
            self.spawn_effects(effects);
        }
    }
}
