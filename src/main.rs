use art_classifier::core::Event;
use art_classifier::main::ArtClassifier;
use config::Config;
use library::logger::{impl_console::LoggerConsole, interface::Logger};
use model_gateway::gateway::ModelGateway;
use model_gateway::impl_fake::ModelLoaderFake;
use model_gateway::impl_tract::ModelLoaderTract;
use model_gateway::interface::ModelLoader;
use std::sync::{Arc, Mutex};
use ui::impl_gui::UiGui;

mod art_classifier;
mod config;
mod error;
mod image_source;
mod inference_session;
mod library;
mod model_gateway;
mod preprocess;
mod ranker;
mod tensor;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = Config::default();

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let loader: Arc<dyn ModelLoader> = match std::env::args().nth(1) {
        Some(model_source) => {
            config.model_source = model_source;
            Arc::new(ModelLoaderTract::new(logger.clone(), config.input_size))
        }
        None => {
            logger.warn("No model path given, scoring images with random probabilities")?;
            Arc::new(ModelLoaderFake::new(
                logger.clone(),
                config.labels.len(),
                config.input_size,
            ))
        }
    };

    let gateway = Arc::new(ModelGateway::new(
        config.model_source.clone(),
        loader,
        logger.clone(),
    ));

    let ui = UiGui::new();

    let art_classifier = ArtClassifier::new(
        config,
        logger.clone(),
        gateway,
        Arc::new(Mutex::new(ui.clone())),
    );

    let events = art_classifier.sender();

    std::thread::spawn(move || {
        if let Err(e) = art_classifier.run() {
            let _ = art_classifier
                .logger
                .error(&format!("Event loop stopped: {}", e));
        }
    });

    ui.run_window(events.clone())?;

    let _ = events.send(Event::Quit);

    Ok(())
}
