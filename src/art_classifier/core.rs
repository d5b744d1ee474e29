use crate::config::Config;
use crate::error::{ModelLoadError, PipelineError, PreconditionViolation};
use crate::image_source::ImageSource;
use crate::ranker::RankedResult;
use std::sync::Arc;
use std::time::Duration;

pub const LOADING_TEXT: &str = "Loading model...";
pub const LOADED_TEXT: &str = "Model loaded!";
pub const LOAD_FAILED_TEXT: &str = "Failed to load model.";

#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    Idle,
    ImageSelected {
        image: Arc<ImageSource>,
        result: Option<RankedResult>,
    },
    Predicting {
        image: Arc<ImageSource>,
        request: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadingStatus {
    pub text: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub model: ModelState,
    pub image: ImageState,
    /// Request id of the session currently running, if any. Outlives
    /// `ImageState::Predicting` when a new image is picked mid-flight.
    pub in_flight: Option<u64>,
    pub next_request: u64,
    pub loading_status: LoadingStatus,
    pub modal_visible: bool,
}

#[derive(Debug)]
pub enum Event {
    ImageSelected(Arc<ImageSource>),
    ImageCleared,
    PredictRequested,
    ModalDismissRequested,
    ModelLoadDone(Result<(), ModelLoadError>),
    LoadingStatusExpired,
    PredictDone {
        request: u64,
        result: Result<RankedResult, PipelineError>,
    },
    Quit,
}

impl Event {
    pub fn to_display_string(&self) -> String {
        match self {
            Event::PredictDone {
                request,
                result: Ok(result),
            } => format!(
                "PredictDone {{ request: {}, top: {:?} }}",
                request,
                result.first().map(|r| (&r.label, r.score))
            ),
            event => format!("{:?}", event),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadModel,
    HideLoadingStatus { after: Duration },
    Predict { request: u64, image: Arc<ImageSource> },
    ShowWarning { message: String },
}

impl Effect {
    pub fn to_display_string(&self) -> String {
        format!("{:?}", self)
    }
}

pub fn init() -> (State, Vec<Effect>) {
    (
        State {
            model: ModelState::Loading,
            image: ImageState::Idle,
            in_flight: None,
            next_request: 0,
            loading_status: LoadingStatus {
                text: LOADING_TEXT.to_string(),
                visible: true,
            },
            modal_visible: false,
        },
        vec![Effect::LoadModel],
    )
}

fn check_can_predict(state: &State) -> Result<Arc<ImageSource>, PreconditionViolation> {
    match state.model {
        ModelState::Loading => return Err(PreconditionViolation::ModelLoading),
        ModelState::Failed => return Err(PreconditionViolation::ModelFailed),
        ModelState::Ready => {}
    }

    if state.in_flight.is_some() {
        return Err(PreconditionViolation::PredictionInFlight);
    }

    match &state.image {
        ImageState::ImageSelected { image, .. } => Ok(image.clone()),
        ImageState::Predicting { .. } => Err(PreconditionViolation::PredictionInFlight),
        ImageState::Idle => Err(PreconditionViolation::NoImageSelected),
    }
}

fn warn(message: impl ToString) -> Effect {
    Effect::ShowWarning {
        message: message.to_string(),
    }
}

pub fn transition(config: &Config, state: State, event: Event) -> (State, Vec<Effect>) {
    match event {
        Event::ModelLoadDone(Ok(())) => (
            State {
                model: ModelState::Ready,
                loading_status: LoadingStatus {
                    text: LOADED_TEXT.to_string(),
                    visible: true,
                },
                ..state
            },
            vec![Effect::HideLoadingStatus {
                after: config.loading_status_hide_after,
            }],
        ),
        Event::ModelLoadDone(Err(e)) => (
            State {
                model: ModelState::Failed,
                loading_status: LoadingStatus {
                    text: LOAD_FAILED_TEXT.to_string(),
                    visible: true,
                },
                ..state
            },
            vec![warn(&e)],
        ),
        Event::LoadingStatusExpired => match state.model {
            ModelState::Failed => (state, vec![]),
            _ => (
                State {
                    loading_status: LoadingStatus {
                        visible: false,
                        ..state.loading_status.clone()
                    },
                    ..state
                },
                vec![],
            ),
        },

        Event::ImageSelected(image) => (
            State {
                image: ImageState::ImageSelected {
                    image,
                    result: None,
                },
                modal_visible: false,
                ..state
            },
            vec![],
        ),
        Event::ImageCleared => (
            State {
                image: ImageState::Idle,
                modal_visible: false,
                ..state
            },
            vec![],
        ),

        Event::PredictRequested => match check_can_predict(&state) {
            Ok(image) => {
                let request = state.next_request;
                (
                    State {
                        image: ImageState::Predicting {
                            image: image.clone(),
                            request,
                        },
                        in_flight: Some(request),
                        next_request: request + 1,
                        ..state
                    },
                    vec![Effect::Predict { request, image }],
                )
            }
            Err(violation) => (state, vec![warn(violation)]),
        },
        Event::PredictDone { request, result } => {
            if state.in_flight != Some(request) {
                return (state, vec![]);
            }

            match state.image.clone() {
                ImageState::Predicting {
                    image,
                    request: current,
                } if current == request => match result {
                    Ok(result) => (
                        State {
                            image: ImageState::ImageSelected {
                                image,
                                result: Some(result),
                            },
                            in_flight: None,
                            modal_visible: true,
                            ..state
                        },
                        vec![],
                    ),
                    Err(e) => (
                        State {
                            image: ImageState::ImageSelected {
                                image,
                                result: None,
                            },
                            in_flight: None,
                            ..state
                        },
                        vec![warn(e)],
                    ),
                },
                // image was replaced while the session ran; the result is stale
                _ => (
                    State {
                        in_flight: None,
                        ..state
                    },
                    vec![],
                ),
            }
        }
        Event::ModalDismissRequested => (
            State {
                modal_visible: false,
                ..state
            },
            vec![],
        ),

        Event::Quit => (state, vec![]),
    }
}
