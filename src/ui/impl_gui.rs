use crate::art_classifier::core::Event;
use crate::error::ImageSourceError;
use crate::image_source::ImageSource;
use crate::ranker::Ranked;
use crate::ui::interface::{ModalView, Ui};
use eframe::egui;
use std::error::Error;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct GuiBuffer {
    loading_status: Option<String>,
    results: Vec<Ranked>,
    modal: Option<ModalView>,
    modal_visible: bool,
    warning: Option<String>,
}

struct ClassifierWindow {
    buffer: Arc<Mutex<GuiBuffer>>,
    events: Sender<Event>,
    path_input: String,
    preview: Option<egui::TextureHandle>,
    modal_texture: Option<(Arc<ImageSource>, egui::TextureHandle)>,
}

fn texture(ctx: &egui::Context, name: &str, image: &ImageSource) -> Option<egui::TextureHandle> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    Some(ctx.load_texture(
        name,
        egui::ColorImage::from_rgb([image.width(), image.height()], image.pixels.as_raw()),
        egui::TextureOptions::default(),
    ))
}

impl ClassifierWindow {
    fn send(&self, event: Event) {
        // the loop only stops after the window closes
        let _ = self.events.send(event);
    }

    fn warn(&self, message: String) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .warning = Some(message);
    }

    fn select(&mut self, ctx: &egui::Context, loaded: Result<ImageSource, ImageSourceError>) {
        match loaded {
            Ok(image) => {
                self.preview = texture(ctx, "preview", &image);
                self.send(Event::ImageSelected(Arc::new(image)));
            }
            Err(e) => self.warn(e.to_string()),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        if let Some(bytes) = &file.bytes {
            self.select(ctx, ImageSource::from_bytes(file.name.clone(), bytes));
        } else if let Some(path) = &file.path {
            self.path_input = path.display().to_string();
            self.select(ctx, ImageSource::open(path));
        }
    }

    fn open_path(&mut self, ctx: &egui::Context) {
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            self.preview = None;
            self.send(Event::ImageCleared);
            return;
        }
        self.select(ctx, ImageSource::open(Path::new(&path)));
    }

    /// Texture of the image the result belongs to, rebuilt only when the
    /// rendered modal points at a different image.
    fn modal_texture(&mut self, ctx: &egui::Context, image: &Arc<ImageSource>) -> Option<egui::TextureHandle> {
        if let Some((shown, handle)) = &self.modal_texture {
            if Arc::ptr_eq(shown, image) {
                return Some(handle.clone());
            }
        }

        let handle = texture(ctx, "result", image)?;
        self.modal_texture = Some((image.clone(), handle.clone()));
        Some(handle)
    }
}

impl eframe::App for ClassifierWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        let (loading_status, results, modal, warning) = {
            let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            let modal = if buffer.modal_visible {
                buffer.modal.clone()
            } else {
                None
            };
            (
                buffer.loading_status.clone(),
                buffer.results.clone(),
                modal,
                buffer.warning.clone(),
            )
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Art movement classifier");

                if let Some(text) = &loading_status {
                    ui.label(text.as_str());
                }

                ui.add_space(12.0);

                let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
                let fill = if hovering {
                    egui::Color32::from_rgb(240, 240, 240)
                } else {
                    egui::Color32::TRANSPARENT
                };
                egui::Frame::none()
                    .fill(fill)
                    .stroke(egui::Stroke::new(2.0, egui::Color32::from_rgb(100, 100, 100)))
                    .inner_margin(24.0)
                    .show(ui, |ui| {
                        ui.label("Drop an image here");
                    });

                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.path_input);
                    if ui.button("Open").clicked() {
                        self.open_path(ctx);
                    }
                });

                if let Some(preview) = &self.preview {
                    ui.add(egui::Image::from_texture(preview).max_width(256.0));
                }

                if ui.button("Predict").clicked() {
                    self.send(Event::PredictRequested);
                }

                if !results.is_empty() {
                    ui.add_space(12.0);
                    ui.heading("Classification result");
                    for ranked in &results {
                        ui.label(
                            egui::RichText::new(format!("{} - {}", ranked.label, ranked.percent()))
                                .strong()
                                .size(18.0),
                        );
                    }
                }
            });
        });

        if let Some(modal) = modal {
            let result_texture = self.modal_texture(ctx, &modal.image);
            let mut open = true;
            egui::Window::new("Result")
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .show(ctx, |ui| {
                    if let Some(result_texture) = &result_texture {
                        ui.add(egui::Image::from_texture(result_texture).max_width(320.0));
                    }
                    ui.label(
                        egui::RichText::new(format!(
                            "{} - {}",
                            modal.top_label, modal.top_score_percent
                        ))
                        .size(20.0),
                    );
                });
            if !open {
                self.send(Event::ModalDismissRequested);
            }
        }

        if let Some(message) = warning {
            egui::Window::new("Warning")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(message.as_str());
                    if ui.button("OK").clicked() {
                        self.buffer
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .warning = None;
                    }
                });
        }

        // renders arrive from the event loop thread
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

#[derive(Clone)]
pub struct UiGui {
    buffer: Arc<Mutex<GuiBuffer>>,
}

impl UiGui {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(GuiBuffer::default())),
        }
    }

    /// Opens the window and blocks until it is closed. Must be called from
    /// the main thread.
    pub fn run_window(&self, events: Sender<Event>) -> Result<(), Box<dyn Error + Send + Sync>> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 720.0]),
            ..Default::default()
        };

        let window = ClassifierWindow {
            buffer: self.buffer.clone(),
            events,
            path_input: String::new(),
            preview: None,
            modal_texture: None,
        };

        eframe::run_native(
            "Art Movement Classifier",
            options,
            Box::new(|_cc| Box::new(window)),
        )
        .map_err(|e| e.to_string())?;

        Ok(())
    }

    fn buffer(&self) -> Result<std::sync::MutexGuard<'_, GuiBuffer>, Box<dyn Error + Send + Sync>> {
        Ok(self.buffer.lock().map_err(|e| e.to_string())?)
    }
}

impl Ui for UiGui {
    fn render_loading_status(&mut self, text: &str, visible: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.buffer()?.loading_status = visible.then(|| text.to_string());
        Ok(())
    }

    fn render_result_list(&mut self, results: &[Ranked]) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.buffer()?.results = results.to_vec();
        Ok(())
    }

    fn render_modal(
        &mut self,
        modal: Option<&ModalView>,
        visible: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut buffer = self.buffer()?;
        buffer.modal = modal.cloned();
        buffer.modal_visible = visible;
        Ok(())
    }

    fn show_warning(&mut self, message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.buffer()?.warning = Some(message.to_string());
        Ok(())
    }
}
