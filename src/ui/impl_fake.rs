use crate::ranker::Ranked;
use crate::ui::interface::{ModalView, Ui};
use std::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    LoadingStatus { text: String, visible: bool },
    ResultList(Vec<Ranked>),
    Modal { modal: Option<ModalView>, visible: bool },
    Warning(String),
}

/// Records every call so tests can inspect what was shown.
#[derive(Debug, Default)]
pub struct UiFake {
    pub calls: Vec<UiCall>,
}

impl UiFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                UiCall::Warning(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_result_list(&self) -> Option<&Vec<Ranked>> {
        self.calls.iter().rev().find_map(|call| match call {
            UiCall::ResultList(results) => Some(results),
            _ => None,
        })
    }

    pub fn last_modal(&self) -> Option<(&Option<ModalView>, bool)> {
        self.calls.iter().rev().find_map(|call| match call {
            UiCall::Modal { modal, visible } => Some((modal, *visible)),
            _ => None,
        })
    }

    pub fn last_loading_status(&self) -> Option<(&str, bool)> {
        self.calls.iter().rev().find_map(|call| match call {
            UiCall::LoadingStatus { text, visible } => Some((text.as_str(), *visible)),
            _ => None,
        })
    }
}

impl Ui for UiFake {
    fn render_loading_status(&mut self, text: &str, visible: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.calls.push(UiCall::LoadingStatus {
            text: text.to_string(),
            visible,
        });
        Ok(())
    }

    fn render_result_list(&mut self, results: &[Ranked]) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.calls.push(UiCall::ResultList(results.to_vec()));
        Ok(())
    }

    fn render_modal(
        &mut self,
        modal: Option<&ModalView>,
        visible: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.calls.push(UiCall::Modal {
            modal: modal.cloned(),
            visible,
        });
        Ok(())
    }

    fn show_warning(&mut self, message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.calls.push(UiCall::Warning(message.to_string()));
        Ok(())
    }
}
