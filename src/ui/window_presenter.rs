use crate::interface::presenter::Presenter;
use crate::model::status::StatusSnapshot;
use eframe::egui;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

/// State shared between the controller task and the window thread.
#[derive(Default)]
pub struct WindowState {
    snapshot: RwLock<Option<StatusSnapshot>>,
    notices: Mutex<Vec<String>>,
    hidden: AtomicBool,
    context: OnceLock<egui::Context>,
}

impl WindowState {
    pub fn attach(&self, context: egui::Context) {
        let _ = self.context.set(context);
    }

    pub fn snapshot(&self) -> Option<StatusSnapshot> {
        self.snapshot.read().ok().and_then(|snapshot| snapshot.clone())
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn dismiss_notice(&self, index: usize) {
        if let Ok(mut notices) = self.notices.lock() {
            if index < notices.len() {
                notices.remove(index);
            }
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    fn set_visible(&self, visible: bool) {
        self.hidden.store(!visible, Ordering::SeqCst);
        // A hidden viewport gets no update calls, so commands go straight to the context.
        if let Some(context) = self.context.get() {
            context.send_viewport_cmd(egui::ViewportCommand::Visible(visible));
            if visible {
                context.send_viewport_cmd(egui::ViewportCommand::Focus);
            }
            context.request_repaint();
        }
    }

    fn repaint(&self) {
        if let Some(context) = self.context.get() {
            context.request_repaint();
        }
    }
}

pub struct WindowPresenter {
    state: Arc<WindowState>,
}

impl WindowPresenter {
    pub fn new(state: Arc<WindowState>) -> Self {
        Self { state }
    }
}

impl Presenter for WindowPresenter {
    fn refresh(&self, snapshot: StatusSnapshot) {
        if let Ok(mut current) = self.state.snapshot.write() {
            *current = Some(snapshot);
        }
        self.state.repaint();
    }

    fn hide(&self) {
        self.state.set_visible(false);
    }

    fn unhide(&self) {
        self.state.set_visible(true);
    }

    fn invalid_action(&self, notice: String) {
        if let Ok(mut notices) = self.state.notices.lock() {
            notices.push(notice);
        }
        self.state.repaint();
    }
}
