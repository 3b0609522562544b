use crate::model::error::Error;
use crate::model::error::system::SystemError;
use crate::model::status::UserCommand;
use crate::ui::status_window::StatusWindow;
use crate::ui::window_presenter::WindowState;
use eframe::egui;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

const APP_NAME: &str = "backup util";

pub struct GuiManager {
    state: Arc<WindowState>,
    command_tx: UnboundedSender<UserCommand>,
}

impl GuiManager {
    pub fn new(state: Arc<WindowState>, command_tx: UnboundedSender<UserCommand>) -> Self {
        Self { state, command_tx }
    }

    /// Blocks the calling thread until the window is closed.
    pub fn start(&self) -> Result<(), Error> {
        let state = self.state.clone();
        let command_tx = self.command_tx.clone();

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([520.0, 110.0])
                .with_resizable(false)
                .with_title(APP_NAME),
            ..Default::default()
        };

        eframe::run_native(
            APP_NAME,
            options,
            Box::new(|cc| Ok(Box::new(StatusWindow::new(cc, state, command_tx)))),
        )
        .map_err(|err| SystemError::GuiFailed {
            reason: err.to_string(),
        })?;

        Ok(())
    }
}
