use crate::model::error::system::SystemError;
use crate::model::log::system::SystemLog;
use crate::model::status::{StatusSnapshot, UserCommand};
use crate::ui::window_presenter::WindowState;
use eframe::egui;
use eframe::{App, CreationContext, Frame};
use macros::log;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

const BUTTON_SIZE: [f32; 2] = [90.0, 24.0];
const CLOSE_NOTICE: &str = "when you click \"Yes\" the background service will stop\n\
                            it starts again the next time the utility is launched";

pub struct StatusWindow {
    state: Arc<WindowState>,
    command_tx: UnboundedSender<UserCommand>,
    title: String,
    confirming_close: bool,
    closing: bool,
}

impl StatusWindow {
    pub fn new(
        cc: &CreationContext<'_>,
        state: Arc<WindowState>,
        command_tx: UnboundedSender<UserCommand>,
    ) -> Self {
        state.attach(cc.egui_ctx.clone());
        if state.is_hidden() {
            cc.egui_ctx
                .send_viewport_cmd(egui::ViewportCommand::Visible(false));
        }

        Self {
            state,
            command_tx,
            title: String::new(),
            confirming_close: false,
            closing: false,
        }
    }

    fn send(&self, command: UserCommand) {
        if self.command_tx.send(command).is_err() {
            log!(SystemError::ControllerStopped);
        }
    }

    fn update_title(&mut self, ctx: &egui::Context, snapshot: &StatusSnapshot) {
        let title = snapshot.title();
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }

    fn draw_status(&mut self, ctx: &egui::Context, snapshot: Option<&StatusSnapshot>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| match snapshot {
                Some(snapshot) => {
                    ui.label(snapshot.backup_line());
                    ui.label(snapshot.history_line());
                }
                None => {
                    ui.label("loading schedule");
                }
            });

            ui.add_space(4.0);

            let running = snapshot.is_some_and(|snapshot| snapshot.run.is_some());
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!running, egui::Button::new("Backup now").min_size(BUTTON_SIZE.into()))
                    .clicked()
                {
                    self.send(UserCommand::StartNow);
                }
                if ui
                    .add_enabled(!running, egui::Button::new("1 hour later").min_size(BUTTON_SIZE.into()))
                    .clicked()
                {
                    self.send(UserCommand::Postpone(1.0));
                }
                if ui
                    .add_enabled(!running, egui::Button::new("1 day later").min_size(BUTTON_SIZE.into()))
                    .clicked()
                {
                    self.send(UserCommand::Postpone(24.0));
                }
                if ui
                    .add_enabled(running, egui::Button::new("Cancel").min_size(BUTTON_SIZE.into()))
                    .clicked()
                {
                    self.send(UserCommand::Cancel);
                }
                if ui
                    .add(egui::Button::new("Hide").min_size(BUTTON_SIZE.into()))
                    .clicked()
                {
                    self.send(UserCommand::Hide);
                }
            });
        });
    }

    fn draw_notices(&self, ctx: &egui::Context) {
        for (index, notice) in self.state.notices().iter().enumerate() {
            egui::Window::new("invalid action")
                .id(egui::Id::new(("notice", index)))
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(notice);
                    if ui.button("Ok").clicked() {
                        self.state.dismiss_notice(index);
                    }
                });
        }
    }

    fn draw_close_confirmation(&mut self, ctx: &egui::Context) {
        if ctx.input(|input| input.viewport().close_requested()) && !self.closing {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.confirming_close = true;
        }
        if !self.confirming_close {
            return;
        }

        egui::Window::new("confirm close")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(CLOSE_NOTICE);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        self.send(UserCommand::Quit);
                        self.closing = true;
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.button("No").clicked() {
                        self.confirming_close = false;
                    }
                });
            });
    }
}

impl App for StatusWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let snapshot = self.state.snapshot();
        if let Some(snapshot) = &snapshot {
            self.update_title(ctx, snapshot);
        }

        ctx.request_repaint_after(Duration::from_millis(500));

        self.draw_status(ctx, snapshot.as_ref());
        self.draw_notices(ctx);
        self.draw_close_confirmation(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log!(SystemLog::GuiExited)
    }
}
