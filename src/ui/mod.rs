pub mod status_window;
pub mod window_presenter;
