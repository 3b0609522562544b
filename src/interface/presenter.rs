use crate::model::status::StatusSnapshot;

/// The window side of the controller. Calls must not block.
pub trait Presenter: Send + Sync {
    fn refresh(&self, snapshot: StatusSnapshot);

    fn hide(&self);

    fn unhide(&self);

    fn invalid_action(&self, notice: String);
}
