use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[async_trait]
pub trait Runnable: Send + Sized + 'static {
    /// Spawns the unit on the runtime; sending on the returned channel asks it to stop.
    fn run(self) -> (oneshot::Sender<()>, JoinHandle<()>) {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(self.run_impl(shutdown_rx));

        (shutdown_tx, handle)
    }

    async fn run_impl(self, shutdown_rx: oneshot::Receiver<()>);
}
