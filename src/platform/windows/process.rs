use tokio::process::Child;

pub async fn terminate(child: &mut Child) {
    let _ = child.kill().await;
}
