use anyhow::Result;
use async_trait::async_trait;

/// Outbound message delivery. Fire-and-forget from the pipeline's
/// perspective: send errors are logged by callers, never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<()>;
}

#[async_trait]
impl Notifier for whatsapp::WhatsAppClient {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        self.send_text(to, body).await?;
        Ok(())
    }
}
