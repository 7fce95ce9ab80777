use reqwest::Method;

use crate::{
    types::{CreatedWebhook, Webhook, WebhookEvent, WebhookPage},
    wire, GcxClient, GcxError, Result,
};

/// Partial update for a webhook subscription. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateWebhook {
    pub events: Option<Vec<WebhookEvent>>,
    pub active: Option<bool>,
}

impl UpdateWebhook {
    pub fn events(mut self, events: impl Into<Vec<WebhookEvent>>) -> Self {
        self.events = Some(events.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// Webhooks facade: manages webhook subscriptions.
#[derive(Clone, Copy, Debug)]
pub struct WebhooksApi<'a> {
    client: &'a GcxClient,
}

impl<'a> WebhooksApi<'a> {
    pub(crate) fn new(client: &'a GcxClient) -> Self {
        Self { client }
    }

    /// Creates a webhook subscription for an HTTPS endpoint.
    ///
    /// An empty event list subscribes to `job.completed` and `job.failed`.
    /// The returned [`CreatedWebhook::secret`] is shown only once.
    pub async fn create(
        &self,
        url: impl Into<String>,
        events: Vec<WebhookEvent>,
    ) -> Result<CreatedWebhook> {
        let events = if events.is_empty() {
            vec![WebhookEvent::JobCompleted, WebhookEvent::JobFailed]
        } else {
            events
        };
        let body = serde_json::to_value(wire::CreateWebhookBody {
            url: url.into(),
            events,
        })
        .map_err(|err| GcxError::Decode(format!("invalid webhook body: {err}")))?;
        let envelope = self
            .client
            .send(Method::POST, "/webhooks", Some(body), &[])
            .await?;
        wire::decode(envelope.body)
    }

    /// Fetches a webhook by id.
    pub async fn get(&self, webhook_id: &str) -> Result<Webhook> {
        let envelope = self
            .client
            .send(Method::GET, &format!("/webhooks/{webhook_id}"), None, &[])
            .await?;
        wire::decode(envelope.body)
    }

    /// Lists webhook subscriptions with pagination.
    pub async fn list(&self, limit: u32, offset: u32) -> Result<WebhookPage> {
        let envelope = self
            .client
            .send(
                Method::GET,
                &format!("/webhooks?limit={limit}&offset={offset}"),
                None,
                &[],
            )
            .await?;
        wire::decode(envelope.body)
    }

    /// Applies a partial update to a webhook.
    pub async fn update(&self, webhook_id: &str, update: UpdateWebhook) -> Result<Webhook> {
        let body = serde_json::to_value(wire::UpdateWebhookBody {
            events: update.events,
            active: update.active,
        })
        .map_err(|err| GcxError::Decode(format!("invalid webhook body: {err}")))?;
        let envelope = self
            .client
            .send(
                Method::PATCH,
                &format!("/webhooks/{webhook_id}"),
                Some(body),
                &[],
            )
            .await?;
        wire::decode(envelope.body)
    }

    /// Deletes a webhook subscription.
    pub async fn delete(&self, webhook_id: &str) -> Result<()> {
        self.client
            .send(Method::DELETE, &format!("/webhooks/{webhook_id}"), None, &[])
            .await?;
        Ok(())
    }

    /// Rotates the signing secret. The old secret stops validating as soon
    /// as this call returns; the new one is shown only once.
    pub async fn rotate_secret(&self, webhook_id: &str) -> Result<CreatedWebhook> {
        let envelope = self
            .client
            .send(
                Method::POST,
                &format!("/webhooks/{webhook_id}/rotate-secret"),
                None,
                &[],
            )
            .await?;
        wire::decode(envelope.body)
    }
}
