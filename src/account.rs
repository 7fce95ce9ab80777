use reqwest::Method;

use crate::{
    types::{Account, UsageStats},
    wire, GcxClient, Result,
};

/// Account facade: balance, tier and usage statistics.
#[derive(Clone, Copy, Debug)]
pub struct AccountApi<'a> {
    client: &'a GcxClient,
}

impl<'a> AccountApi<'a> {
    pub(crate) fn new(client: &'a GcxClient) -> Self {
        Self { client }
    }

    /// Fetches current account information, including GCX balance and the
    /// account's advisory rate limits.
    pub async fn get(&self) -> Result<Account> {
        let envelope = self.client.send(Method::GET, "/account", None, &[]).await?;
        wire::decode(envelope.body)
    }

    /// Fetches usage statistics for the trailing 30 days.
    pub async fn usage(&self) -> Result<UsageStats> {
        let envelope = self
            .client
            .send(Method::GET, "/account/usage", None, &[])
            .await?;
        wire::decode(envelope.body)
    }
}
