use crate::endpoints::Endpoints;
use crate::error::Result;
use assurconnect_core::{Lead, LeadSink};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub enabled: bool,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(10),
            user_agent: "assurconnect".to_string(),
        }
    }
}

/// Forwards each new lead to the webhook of its category.
///
/// One POST per lead, run as a task on the runtime the dispatcher was built
/// with. Responses are not inspected and nothing is retried: a lead that
/// fails to go out is only logged, since the local store is the record of
/// truth.
pub struct WebhookDispatcher {
    client: Client,
    endpoints: Endpoints,
    enabled: bool,
    runtime: Handle,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl WebhookDispatcher {
    pub fn new(endpoints: Endpoints, settings: DispatchSettings, runtime: Handle) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent)
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            endpoints,
            enabled: settings.enabled,
            runtime,
            in_flight: Mutex::new(Vec::new()),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Starts sending `lead` and returns the task, or `None` when nothing
    /// was sent (dispatch disabled, no endpoint for the category).
    pub fn dispatch_detached(&self, lead: &Lead) -> Option<JoinHandle<()>> {
        if !self.enabled {
            debug!(id = %lead.id, "lead dispatch disabled");
            return None;
        }

        let Some(url) = self.endpoints.resolve(lead.category) else {
            warn!(
                id = %lead.id,
                category = %lead.category,
                "no webhook configured for category, lead kept locally only"
            );
            return None;
        };

        let body = match serde_json::to_vec(lead) {
            Ok(body) => body,
            Err(err) => {
                error!(id = %lead.id, error = %err, "failed to encode lead for dispatch");
                return None;
            }
        };

        let client = self.client.clone();
        let url = url.clone();
        let id = lead.id;
        let category = lead.category;
        Some(self.runtime.spawn(async move {
            match post_lead(&client, url, body).await {
                Ok(status) => {
                    info!(id = %id, category = %category, "lead sent to webhook");
                    debug!(id = %id, status = %status, "webhook responded");
                }
                Err(err) => {
                    error!(id = %id, category = %category, error = %err, "failed to send lead to webhook");
                }
            }
        }))
    }

    /// Waits for dispatches still in flight, up to `timeout`. Returns false
    /// when some were abandoned.
    ///
    /// Only for process shutdown; callers of the store never wait on this.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let pending = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *in_flight)
        };
        if pending.is_empty() {
            return true;
        }

        let count = pending.len();
        let wait = async move {
            for task in pending {
                if let Err(err) = task.await {
                    warn!(error = %err, "lead dispatch task ended abnormally");
                }
            }
        };
        match tokio::time::timeout(timeout, wait).await {
            Ok(()) => true,
            Err(_) => {
                warn!(pending = count, "gave up waiting for lead dispatch");
                false
            }
        }
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|pending| !pending.is_finished());
        in_flight.push(task);
    }
}

impl LeadSink for WebhookDispatcher {
    fn dispatch(&self, lead: &Lead) {
        if let Some(task) = self.dispatch_detached(lead) {
            self.track(task);
        }
    }
}

async fn post_lead(client: &Client, url: Url, body: Vec<u8>) -> Result<StatusCode> {
    let response = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;
    Ok(response.status())
}
