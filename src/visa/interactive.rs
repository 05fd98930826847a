//! Interactive visa form strategy
//!
//! Drives a WebDriver session against a form-based lookup tool: selects the
//! passport and destination countries by visible label, submits, waits a
//! fixed settle delay for client-side rendering, and extracts the resulting
//! page text. The browser session is closed on every exit path so no
//! OS-level browser process leaks.
//!
//! UI automation is fragile to upstream layout changes, which is why this
//! lives behind the same [`ProviderResult`] contract as the REST adapters: a
//! future swap to an official API would not touch any consumer.

use crate::config::VisaConfig;
use crate::provider::{FailureKind, ProviderError, ProviderResult};
use async_trait::async_trait;
use fantoccini::{ClientBuilder, Locator};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::VisaStrategy;

pub(crate) const INTERACTIVE_STRATEGY_NAME: &str = "interactive_form";

/// Visa acquisition through a headless-browser form session
pub struct InteractiveFormStrategy {
    webdriver_url: String,
    form_url: String,
    passport_selector: String,
    destination_selector: String,
    submit_selector: String,
    settle: Duration,
}

impl InteractiveFormStrategy {
    pub fn new(config: &VisaConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            form_url: config.form_url.clone(),
            passport_selector: config.passport_selector.clone(),
            destination_selector: config.destination_selector.clone(),
            submit_selector: config.submit_selector.clone(),
            settle: Duration::from_secs(config.settle_seconds.into()),
        }
    }

    /// Run the form interaction inside an open session
    async fn drive(
        &self,
        client: &fantoccini::Client,
        destination: &str,
        passport: &str,
    ) -> Result<String, ProviderError> {
        let fault = |reason: String| {
            ProviderError::new(FailureKind::BrowserAutomationFault, reason, destination)
        };

        client
            .goto(&self.form_url)
            .await
            .map_err(|e| fault(format!("could not open {}: {e}", self.form_url)))?;

        let passport_select = client
            .find(Locator::Css(&self.passport_selector))
            .await
            .map_err(|e| fault(format!("passport dropdown not found: {e}")))?;
        passport_select
            .select_by_label(passport)
            .await
            .map_err(|e| fault(format!("passport option '{passport}' not selectable: {e}")))?;

        let destination_select = client
            .find(Locator::Css(&self.destination_selector))
            .await
            .map_err(|e| fault(format!("destination dropdown not found: {e}")))?;
        destination_select
            .select_by_label(destination)
            .await
            .map_err(|e| {
                fault(format!("destination option '{destination}' not selectable: {e}"))
            })?;

        let submit = client
            .find(Locator::Css(&self.submit_selector))
            .await
            .map_err(|e| fault(format!("submit control not found: {e}")))?;
        submit
            .click()
            .await
            .map_err(|e| fault(format!("could not submit lookup form: {e}")))?;

        // Fixed settle delay for client-side rendering of the result panel
        tokio::time::sleep(self.settle).await;

        let body = client
            .find(Locator::Css("body"))
            .await
            .map_err(|e| fault(format!("result page has no body: {e}")))?;
        let text = body
            .text()
            .await
            .map_err(|e| fault(format!("could not read result text: {e}")))?;

        debug!(chars = text.len(), "interactive lookup rendered");
        Ok(text)
    }
}

#[async_trait]
impl VisaStrategy for InteractiveFormStrategy {
    fn name(&self) -> &'static str {
        INTERACTIVE_STRATEGY_NAME
    }

    #[instrument(skip(self))]
    async fn acquire(&self, destination: &str, passport: &str) -> ProviderResult<String> {
        let client = match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => client,
            Err(e) => {
                warn!(%e, "could not open webdriver session");
                return ProviderResult::failure(ProviderError::new(
                    FailureKind::BrowserAutomationFault,
                    format!("could not open webdriver session: {e}"),
                    destination,
                ));
            }
        };

        let outcome = self.drive(&client, destination, passport).await;

        // Close on every exit path, including automation faults
        if let Err(e) = client.close().await {
            warn!(%e, "could not close webdriver session");
        }

        match outcome {
            Ok(text) if text.trim().is_empty() => {
                ProviderResult::failure(ProviderError::new(
                    FailureKind::BrowserAutomationFault,
                    "result page contained no readable text",
                    destination,
                ))
            }
            Ok(text) => ProviderResult::success(text),
            Err(error) => {
                warn!(%error, "interactive visa lookup failed");
                ProviderResult::failure(error)
            }
        }
    }
}
