use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use tably_core::ServiceError;

use crate::model::Language;

/// Backend that produces a menu item description.
///
/// Implementations are opaque to the rest of the system: the editor only
/// ever sees "a suggestion" or "no suggestion" (the empty string).
#[async_trait]
pub trait Suggester: Send + Sync {
    async fn generate(
        &self,
        item_name: &str,
        category_name: &str,
        lang: Language,
    ) -> Result<String, ServiceError>;
}

// ---------------------------------------------------------------------------
// HTTP backend
// ---------------------------------------------------------------------------

/// Configuration for the HTTP suggestion backend.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestConfig {
    /// Endpoint accepting `{"model": ..., "prompt": ...}` and answering
    /// `{"text": ...}`.
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

/// Suggester that calls a generative-text HTTP endpoint.
pub struct HttpSuggester {
    client: reqwest::Client,
    config: SuggestConfig,
}

impl HttpSuggester {
    pub fn new(config: SuggestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

fn language_name(lang: Language) -> &'static str {
    match lang {
        Language::Uz => "Uzbek",
        Language::Ru => "Russian",
        Language::En => "English",
    }
}

#[async_trait]
impl Suggester for HttpSuggester {
    async fn generate(
        &self,
        item_name: &str,
        category_name: &str,
        lang: Language,
    ) -> Result<String, ServiceError> {
        let prompt = format!(
            "Act as a world-class culinary copywriter. Write a mouth-watering, \
             appetizing, 2-sentence description for a menu item named \"{}\" in \
             the category \"{}\". Write it in {} language. Do not use quotes.",
            item_name,
            category_name,
            language_name(lang),
        );

        let mut request = self.client.post(&self.config.endpoint).json(&serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
        }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("suggestion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ServiceError::Internal(format!(
                "suggestion endpoint returned {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Internal(format!("suggestion response parse failed: {e}")))?;

        Ok(body["text"].as_str().unwrap_or("").trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// SuggestService — in-flight tracking
// ---------------------------------------------------------------------------

/// Wraps a [`Suggester`] with at-most-one outstanding request per
/// (item, language) pair.
///
/// A duplicate concurrent request returns empty immediately, and every
/// backend failure degrades to the empty string, so a slow or broken
/// backend can never block or corrupt menu editing.
pub struct SuggestService {
    backend: Option<Arc<dyn Suggester>>,
    in_flight: Arc<Mutex<HashSet<(String, Language)>>>,
}

impl SuggestService {
    pub fn new(backend: Option<Arc<dyn Suggester>>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Request a description suggestion.
    ///
    /// Returns the empty string when no backend is configured, when a
    /// request for the same (item, language) is already outstanding, or
    /// when the backend fails.
    pub async fn suggest(
        &self,
        item_id: &str,
        item_name: &str,
        category_name: &str,
        lang: Language,
    ) -> String {
        let Some(backend) = &self.backend else {
            return String::new();
        };

        let key = (item_id.to_string(), lang);
        {
            let mut in_flight = self.in_flight.lock().expect("in-flight lock poisoned");
            if !in_flight.insert(key.clone()) {
                debug!("suggestion for ({item_id}, {lang}) already in flight, skipping");
                return String::new();
            }
        }
        // Release the slot on every exit path, including cancellation.
        let _slot = InFlightSlot {
            set: Arc::clone(&self.in_flight),
            key,
        };

        match backend.generate(item_name, category_name, lang).await {
            Ok(text) => text,
            Err(e) => {
                warn!("description suggestion failed: {e}");
                String::new()
            }
        }
    }
}

struct InFlightSlot {
    set: Arc<Mutex<HashSet<(String, Language)>>>,
    key: (String, Language),
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowSuggester {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Suggester for SlowSuggester {
        async fn generate(
            &self,
            item_name: &str,
            _category_name: &str,
            _lang: Language,
        ) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(format!("A delightful {item_name}."))
        }
    }

    struct FailingSuggester;

    #[async_trait]
    impl Suggester for FailingSuggester {
        async fn generate(
            &self,
            _item_name: &str,
            _category_name: &str,
            _lang: Language,
        ) -> Result<String, ServiceError> {
            Err(ServiceError::Internal("backend down".into()))
        }
    }

    #[tokio::test]
    async fn unconfigured_returns_empty() {
        let service = SuggestService::new(None);
        assert_eq!(
            service.suggest("1", "Plov", "Lunch", Language::En).await,
            ""
        );
    }

    #[tokio::test]
    async fn failure_returns_empty() {
        let service = SuggestService::new(Some(Arc::new(FailingSuggester)));
        assert_eq!(
            service.suggest("1", "Plov", "Lunch", Language::En).await,
            ""
        );
    }

    #[tokio::test]
    async fn duplicate_concurrent_request_is_skipped() {
        let backend = Arc::new(SlowSuggester {
            calls: AtomicUsize::new(0),
        });
        let service = SuggestService::new(Some(Arc::clone(&backend) as Arc<dyn Suggester>));

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.suggest("1", "Plov", "Lunch", Language::En).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Same (item, language): skipped while the first is outstanding.
        assert_eq!(
            service.suggest("1", "Plov", "Lunch", Language::En).await,
            ""
        );
        // Different language: allowed.
        assert_eq!(
            service.suggest("1", "Plov", "Lunch", Language::Ru).await,
            "A delightful Plov."
        );

        assert_eq!(first.await.unwrap(), "A delightful Plov.");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

        // Slot is released once the first request finishes.
        assert_eq!(
            service.suggest("1", "Plov", "Lunch", Language::En).await,
            "A delightful Plov."
        );
    }
}
