//! Privacy assistant widget state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::advisory::AdvisoryProvider;
use crate::guard::InFlight;

/// Prompts offered before the first question
pub const SUGGESTED_QUERIES: [(&str, &str); 2] = [
    ("What is FHE?", "How does FHE work in Zhash?"),
    ("Is it safe?", "Is Zama protocol safe?"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AssistantState {
    query: String,
    response: Option<String>,
}

/// Assistant widget
pub struct Assistant {
    provider: Arc<AdvisoryProvider>,
    state: Mutex<AssistantState>,
    loading: AtomicBool,
}

impl Assistant {
    pub fn new(provider: Arc<AdvisoryProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(AssistantState::default()),
            loading: AtomicBool::new(false),
        }
    }

    pub async fn query(&self) -> String {
        self.state.lock().await.query.clone()
    }

    pub async fn set_query(&self, query: &str) {
        self.state.lock().await.query = query.to_string();
    }

    /// Fill the query with one of [`SUGGESTED_QUERIES`]
    pub async fn use_suggestion(&self, index: usize) -> bool {
        match SUGGESTED_QUERIES.get(index) {
            Some((_, query)) => {
                self.set_query(query).await;
                true
            }
            None => false,
        }
    }

    pub async fn response(&self) -> Option<String> {
        self.state.lock().await.response.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Suggestions are shown until a question is in flight or answered
    pub async fn shows_suggestions(&self) -> bool {
        !self.is_loading() && self.state.lock().await.response.is_none()
    }

    /// Ask the current query. Does nothing for a blank query or while a
    /// previous question is still loading.
    pub async fn submit(&self) -> bool {
        let Some(_loading) = InFlight::acquire(&self.loading) else {
            return false;
        };
        let query = {
            let mut state = self.state.lock().await;
            if state.query.trim().is_empty() {
                return false;
            }
            state.response = None;
            state.query.clone()
        };

        let advice = self.provider.get_advice(&query).await;
        self.state.lock().await.response = advice;
        true
    }
}
