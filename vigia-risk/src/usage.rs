use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::info;

/// One recorded narrative-provider call
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub operation: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

/// Aggregate usage figures
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: f64,
    pub per_operation: BTreeMap<String, u64>,
}

/// Tracks token usage and cost of narrative-provider calls. Rates are
/// per million tokens.
pub struct UsageTracker {
    input_rate: f64,
    output_rate: f64,
    requests: Mutex<Vec<RequestRecord>>,
}

impl UsageTracker {
    pub fn new(input_rate: f64, output_rate: f64) -> Self {
        Self {
            input_rate,
            output_rate,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn record_request(
        &self,
        model: &str,
        operation: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) {
        let cost = input_tokens as f64 * self.input_rate / 1_000_000.0
            + output_tokens as f64 * self.output_rate / 1_000_000.0;
        info!(
            model,
            operation, input_tokens, output_tokens, cost, "narrative provider usage"
        );
        let mut requests = self.requests.lock().expect("usage tracker poisoned");
        requests.push(RequestRecord {
            timestamp: Utc::now(),
            model: model.to_string(),
            operation: operation.to_string(),
            input_tokens,
            output_tokens,
            cost,
        });
    }

    pub fn cumulative_stats(&self) -> UsageStats {
        let requests = self.requests.lock().expect("usage tracker poisoned");
        let mut stats = UsageStats::default();
        for record in requests.iter() {
            stats.total_requests += 1;
            stats.input_tokens += record.input_tokens;
            stats.output_tokens += record.output_tokens;
            stats.total_cost += record.cost;
            *stats
                .per_operation
                .entry(record.operation.clone())
                .or_insert(0) += 1;
        }
        stats
    }

    pub fn reset(&self) {
        self.requests.lock().expect("usage tracker poisoned").clear();
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
