use crate::datamodel::BroadcastOutcome;
use crate::registry::ConnectionRegistry;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneSummary {
    /// Dead connections deleted from the registry.
    pub removed: Vec<String>,
    /// Dead connections that a disconnect had already removed.
    pub already_absent: Vec<String>,
    /// Dead connections the registry failed to delete. They stay registered
    /// and will be found dead again on the next broadcast.
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    #[serde(rename = "imageId")]
    pub image_id: String,
    pub total: usize,
    pub delivered: usize,
    pub transient_failures: usize,
    pub pruned: PruneSummary,
    pub outcomes: Vec<BroadcastOutcome>,
    /// Set when the record could not be broadcast at all, e.g. the registry
    /// scan failed or the batch deadline passed before it started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BroadcastReport {
    pub fn new(
        image_id: impl Into<String>,
        outcomes: Vec<BroadcastOutcome>,
        pruned: PruneSummary,
    ) -> Self {
        let delivered = outcomes.iter().filter(|o| o.delivered).count();
        let transient_failures = outcomes
            .iter()
            .filter(|o| !o.delivered && !o.dead_connection)
            .count();
        let report = Self {
            image_id: image_id.into(),
            total: outcomes.len(),
            delivered,
            transient_failures,
            pruned,
            outcomes,
            error: None,
        };
        info!(
            image_id = %report.image_id,
            total = report.total,
            delivered = report.delivered,
            transient_failures = report.transient_failures,
            pruned = report.pruned.removed.len(),
            "Broadcast finished"
        );
        report
    }

    /// Report for a record that never reached any connection.
    pub fn failed(image_id: impl Into<String>, error: impl Into<String>) -> Self {
        let report = Self {
            image_id: image_id.into(),
            total: 0,
            delivered: 0,
            transient_failures: 0,
            pruned: PruneSummary::default(),
            outcomes: Vec::new(),
            error: Some(error.into()),
        };
        warn!(
            image_id = %report.image_id,
            error = report.error.as_deref().unwrap_or_default(),
            "Broadcast skipped"
        );
        report
    }
}

/// Remove every connection a broadcast found permanently gone.
///
/// Runs after the join, one removal at a time, so the registry is only ever
/// mutated from here and never from the broadcast units themselves.
pub async fn prune_dead_connections(
    registry: &dyn ConnectionRegistry,
    outcomes: &[BroadcastOutcome],
) -> PruneSummary {
    let mut summary = PruneSummary::default();

    for outcome in outcomes.iter().filter(|o| o.dead_connection) {
        let id = outcome.connection_id.clone();
        match registry.remove(&id).await {
            Ok(true) => {
                debug!(connection_id = %id, "Pruned stale connection");
                summary.removed.push(id);
            }
            Ok(false) => summary.already_absent.push(id),
            Err(err) => {
                warn!(connection_id = %id, error = %err, "Failed to prune stale connection");
                summary.failed.push(id);
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::ConnectionRecord;
    use crate::registry::memory::MemoryRegistry;

    #[tokio::test]
    async fn test_prune_removes_only_dead_connections() {
        let registry = MemoryRegistry::new();
        for id in ["c1", "c2", "c3"] {
            registry.insert(&ConnectionRecord::new(id)).await.unwrap();
        }
        let outcomes = vec![
            BroadcastOutcome::delivered("c1"),
            BroadcastOutcome::gone("c2"),
            BroadcastOutcome::transient("c3", "HTTP 500"),
            BroadcastOutcome::gone("c4"),
        ];

        let summary = prune_dead_connections(&registry, &outcomes).await;
        assert_eq!(summary.removed, vec!["c2".to_string()]);
        assert_eq!(summary.already_absent, vec!["c4".to_string()]);
        assert!(summary.failed.is_empty());

        let remaining: Vec<String> = registry
            .scan_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&"c2".to_string()));
    }

    #[test]
    fn test_report_counts() {
        let report = BroadcastReport::new(
            "img1",
            vec![
                BroadcastOutcome::delivered("c1"),
                BroadcastOutcome::gone("c2"),
                BroadcastOutcome::transient("c3", "timeout"),
            ],
            PruneSummary::default(),
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.transient_failures, 1);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_failed_report_serialization() {
        let report = BroadcastReport::failed("img1", "registry down");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["imageId"], "img1");
        assert_eq!(json["total"], 0);
        assert_eq!(json["error"], "registry down");
        assert_eq!(json["outcomes"].as_array().map(Vec::len), Some(0));
    }
}
