use serde::Serialize;
use std::fmt;

/// Stage of the thumbnail pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStage {
    Fetch,
    Decode,
    Resize,
    Encode,
    Write,
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformStage::Fetch => "fetch",
            TransformStage::Decode => "decode",
            TransformStage::Resize => "resize",
            TransformStage::Encode => "encode",
            TransformStage::Write => "write",
        };
        f.write_str(name)
    }
}

/// How a failed unit should be read by whoever re-drives the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network or service hiccup, including the batch deadline firing.
    /// Redelivering the same record may succeed.
    TransientIo,
    /// Missing or corrupt input. Redelivery will fail the same way.
    Data,
    /// The unit panicked.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransformOutcome {
    Success {
        derivative_key: String,
        width: u32,
        height: u32,
    },
    Failure {
        /// None when the unit never reported back (deadline or panic).
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<TransformStage>,
        kind: FailureKind,
        reason: String,
    },
}

/// Produced exactly once per input record of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub key: String,
    #[serde(flatten)]
    pub outcome: TransformOutcome,
}

impl TransformResult {
    pub fn success(
        key: impl Into<String>,
        derivative_key: String,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            key: key.into(),
            outcome: TransformOutcome::Success {
                derivative_key,
                width,
                height,
            },
        }
    }

    pub fn failure(
        key: impl Into<String>,
        stage: Option<TransformStage>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            outcome: TransformOutcome::Failure {
                stage,
                kind,
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TransformOutcome::Success { .. })
    }

    pub fn failed_stage(&self) -> Option<TransformStage> {
        match self.outcome {
            TransformOutcome::Failure { stage, .. } => stage,
            TransformOutcome::Success { .. } => None,
        }
    }
}
