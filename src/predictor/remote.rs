//! HTTP profiling-service predictor, grounded on
//! `inference/embedder.rs`'s and `orchestration/backends/claude.rs`'s use
//! of `ureq::AgentBuilder` for blocking JSON requests.
//!
//! Posts the operation to `{base_url}/generate_workload` and interprets
//! the JSON response per the protocol in `SPEC_FULL.md` §6: a `cycles`
//! field on success, or a `reserved_error_code` field naming why the
//! workload couldn't be run (mapped below, never a bare HTTP error in
//! that case).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;
use crate::predictor::{CostEstimate, Predictor, PredictorError};
use crate::workload::OperationRecord;

#[derive(Debug, Clone)]
pub struct RemotePredictorConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RemotePredictorConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8080".to_string(), timeout: Duration::from_secs(30) }
    }
}

pub struct RemotePredictor {
    config: RemotePredictorConfig,
}

impl RemotePredictor {
    pub fn new(config: RemotePredictorConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Serialize)]
struct GenerateWorkloadRequest {
    fingerprint: u32,
    device: String,
    op: String,
    exec_mode: String,
    input_0_shape: [u32; 4],
    output_0_shape: [u32; 4],
}

#[derive(Debug, Deserialize)]
struct GenerateWorkloadResponse {
    #[serde(default)]
    cycles: Option<f64>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    reserved_error_code: Option<String>,
}

impl Predictor for RemotePredictor {
    fn predict(&self, record: &OperationRecord) -> Result<CostEstimate, PredictorError> {
        let client = ureq::AgentBuilder::new().timeout(self.config.timeout).build();

        let request = GenerateWorkloadRequest {
            fingerprint: fingerprint(&record.to_workload()),
            device: record.device.to_string(),
            op: record.op.to_string(),
            exec_mode: record.exec_mode.to_string(),
            input_0_shape: record.input_0.shape,
            output_0_shape: record.output_0.shape,
        };

        let response = client
            .post(&format!("{}/generate_workload", self.config.base_url))
            .send_json(request)
            .map_err(|e| match e {
                ureq::Error::Status(status, resp) => {
                    PredictorError::ServiceError { status, body: resp.into_string().unwrap_or_default() }
                }
                ureq::Error::Transport(t) => PredictorError::Network(t.to_string()),
                #[allow(unreachable_patterns)]
                other => PredictorError::Network(other.to_string()),
            })?;

        let body: GenerateWorkloadResponse = response
            .into_json()
            .map_err(|e| PredictorError::MalformedResponse(e.to_string()))?;

        if let Some(code) = body.reserved_error_code {
            return Err(PredictorError::Unrunnable(code));
        }

        let cycles = body.cycles.ok_or_else(|| {
            PredictorError::MalformedResponse("response carried neither cycles nor reserved_error_code".to_string())
        })?;

        Ok(CostEstimate { cycles, confidence: body.confidence })
    }

    fn name(&self) -> &str {
        "remote-http-profiler"
    }
}
