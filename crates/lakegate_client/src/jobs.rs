//! Jobs API: definitions, runs, and the run-to-completion helpers.

use serde_json::Value;
use tracing::info;

use lakegate_protocol::defaults;
use lakegate_protocol::payloads::{
    NotebookTask, RunNowRequest, SubmitRunRequest, SubmitTask, UpdateJobRequest,
};
use lakegate_protocol::RunLifeCycleState;

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::wait::{await_terminal, Clock, StatusClass, TokioClock, WaitConfig};

/// Create a job from a full settings document.
pub async fn create_job(api: &ApiClient, job_config: Value) -> Result<Value> {
    info!("Creating new job");
    api.post("/api/2.2/jobs/create", &job_config).await
}

/// Trigger an existing job now.
pub async fn run_job_now(
    api: &ApiClient,
    job_id: i64,
    notebook_params: Option<Value>,
) -> Result<Value> {
    info!("Running job: {}", job_id);
    let request = RunNowRequest {
        job_id,
        notebook_params,
    };
    api.post("/api/2.0/jobs/run-now", &request).await
}

pub async fn list_jobs(api: &ApiClient) -> Result<Value> {
    info!("Listing all jobs");
    api.get("/api/2.0/jobs/list").await
}

pub async fn get_job(api: &ApiClient, job_id: i64) -> Result<Value> {
    info!("Getting information for job: {}", job_id);
    api.get_with_query("/api/2.0/jobs/get", &serde_json::json!({"job_id": job_id}))
        .await
}

pub async fn update_job(api: &ApiClient, job_id: i64, new_settings: Value) -> Result<Value> {
    info!("Updating job: {}", job_id);
    let request = UpdateJobRequest {
        job_id,
        new_settings,
    };
    api.post("/api/2.0/jobs/update", &request).await
}

pub async fn delete_job(api: &ApiClient, job_id: i64) -> Result<Value> {
    info!("Deleting job: {}", job_id);
    api.post("/api/2.2/jobs/delete", &serde_json::json!({"job_id": job_id}))
        .await
}

pub async fn get_run(api: &ApiClient, run_id: i64) -> Result<Value> {
    info!("Getting information for run: {}", run_id);
    api.get_with_query("/api/2.1/jobs/runs/get", &serde_json::json!({"run_id": run_id}))
        .await
}

pub async fn list_runs(api: &ApiClient, job_id: Option<i64>, limit: u64) -> Result<Value> {
    info!("Listing job runs");
    let mut params = serde_json::Map::new();
    params.insert("limit".to_string(), limit.into());
    if let Some(job_id) = job_id {
        params.insert("job_id".to_string(), job_id.into());
    }
    api.get_with_query("/api/2.1/jobs/runs/list", &params).await
}

/// Concise state summary for a run: the result state when terminated,
/// otherwise the life-cycle state.
pub async fn get_run_status(api: &ApiClient, run_id: i64) -> Result<Value> {
    let info = get_run(api, run_id).await?;
    let state = &info["state"];
    let concise = state
        .get("result_state")
        .and_then(Value::as_str)
        .or_else(|| state.get("life_cycle_state").and_then(Value::as_str));

    Ok(serde_json::json!({
        "state": concise,
        "life_cycle": state.get("life_cycle_state"),
        "run_id": run_id,
    }))
}

pub async fn cancel_run(api: &ApiClient, run_id: i64) -> Result<Value> {
    info!("Cancelling run: {}", run_id);
    api.post("/api/2.1/jobs/runs/cancel", &serde_json::json!({"run_id": run_id}))
        .await
}

/// Submit a one-time run from a full run configuration.
pub async fn submit_run(api: &ApiClient, run_config: Value) -> Result<Value> {
    info!("Submitting one-time run");
    api.post("/api/2.0/jobs/runs/submit", &run_config).await
}

pub async fn get_run_output(api: &ApiClient, run_id: i64) -> Result<Value> {
    info!("Fetching output for run {}", run_id);
    api.get_with_query(
        "/api/2.0/jobs/runs/get-output",
        &serde_json::json!({"run_id": run_id}),
    )
    .await
}

/// Poll a run until it reaches `desired_state`.
///
/// `INTERNAL_ERROR` and `SKIPPED` short-circuit as failures instead of
/// burning the full deadline waiting for a state that will never arrive.
pub async fn await_run_state(
    api: &ApiClient,
    run_id: i64,
    desired_state: RunLifeCycleState,
    wait: WaitConfig,
) -> Result<Value> {
    let clock = TokioClock::default();
    await_run_state_with_clock(api, run_id, desired_state, wait, &clock).await
}

pub async fn await_run_state_with_clock<C: Clock + ?Sized>(
    api: &ApiClient,
    run_id: i64,
    desired_state: RunLifeCycleState,
    wait: WaitConfig,
    clock: &C,
) -> Result<Value> {
    let operation = format!("Job run {}", run_id);

    await_terminal(
        &operation,
        None,
        || get_run(api, run_id),
        |payload| classify_run(payload, run_id, desired_state),
        wait,
        clock,
    )
    .await
}

/// Submit a one-time notebook run, wait for it to terminate, and fetch its
/// output. The returned output payload carries the run_id for follow-up.
pub async fn run_notebook(
    api: &ApiClient,
    notebook_path: &str,
    existing_cluster_id: Option<String>,
    base_parameters: Option<Value>,
    wait: WaitConfig,
) -> Result<Value> {
    let request = SubmitRunRequest {
        tasks: vec![SubmitTask {
            task_key: "run_notebook".to_string(),
            notebook_task: NotebookTask {
                notebook_path: notebook_path.to_string(),
                base_parameters,
            },
            existing_cluster_id,
        }],
    };

    let run_config = serde_json::to_value(&request).map_err(|e| {
        Error::UnexpectedResponse(format!("Failed to serialize run submission: {}", e))
    })?;
    let submit_response = submit_run(api, run_config).await?;
    let run_id = submit_response["run_id"].as_i64().ok_or_else(|| {
        Error::UnexpectedResponse("No run_id returned from run submission".to_string())
    })?;

    await_run_state(api, run_id, RunLifeCycleState::Terminated, wait).await?;

    let mut output = get_run_output(api, run_id).await?;
    if let Some(map) = output.as_object_mut() {
        map.insert("run_id".to_string(), run_id.into());
    }
    Ok(output)
}

/// Map a run payload onto the poller's vocabulary, relative to the state the
/// caller asked to wait for.
pub(crate) fn classify_run(
    payload: &Value,
    run_id: i64,
    desired_state: RunLifeCycleState,
) -> StatusClass {
    let state = payload
        .pointer("/state/life_cycle_state")
        .and_then(Value::as_str)
        .unwrap_or("");

    if state == desired_state.as_str() {
        return StatusClass::Succeeded;
    }

    match state.parse::<RunLifeCycleState>() {
        Ok(RunLifeCycleState::InternalError) | Ok(RunLifeCycleState::Skipped) => {
            let message = payload
                .pointer("/state/state_message")
                .and_then(Value::as_str)
                .unwrap_or(defaults::UNKNOWN_ERROR_MESSAGE);
            StatusClass::Failed {
                message: format!("Run {} entered {}: {}", run_id, state, message),
            }
        }
        _ => StatusClass::Pending,
    }
}
