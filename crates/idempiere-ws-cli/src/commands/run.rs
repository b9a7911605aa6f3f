//! `run` command

use super::ProcessArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{print_single, InvocationReport, OutputFormat};
use idempiere_ws_client::{
    InvocationEvent, InvocationObserver, ProcessClient, TracingObserver, TruncationAdvisory,
};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Invoke the process and print the report. Returns whether it succeeded.
///
/// Advisories come from the envelope the client actually sent and are
/// reported once, in the report. Every other event still goes to `tracing`.
pub async fn execute(
    args: ProcessArgs,
    config: &CliConfig,
    format: OutputFormat,
) -> CliResult<bool> {
    let params = args.params_value()?;

    let advisories: Arc<Mutex<Vec<TruncationAdvisory>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = advisories.clone();
    let client = ProcessClient::new(&config.client)?.with_observer(Arc::new(
        move |event: &InvocationEvent| match event {
            InvocationEvent::TruncationAdvisory { advisory, .. } => {
                if let Ok(mut collected) = sink.lock() {
                    collected.push(advisory.clone());
                }
            }
            other => TracingObserver.on_event(other),
        },
    ));
    debug!(endpoint = %client.endpoint(), process = %args.process, "Running process");

    let result = client
        .invoke_process_value(&args.process, &config.context_value(), &params)
        .await;

    let advisories = advisories
        .lock()
        .map(|collected| collected.clone())
        .unwrap_or_default();

    let report = InvocationReport::new(&args.process, &result, advisories);
    match format {
        OutputFormat::Text => report.print_text(),
        _ => print_single(&report, format)?,
    }

    Ok(report.ok)
}
