use std::sync::Arc;

use imagefetch_core::{
    AttemptStatus, EventSink, ImageSearchEngineBuilder, MemoryEventSink, ProviderAttempt,
    SearchEvent, SearchReport,
};
use serde::Serialize;

use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SearchResponseData<'a> {
    query: &'a str,
    #[serde(flatten)]
    report: &'a SearchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<SearchEvent>>,
}

pub async fn run(
    args: &SearchArgs,
    builder: ImageSearchEngineBuilder,
) -> Result<CommandResult, CliError> {
    let trace = args.explain.then(|| Arc::new(MemoryEventSink::new()));

    let mut builder = builder;
    if let Some(seed) = args.seed {
        builder = builder.with_shuffle_seed(seed);
    }
    if let Some(sink) = &trace {
        builder = builder.with_event_sink(Arc::clone(sink) as Arc<dyn EventSink>);
    }
    let engine = builder.build();

    let report = engine.search(&args.query).await?;

    let data = serde_json::to_value(SearchResponseData {
        query: args.query.trim(),
        report: &report,
        events: trace.map(|sink| sink.events()),
    })?;

    let table = if report.is_no_content() {
        attempts_table(&report.attempts)
    } else {
        images_table(&report)
    };

    Ok(CommandResult::ok(data, table).with_no_content(report.is_no_content()))
}

fn images_table(report: &SearchReport) -> Table {
    Table {
        headers: vec!["source", "photographer", "description", "url"],
        rows: report
            .images()
            .iter()
            .map(|image| {
                vec![
                    image.source.to_string(),
                    image.photographer.clone(),
                    image.description.clone(),
                    image.url.clone(),
                ]
            })
            .collect(),
    }
}

// With nothing to show, list why each provider came back empty.
fn attempts_table(attempts: &[ProviderAttempt]) -> Table {
    Table {
        headers: vec!["provider", "quota", "status", "detail"],
        rows: attempts
            .iter()
            .map(|attempt| {
                let quota = attempt
                    .quota
                    .map(|quota| quota.to_string())
                    .unwrap_or_else(|| String::from("-"));
                let (status, detail) = match &attempt.status {
                    AttemptStatus::Succeeded { count } => {
                        (String::from("ok"), format!("{count} images"))
                    }
                    AttemptStatus::Failed { code, message } => (code.clone(), message.clone()),
                };
                vec![attempt.provider.to_string(), quota, status, detail]
            })
            .collect(),
    }
}
