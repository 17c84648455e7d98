// Sequential pipeline: authenticate, fetch every page, group, report

use std::io::Write;
use std::sync::Arc;

use credcluster_http::{shared_client, HttpClientTrait, HttpConfig};
use credcluster_identity::{
    aggregate, Authenticator, ClientCredentialsAuthenticator, FetchOutcome, GraphqlExecutor,
    Paginator, RiskFactorType, StaticTokenAuthenticator, StopReason,
};
use tracing::info;

use crate::config::{Credentials, RunConfig};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;
use crate::progress::{create_spinner, fetched_message, page_message, ProgressMode};
use crate::report::reporter_for;

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub entities_fetched: usize,
    pub pages_fetched: usize,
    /// False when pagination stopped before the last page
    pub complete: bool,
    pub grouped_count: usize,
}

/// Run the whole pipeline with production HTTP clients
///
/// With `--output` the report is rendered in memory and the file is only
/// written once the run succeeds, so a failed run leaves it untouched.
pub async fn run(config: &RunConfig) -> CliResult<RunSummary> {
    let mut token_http = HttpConfig::fast();
    token_http.proxy = config.http.proxy.clone();
    let token_client = shared_client(token_http)?;
    let query_client = shared_client(config.http.clone())?;

    let authenticator: Box<dyn Authenticator> = match &config.credentials {
        Credentials::Token(token) => Box::new(StaticTokenAuthenticator::new(token.clone())),
        Credentials::ClientCredentials {
            client_id,
            client_secret,
        } => Box::new(ClientCredentialsAuthenticator::new(
            token_client,
            config.endpoints.token_url(),
            client_id.clone(),
            client_secret.clone(),
        )),
    };

    let mut status = std::io::stderr();
    match &config.output {
        Some(path) => {
            let mut buffer: Vec<u8> = Vec::new();
            let summary = run_with(
                authenticator.as_ref(),
                query_client,
                config,
                &mut buffer,
                &mut status,
            )
            .await?;
            std::fs::write(path, &buffer)?;
            writeln!(
                status,
                "{}",
                OutputStyle::new(config.status_colors)
                    .info(&format!("Report written to {}", path.display()))
            )?;
            Ok(summary)
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            run_with(
                authenticator.as_ref(),
                query_client,
                config,
                &mut handle,
                &mut status,
            )
            .await
        }
    }
}

/// Run the pipeline against the given collaborators
///
/// The report goes to `out`; progress, counts and warnings go to `status`.
pub async fn run_with(
    authenticator: &dyn Authenticator,
    query_client: Arc<dyn HttpClientTrait>,
    config: &RunConfig,
    out: &mut dyn Write,
    status: &mut dyn Write,
) -> CliResult<RunSummary> {
    let style = OutputStyle::new(config.status_colors);

    let token = authenticator
        .authenticate()
        .await
        .map_err(CliError::Authentication)?;

    let executor = GraphqlExecutor::new(query_client, config.endpoints.graphql_url(), token);
    let paginator = Paginator::new(Arc::new(executor), config.paginator.clone());

    let outcome = fetch_entities(&paginator, config, &style, status).await?;
    report_fetch_status(&outcome, &config.risk_factors, &style, status)?;

    let report = aggregate(&outcome.entities);
    let rendered = reporter_for(config.format, config.report_colors).render(&report)?;
    out.write_all(rendered.as_bytes())?;
    out.flush()?;

    info!(
        entities = outcome.entities.len(),
        groups = report.grouped_count(),
        "Report complete"
    );

    Ok(RunSummary {
        entities_fetched: outcome.entities.len(),
        pages_fetched: outcome.pages_fetched,
        complete: outcome.is_complete(),
        grouped_count: report.grouped_count(),
    })
}

async fn fetch_entities(
    paginator: &Paginator,
    config: &RunConfig,
    style: &OutputStyle,
    status: &mut dyn Write,
) -> CliResult<FetchOutcome> {
    let outcome = match config.progress {
        ProgressMode::Hidden => {
            let outcome = paginator.fetch_all(&config.risk_factors).await;
            info!(
                entities = outcome.entities.len(),
                pages = outcome.pages_fetched,
                "Entity retrieval finished"
            );
            return Ok(outcome);
        }
        ProgressMode::Spinner => {
            let spinner = create_spinner("Querying identity risk entities...");
            let outcome = paginator
                .fetch_all_with_progress(&config.risk_factors, |progress| {
                    let message = page_message(
                        progress.page,
                        progress.page_entities,
                        progress.total_entities,
                    );
                    if progress.has_next_page {
                        spinner.set_message(format!("{message}, requesting next page..."));
                    } else {
                        spinner.set_message(message);
                    }
                })
                .await;
            spinner.finish_and_clear();
            outcome
        }
        ProgressMode::Lines => {
            let mut written = Ok(());
            let outcome = paginator
                .fetch_all_with_progress(&config.risk_factors, |progress| {
                    if written.is_ok() {
                        written = writeln!(
                            status,
                            "{}",
                            style.info(&page_message(
                                progress.page,
                                progress.page_entities,
                                progress.total_entities,
                            ))
                        );
                    }
                })
                .await;
            written?;
            outcome
        }
    };

    if outcome.pages_fetched > 0 {
        writeln!(
            status,
            "{}",
            style.success(&fetched_message(
                outcome.entities.len(),
                outcome.pages_fetched
            ))
        )?;
    }
    Ok(outcome)
}

fn report_fetch_status(
    outcome: &FetchOutcome,
    risk_factors: &[RiskFactorType],
    style: &OutputStyle,
    status: &mut dyn Write,
) -> CliResult<()> {
    match &outcome.stop {
        StopReason::Exhausted => {}
        StopReason::PageFailure(failure) => {
            let mut message = format!(
                "Query failed on page {}: {}. Keeping the {} entities fetched before the failure; the report may be incomplete.",
                failure.page,
                failure.error,
                outcome.entities.len()
            );
            if failure.is_permission_related() {
                message.push_str(
                    " This usually means the API client lacks the Identity Protection read scopes.",
                );
            }
            writeln!(status, "{}", style.warning(&message))?;
        }
        StopReason::PageLimit { limit } => {
            writeln!(
                status,
                "{}",
                style.warning(&format!(
                    "Stopped after {} page(s) (--max-pages) while more were available; the report may be incomplete.",
                    limit
                ))
            )?;
        }
    }

    if outcome.entities.is_empty() {
        let filter: Vec<&str> = risk_factors.iter().map(RiskFactorType::as_str).collect();
        writeln!(
            status,
            "{}",
            style.info(&format!(
                "No entities found with risk factors: {}",
                filter.join(", ")
            ))
        )?;
    }
    Ok(())
}
