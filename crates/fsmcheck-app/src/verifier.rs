//! The compliance check: talk to the service, apply the level policy, feed the sinks.

use camino::Utf8PathBuf;
use fsmcheck_client::{AnalysisClient, ClientError, Connector, Transport};
use fsmcheck_domain::{
    CategoryTally, Enforcement, LevelCatalog, check_structure, evaluate, tally_categories,
};
use fsmcheck_render::{JunitSink, TextSink, ViolationSink};
use fsmcheck_types::{VerificationResult, ViolatingSymbol, ids};
use tracing::{debug, error, info};

/// Inputs of one check run.
#[derive(Clone, Debug, Default)]
pub struct CheckRequest {
    pub files: Vec<Utf8PathBuf>,
    pub whitelist: Vec<String>,
    pub content_creator_components: Vec<String>,
    pub max_bytecode_version: u32,
    pub firstspirit_version: Option<String>,
    /// Directory under which the structured report is written.
    pub report_dir: Utf8PathBuf,
}

/// What the service told us, before any sink sees it.
enum Analysis {
    /// Structural problem; no category evaluation happens.
    Terminal(VerificationResult),
    Categories(Vec<(CategoryTally, Vec<ViolatingSymbol>)>),
}

pub struct Verifier<C> {
    connector: C,
    catalog: LevelCatalog,
    enforcement: Enforcement,
}

impl<C: Connector> Verifier<C> {
    pub fn new(connector: C, catalog: LevelCatalog, enforcement: Enforcement) -> Self {
        Self {
            connector,
            catalog,
            enforcement,
        }
    }

    /// Run the check.
    ///
    /// Connection failures and policy violations come back as result values. `Err` means
    /// the structured report could not be written.
    pub fn check(&self, request: &CheckRequest) -> anyhow::Result<VerificationResult> {
        if request.files.is_empty() {
            info!("no module files configured, skipping isolation check");
            return Ok(VerificationResult::skipped());
        }

        info!(
            files = request.files.len(),
            level = self.enforcement.level(),
            "starting isolation check"
        );

        let transport = match self.connector.connect() {
            Ok(transport) => transport,
            Err(err) => {
                error!(error = %err, "cannot set up service connection");
                return Ok(VerificationResult::connection_failed(format!(
                    "{} connection setup: {err}",
                    ids::MSG_CONNECTION_FAILED_PREFIX
                )));
            }
        };

        // The client and its connection pool end with this block.
        let analysis = {
            let client = AnalysisClient::new(transport);
            self.converse(&client, request)
        };

        let result = match analysis {
            Ok(Analysis::Terminal(result)) => result,
            Ok(Analysis::Categories(details)) => self.report(request, &details)?,
            Err(err) => {
                error!(operation = %err.operation(), error = %err, "isolation check service call failed");
                VerificationResult::connection_failed(format!(
                    "{} {err}",
                    ids::MSG_CONNECTION_FAILED_PREFIX
                ))
            }
        };

        info!(status = ?result.status(), "isolation check finished");
        Ok(result)
    }

    fn converse<T: Transport>(
        &self,
        client: &AnalysisClient<T>,
        request: &CheckRequest,
    ) -> Result<Analysis, ClientError> {
        info!(files = request.files.len(), "uploading module archives");
        client.upload(&request.files)?;

        for resource in &request.whitelist {
            debug!(resource = resource.as_str(), "registering whitelisted resource");
            client.register_whitelisted_resource(resource)?;
        }
        for component in &request.content_creator_components {
            debug!(component = component.as_str(), "registering content creator component");
            client.register_content_creator_component(component)?;
        }

        info!(
            version = request.firstspirit_version.as_deref().unwrap_or("<any>"),
            max_bytecode_version = request.max_bytecode_version,
            "analyzing uploaded modules"
        );
        let response = client.analyze(
            request.firstspirit_version.as_deref(),
            request.max_bytecode_version,
        )?;
        if let Some(result) = check_structure(&response, request.max_bytecode_version) {
            info!(message = result.message(), "structural check failed");
            return Ok(Analysis::Terminal(result));
        }

        let tallies = tally_categories(&self.catalog, &client.list_categories()?);
        let mut details = Vec::with_capacity(tallies.len());
        for tally in tallies {
            let symbols = if tally.count > 0 {
                client.list_violating_symbols(tally.category.as_str())?
            } else {
                Vec::new()
            };
            debug!(
                category = tally.category.as_str(),
                count = tally.count,
                enforced = self.enforcement.is_enforced(&tally.category),
                "category evaluated"
            );
            details.push((tally, symbols));
        }
        Ok(Analysis::Categories(details))
    }

    fn report(
        &self,
        request: &CheckRequest,
        details: &[(CategoryTally, Vec<ViolatingSymbol>)],
    ) -> anyhow::Result<VerificationResult> {
        let tallies: Vec<CategoryTally> = details.iter().map(|(t, _)| t.clone()).collect();
        let outcome = evaluate(&self.enforcement, &tallies);

        let mut text = TextSink::new(self.enforcement.level());
        let mut junit = JunitSink::new(request.report_dir.clone());
        {
            let mut sinks: [&mut dyn ViolationSink; 2] = [&mut text, &mut junit];
            for (tally, symbols) in details {
                for sink in sinks.iter_mut() {
                    sink.handle_violations(&self.enforcement, tally, symbols);
                }
            }
            for sink in sinks.iter_mut() {
                sink.on_done(outcome.success)?;
            }
        }
        info!(report = %junit.report_path(), "structured report written");

        let message = text
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| text.report());
        Ok(if outcome.success {
            VerificationResult::valid(message)
        } else {
            VerificationResult::invalid(message)
        })
    }
}
