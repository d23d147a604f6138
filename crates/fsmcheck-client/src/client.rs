use crate::error::{ClientError, Operation};
use crate::transport::{ApiRequest, ApiResponse, Body, Method, Transport};
use camino::Utf8PathBuf;
use fsmcheck_types::{AnalyzeResponse, CategorySummary, ViolatingSymbol, ids};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Typed operations of the isolation check service.
///
/// Retry behavior belongs to the transport; this layer only maps responses.
#[derive(Debug)]
pub struct AnalysisClient<T> {
    transport: T,
}

impl<T: Transport> AnalysisClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn register_whitelisted_resource(&self, resource: &str) -> Result<(), ClientError> {
        let request = ApiRequest::new(Method::Put, ids::ENDPOINT_IGNORED_RESOURCES)
            .segment(resource)
            .body(Body::Text(resource.to_string()));
        self.send(Operation::RegisterWhitelistedResource, &request)
            .map(drop)
    }

    pub fn register_content_creator_component(&self, component: &str) -> Result<(), ClientError> {
        let request = ApiRequest::new(Method::Put, ids::ENDPOINT_CONTENT_CREATOR_COMPONENTS)
            .segment(component)
            .body(Body::Text(component.to_string()));
        self.send(Operation::RegisterContentCreatorComponent, &request)
            .map(drop)
    }

    /// Upload all archives in a single multipart request.
    pub fn upload(&self, files: &[Utf8PathBuf]) -> Result<(), ClientError> {
        for path in files {
            std::fs::metadata(path).map_err(|source| ClientError::Artifact {
                operation: Operation::Upload,
                path: path.clone(),
                source,
            })?;
        }
        let request = ApiRequest::new(Method::Post, ids::ENDPOINT_UPLOAD)
            .body(Body::Files(files.to_vec()));
        self.send(Operation::Upload, &request).map(drop)
    }

    /// Run the analysis over everything uploaded in this session.
    ///
    /// `platform_version` is omitted from the query when absent.
    pub fn analyze(
        &self,
        platform_version: Option<&str>,
        max_bytecode_version: u32,
    ) -> Result<AnalyzeResponse, ClientError> {
        let mut request = ApiRequest::get(ids::ENDPOINT_ANALYZE);
        if let Some(version) = platform_version {
            request = request.query(ids::PARAM_VERSION, version);
        }
        let request = request.query(
            ids::PARAM_MAX_BYTECODE_VERSION,
            max_bytecode_version.to_string(),
        );
        self.fetch_json(Operation::Analyze, &request)
    }

    pub fn list_categories(&self) -> Result<Vec<CategorySummary>, ClientError> {
        self.fetch_json(
            Operation::ListCategories,
            &ApiRequest::get(ids::ENDPOINT_CATEGORIES),
        )
    }

    pub fn list_violating_symbols(
        &self,
        category: &str,
    ) -> Result<Vec<ViolatingSymbol>, ClientError> {
        let request =
            ApiRequest::get(ids::ENDPOINT_CLASSES_FOR_CATEGORY).query(ids::PARAM_CATEGORY, category);
        self.fetch_json(Operation::ListViolatingSymbols, &request)
    }

    fn send(&self, operation: Operation, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        debug!(
            %operation,
            method = request.method.as_str(),
            path = %request.path(),
            "sending request"
        );
        let response = self
            .transport
            .execute(request)
            .map_err(|source| ClientError::Transport { operation, source })?;
        debug!(%operation, status = response.status, bytes = response.body.len(), "response received");
        if !response.is_success() {
            return Err(ClientError::Status {
                operation,
                status: response.status,
            });
        }
        Ok(response)
    }

    fn fetch_json<R: DeserializeOwned>(
        &self,
        operation: Operation,
        request: &ApiRequest,
    ) -> Result<R, ClientError> {
        let response = self.send(operation, request)?;
        response.json().map_err(|e| ClientError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}
