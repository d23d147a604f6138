use fsmcheck_types::{
    AnalyzeResponse, CategorySummary, CheckedFsmFile, FailedModule, ViolatingSymbol, ids,
};
use std::collections::BTreeMap;

/// Canned service state: what `analyze`, `categories` and `classesforcategory` return.
#[derive(Clone, Debug, Default)]
pub struct ServiceFixture {
    pub analyze: AnalyzeResponse,
    pub categories: Vec<CategorySummary>,
    pub symbols: BTreeMap<String, Vec<ViolatingSymbol>>,
    /// Fixed status for every request whose path starts with the key.
    pub status_overrides: Vec<(String, u16)>,
}

impl ServiceFixture {
    /// A service that reports `categories` with zero violations each.
    pub fn clean(categories: &[&str]) -> Self {
        let mut fixture = Self::default();
        for category in categories {
            fixture = fixture.with_category(category, &format!("{category} usages"), &[]);
        }
        fixture
    }

    /// Add a category whose count equals the number of listed symbols.
    pub fn with_category(mut self, category: &str, description: &str, symbols: &[(&str, u64)]) -> Self {
        self.categories.push(CategorySummary {
            category: category.to_string(),
            description: description.to_string(),
            count: symbols.len() as u64,
        });
        self.symbols.insert(
            category.to_string(),
            symbols
                .iter()
                .map(|(name, usages)| ViolatingSymbol {
                    name: name.to_string(),
                    number_of_usages: *usages,
                })
                .collect(),
        );
        self
    }

    pub fn with_failed_module(mut self, file: &str, reason: &str) -> Self {
        self.analyze.failed_modules.push(FailedModule {
            failed_file: file.to_string(),
            error_message: reason.to_string(),
        });
        self
    }

    pub fn with_invalid_bytecode(mut self, jars: &[&str]) -> Self {
        self.analyze.checked_fsm_files.push(CheckedFsmFile {
            jars_with_invalid_bytecode: jars.iter().map(|j| j.to_string()).collect(),
            detected_first_spirit_artifacts: Vec::new(),
        });
        self
    }

    pub fn with_platform_artifacts(mut self, artifacts: &[&str]) -> Self {
        self.analyze.checked_fsm_files.push(CheckedFsmFile {
            jars_with_invalid_bytecode: Vec::new(),
            detected_first_spirit_artifacts: artifacts.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    /// Answer every request below `path_prefix` with `status`.
    pub fn failing(mut self, path_prefix: &str, status: u16) -> Self {
        self.status_overrides.push((path_prefix.to_string(), status));
        self
    }

    /// Route one request. `path` is the unencoded request path, `query` the decoded pairs.
    pub fn respond(&self, method: &str, path: &str, query: &[(String, String)]) -> (u16, Vec<u8>) {
        if let Some((_, status)) = self
            .status_overrides
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
        {
            return (*status, Vec::new());
        }

        let route = |segments: &[&str]| format!("/{}", segments.join("/"));
        let json = |value: serde_json::Value| (200, value.to_string().into_bytes());

        match method {
            "PUT" if path.starts_with(&format!("{}/", route(ids::ENDPOINT_IGNORED_RESOURCES))) => {
                (200, Vec::new())
            }
            "PUT"
                if path.starts_with(&format!(
                    "{}/",
                    route(ids::ENDPOINT_CONTENT_CREATOR_COMPONENTS)
                )) =>
            {
                (200, Vec::new())
            }
            "POST" if path == route(ids::ENDPOINT_UPLOAD) => (200, Vec::new()),
            "GET" if path == route(ids::ENDPOINT_ANALYZE) => json(serde_json::json!(self.analyze)),
            "GET" if path == route(ids::ENDPOINT_CATEGORIES) => {
                json(serde_json::json!(self.categories))
            }
            "GET" if path == route(ids::ENDPOINT_CLASSES_FOR_CATEGORY) => {
                let category = query
                    .iter()
                    .find(|(k, _)| k == ids::PARAM_CATEGORY)
                    .map(|(_, v)| v.as_str())
                    .unwrap_or_default();
                let symbols = self.symbols.get(category).cloned().unwrap_or_default();
                json(serde_json::json!(symbols))
            }
            _ => (404, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_endpoints() {
        let fixture = ServiceFixture::default().with_category(
            "IMPL_USAGE",
            "impl",
            &[("de.espirit.Impl", 4)],
        );

        let (status, body) = fixture.respond("GET", "/rest/categories", &[]);
        assert_eq!(status, 200);
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value[0]["count"], 1);

        let query = vec![("category".to_string(), "IMPL_USAGE".to_string())];
        let (_, body) = fixture.respond("GET", "/rest/classesforcategory", &query);
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value[0]["numberOfUsages"], 4);

        assert_eq!(fixture.respond("DELETE", "/rest/upload", &[]).0, 404);
        assert_eq!(fixture.respond("PUT", "/rest/ignored-resources/x", &[]).0, 200);
    }

    #[test]
    fn overrides_take_precedence() {
        let fixture = ServiceFixture::clean(&["A"]).failing("/rest/upload", 502);
        assert_eq!(fixture.respond("POST", "/rest/upload", &[]).0, 502);
        assert_eq!(fixture.respond("GET", "/rest/categories", &[]).0, 200);
    }
}
