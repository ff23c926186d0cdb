use crate::api::{InventoryApi, TestScope};
use crate::config::OctaneConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::types::{DataTableRecord, TestRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const UFT_TESTING_TOOL: &str = "list_node.testing_tool_type.uft";
const AUTOMATED_TEST_SUBTYPE: &str = "test_automated";
const CLIENT_TYPE_HEADER: &str = "HPECLIENTTYPE";
const CLIENT_TYPE: &str = "HPE_CI_CLIENT";

#[derive(Serialize)]
struct SignInRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ApiEntity {
    id: String,
}

#[derive(Deserialize)]
struct ApiTest {
    id: String,
    name: String,
    package: Option<String>,
    class_name: Option<String>,
    description: Option<String>,
    executable: Option<bool>,
}

#[derive(Deserialize)]
struct ApiResourceFile {
    id: String,
    name: String,
    relative_path: String,
    scm_repository: Option<ApiEntity>,
}

#[derive(Serialize)]
struct ApiReference<'a> {
    #[serde(rename = "type")]
    entity_type: &'a str,
    id: &'a str,
}

#[derive(Serialize)]
struct CreateTestBody<'a> {
    subtype: &'a str,
    name: &'a str,
    package: &'a str,
    class_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    executable: bool,
    testing_tool_type: ApiReference<'a>,
    scm_repository: ApiReference<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_runner: Option<ApiReference<'a>>,
}

#[derive(Serialize)]
struct UpdateTestBody<'a> {
    subtype: &'a str,
    id: &'a str,
    name: &'a str,
    package: &'a str,
    class_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    executable: bool,
}

#[derive(Serialize)]
struct DeactivateTestBody<'a> {
    id: &'a str,
    executable: bool,
}

#[derive(Serialize)]
struct CreateResourceFileBody<'a> {
    name: &'a str,
    relative_path: &'a str,
    scm_repository: ApiReference<'a>,
}

#[derive(Serialize)]
struct UpdateResourceFileBody<'a> {
    id: &'a str,
    name: &'a str,
    relative_path: &'a str,
}

#[derive(Serialize)]
struct BatchBody<T> {
    data: Vec<T>,
}

/// Escapes the characters that are meaningful in the Octane query syntax.
fn escape_query_chars(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '+' | '-' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~' | '*' | '?'
                | ':' | '\\' | '/'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl From<ApiTest> for TestRecord {
    fn from(test: ApiTest) -> Self {
        TestRecord {
            id: Some(test.id),
            name: test.name,
            package_name: test.package,
            class_name: test.class_name.unwrap_or_default(),
            description: test.description,
            executable: test.executable.unwrap_or(false),
        }
    }
}

impl From<ApiResourceFile> for DataTableRecord {
    fn from(file: ApiResourceFile) -> Self {
        DataTableRecord {
            id: Some(file.id),
            name: file.name,
            relative_path: file.relative_path,
            scm_repository_id: file.scm_repository.map(|repo| repo.id),
        }
    }
}

/// Cookie-authenticated Octane REST client scoped to one shared space and
/// workspace.
pub struct OctaneClient {
    http: reqwest::Client,
    config: OctaneConfig,
}

impl OctaneClient {
    pub fn new(config: OctaneConfig) -> InventoryResult<Self> {
        config
            .validate()
            .map_err(|msg| InventoryError::InvalidConfig { message: msg })?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            CLIENT_TYPE_HEADER,
            reqwest::header::HeaderValue::from_static(CLIENT_TYPE),
        );

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    /// Authenticates the cookie session. Must succeed before any other
    /// call; a failure here aborts the whole run.
    pub async fn sign_in(&self) -> InventoryResult<()> {
        let url = format!("{}/authentication/sign_in", self.config.server_url);
        let body = SignInRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
        };

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(InventoryError::Authentication {
                message: format!("sign_in returned status {}", response.status()),
            });
        }
        debug!("Authenticated against {}", self.config.server_url);
        Ok(())
    }

    fn api_url(&self, resource: &str) -> String {
        format!(
            "{}{}/{}",
            self.config.server_url,
            self.config.api_path(),
            resource
        )
    }

    async fn check(response: reqwest::Response) -> InventoryResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(InventoryError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_list<T: serde::de::DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> InventoryResult<Vec<T>> {
        let response = self
            .http
            .get(self.api_url(resource))
            .query(query)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let list: ListResponse<T> = response.json().await?;
        Ok(list.data)
    }

    async fn fetch_tests(&self, query: String) -> InventoryResult<Vec<TestRecord>> {
        let fields = "id,executable,name,package,class_name,description".to_string();
        let tests: Vec<ApiTest> = self
            .get_list("tests", &[("fields", fields), ("query", query)])
            .await?;
        Ok(tests.into_iter().map(TestRecord::from).collect())
    }
}

#[async_trait]
impl InventoryApi for OctaneClient {
    async fn scm_repository_id(&self, repository_url: &str) -> InventoryResult<String> {
        let query = format!(
            "\"repository EQ {{url EQ ^{}^}}\"",
            escape_query_chars(repository_url)
        );
        let repos: Vec<ApiEntity> = self
            .get_list("scm_repositories", &[("query", query)])
            .await?;
        repos
            .into_iter()
            .next()
            .map(|repo| repo.id)
            .ok_or_else(|| InventoryError::NotFound {
                what: format!("scm repository with url {}", repository_url),
            })
    }

    async fn test_runner_id(&self, pipeline_name: &str) -> InventoryResult<Option<String>> {
        let query = format!(
            "\"ci_job EQ {{name EQ ^{}*^}}\"",
            escape_query_chars(pipeline_name)
        );
        let runners: Vec<ApiEntity> = self.get_list("executors", &[("query", query)]).await?;
        Ok(runners.into_iter().next().map(|runner| runner.id))
    }

    async fn existing_tests(&self, scope: &TestScope) -> InventoryResult<Vec<TestRecord>> {
        let tool_clause = format!("testing_tool_type EQ {{id EQ ^{}^}}", UFT_TESTING_TOOL);
        let query = match scope {
            TestScope::Workspace => format!("\"{}\"", tool_clause),
            TestScope::Repository { scm_repository_id } => format!(
                "\"scm_repository EQ {{id EQ ^{}^}};{}\"",
                escape_query_chars(scm_repository_id),
                tool_clause
            ),
        };
        self.fetch_tests(query).await
    }

    async fn existing_data_tables(
        &self,
        scm_repository_id: &str,
    ) -> InventoryResult<Vec<DataTableRecord>> {
        let query = format!(
            "\"scm_repository EQ {{id EQ ^{}^}}\"",
            escape_query_chars(scm_repository_id)
        );
        let fields = "name,relative_path,scm_repository".to_string();
        let files: Vec<ApiResourceFile> = self
            .get_list(
                "scm_resource_files",
                &[("fields", fields), ("query", query)],
            )
            .await?;
        Ok(files.into_iter().map(DataTableRecord::from).collect())
    }

    async fn create_test(
        &self,
        test: &TestRecord,
        scm_repository_id: &str,
        test_runner_id: Option<&str>,
    ) -> InventoryResult<()> {
        let body = BatchBody {
            data: vec![CreateTestBody {
                subtype: AUTOMATED_TEST_SUBTYPE,
                name: &test.name,
                package: test.package_name.as_deref().unwrap_or(""),
                class_name: &test.class_name,
                description: test.description.as_deref(),
                executable: true,
                testing_tool_type: ApiReference {
                    entity_type: "list_node",
                    id: UFT_TESTING_TOOL,
                },
                scm_repository: ApiReference {
                    entity_type: "scm_repository",
                    id: scm_repository_id,
                },
                test_runner: test_runner_id.map(|id| ApiReference {
                    entity_type: "executor",
                    id,
                }),
            }],
        };

        let response = self.http.post(self.api_url("tests")).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_test(&self, test: &TestRecord) -> InventoryResult<()> {
        let id = test.id.as_deref().ok_or_else(|| InventoryError::NotFound {
            what: format!("remote id for test {}", test.name),
        })?;
        let body = BatchBody {
            data: vec![UpdateTestBody {
                subtype: AUTOMATED_TEST_SUBTYPE,
                id,
                name: &test.name,
                package: test.package_name.as_deref().unwrap_or(""),
                class_name: &test.class_name,
                description: test.description.as_deref(),
                executable: test.executable,
            }],
        };

        let response = self.http.put(self.api_url("tests")).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn deactivate_test(&self, test_id: &str) -> InventoryResult<()> {
        let body = BatchBody {
            data: vec![DeactivateTestBody {
                id: test_id,
                executable: false,
            }],
        };

        let response = self.http.put(self.api_url("tests")).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn create_data_table(
        &self,
        table: &DataTableRecord,
        scm_repository_id: &str,
    ) -> InventoryResult<()> {
        let body = BatchBody {
            data: vec![CreateResourceFileBody {
                name: &table.name,
                relative_path: &table.relative_path,
                scm_repository: ApiReference {
                    entity_type: "scm_repository",
                    id: scm_repository_id,
                },
            }],
        };

        let response = self
            .http
            .post(self.api_url("scm_resource_files"))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_data_table(&self, table: &DataTableRecord) -> InventoryResult<()> {
        let id = table.id.as_deref().ok_or_else(|| InventoryError::NotFound {
            what: format!("remote id for data table {}", table.name),
        })?;
        let body = BatchBody {
            data: vec![UpdateResourceFileBody {
                id,
                name: &table.name,
                relative_path: &table.relative_path,
            }],
        };

        let response = self
            .http
            .put(self.api_url("scm_resource_files"))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_data_table(&self, table_id: &str) -> InventoryResult<()> {
        let query = format!("\"(id=^{}^)\"", escape_query_chars(table_id));
        let response = self
            .http
            .delete(self.api_url("scm_resource_files"))
            .query(&[("query", query)])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_query_chars() {
        assert_eq!(escape_query_chars("plain"), "plain");
        assert_eq!(
            escape_query_chars("https://git.example.com/repo"),
            "https\\:\\/\\/git.example.com\\/repo"
        );
        assert_eq!(escape_query_chars("a-b*c"), "a\\-b\\*c");
    }

    #[test]
    fn test_api_test_conversion() {
        let api = ApiTest {
            id: "7".to_string(),
            name: "T1".to_string(),
            package: None,
            class_name: Some("a/b".to_string()),
            description: None,
            executable: Some(false),
        };
        let record = TestRecord::from(api);
        assert_eq!(record.id.as_deref(), Some("7"));
        assert_eq!(record.class_name, "a/b");
        assert!(!record.executable);
        assert!(record.package_name.is_none());
    }

    #[test]
    fn test_create_body_shape() {
        let test = TestRecord::discovered("T1", "a", "a/b").with_description("desc");
        let body = BatchBody {
            data: vec![CreateTestBody {
                subtype: AUTOMATED_TEST_SUBTYPE,
                name: &test.name,
                package: test.package_name.as_deref().unwrap_or(""),
                class_name: &test.class_name,
                description: test.description.as_deref(),
                executable: true,
                testing_tool_type: ApiReference {
                    entity_type: "list_node",
                    id: UFT_TESTING_TOOL,
                },
                scm_repository: ApiReference {
                    entity_type: "scm_repository",
                    id: "1",
                },
                test_runner: None,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"][0]["subtype"], "test_automated");
        assert_eq!(json["data"][0]["class_name"], "a/b");
        assert_eq!(
            json["data"][0]["testing_tool_type"]["id"],
            "list_node.testing_tool_type.uft"
        );
        assert!(json["data"][0].get("test_runner").is_none());
    }
}
