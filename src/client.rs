use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{IssueCreatorError, Result};

const REST_ACCEPT: &str = "application/vnd.github+json";

/// Organization and token used for every request.
#[derive(Clone)]
pub struct Credentials {
    pub organization: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("organization", &self.organization)
            .finish_non_exhaustive()
    }
}

pub struct GitHubClient {
    http: Client,
    credentials: Credentials,
    api_url: Url,
    graphql_url: Url,
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

impl<T> GraphQLResponse<T> {
    /// The first reported error wins over any partial data
    fn into_data(self) -> Result<T> {
        if let Some(first) = self.errors.and_then(|e| e.into_iter().next()) {
            return Err(IssueCreatorError::GraphQL(first.message));
        }
        self.data.ok_or(IssueCreatorError::EmptyResponse)
    }
}

#[derive(Deserialize, Debug)]
struct GraphQLError {
    message: String,
}

#[derive(Deserialize)]
struct RestErrorBody {
    message: Option<String>,
}

impl GitHubClient {
    pub fn new(credentials: Credentials, config: &Config) -> Result<Self> {
        let api_url = parse_url(&config.api_url())?;
        let graphql_url = parse_url(&config.graphql_url())?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("github-issue-creator/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            credentials,
            api_url,
            graphql_url,
        })
    }

    pub fn organization(&self) -> &str {
        &self.credentials.organization
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", self.credentials.token))
    }

    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<T> {
        let request = GraphQLRequest { query, variables };

        let response = self
            .authorized(self.http.post(self.graphql_url.clone()))
            .json(&request)
            .send()
            .await
            .map_err(IssueCreatorError::Connectivity)?;

        let response = check_status(response).await?;
        let gql_response: GraphQLResponse<T> = response.json().await?;
        gql_response.into_data()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.rest_url(path)?;
        debug!(%url, "GET");

        let response = self
            .authorized(self.http.get(url))
            .header(ACCEPT, REST_ACCEPT)
            .send()
            .await
            .map_err(IssueCreatorError::Connectivity)?;

        Ok(check_status(response).await?.json().await?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.rest_url(path)?;
        debug!(%url, "POST");

        let response = self
            .authorized(self.http.post(url))
            .header(ACCEPT, REST_ACCEPT)
            .json(body)
            .send()
            .await
            .map_err(IssueCreatorError::Connectivity)?;

        Ok(check_status(response).await?.json().await?)
    }

    fn rest_url(&self, path: &str) -> Result<Url> {
        let base = self.api_url.as_str().trim_end_matches('/');
        parse_url(&format!("{base}/{}", path.trim_start_matches('/')))
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|_| IssueCreatorError::InvalidUrl(raw.to_string()))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read response body>".to_string());

    Err(translate_status(status, &body))
}

/// Map an unsuccessful HTTP status to a user-facing error.
pub fn translate_status(status: StatusCode, body: &str) -> IssueCreatorError {
    match status {
        StatusCode::UNAUTHORIZED => IssueCreatorError::InvalidToken,
        StatusCode::FORBIDDEN => IssueCreatorError::Forbidden,
        StatusCode::NOT_FOUND => IssueCreatorError::NotFound,
        _ => {
            let message = serde_json::from_str::<RestErrorBody>(body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body.trim().to_string()
                    }
                });
            IssueCreatorError::ApiError {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("organization", &self.credentials.organization)
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}
