//! Minimal InfluxDB 1.x HTTP client: `/query` for provisioning, `/write` for points.

use serde::Deserialize;
use std::time::Duration;

use crate::config::RetentionPolicyConfig;
use crate::domain::PublishError;

const TIMEOUT: Duration = Duration::from_secs(60);
const BODY_PREVIEW_LIMIT: usize = 256;

/// Minimal InfluxDB 1.x HTTP client: `/query` for provisioning, `/write` for points.
#[derive(Clone)]
pub struct InfluxClient {
    http: reqwest::Client,
    url_query: String,
    url_write: String,
    credentials: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxClient {
    /// Basic auth is used only when both `username` and `password` are non-empty.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, PublishError> {
        let normalized = base_url.trim_end_matches('/');
        let http = reqwest::Client::builder()
            .connect_timeout(TIMEOUT)
            .timeout(TIMEOUT)
            .build()
            .map_err(|source| PublishError::Http {
                url: normalized.to_string(),
                source,
            })?;
        let credentials = (!username.is_empty() && !password.is_empty())
            .then(|| (username.to_string(), password.to_string()));
        Ok(Self {
            http,
            url_query: format!("{normalized}/query"),
            url_write: format!("{normalized}/write"),
            credentials,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((user, password)) => req.basic_auth(user, Some(password)),
            None => req,
        }
    }

    async fn query(&self, q: &str) -> Result<QueryResponse, PublishError> {
        let url = &self.url_query;
        tracing::debug!(url = %url, q, "influxdb query");
        let req = self.http.post(url).form(&[("q", q)]);
        let resp = self.auth(req).send().await.map_err(|source| PublishError::Http {
            url: url.clone(),
            source,
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|source| PublishError::Http {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(status_error(url, status.as_u16(), &body));
        }

        let parsed: QueryResponse = serde_json::from_str(&body)?;
        if let Some(error) = parsed.results.iter().find_map(|r| r.error.as_deref()) {
            return Err(status_error(url, status.as_u16(), error));
        }
        Ok(parsed)
    }

    pub async fn database_exists(&self, db: &str) -> Result<bool, PublishError> {
        let response = self.query("SHOW DATABASES").await?;
        Ok(response
            .results
            .iter()
            .flat_map(|r| &r.series)
            .flat_map(|s| &s.values)
            .any(|row| row.first().and_then(|v| v.as_str()) == Some(db)))
    }

    pub async fn create_database(&self, db: &str) -> Result<(), PublishError> {
        self.query(&format!("CREATE DATABASE {}", quote_ident(db)))
            .await
            .map(drop)
    }

    pub async fn create_retention_policy(
        &self,
        db: &str,
        policy: &RetentionPolicyConfig,
    ) -> Result<(), PublishError> {
        self.query(&retention_policy_statement(db, policy))
            .await
            .map(drop)
    }

    /// Write a line protocol body with millisecond precision. Expects `204 No Content`.
    pub async fn write(
        &self,
        db: &str,
        retention_policy: Option<&str>,
        body: String,
    ) -> Result<(), PublishError> {
        let url = &self.url_write;
        let mut params = vec![("db", db), ("precision", "ms")];
        if let Some(rp) = retention_policy.filter(|rp| !rp.is_empty()) {
            params.push(("rp", rp));
        }

        let req = self.http.post(url).query(&params).body(body);
        let resp = self.auth(req).send().await.map_err(|source| PublishError::Http {
            url: url.clone(),
            source,
        })?;
        let status = resp.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(status_error(url, status.as_u16(), &body))
    }
}

fn status_error(url: &str, status: u16, body: &str) -> PublishError {
    let mut preview: String = body.trim().chars().take(BODY_PREVIEW_LIMIT).collect();
    if body.trim().chars().count() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    PublishError::Status {
        url: url.to_string(),
        status,
        body: preview,
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('\\', "\\\\").replace('"', "\\\""))
}

fn retention_policy_statement(db: &str, policy: &RetentionPolicyConfig) -> String {
    let mut statement = format!(
        "CREATE RETENTION POLICY {} ON {} DURATION {} REPLICATION {} SHARD DURATION {}",
        quote_ident(&policy.name),
        quote_ident(db),
        policy.duration,
        policy.replication_factor,
        policy.shard_duration,
    );
    if policy.is_default {
        statement.push_str(" DEFAULT");
    }
    statement
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const DATABASES: &str = r#"{"results":[{"statement_id":0,"series":[{"name":"databases","columns":["name"],"values":[["_internal"],["builds"]]}]}]}"#;

    #[test]
    fn retention_policy_statement_matches_influxql() {
        let policy = RetentionPolicyConfig {
            name: "rp".to_string(),
            is_default: true,
            ..RetentionPolicyConfig::default()
        };
        assert_eq!(
            retention_policy_statement("builds", &policy),
            "CREATE RETENTION POLICY \"rp\" ON \"builds\" DURATION 30d REPLICATION 2 SHARD DURATION 30m DEFAULT"
        );
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("my\"db"), "\"my\\\"db\"");
    }

    #[tokio::test]
    async fn database_exists_reads_show_databases() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/query")
            .match_body(Matcher::UrlEncoded("q".into(), "SHOW DATABASES".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DATABASES)
            .expect(2)
            .create_async()
            .await;

        let client = InfluxClient::new(&server.url(), "", "").unwrap();
        assert!(client.database_exists("builds").await.unwrap());
        assert!(!client.database_exists("other").await.unwrap());
    }

    #[tokio::test]
    async fn write_sends_line_protocol_with_basic_auth() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/write")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("db".into(), "builds".into()),
                Matcher::UrlEncoded("rp".into(), "rp".into()),
                Matcher::UrlEncoded("precision".into(), "ms".into()),
            ]))
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .match_body("task value=1i 1")
            .with_status(204)
            .create_async()
            .await;

        let client = InfluxClient::new(&server.url(), "user", "secret").unwrap();
        client
            .write("builds", Some("rp"), "task value=1i 1".to_string())
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn write_failure_is_status_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/write")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":"unable to parse"}"#)
            .create_async()
            .await;

        let client = InfluxClient::new(&server.url(), "", "").unwrap();
        let err = client
            .write("builds", None, "garbage".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Status { status: 400, ref body, .. } if body.contains("unable to parse")));
    }

    #[tokio::test]
    async fn query_error_in_body_is_reported() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(r#"{"results":[{"statement_id":0,"error":"authorization failed"}]}"#)
            .create_async()
            .await;

        let client = InfluxClient::new(&server.url(), "", "").unwrap();
        let err = client.create_database("builds").await.unwrap_err();
        assert!(err.to_string().contains("authorization failed"));
    }
}
