use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use super::models::{Employee, EmployeesResponse, TimeBalanceEntry, TimeBalanceEntryBody};
use super::HrApi;
use crate::config::AppConfig;
use crate::error::RemoteError;

const EMPLOYEES_QUERY: &str = "active=true&attributes=id,first_name,last_name,email,cpf,registration_number&sort_direction=asc&sort_property=first_name";

pub struct PontoMaisClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PontoMaisClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_base_url(&config.pontomais_base_url, &config.pontomais_token)
    }

    pub fn with_base_url(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Turn a non-success response into the matching error, keeping the body
    /// around for the chat reply.
    async fn check(resp: Response, accepted: &[StatusCode]) -> Result<Response, RemoteError> {
        let status = resp.status();
        if accepted.contains(&status) {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::warn!("PontoMais API error ({}): {}", status, body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized {
                status: status.as_u16(),
            },
            StatusCode::NOT_FOUND => RemoteError::NotFound { body },
            _ => RemoteError::Rejected {
                status: status.as_u16(),
                body,
            },
        })
    }
}

#[async_trait]
impl HrApi for PontoMaisClient {
    async fn list_employees(&self) -> Result<Vec<Employee>, RemoteError> {
        let url = format!("{}/employees?{}", self.base_url, EMPLOYEES_QUERY);

        let resp = self
            .client
            .get(&url)
            .header("access-token", &self.token)
            .send()
            .await?;
        let resp = Self::check(resp, &[StatusCode::OK]).await?;

        let body = resp.text().await?;
        let parsed: EmployeesResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))?;

        tracing::debug!("Fetched {} employees", parsed.employees.len());
        Ok(parsed.employees)
    }

    async fn create_time_balance_entry(&self, entry: &TimeBalanceEntry) -> Result<(), RemoteError> {
        let url = format!("{}/time_balance_entries", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header("access-token", &self.token)
            .json(&TimeBalanceEntryBody {
                time_balance_entry: entry,
            })
            .send()
            .await?;
        Self::check(resp, &[StatusCode::OK, StatusCode::CREATED]).await?;

        tracing::info!(
            "Time balance entry created for employee {:?}",
            entry.employee_id
        );
        Ok(())
    }

    async fn update_time_balance_entry(
        &self,
        entry_id: &str,
        entry: &TimeBalanceEntry,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/time_balance_entries/{}", self.base_url, entry_id);

        let resp = self
            .client
            .put(&url)
            .header("access-token", &self.token)
            .json(&TimeBalanceEntryBody {
                time_balance_entry: entry,
            })
            .send()
            .await?;
        Self::check(resp, &[StatusCode::OK]).await?;

        tracing::info!("Time balance entry {} updated", entry_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Matcher;

    fn entry(employee_id: Option<&str>) -> TimeBalanceEntry {
        TimeBalanceEntry {
            employee_id: employee_id.map(str::to_string),
            amount_seconds: 3600.0,
            date: NaiveDate::from_ymd_opt(2023, 5, 15).unwrap(),
            observation: "1 hora de trabalho".into(),
            withdraw: false,
        }
    }

    #[tokio::test]
    async fn list_employees_sends_token_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/employees")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("active".into(), "true".into()),
                Matcher::UrlEncoded("sort_property".into(), "first_name".into()),
            ]))
            .match_header("access-token", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"employees":[{"id":1,"first_name":"Ana","last_name":"Lima"},{"id":2,"first_name":"Bruno","last_name":"Reis"}]}"#)
            .create_async()
            .await;

        let client = PontoMaisClient::with_base_url(&server.url(), "secret");
        let employees = client.list_employees().await.unwrap();

        mock.assert_async().await;
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[1].full_name(), "Bruno Reis");
    }

    #[tokio::test]
    async fn list_employees_maps_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Regex("^/employees".into()))
            .with_status(401)
            .with_body("invalid token")
            .create_async()
            .await;

        let client = PontoMaisClient::with_base_url(&server.url(), "bad");
        let err = client.list_employees().await.unwrap_err();
        assert!(matches!(err, RemoteError::Unauthorized { status: 401 }));
    }

    #[tokio::test]
    async fn list_employees_reports_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Regex("^/employees".into()))
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = PontoMaisClient::with_base_url(&server.url(), "secret");
        let err = client.list_employees().await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn create_posts_wrapped_entry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/time_balance_entries")
            .match_header("access-token", "secret")
            .match_body(Matcher::Json(serde_json::json!({
                "time_balance_entry": {
                    "employee_id": "42",
                    "amount": 3600.0,
                    "date": "15/05/2023",
                    "observation": "1 hora de trabalho",
                    "withdraw": false
                }
            })))
            .with_status(201)
            .create_async()
            .await;

        let client = PontoMaisClient::with_base_url(&server.url(), "secret");
        client.create_time_balance_entry(&entry(Some("42"))).await.unwrap();
        mock.assert_async().await;
    }

    // Create is not deduplicated: identical entries become two remote rows.
    #[tokio::test]
    async fn create_twice_issues_two_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/time_balance_entries")
            .with_status(201)
            .expect(2)
            .create_async()
            .await;

        let client = PontoMaisClient::with_base_url(&server.url(), "secret");
        let e = entry(Some("42"));
        client.create_time_balance_entry(&e).await.unwrap();
        client.create_time_balance_entry(&e).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_rejection_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/time_balance_entries")
            .with_status(422)
            .with_body("amount invalid")
            .create_async()
            .await;

        let client = PontoMaisClient::with_base_url(&server.url(), "secret");
        match client.create_time_balance_entry(&entry(Some("42"))).await {
            Err(RemoteError::Rejected { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "amount invalid");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_puts_to_entry_and_maps_not_found() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("PUT", "/time_balance_entries/59")
            .with_status(200)
            .create_async()
            .await;
        let _missing = server
            .mock("PUT", "/time_balance_entries/60")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let client = PontoMaisClient::with_base_url(&format!("{}/", server.url()), "secret");
        client.update_time_balance_entry("59", &entry(None)).await.unwrap();
        ok.assert_async().await;

        let err = client
            .update_time_balance_entry("60", &entry(None))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound { .. }));
    }
}
