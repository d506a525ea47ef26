use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{
    NewSurvey, ResponsePayload, SubmitReceipt, Survey, SurveyPatch, SurveyResults,
};

/// Thin JSON client for the survey service. One request per call, no retry,
/// no enforced timeout; non-2xx statuses surface as `ApiError::Server`.
#[derive(Debug, Clone)]
pub struct SurveyApi {
    client: Client,
    base_url: String,
}

impl SurveyApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(SurveyApi {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "survey api request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(
                status.as_u16(),
                &String::from_utf8_lossy(&bytes),
            ));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn list_surveys(&self) -> Result<Vec<Survey>, ApiError> {
        self.send(Method::GET, "/surveys/", None::<&()>).await
    }

    pub async fn fetch_survey(
        &self,
        id: i64,
        public_link: Option<&str>,
    ) -> Result<Survey, ApiError> {
        let path = survey_path(id, public_link);
        self.send(Method::GET, &path, None::<&()>).await
    }

    pub async fn create_survey(&self, survey: &NewSurvey) -> Result<Survey, ApiError> {
        self.send(Method::POST, "/surveys/", Some(survey)).await
    }

    pub async fn update_survey(&self, id: i64, patch: &SurveyPatch) -> Result<Survey, ApiError> {
        self.send(Method::PATCH, &format!("/surveys/{id}/"), Some(patch))
            .await
    }

    pub async fn submit_response(
        &self,
        payload: &ResponsePayload,
    ) -> Result<SubmitReceipt, ApiError> {
        self.send(Method::POST, "/responses/", Some(payload)).await
    }

    pub async fn fetch_results(&self, id: i64) -> Result<SurveyResults, ApiError> {
        self.send(Method::GET, &format!("/surveys/{id}/results/"), None::<&()>)
            .await
    }
}

fn survey_path(id: i64, public_link: Option<&str>) -> String {
    match public_link {
        Some(link) => format!("/surveys/{id}/public/{link}/"),
        None => format!("/surveys/{id}/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_collapsed() {
        let api = SurveyApi::new("http://localhost:8000/api/").unwrap();
        assert_eq!(api.url("/surveys/"), "http://localhost:8000/api/surveys/");

        let api = SurveyApi::new("http://localhost:8000/api").unwrap();
        assert_eq!(api.url("/surveys/"), "http://localhost:8000/api/surveys/");
    }

    #[test]
    fn public_surveys_use_the_public_path() {
        assert_eq!(survey_path(5, None), "/surveys/5/");
        assert_eq!(survey_path(5, Some("ab12cd34")), "/surveys/5/public/ab12cd34/");
    }
}
