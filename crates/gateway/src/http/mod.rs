mod wire;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use quiz_core::model::{Answer, Question, QuestionId, ScoreReport, TestId};

use self::wire::{CorrectAnswersEnvelope, QuestionsEnvelope, SubmitBody, SubmitEnvelope};
use crate::contract::{GatewayError, Submission, TestGateway};

/// Gateway backed by the quiz server's JSON API.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn connection(e: reqwest::Error) -> GatewayError {
        GatewayError::Connection(e.to_string())
    }

    fn decode(e: reqwest::Error) -> GatewayError {
        GatewayError::Serialization(e.to_string())
    }

    fn check_status(response: &reqwest::Response) -> Result<(), GatewayError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            warn!(target: "gateway", %status, url = %response.url(), "server returned error status");
            Err(GatewayError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl TestGateway for HttpGateway {
    async fn fetch_questions(&self, test_id: TestId) -> Result<Vec<Question>, GatewayError> {
        let url = self.endpoint(&format!("api/test/{test_id}/questions"));
        debug!(target: "gateway", %test_id, %url, "fetching question list");

        let response = self.client.get(&url).send().await.map_err(Self::connection)?;
        Self::check_status(&response)?;

        let envelope: QuestionsEnvelope = response.json().await.map_err(Self::decode)?;
        let questions = wire::map_questions(envelope)?;
        debug!(target: "gateway", %test_id, count = questions.len(), "question list loaded");
        Ok(questions)
    }

    async fn fetch_correct_answers(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, GatewayError> {
        let url = self.endpoint(&format!("api/question/{question_id}/correct"));
        debug!(target: "gateway", %question_id, %url, "fetching correct answers");

        let response = self.client.get(&url).send().await.map_err(Self::connection)?;
        Self::check_status(&response)?;

        let envelope: CorrectAnswersEnvelope = response.json().await.map_err(Self::decode)?;
        wire::map_correct_answers(envelope)
    }

    async fn submit(&self, submission: &Submission) -> Result<ScoreReport, GatewayError> {
        let url = self.endpoint("api/test/submit");
        let body = SubmitBody::from_submission(submission);
        debug!(
            target: "gateway",
            test_id = %submission.test_id,
            time_spent = submission.time_spent_secs,
            %url,
            "submitting attempt"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::connection)?;
        Self::check_status(&response)?;

        let envelope: SubmitEnvelope = response.json().await.map_err(Self::decode)?;
        wire::map_report(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let gw = gateway("http://localhost:5000");
        assert_eq!(
            gw.endpoint("api/test/7/questions"),
            "http://localhost:5000/api/test/7/questions"
        );

        let gw = gateway("http://localhost:5000/");
        assert_eq!(gw.endpoint("api/test/submit"), "http://localhost:5000/api/test/submit");
    }

    #[test]
    fn endpoint_keeps_path_prefixes() {
        let gw = gateway("https://quiz.example.com/trainer/");
        assert_eq!(
            gw.endpoint("api/question/3/correct"),
            "https://quiz.example.com/trainer/api/question/3/correct"
        );
    }
}
