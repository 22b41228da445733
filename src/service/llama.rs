//! LlamaParse HTTP client.
//!
//! Upload, poll, then fetch the per-page JSON result. The whole exchange is
//! bounded by the caller's timeout; this client only bounds each request.

use super::{DocumentParser, ParsedPage};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Default LlamaParse endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cloud.llamaindex.ai";

/// Instruction sent with every upload: separate body text from tables, emit
/// tables as HTML, merge multi-line headers, repeat merged cells, align
/// ragged rows to the header and never summarize.
pub const DEFAULT_PARSING_INSTRUCTION: &str = "본문과 표를 구분해 주세요.\n\
- 표의 첫 행이 여러 줄로 구성되어 있다면, 이를 헤더로 간주하고 병합해 하나의 헤더로 만들어주세요.\n\
- 표는 정확히 html 형식으로 변환해주세요.\n\
- 표의 헤더는 반드시 각 열에 맞춰 분리해주세요.\n\
- 줄 바꿈 태그(<br/>)는 절대 사용하지 말고, 여러 조건이 있는 셀은 슬래시(/) 또는 쉼표(,)로 구분해주세요.\n\
- 병합된 셀은 해당 열에 맞춰 반복 삽입해주세요.\n\
- 열 수가 불균형한 행은 무조건 헤더 열 수에 맞춰 정렬해주세요.\n\
- 요약이나 설명은 절대 포함하지 마세요.\n";

/// LlamaParse client configuration.
#[derive(Debug, Clone)]
pub struct LlamaParseConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// Service base URL
    pub base_url: String,

    /// Parsing instruction sent with the upload
    pub parsing_instruction: String,

    /// Document language hint
    pub language: String,

    /// Delay between job status polls
    pub poll_interval: Duration,

    /// Timeout for each HTTP request
    pub request_timeout: Duration,

    /// Longest time to keep polling a job before giving up
    pub max_job_wait: Duration,
}

impl LlamaParseConfig {
    /// Create a configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            parsing_instruction: DEFAULT_PARSING_INSTRUCTION.to_string(),
            language: "ko".to_string(),
            poll_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(60),
            max_job_wait: Duration::from_secs(300),
        }
    }

    /// Set the service base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the parsing instruction.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.parsing_instruction = instruction.into();
        self
    }

    /// Set the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the job polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the polling deadline for one job.
    pub fn with_max_job_wait(mut self, wait: Duration) -> Self {
        self.max_job_wait = wait;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct JsonResult {
    #[serde(default)]
    pages: Vec<ResultPage>,
}

#[derive(Debug, Deserialize)]
struct ResultPage {
    page: u32,
    #[serde(default)]
    md: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ResultPage {
    fn into_parsed(self) -> ParsedPage {
        let text = match self.md {
            Some(md) if !md.trim().is_empty() => md,
            _ => self.text.unwrap_or_default(),
        };
        ParsedPage::new(self.page, text)
    }
}

/// LlamaParse document parser.
pub struct LlamaParseClient {
    client: Client,
    config: LlamaParseConfig,
}

impl LlamaParseClient {
    /// Create a client.
    pub fn new(config: LlamaParseConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("LlamaParse API key is empty".into()));
        }
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// The client configuration.
    pub fn config(&self) -> &LlamaParseConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn upload(&self, pdf: &Path) -> Result<String> {
        let data = tokio::fs::read(pdf).await?;
        let file_name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let file = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new()
            .part("file", file)
            .text("parsing_instruction", self.config.parsing_instruction.clone())
            .text("result_type", "markdown")
            .text("language", self.config.language.clone());

        let response = self
            .client
            .post(self.url("/api/parsing/upload"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ExternalParse(format!(
                "upload rejected: {} - {}",
                status, body
            )));
        }

        let upload: UploadResponse = response.json().await?;
        Ok(upload.id)
    }

    async fn wait_for_job(&self, job_id: &str) -> Result<()> {
        let deadline = Instant::now() + self.config.max_job_wait;
        loop {
            let status: JobStatus = self
                .client
                .get(self.url(&format!("/api/parsing/job/{}", job_id)))
                .bearer_auth(&self.config.api_key)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            match status.status.as_str() {
                "SUCCESS" => return Ok(()),
                "ERROR" | "CANCELED" => {
                    return Err(Error::ExternalParse(format!(
                        "job {} ended with status {}",
                        job_id, status.status
                    )))
                }
                other => {
                    log::debug!("LlamaParse job {} is {}", job_id, other);
                    if poll_deadline_passed(deadline, self.config.poll_interval) {
                        log::warn!("LlamaParse job {} still {} at deadline", job_id, other);
                        return Err(Error::Timeout(self.config.max_job_wait));
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    async fn fetch_pages(&self, job_id: &str) -> Result<Vec<ParsedPage>> {
        let result: JsonResult = self
            .client
            .get(self.url(&format!("/api/parsing/job/{}/result/json", job_id)))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(result
            .pages
            .into_iter()
            .map(ResultPage::into_parsed)
            .collect())
    }
}

/// Check if sleeping another `interval` would overrun `deadline`.
fn poll_deadline_passed(deadline: Instant, interval: Duration) -> bool {
    Instant::now() + interval > deadline
}

#[async_trait]
impl DocumentParser for LlamaParseClient {
    fn name(&self) -> &str {
        "llamaparse"
    }

    async fn parse_pages(&self, pdf: &Path) -> Result<Vec<ParsedPage>> {
        let job_id = self.upload(pdf).await?;
        log::info!("LlamaParse job {} started for {}", job_id, pdf.display());
        self.wait_for_job(&job_id).await?;
        let pages = self.fetch_pages(&job_id).await?;
        log::info!("LlamaParse job {} returned {} pages", job_id, pages.len());
        Ok(pages)
    }
}
