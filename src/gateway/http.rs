//! [`PageService`] over HTTP.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    LineDto, PageData, PageService, RegionDto, SavedLine, SavedRegion, SuggestRequest, Suggestion,
    TextUpdate,
};
use crate::config::ServerConfig;
use crate::error::GatewayError;
use crate::model::PageRef;

/// Talks JSON to the page service under a base URL.
pub struct HttpPageService {
    base_url: String,
    agent: ureq::Agent,
    /// Separate agent with the long timeout for recognition requests
    llm_agent: ureq::Agent,
}

#[derive(Serialize)]
struct PageBody<'a, T: Serialize> {
    workspace_id: &'a str,
    path: &'a str,
    #[serde(flatten)]
    inner: T,
}

#[derive(Serialize)]
struct RegionPayload<'a> {
    region: &'a RegionDto,
}

#[derive(Serialize)]
struct LinePayload<'a> {
    line: &'a LineDto,
}

#[derive(Serialize)]
struct RegionIdPayload<'a> {
    region_id: &'a str,
}

#[derive(Serialize)]
struct LineIdPayload<'a> {
    line_id: &'a str,
}

#[derive(Serialize)]
struct TranscriptionPayload<'a> {
    lines: &'a [TextUpdate],
}

#[derive(Deserialize)]
struct RegionResponse {
    region: SavedRegion,
}

#[derive(Deserialize)]
struct LineResponse {
    line: SavedLine,
}

#[derive(Deserialize)]
struct UpdatedResponse {
    #[serde(default)]
    updated: usize,
}

#[derive(Deserialize)]
struct SuggestResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    suggestion: Option<Suggestion>,
}

fn default_ok() -> bool {
    true
}

impl HttpPageService {
    pub fn new(config: &ServerConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build();
        let llm_agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent,
            llm_agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        agent: &ureq::Agent,
        page: &PageRef,
        path: &str,
        inner: B,
    ) -> Result<R, GatewayError> {
        let body = serde_json::to_string(&PageBody {
            workspace_id: &page.workspace_id,
            path: &page.path,
            inner,
        })
        .map_err(GatewayError::decode)?;

        log::debug!("POST {} ({} bytes)", path, body.len());
        let resp = agent
            .post(&self.url(path))
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_string(&body)
            .map_err(map_error)?;
        read_json(resp)
    }
}

fn read_json<R: DeserializeOwned>(resp: ureq::Response) -> Result<R, GatewayError> {
    let body = resp.into_string().map_err(GatewayError::decode)?;
    serde_json::from_str(&body).map_err(GatewayError::decode)
}

fn map_error(err: ureq::Error) -> GatewayError {
    match err {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            GatewayError::http(code, body.trim())
        }
        ureq::Error::Transport(transport) => GatewayError::Transport(transport.to_string()),
    }
}

impl PageService for HttpPageService {
    fn load_page(&self, page: &PageRef) -> Result<PageData, GatewayError> {
        log::debug!("GET /api/page for {}", page);
        let resp = self
            .agent
            .get(&self.url("/api/page"))
            .query("workspace_id", &page.workspace_id)
            .query("path", &page.path)
            .set("Accept", "application/json")
            .call()
            .map_err(map_error)?;
        read_json(resp)
    }

    fn save_region(
        &self,
        page: &PageRef,
        region: &RegionDto,
    ) -> Result<SavedRegion, GatewayError> {
        let resp: RegionResponse =
            self.post(&self.agent, page, "/api/region", RegionPayload { region })?;
        Ok(resp.region)
    }

    fn delete_region(&self, page: &PageRef, region_id: &str) -> Result<(), GatewayError> {
        let _: serde_json::Value = self.post(
            &self.agent,
            page,
            "/api/region/delete",
            RegionIdPayload { region_id },
        )?;
        Ok(())
    }

    fn save_line(&self, page: &PageRef, line: &LineDto) -> Result<SavedLine, GatewayError> {
        let resp: LineResponse = self.post(&self.agent, page, "/api/line", LinePayload { line })?;
        Ok(resp.line)
    }

    fn delete_line(&self, page: &PageRef, line_id: &str) -> Result<(), GatewayError> {
        let _: serde_json::Value =
            self.post(&self.agent, page, "/api/line/delete", LineIdPayload { line_id })?;
        Ok(())
    }

    fn save_transcription(
        &self,
        page: &PageRef,
        lines: &[TextUpdate],
    ) -> Result<usize, GatewayError> {
        let resp: UpdatedResponse = self.post(
            &self.agent,
            page,
            "/api/transcription",
            TranscriptionPayload { lines },
        )?;
        Ok(resp.updated)
    }

    fn suggest_transcription(
        &self,
        page: &PageRef,
        request: &SuggestRequest,
    ) -> Result<Suggestion, GatewayError> {
        let resp: SuggestResponse =
            self.post(&self.llm_agent, page, "/api/llm/transcribe", request)?;
        if !resp.ok {
            return Err(GatewayError::Rejected(
                resp.error.unwrap_or_else(|| "transcription failed".to_string()),
            ));
        }
        resp.suggestion
            .ok_or_else(|| GatewayError::decode("response has no transcription"))
    }
}
