use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};

use crate::core::app::App;
use crate::core::config::Config;
use crate::core::context::AppContext;
use crate::core::i18n::Language;
use crate::core::providers::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::ui::markdown::Segment;
use crate::ui::math::{MathRenderError, MathRenderer, RenderedMath};

/// Records every request and answers from a queue of canned responses.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Request(message.into())),
            None => Err(TransportError::Request("no response queued".into())),
        }
    }
}

pub struct FailingMathRenderer;

impl MathRenderer for FailingMathRenderer {
    fn render(&self, _segment: &Segment) -> Result<RenderedMath, MathRenderError> {
        Err(MathRenderError::UnknownCommand("forced".to_string()))
    }
}

/// 2024-01-01 12:00:00 local time.
pub fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// An app wired to `transport`, with config and history under `dir`, English
/// UI and a DeepSeek key configured.
pub fn create_test_app(dir: &Path, transport: Arc<RecordingTransport>) -> App {
    let mut config = Config {
        language: Some(Language::En),
        history_dir: Some(dir.join("history")),
        ..Default::default()
    };
    config.set_api_key(crate::core::providers::ProviderId::DeepSeek, "test-key");
    let context = AppContext::from_parts(dir.join("config.toml"), config, transport);
    App::new(context, Default::default(), fixed_time())
}
