//! In-process stand-ins for the remote collaborators, shared by pipeline and
//! router tests.

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use zip::write::SimpleFileOptions;

use crate::config::Config;
use crate::google::{CorpusSource, FetchError, FetchPlan, FetchedCorpus};
use crate::llm_client::{Inference, LlmError};
use crate::models::record::RecordRow;
use crate::sales_log::SalesLog;
use crate::state::AppState;

/// Returns canned template/record results and remembers every plan it saw.
pub struct StubCorpus {
    pub template: Result<String, FetchError>,
    pub records: Result<Vec<RecordRow>, FetchError>,
    pub plans: Mutex<Vec<FetchPlan>>,
}

impl StubCorpus {
    pub fn new(template: &str, records: Vec<RecordRow>) -> Self {
        Self {
            template: Ok(template.to_string()),
            records: Ok(records),
            plans: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            template: Err(error.clone()),
            records: Err(error),
            plans: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.plans.lock().unwrap().len()
    }
}

#[async_trait]
impl CorpusSource for StubCorpus {
    async fn fetch(&self, plan: &FetchPlan) -> FetchedCorpus {
        self.plans.lock().unwrap().push(plan.clone());
        FetchedCorpus {
            template: self.template.clone(),
            records: plan.records.as_ref().map(|_| self.records.clone()),
        }
    }
}

/// Answers with a fixed reply and records the prompts it was given.
pub struct RecordingInference {
    reply: Option<String>,
    pub prompts: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl RecordingInference {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails as an upstream API error.
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl Inference for RecordingInference {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        })
    }
}

pub fn record(date: &str, subject: &str, body: &str, flag: &str) -> RecordRow {
    RecordRow::new(
        [date, "sender", "to", subject, body, flag]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    )
}

/// A minimal .docx whose body holds one paragraph per entry.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn app_state(
    corpus: Arc<StubCorpus>,
    llm: Arc<RecordingInference>,
    sales_log_path: &std::path::Path,
) -> AppState {
    let path = sales_log_path.to_string_lossy().to_string();
    AppState {
        config: Config::for_tests(&path),
        corpus,
        llm,
        sales_log: SalesLog::new(sales_log_path),
    }
}
