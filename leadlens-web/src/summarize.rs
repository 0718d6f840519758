//! Contact summarisation: a chat model drives the `query_web_scraper` tool and
//! turns what it scraped into a JSON summary.

use crate::contact::query_page_content;
use crate::fetcher::PageFetcher;
use crate::sink::write_raw_html;
use async_trait::async_trait;
use leadlens_common::{LeadlensError, Result};
use leadlens_llm::traits::{ChatMessage, LlmClient, ToolCall, ToolSpec};
use leadlens_llm::{run_single_tool_round, AgentOutcome, ToolHandler};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use url::Url;

pub const QUERY_WEB_SCRAPER: &str = "query_web_scraper";

pub const SYSTEM_PROMPT: &str = r#"You are a specialized data extractor focused on finding business contact information and company details.
When analyzing web content, identify and extract:
1. Contact Information:
    - Phone numbers
    - Email addresses
    - Physical addresses
    - Contact form URLs
    - Business hours
    - Contact person names and titles
2. Social Media Presence:
    - LinkedIn
    - Facebook
    - Twitter/X
    - Instagram
    - Other social platforms
3. Company Overview:
    - Main products/services
    - Brief company description
    - Key features or specialties

Format all information in a clean, structured JSON format."#;

pub fn user_prompt(url: &str) -> String {
    format!(
        "Please analyze the webpage at {url} and extract all contact information and company details as specified. \
         Focus on finding any possible way to contact the business."
    )
}

pub fn follow_up_prompt(pretty_data: &str) -> String {
    format!(
        "Here's the scraped data from the website:\n\n{pretty_data}\n\n\
         Using this scraped data, create a structured JSON response that includes only the most relevant and important information from the website.\n\
         Ignore head section. Focus on the main body section. Do not include HTML tags or unnecessary details.\n\
         Ensure your response is in valid JSON format without any additional text or comments."
    )
}

/// The single tool offered to the model.
pub fn scraper_tool_spec() -> ToolSpec {
    ToolSpec {
        name: QUERY_WEB_SCRAPER.to_string(),
        description: "Scrapes the content of a web page and returns the structured JSON object with titles, articles, and associated links.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the web page to scrape."
                }
            },
            "required": ["url"]
        }),
    }
}

/// A page the model asked for, and where its HTML was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub url: String,
    pub html_path: PathBuf,
}

#[derive(Debug)]
pub struct ContactSummary {
    pub outcome: AgentOutcome,
    pub pages: Vec<ScrapedPage>,
}

/// `query_web_scraper` backed by a [`PageFetcher`]; dumps each page's raw
/// HTML to `html_path` as soon as it is fetched.
pub struct ScraperTool<'a, F: ?Sized> {
    fetcher: &'a mut F,
    html_path: PathBuf,
    pages: Vec<ScrapedPage>,
}

impl<'a, F> ScraperTool<'a, F>
where
    F: PageFetcher + ?Sized,
{
    pub fn new(fetcher: &'a mut F, html_path: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            html_path: html_path.into(),
            pages: Vec::new(),
        }
    }

    pub fn into_pages(self) -> Vec<ScrapedPage> {
        self.pages
    }
}

fn url_argument(call: &ToolCall) -> Result<String> {
    let raw = call
        .arguments
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            LeadlensError::ToolArguments(format!("`{}` needs a string `url` argument", call.name))
        })?;
    Url::parse(raw)
        .map_err(|e| LeadlensError::ToolArguments(format!("`{raw}` is not a usable URL: {e}")))?;
    Ok(raw.to_string())
}

#[async_trait]
impl<F> ToolHandler for ScraperTool<'_, F>
where
    F: PageFetcher + ?Sized,
{
    async fn call(&mut self, call: &ToolCall) -> Result<Value> {
        let url = url_argument(call)?;
        let data = query_page_content(&mut *self.fetcher, &url).await?;
        write_raw_html(&self.html_path, &data.raw_html)?;
        self.pages.push(ScrapedPage {
            url,
            html_path: self.html_path.clone(),
        });
        Ok(serde_json::to_value(&data)?)
    }

    fn follow_up(&self, pretty_data: &str) -> String {
        follow_up_prompt(pretty_data)
    }
}

/// Ask the model about `url`, let it scrape, and return its summary.
///
/// The fetcher is left open; [`crate::run_contact_flow`] owns closing it.
pub async fn summarize_contact_page<F>(
    client: &dyn LlmClient,
    fetcher: &mut F,
    url: &str,
    html_path: &Path,
) -> Result<ContactSummary>
where
    F: PageFetcher + ?Sized,
{
    let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt(url))];
    let mut tool = ScraperTool::new(fetcher, html_path);
    let outcome =
        run_single_tool_round(client, messages, &[scraper_tool_spec()], &mut tool).await?;
    Ok(ContactSummary {
        outcome,
        pages: tool.into_pages(),
    })
}
