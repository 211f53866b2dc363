use precis_common::{PageContent, RenderMode, Result};
use precis_llm::{SummaryClient, SummaryRequestBuilder, SummaryResult};
use precis_web::Fetcher;
use std::fmt;
use std::time::Instant;

/// Progress milestones reported while a page is summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Fetched,
    Summarizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetching => "Fetching website content...",
            Stage::Fetched => "Website content fetched!",
            Stage::Summarizing => "Generating summary...",
        })
    }
}

/// Fetch, extract, prompt, summarize. Holds no per-run state.
pub struct Pipeline {
    fetcher: Fetcher,
    builder: SummaryRequestBuilder,
    summary: SummaryClient,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, builder: SummaryRequestBuilder, summary: SummaryClient) -> Self {
        Self {
            fetcher,
            builder,
            summary,
        }
    }

    pub async fn run(
        &self,
        url: &str,
        mode: RenderMode,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<SummaryResult> {
        let started = Instant::now();
        tracing::info!(%url, %mode, "pipeline.start");

        on_stage(Stage::Fetching);
        let page: PageContent = self.fetcher.read(url, mode).await.inspect_err(|e| {
            tracing::warn!(%url, %mode, error = %e, "pipeline.fetch.failed");
        })?;
        on_stage(Stage::Fetched);
        tracing::debug!(
            url = %page.source_url(),
            title = %page.title(),
            body_chars = page.body().len(),
            "pipeline.page"
        );

        let request = self.builder.for_page(&page);
        on_stage(Stage::Summarizing);
        let result = self.summary.summarize(&request).await.inspect_err(|e| {
            tracing::warn!(%url, error = %e, "pipeline.summary.failed");
        })?;

        tracing::info!(
            %url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = result.text.len(),
            "pipeline.done"
        );
        Ok(result)
    }
}
