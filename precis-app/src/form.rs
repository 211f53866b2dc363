//! Line-oriented form: ask for a URL and a render flag, print the summary.

use crate::pipeline::Pipeline;
use anyhow::Result;
use precis_common::RenderMode;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const QUIT: &str = ":q";

#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Line(String),
    Quit,
}

async fn prompt<R, W>(input: &mut R, out: &mut W, question: &str) -> Result<Answer>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{question}: ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(Answer::Quit);
    }
    let line = line.trim();
    if line == QUIT {
        return Ok(Answer::Quit);
    }
    Ok(Answer::Line(line.to_string()))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Serve the form until EOF or `:q`. Failed runs are reported and the form
/// asks again.
pub async fn run<R, W>(pipeline: &Pipeline, mut input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "Website Summarizer (type {QUIT} to quit)")?;
    loop {
        let url = match prompt(&mut input, out, "Enter the website URL").await? {
            Answer::Quit => break,
            Answer::Line(url) if url.is_empty() => {
                writeln!(out, "Please enter a valid URL.")?;
                continue;
            }
            Answer::Line(url) => url,
        };
        let headless = match prompt(
            &mut input,
            out,
            "Use a headless browser for JavaScript-heavy pages? [y/N]",
        )
        .await?
        {
            Answer::Quit => break,
            Answer::Line(answer) => is_yes(&answer),
        };

        let mode = RenderMode::from_flag(headless);
        let mut status_err = None;
        let outcome = pipeline
            .run(&url, mode, |stage| {
                if status_err.is_none() {
                    status_err = writeln!(out, "{stage}").err();
                }
            })
            .await;
        if let Some(e) = status_err {
            return Err(e.into());
        }
        match outcome {
            Ok(summary) => writeln!(out, "\nSummary:\n{}\n", summary.text)?,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => writeln!(out, "Error: {e}\n")?,
        }
    }
    tracing::info!("form.closed");
    Ok(())
}
