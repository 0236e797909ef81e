use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tracing::warn;

#[async_trait]
pub trait TokenPrompt: Send {
    /// Asks the user for an access token until a non-empty one is entered. Returns `None` when
    /// the input is closed. `hint` is a previously entered token, shown to ease correcting it.
    async fn ask(&mut self, hint: Option<&str>) -> Option<String>;
}

/// Prompts on stdout and reads answers line by line.
#[derive(Debug)]
pub struct LinePrompt<R> {
    lines: LinesStream<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        LinePrompt {
            lines: LinesStream::new(reader.lines()),
        }
    }

    /// Reads the next line of input, e.g. a control command. Cancel safe.
    pub async fn next_line(&mut self) -> Option<io::Result<String>> {
        self.lines.next().await
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> TokenPrompt for LinePrompt<R> {
    async fn ask(&mut self, hint: Option<&str>) -> Option<String> {
        match hint {
            Some(hint) => println!("Enter your Mapbox access token (previous: {}):", hint),
            None => println!("Enter your Mapbox access token:"),
        }

        loop {
            let line = match self.lines.next().await? {
                Ok(line) => line,
                Err(e) => {
                    warn!("⚠️ Unable to read the access token: {}", e);
                    return None;
                }
            };

            let token = line.trim();
            if token.is_empty() {
                println!("Please enter an access token.");
                continue;
            }

            return Some(token.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ask_skips_empty_lines_and_trims_the_token() {
        let mut prompt = LinePrompt::new("\n   \n  pk.token  \nstart\n".as_bytes());

        assert_eq!(prompt.ask(None).await, Some("pk.token".to_string()));

        assert_eq!(prompt.next_line().await.unwrap().unwrap(), "start");
        assert!(prompt.next_line().await.is_none());
    }

    #[tokio::test]
    async fn ask_returns_none_when_the_input_is_closed() {
        let mut prompt = LinePrompt::new("\n".as_bytes());

        assert_eq!(prompt.ask(Some("pk.old")).await, None);
    }
}
