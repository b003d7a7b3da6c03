use std::path::PathBuf;

use async_trait::async_trait;
use rolelink_shared::types::RoleChangeEvent;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::consumer::{EventSource, StreamMessage};
use crate::errors::ConsumerError;

/// Reads one JSON-encoded [`RoleChangeEvent`] per line from a file, or from
/// stdin when no path is given.
///
/// Blank lines are skipped. Lines that fail to decode are reported as
/// [`StreamMessage::Error`] and reading continues.
pub struct JsonLinesSource {
    path: Option<PathBuf>,
}

impl JsonLinesSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn stdin() -> Self {
        Self { path: None }
    }

    async fn pump<R>(
        &self,
        reader: R,
        sender: &mpsc::Sender<StreamMessage>,
    ) -> Result<(), ConsumerError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut lines = BufReader::new(reader).lines();
        let mut line_number = 0usize;
        let mut decoded = 0usize;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| ConsumerError::ReadingSource(e.to_string()))?
        {
            line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let message = match serde_json::from_str::<RoleChangeEvent>(line) {
                Ok(event) => {
                    decoded += 1;
                    StreamMessage::RoleChange(event)
                }
                Err(e) => {
                    warn!(line = line_number, error = %e, "Skipping undecodable event");
                    StreamMessage::Error(ConsumerError::DecodingEvent {
                        line: line_number,
                        message: e.to_string(),
                    })
                }
            };

            sender
                .send(message)
                .await
                .map_err(|e| ConsumerError::ChannelSend(e.to_string()))?;
        }

        info!(lines = line_number, events = decoded, "Event source exhausted");
        Ok(())
    }
}

#[async_trait]
impl EventSource for JsonLinesSource {
    async fn run(&self, sender: mpsc::Sender<StreamMessage>) -> Result<(), ConsumerError> {
        match &self.path {
            Some(path) => {
                debug!(path = %path.display(), "Reading events from file");
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| ConsumerError::OpeningSource(format!("{}: {e}", path.display())))?;
                self.pump(file, &sender).await?;
            }
            None => {
                debug!("Reading events from stdin");
                self.pump(tokio::io::stdin(), &sender).await?;
            }
        }

        sender
            .send(StreamMessage::End)
            .await
            .map_err(|e| ConsumerError::ChannelSend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolelink_shared::types::{GuildId, MemberId, RoleId};

    #[tokio::test]
    async fn test_reads_events_and_reports_bad_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("events.ndjson");
        tokio::fs::write(
            &path,
            concat!(
                r#"{"guild_id": 1, "member_id": 2, "roles_before": [], "roles_after": [3]}"#,
                "\n\n",
                "not json\n",
                r#"{"guild_id": 1, "member_id": 2, "roles_before": [3]}"#,
                "\n",
            ),
        )
        .await
        .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        JsonLinesSource::from_path(&path).run(tx).await.unwrap();

        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }

        assert_eq!(messages.len(), 4);
        match &messages[0] {
            StreamMessage::RoleChange(event) => {
                assert_eq!(event.guild_id, GuildId(1));
                assert_eq!(event.member_id, MemberId(2));
                assert!(event.roles_after.contains(&RoleId(3)));
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert!(matches!(
            messages[1],
            StreamMessage::Error(ConsumerError::DecodingEvent { line: 3, .. })
        ));
        match &messages[2] {
            StreamMessage::RoleChange(event) => assert!(event.roles_after.is_empty()),
            other => panic!("unexpected message {other:?}"),
        }
        assert!(matches!(messages[3], StreamMessage::End));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let (tx, _rx) = mpsc::channel(1);
        let result = JsonLinesSource::from_path("/nonexistent/events.ndjson").run(tx).await;
        assert!(matches!(result, Err(ConsumerError::OpeningSource(_))));
    }
}
