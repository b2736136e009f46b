//! Headless mirror client: `taskboard watch`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use taskboard::board::{Board, SystemClock, UuidIds};
use taskboard::config::TaskboardConfig;
use taskboard::sync::{Connector, Session, SessionEvent, WsConnector};

pub async fn cmd_watch(config: TaskboardConfig, url: Option<String>) -> Result<()> {
    let url = url.unwrap_or(config.client.url);
    let mut session = Session::new(WsConnector::new(url.as_str()), Arc::new(UuidIds), Arc::new(SystemClock));

    session
        .open()
        .await
        .with_context(|| format!("Failed to connect to {}", url))?;
    info!(url = %url, "watching board");

    watch_loop(&mut session).await;
    Ok(())
}

/// Log every board replacement and presence change until the channel closes.
/// Returns the number of boards received.
async fn watch_loop<C: Connector>(session: &mut Session<C>) -> usize {
    let mut boards = 0;
    while let Some(event) = session.next_event().await {
        match event {
            SessionEvent::BoardReplaced => {
                boards += 1;
                if let Some(board) = session.board() {
                    log_board(board);
                }
            }
            SessionEvent::PresenceChanged(connected) => info!(connected, "presence changed"),
            SessionEvent::Disconnected => {
                info!("disconnected from coordination point");
                break;
            }
        }
    }
    boards
}

fn log_board(board: &Board) {
    let columns: Vec<String> = board
        .ordered_columns()
        .map(|c| format!("{} ({})", c.title, c.task_ids.len()))
        .collect();
    info!(
        columns = board.column_order.len(),
        tasks = board.tasks.len(),
        valid = board.is_valid(),
        layout = %columns.join(" | "),
        "board replaced"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use taskboard::board::SequentialIds;
    use taskboard::errors::SyncError;
    use taskboard::sync::{ClientMessage, ServerMessage, Transport};

    struct Replay(VecDeque<ServerMessage>);

    #[async_trait]
    impl Transport for Replay {
        async fn send(&mut self, _message: &ClientMessage) -> Result<(), SyncError> {
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<ServerMessage>, SyncError> {
            Ok(self.0.pop_front())
        }

        async fn close(&mut self) -> Result<(), SyncError> {
            Ok(())
        }
    }

    struct ReplayConnector(Mutex<Option<VecDeque<ServerMessage>>>);

    #[async_trait]
    impl Connector for ReplayConnector {
        type Transport = Replay;

        async fn open(&self) -> Result<Replay, SyncError> {
            let script = self.0.lock().unwrap().take().unwrap_or_default();
            Ok(Replay(script))
        }
    }

    #[tokio::test]
    async fn test_watch_loop_mirrors_until_channel_closes() {
        let first = Board::with_columns(&["To Do"], &SequentialIds::new("c"));
        let second = Board::with_columns(&["To Do", "Done"], &SequentialIds::new("d"));
        let script = VecDeque::from(vec![
            ServerMessage::BoardState(first),
            ServerMessage::Presence(2),
            ServerMessage::BoardState(second.clone()),
        ]);
        let mut session = Session::new(
            ReplayConnector(Mutex::new(Some(script))),
            Arc::new(SequentialIds::new("t")),
            Arc::new(SystemClock),
        );
        session.open().await.unwrap();

        let boards = watch_loop(&mut session).await;
        assert_eq!(boards, 2);
        assert_eq!(session.board(), Some(&second));
        assert_eq!(session.presence(), 2);
    }
}
