//! NOOP. With a mailbox selected, reports its current size so clients
//! notice messages appended over other connections.

use crate::fake_imap::io::{complete, write_line};
use crate::fake_imap::store::Store;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

pub async fn handle_noop<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    store: &Store,
    selected: Option<&str>,
    stream: &mut BufReader<S>,
) {
    if let Some(folder) = selected.and_then(|name| store.folder(name)) {
        let _ = write_line(stream, &format!("* {} EXISTS\r\n", folder.len())).await;
    }
    complete(stream, tag, "OK NOOP completed").await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::capture;
    use crate::fake_imap::store::StoreBuilder;

    #[tokio::test]
    async fn bare_ok_without_selection() {
        let store = StoreBuilder::new().folder("INBOX").build();
        let output = capture(|mut s| async move {
            handle_noop("A1", &store, None, &mut s).await;
            s
        })
        .await;
        assert_eq!(output, "A1 OK NOOP completed\r\n");
    }

    #[tokio::test]
    async fn reports_exists_for_selected_folder() {
        let store = StoreBuilder::new()
            .folder("INBOX")
            .message(1, true, b"x")
            .message(2, true, b"y")
            .build();
        let output = capture(|mut s| async move {
            handle_noop("A1", &store, Some("INBOX"), &mut s).await;
            s
        })
        .await;
        assert!(output.starts_with("* 2 EXISTS\r\n"));
    }
}
