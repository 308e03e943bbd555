//! STATUS (RFC 3501 6.3.10). Always answers every item the client
//! asks for in practice.

use crate::fake_imap::io::{complete, write_line};
use crate::fake_imap::store::Store;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

pub async fn handle_status<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    name: &str,
    store: &Store,
    stream: &mut BufReader<S>,
) {
    let Some(folder) = store.folder(name).filter(|f| f.selectable()) else {
        complete(stream, tag, "NO Mailbox does not exist").await;
        return;
    };

    let line = format!(
        "* STATUS \"{}\" (MESSAGES {} RECENT 0 UIDNEXT {} UIDVALIDITY 1 UNSEEN {})\r\n",
        folder.name,
        folder.len(),
        folder.uid_next(),
        folder.unseen(),
    );
    if write_line(stream, &line).await.is_ok() {
        complete(stream, tag, "OK STATUS completed").await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::capture;
    use crate::fake_imap::store::StoreBuilder;

    #[tokio::test]
    async fn reports_counters() {
        let store = StoreBuilder::new()
            .folder("INBOX")
            .message(1, true, b"a")
            .message(7, false, b"b")
            .build();
        let output = capture(|mut s| async move {
            handle_status("A4", "INBOX", &store, &mut s).await;
            s
        })
        .await;
        assert!(output.starts_with(
            "* STATUS \"INBOX\" (MESSAGES 2 RECENT 0 UIDNEXT 8 UIDVALIDITY 1 UNSEEN 1)\r\n"
        ));
        assert!(output.ends_with("A4 OK STATUS completed\r\n"));
    }

    #[tokio::test]
    async fn unknown_folder_is_no() {
        let store = StoreBuilder::new().build();
        let output = capture(|mut s| async move {
            handle_status("A4", "Gone", &store, &mut s).await;
            s
        })
        .await;
        assert_eq!(output, "A4 NO Mailbox does not exist\r\n");
    }
}
