//! SELECT (RFC 3501 6.3.1).
//!
//! A selectable folder gets the usual FLAGS / EXISTS / RECENT /
//! UIDVALIDITY / UIDNEXT data and a tagged OK. A folder configured with
//! a select warning additionally gets an untagged `* NO <text>` before
//! the OK, the way Gmail reports nonexistent namespace nodes.
//! Unknown, `\Noselect` or refusing folders get a tagged NO.
//!
//! Returns the name of the folder now selected. Per RFC 3501 a failed
//! SELECT leaves nothing selected.

use crate::fake_imap::io::{complete, write_line};
use crate::fake_imap::store::Store;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

pub async fn handle_select<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    name: &str,
    store: &Store,
    stream: &mut BufReader<S>,
) -> Option<String> {
    let Some(folder) = store.folder(name).filter(|f| f.selectable()) else {
        complete(stream, tag, "NO Mailbox cannot be selected").await;
        return None;
    };

    let lines = [
        "* FLAGS (\\Seen \\Answered \\Flagged \\Deleted \\Draft)\r\n".to_string(),
        format!("* {} EXISTS\r\n", folder.len()),
        "* 0 RECENT\r\n".to_string(),
        "* OK [UIDVALIDITY 1] UIDs valid\r\n".to_string(),
        format!("* OK [UIDNEXT {}] Predicted next UID\r\n", folder.uid_next()),
    ];
    for line in &lines {
        if write_line(stream, line).await.is_err() {
            return None;
        }
    }
    if let Some(warning) = &folder.select_warning {
        let _ = write_line(stream, &format!("* NO {warning}\r\n")).await;
    }

    complete(stream, tag, "OK [READ-WRITE] SELECT completed").await;
    Some(folder.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::capture;
    use crate::fake_imap::store::StoreBuilder;

    async fn run(name: &'static str, store: Store) -> (String, Option<String>) {
        let mut selected = None;
        let slot = &mut selected;
        let output = capture(|mut s| async move {
            *slot = handle_select("A3", name, &store, &mut s).await;
            s
        })
        .await;
        (output, selected)
    }

    #[tokio::test]
    async fn selects_existing_folder() {
        let store = StoreBuilder::new()
            .folder("INBOX")
            .message(4, false, b"x")
            .build();
        let (output, selected) = run("inbox", store).await;

        assert_eq!(selected.as_deref(), Some("INBOX"));
        assert!(output.contains("* 1 EXISTS\r\n"));
        assert!(output.contains("[UIDNEXT 5]"));
        assert!(output.ends_with("A3 OK [READ-WRITE] SELECT completed\r\n"));
    }

    #[tokio::test]
    async fn unknown_folder_is_refused() {
        let (output, selected) = run("Nope", StoreBuilder::new().build()).await;
        assert!(selected.is_none());
        assert_eq!(output, "A3 NO Mailbox cannot be selected\r\n");
    }

    #[tokio::test]
    async fn noselect_folder_is_refused() {
        let store = StoreBuilder::new()
            .folder("[Gmail]")
            .attribute("\\Noselect")
            .build();
        let (output, selected) = run("[Gmail]", store).await;
        assert!(selected.is_none());
        assert!(output.starts_with("A3 NO"));
    }

    #[tokio::test]
    async fn warning_is_sent_untagged_before_ok() {
        let store = StoreBuilder::new()
            .folder("Broken")
            .warn_on_select("Unknown Mailbox (Failure)")
            .build();
        let (output, selected) = run("Broken", store).await;

        assert_eq!(selected.as_deref(), Some("Broken"));
        let warning = output.find("* NO Unknown Mailbox (Failure)\r\n").unwrap();
        let ok = output.find("A3 OK").unwrap();
        assert!(warning < ok);
    }
}
