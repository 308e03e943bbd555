//! APPEND (RFC 3501 6.3.11).
//!
//! The session loop reads the message literal; this handler stores it
//! under the next free UID. Unknown or unselectable folders get
//! `NO [TRYCREATE]`; an empty message is refused outright.

use crate::fake_imap::io::complete;
use crate::fake_imap::store::{Store, StoredMessage};
use std::sync::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

pub async fn handle_append<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    name: &str,
    raw: Vec<u8>,
    store: &Mutex<Store>,
    stream: &mut BufReader<S>,
) {
    if raw.is_empty() {
        complete(stream, tag, "NO Refusing empty message").await;
        return;
    }

    let appended = {
        let mut store = store.lock().unwrap();
        store
            .folder_mut(name)
            .filter(|f| f.selectable())
            .map(|folder| {
                let uid = folder.uid_next();
                folder.messages.push(StoredMessage {
                    uid,
                    seen: false,
                    deleted: false,
                    raw,
                });
                uid
            })
    };

    match appended {
        Some(uid) => complete(stream, tag, &format!("OK [APPENDUID 1 {uid}] APPEND completed")).await,
        None => complete(stream, tag, "NO [TRYCREATE] Mailbox does not exist").await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::capture;
    use crate::fake_imap::store::StoreBuilder;

    #[tokio::test]
    async fn stores_under_next_uid() {
        let store = Mutex::new(StoreBuilder::new().folder("Drafts").message(4, true, b"a").build());
        let shared = &store;
        let output = capture(|mut s| async move {
            handle_append("A9", "Drafts", b"Subject: new\r\n\r\n".to_vec(), shared, &mut s).await;
            s
        })
        .await;

        assert_eq!(output, "A9 OK [APPENDUID 1 5] APPEND completed\r\n");
        assert_eq!(store.lock().unwrap().folder("Drafts").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn refuses_empty_message() {
        let store = Mutex::new(StoreBuilder::new().folder("Drafts").build());
        let shared = &store;
        let output = capture(|mut s| async move {
            handle_append("A9", "Drafts", Vec::new(), shared, &mut s).await;
            s
        })
        .await;
        assert_eq!(output, "A9 NO Refusing empty message\r\n");
    }

    #[tokio::test]
    async fn unknown_folder_needs_create() {
        let store = Mutex::new(StoreBuilder::new().build());
        let shared = &store;
        let output = capture(|mut s| async move {
            handle_append("A9", "Nowhere", b"x".to_vec(), shared, &mut s).await;
            s
        })
        .await;
        assert!(output.starts_with("A9 NO [TRYCREATE]"));
    }
}
