//! CREATE and DELETE (RFC 3501 6.3.3, 6.3.4).

use crate::fake_imap::io::complete;
use crate::fake_imap::store::{Store, StoredFolder};
use std::sync::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

pub async fn handle_create<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    name: &str,
    store: &Mutex<Store>,
    stream: &mut BufReader<S>,
) {
    let created = {
        let mut store = store.lock().unwrap();
        if store.folder(name).is_some() {
            false
        } else {
            store.folders.push(StoredFolder {
                name: name.to_string(),
                ..StoredFolder::default()
            });
            true
        }
    };

    if created {
        complete(stream, tag, "OK CREATE completed").await;
    } else {
        complete(stream, tag, "NO Mailbox already exists").await;
    }
}

pub async fn handle_delete<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    name: &str,
    store: &Mutex<Store>,
    stream: &mut BufReader<S>,
) {
    let deleted = {
        let mut store = store.lock().unwrap();
        let before = store.folders.len();
        store
            .folders
            .retain(|f| f.name.eq_ignore_ascii_case("INBOX") || f.name != name);
        store.folders.len() < before
    };

    if deleted {
        complete(stream, tag, "OK DELETE completed").await;
    } else {
        complete(stream, tag, "NO Mailbox does not exist").await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::capture;
    use crate::fake_imap::store::StoreBuilder;

    #[tokio::test]
    async fn create_then_duplicate() {
        let store = Mutex::new(StoreBuilder::new().folder("INBOX").build());
        let shared = &store;
        let output = capture(|mut s| async move {
            handle_create("B1", "Archive", shared, &mut s).await;
            handle_create("B2", "Archive", shared, &mut s).await;
            s
        })
        .await;

        assert!(output.contains("B1 OK CREATE completed\r\n"));
        assert!(output.contains("B2 NO Mailbox already exists"));
        assert!(store.lock().unwrap().folder("Archive").is_some());
    }

    #[tokio::test]
    async fn delete_removes_folder_but_never_inbox() {
        let store = Mutex::new(StoreBuilder::new().folder("INBOX").folder("Old").build());
        let shared = &store;
        let output = capture(|mut s| async move {
            handle_delete("B3", "Old", shared, &mut s).await;
            handle_delete("B4", "INBOX", shared, &mut s).await;
            s
        })
        .await;

        assert!(output.contains("B3 OK DELETE completed\r\n"));
        assert!(output.contains("B4 NO"));
        assert_eq!(store.lock().unwrap().folders.len(), 1);
    }
}
