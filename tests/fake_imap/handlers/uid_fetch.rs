//! UID FETCH (RFC 3501 6.4.5).
//!
//! Every fetch returns UID, FLAGS, RFC822.SIZE and the full body as a
//! counted literal, whatever items were requested:
//!
//! ```text
//! * 2 FETCH (UID 7 FLAGS (\Seen) RFC822.SIZE 42 BODY[] {42}
//! <42 bytes>
//! )
//! ```

use crate::fake_imap::io::{complete, write_bytes, write_line};
use crate::fake_imap::store::Store;
use imap_codec::imap_types::sequence::{SeqOrUid, Sequence, SequenceSet};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

fn contains(sequence_set: &SequenceSet, uid: u32) -> bool {
    sequence_set.0.as_ref().iter().any(|seq| match seq {
        Sequence::Single(SeqOrUid::Value(v)) => v.get() == uid,
        Sequence::Single(SeqOrUid::Asterisk) => true,
        Sequence::Range(from, to) => {
            let bound = |s: &SeqOrUid| match s {
                SeqOrUid::Value(v) => v.get(),
                SeqOrUid::Asterisk => u32::MAX,
            };
            let (low, high) = (bound(from).min(bound(to)), bound(from).max(bound(to)));
            (low..=high).contains(&uid)
        }
    })
}

pub async fn handle_uid_fetch<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    sequence_set: &SequenceSet,
    store: &Store,
    selected: Option<&str>,
    stream: &mut BufReader<S>,
) {
    let Some(folder) = selected.and_then(|name| store.folder(name)) else {
        complete(stream, tag, "BAD No mailbox selected").await;
        return;
    };

    for (idx, message) in folder.messages.iter().enumerate() {
        if !contains(sequence_set, message.uid) {
            continue;
        }
        let len = message.raw.len();
        let header = format!(
            "* {} FETCH (UID {} FLAGS ({}) RFC822.SIZE {len} BODY[] {{{len}}}\r\n",
            idx + 1,
            message.uid,
            message.flags(),
        );
        if write_line(stream, &header).await.is_err()
            || write_bytes(stream, &message.raw).await.is_err()
            || write_line(stream, ")\r\n").await.is_err()
        {
            return;
        }
    }

    complete(stream, tag, "OK FETCH completed").await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::capture;
    use crate::fake_imap::store::StoreBuilder;
    use std::num::NonZeroU32;

    fn uid_set(uid: u32) -> SequenceSet {
        SequenceSet(
            vec![Sequence::Single(SeqOrUid::Value(NonZeroU32::new(uid).unwrap()))]
                .try_into()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn sends_flags_size_and_literal() {
        let store = StoreBuilder::new()
            .folder("INBOX")
            .message(4, false, b"a")
            .deleted_message(9, b"Subject: x\r\n\r\nhi")
            .build();
        let output = capture(|mut s| async move {
            handle_uid_fetch("A6", &uid_set(9), &store, Some("INBOX"), &mut s).await;
            s
        })
        .await;

        assert_eq!(
            output,
            "* 2 FETCH (UID 9 FLAGS (\\Seen \\Deleted) RFC822.SIZE 16 BODY[] {16}\r\n\
             Subject: x\r\n\r\nhi)\r\n\
             A6 OK FETCH completed\r\n"
        );
    }

    #[tokio::test]
    async fn unknown_uid_returns_only_ok() {
        let store = StoreBuilder::new().folder("INBOX").message(1, true, b"a").build();
        let output = capture(|mut s| async move {
            handle_uid_fetch("A6", &uid_set(5), &store, Some("INBOX"), &mut s).await;
            s
        })
        .await;
        assert_eq!(output, "A6 OK FETCH completed\r\n");
    }
}
