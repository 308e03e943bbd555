//! LOGIN. Any credentials are accepted.

use crate::fake_imap::io::write_line;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Returns false if the client went away.
pub async fn handle_login<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    stream: &mut BufReader<S>,
) -> bool {
    write_line(stream, &format!("{tag} OK LOGIN completed\r\n"))
        .await
        .is_ok()
}
