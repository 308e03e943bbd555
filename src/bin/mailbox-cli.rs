#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for inspecting and maintaining IMAP mailboxes

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use imap_mailbox::{
    Condition, Connection, Email, ImapConfig, ImapTransport, LoadMode, Mailbox,
    SearchExpression, SortKey, Uid,
};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

type ImapMailbox = Mailbox<ImapTransport>;

#[derive(Parser)]
#[command(name = "mailbox-cli")]
#[command(about = "Inspect and maintain IMAP mailboxes")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Mailbox to operate on
    #[arg(long, global = true, default_value = "INBOX")]
    mailbox: String,
}

#[derive(Subcommand)]
enum Command {
    /// List available mailboxes
    Folders,

    /// Show STATUS counters of the mailbox
    Status,

    /// Print the number of messages in the mailbox
    Count,

    /// List messages
    List {
        /// Maximum number of messages to show
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Show only unseen messages
        #[arg(long)]
        unseen: bool,

        /// Only messages from this sender
        #[arg(long)]
        from: Option<String>,

        /// Only messages whose subject contains this text
        #[arg(long)]
        subject: Option<String>,

        /// Show messages since this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,

        /// Show messages before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        before: Option<NaiveDate>,

        /// Server-side sort key (arrival, date, from, subject, to, cc, size)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Reverse the order
        #[arg(long)]
        reverse: bool,
    },

    /// Show a single message by UID
    Show {
        /// Message UID
        uid: Uid,
    },

    /// Append an RFC 822 message read from a file
    Append {
        /// Path to the message file
        file: PathBuf,
    },

    /// Permanently remove messages flagged \Deleted
    Expunge,

    /// Create a mailbox
    Create {
        /// Wire-format mailbox path
        path: String,
    },

    /// Delete a mailbox
    Delete {
        /// Wire-format mailbox path
        path: String,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{s}': {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ImapConfig::from_env()?;
    let connection = Connection::connect(&config).await?;

    let outcome = run(&connection, &args).await;
    if let Err(e) = connection.logout().await {
        warn!("Logout failed: {}", e);
    }
    outcome
}

async fn run(connection: &Connection<ImapTransport>, args: &Args) -> anyhow::Result<()> {
    match &args.command {
        Command::Folders => cmd_folders(connection, args).await,
        Command::Status => cmd_status(&connection.mailbox(&args.mailbox).await?, args).await,
        Command::Count => cmd_count(&connection.mailbox(&args.mailbox).await?, args).await,
        Command::List {
            limit,
            unseen,
            from,
            subject,
            since,
            before,
            sort,
            reverse,
        } => {
            let mut search = SearchExpression::new();
            if *unseen {
                search.push(Condition::Unseen);
            }
            if let Some(from) = from {
                search.push(Condition::From(from.clone()));
            }
            if let Some(subject) = subject {
                search.push(Condition::Subject(subject.clone()));
            }
            if let Some(since) = since {
                search.push(Condition::Since(*since));
            }
            if let Some(before) = before {
                search.push(Condition::Before(*before));
            }
            let mailbox = connection.mailbox(&args.mailbox).await?;
            cmd_list(&mailbox, args, &search, *sort, *reverse, *limit).await
        }
        Command::Show { uid } => cmd_show(&connection.mailbox(&args.mailbox).await?, args, *uid).await,
        Command::Append { file } => {
            cmd_append(&connection.mailbox(&args.mailbox).await?, args, file).await
        }
        Command::Expunge => cmd_expunge(&connection.mailbox(&args.mailbox).await?, args).await,
        Command::Create { path } => {
            let mailbox = connection.create_mailbox(path).await?;
            print_done(args, "created", mailbox.path());
            Ok(())
        }
        Command::Delete { path } => {
            connection.mailbox(path).await?.delete().await?;
            print_done(args, "deleted", path);
            Ok(())
        }
    }
}

async fn cmd_folders(connection: &Connection<ImapTransport>, args: &Args) -> anyhow::Result<()> {
    let mailboxes = connection.mailboxes().await?;

    if args.json {
        let entries: Vec<_> = mailboxes
            .iter()
            .map(|m| {
                serde_json::json!({
                    "path": m.path(),
                    "name": m.decoded_name(),
                    "delimiter": m.delimiter(),
                    "attributes": m.attribute_names(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for mailbox in &mailboxes {
            let attributes = mailbox.attribute_names();
            if attributes.is_empty() {
                println!("{}", mailbox.path());
            } else {
                println!("{:<30} {}", mailbox.path(), attributes.join(" "));
            }
        }
    }

    Ok(())
}

async fn cmd_status(mailbox: &ImapMailbox, args: &Args) -> anyhow::Result<()> {
    let status = mailbox.status().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else if status.is_empty() {
        println!("{}: no status", mailbox.path());
    } else {
        for (item, value) in status.entries() {
            println!("{item:<12} {value}");
        }
    }

    Ok(())
}

async fn cmd_count(mailbox: &ImapMailbox, args: &Args) -> anyhow::Result<()> {
    let count = mailbox.count().await?;

    if args.json {
        println!("{}", serde_json::json!({ "mailbox": mailbox.path(), "count": count }));
    } else {
        println!("{count}");
    }

    Ok(())
}

async fn cmd_list(
    mailbox: &ImapMailbox,
    args: &Args,
    search: &SearchExpression,
    sort: Option<SortKey>,
    reverse: bool,
    limit: usize,
) -> anyhow::Result<()> {
    let uids = match sort {
        Some(key) => mailbox.message_numbers(Some(search), key, reverse).await?,
        None => {
            let mut uids = mailbox.messages(Some(search)).await?.uids().to_vec();
            if reverse {
                uids.reverse();
            }
            uids
        }
    };

    let mut emails = Vec::new();
    for uid in uids.into_iter().take(limit) {
        let mut message = mailbox.message(uid, LoadMode::Eager).await?;
        match message.email().await {
            Ok(email) => emails.push(email),
            Err(e) => warn!("Skipping UID {}: {}", uid, e),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&emails)?);
    } else {
        print_email_table(&emails);
    }

    Ok(())
}

async fn cmd_show(mailbox: &ImapMailbox, args: &Args, uid: Uid) -> anyhow::Result<()> {
    let email = mailbox.message(uid, LoadMode::Eager).await?.email().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&email)?);
    } else {
        print_email_detail(&email);
    }

    Ok(())
}

async fn cmd_append(mailbox: &ImapMailbox, args: &Args, file: &PathBuf) -> anyhow::Result<()> {
    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if !mailbox.add_message(&raw).await? {
        anyhow::bail!("Server rejected the message for '{}'", mailbox.path());
    }
    print_done(args, "appended", mailbox.path());
    Ok(())
}

async fn cmd_expunge(mailbox: &ImapMailbox, args: &Args) -> anyhow::Result<()> {
    let remaining = mailbox.expunge().await?.count().await?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({ "mailbox": mailbox.path(), "count": remaining })
        );
    } else {
        println!("{remaining} message(s) left in {}", mailbox.path());
    }

    Ok(())
}

fn print_done(args: &Args, action: &str, path: &str) {
    if args.json {
        println!("{}", serde_json::json!({ "mailbox": path, "action": action }));
    } else {
        println!("{path}: {action}");
    }
}

fn print_email_table(emails: &[Email]) {
    if emails.is_empty() {
        println!("No emails found.");
        return;
    }

    println!("{:<8} {:<20} {:<30} Subject", "UID", "Date", "From");
    println!("{}", "-".repeat(100));

    for email in emails {
        println!(
            "{:<8} {:<20} {:<30} {}",
            email.uid,
            email.date.format("%Y-%m-%d %H:%M"),
            truncate(&email.from.to_string(), 28),
            truncate(&email.subject.original, 40),
        );
    }

    println!("\n{} email(s)", emails.len());
}

fn print_email_detail(email: &Email) {
    println!("UID:     {}", email.uid);
    println!("Date:    {}", email.date.format("%Y-%m-%d %H:%M:%S"));
    println!("From:    {}", email.from);
    println!("To:      {}", join(email.to.iter().map(ToString::to_string)));
    if !email.cc.is_empty() {
        println!("CC:      {}", join(email.cc.iter().map(ToString::to_string)));
    }
    println!("Subject: {}", email.subject.original);
    println!("Msg-ID:  {}", email.message_id);

    println!("\n--- Body ---\n");
    println!("{}", email.body.best_text());
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
