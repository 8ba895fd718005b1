use anyhow::{bail, Result};
use chrono::{Local, Utc};
use clap::Subcommand;
use uuid::Uuid;

use crate::storage::{
    entities::{LeisureItem, ReadingItem, ReadingStatus, VoiceMemo},
    json_store::EntityStore,
    Stores,
};

#[derive(Subcommand, Debug)]
pub enum ReadingCommand {
    #[command(about = "Queue something to read")]
    Add {
        title: String,
        #[arg(long)]
        author: Option<String>,
    },
    #[command(about = "Mark an item as currently being read")]
    Start { title: String },
    #[command(about = "Mark an item as finished")]
    Finish { title: String },
    #[command(about = "List the reading log")]
    List {
        #[arg(long, help = "Include finished items")]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LeisureCommand {
    #[command(about = "Add something to the leisure list")]
    Add {
        title: String,
        #[arg(long)]
        category: Option<String>,
    },
    #[command(about = "Mark a leisure item as done")]
    Done { title: String },
    #[command(about = "List the leisure log")]
    List {
        #[arg(long, help = "Include finished items")]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemoCommand {
    #[command(about = "Capture a quick memo")]
    Add {
        note: String,
        #[arg(long = "tag", help = "Tag for the memo. Repeatable")]
        tags: Vec<String>,
    },
    #[command(about = "List captured memos")]
    List {},
}

pub async fn process_reading_command(command: ReadingCommand, stores: &Stores) -> Result<()> {
    match command {
        ReadingCommand::Add { title, author } => {
            let mut items = stores.reading.load_all().await?;
            items.push(ReadingItem {
                id: Uuid::new_v4(),
                title: title.trim().to_string(),
                author,
                status: ReadingStatus::Queued,
                added_at: Utc::now(),
                finished_at: None,
            });
            stores.reading.save_all(&items).await?;
            println!("Queued {:?}", title.trim());
            Ok(())
        }
        ReadingCommand::Start { title } => {
            set_reading_status(stores, &title, ReadingStatus::Reading).await
        }
        ReadingCommand::Finish { title } => {
            set_reading_status(stores, &title, ReadingStatus::Finished).await
        }
        ReadingCommand::List { all } => {
            let items = stores.reading.load_all().await?;
            for item in items
                .iter()
                .filter(|i| all || i.status != ReadingStatus::Finished)
            {
                let author = item.author.as_deref().unwrap_or("-");
                println!("{}\t{}\t{}", item.status, item.title, author);
            }
            Ok(())
        }
    }
}

async fn set_reading_status(stores: &Stores, title: &str, status: ReadingStatus) -> Result<()> {
    let mut items = stores.reading.load_all().await?;
    let trimmed = title.trim();
    let Some(item) = items
        .iter_mut()
        .find(|i| i.title.trim().eq_ignore_ascii_case(trimmed))
    else {
        bail!("No reading item titled {trimmed:?}");
    };
    item.status = status;
    item.finished_at = match status {
        ReadingStatus::Finished => Some(Utc::now()),
        ReadingStatus::Queued | ReadingStatus::Reading => None,
    };
    stores.reading.save_all(&items).await?;
    println!("{trimmed:?} is now {status}");
    Ok(())
}

pub async fn process_leisure_command(command: LeisureCommand, stores: &Stores) -> Result<()> {
    match command {
        LeisureCommand::Add { title, category } => {
            let mut items = stores.leisure.load_all().await?;
            items.push(LeisureItem {
                id: Uuid::new_v4(),
                title: title.trim().to_string(),
                category,
                done: false,
                added_at: Utc::now(),
            });
            stores.leisure.save_all(&items).await?;
            println!("Added {:?}", title.trim());
            Ok(())
        }
        LeisureCommand::Done { title } => {
            let mut items = stores.leisure.load_all().await?;
            let trimmed = title.trim();
            let Some(item) = items
                .iter_mut()
                .find(|i| i.title.trim().eq_ignore_ascii_case(trimmed))
            else {
                bail!("No leisure item titled {trimmed:?}");
            };
            item.done = true;
            stores.leisure.save_all(&items).await?;
            println!("Done with {trimmed:?}");
            Ok(())
        }
        LeisureCommand::List { all } => {
            let items = stores.leisure.load_all().await?;
            for item in items.iter().filter(|i| all || !i.done) {
                let mark = if item.done { "x" } else { " " };
                let category = item.category.as_deref().unwrap_or("-");
                println!("[{mark}] {}\t{}", item.title, category);
            }
            Ok(())
        }
    }
}

pub async fn process_memo_command(command: MemoCommand, stores: &Stores) -> Result<()> {
    match command {
        MemoCommand::Add { note, tags } => {
            stores
                .memos
                .append(VoiceMemo {
                    id: Uuid::new_v4(),
                    note,
                    tags,
                    recorded_at: Utc::now(),
                })
                .await?;
            println!("Captured");
            Ok(())
        }
        MemoCommand::List {} => {
            let memos = stores.memos.load_all().await?;
            for memo in &memos {
                let tags = if memo.tags.is_empty() {
                    String::new()
                } else {
                    format!("  #{}", memo.tags.join(" #"))
                };
                println!(
                    "{}\t{}{tags}",
                    memo.recorded_at.with_timezone(&Local).format("%x %H:%M"),
                    memo.note
                );
            }
            Ok(())
        }
    }
}
