pub mod entities;
pub mod json_store;

use std::path::Path;

use entities::{LeisureItem, Project, ReadingItem, StrategySession, TimeLogEntry, VoiceMemo};
use json_store::JsonCollectionStore;

/// One typed store per entity collection, all rooted in the same data
/// directory. Handed to command handlers instead of letting them touch
/// ambient paths.
pub struct Stores {
    pub projects: JsonCollectionStore<Project>,
    pub time_logs: JsonCollectionStore<TimeLogEntry>,
    pub reading: JsonCollectionStore<ReadingItem>,
    pub leisure: JsonCollectionStore<LeisureItem>,
    pub memos: JsonCollectionStore<VoiceMemo>,
    pub strategy: JsonCollectionStore<StrategySession>,
}

impl Stores {
    pub fn open(dir: &Path) -> Result<Self, std::io::Error> {
        Ok(Self {
            projects: JsonCollectionStore::new(dir, "projects.json")?,
            time_logs: JsonCollectionStore::new(dir, "timelog.json")?,
            reading: JsonCollectionStore::new(dir, "reading.json")?,
            leisure: JsonCollectionStore::new(dir, "leisure.json")?,
            memos: JsonCollectionStore::new(dir, "memos.json")?,
            strategy: JsonCollectionStore::new(dir, "strategy.json")?,
        })
    }
}
