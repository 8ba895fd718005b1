use std::{
    future::Future,
    io::ErrorKind,
    marker::PhantomData,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

/// Interface for abstracting persistence of one entity collection.
/// Every collection is small enough to be loaded and rewritten whole.
pub trait EntityStore<T> {
    fn load_all(&self) -> impl Future<Output = Result<Vec<T>>>;

    fn save_all(&self, items: &[T]) -> impl Future<Output = Result<()>>;

    /// Adds one item to the end of the collection. Used for append-only
    /// collections like the time log.
    fn append(&self, item: T) -> impl Future<Output = Result<()>>;
}

impl<S: Deref, T> EntityStore<T> for S
where
    S::Target: EntityStore<T>,
{
    fn load_all(&self) -> impl Future<Output = Result<Vec<T>>> {
        self.deref().load_all()
    }

    fn save_all(&self, items: &[T]) -> impl Future<Output = Result<()>> {
        self.deref().save_all(items)
    }

    fn append(&self, item: T) -> impl Future<Output = Result<()>> {
        self.deref().append(item)
    }
}

/// The main realization of [EntityStore]. Keeps the collection as a single
/// pretty-printed JSON array so that files stay inspectable by hand.
pub struct JsonCollectionStore<T> {
    path: PathBuf,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonCollectionStore<T> {
    pub fn new(dir: &Path, file_name: &str) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(dir)?;

        Ok(Self {
            path: dir.join(file_name),
            _entity: PhantomData,
        })
    }
}

impl<T: Serialize + DeserializeOwned> EntityStore<T> for JsonCollectionStore<T> {
    async fn load_all(&self) -> Result<Vec<T>> {
        debug!("Loading {:?}", self.path);
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;
        read_collection(file, &self.path).await
    }

    async fn save_all(&self, items: &[T]) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = overwrite_collection(&mut file, items).await;
        file.unlock_async().await?;
        result
    }

    async fn append(&self, item: T) -> Result<()> {
        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // The whole read-modify-write happens under one exclusive lock so
        // that concurrent invocations can't interleave between the read and
        // the rewrite.
        file.lock_exclusive()?;
        let result = append_under_lock(&mut file, &self.path, item).await;
        file.unlock_async().await?;
        result
    }
}

async fn append_under_lock<T: Serialize + DeserializeOwned>(
    file: &mut File,
    path: &Path,
    item: T,
) -> Result<()> {
    let mut contents = String::new();
    file.read_to_string(&mut contents).await?;

    let mut items = parse_collection(&contents, path);
    items.push(item);
    overwrite_collection(file, &items).await
}

async fn read_collection<T: DeserializeOwned>(mut file: File, path: &Path) -> Result<Vec<T>> {
    let mut contents = String::new();
    let read_result = file.read_to_string(&mut contents).await;
    file.unlock_async().await?;
    read_result?;

    Ok(parse_collection(&contents, path))
}

fn parse_collection<T: DeserializeOwned>(contents: &str, path: &Path) -> Vec<T> {
    if contents.trim().is_empty() {
        return vec![];
    }

    match serde_json::from_str::<Vec<T>>(contents) {
        Ok(items) => items,
        Err(e) => {
            // A corrupted file degrades to an empty collection. Might happen
            // after shutdowns cutting off a write.
            warn!("Found illegal json in {path:?}: {e}");
            vec![]
        }
    }
}

async fn overwrite_collection<T: Serialize>(file: &mut File, items: &[T]) -> Result<()> {
    let buffer = serde_json::to_vec_pretty(items)?;
    file.rewind().await?;
    file.set_len(0).await?;
    file.write_all(&buffer).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    use crate::utils::logging::TEST_LOGGING;

    use super::{EntityStore, JsonCollectionStore};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Marble {
        name: String,
        weight: u32,
    }

    fn marble(name: &str, weight: u32) -> Marble {
        Marble {
            name: name.into(),
            weight,
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonCollectionStore::<Marble>::new(dir.path(), "marbles.json")?;

        assert_eq!(store.load_all().await?, vec![]);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonCollectionStore::new(dir.path(), "marbles.json")?;

        let items = vec![marble("glass", 5), marble("steel", 12)];
        store.save_all(&items).await?;

        assert_eq!(store.load_all().await?, items);
        Ok(())
    }

    #[tokio::test]
    async fn test_append_preserves_order() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonCollectionStore::new(dir.path(), "marbles.json")?;

        store.append(marble("first", 1)).await?;
        store.append(marble("second", 2)).await?;
        store.append(marble("third", 3)).await?;

        let items = store.load_all().await?;
        assert_eq!(
            items.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            vec!["first", "second", "third"]
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_all_survive() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let path = dir.path().to_owned();

        // Separate store handles, as separate process invocations would have.
        let mut writers = Vec::new();
        for writer in 0..4u32 {
            let store = JsonCollectionStore::new(&path, "marbles.json")?;
            writers.push(tokio::spawn(async move {
                for round in 0..5u32 {
                    store
                        .append(Marble {
                            name: format!("w{writer}-r{round}"),
                            weight: round,
                        })
                        .await?;
                }
                anyhow::Ok(())
            }));
        }
        for writer in writers {
            writer.await??;
        }

        let store = JsonCollectionStore::<Marble>::new(&path, "marbles.json")?;
        assert_eq!(store.load_all().await?.len(), 20);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_file_reads_as_empty() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        std::fs::write(dir.path().join("marbles.json"), "[{\"name\": \"gl")?;

        let store = JsonCollectionStore::<Marble>::new(dir.path(), "marbles.json")?;
        assert_eq!(store.load_all().await?, vec![]);
        Ok(())
    }

    #[tokio::test]
    async fn test_rewrite_shrinks_file() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonCollectionStore::new(dir.path(), "marbles.json")?;

        store
            .save_all(&[marble("a", 1), marble("b", 2), marble("c", 3)])
            .await?;
        store.save_all(&[marble("a", 1)]).await?;

        assert_eq!(store.load_all().await?, vec![marble("a", 1)]);
        Ok(())
    }
}
