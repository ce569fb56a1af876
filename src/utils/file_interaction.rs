use std::path::{Path, PathBuf};
use std::sync::Arc;
use object_store::{ObjectMeta, ObjectStore, local::LocalFileSystem, path::Path as ObjectPath};
use crate::error::StoreError;

/// Creates an `ObjectStore` rooted at the filesystem root and the object path
/// for `file_path`.
///
/// Relative paths are resolved against the current directory so that every
/// object path handed out is absolute, and two spellings of the same file map
/// to the same store identity.
///
/// # Examples
///
/// ```no_run
/// # use cardsearch::utils::file_interaction::get_object_store;
/// # tokio_test::block_on(async {
/// let (store, path) = get_object_store("./data/sample/soldiers_sample_50k.parquet").unwrap();
/// let meta = store.head(&path).await.unwrap();
/// println!("{} bytes", meta.size);
/// # });
/// ```
pub fn get_object_store(
    file_path: impl AsRef<Path>,
) -> Result<(Arc<dyn ObjectStore>, ObjectPath), StoreError> {
    let absolute_path = absolute(file_path.as_ref())?;

    let path_str = absolute_path.to_string_lossy();
    let relative = path_str.trim_start_matches('/').to_string();

    let local_store = LocalFileSystem::new_with_prefix("/")?;
    let store: Arc<dyn ObjectStore> = Arc::new(local_store);

    Ok((store, ObjectPath::from(relative)))
}

/// Resolves `path` against the current directory if it is relative.
pub fn absolute(path: &Path) -> Result<PathBuf, StoreError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Lists the files directly inside `dir`, or `None` if the directory does not exist.
///
/// Metadata (size, last modified) comes back with each entry and feeds the
/// store identity used by the cache.
pub async fn list_directory(
    dir: impl AsRef<Path>,
) -> Result<Option<Vec<ObjectMeta>>, StoreError> {
    let dir = absolute(dir.as_ref())?;
    if !tokio::fs::try_exists(&dir).await? || !tokio::fs::metadata(&dir).await?.is_dir() {
        return Ok(None);
    }

    let (store, prefix) = get_object_store(&dir)?;
    let entries: Vec<ObjectMeta> = store
        .list_with_delimiter(Some(&prefix))
        .await?
        .objects;

    Ok(Some(entries))
}

/// Returns metadata for a single file, or `None` if it does not exist.
pub async fn head_file(file_path: impl AsRef<Path>) -> Result<Option<ObjectMeta>, StoreError> {
    let (store, path) = get_object_store(file_path)?;
    match store.head(&path).await {
        Ok(meta) => Ok(Some(meta)),
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Converts an object path from [`get_object_store`] back into a filesystem path.
pub fn to_local_path(location: &ObjectPath) -> PathBuf {
    PathBuf::from(format!("/{}", location.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(list_directory(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_head() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.parquet"), b"abc").unwrap();
        std::fs::write(tmp.path().join("b.parquet"), b"abcd").unwrap();

        let mut entries = list_directory(tmp.path()).await.unwrap().unwrap();
        entries.sort_by(|a, b| a.location.cmp(&b.location));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].size, 3);
        assert_eq!(to_local_path(&entries[1].location), tmp.path().join("b.parquet"));

        let meta = head_file(tmp.path().join("b.parquet")).await.unwrap().unwrap();
        assert_eq!(meta.size, 4);
        assert!(head_file(tmp.path().join("c.parquet")).await.unwrap().is_none());
    }
}
