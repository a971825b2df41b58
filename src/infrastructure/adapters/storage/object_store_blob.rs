//! Object Store Blob Storage - 基于 `object_store` 的 Blob 存储实现
//!
//! 实现 BlobStoragePort trait，后端由 URL 决定：
//! - `memory://`                     内存（测试用）
//! - `file:///var/lib/showcase/blobs` 本地文件系统
//! - `az://<container>` / `https://<account>.blob.core.windows.net/...` Azure Blob（含 Azurite）
//!
//! Azure 后端直接使用配置的容器名作为 Azure 容器，其余后端把容器名作为路径前缀。
//! 容器需要预先存在：不存在时 list 返回空列表，upload 失败。

use async_trait::async_trait;
use futures_util::TryStreamExt;
use object_store::azure::{AzureConfigKey, MicrosoftAzureBuilder};
use object_store::path::{Path, DELIMITER};
use object_store::{ObjectMeta, ObjectStore, ObjectStoreScheme, PutPayload};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::application::ports::{BlobFileInfo, BlobStorageError, BlobStoragePort};

/// 基于 object_store 的 Blob 存储
pub struct ObjectStoreBlobStorage {
    store: Arc<dyn ObjectStore>,
    /// 容器在存储中的前缀（URL 路径 + 容器名）
    prefix: Path,
    container: String,
}

impl ObjectStoreBlobStorage {
    /// 直接使用已有的 ObjectStore
    pub fn new(
        store: Arc<dyn ObjectStore>,
        root: &Path,
        container: impl Into<String>,
    ) -> Result<Self, BlobStorageError> {
        let container = container.into();
        let prefix = join_path(root, &container)?;

        Ok(Self {
            store,
            prefix,
            container,
        })
    }

    /// 根据 URL 创建存储，`options` 透传给 object_store（如 Azure 账号、emulator 开关）
    pub fn from_url(
        url: &str,
        options: &HashMap<String, String>,
        container: impl Into<String>,
    ) -> Result<Self, BlobStorageError> {
        let url = Url::parse(url)
            .map_err(|e| BlobStorageError::Store(format!("Invalid blob url {}: {}", url, e)))?;

        let (scheme, _) =
            ObjectStoreScheme::parse(&url).map_err(|e| BlobStorageError::Store(e.to_string()))?;

        if matches!(scheme, ObjectStoreScheme::MicrosoftAzure) {
            return Self::azure(&url, options, container.into());
        }

        let (store, root) = object_store::parse_url_opts(&url, options.iter())
            .map_err(|e| BlobStorageError::Store(e.to_string()))?;

        Self::new(Arc::from(store), &root, container)
    }

    /// Azure 容器即存储根，不再加前缀
    fn azure(
        url: &Url,
        options: &HashMap<String, String>,
        container: String,
    ) -> Result<Self, BlobStorageError> {
        let url = azure_url(url, &container)?;

        let mut builder = MicrosoftAzureBuilder::new()
            .with_url(url.as_str())
            .with_container_name(&container);
        for (key, value) in options {
            let key: AzureConfigKey = key
                .parse()
                .map_err(|e: object_store::Error| BlobStorageError::Store(e.to_string()))?;
            builder = builder.with_config(key, value);
        }

        let store = builder
            .build()
            .map_err(|e| BlobStorageError::Store(e.to_string()))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: Path::default(),
            container,
        })
    }

    fn blob_path(&self, file_name: &str) -> Result<Path, BlobStorageError> {
        join_path(&self.prefix, file_name)
    }

    fn to_file_info(&self, meta: ObjectMeta) -> BlobFileInfo {
        let location = meta.location.as_ref();
        let name = location
            .strip_prefix(self.prefix.as_ref())
            .map(|rest| rest.trim_start_matches(DELIMITER))
            .unwrap_or(location)
            .to_string();

        BlobFileInfo {
            content_type: Some(content_type_for(&name).to_string()),
            name,
            size: Some(meta.size as u64),
            last_modified: Some(meta.last_modified),
        }
    }
}

fn join_path(base: &Path, name: &str) -> Result<Path, BlobStorageError> {
    let joined = if base.as_ref().is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", base, DELIMITER, name)
    };

    Path::parse(&joined).map_err(|e| BlobStorageError::InvalidName(format!("{}: {}", name, e)))
}

/// 构建 Azure 时 URL 中的容器会覆盖 builder 设置，这里先把 URL 改成配置的容器
fn azure_url(url: &Url, container: &str) -> Result<Url, BlobStorageError> {
    let mut rewritten = url.clone();

    let result = match rewritten.scheme() {
        "az" | "azure" => rewritten.set_host(Some(container)).map_err(|e| e.to_string()),
        "abfs" | "abfss" if !rewritten.username().is_empty() => rewritten
            .set_username(container)
            .map_err(|_| "cannot set container".to_string()),
        "abfs" | "abfss" => rewritten.set_host(Some(container)).map_err(|e| e.to_string()),
        _ => {
            rewritten.set_path(container);
            Ok(())
        }
    };

    result.map_err(|e| BlobStorageError::Store(format!("Invalid Azure url {}: {}", url, e)))?;
    Ok(rewritten)
}

/// 根据扩展名推断 Content-Type，无法识别时为 `application/octet-stream`
fn content_type_for(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "json" => "application/json",
        "zip" => "application/zip",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl BlobStoragePort for ObjectStoreBlobStorage {
    async fn upload(&self, file_name: &str, data: Vec<u8>) -> Result<String, BlobStorageError> {
        let path = self.blob_path(file_name)?;
        let size = data.len();

        self.store
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| BlobStorageError::Store(e.to_string()))?;

        tracing::info!(
            container = %self.container,
            file_name = %file_name,
            size = size,
            "File uploaded successfully"
        );

        Ok(file_name.to_string())
    }

    async fn list(&self) -> Result<Vec<BlobFileInfo>, BlobStorageError> {
        let result: Result<Vec<ObjectMeta>, _> =
            self.store.list(Some(&self.prefix)).try_collect().await;

        let objects = match result {
            Ok(objects) => objects,
            Err(object_store::Error::NotFound { .. }) => {
                tracing::info!(container = %self.container, "Container does not exist yet");
                Vec::new()
            }
            Err(e) => return Err(BlobStorageError::Store(e.to_string())),
        };

        let mut files: Vec<BlobFileInfo> = objects
            .into_iter()
            .map(|meta| self.to_file_info(meta))
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::info!(
            container = %self.container,
            count = files.len(),
            "Retrieved files from blob storage"
        );

        Ok(files)
    }

    fn container(&self) -> &str {
        &self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream::{self, BoxStream, StreamExt};
    use object_store::memory::InMemory;
    use object_store::{
        GetOptions, GetResult, ListResult, MultipartUpload, PutMultipartOpts, PutOptions,
        PutResult,
    };
    use tempfile::tempdir;

    fn memory_storage() -> ObjectStoreBlobStorage {
        ObjectStoreBlobStorage::new(Arc::new(InMemory::new()), &Path::default(), "test-container-1")
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let storage = memory_storage();

        let name = storage
            .upload("report.pdf", b"%PDF-1.7".to_vec())
            .await
            .unwrap();
        assert_eq!(name, "report.pdf");

        let files = storage.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "report.pdf");
        assert_eq!(files[0].size, Some(8));
        assert_eq!(files[0].content_type.as_deref(), Some("application/pdf"));
        assert!(files[0].last_modified.is_some());
    }

    #[tokio::test]
    async fn test_upload_overwrites() {
        let storage = memory_storage();

        storage.upload("a.txt", b"one".to_vec()).await.unwrap();
        storage.upload("a.txt", b"three".to_vec()).await.unwrap();

        let files = storage.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, Some(5));
    }

    #[tokio::test]
    async fn test_list_empty_container() {
        let storage = memory_storage();
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_name_rejected() {
        let storage = memory_storage();
        let err = storage.upload("../escape.txt", b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, BlobStorageError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_containers_are_isolated() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let first = ObjectStoreBlobStorage::new(store.clone(), &Path::default(), "first").unwrap();
        let second = ObjectStoreBlobStorage::new(store, &Path::default(), "second").unwrap();

        first.upload("a.txt", b"a".to_vec()).await.unwrap();

        assert_eq!(first.list().await.unwrap().len(), 1);
        assert!(second.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_filesystem_url() {
        let temp_dir = tempdir().unwrap();
        let url = Url::from_directory_path(temp_dir.path()).unwrap();
        let storage =
            ObjectStoreBlobStorage::from_url(url.as_str(), &HashMap::new(), "blobs").unwrap();

        storage.upload("notes.txt", b"hello".to_vec()).await.unwrap();

        assert!(temp_dir.path().join("blobs").join("notes.txt").exists());
        let files = storage.list().await.unwrap();
        assert_eq!(files[0].name, "notes.txt");
        assert_eq!(files[0].content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("REPORT.PDF"), "application/pdf");
        assert_eq!(content_type_for("blob.bin"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_file_without_extension_has_content_type() {
        let storage = memory_storage();
        storage.upload("README", b"hello".to_vec()).await.unwrap();

        let files = storage.list().await.unwrap();
        assert_eq!(files[0].name, "README");
        assert_eq!(
            files[0].content_type.as_deref(),
            Some("application/octet-stream")
        );
    }

    #[test]
    fn test_azure_url_uses_configured_container() {
        let url = Url::parse("az://other-container").unwrap();
        assert_eq!(
            azure_url(&url, "test-container-1").unwrap().as_str(),
            "az://test-container-1"
        );

        let url = Url::parse("https://account.blob.core.windows.net/other-container").unwrap();
        assert_eq!(
            azure_url(&url, "test-container-1").unwrap().as_str(),
            "https://account.blob.core.windows.net/test-container-1"
        );
    }

    #[test]
    fn test_azure_blobs_live_at_container_root() {
        let mut options = HashMap::new();
        options.insert("azure_storage_use_emulator".to_string(), "true".to_string());

        let storage =
            ObjectStoreBlobStorage::from_url("az://other-container", &options, "test-container-1")
                .unwrap();

        assert_eq!(storage.prefix, Path::default());
        assert_eq!(storage.blob_path("report.pdf").unwrap().as_ref(), "report.pdf");
        assert_eq!(storage.container(), "test-container-1");

        let store = storage.store.to_string();
        assert!(store.contains("test-container-1"));
        assert!(!store.contains("other-container"));
    }

    #[tokio::test]
    async fn test_missing_container_lists_empty() {
        let storage = ObjectStoreBlobStorage::new(
            Arc::new(MissingContainer(InMemory::new())),
            &Path::default(),
            "test-container-1",
        )
        .unwrap();

        assert!(storage.list().await.unwrap().is_empty());
    }

    /// list 总是返回 NotFound，其余操作交给内存存储
    #[derive(Debug)]
    struct MissingContainer(InMemory);

    impl std::fmt::Display for MissingContainer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "MissingContainer")
        }
    }

    #[async_trait]
    impl ObjectStore for MissingContainer {
        async fn put_opts(
            &self,
            location: &Path,
            payload: PutPayload,
            opts: PutOptions,
        ) -> object_store::Result<PutResult> {
            self.0.put_opts(location, payload, opts).await
        }

        async fn put_multipart_opts(
            &self,
            location: &Path,
            opts: PutMultipartOpts,
        ) -> object_store::Result<Box<dyn MultipartUpload>> {
            self.0.put_multipart_opts(location, opts).await
        }

        async fn get_opts(
            &self,
            location: &Path,
            options: GetOptions,
        ) -> object_store::Result<GetResult> {
            self.0.get_opts(location, options).await
        }

        async fn delete(&self, location: &Path) -> object_store::Result<()> {
            self.0.delete(location).await
        }

        fn list(&self, _prefix: Option<&Path>) -> BoxStream<'_, object_store::Result<ObjectMeta>> {
            stream::once(async {
                Err(object_store::Error::NotFound {
                    path: "test-container-1".to_string(),
                    source: "The specified container does not exist.".into(),
                })
            })
            .boxed()
        }

        async fn list_with_delimiter(
            &self,
            prefix: Option<&Path>,
        ) -> object_store::Result<ListResult> {
            self.0.list_with_delimiter(prefix).await
        }

        async fn copy(&self, from: &Path, to: &Path) -> object_store::Result<()> {
            self.0.copy(from, to).await
        }

        async fn copy_if_not_exists(&self, from: &Path, to: &Path) -> object_store::Result<()> {
            self.0.copy_if_not_exists(from, to).await
        }
    }
}
