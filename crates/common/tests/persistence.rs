//! Integration tests for trees written to a local datastore and read back
//! through a freshly opened handle

use common::prelude::*;
use tempfile::TempDir;

fn reopen(dir: &TempDir) -> EncryptedBlobs {
    let location = format!("file://{}", dir.path().display());
    EncryptedBlobs::new(Datastore::from_location(&location).unwrap())
}

async fn read_dir(blobs: &EncryptedBlobs, reference: &Reference) -> Directory {
    let name = reference.blob_name().unwrap();
    let data = blobs.open(&name, &reference.blob_key().unwrap()).await.unwrap();
    Directory::from_bytes(&data).unwrap()
}

#[tokio::test]
async fn test_tree_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut builder = TreeBuilder::new(EncryptedBlobs::new(Datastore::local(dir.path()).unwrap()));

    builder
        .add_file(&["docs", "readme.txt"], b"read me", "text/plain")
        .await
        .unwrap();
    builder
        .add_file(&["logo.png"], &[0x89, b'P', b'N', b'G'], "image/png")
        .await
        .unwrap();
    let root = builder.flush().await.unwrap();
    drop(builder);

    let blobs = reopen(&dir);
    assert!(root.is_dir());

    let listing = read_dir(&blobs, &root).await;
    let names: Vec<_> = listing.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["docs", "logo.png"]);

    let docs = listing.entries()[0].reference();
    assert_eq!(docs.mime_type(), DIR_MIME_TYPE);

    let docs_listing = read_dir(&blobs, docs).await;
    let readme = docs_listing.entries()[0].reference();
    let content = blobs
        .open(&readme.blob_name().unwrap(), &readme.blob_key().unwrap())
        .await
        .unwrap();
    assert_eq!(content, b"read me");
}

#[tokio::test]
async fn test_link_update_is_visible_after_reopen() {
    let dir = TempDir::new().unwrap();
    let blobs = EncryptedBlobs::new(Datastore::local(dir.path()).unwrap());
    let mut builder = TreeBuilder::new(blobs.clone());

    builder
        .add_file(&["current"], b"first", "text/plain")
        .await
        .unwrap();
    let (first, mut writer) = builder.inject_link(&["current"]).await.unwrap();
    let root = builder.flush().await.unwrap();

    let (name, key) = blobs.create_static(b"second").await.unwrap();
    let second = Reference::new(&name, &key).with_mime_type("text/plain");
    let link_name = writer.blob_name();
    blobs
        .update_link(&link_name, &mut writer, &second.to_bytes())
        .await
        .unwrap();

    let blobs = reopen(&dir);
    let listing = read_dir(&blobs, &root).await;
    let link = listing.entries()[0].reference();
    assert_eq!(link.blob_name().unwrap(), link_name);

    let target = blobs
        .open(&link_name, &link.blob_key().unwrap())
        .await
        .unwrap();
    let target = Reference::from_bytes(&target).unwrap();
    assert_eq!(target, second);
    assert_ne!(target, first);

    let raw = blobs.open_raw(&link_name).await.unwrap();
    let payload = LinkPayload::parse(&raw).unwrap();
    assert_eq!(payload.content_version, 2);
}
