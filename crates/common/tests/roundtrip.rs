//! Integration tests for upload -> shadow URL -> download

mod common;

use crate::common::{aes_iv, aes_key, mem_upload_pipeline, setup_registry, transformer};
use ::common::prelude::*;

async fn roundtrip(registry: &Registry, pipeline: &UploadPipeline, data: &[u8]) -> Vec<u8> {
    let url = pipeline.upload(data).await.unwrap();
    let download = DownloadPipeline::from_url(&url, registry).unwrap();
    download.download().await.unwrap()
}

#[tokio::test]
async fn test_rot_mem_hello() {
    let (registry, store) = setup_registry();
    let pipeline = mem_upload_pipeline(&registry, vec![transformer(&registry, "rot", &[])]);

    let url = pipeline.upload(b"hello").await.unwrap();
    let segments: Vec<&str> = url.split('.').collect();
    assert_eq!(segments.len(), 2);
    assert!(url
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=.".contains(c)));

    let download = DownloadPipeline::from_url(&url, &registry).unwrap();
    let steps = download.steps();
    assert_eq!(steps[0].role(), Role::Source);
    assert_eq!(steps[0].name(), "mem");
    let id = String::from_utf8(steps[0].params()[0].clone()).unwrap();
    assert!(store.get(&id).is_some());
    assert_eq!(steps[1].role(), Role::Transformer);
    assert_eq!(steps[1].name(), "rot");
    assert!(steps[1].params().is_empty());

    assert_eq!(download.download().await.unwrap(), b"hello".to_vec());
}

#[tokio::test]
async fn test_aes_block_boundaries() {
    let (registry, _) = setup_registry();
    let pipeline = mem_upload_pipeline(
        &registry,
        vec![transformer(&registry, "aes", &[aes_key(), aes_iv()])],
    );

    for len in [0usize, 1, 15, 16, 17, 31, 32, 33, 1024] {
        let data: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
        assert_eq!(roundtrip(&registry, &pipeline, &data).await, data, "length {}", len);
    }
}

#[tokio::test]
async fn test_layered_transforms() {
    let (registry, _) = setup_registry();
    let pipeline = mem_upload_pipeline(
        &registry,
        vec![
            transformer(&registry, "aes", &[aes_key(), aes_iv()]),
            transformer(&registry, "chacha20", &[vec![42u8; 32]]),
            transformer(&registry, "base64", &[]),
            transformer(&registry, "rot", &[]),
        ],
    );

    let data = b"binary \x00\xff payload with . , : inside".to_vec();
    assert_eq!(roundtrip(&registry, &pipeline, &data).await, data);
    assert_eq!(roundtrip(&registry, &pipeline, b"").await, Vec::<u8>::new());
}

#[tokio::test]
async fn test_each_upload_gets_its_own_url() {
    let (registry, store) = setup_registry();
    let pipeline = mem_upload_pipeline(&registry, vec![transformer(&registry, "base64", &[])]);

    let first = pipeline.upload(b"same").await.unwrap();
    let second = pipeline.upload(b"same").await.unwrap();
    assert_ne!(first, second);
    assert_eq!(store.len(), 2);

    for url in [first, second] {
        let download = DownloadPipeline::from_url(&url, &registry).unwrap();
        assert_eq!(download.download().await.unwrap(), b"same".to_vec());
    }
}

#[tokio::test]
async fn test_definition_roundtrip() {
    let (registry, _) = setup_registry();
    let definition: PipelineDefinition = serde_json::from_str(
        r#"{"name": "encoded", "components": [
            {"name": "rot", "params": []},
            {"name": "base64", "params": []},
            {"name": "mem", "params": []}
        ]}"#,
    )
    .unwrap();

    let pipeline = definition.build(&registry).unwrap();
    assert_eq!(
        roundtrip(&registry, &pipeline, b"from a stored definition").await,
        b"from a stored definition".to_vec()
    );
}
