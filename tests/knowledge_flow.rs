//! Upload a source tree, then resolve against what was written.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures::sample_tree;
use ssakdb::ingest::{BulkUploader, UploadConfig};
use ssakdb::{
    CollectionStats, KnowledgeCaches, KnowledgeResolver, LabelTable, MemoryStore, ResolveSource,
};

async fn uploaded_store() -> Arc<MemoryStore> {
    let tree = sample_tree();
    let store = Arc::new(MemoryStore::new());
    let uploader = BulkUploader::new(
        store.clone(),
        UploadConfig {
            batch_size: 2,
            batch_pause: Duration::ZERO,
            ..Default::default()
        },
    )
    .unwrap();

    let report = uploader.upload(tree.path()).await.unwrap();
    assert_eq!(report.documents_written, 7);
    assert_eq!(report.batches_committed, 4);
    assert_eq!(report.skipped.len(), 1);

    store.clear_logs();
    store
}

fn resolver(store: Arc<MemoryStore>) -> KnowledgeResolver<Arc<MemoryStore>> {
    KnowledgeResolver::new(
        store,
        LabelTable::builtin(),
        KnowledgeCaches::new(Duration::from_secs(60)),
    )
}

#[tokio::test]
async fn test_upload_routes_into_collections() {
    let store = uploaded_store().await;

    assert_eq!(store.document_count("rubrics"), 3);
    assert_eq!(store.document_count("examples"), 2);
    assert_eq!(store.document_count("achievement_standards"), 1);
    assert_eq!(store.document_count("misc"), 1);
    assert_eq!(store.document_ids("misc"), vec!["readme".to_string()]);

    let stats = CollectionStats::fetch(&store).await.unwrap().unwrap();
    assert_eq!(stats.total_documents, 7);
    assert_eq!(stats.collections.get("rubrics"), Some(&3));
}

#[tokio::test]
async fn test_rubric_primary_and_relaxed() {
    let resolver = resolver(uploaded_store().await);

    let exact = resolver
        .resolve_rubric_traced("elementary_3_4", "일기", "내용")
        .await;
    assert_eq!(exact.source, ResolveSource::Primary);
    let exact = exact.record.unwrap();
    assert_eq!(exact.grade, "3-4학년");
    assert_eq!(exact.content, "# 일기 내용 채점 기준");
    assert_eq!(exact.source_path, "rubrics/elementary/diary_content.md");
    assert!(exact.created_at.is_some());

    // no 5-6학년 rubric exists; the 3-4학년 one is the relaxed match
    let relaxed = resolver
        .resolve_rubric_traced("elementary_5_6", "일기", "내용")
        .await;
    assert_eq!(relaxed.source, ResolveSource::Relaxed);
    assert_eq!(relaxed.record.unwrap().id, exact.id);

    let lower = resolver
        .resolve_rubric("elementary_1_2", "일기", "표현")
        .await
        .unwrap();
    assert_eq!(lower.grade, "1-2학년");
}

#[tokio::test]
async fn test_rubric_exhausted_then_cached() {
    let store = uploaded_store().await;
    let resolver = resolver(store.clone());

    let first = resolver.resolve_rubric_traced("high", "논설문", "조직").await;
    assert_eq!(first.source, ResolveSource::Exhausted);
    assert!(first.record.is_none());
    assert_eq!(store.query_count(), 2);

    let second = resolver.resolve_rubric_traced("high", "논설문", "조직").await;
    assert_eq!(second.source, ResolveSource::Cache);
    assert!(second.record.is_none());
    assert_eq!(store.query_count(), 2);
}

#[tokio::test]
async fn test_example_primary_and_relaxed() {
    let store = uploaded_store().await;
    let resolver = resolver(store.clone());

    let diary = resolver
        .resolve_example_traced("elementary_1_2", "일기", "high")
        .await;
    assert_eq!(diary.source, ResolveSource::Primary);
    assert_eq!(diary.record.unwrap().level, "상");

    // only a middle-school exemplar exists for 논설문
    let essay = resolver
        .resolve_example_traced("high", "논설문", "medium")
        .await;
    assert_eq!(essay.source, ResolveSource::Relaxed);
    let essay = essay.record.unwrap();
    assert_eq!(essay.stage, "중등");
    assert_eq!(essay.content, "우리는 환경을 지켜야 한다.");

    let queries = store.queries();
    let fields: Vec<Vec<&str>> = queries.iter().map(|q| q.filter_fields()).collect();
    assert_eq!(
        fields,
        vec![
            vec!["stage", "genre", "level"],
            vec!["stage", "genre", "level"],
            vec!["genre", "level"],
        ]
    );
}

#[tokio::test]
async fn test_store_outage_is_not_cached() {
    let store = uploaded_store().await;
    let resolver = resolver(store.clone());

    store.set_fail_queries(true);
    let degraded = resolver
        .resolve_rubric_traced("elementary_3_4", "일기", "내용")
        .await;
    assert_eq!(degraded.source, ResolveSource::Degraded);
    assert!(degraded.record.is_none());

    store.set_fail_queries(false);
    let recovered = resolver
        .resolve_rubric_traced("elementary_3_4", "일기", "내용")
        .await;
    assert_eq!(recovered.source, ResolveSource::Primary);
    assert!(recovered.record.is_some());
}
