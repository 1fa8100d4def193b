use chrono::{TimeZone, Utc};

use super::*;

#[test]
fn test_rubric_from_document() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let doc = Document::new("초등학교_1-2학년_일기_전체")
        .with_field("stage", "초등학교")
        .with_field("grade", "1-2학년")
        .with_field("genre", "일기")
        .with_field("domain", "전체")
        .with_field("content", "## 채점 기준")
        .with_field("source_path", "rubrics/elementary/diary.md")
        .with_field("created_at", ts);

    let record = RubricRecord::from(doc);

    assert_eq!(record.id, "초등학교_1-2학년_일기_전체");
    assert_eq!(record.grade, "1-2학년");
    assert_eq!(record.content, "## 채점 기준");
    assert_eq!(record.created_at, Some(ts));
    assert_eq!(record.updated_at, None);
    assert_eq!(KnowledgeRecord::id(&record), "초등학교_1-2학년_일기_전체");
}

#[test]
fn test_example_from_sparse_document() {
    let doc = Document::new("x").with_field("level", "상").with_field("stage", 3i64);

    let record = ExampleRecord::from(doc);

    assert_eq!(record.level, "상");
    assert_eq!(record.stage, "", "non-string fields read as empty");
    assert_eq!(record.content, "");
}

#[test]
fn test_record_collections() {
    assert_eq!(RubricRecord::COLLECTION, "rubrics");
    assert_eq!(ExampleRecord::COLLECTION, "examples");
}

#[test]
fn test_collection_stats_document_roundtrip() {
    let stats = CollectionStats {
        total_documents: 5,
        collections: [("rubrics".to_string(), 3), ("examples".to_string(), 2)]
            .into_iter()
            .collect(),
        schema_version: "2.0".to_string(),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    };

    let doc = stats.to_document("stats");
    assert_eq!(doc.id, "stats");
    assert_eq!(CollectionStats::from_document(&doc), Some(stats));
}

#[test]
fn test_collection_stats_rejects_incomplete_document() {
    let doc = Document::new("stats").with_field("total_documents", 4i64);
    assert_eq!(CollectionStats::from_document(&doc), None);
}
