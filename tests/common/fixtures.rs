//! Source-tree fixtures for upload tests.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub fn write_source(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn rubric_markdown(stage: &str, grade: &str, genre: &str, domain: &str, body: &str) -> String {
    format!("---\nstage: {stage}\ngrade: {grade}\ngenre: {genre}\ndomain: {domain}\n---\n{body}\n")
}

pub fn example_markdown(stage: &str, genre: &str, level: &str, body: &str) -> String {
    format!("---\nstage: {stage}\ngenre: {genre}\nlevel: {level}\n---\n{body}\n")
}

/// A small knowledge base shaped like the real source repository.
///
/// - 3 rubrics (one only available for grades 1-2)
/// - 2 exemplars (one only at the middle-school stage)
/// - 1 achievement standard and 1 uncategorized note
/// - 1 malformed file that the uploader must skip
pub fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write_source(
        root,
        "rubrics/elementary/diary_content.md",
        &rubric_markdown("초등학교", "3-4학년", "일기", "내용", "# 일기 내용 채점 기준"),
    );
    write_source(
        root,
        "rubrics/elementary/diary_content_lower.md",
        &rubric_markdown("초등학교", "1-2학년", "일기", "표현", "# 일기 표현 채점 기준"),
    );
    write_source(
        root,
        "rubrics/middle/essay.md",
        &rubric_markdown("중학교", "1-3학년", "논설문", "조직", "# 논설문 조직 채점 기준"),
    );
    write_source(
        root,
        "examples/diary_high.md",
        &example_markdown("초등", "일기", "상", "오늘은 가족과 함께 공원에 갔다."),
    );
    write_source(
        root,
        "examples/essay_mid.md",
        &example_markdown("중등", "논설문", "중", "우리는 환경을 지켜야 한다."),
    );
    write_source(
        root,
        "achievement_standards/korean.md",
        "---\nstage: 초등학교\ngrade: 3-4학년\n---\n[4국03-01] 중심 문장과 뒷받침 문장을 갖추어 문단을 쓴다.\n",
    );
    write_source(root, "notes/readme.md", "분류되지 않은 메모");
    write_source(root, "rubrics/broken.md", "---\nstage: 초등학교\n");

    dir
}
