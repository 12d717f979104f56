use std::fs;
use std::path::Path;

use tempfile::TempDir;
use typer_backend_rust::content::{ContentIndex, Level};

fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, contents).expect("write file");
}

fn lesson_json(id: &str, language: &str, order: i32, title: &str, code: &str) -> String {
    serde_json::json!({
        "id": id,
        "title": title,
        "language": language,
        "concept": "variables",
        "description": "desc",
        "explanation": ["line one"],
        "code": code,
        "mode": "strict",
        "difficulty": "beginner",
        "order": order,
        "tags": ["basics"],
    })
    .to_string()
}

#[test]
fn flat_lesson_gets_level_from_path() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        dir.path(),
        "go/intermediate/01-interfaces.json",
        &lesson_json("go-01", "go", 1, "Interfaces", "type I interface{}"),
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    let lesson = index.get("go-01").expect("lesson");
    assert_eq!(lesson.level, Level::Intermediate);
    assert_eq!(lesson.language, "go");
}

#[test]
fn unrecognized_level_segment_falls_back_to_basic() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        dir.path(),
        "go/expert/01-generics.json",
        &lesson_json("go-01", "go", 1, "Generics", "func F[T any]()"),
    );
    write_file(
        dir.path(),
        "shallow.json",
        &lesson_json("flat-01", "go", 2, "Shallow", "x := 1"),
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    assert_eq!(index.get("go-01").expect("lesson").level, Level::Basic);
    assert_eq!(index.get("flat-01").expect("lesson").level, Level::Basic);
}

#[test]
fn manifest_without_language_inherits_path_segment() {
    let dir = TempDir::new().expect("tempdir");
    let manifest = serde_json::json!({
        "id": "ruby-01",
        "title": "Blocks",
        "code": "3.times { }",
        "order": 1,
    })
    .to_string();
    write_file(dir.path(), "ruby/basic/01-blocks.json", &manifest);

    let index = ContentIndex::load(dir.path()).expect("load");
    let lesson = index.get("ruby-01").expect("lesson");
    assert_eq!(lesson.language, "ruby");
    assert_eq!(index.list_by_language("ruby").len(), 1);
}

#[test]
fn directory_lesson_inlines_sibling_code_file() {
    let dir = TempDir::new().expect("tempdir");
    let manifest = serde_json::json!({
        "id": "py-04",
        "title": "Read a file",
        "language": "python",
        "order": 4,
    })
    .to_string();
    write_file(dir.path(), "python/exercises/04-read-file/main.json", &manifest);
    write_file(
        dir.path(),
        "python/exercises/04-read-file/code.py",
        "with open('f') as f:\n    print(f.read())\n",
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    let lesson = index.get("py-04").expect("lesson");
    assert_eq!(lesson.level, Level::Exercises);
    assert!(lesson.code.contains("open('f')"));
}

#[test]
fn directory_lesson_falls_back_to_source_extension() {
    let dir = TempDir::new().expect("tempdir");
    let manifest = serde_json::json!({
        "id": "js-05",
        "title": "Sum array",
        "language": "javascript",
        "order": 5,
    })
    .to_string();
    write_file(dir.path(), "javascript/exercises/05-sum/main.json", &manifest);
    write_file(
        dir.path(),
        "javascript/exercises/05-sum/solution.js",
        "const sum = xs => xs.reduce((a, b) => a + b, 0);\n",
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    let lesson = index.get("js-05").expect("lesson");
    assert!(lesson.code.contains("reduce"));
}

#[test]
fn directory_lesson_keeps_inline_code() {
    let dir = TempDir::new().expect("tempdir");
    let manifest = lesson_json("go-07", "go", 7, "Maps", "m := map[string]int{}");
    write_file(dir.path(), "go/basic/07-maps/main.json", &manifest);
    write_file(dir.path(), "go/basic/07-maps/code.go", "package ignored\n");

    let index = ContentIndex::load(dir.path()).expect("load");
    let lesson = index.get("go-07").expect("lesson");
    assert_eq!(lesson.code, "m := map[string]int{}");
}

#[test]
fn directory_lesson_is_terminal() {
    let dir = TempDir::new().expect("tempdir");
    let manifest = serde_json::json!({
        "id": "go-08",
        "title": "Structs",
        "language": "go",
        "order": 8,
        "code": "type T struct{}",
    })
    .to_string();
    write_file(dir.path(), "go/basic/08-structs/main.json", &manifest);
    // A stray json inside the lesson directory is part of the unit, not
    // another lesson.
    write_file(dir.path(), "go/basic/08-structs/notes.json", "{not json at all");

    let index = ContentIndex::load(dir.path()).expect("load");
    assert_eq!(index.count(), 1);
}

#[test]
fn duplicate_id_keeps_last_loaded() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        dir.path(),
        "go/basic/a-first.json",
        &lesson_json("go-dup", "go", 1, "First", "a"),
    );
    write_file(
        dir.path(),
        "go/basic/b-second.json",
        &lesson_json("go-dup", "go", 1, "Second", "b"),
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    assert_eq!(index.count(), 1);
    assert_eq!(index.get("go-dup").expect("lesson").title, "Second");
    assert_eq!(index.list_by_language("go").len(), 1);
}

#[test]
fn unknown_language_returns_empty_sequence() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        dir.path(),
        "go/basic/01.json",
        &lesson_json("go-01", "go", 1, "Hello", "x"),
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    assert!(index.list_by_language("cobol").is_empty());
}

#[test]
fn malformed_manifest_aborts_load() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        dir.path(),
        "go/basic/01.json",
        &lesson_json("go-01", "go", 1, "Hello", "x"),
    );
    write_file(dir.path(), "go/basic/02-broken.json", "{\"id\": ");

    assert!(ContentIndex::load(dir.path()).is_err());
}

#[test]
fn list_all_sorts_by_language_then_order() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        dir.path(),
        "python/basic/02.json",
        &lesson_json("py-02", "python", 2, "Py two", "x"),
    );
    write_file(
        dir.path(),
        "python/basic/01.json",
        &lesson_json("py-01", "python", 1, "Py one", "x"),
    );
    write_file(
        dir.path(),
        "go/basic/05.json",
        &lesson_json("go-05", "go", 5, "Go five", "x"),
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    let ids: Vec<String> = index.list_all().iter().map(|l| l.id.clone()).collect();
    assert_eq!(ids, vec!["go-05", "py-01", "py-02"]);
}

#[test]
fn by_language_listing_is_ordered() {
    let dir = TempDir::new().expect("tempdir");
    for (id, order) in [("go-03", 3), ("go-01", 1), ("go-02", 2)] {
        write_file(
            dir.path(),
            &format!("go/basic/{id}.json"),
            &lesson_json(id, "go", order, id, "x"),
        );
    }

    let index = ContentIndex::load(dir.path()).expect("load");
    let orders: Vec<i32> = index
        .list_by_language("go")
        .iter()
        .map(|l| l.order)
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[test]
fn languages_sort_by_count_with_placeholders_last() {
    let dir = TempDir::new().expect("tempdir");
    for i in 0..3 {
        write_file(
            dir.path(),
            &format!("go/basic/{i}.json"),
            &lesson_json(&format!("go-{i}"), "go", i, "Go", "x"),
        );
    }
    write_file(
        dir.path(),
        "python/basic/01.json",
        &lesson_json("py-01", "python", 1, "Py", "x"),
    );

    let index = ContentIndex::load(dir.path()).expect("load");
    let languages = index.languages();

    assert_eq!(languages[0].id, "go");
    assert_eq!(languages[0].lesson_count, 3);
    assert!(!languages[0].soon);
    assert_eq!(languages[1].id, "python");

    let placeholders: Vec<&str> = languages[2..].iter().map(|l| l.id.as_str()).collect();
    assert!(placeholders.contains(&"rust"));
    assert!(languages[2..]
        .iter()
        .all(|l| l.soon && l.lesson_count == 0));
}
