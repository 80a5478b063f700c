use concierge_core::loader::load_assets;
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_json_array_and_jsonl() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("a.json"),
        r#"[{"id":"pool","title":"Indoor Pool","content":"Heated pool","category":"Amenities","tags":["swim"]},
            {"title":"Gym","content":"Open all day","category":"Amenities"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b.jsonl"),
        "{\"title\":\"Spa\",\"content\":\"Massages\",\"category\":\"Amenities\"}\n\n{\"title\":\"Bar\",\"content\":\"Cocktails\",\"category\":\"Dining\"}\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let assets = load_assets(dir.path()).unwrap();
    let titles: Vec<&str> = assets.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Indoor Pool", "Gym", "Spa", "Bar"]);
    assert_eq!(assets[0].id, "pool");
    assert_eq!(assets[0].tags, vec!["swim"]);
    assert!(!assets[1].id.is_empty());
}

#[test]
fn loads_single_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("one.json");
    fs::write(&path, r#"{"title":"Valet","content":"Parking","category":"Services"}"#).unwrap();
    let assets = load_assets(&path).unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].icon, "fas fa-file-text");
}

#[test]
fn rejects_records_without_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.jsonl");
    fs::write(&path, "{\"title\":\"No body\",\"category\":\"Docs\"}\n").unwrap();
    let err = load_assets(&path).unwrap_err();
    assert!(format!("{err:#}").contains("bad.jsonl:1"));
}

#[test]
fn missing_path_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_assets(dir.path().join("nope.json")).is_err());
}
