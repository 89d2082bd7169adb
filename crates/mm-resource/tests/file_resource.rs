use mm_resource::{FileResource, ResourceError, ResourceProvider};

#[test]
fn lists_and_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.cpymad.yml"), "B: {real: true}\n").unwrap();
    std::fs::write(dir.path().join("a.cpymad.yml"), "A: {real: false}\n").unwrap();
    std::fs::write(dir.path().join("readme.md"), "#").unwrap();
    std::fs::create_dir(dir.path().join("sub.cpymad.yml")).unwrap();

    let res = FileResource::new(dir.path());
    assert_eq!(
        res.list(".cpymad.yml").unwrap(),
        vec!["a.cpymad.yml", "b.cpymad.yml"]
    );

    let doc = res.read_structured("b.cpymad.yml").unwrap();
    assert_eq!(doc.len(), 1);
}

#[test]
fn child_and_missing_resources() {
    let dir = tempfile::tempdir().unwrap();
    let repo_dir = dir.path().join("repdata").join("lhc");
    std::fs::create_dir_all(&repo_dir).unwrap();
    std::fs::write(repo_dir.join("base.seq"), "! sequence\n").unwrap();

    let root = FileResource::new(dir.path());
    let repo = root.child("repdata/lhc").unwrap();
    let res = repo.get("base.seq").unwrap();
    let local = res.local_path().unwrap();
    assert_eq!(local.path(), repo_dir.join("base.seq"));

    assert!(matches!(
        repo.get("nope.seq"),
        Err(ResourceError::NotFound { .. })
    ));
}

#[test]
fn missing_root_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let res = FileResource::new(dir.path().join("absent"));
    assert!(res.list(".cpymad.yml").unwrap().is_empty());
}

#[test]
fn json_documents_are_structured_too() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("m.cpymad.yml"),
        r#"{"M": {"real": true, "init-files": ["a.seq"]}}"#,
    )
    .unwrap();
    let doc = FileResource::new(dir.path())
        .read_structured("m.cpymad.yml")
        .unwrap();
    assert!(doc.contains_key("M"));
}
