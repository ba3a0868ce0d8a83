use mythic_analyzer::placeholder::{
    PlaceholderNode, PlaceholderTrie, ScriptedSegments, complete_placeholder,
};
use quickcheck::{QuickCheck, TestResult};
use test_utils::fixtures::sample_context;
use test_utils::generator::PlaceholderPaths;

fn child_counts(node: &PlaceholderNode, counts: &mut Vec<usize>) {
    counts.push(node.children().len());
    for child in node.children() {
        child_counts(child, counts);
    }
}

#[test]
fn test_shared_prefix_yields_one_parent() {
    let scripted = ScriptedSegments::builtin();
    let mut trie = PlaceholderTrie::new();
    trie.insert_path("caster.health", &scripted);
    trie.insert_path("caster.name", &scripted);

    let caster = trie.lookup("caster").expect("caster");
    let labels: Vec<String> = caster.children().iter().map(|c| c.segment().label()).collect();
    assert_eq!(labels, vec!["health", "name"]);
    assert!(caster.children().iter().all(PlaceholderNode::is_end));
}

#[test]
fn test_integer_segment_ownership() {
    let scripted = ScriptedSegments::builtin();
    let integer = scripted.get("{integer}").expect("integer segment");
    assert!(integer.owns("42"));
    assert!(!integer.owns("four"));

    let map = scripted.get("{map}").expect("map segment");
    assert!(map.owns("a=1;b=2"));
}

#[test]
fn test_merge_into_identical_copy_is_idempotent() {
    fn prop(paths: PlaceholderPaths) -> TestResult {
        let scripted = ScriptedSegments::builtin();
        let mut trie = PlaceholderTrie::new();
        for path in &paths.0 {
            trie.insert_path(path, &scripted);
        }
        let mut before = Vec::new();
        child_counts(trie.root(), &mut before);

        let mut merged = trie.root().clone();
        merged.merge_subtree(trie.root());
        let mut after = Vec::new();
        child_counts(&merged, &mut after);

        if before == after {
            TestResult::passed()
        } else {
            TestResult::failed()
        }
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(PlaceholderPaths) -> TestResult);
}

#[test]
fn test_meta_keywords_from_bundle() {
    let context = sample_context();
    let trie = &context.placeholders;

    // STRING placeholders get toupper and the universal size
    let name = trie.lookup("caster.name").expect("caster.name");
    let labels: Vec<String> = name.children().iter().map(|c| c.segment().label()).collect();
    assert!(labels.contains(&"toupper".to_string()));
    assert!(labels.contains(&"size".to_string()));

    // INTEGER placeholders chain add.N, and add's INTEGER output chains once more
    assert!(trie.lookup("caster.hp.add.3").is_some_and(PlaceholderNode::is_end));
    assert!(trie.lookup("caster.hp.add.3.add.4").is_some());

    // untyped placeholders receive nothing
    assert!(trie.lookup("target.l.x").is_some_and(|node| node.children().is_empty()));
}

#[test]
fn test_completion_walks_scripted_segments() {
    let context = sample_context();
    let candidates = complete_placeholder(&context.placeholders, "message{m=<caster.var.counter.");
    let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
    // size returns INTEGER, so add.N chains beneath it as well
    assert_eq!(labels, vec!["size.", "size>"]);
    assert!(candidates[0].retrigger);
}
