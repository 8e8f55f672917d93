use calctree::interpreter::trie::Trie;
use pretty_assertions::assert_eq;

fn trie_of(words: &[&str]) -> Trie {
    let mut trie = Trie::new();
    for word in words {
        trie.insert(word);
    }
    trie
}

#[test]
fn insert_reports_new_words_only() {
    let mut trie = Trie::new();
    assert!(trie.insert("sqrt"));
    assert!(!trie.insert("sqrt"));
    assert!(!trie.insert(""));
    assert_eq!(trie.len(), 1);
}

#[test]
fn search_is_exact() {
    let trie = trie_of(&["<", "<=", "<-"]);
    assert!(trie.search("<"));
    assert!(trie.search("<="));
    assert!(!trie.search("<=="));
    assert!(!trie.search("="));
    assert!(trie.has_prefix("<"));
    assert!(!trie.has_prefix(">"));
}

#[test]
fn longest_match_prefers_longer_keywords() {
    let trie = trie_of(&["<", "<=", "<-"]);
    assert_eq!(trie.longest_match("<=3".chars()), Some(2));
    assert_eq!(trie.longest_match("<3".chars()), Some(1));
    assert_eq!(trie.longest_match("<-5".chars()), Some(2));
    assert_eq!(trie.longest_match("3<".chars()), None);
}

#[test]
fn longest_match_falls_back_to_shorter_terminal() {
    let trie = trie_of(&["s", "sigma"]);
    assert_eq!(trie.longest_match("sig".chars()), Some(1));
    assert_eq!(trie.longest_match("sigma".chars()), Some(5));
}

#[test]
fn remove_prunes_without_touching_prefixes() {
    let mut trie = trie_of(&["sin", "sinh"]);
    assert!(trie.remove("sinh"));
    assert!(!trie.remove("sinh"));
    assert!(trie.search("sin"));
    assert!(!trie.has_prefix("sinh"));
    assert_eq!(trie.len(), 1);

    assert!(trie.remove("sin"));
    assert!(trie.is_empty());
    assert!(!trie.has_prefix("s"));
}

#[test]
fn remove_keeps_longer_words() {
    let mut trie = trie_of(&["ln", "lnx"]);
    assert!(trie.remove("ln"));
    assert!(!trie.search("ln"));
    assert!(trie.search("lnx"));
}

#[test]
fn matcher_walks_and_resets() {
    let trie = trie_of(&["pi"]);
    let mut matcher = trie.matcher();

    assert!(matcher.try_advance('p'));
    assert!(!matcher.is_match());
    assert!(!matcher.try_advance('x'));
    assert_eq!(matcher.depth(), 1);
    assert!(matcher.try_advance('i'));
    assert!(matcher.is_match());

    matcher.reset();
    assert_eq!(matcher.depth(), 0);
    assert!(!matcher.is_match());
}
