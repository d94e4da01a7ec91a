// tests/convert_integration.rs
//! Integration tests for bundle to package conversion
//!
//! These tests validate the end-to-end pipeline over real temp directories:
//! - Snippet aggregation, body rewriting, and selector grouping
//! - Preference projection and first-file-wins merging
//! - Grammar recoding and destination filename normalization
//! - Package naming and lazy destination subdirectory creation

use rebundle::{BundleConverter, Error};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// TEST HELPERS
// =============================================================================

/// Build a minimal XML property list from key/value string pairs
fn plist_document(entries: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (key, value) in entries {
        body.push_str(&format!(
            "\t<key>{key}</key>\n\t<string>{value}</string>\n"
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\">\n<dict>\n{body}</dict>\n</plist>\n"
    )
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

fn convert(source: &Path, destination: &Path) -> rebundle::Result<()> {
    BundleConverter::new(source.to_string_lossy().into_owned(), destination).convert()
}

fn read_cson(path: &Path) -> Value {
    rebundle::cson::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn entry_names(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

// =============================================================================
// SNIPPETS
// =============================================================================

#[test]
fn test_snippet_only_bundle_produces_only_snippets() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("language-ruby");

    write_file(
        &bundle.path().join("snippets"),
        "def.tmSnippet",
        &plist_document(&[
            ("scope", "source.rb"),
            ("tabTrigger", "def"),
            ("content", "def ${1:name}\nend"),
        ]),
    );

    convert(bundle.path(), &destination).unwrap();

    assert_eq!(entry_names(&destination), vec!["snippets"]);
    let output = destination.join("snippets").join("language-ruby.cson");
    let group = read_cson(&output);
    let snippet = &group[".source.rb"]["def"];
    assert_eq!(snippet["prefix"], "def");
    // Plain numbered placeholders pass through untouched
    assert_eq!(snippet["body"], "def ${1:name}\nend");
}

#[test]
fn test_snippet_body_rewriting_end_to_end() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    write_file(
        &bundle.path().join("snippets"),
        "ptr.cson",
        "scope: \"source.c\"\nname: \"Pointer\"\ntabTrigger: \"ptr\"\ncontent: \"${TM_C_POINTER: *}x; \\\\$HOME ${2:${TM_SELECTED_TEXT}}\"\n",
    );

    convert(bundle.path(), &destination).unwrap();

    let group = read_cson(&destination.join("snippets").join("pkg.cson"));
    assert_eq!(group[".source.c"]["Pointer"]["body"], " *x; $HOME $2");
}

#[test]
fn test_invalid_snippets_yield_no_output_at_all() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    // No tabTrigger in one, no content in the other
    write_file(
        &bundle.path().join("snippets"),
        "a.cson",
        "content: \"body\"\n",
    );
    write_file(
        &bundle.path().join("snippets"),
        "b.cson",
        "tabTrigger: \"t\"\n",
    );

    convert(bundle.path(), &destination).unwrap();

    // Empty aggregation suppresses the file and the directory
    assert!(!destination.join("snippets").exists());
}

#[test]
fn test_capitalized_source_directories_are_accepted() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    write_file(
        &bundle.path().join("Snippets"),
        "hello.cson",
        "tabTrigger: \"hi\"\ncontent: \"Hello\"\n",
    );

    convert(bundle.path(), &destination).unwrap();

    let group = read_cson(&destination.join("snippets").join("pkg.cson"));
    assert_eq!(group["*"]["hello"]["prefix"], "hi");
}

// =============================================================================
// PREFERENCES
// =============================================================================

#[test]
fn test_preferences_first_file_wins_on_conflicts() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    let preferences = bundle.path().join("preferences");
    write_file(
        &preferences,
        "a.tmPreferences",
        &plist_comment_preferences("source.x", &[("TM_COMMENT_START", "#")]),
    );
    write_file(
        &preferences,
        "b.tmPreferences",
        &plist_comment_preferences(
            "source.x",
            &[("TM_COMMENT_START", "//"), ("TM_COMMENT_END", "*/")],
        ),
    );

    convert(bundle.path(), &destination).unwrap();

    let group = read_cson(&destination.join("settings").join("pkg.cson"));
    let editor = &group[".source.x"]["editor"];
    assert_eq!(editor["commentStart"], "#");
    assert_eq!(editor["commentEnd"], "*/");
}

/// Preference plist with a scope and a shellVariables array
fn plist_comment_preferences(scope: &str, variables: &[(&str, &str)]) -> String {
    let mut shell_variables = String::new();
    for (name, value) in variables {
        shell_variables.push_str(&format!(
            "\t\t<dict>\n\t\t\t<key>name</key>\n\t\t\t<string>{name}</string>\n\
             \t\t\t<key>value</key>\n\t\t\t<string>{value}</string>\n\t\t</dict>\n"
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\">\n<dict>\n\
         \t<key>scope</key>\n\t<string>{scope}</string>\n\
         \t<key>settings</key>\n\t<dict>\n\
         \t\t<key>shellVariables</key>\n\t\t<array>\n{shell_variables}\t\t</array>\n\
         \t</dict>\n</dict>\n</plist>\n"
    )
}

#[test]
fn test_preferences_with_nothing_recognized_produce_no_output() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    write_file(
        &bundle.path().join("preferences"),
        "misc.cson",
        "scope: \"source.x\"\nsettings:\n  spellChecking: false\n",
    );

    convert(bundle.path(), &destination).unwrap();
    assert!(!destination.join("settings").exists());
}

#[test]
fn test_one_malformed_file_fails_the_whole_category() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    let preferences = bundle.path().join("preferences");
    write_file(
        &preferences,
        "good.cson",
        "scope: \"source.x\"\nsettings:\n  completions: [\"a\"]\n",
    );
    write_file(&preferences, "z-broken.tmPreferences", "not a plist");

    let err = convert(bundle.path(), &destination).unwrap_err();
    assert!(matches!(err, Error::SourceFormat { .. }));
    assert!(err.to_string().contains("z-broken.tmPreferences"));
}

// =============================================================================
// GRAMMARS
// =============================================================================

#[test]
fn test_grammars_recode_per_file_with_normalized_names() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    let syntaxes = bundle.path().join("syntaxes");
    write_file(
        &syntaxes,
        "Ruby.tmLanguage",
        &plist_document(&[("name", "Ruby"), ("scopeName", "source.ruby")]),
    );
    write_file(
        &syntaxes,
        "Ruby*Rails.tmLanguage",
        &plist_document(&[("name", "Rails"), ("scopeName", "source.ruby.rails")]),
    );

    convert(bundle.path(), &destination).unwrap();

    let grammars = destination.join("grammars");
    // Forbidden characters in the second stem were normalized away
    assert_eq!(entry_names(&grammars), vec!["ruby-rails.cson", "ruby.cson"]);

    let grammar = read_cson(&grammars.join("ruby.cson"));
    assert_eq!(grammar["scopeName"], "source.ruby");
}

// =============================================================================
// ORCHESTRATION
// =============================================================================

#[test]
fn test_bundle_without_category_directories_is_a_noop() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    convert(bundle.path(), &destination).unwrap();
    assert!(!destination.exists());
}

#[test]
fn test_package_name_comes_from_manifest() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("whatever");

    write_file(bundle.path(), "package.json", r#"{"packageName": "language-x"}"#);
    write_file(
        &bundle.path().join("snippets"),
        "a.cson",
        "tabTrigger: \"t\"\ncontent: \"c\"\n",
    );

    convert(bundle.path(), &destination).unwrap();
    assert!(destination.join("snippets").join("language-x.cson").exists());
}

#[test]
fn test_all_three_categories_convert_together() {
    let bundle = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let destination = destination.path().join("pkg");

    write_file(
        &bundle.path().join("snippets"),
        "a.cson",
        "scope: \"source.x\"\ntabTrigger: \"t\"\ncontent: \"c\"\n",
    );
    write_file(
        &bundle.path().join("preferences"),
        "p.cson",
        "scope: \"source.x\"\nsettings:\n  increaseIndentPattern: \"\\\\{\"\n",
    );
    write_file(
        &bundle.path().join("syntaxes"),
        "X.tmLanguage",
        &plist_document(&[("name", "X"), ("scopeName", "source.x")]),
    );

    convert(bundle.path(), &destination).unwrap();

    assert_eq!(
        entry_names(&destination),
        vec!["grammars", "settings", "snippets"]
    );
    let settings = read_cson(&destination.join("settings").join("pkg.cson"));
    assert_eq!(
        settings[".source.x"]["editor"]["increaseIndentPattern"],
        "\\{"
    );
}
