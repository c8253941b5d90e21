/*
 * integration_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for quarto-macrotemplate using test fixtures.
 */

use pretty_assertions::assert_eq;
use quarto_macrotemplate::{CompileOptions, RenderFn, TemplateError, compile, parse, render};
use serde_json::{Value, json};
use std::path::Path;

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> std::path::PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

/// Helper to compile a template from fixtures, named after its file
fn load_template(name: &str) -> Result<RenderFn, TemplateError> {
    let path = fixture_path(name);
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", name));
    compile(&source, &CompileOptions::new().with_file(name))
}

fn render_default(source: &str, data: &Value) -> String {
    render(source, data, &CompileOptions::default()).expect("template should compile")
}

#[test]
fn test_simple_interpolation() {
    let template = load_template("simple.template").unwrap();
    assert_eq!(template.render(&json!({"name": "World"})), "Hello, World!");
}

#[test]
fn test_list_fixture() {
    let template = load_template("list.template").unwrap();
    let data = json!({"items": [{"name": "a"}, {"name": "b"}]});
    assert_eq!(template.render(&data), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
}

#[test]
fn test_list_fixture_without_items() {
    let template = load_template("list.template").unwrap();
    assert_eq!(template.call(None), "<ul>\n</ul>\n");
}

#[test]
fn test_profile_fixture_optional_section() {
    let template = load_template("profile.template").unwrap();

    let without_email = json!({"user": {"name": "Ann", "tags": ["x", "y"]}});
    assert_eq!(template.render(&without_email), "Name: Ann\nTags: x;y;\n\n");

    let with_email = json!({"user": {"name": "Ann", "email": "a@b", "tags": ["x", "y"]}});
    assert_eq!(
        template.render(&with_email),
        "Name: Ann\nEmail: a@b\nTags: x;y;\n\n"
    );
}

#[test]
fn test_broken_fixture_reports_file() {
    let err = match load_template("broken.template") {
        Ok(_) => panic!("unclosed brace should not compile"),
        Err(err) => err,
    };
    assert!(matches!(err, TemplateError::UnmatchedBrace { .. }));
    assert_eq!(
        err.to_string(),
        "Unmatched brace at broken.template:1:7: '{' is never closed"
    );
}

#[test]
fn test_root_value() {
    assert_eq!(render_default("{.}", &json!({"value": 1})), r#"{"value":1}"#);
    assert_eq!(render_default("{. value}", &json!({"value": 1})), "1");
}

#[test]
fn test_value_lookup() {
    assert_eq!(render_default("{. foo}", &json!({"foo": "bar"})), "bar");
    assert_eq!(render_default("[{. missing}]", &json!({})), "[]");
}

#[test]
fn test_bracket_index_paths() {
    let data = json!({"items": [{"name": "a"}, {"name": "b"}]});
    assert_eq!(render_default("{. items[1].name}", &data), "b");
    assert_eq!(render_default("{. items.0.name}", &data), "a");
}

#[test]
fn test_falsy_values_are_present() {
    let data = json!({"zero": 0, "empty": "", "no": false, "nothing": null});
    assert_eq!(render_default("{. zero}|{. no}|{. empty}|{. nothing}", &data), "0|false||");
    assert_eq!(render_default("{has zero yes}", &data), "yes");
    assert_eq!(render_default("{has empty yes}", &data), "yes");
    assert_eq!(render_default("{has no yes}", &data), "yes");
    assert_eq!(render_default("{has nothing yes}", &data), "");
}

#[test]
fn test_has() {
    assert_eq!(render_default("{has missing <b>x</b>}", &json!({})), "");
    assert_eq!(
        render_default("{has present <b>x</b>}", &json!({"present": 1})),
        "<b>x</b>"
    );
}

#[test]
fn test_each_array_in_index_order() {
    let data = json!({"items": [{"name": "a"}, {"name": "b"}]});
    assert_eq!(
        render_default("{each items <li>{. name}</li>}", &data),
        "<li>a</li><li>b</li>"
    );
}

#[test]
fn test_each_paths_are_distinct() {
    let output = render_default("{each items {path} }", &json!({"items": [10, 20]}));
    assert_eq!(output, ".items.0 .items.1 ");
}

#[test]
fn test_each_current_item() {
    assert_eq!(render_default("{each xs [{.}]}", &json!({"xs": [1, 2]})), "[1][2]");
}

#[test]
fn test_each_over_object() {
    let data = json!({"scores": {"a": 1, "b": 2}});
    let template = compile("{each scores {path}={.} }", &CompileOptions::default()).unwrap();
    let first = template.render(&data);
    assert_eq!(first, ".scores.a=1 .scores.b=2 ");
    assert_eq!(template.render(&data), first);
}

#[test]
fn test_each_over_unusual_object_keys() {
    let data = json!({"m": {"": 5, "a.b": 6}});
    assert_eq!(render_default("{each m [{.}]}", &data), "[5][6]");
    assert_eq!(render_default("{each m {has . y}}", &data), "yy");

    let nested = json!({"m": {"x.y": {"name": "dotted"}}});
    assert_eq!(render_default("{each m {. name}}", &nested), "dotted");
}

#[test]
fn test_signed_index_is_absent() {
    let data = json!({"xs": [10, 20]});
    assert_eq!(render_default("[{. xs.+1}]", &data), "[]");
    assert_eq!(render_default("[{. xs.1}]", &data), "[20]");
}

#[test]
fn test_each_over_absent_and_scalar() {
    assert_eq!(render_default("{each xs x}", &json!({})), "");
    assert_eq!(render_default("{each xs x}", &json!({"xs": "abc"})), "");
    assert_eq!(render_default("{each xs x}", &json!({"xs": []})), "");
}

#[test]
fn test_nested_each_scopes() {
    let data = json!({
        "groups": [
            {"title": "A", "rows": [1, 2]},
            {"title": "B", "rows": [3]}
        ]
    });
    let source = "{each groups {. title}:{each rows\n    {.} };}";
    assert_eq!(render_default(source, &data), "A:1 2 ;B:3 ;");
}

#[test]
fn test_scope_is_restored_after_block() {
    let data = json!({"a": {"name": "inner"}, "name": "outer"});
    assert_eq!(
        render_default("{-> a {. name}} {. name}", &data),
        "inner outer"
    );
}

#[test]
fn test_path_macro_inside_scope() {
    assert_eq!(render_default("{-> a.b {path}}", &json!({})), ".a.b");
    assert_eq!(render_default("{-> a {path c}}", &json!({})), ".a.c");
}

#[test]
fn test_whitespace_after_argument_is_consumed() {
    assert_eq!(render_default("{has x   <b>y</b>}", &json!({"x": 1})), "<b>y</b>");
    assert_eq!(
        render_default("{each xs\n  <li>{.}</li>}", &json!({"xs": [1]})),
        "<li>1</li>"
    );
    assert_eq!(render_default("{.  x}", &json!({"x": 1})), "1");
}

#[test]
fn test_leading_and_trailing_whitespace_preserved() {
    assert_eq!(render_default("  {. x}  \n", &json!({"x": 1})), "  1  \n");
}

#[test]
fn test_unknown_macro() {
    let err = compile("a {frobnicate x}", &CompileOptions::default()).unwrap_err();
    assert!(err.to_string().contains("frobnicate"));
}

#[test]
fn test_unmatched_braces() {
    for source in ["{", "{. a", "}", "a}b", "{{. a}"] {
        let result = compile(source, &CompileOptions::default());
        assert!(
            matches!(result, Err(TemplateError::UnmatchedBrace { .. })),
            "{source:?} should fail with an unmatched brace"
        );
    }
}

#[test]
fn test_parse_round_trip() {
    for source in [
        "no braces at all",
        "{. a}{. b}",
        "<ul>\n{each items <li id=\"{path}\">{. name}</li>\n}</ul>",
        "{-> a {-> b {has c {. d}}}} tail",
    ] {
        let tree = parse(source, None).unwrap();
        assert_eq!(tree.to_source(), source);
    }
}

#[test]
fn test_compiling_twice_is_equivalent() {
    let source = "{each items <li>{. name}</li>}";
    let data = json!({"items": [{"name": "x"}, {"name": "y"}]});
    let first = compile(source, &CompileOptions::default()).unwrap();
    let second = compile(source, &CompileOptions::default()).unwrap();
    assert_eq!(first.render(&data), second.render(&data));
    assert_eq!(first.listing(), second.listing());
}

#[test]
fn test_render_is_repeatable() {
    let template = compile("{. n}", &CompileOptions::default()).unwrap();
    assert_eq!(template.render(&json!({"n": 1})), "1");
    assert_eq!(template.render(&json!({"n": 2})), "2");
    assert_eq!(template.call(None), "");
}

#[test]
fn test_concurrent_renders() {
    let template = compile("{each xs {.},}", &CompileOptions::default()).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let template = &template;
                s.spawn(move || template.render(&json!({"xs": [i, i + 1]})))
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("{},{},", i, i + 1));
        }
    });
}

#[test]
fn test_render_serialize() {
    #[derive(serde::Serialize)]
    struct Page {
        title: String,
        sections: Vec<String>,
    }

    let template = compile("# {. title}\n{each sections - {.}\n}", &CompileOptions::default())
        .unwrap();
    let page = Page {
        title: "Intro".to_string(),
        sections: vec!["one".to_string(), "two".to_string()],
    };
    assert_eq!(
        template.render_serialize(&page).unwrap(),
        "# Intro\n- one\n- two\n"
    );
}
