// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! End-to-end tests exercising the public API: parsing through a resolver,
//! rendering through a `Context`, template inheritance, and include-cycle
//! detection.

use std::collections::HashMap;
use wicker::{parse_file, render_pure, Dynamic, MemoryResolver, ParserError};

fn lookup(vars: &HashMap<&str, Dynamic>) -> impl Fn(&str) -> Dynamic + '_ {
    move |name: &str| vars.get(name).cloned().unwrap_or(Dynamic::Null)
}

#[test]
fn extends_renders_base_layout_with_overridden_blocks() {
    let resolver = MemoryResolver::new();
    resolver.insert(
        "base.html",
        "<html><head>{% block head %}default head{% endblock %}</head>\
         <body>{% block body %}default body{% endblock %}</body></html>",
    );
    resolver.insert(
        "page.html",
        "{% extends \"base.html\" %}\
         {% block body %}<p>{{ message }}</p>{% endblock %}",
    );

    let template = parse_file(&resolver, "page.html").unwrap();
    let mut vars = HashMap::new();
    vars.insert("message", Dynamic::str("hello from page"));
    let html = render_pure(lookup(&vars), &template);

    assert_eq!(
        html.as_str(),
        "<html><head>default head</head><body><p>hello from page</p></body></html>"
    );
}

#[test]
fn extends_chain_three_deep_resolves_blocks_from_most_derived() {
    let resolver = MemoryResolver::new();
    resolver.insert("grandparent.html", "[{% block slot %}gp{% endblock %}]");
    resolver.insert(
        "parent.html",
        "{% extends \"grandparent.html\" %}{% block slot %}parent{% endblock %}",
    );
    resolver.insert(
        "child.html",
        "{% extends \"parent.html\" %}{% block slot %}child{% endblock %}",
    );

    let template = parse_file(&resolver, "child.html").unwrap();
    let html = render_pure(lookup(&HashMap::new()), &template);
    assert_eq!(html.as_str(), "[child]");
}

#[test]
fn extends_chain_falls_back_to_ancestor_block_when_not_overridden() {
    let resolver = MemoryResolver::new();
    resolver.insert("grandparent.html", "[{% block slot %}gp{% endblock %}]");
    resolver.insert(
        "parent.html",
        "{% extends \"grandparent.html\" %}{% block slot %}parent{% endblock %}",
    );
    // child does not override `slot`, so the parent's definition should win.
    resolver.insert("child.html", "{% extends \"parent.html\" %}");

    let template = parse_file(&resolver, "child.html").unwrap();
    let html = render_pure(lookup(&HashMap::new()), &template);
    assert_eq!(html.as_str(), "[parent]");
}

#[test]
fn include_pulls_in_another_templates_rendered_output() {
    let resolver = MemoryResolver::new();
    resolver.insert("greeting.html", "Hi, {{ name }}!");
    resolver.insert("page.html", "<p>{% include \"greeting.html\" %}</p>");

    let template = parse_file(&resolver, "page.html").unwrap();
    let mut vars = HashMap::new();
    vars.insert("name", Dynamic::str("Ann"));
    let html = render_pure(lookup(&vars), &template);
    assert_eq!(html.as_str(), "<p>Hi, Ann!</p>");
}

#[test]
fn direct_include_cycle_is_a_parse_error() {
    let resolver = MemoryResolver::new();
    resolver.insert("a.html", "{% include \"a.html\" %}");

    let err = parse_file(&resolver, "a.html").unwrap_err();
    assert!(matches!(err, ParserError::IncludeDepthExceeded { .. } | ParserError::IncludeCycle { .. }));
}

#[test]
fn mutual_include_cycle_is_a_parse_error() {
    let resolver = MemoryResolver::new();
    resolver.insert("a.html", "{% include \"b.html\" %}");
    resolver.insert("b.html", "{% include \"a.html\" %}");

    let err = parse_file(&resolver, "a.html").unwrap_err();
    assert!(matches!(err, ParserError::IncludeDepthExceeded { .. } | ParserError::IncludeCycle { .. }));
}

#[test]
fn template_not_found_names_the_missing_include() {
    let resolver = MemoryResolver::new();
    resolver.insert("page.html", "{% include \"missing.html\" %}");

    let err = parse_file(&resolver, "page.html").unwrap_err();
    match err {
        ParserError::TemplateNotFound(name) => assert_eq!(name, "missing.html"),
        other => panic!("expected TemplateNotFound, got {other:?}"),
    }
}

#[test]
fn loop_iterates_list_values_with_integer_indices() {
    let resolver = MemoryResolver::new();
    let template = parse_file(&resolver, "nonexistent.html");
    assert!(template.is_err());

    let template = wicker::parse(
        &resolver,
        None,
        "{% for i, item in items %}{{ i }}={{ item }};{% endfor %}",
    )
    .unwrap();
    let mut vars = HashMap::new();
    vars.insert(
        "items",
        Dynamic::List(vec![Dynamic::str("x"), Dynamic::str("y"), Dynamic::str("z")]),
    );
    let html = render_pure(lookup(&vars), &template);
    assert_eq!(html.as_str(), "0=x;1=y;2=z;");
}

#[test]
fn filter_syntax_desugars_through_host_supplied_builtins() {
    use wicker::builtins::standard_builtins;

    let resolver = MemoryResolver::new();
    let template = wicker::parse(&resolver, None, "{{ a | sum(b) }}").unwrap();

    let builtins = standard_builtins();
    let mut vars = HashMap::new();
    vars.insert("a", Dynamic::int(2));
    vars.insert("b", Dynamic::int(3));
    let html = render_pure(
        move |name: &str| {
            vars.get(name)
                .cloned()
                .or_else(|| builtins.get(name).cloned())
                .unwrap_or(Dynamic::Null)
        },
        &template,
    );
    assert_eq!(html.as_str(), "5");
}
