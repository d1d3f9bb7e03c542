//! Integration tests for parse → apply → serialize
//!
//! Covers the reference scenarios, the round-trip law, idempotence,
//! determinism, overlay independence and stale-apply rejection.

use pretty_assertions::assert_eq;
use rstest::rstest;
use waylink::*;

const ROUTES: &str = r#"
    prefixes = ["https://app.example.com"]
    initial_route = "home"

    [[routes]]
    name = "home"
    template = "/"

    [[routes]]
    name = "report"
    template = "/r/:id"
    params = { id = "number" }
    query = ["tab"]

    [[routes]]
    name = "details"
    template = "/details"

    [[routes]]
    name = "chat"
    template = "/chat/:tab"
    params = { tab = "enum(messages|files)" }

    [[routes]]
    name = "search"
    template = "/search/:term?scope&page:number"

    [[routes]]
    name = "settings"
    template = "/settings"
    presentation = "side_pane"
    query = ["section"]

    [[routes]]
    name = "profile"
    template = "/profile/:user"
    presentation = "side_pane"

    [[routes]]
    name = "viewer"
    template = "/viewer/:file"
    presentation = "full_screen"
"#;

fn config() -> LinkingConfig {
    LinkingConfig::from_toml_str(ROUTES).unwrap()
}

fn table() -> RouteTable {
    config().build_table().unwrap()
}

fn adapter(table: &RouteTable) -> StateAdapter {
    config().build_adapter(table).unwrap()
}

fn report_table() -> RouteTable {
    RouteTable::new().with_pattern(
        RoutePattern::parse("report", "/r/:id")
            .unwrap()
            .with_param_type("id", ParamType::Number),
    )
}

fn resolve(table: &RouteTable, current: &NavigationState, path: &str) -> NavResult<NavigationState> {
    let parsed = PathParser::new(table).parse(path)?;
    StateAdapter::new().apply_parsed(current, &parsed)
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_scenario_parse_apply_serialize() {
    let table = report_table();
    let parsed = PathParser::new(&table).parse("/r/42").unwrap();
    assert_eq!(parsed.matches.len(), 1);
    assert_eq!(parsed.matches[0].route_name, "report");
    assert_eq!(parsed.matches[0].params["id"], ParamValue::Number(42));

    let state = StateAdapter::new()
        .apply(&NavigationState::empty(), &parsed.matches)
        .unwrap();
    let root = state.root.as_ref().unwrap();
    assert_eq!(root.route_name, "report");
    assert_eq!(root.params["id"], ParamValue::Number(42));

    assert_eq!(PathSerializer::new(&table).serialize(&state).unwrap(), "/r/42");
}

#[test]
fn test_scenario_param_change_keeps_overlay() {
    let table = table();
    let state = resolve(&table, &NavigationState::empty(), "/r/42/details#/settings").unwrap();
    assert_eq!(state.primary_chain().len(), 2);

    let mut params = Params::new();
    params.insert("id".into(), ParamValue::Number(7));
    let next = StateAdapter::new()
        .apply(&state, &[MatchedRoute::new("report", params)])
        .unwrap();

    let root = next.root.as_ref().unwrap();
    assert_eq!(root.params["id"], ParamValue::Number(7));
    assert!(root.children.is_empty());
    assert_eq!(next.overlay(), state.overlay());
    assert_eq!(PathSerializer::new(&table).serialize(&next).unwrap(), "/r/7#/settings");
}

#[test]
fn test_scenario_unknown_path() {
    let table = report_table();
    let parsed = PathParser::new(&table).parse("/unknown/path").unwrap();
    assert!(parsed.matches.is_empty());
    assert_eq!(parsed.leftover.as_deref(), Some("/unknown/path"));

    let adapter = StateAdapter::new();
    assert_eq!(
        adapter.apply(&NavigationState::empty(), &parsed.matches),
        Err(NavError::UnresolvableState { matches: 0 })
    );

    let current = resolve(&table, &NavigationState::empty(), "/r/1").unwrap();
    let next = adapter.apply(&current, &parsed.matches).unwrap();
    assert!(next.structurally_eq(&current));
}

// ============================================================================
// Laws
// ============================================================================

/// Sequences of links; the state after the last one is checked
#[rstest]
#[case(&["/r/42"])]
#[case(&["/r/42/details"])]
#[case(&["/r/42?tab=chat"])]
#[case(&["/r/42/details?tab=chat"])]
#[case(&["/search/a%20b%2Fc?scope=mine&page=2"])]
#[case(&["/search/caf%C3%A9"])]
#[case(&["/chat/files#/settings?section=privacy"])]
#[case(&["/r/1#/settings/profile/ann"])]
#[case(&["/r/1#/settings", "#/viewer/pic.png"])]
#[case(&["/r/1/details", "/r/2"])]
#[case(&["/r/1/details", "#/settings", "/search/x"])]
#[case(&["#/settings"])]
#[case(&["/#/profile/bob"])]
#[case(&["https://app.example.com/r/9/details#/viewer/doc.pdf"])]
fn test_round_trip(#[case] links: &[&str]) {
    let table = table();
    let parser = PathParser::new(&table).with_prefixes(["https://app.example.com"]);
    let adapter = adapter(&table);

    let state = links.iter().fold(NavigationState::empty(), |state, link| {
        let parsed = parser.parse(link).unwrap();
        adapter.apply_parsed(&state, &parsed).unwrap()
    });

    let path = PathSerializer::new(&table).serialize(&state).unwrap();
    let reparsed = parser.parse(&path).unwrap();
    let rebuilt = adapter.apply_parsed(&NavigationState::empty(), &reparsed).unwrap();

    assert_eq!(rebuilt.root, state.root, "canonical path {}", path);
    assert_eq!(reparsed.leftover, None, "canonical path {}", path);
}

#[rstest]
#[case("/r/42/details#/settings")]
#[case("/search/x?page=3")]
#[case("#/viewer/a.png")]
#[case("/r/1/nope")]
fn test_apply_is_idempotent(#[case] link: &str) {
    let table = table();
    let adapter = adapter(&table);
    let current = resolve(&table, &NavigationState::empty(), "/chat/messages#/profile/ann").unwrap();
    let parsed = PathParser::new(&table).parse(link).unwrap();

    let once = adapter.apply_parsed(&current, &parsed).unwrap();
    let twice = adapter.apply_parsed(&once, &parsed).unwrap();

    assert_eq!(twice.root, once.root);
    assert_eq!(twice.revision, once.revision + 1);
}

#[test]
fn test_parse_apply_serialize_are_deterministic() {
    let table = table();
    let adapter = adapter(&table);
    let link = "/search/q?page=1&scope=all&junk=1#/settings?section=a";

    let runs: Vec<(ParsedPath, NavigationState, String)> = (0..5)
        .map(|_| {
            let parsed = PathParser::new(&table).parse(link).unwrap();
            let state = adapter.apply_parsed(&NavigationState::empty(), &parsed).unwrap();
            let path = PathSerializer::new(&table).serialize(&state).unwrap();
            (parsed, state, path)
        })
        .collect();

    for run in &runs[1..] {
        assert_eq!(run, &runs[0]);
    }
    assert_eq!(runs[0].2, "/search/q?scope=all&page=1#/settings?section=a");
}

#[test]
fn test_canonical_path_normalizes_input() {
    let table = table();
    let mut store = config().build_store().unwrap();
    store.navigate("https://app.example.com//r/042/details/?tab=x").unwrap();
    assert_eq!(store.canonical_path().unwrap(), "/r/42/details?tab=x");
    assert_eq!(store.table().patterns().len(), table.patterns().len());
}

// ============================================================================
// Overlay independence
// ============================================================================

#[test]
fn test_closing_primary_leaf_keeps_overlay() {
    let mut store = config().build_store().unwrap();
    store.navigate("/r/1/details#/settings").unwrap();

    store.close_primary_leaf().unwrap();
    assert_eq!(store.canonical_path().unwrap(), "/r/1#/settings");
}

#[test]
fn test_closing_overlay_keeps_primary() {
    let mut store = config().build_store().unwrap();
    store.navigate("/r/1/details#/settings/profile/ann").unwrap();

    store.close_overlay_leaf().unwrap();
    assert_eq!(store.canonical_path().unwrap(), "/r/1/details#/settings");
    store.close_overlay_leaf().unwrap();
    assert_eq!(store.canonical_path().unwrap(), "/r/1/details");
}

#[test]
fn test_overlay_link_keeps_primary() {
    let mut store = config().build_store().unwrap();
    store.navigate("/r/1/details").unwrap();
    store.navigate("#/profile/ann").unwrap();
    assert_eq!(store.canonical_path().unwrap(), "/r/1/details#/profile/ann");
}

#[test]
fn test_overlay_link_on_empty_store_seeds_initial_route() {
    let mut store = config().build_store().unwrap();
    store.navigate("#/settings").unwrap();
    assert_eq!(store.canonical_path().unwrap(), "/#/settings");
}

#[test]
fn test_push_onto_initial_route_round_trips() {
    let mut store = config().build_store().unwrap();
    store.navigate("#/settings").unwrap();
    store.push("details", Params::new()).unwrap();

    let path = store.canonical_path().unwrap();
    assert_eq!(path, "/details#/settings");

    let mut rebuilt = config().build_store().unwrap();
    rebuilt.navigate(&path).unwrap();
    assert_eq!(rebuilt.state().root, store.state().root);
}

#[test]
fn test_initial_route_inside_matches_is_collapsed() {
    let mut store = config().build_store().unwrap();
    let prepared = store
        .prepare_matches(&[
            MatchedRoute::new("home", Params::new()),
            MatchedRoute::new("details", Params::new()),
        ])
        .unwrap();
    store.commit(prepared).unwrap();

    let names: Vec<&str> = store
        .state()
        .primary_chain()
        .iter()
        .map(|node| node.route_name.as_str())
        .collect();
    assert_eq!(names, vec!["details"]);
    assert_eq!(store.canonical_path().unwrap(), "/details");
}

// ============================================================================
// Revisions
// ============================================================================

#[test]
fn test_racing_triggers_commit_in_order() {
    let mut store = config().build_store().unwrap();
    store.navigate("/r/1").unwrap();

    // A link and a user tap both prepared against revision 1
    let link = store.prepare("/r/2").unwrap();
    let tap = store.prepare("/r/1/details").unwrap();

    store.commit(link).unwrap();
    let err = store.commit(tap).unwrap_err();
    assert_eq!(err, NavError::StaleApply { based_on: 1, current: 2 });

    // Retry against the latest revision
    let tap = store.prepare("/r/1/details").unwrap();
    assert_eq!(store.commit(tap).unwrap().revision, 3);
}

#[test]
fn test_failed_apply_keeps_previous_state() {
    let table = table();
    let mut store = NavigationStore::new(table);
    assert!(store.navigate("#/settings").is_err());
    assert_eq!(store.state(), &NavigationState::empty());
}

#[test]
fn test_state_serializes_to_json() {
    let mut store = config().build_store().unwrap();
    store.navigate("/r/42#/settings").unwrap();

    let json = serde_json::to_value(store.state()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "root": {
                "route_name": "report",
                "params": { "id": 42 },
                "overlay": { "route_name": "settings", "params": {} }
            },
            "revision": 1
        })
    );
}
