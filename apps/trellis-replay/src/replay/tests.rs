use super::charset::decode_page;
use super::charset::sniff_meta_charset;
use super::logging::default_directives;
use super::logging::level_for_verbosity;
use super::parse_config;
use super::script::Step;
use super::script::parse;
use super::script::replay;
use tr_runtime::Page;
use tr_runtime::PageConfig;
use tracing::Level;

const PAGE: &str = r#"<html><head><meta charset="utf-8"><title>Demo</title></head><body>
<div class="tabs"><button class="tab-button">A</button><button class="tab-button">B</button>
<div class="tab-panel">a</div><div class="tab-panel">b</div></div>
<div class="carousel" data-autoplay="1000"><div class="carousel-slide">1</div><div class="carousel-slide">2</div></div>
<form data-validate><div><input name="email" type="email"></div></form>
</body></html>"#;

#[test]
fn parses_every_step_kind() {
    let steps = parse(
        r#"[
            { "action": "click", "selector": ".tab-button", "index": 1 },
            { "action": "key", "key": "ArrowLeft" },
            { "action": "key", "key": "Enter", "selector": ".accordion-header" },
            { "action": "submit", "selector": "form" },
            { "action": "scroll", "y": 640 },
            { "action": "intersect", "selector": "img[data-src]" },
            { "action": "set_value", "selector": "input", "value": "x@y.z" },
            { "action": "advance", "ms": 2500 },
            { "action": "activate" }
        ]"#,
    );
    let steps = match steps {
        Ok(steps) => steps,
        Err(error) => panic!("{error:#}"),
    };

    assert_eq!(steps.len(), 9);
    assert_eq!(
        steps[0],
        Step::Click {
            selector: ".tab-button".to_owned(),
            index: 1,
        }
    );
    assert_eq!(
        steps[1],
        Step::Key {
            key: "ArrowLeft".to_owned(),
            selector: None,
            index: 0,
        }
    );
    assert_eq!(steps[3], Step::Submit {
        selector: "form".to_owned(),
        index: 0,
    });
    assert_eq!(steps[7], Step::Advance { ms: 2500 });
    assert_eq!(steps[8], Step::Activate);
    let actions: Vec<&str> = steps.iter().map(Step::action).collect();
    assert_eq!(actions[6], "set_value");
}

#[test]
fn rejects_unknown_actions_and_fields() {
    assert!(parse(r#"[{ "action": "hover", "selector": "a" }]"#).is_err());
    assert!(parse(r#"[{ "action": "scroll", "y": 1, "x": 2 }]"#).is_err());
    assert!(parse(r#"{ "action": "activate" }"#).is_err());
}

#[test]
fn replays_steps_in_order() {
    let mut page = Page::from_html(PAGE, PageConfig::default());
    page.activate();
    let steps = parse(
        r#"[
            { "action": "click", "selector": ".tab-button", "index": 1 },
            { "action": "key", "key": "ArrowRight" },
            { "action": "advance", "ms": 2000 },
            { "action": "set_value", "selector": "input", "value": "nope" },
            { "action": "submit", "selector": "form" },
            { "action": "activate" }
        ]"#,
    )
    .unwrap_or_else(|_| unreachable!());

    let outcomes = match replay(&mut page, &steps) {
        Ok(outcomes) => outcomes,
        Err(error) => panic!("{error}"),
    };
    assert_eq!(outcomes.len(), 6);
    assert_eq!(outcomes[0].listeners_invoked, 1);
    // Nothing is focused after a click, so the key lands on the body.
    assert!(!outcomes[1].default_prevented);
    assert_eq!(outcomes[2].timers_fired, 2);
    assert!(outcomes[4].default_prevented);
    assert_eq!(outcomes[5].bound, 0);

    let tabs = page.query(".tab-button").unwrap_or_else(|_| unreachable!());
    assert_eq!(page.document().attribute(tabs[1], "aria-selected"), Some("true"));
    assert_eq!(page.now_ms(), 2000);
}

#[test]
fn missing_targets_fail_the_step() {
    let mut page = Page::from_html(PAGE, PageConfig::default());
    page.activate();
    let steps = parse(
        r#"[
            { "action": "advance", "ms": 10 },
            { "action": "click", "selector": ".tab-button", "index": 5 }
        ]"#,
    )
    .unwrap_or_else(|_| unreachable!());

    match replay(&mut page, &steps) {
        Ok(outcomes) => panic!("replay should stop: {outcomes:?}"),
        Err(error) => {
            assert!(error.is("replay.step_failed"));
            assert!(error.message.starts_with("step 2 (click)"), "{error}");
            assert!(error.message.contains("matched 2 element(s)"), "{error}");
        }
    }
    assert_eq!(page.now_ms(), 10);
}

#[test]
fn invalid_selectors_fail_the_step() {
    let mut page = Page::from_html(PAGE, PageConfig::default());
    let steps = parse(r#"[{ "action": "click", "selector": "a:hover" }]"#)
        .unwrap_or_else(|_| unreachable!());
    let error = replay(&mut page, &steps).err();
    assert!(error.is_some_and(|error| error.message.contains("css.selector_invalid")));
}

#[test]
fn sniffs_meta_charset_forms() {
    assert_eq!(
        sniff_meta_charset(br#"<meta charset="ISO-8859-1">"#).as_deref(),
        Some("ISO-8859-1")
    );
    assert_eq!(
        sniff_meta_charset(b"<meta charset=utf-8>").as_deref(),
        Some("utf-8")
    );
    assert_eq!(
        sniff_meta_charset(
            br#"<meta http-equiv="Content-Type" content="text/html; charset=windows-1252">"#
        )
        .as_deref(),
        Some("windows-1252")
    );
    assert_eq!(sniff_meta_charset(b"<p>charset talk</p>"), None);
    assert_eq!(sniff_meta_charset(b"<meta charset=\"\">"), None);
}

#[test]
fn ignores_charset_past_the_sniff_window() {
    let mut page = vec![b' '; 9 * 1024];
    page.extend_from_slice(b"<meta charset=\"windows-1252\">");
    assert_eq!(sniff_meta_charset(&page), None);
}

#[test]
fn decodes_declared_legacy_encodings() {
    let page = b"<meta charset=\"windows-1252\"><p>caf\xE9 \x80</p>";
    let decoded = decode_page(page);
    assert!(decoded.contains("caf\u{e9} \u{20ac}"), "{decoded}");
}

#[test]
fn byte_order_mark_beats_meta() {
    let mut page = vec![0xEF, 0xBB, 0xBF];
    page.extend_from_slice("<meta charset=\"windows-1252\"><p>\u{20ac}</p>".as_bytes());
    let decoded = decode_page(&page);
    assert!(decoded.starts_with("<meta"));
    assert!(decoded.contains("<p>\u{20ac}</p>"));
}

#[test]
fn undeclared_pages_decode_as_lossy_utf8() {
    let decoded = decode_page(b"<p>ok \xFF</p>");
    assert_eq!(decoded, "<p>ok \u{fffd}</p>");
}

#[test]
fn verbosity_maps_to_levels() {
    assert_eq!(level_for_verbosity(0), Level::WARN);
    assert_eq!(level_for_verbosity(1), Level::INFO);
    assert_eq!(level_for_verbosity(2), Level::DEBUG);
    assert_eq!(level_for_verbosity(9), Level::TRACE);

    let directives = default_directives(2);
    assert!(directives.starts_with("warn,"));
    assert!(directives.contains("tr_widgets=debug"));
    assert!(directives.contains("trellis_replay=debug"));
}

#[test]
fn parses_page_config() {
    let config = parse_config(
        r#"
page_url = "https://docs.example/start"

[widgets]
back_to_top_threshold_px = 120
"#,
    )
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(config.page_url.as_deref(), Some("https://docs.example/start"));
    assert_eq!(config.widgets.back_to_top_threshold_px, 120);
    assert!(config.intersection_observer);

    assert!(parse_config("intersection_observer = \"yes\"").is_err());
}
