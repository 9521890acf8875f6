use super::Page;
use super::PageConfig;
use tr_events::HeadlessPlatform;
use tr_events::PlatformAction;
use tr_events::ScrollBehavior;
use tr_widgets::Carousel;
use tr_widgets::Lightbox;
use tr_widgets::WidgetKind;

const ARTICLE: &str = r##"<!DOCTYPE html>
<html>
<head><title>Field Guide</title></head>
<body>
  <header>
    <button class="nav-toggle" aria-expanded="false">Menu</button>
    <nav class="main-nav"><a href="#faq">FAQ</a></nav>
  </header>
  <main>
    <div class="accordion" id="faq">
      <div class="accordion-item"><button class="accordion-header">Q1</button><div class="accordion-content">A1</div></div>
      <div class="accordion-item"><button class="accordion-header">Q2</button><div class="accordion-content">A2</div></div>
    </div>
    <div class="tabs">
      <button class="tab-button">Rust</button><button class="tab-button">Go</button><button class="tab-button">Zig</button>
      <div class="tab-panel">r</div><div class="tab-panel">g</div><div class="tab-panel">z</div>
    </div>
    <div class="carousel" data-autoplay="500">
      <div class="carousel-slide">1</div><div class="carousel-slide">2</div>
      <button class="carousel-prev">prev</button><button class="carousel-next">next</button>
      <div class="carousel-dots"></div>
    </div>
    <div class="image-component"><img src="/media/fern.jpg" alt="Fern" data-lightbox></div>
    <div class="text-richtext"><pre><code>cargo run</code></pre></div>
    <form data-validate><div><input name="email" type="email" required></div></form>
    <a href="https://elsewhere.example" target="_blank">Elsewhere</a>
    <img data-src="/media/late.jpg" alt="">
  </main>
</body>
</html>"##;

fn page() -> Page {
    let config = PageConfig {
        page_url: Some("https://guide.example/field".to_owned()),
        ..PageConfig::default()
    };
    let mut page = Page::from_html(ARTICLE, config);
    page.activate();
    page
}

fn nodes(page: &Page, selector: &str) -> Vec<tr_dom::NodeId> {
    page.query(selector).unwrap_or_else(|_| unreachable!())
}

fn node(page: &Page, selector: &str) -> tr_dom::NodeId {
    let Some(node) = nodes(page, selector).first().copied() else {
        panic!("nothing matches `{selector}`");
    };
    node
}

#[test]
fn nothing_is_bound_before_activation() {
    let page = Page::from_html(ARTICLE, PageConfig::default());
    assert!(page.registry().is_empty());
    assert!(page.html().contains("<div class=\"accordion-content\">A1</div>"));
    assert_eq!(page.summary().activations, 0);
}

#[test]
fn activation_binds_every_marked_root() {
    let page = page();
    let summary = page.summary();
    assert_eq!(summary.title.as_deref(), Some("Field Guide"));
    assert_eq!(summary.activations, 1);
    for kind in WidgetKind::ALL {
        assert_eq!(summary.controllers.get(&kind), Some(&1), "{kind}");
    }
    // Carousel autoplay interval.
    assert_eq!(summary.pending_timers, 1);
}

#[test]
fn reactivation_adds_no_listeners() {
    let mut page = page();
    let before = page.summary();
    let html = page.html();

    let report = page.activate();
    assert_eq!(report.total(), 0);
    let after = page.summary();
    assert_eq!(after.listeners, before.listeners);
    assert_eq!(after.controllers, before.controllers);
    assert_eq!(after.activations, 2);
    assert_eq!(page.html(), html);
}

#[test]
fn appended_markup_binds_on_the_next_activation() {
    let mut page = page();
    let main = node(&page, "main");
    let appended = page.append_html(
        main,
        r#"<div class="accordion"><div class="accordion-item"><button class="accordion-header">Q3</button><div class="accordion-content">A3</div></div></div><div class="image-component"><img src="/media/moss.jpg" alt="Moss" data-lightbox></div>"#,
    );
    assert!(appended.is_ok_and(|nodes| nodes.len() == 2));

    let late = nodes(&page, ".accordion-header")[2];
    let _ = page.click(late);
    assert_eq!(page.document().attribute(late, "aria-expanded"), None);

    let report = page.activate();
    assert_eq!(report.count(WidgetKind::Accordion), 1);
    assert_eq!(report.adopted, 1);
    assert_eq!(nodes(&page, ".lightbox").len(), 1);

    let _ = page.click(late);
    assert_eq!(page.document().attribute(late, "aria-expanded"), Some("true"));

    let moss = node(&page, "img[alt=\"Moss\"]");
    let _ = page.click(moss);
    let Some(lightbox) = page.registry().all::<Lightbox>().into_iter().next() else {
        panic!("lightbox should be bound");
    };
    assert_eq!(lightbox.state().source, "/media/moss.jpg");
    assert_eq!(page.summary().adopted, 1);
}

#[test]
fn input_on_a_foreign_node_is_rejected() {
    let big = Page::from_html(ARTICLE, PageConfig::default());
    let Some(foreign) = big.document().descendants(big.document().root()).last() else {
        panic!("article should have nodes");
    };
    let mut small = Page::from_html("<p>tiny</p>", PageConfig::default());
    small.activate();

    match small.click(foreign) {
        Ok(outcome) => panic!("unexpected dispatch: {outcome:?}"),
        Err(error) => assert!(error.is("dom.unknown_node"), "{error}"),
    }
    assert!(small.key_down(foreign, "Enter").is_err());
    assert!(small.submit(foreign).is_err());
    assert!(small.intersect(foreign).is_err());
}

#[test]
fn focused_keyboard_input_follows_tab_focus() {
    let mut page = page();
    let tabs = nodes(&page, ".tab-button");
    let _ = page.key_down(tabs[0], "ArrowRight");
    assert_eq!(page.document().focused(), Some(tabs[1]));

    let outcome = page.key_down_focused("ArrowRight");
    assert!(outcome.default_prevented);
    assert_eq!(page.document().focused(), Some(tabs[2]));
    assert_eq!(page.document().attribute(tabs[2], "aria-selected"), Some("true"));

    page.key_down_focused("Home");
    assert_eq!(page.document().attribute(tabs[0], "aria-selected"), Some("true"));
}

#[test]
fn escape_without_focus_reaches_the_overlay() {
    let mut page = page();
    let fern = node(&page, "img[alt=\"Fern\"]");
    let _ = page.click(fern);
    let body = node(&page, "body");
    assert_eq!(
        page.document().style_property(body, "overflow").as_deref(),
        Some("hidden")
    );

    page.key_down_focused("Escape");
    assert_eq!(page.document().style_property(body, "overflow"), None);
}

#[test]
fn advancing_time_drives_autoplay() {
    let mut page = page();
    let root = node(&page, ".carousel");
    let current = |page: &Page| {
        page.registry()
            .find::<Carousel>(root)
            .map(Carousel::current)
    };

    assert_eq!(page.advance(499), 0);
    assert_eq!(current(&page), Some(0));
    assert_eq!(page.advance(1), 1);
    assert_eq!(current(&page), Some(1));
    assert_eq!(page.advance(1_000), 2);
    assert_eq!(current(&page), Some(1));
    assert_eq!(page.now_ms(), 1_500);
}

#[test]
fn copy_feedback_expires_with_the_clock() {
    let mut page = page();
    let button = node(&page, ".code-copy-btn");
    let _ = page.click(button);
    assert_eq!(page.platform().clipboard(), Some("cargo run"));
    assert_eq!(page.document().text_content(button), "Copied!");

    page.advance(2_000);
    assert_eq!(page.document().text_content(button), "Copy");
}

#[test]
fn scroll_and_anchor_requests_reach_the_platform() {
    let mut page = page();
    let button = node(&page, ".back-to-top");
    page.scroll_to(1_200);
    assert_eq!(page.scroll_y(), 1_200);
    assert_eq!(
        page.document().style_property(button, "visibility").as_deref(),
        Some("visible")
    );
    let _ = page.click(button);

    let link = node(&page, ".main-nav a");
    let outcome = page.click(link).unwrap_or_else(|_| unreachable!());
    assert!(outcome.default_prevented);

    let faq = node(&page, "#faq");
    assert_eq!(
        page.platform().actions(),
        &[
            PlatformAction::ScrollTo {
                top: 0,
                behavior: ScrollBehavior::Smooth,
            },
            PlatformAction::ScrollIntoView {
                node: faq,
                behavior: ScrollBehavior::Smooth,
            },
            PlatformAction::PushHistory("https://guide.example/field#faq".to_owned()),
        ]
    );
}

#[test]
fn submit_is_blocked_until_the_form_is_valid() {
    let mut page = page();
    let form = node(&page, "form");
    let email = node(&page, "input[name=\"email\"]");

    let blocked = page.submit(form).unwrap_or_else(|_| unreachable!());
    assert!(blocked.default_prevented);
    assert_eq!(nodes(&page, ".form-error").len(), 1);

    assert!(page.set_value(email, "not-an-address").is_ok());
    let still = page.submit(form).unwrap_or_else(|_| unreachable!());
    assert!(still.default_prevented);
    let errors = nodes(&page, ".form-error");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        page.document().text_content(errors[0]),
        "Please enter a valid email address"
    );

    assert!(page.set_value(email, "ranger@guide.example").is_ok());
    let sent = page.submit(form).unwrap_or_else(|_| unreachable!());
    assert!(!sent.default_prevented);
    assert!(nodes(&page, ".form-error").is_empty());
}

#[test]
fn lazy_image_waits_for_intersection() {
    let mut page = page();
    let image = node(&page, "img[data-src]");
    assert_eq!(page.document().attribute(image, "src"), None);

    let _ = page.intersect(image);
    assert_eq!(page.document().attribute(image, "src"), Some("/media/late.jpg"));
    assert!(page.document().has_class(image, "loaded"));
}

#[test]
fn page_config_reads_from_toml() {
    let source = r#"
page_url = "https://guide.example/field"
intersection_observer = false

[widgets]
enabled = ["accordion", "lazy-image", "form-validation"]
copy_feedback_ms = 750
"#;
    let config: PageConfig = match toml::from_str(source) {
        Ok(config) => config,
        Err(error) => panic!("{error}"),
    };
    assert_eq!(config.page_url.as_deref(), Some("https://guide.example/field"));
    assert!(!config.intersection_observer);
    assert_eq!(
        config.widgets.enabled,
        vec![
            WidgetKind::Accordion,
            WidgetKind::LazyImage,
            WidgetKind::FormValidation
        ]
    );
    assert_eq!(config.widgets.copy_feedback_ms, 750);
    assert_eq!(config.widgets.back_to_top_threshold_px, 300);

    let mut page = Page::from_html(ARTICLE, config);
    let report = page.activate();
    assert_eq!(report.total(), 3);
    let image = node(&page, "img[data-src]");
    assert_eq!(page.document().attribute(image, "src"), Some("/media/late.jpg"));
    assert!(nodes(&page, ".back-to-top").is_empty());
}

#[test]
fn empty_config_uses_defaults() {
    let config: PageConfig = toml::from_str("").unwrap_or_else(|_| unreachable!());
    assert_eq!(config, PageConfig::default());
    assert!(config.intersection_observer);
    assert_eq!(config.widgets.enabled.len(), WidgetKind::ALL.len());
}

#[test]
fn custom_platform_sees_clipboard_failures() {
    let mut platform = HeadlessPlatform::new();
    platform.deny_clipboard(true);
    let mut page = Page::with_platform(ARTICLE, PageConfig::default(), platform);
    page.activate();

    let button = node(&page, ".code-copy-btn");
    let _ = page.click(button);
    assert_eq!(page.document().text_content(button), "Copy");

    page.platform_mut().deny_clipboard(false);
    let _ = page.click(button);
    assert_eq!(page.platform().clipboard(), Some("cargo run"));
}
