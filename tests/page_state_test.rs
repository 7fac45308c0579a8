mod common;

use std::time::Duration;

use common::{FakeElement, FakePage};
use kodegen_browser_actions::page_state::{Coordinates, TRUNCATION_MARKER};
use kodegen_browser_actions::PageState;

fn state(page: std::sync::Arc<FakePage>) -> PageState {
    PageState::new(page, Duration::from_secs(5))
}

#[tokio::test]
async fn zero_size_elements_are_not_listed() {
    let page = FakePage::new(vec![
        FakeElement::button("Flat").at(0.0, 0.0, 0.0, 20.0),
        FakeElement::button("Thin").at(0.0, 0.0, 20.0, 0.0),
        FakeElement::button("Tiny").at(5.0, 5.0, 1.0, 1.0),
    ]);

    let listed = state(page).list_interactive_elements().await;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].text, "Tiny");
}

#[tokio::test]
async fn listing_keeps_document_order_and_skips_plain_text() {
    let page = FakePage::new(vec![
        FakeElement::link("Home").at(0.0, 0.0, 60.0, 20.0),
        FakeElement::text("p", "Welcome back"),
        FakeElement::button("Log out").with_selector("#logout").at(100.0, 0.0, 80.0, 30.0),
    ]);

    let listed = state(page).list_interactive_elements().await;

    let texts: Vec<_> = listed.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Home", "Log out"]);
    assert_eq!(listed[0].role, "link");
    assert_eq!(listed[1].selector_or_id, "#logout");
    assert_eq!(listed[1].coordinates, Coordinates { x: 140, y: 15 });
}

#[tokio::test]
async fn listing_failure_is_an_empty_list() {
    let page = FakePage::new(vec![FakeElement::button("Save")]);
    page.fail_queries();

    assert!(state(page).list_interactive_elements().await.is_empty());
}

#[tokio::test]
async fn markup_is_truncated_to_the_limit() {
    let page = FakePage::new(Vec::new());
    page.set_markup(&"a".repeat(500));
    let state = state(page.clone());

    let cut = state.get_markup(100).await.unwrap();
    assert_eq!(cut, format!("{}{}", "a".repeat(100), TRUNCATION_MARKER));

    page.set_markup(&"b".repeat(50));
    assert_eq!(state.get_markup(100).await.unwrap(), "b".repeat(50));
}

#[tokio::test]
async fn text_search_ignores_case_and_hidden_elements() {
    let page = FakePage::new(vec![
        FakeElement::text("h1", "Order Summary"),
        FakeElement::text("span", "summary (hidden)").at(0.0, 0.0, 0.0, 0.0),
        FakeElement::text("p", "Shipping"),
        FakeElement::button("View SUMMARY"),
    ]);

    let found = state(page).find_elements_containing_text("summary").await;

    let tags: Vec<_> = found.iter().map(|m| m.tag.as_str()).collect();
    assert_eq!(tags, vec!["h1", "button"]);
    assert_eq!(found[0].text, "Order Summary");
}

#[tokio::test]
async fn blank_search_finds_nothing() {
    let page = FakePage::new(vec![FakeElement::text("p", "anything")]);

    assert!(state(page).find_elements_containing_text("  ").await.is_empty());
}

#[tokio::test]
async fn every_call_sees_the_current_page() {
    let page = FakePage::new(vec![FakeElement::text("div", "<b>old</b>")]);
    let state = state(page.clone());

    page.set_markup("<p>first</p>");
    assert_eq!(state.get_markup(1000).await.unwrap(), "<p>first</p>");

    page.set_markup("<p>second</p>");
    assert_eq!(state.get_markup(1000).await.unwrap(), "<p>second</p>");
}

#[tokio::test]
async fn text_search_spans_line_breaks() {
    let page = FakePage::new(vec![
        FakeElement::text("div", "Sign\n  In to continue"),
        FakeElement::text("div", "Signing off"),
    ]);

    let found = state(page).find_elements_containing_text("sign in").await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text, "Sign In to continue");
}
