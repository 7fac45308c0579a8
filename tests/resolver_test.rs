mod common;

use async_trait::async_trait;
use common::{FakeElement, FakePage};
use kodegen_browser_actions::page::{AriaRole, BrowserPage, CandidateQuery, DriverResult, Point};
use kodegen_browser_actions::resolver::{
    CssStrategy, ExactTextStrategy, ResolutionStrategy, RoleStrategy,
};
use kodegen_browser_actions::{
    ResolutionError, ResolvedHandle, Resolver, Strategy, TargetDescriptor,
};

#[tokio::test]
async fn button_beats_link_with_longer_name() {
    let page = FakePage::new(vec![
        FakeElement::link("Submit form"),
        FakeElement::button("Submit"),
    ]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("Submit"))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::RoleButton);
    assert_eq!(handle.candidate().unwrap().tag, "button");
}

#[tokio::test]
async fn role_match_is_case_insensitive_substring() {
    let page = FakePage::new(vec![FakeElement::button("Proceed to Checkout")]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("checkout"))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::RoleButton);
}

#[tokio::test]
async fn link_is_used_when_no_button_matches() {
    let page = FakePage::new(vec![
        FakeElement::button("Cancel"),
        FakeElement::link("Pricing"),
    ]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("pricing"))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::RoleLink);
}

#[tokio::test]
async fn exact_text_requires_whole_text() {
    let page = FakePage::new(vec![
        FakeElement::text("span", "Terms and conditions apply"),
        FakeElement::text("span", "  Terms  "),
    ]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("terms"))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::TextMatch);
    assert_eq!(
        handle.element_ref().unwrap().selector(),
        "[data-kodegen-ref=\"1\"]"
    );
}

#[tokio::test]
async fn first_match_in_document_order_wins() {
    let page = FakePage::new(vec![
        FakeElement::button("Delete draft"),
        FakeElement::button("Delete account"),
    ]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("Delete"))
        .await
        .unwrap();

    assert_eq!(handle.candidate().unwrap().name, "Delete draft");
}

#[tokio::test]
async fn text_falls_back_to_selector() {
    let page = FakePage::new(vec![FakeElement::text("div", "hello").with_selector(".banner")]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text(".banner"))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::CssSelector);
}

#[tokio::test]
async fn unmatched_text_is_not_found_with_every_strategy_tried() {
    let page = FakePage::new(vec![FakeElement::button("Save")]);

    let err = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("Checkout now"))
        .await
        .unwrap_err();

    match err {
        ResolutionError::NotFound { target, tried } => {
            assert_eq!(target, "Checkout now");
            assert_eq!(
                tried,
                vec![
                    Strategy::RoleButton,
                    Strategy::RoleLink,
                    Strategy::TextMatch,
                    Strategy::CssSelector
                ]
            );
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_page_is_not_found() {
    let page = FakePage::new(Vec::new());

    let err = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("anything"))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolutionError::NotFound { .. }));
}

#[tokio::test]
async fn css_target_surfaces_invalid_selector() {
    let page = FakePage::new(vec![FakeElement::button("Go")]);

    let err = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::css("button >> text=Go"))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolutionError::InvalidSelector { .. }));
}

#[tokio::test]
async fn css_target_skips_the_text_cascade() {
    let page = FakePage::new(vec![
        FakeElement::button("#primary"),
        FakeElement::text("div", "Main").with_selector("#primary"),
    ]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::css("#primary"))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::CssSelector);
    assert_eq!(handle.candidate().unwrap().tag, "div");
}

#[tokio::test]
async fn coordinates_resolve_without_querying() {
    let page = FakePage::new(Vec::new());
    page.fail_queries();

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::coordinates(120, 48))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::Coordinates);
    assert_eq!(handle.point(), Some(Point::new(120.0, 48.0)));
}

#[tokio::test]
async fn driver_failure_is_reported_not_swallowed() {
    let page = FakePage::new(vec![FakeElement::button("Save")]);
    page.fail_queries();

    let err = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("Save"))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolutionError::Driver { .. }));
    assert!(err.to_string().contains("Save"));
}

#[tokio::test]
async fn lenient_css_treats_unparsable_selector_as_miss() {
    let page = FakePage::new(Vec::new());

    let lenient = CssStrategy::lenient()
        .attempt(page.as_ref(), "not a selector")
        .await
        .unwrap();
    assert!(lenient.is_none());

    let strict = CssStrategy::strict().attempt(page.as_ref(), "not a selector").await;
    assert!(strict.is_err());
}

#[tokio::test]
async fn strategies_work_alone() {
    let page = FakePage::new(vec![
        FakeElement::link("Docs"),
        FakeElement::text("p", "Docs"),
    ]);

    let by_role = RoleStrategy::new(AriaRole::Button)
        .attempt(page.as_ref(), "Docs")
        .await
        .unwrap();
    assert!(by_role.is_none());

    let by_text = ExactTextStrategy.attempt(page.as_ref(), "docs").await.unwrap();
    assert_eq!(by_text.unwrap().candidate().unwrap().tag, "a");
}

/// Exact accessible-name match over text-bearing elements
struct NameStrategy;

#[async_trait]
impl ResolutionStrategy for NameStrategy {
    fn strategy(&self) -> Strategy {
        Strategy::TextMatch
    }

    async fn attempt(
        &self,
        page: &dyn BrowserPage,
        value: &str,
    ) -> DriverResult<Option<ResolvedHandle>> {
        let all = page.query(&CandidateQuery::Text(value.into())).await?;
        Ok(all
            .into_iter()
            .find(|c| c.name == value)
            .map(|c| ResolvedHandle::element(c, Strategy::TextMatch)))
    }
}

#[tokio::test]
async fn custom_cascade_replaces_default_order() {
    let page = FakePage::new(vec![
        FakeElement::button("Open menu"),
        FakeElement::text("span", "icon").with_name("Open menu"),
    ]);

    let resolver = Resolver::with_cascade(vec![Box::new(NameStrategy)]);
    let handle = resolver
        .resolve(page.as_ref(), &TargetDescriptor::text("Open menu"))
        .await
        .unwrap();

    assert_eq!(resolver.cascade(), vec![Strategy::TextMatch]);
    assert_eq!(handle.candidate().unwrap().tag, "button");
}

#[tokio::test]
async fn text_broken_across_lines_still_matches() {
    let page = FakePage::new(vec![
        FakeElement::text("p", "Welcome"),
        FakeElement::text("p", "Sign\nIn"),
    ]);

    let handle = Resolver::new()
        .resolve(page.as_ref(), &TargetDescriptor::text("sign in"))
        .await
        .unwrap();

    assert_eq!(handle.strategy(), Strategy::TextMatch);
    assert_eq!(handle.candidate().unwrap().text, "Sign\nIn");
}
