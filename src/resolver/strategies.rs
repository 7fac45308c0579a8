//! Resolution strategies tried by the [`Resolver`](super::Resolver) cascade

use async_trait::async_trait;
use tracing::trace;

use super::matcher::{contains_ignore_case, equals_ignore_case};
use super::{ResolvedHandle, Strategy};
use crate::page::{AriaRole, BrowserPage, CandidateQuery, DriverError, DriverResult};

/// One heuristic for turning a target value into a single live element
///
/// `Ok(None)` means "no match, try the next strategy"; `Err` means the page
/// itself could not be queried.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn strategy(&self) -> Strategy;

    async fn attempt(
        &self,
        page: &dyn BrowserPage,
        value: &str,
    ) -> DriverResult<Option<ResolvedHandle>>;
}

/// Elements exposing `role` whose accessible name contains the value
pub struct RoleStrategy {
    role: AriaRole,
}

impl RoleStrategy {
    pub fn new(role: AriaRole) -> Self {
        Self { role }
    }
}

#[async_trait]
impl ResolutionStrategy for RoleStrategy {
    fn strategy(&self) -> Strategy {
        match self.role {
            AriaRole::Button => Strategy::RoleButton,
            AriaRole::Link => Strategy::RoleLink,
        }
    }

    async fn attempt(
        &self,
        page: &dyn BrowserPage,
        value: &str,
    ) -> DriverResult<Option<ResolvedHandle>> {
        let candidates = page.query(&CandidateQuery::Role(self.role)).await?;
        trace!("{} role candidates for {:?}", candidates.len(), self.role);
        Ok(candidates
            .into_iter()
            .find(|c| contains_ignore_case(&c.name, value))
            .map(|c| ResolvedHandle::element(c, self.strategy())))
    }
}

/// Any element whose full rendered text equals the value
pub struct ExactTextStrategy;

#[async_trait]
impl ResolutionStrategy for ExactTextStrategy {
    fn strategy(&self) -> Strategy {
        Strategy::TextMatch
    }

    async fn attempt(
        &self,
        page: &dyn BrowserPage,
        value: &str,
    ) -> DriverResult<Option<ResolvedHandle>> {
        let candidates = page.query(&CandidateQuery::Text(value.to_string())).await?;
        Ok(candidates
            .into_iter()
            .find(|c| equals_ignore_case(&c.text, value))
            .map(|c| ResolvedHandle::element(c, Strategy::TextMatch)))
    }
}

/// The value as a literal CSS selector
///
/// Lenient mode is used at the end of the text cascade, where the value is
/// usually prose: an unparsable selector is a miss there, not an error.
pub struct CssStrategy {
    lenient: bool,
}

impl CssStrategy {
    pub fn strict() -> Self {
        Self { lenient: false }
    }

    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}

#[async_trait]
impl ResolutionStrategy for CssStrategy {
    fn strategy(&self) -> Strategy {
        Strategy::CssSelector
    }

    async fn attempt(
        &self,
        page: &dyn BrowserPage,
        value: &str,
    ) -> DriverResult<Option<ResolvedHandle>> {
        match page.query(&CandidateQuery::Css(value.to_string())).await {
            Ok(candidates) => Ok(candidates
                .into_iter()
                .next()
                .map(|c| ResolvedHandle::element(c, Strategy::CssSelector))),
            Err(DriverError::InvalidSelector { .. }) if self.lenient => Ok(None),
            Err(err) => Err(err),
        }
    }
}
