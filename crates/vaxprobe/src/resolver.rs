//! Locator resolution.
//!
//! Turns a [`LocatorSpec`] into exactly one [`ElementHandle`]:
//!
//! 1. resolve the container scope, strictly, or use the whole page
//! 2. query role/name inside the scope
//! 3. with a row filter, query only inside rows containing the row text
//! 4. with an index, pick the Nth remaining candidate
//!
//! Resolution is a single pass; the dispatcher and verifier own the waiting.

use crate::driver::{ElementHandle, ElementQuery, PageDriver};
use crate::locator::{LocatorSpec, NameMatch, Role};
use crate::result::{ProbeError, ProbeResult};

/// Resolves symbolic locators against a driver
#[derive(Debug)]
pub struct LocatorResolver<'a, D: ?Sized> {
    driver: &'a D,
}

impl<'a, D: PageDriver + ?Sized> LocatorResolver<'a, D> {
    /// Create a resolver over `driver`
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Resolve to exactly one element
    pub async fn resolve(&self, spec: &LocatorSpec) -> ProbeResult<ElementHandle> {
        let candidates = self.candidates(spec).await?;
        select(spec, candidates)
    }

    /// Every element the locator matches, before index selection
    pub async fn candidates(&self, spec: &LocatorSpec) -> ProbeResult<Vec<ElementHandle>> {
        let scope = self.resolve_scope(spec).await?;
        let base = ElementQuery::by_role(spec.role).with_name(spec.name.clone(), spec.name_match);

        let Some(ref row_text) = spec.row else {
            return self.driver.query(&base.within(scope)).await;
        };

        let rows = self
            .driver
            .query(
                &ElementQuery::by_role(Some(Role::Row))
                    .with_text(row_text.clone())
                    .within(scope),
            )
            .await?;

        let mut found: Vec<ElementHandle> = Vec::new();
        for row in rows {
            for handle in self.driver.query(&base.clone().within(Some(row))).await? {
                // nested rows can surface the same element twice
                if !found.iter().any(|h| h.id == handle.id) {
                    found.push(handle);
                }
            }
        }
        Ok(found)
    }

    async fn resolve_scope(&self, spec: &LocatorSpec) -> ProbeResult<Option<ElementHandle>> {
        let Some(ref container) = spec.scope else {
            return Ok(None);
        };
        let container_spec = LocatorSpec {
            role: Some(container.role),
            name: container.name.clone(),
            ..LocatorSpec::default()
        };
        let found = self
            .driver
            .query(
                &ElementQuery::by_role(Some(container.role))
                    .with_name(container.name.clone(), NameMatch::Contains),
            )
            .await?;
        select(&container_spec, found).map(Some)
    }
}

fn select(spec: &LocatorSpec, candidates: Vec<ElementHandle>) -> ProbeResult<ElementHandle> {
    let count = candidates.len();
    let not_found = || ProbeError::ElementNotFound {
        locator: spec.to_string(),
    };
    match spec.index {
        Some(index) => candidates.into_iter().nth(index).ok_or_else(not_found),
        None if count > 1 => Err(ProbeError::AmbiguousLocator {
            locator: spec.to_string(),
            count,
        }),
        None => candidates.into_iter().next().ok_or_else(not_found),
    }
}
