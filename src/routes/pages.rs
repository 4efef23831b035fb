//! Public marketing pages and the 404 fallback.

use std::convert::Infallible;

use axum::extract::{OriginalUri, Query};
use axum::http::{StatusCode, Uri};
use axum::response::Html;

use super::auth::MaybeSession;
use crate::views::pages::{Page, render_not_found, render_page};

/// `?menu=open` expands the mobile navigation menu.
///
/// Never rejects: a malformed or repeated query string renders the page
/// with the menu closed, or open if any `menu` pair says so.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MenuQuery {
    open: bool,
}

impl MenuQuery {
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        let open = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map(|Query(pairs)| pairs.iter().any(|(key, value)| key == "menu" && value == "open"))
            .unwrap_or(false);
        Self { open }
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self.open
    }
}

impl<S> axum::extract::FromRequestParts<S> for MenuQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

fn page(page: Page, session: &MaybeSession, menu: MenuQuery) -> Html<String> {
    Html(render_page(page, menu.is_open(), session.0.is_some()))
}

/// `GET /`
pub async fn home(session: MaybeSession, menu: MenuQuery) -> Html<String> {
    page(Page::Home, &session, menu)
}

/// `GET /services`
pub async fn services(session: MaybeSession, menu: MenuQuery) -> Html<String> {
    page(Page::Services, &session, menu)
}

/// `GET /expertise`
pub async fn expertise(session: MaybeSession, menu: MenuQuery) -> Html<String> {
    page(Page::Expertise, &session, menu)
}

/// `GET /contact`
pub async fn contact(session: MaybeSession, menu: MenuQuery) -> Html<String> {
    page(Page::Contact, &session, menu)
}

/// Any unrouted path.
pub async fn not_found(
    OriginalUri(uri): OriginalUri,
    session: MaybeSession,
    menu: MenuQuery,
) -> (StatusCode, Html<String>) {
    let html = render_not_found(uri.path(), menu.is_open(), session.0.is_some());
    (StatusCode::NOT_FOUND, Html(html))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
