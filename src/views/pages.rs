//! Public marketing pages.

use super::{Nav, fill, layout};

const PAGE_TEMPLATE: &str = include_str!("../../templates/page.html");
const NOT_FOUND_TEMPLATE: &str = include_str!("../../templates/not_found.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Services,
    Expertise,
    Contact,
}

impl Page {
    /// Navigation order.
    pub const PUBLIC: [Page; 4] = [Page::Home, Page::Services, Page::Expertise, Page::Contact];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Services => "/services",
            Self::Expertise => "/expertise",
            Self::Contact => "/contact",
        }
    }

    #[must_use]
    pub fn nav_label(self) -> &'static str {
        match self {
            Self::Home => "Accueil",
            Self::Services => "Services",
            Self::Expertise => "Expertise",
            Self::Contact => "Contact",
        }
    }

    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Home => "RTIMS CONSULTING",
            Self::Services => "Nos Services",
            Self::Expertise => "Notre Expertise",
            Self::Contact => "Contact",
        }
    }
}

#[must_use]
pub fn render_page(page: Page, menu_open: bool, signed_in: bool) -> String {
    let body = fill(PAGE_TEMPLATE, &[("HEADING", page.heading())]);
    layout(page.heading(), Nav { path: page.path(), menu_open, signed_in }, &body)
}

#[must_use]
pub fn render_not_found(path: &str, menu_open: bool, signed_in: bool) -> String {
    layout("Page introuvable", Nav { path, menu_open, signed_in }, NOT_FOUND_TEMPLATE)
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
