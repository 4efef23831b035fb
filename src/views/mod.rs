//! Server-rendered HTML.
//!
//! DESIGN
//! ======
//! Pages are built from templates embedded at compile time with
//! `include_str!`. A template marks each slot as `{{NAME}}`; [`fill`]
//! substitutes every slot in a single left-to-right pass so text coming from
//! a substituted value is never scanned for further slots. Dynamic text is
//! passed through [`escape_html`] before it reaches a template; the only
//! unescaped values are fragments produced by this module tree.
//!
//! Every page shares [`layout`], which carries the navigation bar and the
//! mobile menu. The menu's open/closed state travels in the `?menu=open`
//! query parameter.

pub mod pages;
pub mod portal;

use time::Date;
use time::macros::format_description;

use pages::Page;

const LAYOUT_TEMPLATE: &str = include_str!("../../templates/layout.html");

/// Path of the gated employee area.
pub const EMPLOYEE_PATH: &str = "/employee";

// =============================================================================
// TEMPLATING
// =============================================================================

/// Replace each `{{NAME}}` slot in `template` with its value from `vars`.
///
/// Slots without a value are left in place.
#[must_use]
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `dd/MM/yyyy`, the display format for every date in the portal.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| date.to_string())
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Request facts the navigation bar depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nav<'a> {
    /// Path of the current page, used for the active link and menu toggle.
    pub path: &'a str,
    pub menu_open: bool,
    pub signed_in: bool,
}

/// Wrap a rendered page body in the shared document shell.
#[must_use]
pub fn layout(title: &str, nav: Nav<'_>, content: &str) -> String {
    let links = nav_links(nav);
    let path = local_path(nav.path);
    let (toggle_href, toggle_label) =
        if nav.menu_open { (path.to_owned(), "Fermer") } else { (format!("{path}?menu=open"), "Menu") };
    let mobile_menu = if nav.menu_open { format!(r#"<div class="mobile-menu">{links}</div>"#) } else { String::new() };
    let title = escape_html(title);
    let toggle_href = escape_html(&toggle_href);

    fill(
        LAYOUT_TEMPLATE,
        &[
            ("TITLE", title.as_str()),
            ("NAV_LINKS", links.as_str()),
            ("MENU_TOGGLE_HREF", toggle_href.as_str()),
            ("MENU_EXPANDED", if nav.menu_open { "true" } else { "false" }),
            ("MENU_TOGGLE_LABEL", toggle_label),
            ("MOBILE_MENU", mobile_menu.as_str()),
            ("CONTENT", content),
        ],
    )
}

/// `path` when it is a same-origin absolute path, otherwise `/`.
///
/// A request path such as `//host/x` or `/\host/x` would be read by
/// browsers as a link to another origin.
fn local_path(path: &str) -> &str {
    match path.as_bytes() {
        [b'/', b'/' | b'\\', ..] => "/",
        [b'/', ..] => path,
        _ => "/",
    }
}

fn nav_links(nav: Nav<'_>) -> String {
    let employee_label =
        if nav.signed_in { "Espace Employé (Connecté)".to_owned() } else { "Espace Employé".to_owned() };

    Page::PUBLIC
        .iter()
        .map(|page| (page.path(), page.nav_label().to_owned()))
        .chain(std::iter::once((EMPLOYEE_PATH, employee_label)))
        .map(|(href, label)| {
            let current = if href == nav.path { r#" aria-current="page""# } else { "" };
            format!(r#"<a href="{href}"{current}>{label}</a>"#)
        })
        .collect()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
