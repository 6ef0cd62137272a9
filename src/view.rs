//! HTML page composition for a [`PageSnapshot`].

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::controller::{PageSnapshot, PageState, Pagination};
use crate::formats::{DocumentRecord, Language, Theme};
use crate::i18n::{Labels, labels};
use crate::markdown::{escape_html, render_body};
use crate::nav::{NavigationTree, SubGroup};
use crate::toc::HeadingDescriptor;

/// Site-wide chrome that is not part of any document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteChrome {
    pub brand: String,
    pub home_url: Option<String>,
    pub admin_url: String,
}

impl Default for SiteChrome {
    fn default() -> Self {
        Self {
            brand: "Docs".to_owned(),
            home_url: None,
            admin_url: "http://localhost:1337/admin".to_owned(),
        }
    }
}

/// Unreserved path characters: A-Z a-z 0-9 - . _ ~
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Path of the page showing `slug`, or the docs index. The slug is
/// percent-encoded as a single path segment.
pub fn doc_path(slug: Option<&str>) -> String {
    match slug {
        Some(slug) => format!("/docs/{}", utf8_percent_encode(slug, PATH_SEGMENT)),
        None => "/docs".to_owned(),
    }
}

fn query_value(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Renders the complete HTML document for `snapshot`. `current_path` is where
/// preference and menu links return to.
pub fn render_page(snapshot: &PageSnapshot, chrome: &SiteChrome, current_path: &str) -> String {
    let prefs = snapshot.preferences;
    let l = labels(prefs.language);

    let title = match &snapshot.state {
        PageState::Ready { document, .. } => format!("{} · {}", document.title, chrome.brand),
        _ => chrome.brand.clone(),
    };

    let mut out = String::new();
    out.push_str("<!doctype html>\n");
    out.push_str(&format!(
        "<html lang=\"{}\" data-theme=\"{}\">\n",
        prefs.language.code(),
        prefs.theme.as_str()
    ));
    out.push_str("<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    out.push_str(STYLE);
    out.push_str("</head>\n");

    if snapshot.mobile_nav_open {
        out.push_str("<body class=\"scroll-locked\">\n");
    } else {
        out.push_str("<body>\n");
    }

    match &snapshot.state {
        PageState::Loading => {
            out.push_str(&format!(
                "<div class=\"docs-loading\"><div class=\"loading-spinner\"></div><span>{}</span></div>\n",
                l.loading
            ));
        }
        PageState::Error { message } => {
            out.push_str(&format!(
                "<div class=\"docs-error\"><span>⚠</span><p>{}</p></div>\n",
                escape_html(message)
            ));
        }
        PageState::Ready { .. } | PageState::ReadyEmpty => {
            render_shell(&mut out, snapshot, chrome, current_path, l);
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_shell(
    out: &mut String,
    snapshot: &PageSnapshot,
    chrome: &SiteChrome,
    current_path: &str,
    l: &Labels,
) {
    let prefs = snapshot.preferences;
    let back = query_value(current_path);
    let nav = snapshot.navigation();
    let active_slug = snapshot.active_slug();

    out.push_str("<div class=\"docs-root\">\n<header class=\"docs-topbar\">\n<div class=\"topbar-left\">\n");
    out.push_str(&format!(
        "<a class=\"mobile-menu-btn\" href=\"/menu?open=true&amp;back={back}\" aria-label=\"{}\">☰</a>\n",
        l.open_menu
    ));
    render_brand(out, chrome, "topbar-logo");
    out.push_str("<span class=\"topbar-sep\">/</span><span class=\"topbar-section\">Docs</span>\n</div>\n");

    out.push_str("<div class=\"topbar-right\">\n");
    render_language_switch(out, prefs.language, &back);
    out.push_str(&format!(
        "<a class=\"theme-toggle\" href=\"/preferences?theme={}&amp;back={back}\" aria-label=\"Toggle theme\">{} <span>{}</span></a>\n",
        prefs.theme.toggled().as_str(),
        match prefs.theme {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        },
        l.theme_toggle(prefs.theme)
    ));
    out.push_str("</div>\n</header>\n");

    if snapshot.mobile_nav_open {
        out.push_str("<div class=\"mobile-overlay\">\n<div class=\"mobile-sidebar-wrap\">\n");
        out.push_str(&format!(
            "<a class=\"mobile-close-btn\" href=\"/menu?open=false&amp;back={back}\" aria-label=\"{}\">✕</a>\n",
            l.close_menu
        ));
        render_sidebar(out, &nav, chrome, active_slug);
        out.push_str("</div>\n</div>\n");
    }

    out.push_str("<div class=\"docs-body\">\n<div class=\"docs-sidebar-wrap\">\n");
    render_sidebar(out, &nav, chrome, active_slug);
    out.push_str("</div>\n<div class=\"docs-main-wrap\">\n<main class=\"docs-main\">\n");

    match &snapshot.state {
        PageState::Ready {
            document,
            fallback_from,
        } => {
            if fallback_from.is_some() {
                out.push_str(&format!(
                    "<p class=\"docs-notice\">{}</p>\n",
                    l.translation_missing
                ));
            }
            render_article(out, document, snapshot.pagination(), l);
        }
        _ => render_empty(out, chrome, l),
    }
    out.push_str("</main>\n</div>\n");

    if !snapshot.headings.is_empty() {
        render_toc(
            out,
            &snapshot.headings,
            snapshot.active_heading.as_deref(),
            l,
        );
    }
    out.push_str("</div>\n</div>\n");

    if !snapshot.headings.is_empty() {
        out.push_str(SCROLL_SPY_SCRIPT);
    }
}

fn render_brand(out: &mut String, chrome: &SiteChrome, class: &str) {
    let brand = escape_html(&chrome.brand);
    match &chrome.home_url {
        Some(url) => {
            out.push_str(&format!(
                "<a href=\"{}\" class=\"{class}\" target=\"_blank\" rel=\"noreferrer\">{brand}</a>\n",
                escape_html(url)
            ));
        }
        None => {
            out.push_str(&format!("<span class=\"{class}\">{brand}</span>\n"));
        }
    }
}

fn render_language_switch(out: &mut String, current: Language, back: &str) {
    out.push_str("<ul class=\"lang-menu\" role=\"listbox\">\n");
    for lang in Language::ALL {
        let selected = lang == current;
        out.push_str(&format!(
            "<li role=\"option\" aria-selected=\"{selected}\" class=\"lang-option{}\"><a href=\"/preferences?lang={}&amp;back={back}\"><span class=\"lang-flag\">{}</span> {}{}</a></li>\n",
            if selected { " lang-option--active" } else { "" },
            lang.code(),
            lang.flag(),
            lang.label(),
            if selected { " <span class=\"lang-check\">✓</span>" } else { "" },
        ));
    }
    out.push_str("</ul>\n");
}

fn render_sidebar(
    out: &mut String,
    nav: &NavigationTree<'_>,
    chrome: &SiteChrome,
    active_slug: Option<&str>,
) {
    out.push_str("<aside class=\"sidebar\">\n<div class=\"sidebar-brand\">\n");
    render_brand(out, chrome, "brand-link");
    out.push_str("<span class=\"brand-badge\">Docs</span>\n</div>\n<nav class=\"sidebar-nav\">\n");

    for category in &nav.categories {
        out.push_str(&format!(
            "<div class=\"nav-group\"><p class=\"nav-category-label\">{}</p><ul class=\"nav-list\">\n",
            escape_html(&category.label)
        ));
        for doc in &category.flat_entries {
            let active = active_slug == Some(doc.slug.as_str());
            out.push_str(&format!(
                "<li><a href=\"{}\" class=\"nav-item{}\"><span class=\"nav-item-indicator\"></span>{}</a></li>\n",
                escape_html(&doc_path(Some(&doc.slug))),
                if active { " nav-item--active" } else { "" },
                escape_html(&doc.title)
            ));
        }
        for group in &category.sub_groups {
            render_sub_group(out, group, active_slug);
        }
        out.push_str("</ul></div>\n");
    }

    out.push_str("</nav>\n</aside>\n");
}

fn render_sub_group(out: &mut String, group: &SubGroup<'_>, active_slug: Option<&str>) {
    let any_active = active_slug.is_some_and(|slug| group.contains(slug));
    out.push_str(&format!(
        "<li><details class=\"nav-sub-group\"{}><summary class=\"nav-sub-trigger{}\"><span class=\"nav-sub-trigger-dot\"></span><span class=\"nav-sub-trigger-label\">{}</span></summary><ul class=\"nav-sub-list\">\n",
        if any_active { " open" } else { "" },
        if any_active { " nav-sub-trigger--active" } else { "" },
        escape_html(&group.label)
    ));
    for doc in &group.entries {
        let active = active_slug == Some(doc.slug.as_str());
        out.push_str(&format!(
            "<li><a href=\"{}\" class=\"nav-sub-item{}\">{}</a></li>\n",
            escape_html(&doc_path(Some(&doc.slug))),
            if active { " nav-sub-item--active" } else { "" },
            escape_html(&doc.title)
        ));
    }
    out.push_str("</ul></details></li>\n");
}

fn render_article(out: &mut String, doc: &DocumentRecord, pagination: Pagination<'_>, l: &Labels) {
    out.push_str("<nav class=\"breadcrumb\"><a href=\"/docs\" class=\"breadcrumb-link\">Docs</a><span class=\"breadcrumb-sep\">›</span>");
    if let Some(category) = doc.category() {
        out.push_str(&format!(
            "<span class=\"breadcrumb-link\">{}</span><span class=\"breadcrumb-sep\">›</span>",
            escape_html(category)
        ));
    }
    out.push_str(&format!(
        "<span class=\"breadcrumb-current\">{}</span></nav>\n",
        escape_html(&doc.title)
    ));

    out.push_str("<article class=\"docs-article\">\n");
    if let Some(category) = doc.category() {
        out.push_str(&format!(
            "<span class=\"article-category\">{}</span>\n",
            escape_html(category)
        ));
    }
    out.push_str(&format!(
        "<h1 class=\"article-title\">{}</h1>\n",
        escape_html(&doc.title)
    ));
    if !doc.description.is_empty() {
        out.push_str(&format!(
            "<p class=\"article-lead\">{}</p>\n",
            escape_html(&doc.description)
        ));
    }
    if let Some(updated) = doc.last_updated() {
        out.push_str(&format!(
            "<p class=\"article-updated\">{}: <time datetime=\"{}\">{}</time></p>\n",
            l.last_updated,
            updated.to_rfc3339(),
            updated.format("%Y-%m-%d")
        ));
    }
    out.push_str("<div class=\"article-divider\"></div>\n<div class=\"article-body\">\n");
    out.push_str(&render_body(&doc.content));
    out.push_str("</div>\n<div class=\"article-pagination\">\n");
    render_page_link(out, pagination.prev, "page-nav--prev", l.previous);
    render_page_link(out, pagination.next, "page-nav--next", l.next);
    out.push_str("</div>\n</article>\n");
}

fn render_page_link(out: &mut String, doc: Option<&DocumentRecord>, class: &str, label: &str) {
    match doc {
        Some(doc) => {
            out.push_str(&format!(
                "<a href=\"{}\" class=\"page-nav {class}\"><span class=\"page-nav-label\">{label}</span><span class=\"page-nav-title\">{}</span></a>\n",
                escape_html(&doc_path(Some(&doc.slug))),
                escape_html(&doc.title)
            ));
        }
        None => out.push_str("<div></div>\n"),
    }
}

fn render_empty(out: &mut String, chrome: &SiteChrome, l: &Labels) {
    out.push_str(&format!(
        "<div class=\"docs-empty\"><div class=\"empty-icon\">📭</div><h2>{}</h2><p>{}</p><a href=\"{}\" class=\"empty-cta\" target=\"_blank\" rel=\"noreferrer\">{}</a></div>\n",
        l.empty_title,
        l.empty_body,
        escape_html(&chrome.admin_url),
        l.empty_cta
    ));
}

fn render_toc(
    out: &mut String,
    headings: &[HeadingDescriptor],
    active: Option<&str>,
    l: &Labels,
) {
    out.push_str(&format!(
        "<aside class=\"docs-toc\"><p class=\"toc-title\">{}</p><ul class=\"toc-list\">\n",
        l.on_this_page
    ));
    for heading in headings {
        let is_active = active == Some(heading.id.as_str());
        out.push_str(&format!(
            "<li class=\"toc-item toc-item--h{}\"><a href=\"#{}\" data-target=\"{}\" class=\"toc-link{}\">{}</a></li>\n",
            heading.level,
            heading.id,
            heading.id,
            if is_active { " toc-link--active" } else { "" },
            escape_html(&heading.text)
        ));
    }
    out.push_str("</ul></aside>\n");
}

const STYLE: &str = r#"<style>
body.scroll-locked { overflow: hidden; }
[data-theme="dark"] body { background: #0f1115; color: #e6e6e6; }
[data-theme="light"] body { background: #ffffff; color: #1a1a1a; }
.docs-body { display: flex; gap: 2rem; }
.docs-main-wrap { flex: 1; min-width: 0; }
.toc-link--active, .nav-item--active, .nav-sub-item--active { font-weight: 700; }
.mobile-overlay { position: fixed; inset: 0; background: rgba(0,0,0,.6); }
.article-pagination { display: flex; justify-content: space-between; }
</style>
"#;

// Reports heading geometry as the reader scrolls; the server decides which
// heading is active.
const SCROLL_SPY_SCRIPT: &str = r#"<script>
(function () {
  var pending = false;
  function report() {
    pending = false;
    var headings = Array.prototype.map.call(
      document.querySelectorAll('.article-body h2[id], .article-body h3[id]'),
      function (h) {
        var r = h.getBoundingClientRect();
        return { id: h.id, top: r.top + window.scrollY, bottom: r.bottom + window.scrollY };
      });
    fetch('/api/active-section', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ viewport: { top: window.scrollY, height: window.innerHeight }, headings: headings })
    }).then(function (r) { return r.json(); }).then(function (body) {
      document.querySelectorAll('.toc-link').forEach(function (a) {
        a.classList.toggle('toc-link--active', a.dataset.target === body.active);
      });
    }).catch(function () {});
  }
  window.addEventListener('scroll', function () {
    if (!pending) { pending = true; window.requestAnimationFrame(report); }
  }, { passive: true });
  report();
})();
</script>
"#;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::prefs::UserPreferences;
    use crate::toc::extract_headings;

    fn doc(slug: &str, category: Option<&str>, parent: Option<&str>, content: &str) -> DocumentRecord {
        DocumentRecord {
            id: slug.to_owned(),
            slug: slug.to_owned(),
            title: format!("Title {slug}"),
            content: content.to_owned(),
            category: category.map(str::to_owned),
            parent_title: parent.map(str::to_owned),
            ..DocumentRecord::default()
        }
    }

    fn snapshot(state: PageState, collection: Vec<DocumentRecord>) -> PageSnapshot {
        let headings = state
            .document()
            .map(|d| extract_headings(&d.content))
            .unwrap_or_default();
        PageSnapshot {
            state,
            collection: Arc::new(collection),
            preferences: UserPreferences::default(),
            requested_slug: None,
            headings,
            active_heading: None,
            mobile_nav_open: false,
        }
    }

    #[test]
    fn ready_page_has_sidebar_article_toc_and_pagination() {
        let docs = vec![
            doc("a", Some("Guide"), None, "## Alpha\n"),
            doc("b", Some("Guide"), Some("Deep"), "## Setup Steps\n### Sub step\n"),
            doc("c", None, None, ""),
        ];
        let mut snap = snapshot(
            PageState::Ready {
                document: docs[1].clone(),
                fallback_from: None,
            },
            docs,
        );
        snap.active_heading = Some("sub-step".to_owned());

        let html = render_page(&snap, &SiteChrome::default(), "/docs/b");
        assert!(html.contains(r#"<html lang="id" data-theme="dark">"#));
        assert!(html.contains(r#"<p class="nav-category-label">Guide</p>"#));
        assert!(html.contains(r#"<p class="nav-category-label">Umum</p>"#));
        assert!(html.contains(r#"<details class="nav-sub-group" open>"#));
        assert!(html.contains(r#"class="nav-sub-item nav-sub-item--active">Title b</a>"#));
        assert!(html.contains(r#"<h2 id="setup-steps">Setup Steps</h2>"#));
        assert!(html.contains(r##"<a href="#setup-steps" data-target="setup-steps" class="toc-link">"##));
        assert!(html.contains(r#"class="toc-link toc-link--active">Sub step</a>"#));
        assert!(html.contains(r#"<a href="/docs/a" class="page-nav page-nav--prev">"#));
        assert!(html.contains(r#"<a href="/docs/c" class="page-nav page-nav--next">"#));
        assert!(html.contains("Isi Halaman"));
        assert!(html.contains("/preferences?lang=en&amp;back=%2Fdocs%2Fb"));
        assert!(html.contains("/preferences?theme=light&amp;back=%2Fdocs%2Fb"));
    }

    #[test]
    fn fallback_document_shows_notice() {
        let docs = vec![doc("a", None, None, "")];
        let snap = snapshot(
            PageState::Ready {
                document: docs[0].clone(),
                fallback_from: Some("pricing".to_owned()),
            },
            docs,
        );
        let html = render_page(&snap, &SiteChrome::default(), "/docs/pricing");
        assert!(html.contains("docs-notice"));
        assert!(!html.contains("docs-toc"));
    }

    #[test]
    fn empty_state_links_admin_panel() {
        let snap = snapshot(PageState::ReadyEmpty, Vec::new());
        let html = render_page(&snap, &SiteChrome::default(), "/docs");
        assert!(html.contains("Belum ada dokumentasi"));
        assert!(html.contains("http://localhost:1337/admin"));
    }

    #[test]
    fn error_and_loading_replace_the_page() {
        let mut snap = snapshot(
            PageState::Error {
                message: "Failed to load documentation.".to_owned(),
            },
            Vec::new(),
        );
        snap.preferences.language = Language::En;
        let html = render_page(&snap, &SiteChrome::default(), "/docs");
        assert!(html.contains("docs-error"));
        assert!(!html.contains("sidebar"));

        let snap = snapshot(PageState::Loading, Vec::new());
        let html = render_page(&snap, &SiteChrome::default(), "/docs");
        assert!(html.contains("Memuat dokumentasi..."));
    }

    #[test]
    fn doc_path_encodes_slug_as_one_segment() {
        assert_eq!(doc_path(None), "/docs");
        assert_eq!(doc_path(Some("getting-started")), "/docs/getting-started");
        assert_eq!(doc_path(Some("a b?c#d/e")), "/docs/a%20b%3Fc%23d%2Fe");
        assert_eq!(doc_path(Some("über")), "/docs/%C3%BCber");
    }

    #[test]
    fn sidebar_links_use_encoded_slugs() {
        let docs = vec![doc("a", None, None, ""), doc("faq #1", None, None, "")];
        let snap = snapshot(
            PageState::Ready {
                document: docs[0].clone(),
                fallback_from: None,
            },
            docs,
        );
        let html = render_page(&snap, &SiteChrome::default(), "/docs/a");
        assert!(html.contains(r#"href="/docs/faq%20%231" class="nav-item""#));
        assert!(html.contains(r#"<a href="/docs/faq%20%231" class="page-nav page-nav--next">"#));
    }

    #[test]
    fn open_mobile_nav_locks_scroll() {
        let docs = vec![doc("a", None, None, "")];
        let mut snap = snapshot(
            PageState::Ready {
                document: docs[0].clone(),
                fallback_from: None,
            },
            docs,
        );
        snap.mobile_nav_open = true;
        snap.preferences.theme = Theme::Light;
        let html = render_page(&snap, &SiteChrome::default(), "/docs");
        assert!(html.contains(r#"<body class="scroll-locked">"#));
        assert!(html.contains("mobile-overlay"));
        assert!(html.contains(r#"data-theme="light""#));
    }
}
