//! Entity normalization: link and cover resolution, text cleanup, and
//! assembly of `Book`/`Chapter`/content values from extracted fields.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde_json::{Map, Value};
use url::Url;

use crate::descriptor::{
    ChaptersDescriptor, ContentDescriptor, DetailDescriptor, ListingDescriptor,
};
use crate::extract::{self, ExtractReport};
use crate::models::{Book, Chapter};

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("literal regex"))
}

/// Decode HTML entities, strip stray markup and collapse whitespace runs.
pub(crate) fn clean_text(raw: &str) -> String {
    let decoded: String = if raw.contains('&') || raw.contains('<') {
        Html::parse_fragment(raw).root_element().text().collect()
    } else {
        raw.to_string()
    };
    whitespace().replace_all(decoded.trim(), " ").into_owned()
}

pub(crate) fn is_absolute(raw: &str) -> bool {
    matches!(
        Url::parse(raw),
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some()
    )
}

fn with_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Sites flagged with `add_base_url_to_link` emit bare relative hrefs; give
/// those the base. Absolute links pass through.
pub(crate) fn maybe_add_base(base_url: &str, raw: &str, add_base: bool) -> String {
    if add_base && !raw.is_empty() && !is_absolute(raw) {
        format!("{}{}", base_url.trim_end_matches('/'), with_leading_slash(raw))
    } else {
        raw.to_string()
    }
}

/// Reduce a link to its `path?query#fragment` form. Input that does not
/// parse as an absolute URL (relative hrefs, mostly) is returned unchanged.
pub(crate) fn path_only(raw: &str) -> String {
    match Url::parse(&raw.replace(' ', "%20")) {
        Ok(url) if url.host_str().is_some() => {
            let mut out = url.path().to_string();
            if let Some(query) = url.query() {
                out.push('?');
                out.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                out.push('#');
                out.push_str(fragment);
            }
            out
        }
        _ => raw.to_string(),
    }
}

/// Strip-then-prefix: whatever host the raw link carried, the result is the
/// configured base URL plus the path, with the base applied exactly once.
pub(crate) fn resolve_link(base_url: &str, raw: &str, add_base: bool) -> String {
    let raw = maybe_add_base(base_url, raw, add_base);
    format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        with_leading_slash(&path_only(&raw))
    )
}

/// Covers may legitimately live on CDNs, so only the add-base rewrite
/// applies; absolute cover URLs stay as the site served them.
pub(crate) fn resolve_cover(base_url: &str, raw: &str, add_base: bool) -> String {
    maybe_add_base(base_url, raw, add_base)
}

/// A listing row from an HTML element. Rows without a usable link and title
/// are dropped.
pub(crate) fn listing_book_from_element(
    desc: &ListingDescriptor,
    base_url: &str,
    source_id: i64,
    row: ElementRef<'_>,
    report: &mut ExtractReport,
) -> Option<Book> {
    let raw_link = extract::string_field(row, "link", &desc.link, report);
    let title = clean_text(&extract::string_field(row, "name", &desc.name, report));
    if raw_link.trim().is_empty() || title.is_empty() {
        return None;
    }
    let raw_cover = extract::string_field(row, "cover", &desc.cover, report);
    Some(Book {
        title,
        link: resolve_link(base_url, raw_link.trim(), desc.add_base_url_to_link),
        cover: resolve_cover(base_url, raw_cover.trim(), desc.add_base_url_to_cover),
        source_id,
        ..Book::default()
    })
}

/// A listing row from a JSON record.
pub(crate) fn listing_book_from_record(
    desc: &ListingDescriptor,
    base_url: &str,
    source_id: i64,
    record: &Map<String, Value>,
    report: &mut ExtractReport,
) -> Option<Book> {
    let raw_link = extract::json_string_field(record, "link", &desc.link, report);
    let title = clean_text(&extract::json_string_field(record, "name", &desc.name, report));
    if raw_link.trim().is_empty() || title.is_empty() {
        return None;
    }
    let raw_cover = extract::json_string_field(record, "cover", &desc.cover, report);
    Some(Book {
        title,
        link: resolve_link(base_url, raw_link.trim(), desc.add_base_url_to_link),
        cover: resolve_cover(base_url, raw_cover.trim(), desc.add_base_url_to_cover),
        source_id,
        ..Book::default()
    })
}

/// Detail fields off a whole document. The input book's resolved link is
/// preserved; a detail page never re-derives its own key.
pub(crate) fn detail_book_from_doc(
    desc: &DetailDescriptor,
    base_url: &str,
    source_id: i64,
    book_link: &str,
    doc: &Html,
    report: &mut ExtractReport,
) -> Book {
    let root = doc.root_element();
    let raw_cover = extract::string_field(root, "cover", &desc.cover, report);
    Book {
        title: clean_text(&extract::string_field(root, "name", &desc.name, report)),
        link: book_link.to_string(),
        cover: resolve_cover(base_url, raw_cover.trim(), desc.add_base_url_to_cover),
        author: clean_text(&extract::string_field(root, "author", &desc.author, report)),
        description: clean_text(&extract::string_field(
            root,
            "description",
            &desc.description,
            report,
        )),
        genres: extract::list_field(root, "genres", &desc.genres, report)
            .iter()
            .map(|g| clean_text(g))
            .filter(|g| !g.is_empty())
            .collect(),
        source_id,
    }
}

/// Detail fields off the first JSON record.
pub(crate) fn detail_book_from_record(
    desc: &DetailDescriptor,
    base_url: &str,
    source_id: i64,
    book_link: &str,
    record: &Map<String, Value>,
    report: &mut ExtractReport,
) -> Book {
    let raw_cover = extract::json_string_field(record, "cover", &desc.cover, report);
    let genre = clean_text(&extract::json_string_field(record, "genres", &desc.genres, report));
    Book {
        title: clean_text(&extract::json_string_field(record, "name", &desc.name, report)),
        link: book_link.to_string(),
        cover: resolve_cover(base_url, raw_cover.trim(), desc.add_base_url_to_cover),
        author: clean_text(&extract::json_string_field(record, "author", &desc.author, report)),
        description: clean_text(&extract::json_string_field(
            record,
            "description",
            &desc.description,
            report,
        )),
        genres: if genre.is_empty() { Vec::new() } else { vec![genre] },
        source_id,
    }
}

/// A chapter row from an HTML element.
pub(crate) fn chapter_from_element(
    desc: &ChaptersDescriptor,
    base_url: &str,
    row: ElementRef<'_>,
    report: &mut ExtractReport,
) -> Option<Chapter> {
    let raw_link = extract::string_field(row, "link", &desc.link, report);
    let title = clean_text(&extract::string_field(row, "name", &desc.name, report));
    if raw_link.trim().is_empty() || title.is_empty() {
        return None;
    }
    Some(Chapter {
        title,
        link: resolve_link(base_url, raw_link.trim(), desc.add_base_url_to_link),
        index: 0,
    })
}

/// A chapter row from a JSON record.
pub(crate) fn chapter_from_record(
    desc: &ChaptersDescriptor,
    base_url: &str,
    record: &Map<String, Value>,
    report: &mut ExtractReport,
) -> Option<Chapter> {
    let raw_link = extract::json_string_field(record, "link", &desc.link, report);
    let title = clean_text(&extract::json_string_field(record, "name", &desc.name, report));
    if raw_link.trim().is_empty() || title.is_empty() {
        return None;
    }
    Some(Chapter {
        title,
        link: resolve_link(base_url, raw_link.trim(), desc.add_base_url_to_link),
        index: 0,
    })
}

/// Put chapters in ascending reading order and assign ordinals.
pub(crate) fn finalize_chapters(mut chapters: Vec<Chapter>, newest_first: bool) -> Vec<Chapter> {
    if newest_first {
        chapters.reverse();
    }
    for (i, chapter) in chapters.iter_mut().enumerate() {
        chapter.index = (i + 1) as u32;
    }
    chapters
}

/// Chapter body off a whole document: configured title first, then one
/// entry per matched paragraph, blanks dropped.
pub(crate) fn content_from_doc(
    desc: &ContentDescriptor,
    doc: &Html,
    report: &mut ExtractReport,
) -> Vec<String> {
    let root = doc.root_element();
    let title = clean_text(&extract::string_field(root, "title", &desc.title, report));
    let mut paragraphs: Vec<String> = extract::list_field(root, "paragraphs", &desc.paragraphs, report)
        .iter()
        .map(|p| clean_text(p))
        .filter(|p| !p.is_empty())
        .collect();
    if !title.is_empty() {
        paragraphs.insert(0, title);
    }
    paragraphs
}

/// Chapter body off a JSON record: the content key holds one blob.
pub(crate) fn content_from_record(
    desc: &ContentDescriptor,
    record: &Map<String, Value>,
    report: &mut ExtractReport,
) -> Vec<String> {
    let title = clean_text(&extract::json_string_field(record, "title", &desc.title, report));
    let body = clean_text(&extract::json_string_field(
        record,
        "paragraphs",
        &desc.paragraphs,
        report,
    ));
    let mut paragraphs = Vec::new();
    if !title.is_empty() {
        paragraphs.push(title);
    }
    if !body.is_empty() {
        paragraphs.push(body);
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldSelector, ItemSource};

    const BASE: &str = "https://site.example";

    #[test]
    fn clean_text_decodes_entities_and_collapses_whitespace() {
        assert_eq!(clean_text("  Sword &amp; Sorcery\n\t Vol.  2 "), "Sword & Sorcery Vol. 2");
        assert_eq!(clean_text("It&#39;s here"), "It's here");
        assert_eq!(clean_text("<b>Bold</b> title"), "Bold title");
    }

    #[test]
    fn path_only_strips_host_and_keeps_query_fragment() {
        assert_eq!(
            path_only("https://mirror.example/novel/x?p=2#top"),
            "/novel/x?p=2#top"
        );
        assert_eq!(path_only("/already/relative?q=1"), "/already/relative?q=1");
        assert_eq!(path_only("plain-slug.html"), "plain-slug.html");
    }

    #[test]
    fn resolve_link_applies_the_base_exactly_once() {
        assert_eq!(resolve_link(BASE, "/novel/a", false), "https://site.example/novel/a");
        assert_eq!(
            resolve_link(BASE, "https://site.example/novel/a", false),
            "https://site.example/novel/a"
        );
        assert_eq!(
            resolve_link(BASE, "https://mirror.example/novel/a", false),
            "https://site.example/novel/a"
        );
    }

    #[test]
    fn add_base_flag_only_touches_relative_links() {
        assert_eq!(maybe_add_base(BASE, "/c/1", true), "https://site.example/c/1");
        assert_eq!(
            maybe_add_base(BASE, "https://other.example/c/1", true),
            "https://other.example/c/1"
        );
        assert_eq!(maybe_add_base(BASE, "/c/1", false), "/c/1");
    }

    #[test]
    fn covers_on_cdns_are_left_alone() {
        assert_eq!(
            resolve_cover(BASE, "https://cdn.example/img.jpg", false),
            "https://cdn.example/img.jpg"
        );
        assert_eq!(
            resolve_cover(BASE, "/static/img.jpg", true),
            "https://site.example/static/img.jpg"
        );
    }

    fn listing() -> ListingDescriptor {
        ListingDescriptor {
            endpoint: "/latest/{page}".to_string(),
            method: Default::default(),
            items: ItemSource::Html {
                selector: "div.row".to_string(),
            },
            link: FieldSelector::attr("a", "href"),
            name: FieldSelector::attr("a", "title"),
            cover: FieldSelector::attr("img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: None,
            ajax_selector: None,
        }
    }

    #[test]
    fn listing_rows_without_titles_are_dropped() {
        let html = Html::parse_document(
            r#"<div class="row"><a href="/b/1" title="Book One"></a><img src="x.jpg"></div>
               <div class="row"><a href="/b/2"></a></div>"#,
        );
        let mut report = ExtractReport::default();
        let rows = extract::html_rows(&html, "items", "div.row", &mut report);
        let books: Vec<Book> = rows
            .into_iter()
            .filter_map(|row| listing_book_from_element(&listing(), BASE, 1, row, &mut report))
            .collect();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].link, "https://site.example/b/1");
        assert!(!report.is_clean(), "the dropped row recorded its miss");
    }

    #[test]
    fn finalize_reverses_newest_first_lists_and_assigns_ordinals() {
        let chapters = vec![
            Chapter { title: "Ch 3".into(), link: "l3".into(), index: 0 },
            Chapter { title: "Ch 2".into(), link: "l2".into(), index: 0 },
            Chapter { title: "Ch 1".into(), link: "l1".into(), index: 0 },
        ];
        let ordered = finalize_chapters(chapters, true);
        assert_eq!(ordered[0].title, "Ch 1");
        assert_eq!(ordered[0].index, 1);
        assert_eq!(ordered[2].title, "Ch 3");
        assert_eq!(ordered[2].index, 3);
    }

    #[test]
    fn content_merges_title_before_paragraphs() {
        let desc = ContentDescriptor {
            title: FieldSelector::text("h1"),
            paragraphs: FieldSelector::text("div.body p"),
            ..ContentDescriptor::default()
        };
        let html = Html::parse_document(
            "<h1>Chapter 1</h1><div class=\"body\"><p>First.</p><p></p><p>Second.</p></div>",
        );
        let mut report = ExtractReport::default();
        let paragraphs = content_from_doc(&desc, &html, &mut report);
        assert_eq!(paragraphs, vec!["Chapter 1", "First.", "Second."]);
    }
}
