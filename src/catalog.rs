//! Built-in source descriptors, one per pagination mechanism the engine
//! supports: numbered listing pages with an inline chapter list, chapter
//! lists spread over paged URLs signalled by an in-page "Next" marker, and
//! a JSON suggestion endpoint behind search.

use crate::descriptor::{
    ChaptersDescriptor, ContentDescriptor, DetailDescriptor, FieldSelector, HttpMethod,
    ItemSource, ListingDescriptor, NextPageRule, PageSource, SourceDescriptor,
};

/// Every built-in source.
pub fn all() -> Vec<SourceDescriptor> {
    vec![real_web_novel(), free_web_novel(), mtl_novel()]
}

/// Look one up by id.
pub fn find(id: i64) -> Option<SourceDescriptor> {
    all().into_iter().find(|source| source.id == id)
}

fn html_items(selector: &str) -> ItemSource {
    ItemSource::Html {
        selector: selector.to_string(),
    }
}

/// WordPress/Madara theme. Listings paginate by page number, the full
/// chapter list sits newest-first inside the book page.
pub fn real_web_novel() -> SourceDescriptor {
    SourceDescriptor {
        id: 1,
        name: "RealWebNovel".to_string(),
        base_url: "https://readwebnovels.net".to_string(),
        lang: "en".to_string(),
        creator: "built-in".to_string(),
        latest: Some(ListingDescriptor {
            endpoint: "/manga-2/page/{page}/?m_orderby=latest".to_string(),
            method: HttpMethod::Get,
            items: html_items("div.page-item-detail"),
            link: FieldSelector::attr("a", "href"),
            name: FieldSelector::attr("a", "title"),
            cover: FieldSelector::attr("img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: Some(NextPageRule {
                selector: "div.nav-previous>a".to_string(),
                attr: None,
                value: Some("Older Posts".to_string()),
            }),
            ajax_selector: None,
        }),
        popular: Some(ListingDescriptor {
            endpoint: "/manga-2/page/{page}/?m_orderby=trending".to_string(),
            method: HttpMethod::Get,
            items: html_items("div.page-item-detail"),
            link: FieldSelector::attr("a", "href"),
            name: FieldSelector::attr("a", "title"),
            cover: FieldSelector::attr("img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: Some(NextPageRule {
                selector: "div.nav-previous>a".to_string(),
                attr: None,
                value: None,
            }),
            ajax_selector: None,
        }),
        search: Some(ListingDescriptor {
            endpoint: "/?s={query}&post_type=wp-manga&op=&author=&artist=&release=&adult="
                .to_string(),
            method: HttpMethod::Get,
            items: html_items("div.c-tabs-item__content"),
            link: FieldSelector::attr("div.tab-thumb a", "href"),
            name: FieldSelector::text("h3.h4 a"),
            cover: FieldSelector::attr("div.tab-thumb a img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: None,
            ajax_selector: None,
        }),
        detail: Some(DetailDescriptor {
            page: PageSource::Html,
            name: FieldSelector::text("div.post-title h1"),
            cover: FieldSelector::default(),
            author: FieldSelector::text("div.author-content a"),
            description: FieldSelector::text("div.summary__content"),
            genres: FieldSelector::text("div.genres-content a"),
            add_base_url_to_cover: false,
            ajax_selector: None,
        }),
        chapters: Some(ChaptersDescriptor {
            method: HttpMethod::Get,
            items: html_items("li.wp-manga-chapter"),
            link: FieldSelector::attr("a", "href"),
            name: FieldSelector::text("a"),
            add_base_url_to_link: false,
            newest_first: true,
            page_endpoint: None,
            page_suffix: None,
            fixed_suffix: None,
            supports_next_page_list: false,
            next_page: None,
            ajax_selector: None,
        }),
        content: Some(ContentDescriptor {
            method: HttpMethod::Get,
            page: PageSource::Html,
            title: FieldSelector::default(),
            paragraphs: FieldSelector::text("div.reading-content h4,p"),
            ajax_selector: None,
        }),
    }
}

/// Chapter lists span numbered `/{page}.html` URLs spliced over the book
/// link; a pager anchor reading "Next" marks the pages before the last.
pub fn free_web_novel() -> SourceDescriptor {
    let pager = "body > div.main > div > div.row-box > div.col-content > div.pages > ul > li > a:nth-child(14)";
    SourceDescriptor {
        id: 2,
        name: "FreeWebNovel".to_string(),
        base_url: "https://freewebnovel.com".to_string(),
        lang: "en".to_string(),
        creator: "built-in".to_string(),
        latest: Some(ListingDescriptor {
            endpoint: "/latest-release-novel/{page}/".to_string(),
            method: HttpMethod::Get,
            items: html_items("div.ul-list1 div.li"),
            link: FieldSelector::attr("div.txt a", "href"),
            name: FieldSelector::attr("div.txt a", "title"),
            cover: FieldSelector::attr("div.pic img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: Some(NextPageRule {
                selector: pager.to_string(),
                attr: None,
                value: None,
            }),
            ajax_selector: None,
        }),
        popular: Some(ListingDescriptor {
            endpoint: "/most-popular-novel/".to_string(),
            method: HttpMethod::Get,
            items: html_items("div.ul-list1 div.li"),
            link: FieldSelector::attr("div.txt a", "href"),
            name: FieldSelector::attr("div.txt a", "title"),
            cover: FieldSelector::attr("div.pic img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: Some(NextPageRule {
                selector: pager.to_string(),
                attr: None,
                value: None,
            }),
            ajax_selector: None,
        }),
        search: Some(ListingDescriptor {
            endpoint: "/search?searchkey={query}".to_string(),
            method: HttpMethod::Get,
            items: html_items("div.ul-list1 div.li"),
            link: FieldSelector::attr("div.txt a", "href"),
            name: FieldSelector::attr("div.txt a", "title"),
            cover: FieldSelector::attr("div.pic img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: Some(NextPageRule {
                selector: pager.to_string(),
                attr: None,
                value: None,
            }),
            ajax_selector: None,
        }),
        detail: Some(DetailDescriptor {
            page: PageSource::Html,
            name: FieldSelector::text("div.m-desc h1.tit"),
            cover: FieldSelector::default(),
            author: FieldSelector::attr("div.right a.a1", "title"),
            description: FieldSelector::text("div.inner"),
            genres: FieldSelector::text("div.item div.right a.a1"),
            add_base_url_to_cover: false,
            ajax_selector: None,
        }),
        chapters: Some(ChaptersDescriptor {
            method: HttpMethod::Get,
            items: html_items("div.m-newest2 ul.ul-list5 li"),
            link: FieldSelector::attr("a", "href"),
            name: FieldSelector::attr("a", "title"),
            add_base_url_to_link: true,
            newest_first: false,
            page_endpoint: Some("/{page}.html".to_string()),
            page_suffix: Some(".html".to_string()),
            fixed_suffix: None,
            supports_next_page_list: true,
            next_page: Some(NextPageRule {
                selector: "div.page a:nth-child(4)".to_string(),
                attr: None,
                value: Some("Next".to_string()),
            }),
            ajax_selector: None,
        }),
        content: Some(ContentDescriptor {
            method: HttpMethod::Get,
            page: PageSource::Html,
            title: FieldSelector::default(),
            paragraphs: FieldSelector::text("div.txt h4,p"),
            ajax_selector: None,
        }),
    }
}

/// AMP site. Search rides a JSON suggestion endpoint; the chapter list
/// lives on a single `/chapter-list/` page appended to the book link.
pub fn mtl_novel() -> SourceDescriptor {
    SourceDescriptor {
        id: 3,
        name: "MtlNovel".to_string(),
        base_url: "https://www.mtlnovel.com".to_string(),
        lang: "en".to_string(),
        creator: "built-in".to_string(),
        latest: Some(ListingDescriptor {
            endpoint: "/novel-list/?orderby=date&order=desc&status=all&pg={page}".to_string(),
            method: HttpMethod::Get,
            items: html_items("div.box"),
            link: FieldSelector::attr("a.list-title", "href"),
            name: FieldSelector::attr("a.list-title", "aria-label"),
            cover: FieldSelector::attr("amp-img.list-img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: Some(NextPageRule {
                selector: "#pagination > a:nth-child(13)".to_string(),
                attr: None,
                value: None,
            }),
            ajax_selector: None,
        }),
        popular: Some(ListingDescriptor {
            endpoint: "/monthly-rank/page/{page}/".to_string(),
            method: HttpMethod::Get,
            items: html_items("div.box"),
            link: FieldSelector::attr("a.list-title", "href"),
            name: FieldSelector::attr("a.list-title", "aria-label"),
            cover: FieldSelector::attr("amp-img.list-img", "src"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: Some(NextPageRule {
                selector: "#pagination > a:nth-child(13)".to_string(),
                attr: None,
                value: None,
            }),
            ajax_selector: None,
        }),
        search: Some(ListingDescriptor {
            endpoint: "/wp-admin/admin-ajax.php?action=autosuggest&q={query}\
                       &__amp_source_origin=https%3A%2F%2Fwww.mtlnovel.com"
                .to_string(),
            method: HttpMethod::Get,
            items: ItemSource::Json {
                path: "$.items[0].results".to_string(),
            },
            link: FieldSelector::text("permalink"),
            name: FieldSelector::text("title"),
            cover: FieldSelector::text("thumbnail"),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: None,
            ajax_selector: None,
        }),
        detail: Some(DetailDescriptor {
            page: PageSource::Html,
            name: FieldSelector::attr("a.list-a", "aria-label"),
            cover: FieldSelector::attr("amp-img.main-tmb img", "src"),
            author: FieldSelector::text("#author a"),
            description: FieldSelector::text("div.desc p"),
            genres: FieldSelector::text("#currentgen a"),
            add_base_url_to_cover: false,
            ajax_selector: None,
        }),
        chapters: Some(ChaptersDescriptor {
            method: HttpMethod::Get,
            items: html_items("div.ch-list p"),
            link: FieldSelector::attr("a", "href"),
            name: FieldSelector::text("a"),
            add_base_url_to_link: false,
            newest_first: true,
            page_endpoint: None,
            page_suffix: None,
            fixed_suffix: Some("/chapter-list/".to_string()),
            supports_next_page_list: false,
            next_page: None,
            ajax_selector: None,
        }),
        content: Some(ContentDescriptor {
            method: HttpMethod::Get,
            page: PageSource::Html,
            title: FieldSelector::text("h1.main-title"),
            paragraphs: FieldSelector::text("div.par p"),
            ajax_selector: None,
        }),
    }
}
