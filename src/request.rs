//! Request construction. Turns a descriptor plus page/query arguments into
//! a concrete `PageRequest` with browser-like headers. Building never
//! fails; missing optional pieces resolve to empty substitutions.

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, REFERER, USER_AGENT};

use crate::descriptor::{ChaptersDescriptor, HttpMethod, ListingDescriptor};
use crate::normalize;
use crate::pagination::PageToken;

const PAGE_PLACEHOLDER: &str = "{page}";
const QUERY_PLACEHOLDER: &str = "{query}";

/// A fully resolved request for one page fetch.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HeaderMap,
}

/// Substitute `{page}` and `{query}` into an endpoint template. The query
/// is percent-encoded; raw user input never lands in a URL.
pub(crate) fn substitute(template: &str, page: u32, query: &str) -> String {
    let encoded = urlencoding::encode(query);
    template
        .replace(PAGE_PLACEHOLDER, &page.to_string())
        .replace(QUERY_PLACEHOLDER, &encoded)
}

/// Browser-like defaults sent with every request.
pub(crate) fn default_headers(base_url: &str, user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(base_url) {
        headers.insert(REFERER, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

pub(crate) fn listing_request(
    base_url: &str,
    user_agent: &str,
    desc: &ListingDescriptor,
    page: u32,
    query: &str,
) -> PageRequest {
    let path = substitute(&desc.endpoint, page, query);
    PageRequest {
        url: normalize::resolve_link(base_url, &path, false),
        method: desc.method,
        headers: default_headers(base_url, user_agent),
    }
}

pub(crate) fn detail_request(base_url: &str, user_agent: &str, book_link: &str) -> PageRequest {
    PageRequest {
        url: normalize::resolve_link(base_url, book_link, false),
        method: HttpMethod::Get,
        headers: default_headers(base_url, user_agent),
    }
}

pub(crate) fn content_request(
    base_url: &str,
    user_agent: &str,
    chapter_link: &str,
    method: HttpMethod,
) -> PageRequest {
    PageRequest {
        url: normalize::resolve_link(base_url, chapter_link, false),
        method,
        headers: default_headers(base_url, user_agent),
    }
}

/// Chapter-list URL through the ordered fallback chain, first match wins:
/// a continuation token verbatim; a paged endpoint spliced into the book
/// link over `page_suffix`; a fixed suffix appended; the book link itself.
pub(crate) fn chapters_request(
    base_url: &str,
    user_agent: &str,
    desc: &ChaptersDescriptor,
    book_link: &str,
    page: u32,
    token: Option<&PageToken>,
) -> PageRequest {
    let book_url = normalize::resolve_link(base_url, book_link, false);
    let url = if let Some(token) = token {
        token.url().to_string()
    } else if let (Some(endpoint), Some(suffix)) =
        (desc.page_endpoint.as_deref(), desc.page_suffix.as_deref())
    {
        book_url.replace(suffix, &substitute(endpoint, page, ""))
    } else if let Some(suffix) = desc.fixed_suffix.as_deref() {
        format!("{book_url}{suffix}")
    } else {
        book_url
    };
    PageRequest {
        url,
        method: desc.method,
        headers: default_headers(base_url, user_agent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldSelector, ItemSource};

    const BASE: &str = "https://site.example";
    const UA: &str = "test-agent/1.0";

    fn listing(endpoint: &str) -> ListingDescriptor {
        ListingDescriptor {
            endpoint: endpoint.to_string(),
            method: HttpMethod::Get,
            items: ItemSource::Html {
                selector: "div.row".to_string(),
            },
            link: FieldSelector::default(),
            name: FieldSelector::default(),
            cover: FieldSelector::default(),
            add_base_url_to_link: false,
            add_base_url_to_cover: false,
            next_page: None,
            ajax_selector: None,
        }
    }

    fn chapters() -> ChaptersDescriptor {
        ChaptersDescriptor {
            method: HttpMethod::Get,
            items: ItemSource::Html {
                selector: "li".to_string(),
            },
            link: FieldSelector::default(),
            name: FieldSelector::default(),
            add_base_url_to_link: false,
            newest_first: false,
            page_endpoint: None,
            page_suffix: None,
            fixed_suffix: None,
            supports_next_page_list: false,
            next_page: None,
            ajax_selector: None,
        }
    }

    #[test]
    fn substitutes_page_and_query() {
        let req = listing_request(BASE, UA, &listing("/search/{page}?q={query}"), 3, "sword art");
        assert_eq!(req.url, "https://site.example/search/3?q=sword%20art");
    }

    #[test]
    fn endpoint_already_carrying_the_base_is_not_doubled() {
        let req = listing_request(BASE, UA, &listing("https://site.example/latest/{page}"), 2, "");
        assert_eq!(req.url, "https://site.example/latest/2");
    }

    #[test]
    fn default_headers_identify_a_browser() {
        let req = listing_request(BASE, UA, &listing("/latest/{page}"), 1, "");
        assert_eq!(req.headers.get(USER_AGENT).unwrap(), UA);
        assert_eq!(req.headers.get(REFERER).unwrap(), BASE);
        assert_eq!(req.headers.get(CACHE_CONTROL).unwrap(), "max-age=0");
    }

    #[test]
    fn chapters_token_wins_over_everything() {
        let mut desc = chapters();
        desc.page_endpoint = Some("/{page}.html".to_string());
        desc.page_suffix = Some(".html".to_string());
        desc.fixed_suffix = Some("/chapter-list/".to_string());
        let token = PageToken::new("https://site.example/chapters?p=4".to_string());
        let req = chapters_request(BASE, UA, &desc, "/novel/a.html", 4, Some(&token));
        assert_eq!(req.url, "https://site.example/chapters?p=4");
    }

    #[test]
    fn chapters_paged_endpoint_splices_over_the_suffix() {
        let mut desc = chapters();
        desc.page_endpoint = Some("/{page}.html".to_string());
        desc.page_suffix = Some(".html".to_string());
        let req = chapters_request(BASE, UA, &desc, "/novel/a.html", 2, None);
        assert_eq!(req.url, "https://site.example/novel/a/2.html");
    }

    #[test]
    fn chapters_fixed_suffix_appends() {
        let mut desc = chapters();
        desc.fixed_suffix = Some("/chapter-list/".to_string());
        let req = chapters_request(BASE, UA, &desc, "/novel/a", 1, None);
        assert_eq!(req.url, "https://site.example/novel/a/chapter-list/");
    }

    #[test]
    fn chapters_falls_back_to_the_book_link() {
        let req = chapters_request(BASE, UA, &chapters(), "/novel/a", 1, None);
        assert_eq!(req.url, "https://site.example/novel/a");
    }

    #[test]
    fn post_method_carries_through() {
        let mut desc = chapters();
        desc.method = HttpMethod::Post;
        let req = chapters_request(BASE, UA, &desc, "/novel/a", 1, None);
        assert_eq!(req.method, HttpMethod::Post);
    }
}
