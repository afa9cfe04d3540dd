use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::utils::config::PaginationConfig;

pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

/// Names of the query parameters [`PageParams`] consumes.
const PAGE_KEYS: [&str; 3] = ["page", "size", "sort"];

/// Raw `?page=&size=&sort=` query parameters.
///
/// Any of them may be repeated. Only the first `page` and `size` count, while
/// every `sort` adds orders.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default)]
    pub sort: Vec<String>,
}

/// Which page of results to fetch, and how to order them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size: size.max(1), sort: vec![] }
    }

    pub fn sorted_by(mut self, property: &str, direction: Direction) -> Self {
        self.sort.push(SortOrder { property: property.to_string(), direction });
        self
    }

    /// Parse query parameters leniently: a missing or malformed `page` is 0, a
    /// missing or malformed `size` is the configured default, and `size` is
    /// capped at the configured maximum.
    ///
    /// Each `sort` value is `prop[,prop...][,asc|desc]`, the direction applying
    /// to every property before it.
    pub fn from_params(params: &PageParams, config: &PaginationConfig) -> Self {
        let page = params.page.first().and_then(|p| p.trim().parse::<u32>().ok()).unwrap_or(0);
        let size = params
            .size
            .first()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|&s| s > 0)
            .unwrap_or(config.default_size)
            .min(config.max_size);

        let mut sort = vec![];
        for value in &params.sort {
            let mut parts = value.split(',').map(str::trim).filter(|p| !p.is_empty()).collect::<Vec<_>>();
            let direction = match parts.last().map(|p| p.to_ascii_lowercase()) {
                Some(d) if d == "asc" => Some(Direction::Asc),
                Some(d) if d == "desc" => Some(Direction::Desc),
                _ => None,
            };
            if direction.is_some() {
                parts.pop();
            }
            let direction = direction.unwrap_or(Direction::Asc);
            sort.extend(parts.into_iter().map(|p| SortOrder { property: p.to_string(), direction }));
        }

        Self { page, size: size.max(1), sort }
    }

    /// Returns the first sort property not in `allowed`, if any.
    pub fn unsupported_sort<'a>(&'a self, allowed: &[&str]) -> Option<&'a str> {
        self.sort.iter().map(|o| o.property.as_str()).find(|p| !allowed.contains(p))
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results, along with the total number of matching records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index.
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self { content, number: request.page, size: request.size, total_elements }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 1;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }
}

/// Build the `X-Total-Count` and `Link` headers for a page of results.
///
/// `base` is the absolute URL of the collection, without a query string.
/// `query` is the raw query string of the request: every parameter other than
/// `page`, `size` and `sort` is appended to each link as it was sent.
/// Links are emitted in the order `next`, `prev`, `last`, `first`.
pub fn pagination_headers<T>(
    base: &str,
    query: Option<&str>,
    page: &Page<T>,
    request: &PageRequest,
) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(page.total_elements));

    let extra = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(k, _)| k);
            !key.is_empty() && !PAGE_KEYS.contains(&key)
        })
        .collect::<Vec<_>>();

    let number = u64::from(page.number);
    let last = page.total_pages().saturating_sub(1);
    let to = |target: u64, rel: &'static str| link(base, target, request, &extra, rel);

    let mut links = vec![];
    if page.has_next() {
        links.push(to(number + 1, "next"));
    }
    if page.has_previous() {
        links.push(to(number - 1, "prev"));
    }
    links.push(to(last, "last"));
    links.push(to(0, "first"));

    headers.insert(header::LINK, HeaderValue::try_from(links.join(","))?);
    Ok(headers)
}

fn link(base: &str, page: u64, request: &PageRequest, extra: &[&str], rel: &str) -> String {
    let mut uri = format!("{base}?page={page}&size={}", request.size);
    for order in &request.sort {
        uri.push_str(&format!("&sort={}%2C{}", order.property, order.direction.as_str()));
    }
    for pair in extra {
        uri.push('&');
        uri.push_str(pair);
    }
    format!("<{uri}>; rel=\"{rel}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaginationConfig {
        PaginationConfig { default_size: 20, max_size: 2000 }
    }

    fn params(page: Option<&str>, size: Option<&str>, sort: &[&str]) -> PageParams {
        PageParams {
            page: page.into_iter().map(Into::into).collect(),
            size: size.into_iter().map(Into::into).collect(),
            sort: sort.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn parses_defaults() {
        let req = PageRequest::from_params(&PageParams::default(), &config());
        assert_eq!(req, PageRequest::new(0, 20));
    }

    #[test]
    fn parses_leniently() {
        let req = PageRequest::from_params(&params(Some("-1"), Some("abc"), &[]), &config());
        assert_eq!((req.page, req.size), (0, 20));

        let req = PageRequest::from_params(&params(Some("3"), Some("0"), &[]), &config());
        assert_eq!((req.page, req.size), (3, 20));

        let req = PageRequest::from_params(&params(None, Some("5000"), &[]), &config());
        assert_eq!(req.size, 2000);

        let repeated = PageParams { page: vec!["1".into(), "2".into()], size: vec!["5".into(), "x".into()], sort: vec![] };
        let req = PageRequest::from_params(&repeated, &config());
        assert_eq!((req.page, req.size), (1, 5));
    }

    #[test]
    fn parses_sort_orders() {
        let req = PageRequest::from_params(&params(None, None, &["name,DESC", "id", "name,id,asc"]), &config());
        let expected = PageRequest::new(0, 20)
            .sorted_by("name", Direction::Desc)
            .sorted_by("id", Direction::Asc)
            .sorted_by("name", Direction::Asc)
            .sorted_by("id", Direction::Asc);
        assert_eq!(req, expected);

        assert_eq!(req.unsupported_sort(&["id", "name"]), None);
        let req = PageRequest::new(0, 1).sorted_by("password", Direction::Asc);
        assert_eq!(req.unsupported_sort(&["id", "name"]), Some("password"));
    }

    #[test]
    fn counts_pages() {
        let req = PageRequest::new(0, 20);
        assert_eq!(Page::<()>::new(vec![], &req, 0).total_pages(), 0);
        assert_eq!(Page::<()>::new(vec![], &req, 20).total_pages(), 1);
        assert_eq!(Page::<()>::new(vec![], &req, 21).total_pages(), 2);
        assert_eq!(PageRequest::new(3, 20).offset(), 60);
    }

    #[test]
    fn links_middle_page() {
        let req = PageRequest::new(1, 10).sorted_by("name", Direction::Desc);
        let page = Page::new(vec![(); 10], &req, 35);
        let headers = pagination_headers("http://localhost/api/editors", None, &page, &req).unwrap();

        assert_eq!(headers[&X_TOTAL_COUNT], "35");
        assert_eq!(
            headers[header::LINK],
            "<http://localhost/api/editors?page=2&size=10&sort=name%2Cdesc>; rel=\"next\",\
             <http://localhost/api/editors?page=0&size=10&sort=name%2Cdesc>; rel=\"prev\",\
             <http://localhost/api/editors?page=3&size=10&sort=name%2Cdesc>; rel=\"last\",\
             <http://localhost/api/editors?page=0&size=10&sort=name%2Cdesc>; rel=\"first\""
        );
    }

    #[test]
    fn links_empty_result() {
        let req = PageRequest::new(0, 20);
        let page = Page::<()>::new(vec![], &req, 0);
        let headers = pagination_headers("/api/editors", Some(""), &page, &req).unwrap();

        assert_eq!(headers[&X_TOTAL_COUNT], "0");
        assert_eq!(
            headers[header::LINK],
            "</api/editors?page=0&size=20>; rel=\"last\",</api/editors?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn links_keep_other_query_params() {
        let req = PageRequest::new(0, 2);
        let page = Page::new(vec![(); 2], &req, 3);
        let query = "name=Acme%20Press&size=2&page=0&sort=id&flag";
        let headers = pagination_headers("/api/editors", Some(query), &page, &req).unwrap();

        assert_eq!(
            headers[header::LINK],
            "</api/editors?page=1&size=2&name=Acme%20Press&flag>; rel=\"next\",\
             </api/editors?page=1&size=2&name=Acme%20Press&flag>; rel=\"last\",\
             </api/editors?page=0&size=2&name=Acme%20Press&flag>; rel=\"first\""
        );
    }
}
