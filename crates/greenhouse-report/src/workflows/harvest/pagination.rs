use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Failure to retrieve or decode a page. Every variant aborts the extraction.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },
    #[error("{url} returned a body that is not a JSON array: {detail}")]
    InvalidBody { url: String, detail: String },
    #[error("{url} returned a record with an unexpected shape: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid endpoint url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Relations advertised by the `Link` response header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub next: Option<String>,
    pub prev: Option<String>,
    pub last: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<Value>,
    pub links: PageLinks,
}

/// Anything able to return a page for an absolute URL. Calls block until the page arrives.
pub trait PageSource {
    fn get_page(&self, url: &str) -> Result<Page, FetchError>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn get_page(&self, url: &str) -> Result<Page, FetchError> {
        (**self).get_page(url)
    }
}

/// Parses an RFC 8288 `Link` header such as `<https://..?page=2>; rel="next", <..>; rel="last"`.
pub fn parse_link_header(value: &str) -> PageLinks {
    let mut links = PageLinks::default();
    let mut rest = value;

    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('>') else {
            break;
        };
        let target = &after_open[..close];
        let tail = &after_open[close + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());

        for param in tail[..params_end].split(';') {
            let Some(rel) = param.trim().strip_prefix("rel=") else {
                continue;
            };
            let rel = rel.trim().trim_end_matches(',').trim().trim_matches('"');
            for relation in rel.split_whitespace() {
                let slot = match relation.to_ascii_lowercase().as_str() {
                    "next" => &mut links.next,
                    "prev" => &mut links.prev,
                    "last" => &mut links.last,
                    _ => continue,
                };
                *slot = Some(target.to_string());
            }
        }

        rest = &tail[params_end..];
    }

    links
}

/// Page number carried by a `last` link, if it has a numeric `page` parameter.
pub fn page_number(link: &str) -> Option<u32> {
    let url = Url::parse(link).ok()?;
    let page = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())?;
    page.parse().ok()
}

/// Rewrites `endpoint` so it requests `page`, keeping every other query parameter.
pub fn with_page(endpoint: &str, page: u32) -> Result<String, FetchError> {
    let mut url = Url::parse(endpoint).map_err(|source| FetchError::InvalidUrl {
        url: endpoint.to_string(),
        source,
    })?;
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &retained {
            query.append_pair(key, value);
        }
        query.append_pair("page", &page.to_string());
    }

    Ok(url.into())
}

/// Probes the endpoint's page count and returns the URL to start a walk bounded to the
/// trailing `history` pages. Lists shorter than `history` and a missing or non-numeric
/// `last` link fall back to the endpoint itself.
pub fn starting_point<S: PageSource>(
    source: &S,
    endpoint: &str,
    history: u32,
) -> Result<String, FetchError> {
    let probe = source.get_page(endpoint)?;
    let Some(total_pages) = probe.links.last.as_deref().and_then(page_number) else {
        debug!(endpoint, "no numeric last page advertised; walking from the start");
        return Ok(endpoint.to_string());
    };

    if total_pages < history {
        return Ok(endpoint.to_string());
    }

    let start = total_pages - history;
    debug!(endpoint, total_pages, start, "bounding walk to trailing pages");
    with_page(endpoint, start)
}

/// Walks a list endpoint page by page, following `next` links until none is advertised.
/// A history bound of zero means no bound.
pub fn fetch_all<S: PageSource>(
    source: &S,
    endpoint: &str,
    history: Option<u32>,
) -> Result<Vec<Value>, FetchError> {
    let mut next = match history.filter(|pages| *pages > 0) {
        Some(pages) => Some(starting_point(source, endpoint, pages)?),
        None => Some(endpoint.to_string()),
    };
    let mut records = Vec::new();
    let mut pages = 0usize;

    while let Some(url) = next.take() {
        let page = source.get_page(&url)?;
        pages += 1;
        debug!(url = %url, count = page.records.len(), "fetched page");
        records.extend(page.records);
        next = page.links.next;
    }

    info!(endpoint, pages, records = records.len(), "collected records");
    Ok(records)
}

/// [`fetch_all`] followed by decoding every record into `T`.
pub fn fetch_records<T, S>(
    source: &S,
    endpoint: &str,
    history: Option<u32>,
) -> Result<Vec<T>, FetchError>
where
    T: DeserializeOwned,
    S: PageSource,
{
    fetch_all(source, endpoint, history)?
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|source| FetchError::Decode {
                url: endpoint.to_string(),
                source,
            })
        })
        .collect()
}
