use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// An `<a>` element: its visible text and where it points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub text: String,
    pub href: String,
}

/// A single organic result on a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

pub fn title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").unwrap();
    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Every anchor with an `href`. Relative targets are resolved against `base`
/// when one is given.
pub fn anchors(html: &str, base: Option<&Url>) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let a_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&a_selector)
        .filter_map(|element| {
            let raw = element.value().attr("href")?.trim();
            if raw.is_empty() {
                return None;
            }
            let href = match base {
                Some(base) => base
                    .join(raw)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| raw.to_string()),
                None => raw.to_string(),
            };
            Some(Anchor {
                text: element.text().collect::<String>().trim().to_string(),
                href,
            })
        })
        .collect()
}

/// Absolute links to `/article/` pages, first occurrence order, without the
/// listing page itself.
pub fn article_links(anchors: &[Anchor], base_url: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for anchor in anchors {
        let href = anchor.href.as_str();
        if href.starts_with("http")
            && href.contains("/article/")
            && href != base_url
            && !links.iter().any(|seen| seen == href)
        {
            links.push(href.to_string());
        }
    }
    links
}

/// Organic results from a search results page.
///
/// Result markup changes often, so a few layouts are tried in turn and the
/// first one that finds anything is used.
pub fn search_results(html: &str) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let h3_selector = Selector::parse("h3").unwrap();

    let mut result_links: Vec<ElementRef> = Vec::new();
    for pattern in ["div.yuRUbf > a", "div.g div.tF2Cxc > div.yuRUbf > a"] {
        let selector = Selector::parse(pattern).unwrap();
        result_links = document.select(&selector).collect();
        if !result_links.is_empty() {
            break;
        }
    }
    if result_links.is_empty() {
        let heading_selector = Selector::parse("h3.LC20lb").unwrap();
        result_links = document
            .select(&heading_selector)
            .filter_map(enclosing_anchor)
            .collect();
    }

    result_links
        .into_iter()
        .filter_map(|a| {
            let link = a.value().attr("href")?;
            if link.is_empty() {
                return None;
            }
            let title = a
                .select(&h3_selector)
                .next()
                .map(|h3| h3.text().collect::<String>())
                .unwrap_or_else(|| "No title".to_string());
            Some(SearchHit {
                title,
                link: link.to_string(),
            })
        })
        .collect()
}

fn enclosing_anchor(element: ElementRef) -> Option<ElementRef> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a")
}

/// Text of the elements article templates usually put publication dates in.
pub fn date_element_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let date_selector =
        Selector::parse(".date, .post-date, .article-date, .meta-date, time").unwrap();
    document
        .select(&date_selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
