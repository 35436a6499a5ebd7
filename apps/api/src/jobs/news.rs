//! Market headlines from an RSS 2.0 feed.

use reqwest::Client;
use serde::Serialize;

use crate::jobs::card::decode_entities;
use crate::jobs::source::FeedError;

const NEWS_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub link: Option<String>,
    pub published: Option<String>,
}

#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    url: String,
}

impl NewsClient {
    pub fn new(url: String) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(NEWS_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, url })
    }

    pub async fn fetch_headlines(&self) -> Result<Vec<NewsItem>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if !body.contains("<rss") && !body.contains("<channel") {
            return Err(FeedError::Malformed("response is not an RSS document".to_string()));
        }
        Ok(parse_rss(&body))
    }
}

/// Extracts `<item>` entries. Items without a title are dropped.
pub fn parse_rss(xml: &str) -> Vec<NewsItem> {
    let mut items = Vec::new();
    let mut rest = xml;

    while let Some((body, after)) = next_element(rest, "item") {
        if let Some(title) = element_text(body, "title") {
            items.push(NewsItem {
                title,
                link: element_text(body, "link"),
                published: element_text(body, "pubDate"),
            });
        }
        rest = after;
    }
    items
}

/// Finds the next `<tag ...>...</tag>` and returns its inner content plus the remaining input.
fn next_element<'a>(xml: &'a str, tag: &str) -> Option<(&'a str, &'a str)> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search_from = 0;

    loop {
        let start = search_from + xml[search_from..].find(&open)?;
        let after_name = &xml[start + open.len()..];
        // `<item>` or `<item attr=...>`, but not `<itemCount>`
        if after_name.starts_with('>') || after_name.starts_with(char::is_whitespace) {
            let content_start = start + open.len() + after_name.find('>')? + 1;
            let content_len = xml[content_start..].find(&close)?;
            let content_end = content_start + content_len;
            return Some((
                &xml[content_start..content_end],
                &xml[content_end + close.len()..],
            ));
        }
        search_from = start + open.len();
    }
}

fn element_text(xml: &str, tag: &str) -> Option<String> {
    let (raw, _) = next_element(xml, tag)?;
    let raw = raw.trim();
    let text = match raw
        .strip_prefix("<![CDATA[")
        .and_then(|r| r.strip_suffix("]]>"))
    {
        Some(cdata) => cdata.trim().to_string(),
        None => decode_entities(raw),
    };
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Yahoo Finance</title>
    <item>
      <title><![CDATA[Stocks rally as <jobs> report beats]]></title>
      <link>https://finance.yahoo.com/news/a.html</link>
      <pubDate>Tue, 07 May 2024 12:00:00 +0000</pubDate>
    </item>
    <item id="2">
      <title>Fed holds rates &amp; signals patience</title>
      <link>https://finance.yahoo.com/news/b.html?x=1&amp;y=2</link>
    </item>
    <item>
      <link>https://finance.yahoo.com/news/untitled.html</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_items() {
        let items = parse_rss(FEED);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Stocks rally as <jobs> report beats");
        assert_eq!(
            items[0].published.as_deref(),
            Some("Tue, 07 May 2024 12:00:00 +0000")
        );
        assert_eq!(items[1].title, "Fed holds rates & signals patience");
        assert_eq!(
            items[1].link.as_deref(),
            Some("https://finance.yahoo.com/news/b.html?x=1&y=2")
        );
        assert!(items[1].published.is_none());
    }

    #[test]
    fn test_channel_title_is_not_an_item() {
        let items = parse_rss(FEED);
        assert!(items.iter().all(|i| i.title != "Yahoo Finance"));
    }

    #[test]
    fn test_similar_tag_names_are_skipped() {
        let xml = "<itemCount>3</itemCount><item><title>Real</title></item>";
        let items = parse_rss(xml);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Real");
    }

    #[test]
    fn test_unterminated_item_ignored() {
        assert!(parse_rss("<rss><item><title>Half").is_empty());
    }
}
