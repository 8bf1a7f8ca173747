use quick_xml::Reader;
use quick_xml::events::Event;

use crate::foundation::error::{ZonecastError, ZonecastResult};

/// Number of `<item>` elements retained from a feed.
pub const MAX_FEED_ENTRIES: usize = 5;

/// One RSS item.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FeedEntry {
    /// `<title>`
    pub title: String,
    /// `<link>`
    pub link: String,
    /// `<description>`
    pub description: String,
    /// `<pubDate>`
    pub pub_date: String,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            b"pubDate" => Some(Self::PubDate),
            _ => None,
        }
    }

    fn slot(self, entry: &mut FeedEntry) -> &mut String {
        match self {
            Self::Title => &mut entry.title,
            Self::Link => &mut entry.link,
            Self::Description => &mut entry.description,
            Self::PubDate => &mut entry.pub_date,
        }
    }
}

/// Extract the first [`MAX_FEED_ENTRIES`] `<item>`s of an RSS document.
///
/// Channel-level `<title>`/`<link>` outside items are ignored. Missing fields are empty strings.
pub fn parse_feed(xml: &str) -> ZonecastResult<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"item" => current = Some(FeedEntry::default()),
                tag if current.is_some() => field = Field::from_tag(tag),
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    if entries.len() == MAX_FEED_ENTRIES {
                        break;
                    }
                }
                field = None;
            }
            Ok(Event::Text(ref t)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(t).into_owned());
                    f.slot(entry).push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    f.slot(entry)
                        .push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ZonecastError::parse(format!(
                    "feed at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

#[cfg(test)]
#[path = "../../tests/unit/content/feed.rs"]
mod tests;
