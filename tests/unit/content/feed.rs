use super::*;

fn rss(items: usize) -> String {
    let mut s = String::from(
        "<?xml version=\"1.0\"?><rss><channel><title>Channel</title><link>https://c</link>",
    );
    for i in 0..items {
        s.push_str(&format!(
            "<item><title>T{i}</title><link>https://e/{i}</link>\
             <description>D{i}</description><pubDate>Mon, 0{i} Jan 2024</pubDate></item>"
        ));
    }
    s.push_str("</channel></rss>");
    s
}

#[test]
fn extracts_item_fields_and_skips_channel() {
    let entries = parse_feed(&rss(2)).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[1],
        FeedEntry {
            title: "T1".into(),
            link: "https://e/1".into(),
            description: "D1".into(),
            pub_date: "Mon, 01 Jan 2024".into(),
        }
    );
}

#[test]
fn keeps_at_most_five_items() {
    let entries = parse_feed(&rss(9)).unwrap();
    assert_eq!(entries.len(), MAX_FEED_ENTRIES);
    assert_eq!(entries[4].title, "T4");
}

#[test]
fn cdata_and_entities_are_decoded() {
    let xml = "<rss><channel><item><title>A &amp; B</title>\
               <description><![CDATA[<p>hi</p>]]></description></item></channel></rss>";
    let entries = parse_feed(xml).unwrap();
    assert_eq!(entries[0].title, "A & B");
    assert_eq!(entries[0].description, "<p>hi</p>");
    assert_eq!(entries[0].link, "");
}

#[test]
fn empty_feed_yields_no_entries() {
    assert!(parse_feed("<rss><channel></channel></rss>").unwrap().is_empty());
}

#[test]
fn malformed_xml_is_a_parse_error() {
    let err = parse_feed("<rss><item><title>x</item></rss>").unwrap_err();
    assert!(matches!(err, ZonecastError::Parse(_)));
}
