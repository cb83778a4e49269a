//! NCX 2005-1 navigation document.

use crate::config::BookMetadata;
use crate::dom::escape_attr as escape_xml;

use super::ChapterRecord;

/// Render the NCX with one flat navPoint per chapter.
///
/// `playOrder` starts at 1 and follows record order.
pub fn render_ncx(records: &[ChapterRecord], metadata: &BookMetadata) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
"#,
    );
    ncx.push_str(&format!(
        " <ncx version=\"2005-1\" xml:lang=\"{}\" xmlns=\"http://www.daisy.org/z3986/2005/ncx/\">\n",
        escape_xml(&metadata.language)
    ));
    ncx.push_str("  <head>\n");
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{}\"/>\n",
        escape_xml(&metadata.identifier)
    ));
    ncx.push_str(
        r#"    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>

"#,
    );
    ncx.push_str(&format!(
        "  <docTitle>\n    <text>{}</text>\n  </docTitle>\n\n",
        escape_xml(&metadata.title)
    ));
    ncx.push_str(&format!(
        "  <docAuthor>\n    <text>{}</text>\n  </docAuthor>\n\n",
        escape_xml(&metadata.author)
    ));

    ncx.push_str("  <navMap>\n");
    for (index, record) in records.iter().enumerate() {
        ncx.push_str(&format!(
            "<navPoint class=\"chapter\" id=\"{}\" playOrder=\"{}\">\n",
            escape_xml(&record.id),
            index + 1
        ));
        ncx.push_str(&format!(
            "  <navLabel><text>{}</text></navLabel>\n",
            escape_xml(&record.title)
        ));
        ncx.push_str(&format!(
            "  <content src=\"{}\"/>\n",
            escape_xml(&record.href)
        ));
        ncx.push_str("</navPoint>\n");
    }
    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<ChapterRecord> {
        ["One", "Two", "Three"]
            .iter()
            .enumerate()
            .map(|(i, title)| ChapterRecord {
                id: format!("{:03}.xhtml", i + 1),
                title: title.to_string(),
                href: format!("chapters/{:03}.xhtml", i + 1),
            })
            .collect()
    }

    #[test]
    fn test_head_and_titles() {
        let meta = BookMetadata::new("Worm", "Wildbow", "urn:uuid:1");
        let ncx = render_ncx(&records(), &meta);

        assert!(ncx.contains(r#"<ncx version="2005-1" xml:lang="en" xmlns="http://www.daisy.org/z3986/2005/ncx/">"#));
        assert!(ncx.contains(r#"<meta name="dtb:uid" content="urn:uuid:1"/>"#));
        assert!(ncx.contains(r#"<meta name="dtb:depth" content="1"/>"#));
        assert!(ncx.contains("<docTitle>\n    <text>Worm</text>\n  </docTitle>"));
        assert!(ncx.contains("<docAuthor>\n    <text>Wildbow</text>\n  </docAuthor>"));
        assert_eq!(crate::xml::check_well_formed(&ncx), Ok(()));
    }

    #[test]
    fn test_nav_points() {
        let meta = BookMetadata::new("Worm", "Wildbow", "urn:uuid:1");
        let ncx = render_ncx(&records(), &meta);

        let second = "<navPoint class=\"chapter\" id=\"002.xhtml\" playOrder=\"2\">\n  \
<navLabel><text>Two</text></navLabel>\n  <content src=\"chapters/002.xhtml\"/>\n</navPoint>\n";
        assert!(ncx.contains(second), "{ncx}");
        assert_eq!(ncx.matches("<navPoint ").count(), 3);
        assert!(!ncx.contains("playOrder=\"0\""));
    }

    #[test]
    fn test_empty_nav_map() {
        let meta = BookMetadata::new("Empty", "Nobody", "urn:uuid:2");
        let ncx = render_ncx(&[], &meta);
        assert!(ncx.contains("  <navMap>\n  </navMap>\n"));
        assert_eq!(crate::xml::check_well_formed(&ncx), Ok(()));
    }

    #[test]
    fn test_label_escaped() {
        let meta = BookMetadata::new("Book", "Author", "urn:uuid:3");
        let records = vec![ChapterRecord {
            id: "001.xhtml".to_string(),
            title: "Interlude: Fish & <Chips>".to_string(),
            href: "001.xhtml".to_string(),
        }];
        let ncx = render_ncx(&records, &meta);
        assert!(ncx.contains("<text>Interlude: Fish &amp; &lt;Chips&gt;</text>"));
    }

    #[test]
    fn test_control_characters_dropped() {
        let meta = BookMetadata::new("Book\u{0008}", "Author", "urn:uuid:4");
        let records = vec![ChapterRecord {
            id: "001.xhtml".to_string(),
            title: "Pasted\u{000B}Title".to_string(),
            href: "001.xhtml".to_string(),
        }];
        let ncx = render_ncx(&records, &meta);
        assert!(ncx.contains("<text>PastedTitle</text>"));
        assert!(ncx.contains("<text>Book</text>"));
        assert_eq!(crate::xml::check_well_formed(&ncx), Ok(()));
    }
}
