//! OPF 2.0 package document.

use crate::config::BookMetadata;
use crate::dom::escape_attr as escape_xml;

use super::ChapterRecord;

/// File name of the package document inside the content directory.
pub const OPF_FILENAME: &str = "content.opf";

const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Render `content.opf` for the given chapters.
///
/// The cover page, cover image and NCX come first in the manifest, then one
/// item per chapter. The spine lists the cover as non-linear followed by the
/// chapters in record order.
pub fn render_opf(records: &[ChapterRecord], metadata: &BookMetadata) -> String {
    let assets = &metadata.assets;
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0"?>
<package version="2.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">

  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape_xml(&metadata.title)
    ));
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape_xml(&metadata.language)
    ));
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\" opf:scheme=\"UUID\">{}</dc:identifier>\n",
        escape_xml(&metadata.identifier)
    ));
    let author = escape_xml(&metadata.author);
    opf.push_str(&format!(
        "    <dc:creator opf:file-as=\"{author}\" opf:role=\"aut\">{author}</dc:creator>\n"
    ));
    opf.push_str(&format!(
        "    <dc:publisher>{}</dc:publisher>\n",
        escape_xml(&metadata.publisher)
    ));
    opf.push_str(&format!(
        "    <dc:description>{}</dc:description>\n",
        escape_xml(&metadata.description)
    ));
    opf.push_str("    <meta name=\"cover\" content=\"cover-image\"/>\n");
    opf.push_str("  </metadata>\n\n");

    opf.push_str("  <manifest>\n");
    push_item(&mut opf, "ncx", &assets.ncx, NCX_MEDIA_TYPE);
    push_item(&mut opf, "cover", &assets.cover_xhtml, XHTML_MEDIA_TYPE);
    push_item(
        &mut opf,
        "cover-image",
        &assets.cover_image,
        &assets.cover_media_type,
    );
    for record in records {
        push_item(&mut opf, &record.id, &record.href, XHTML_MEDIA_TYPE);
    }
    opf.push_str("  </manifest>\n\n");

    opf.push_str("  <spine toc=\"ncx\">\n");
    opf.push_str("    <itemref idref=\"cover\" linear=\"no\"/>\n");
    for record in records {
        opf.push_str(&format!(
            "    <itemref idref=\"{}\"/>\n",
            escape_xml(&record.id)
        ));
    }
    opf.push_str("  </spine>\n\n");

    opf.push_str("  <guide>\n");
    opf.push_str(&format!(
        "    <reference type=\"cover\" title=\"Cover\" href=\"{}\"/>\n",
        escape_xml(&assets.cover_xhtml)
    ));
    opf.push_str("  </guide>\n");
    opf.push_str("</package>\n");
    opf
}

fn push_item(opf: &mut String, id: &str, href: &str, media_type: &str) {
    opf.push_str(&format!(
        "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
        escape_xml(id),
        escape_xml(href),
        escape_xml(media_type)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize, title: &str) -> ChapterRecord {
        ChapterRecord {
            id: format!("{n:03}.xhtml"),
            title: title.to_string(),
            href: format!("chapters/{n:03}.xhtml"),
        }
    }

    fn metadata() -> BookMetadata {
        BookMetadata::new(
            "A Practical Guide to Evil",
            "ErraticErrata",
            "urn:uuid:af4f5de9-3468-4eb3-b847-055283ed17da",
        )
        .with_publisher("stormbeta")
        .with_description("The Empire stands triumphant.")
    }

    #[test]
    fn test_metadata_block() {
        let opf = render_opf(&[], &metadata());
        assert!(opf.starts_with("<?xml version=\"1.0\"?>\n<package version=\"2.0\""));
        assert!(opf.contains("<dc:title>A Practical Guide to Evil</dc:title>"));
        assert!(opf.contains("<dc:language>en</dc:language>"));
        assert!(opf.contains(
            r#"<dc:identifier id="BookId" opf:scheme="UUID">urn:uuid:af4f5de9-3468-4eb3-b847-055283ed17da</dc:identifier>"#
        ));
        assert!(opf.contains(
            r#"<dc:creator opf:file-as="ErraticErrata" opf:role="aut">ErraticErrata</dc:creator>"#
        ));
        assert!(opf.contains("<dc:publisher>stormbeta</dc:publisher>"));
        assert!(opf.contains(r#"<meta name="cover" content="cover-image"/>"#));
        assert!(opf.contains(r#"<reference type="cover" title="Cover" href="cover.xhtml"/>"#));
    }

    #[test]
    fn test_manifest_and_spine_order() {
        let records = [record(1, "One"), record(2, "Two")];
        let opf = render_opf(&records, &metadata());

        let manifest = "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n    \
<item id=\"cover\" href=\"cover.xhtml\" media-type=\"application/xhtml+xml\"/>\n    \
<item id=\"cover-image\" href=\"cover.png\" media-type=\"image/png\"/>\n    \
<item id=\"001.xhtml\" href=\"chapters/001.xhtml\" media-type=\"application/xhtml+xml\"/>\n    \
<item id=\"002.xhtml\" href=\"chapters/002.xhtml\" media-type=\"application/xhtml+xml\"/>\n";
        assert!(opf.contains(manifest), "{opf}");

        let spine = "  <spine toc=\"ncx\">\n    <itemref idref=\"cover\" linear=\"no\"/>\n    \
<itemref idref=\"001.xhtml\"/>\n    <itemref idref=\"002.xhtml\"/>\n  </spine>";
        assert!(opf.contains(spine), "{opf}");
    }

    #[test]
    fn test_values_escaped() {
        let meta = BookMetadata::new("Fish & Chips <2>", "O\"Brien", "urn:uuid:x");
        let opf = render_opf(&[], &meta);
        assert!(opf.contains("<dc:title>Fish &amp; Chips &lt;2&gt;</dc:title>"));
        assert!(opf.contains(r#"opf:file-as="O&quot;Brien""#));
        assert_eq!(crate::xml::check_well_formed(&opf), Ok(()));
    }

    #[test]
    fn test_custom_assets() {
        let mut meta = metadata();
        meta.assets.cover_image = "cover.jpg".to_string();
        meta.assets.cover_media_type = "image/jpeg".to_string();
        let opf = render_opf(&[], &meta);
        assert!(opf.contains(
            r#"<item id="cover-image" href="cover.jpg" media-type="image/jpeg"/>"#
        ));
    }

    #[test]
    fn test_deterministic() {
        let records = [record(1, "One"), record(2, "Two"), record(3, "Three")];
        assert_eq!(
            render_opf(&records, &metadata()),
            render_opf(&records, &metadata())
        );
    }
}
