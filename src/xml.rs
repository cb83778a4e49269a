//! XML well-formedness check for generated documents.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::dom::is_xml_char;

/// Entity references every XML parser knows without a DTD.
const PREDEFINED_ENTITIES: &[&[u8]] = &[b"amp", b"lt", b"gt", b"quot", b"apos"];

/// Check that `doc` is a well-formed, namespace-correct XML document with a
/// single root element.
///
/// Beyond tag balance this rejects characters outside the XML 1.0 `Char`
/// production (literal or referenced), `--` inside comments, duplicate or
/// malformed attributes, undeclared entities and unbound prefixes. Returns
/// a description of the first problem found.
pub fn check_well_formed(doc: &str) -> Result<(), String> {
    if let Some((at, c)) = doc.char_indices().find(|&(_, c)| !is_xml_char(c)) {
        return Err(format!("at byte {at}: character U+{:04X} is not allowed in XML", c as u32));
    }

    let mut reader = NsReader::from_str(doc);
    let config = reader.config_mut();
    config.check_end_names = true;
    config.check_comments = true;

    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut roots = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {e}", reader.error_position()))?;

        match event {
            Event::Start(e) => {
                if open.is_empty() {
                    roots += 1;
                }
                check_element(&reader, &e)?;
                open.push(e.name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                if open.is_empty() {
                    roots += 1;
                }
                check_element(&reader, &e)?;
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Text(e) if open.is_empty() => {
                let bytes: &[u8] = &e;
                if !bytes.iter().all(u8::is_ascii_whitespace) {
                    return Err("text outside the root element".to_string());
                }
            }
            Event::GeneralRef(e) => {
                if e.is_char_ref() {
                    let c = e.resolve_char_ref().map_err(|err| err.to_string())?;
                    if let Some(c) = c.filter(|&c| !is_xml_char(c)) {
                        return Err(format!("character reference to U+{:04X}", c as u32));
                    }
                } else {
                    let name: &[u8] = &e;
                    if !PREDEFINED_ENTITIES.contains(&name) {
                        return Err(format!(
                            "undeclared entity &{};",
                            String::from_utf8_lossy(name)
                        ));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.last() {
        return Err(format!(
            "element <{}> is never closed",
            String::from_utf8_lossy(name)
        ));
    }
    match roots {
        1 => Ok(()),
        0 => Err("no root element".to_string()),
        n => Err(format!("{n} root elements")),
    }
}

/// Namespace binding and attribute checks for one start tag.
fn check_element(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<(), String> {
    let element = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    if let (ResolveResult::Unknown(prefix), _) = reader.resolve_element(e.name()) {
        return Err(format!(
            "<{element}> uses unbound prefix `{}`",
            String::from_utf8_lossy(&prefix)
        ));
    }

    for attr in e.attributes().with_checks(true) {
        let attr = attr.map_err(|err| format!("<{element}>: {err}"))?;
        if let (ResolveResult::Unknown(prefix), _) = reader.resolve_attribute(attr.key) {
            return Err(format!(
                "<{element}> attribute uses unbound prefix `{}`",
                String::from_utf8_lossy(&prefix)
            ));
        }
        let value = attr
            .unescape_value()
            .map_err(|err| format!("<{element}>: {err}"))?;
        if let Some(c) = value.chars().find(|&c| !is_xml_char(c)) {
            return Err(format!(
                "<{element}> attribute value holds U+{:04X}",
                c as u32
            ));
        }
    }
    Ok(())
}
