//! Lenient streaming projection of an upstream XML response.
//!
//! The upstream schema is shallow and fixed: a header with scalar status
//! fields, a `totalCount`, and a list of repeating item elements whose direct
//! children are the record fields. Parsing keeps only that projection.
//!
//! Malformed markup never fails the whole response. An unterminated field
//! element is dropped when its item closes, while unterminated markup nested
//! inside a field (an HTML `<br>`, say) keeps its text in that field. Stray
//! end tags are ignored, and a hard parse error ends the scan while keeping
//! every item that was already complete.

use std::borrow::Cow;

use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;

/// Raw content of one field element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldValue {
    cdata: Option<String>,
    text: Option<String>,
}

/// One repeating record element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemBlock {
    /// Lowercased tag name → first CDATA and first plain value seen.
    fields: Vec<(String, FieldValue)>,
}

impl ItemBlock {
    /// Text of the named child element.
    ///
    /// CDATA content wins over a plain-text occurrence of the same tag; the
    /// lookup is case-insensitive; an absent field is the empty string.
    pub fn field(&self, tag: &str) -> &str {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .and_then(|(_, value)| value.cdata.as_deref().or(value.text.as_deref()))
            .unwrap_or("")
    }

    fn record(&mut self, element: OpenElement) {
        let OpenElement {
            name, text, cdata, ..
        } = element;
        let cdata = cdata.map(|c| c.trim().to_string());
        let text = cdata.is_none().then(|| text.trim().to_string());

        let index = match self.fields.iter().position(|(n, _)| *n == name) {
            Some(index) => index,
            None => {
                self.fields.push((name, FieldValue::default()));
                self.fields.len() - 1
            }
        };
        let slot = &mut self.fields[index].1;
        if slot.cdata.is_none() {
            slot.cdata = cdata;
        }
        if slot.text.is_none() {
            slot.text = text;
        }
    }
}

#[derive(Debug, Default)]
struct OpenElement {
    name: String,
    text: String,
    cdata: Option<String>,
    has_children: bool,
}

impl OpenElement {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn absorb(&mut self, child: OpenElement) {
        self.text.push_str(&child.text);
        if let Some(cdata) = child.cdata {
            self.cdata.get_or_insert_with(String::new).push_str(&cdata);
        }
    }
}

/// Parsed projection of a whole response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    /// Leaf elements outside item blocks, first occurrence per lowercased name.
    scalars: Vec<(String, String)>,
    items: Vec<ItemBlock>,
}

impl XmlDocument {
    /// Parse `xml`, collecting every top-level `item_tag` element.
    pub fn parse(xml: &str, item_tag: &str) -> Self {
        let item_tag = item_tag.to_ascii_lowercase();
        let mut reader = Reader::from_str(xml);
        {
            let config = reader.config_mut();
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
        }

        let mut document = XmlDocument::default();
        let mut open: Vec<OpenElement> = Vec::new();
        // Stack index of the item element currently being read.
        let mut item_at: Option<usize> = None;
        let mut current = ItemBlock::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = lower_name(e.local_name().as_ref());
                    if item_at.is_none() && name == item_tag {
                        item_at = Some(open.len());
                        current = ItemBlock::default();
                    }
                    if let Some(parent) = open.last_mut() {
                        parent.has_children = true;
                    }
                    open.push(OpenElement::new(name));
                }
                Ok(Event::Empty(e)) => {
                    let name = lower_name(e.local_name().as_ref());
                    if let Some(parent) = open.last_mut() {
                        parent.has_children = true;
                    }
                    if item_at.is_none() && name == item_tag {
                        document.items.push(ItemBlock::default());
                        continue;
                    }
                    open.push(OpenElement::new(name));
                    document.close_top(&mut open, &mut item_at, &mut current);
                }
                Ok(Event::Text(t)) => {
                    if let Some(top) = open.last_mut() {
                        top.text.push_str(&unescape_lenient(&t));
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(top) = open.last_mut() {
                        top.cdata
                            .get_or_insert_with(String::new)
                            .push_str(&String::from_utf8_lossy(&c));
                    }
                }
                Ok(Event::End(e)) => {
                    let name = lower_name(e.local_name().as_ref());
                    let Some(index) = open.iter().rposition(|o| o.name == name) else {
                        continue;
                    };
                    // Anything opened after the matching element was never
                    // terminated. Inside a field its text folds into the
                    // field; at item level or above it is dropped.
                    let inside_field = item_at.is_some_and(|at| index > at);
                    while open.len() > index + 1 {
                        let Some(unclosed) = open.pop() else {
                            break;
                        };
                        if inside_field {
                            if let Some(parent) = open.last_mut() {
                                parent.absorb(unclosed);
                            }
                        }
                    }
                    if item_at.is_some_and(|at| at > index) {
                        item_at = None;
                    }
                    document.close_top(&mut open, &mut item_at, &mut current);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        position = reader.error_position(),
                        items = document.items.len(),
                        "Stopping XML scan at malformed markup"
                    );
                    break;
                }
            }
        }

        document
    }

    /// Pop the innermost open element and file its content.
    fn close_top(
        &mut self,
        open: &mut Vec<OpenElement>,
        item_at: &mut Option<usize>,
        current: &mut ItemBlock,
    ) {
        let Some(element) = open.pop() else {
            return;
        };
        let depth = open.len();

        match *item_at {
            Some(at) if depth == at => {
                self.items.push(std::mem::take(current));
                *item_at = None;
            }
            Some(at) if depth == at + 1 => current.record(element),
            Some(_) => {
                if let Some(parent) = open.last_mut() {
                    parent.absorb(element);
                }
            }
            None => {
                if !element.has_children && self.scalar(&element.name).is_none() {
                    let value = match element.cdata {
                        Some(cdata) => cdata.trim().to_string(),
                        None => element.text.trim().to_string(),
                    };
                    self.scalars.push((element.name, value));
                }
            }
        }
    }

    /// Trimmed text of a document-level leaf element, if present.
    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.scalars
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn items(&self) -> &[ItemBlock] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ItemBlock> {
        self.items
    }
}

fn lower_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// Unescape entity references, keeping the raw text when an entity is unknown.
fn unescape_lenient<'a>(text: &'a BytesText<'a>) -> Cow<'a, str> {
    match text.unescape() {
        Ok(value) => value,
        Err(_) => String::from_utf8_lossy(text),
    }
}
