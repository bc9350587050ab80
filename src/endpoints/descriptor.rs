//! Declarative description of one upstream operation.

/// How a projected field is rendered in the outgoing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed text; empty values become the placeholder.
    Text,
    /// Leading integer of the text; unparseable values become 0.
    Count,
}

/// Maps one upstream child tag to one output key.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub tag: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldMapping {
    pub const fn text(tag: &'static str, label: &'static str) -> Self {
        Self {
            tag,
            label,
            kind: FieldKind::Text,
        }
    }

    pub const fn count(tag: &'static str, label: &'static str) -> Self {
        Self {
            tag,
            label,
            kind: FieldKind::Count,
        }
    }
}

/// An optional filter forwarded upstream when the caller supplies it.
#[derive(Debug, Clone, Copy)]
pub struct FilterParam {
    /// Query parameter name, identical inbound and upstream.
    pub param: &'static str,
    /// Key used when echoing the applied filter.
    pub label: &'static str,
}

/// A distinct-value list computed over the current page.
#[derive(Debug, Clone, Copy)]
pub struct SummarySpec {
    /// Output key of the summary list.
    pub label: &'static str,
    /// Output label of the record field the values are taken from.
    pub source: &'static str,
}

/// Everything the shared handler needs to serve one upstream operation.
#[derive(Debug)]
pub struct EndpointDescriptor {
    /// Short name used in logs, metrics and the status page.
    pub name: &'static str,
    /// Inbound route path.
    pub route: &'static str,
    /// Upstream operation, appended to the configured base URL.
    pub operation: &'static str,
    /// Repeating element that holds one record.
    pub item_tag: &'static str,
    /// `numOfRows` used when the caller gives none.
    pub default_rows: u32,
    /// Key of the record list in the page envelope.
    pub list_key: &'static str,
    pub fields: &'static [FieldMapping],
    pub filters: &'static [FilterParam],
    pub summaries: &'static [SummarySpec],
    /// Static hints attached to successful responses.
    pub tips: &'static [(&'static str, &'static str)],
    /// Example queries returned with a missing-key error.
    pub usage: &'static [(&'static str, &'static str)],
    /// Message attached when the page holds no records.
    pub empty_message: &'static str,
}
