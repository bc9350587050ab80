//! Builds the page envelope from extracted items.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::endpoints::{EndpointDescriptor, FieldKind};
use crate::xml::{Extraction, ItemBlock};

use super::envelope::{
    Labeled, OutgoingRecord, PageEnvelope, RecordValue, RequestInfo, ResponseInfo,
};
use super::params::RequestParams;

/// Substituted for every empty or absent text field.
pub const PLACEHOLDER: &str = "정보없음";

/// Echoed for a supported filter the caller did not set.
pub const ALL_FILTER: &str = "전체";

/// Compose the success document for one upstream page.
pub fn shape_page(
    descriptor: &EndpointDescriptor,
    params: &RequestParams,
    extraction: Extraction,
    now: DateTime<Utc>,
) -> PageEnvelope {
    let records: Vec<OutgoingRecord> = extraction
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| to_record(descriptor, index + 1, item))
        .collect();

    let total_pages = total_pages(extraction.total_count, params.num_of_rows);

    let filters = (!params.filters.is_empty()).then(|| {
        Labeled(
            params
                .filters
                .iter()
                .map(|f| (f.label, f.value.clone().unwrap_or_else(|| ALL_FILTER.to_string())))
                .collect(),
        )
    });

    let summary = (!descriptor.summaries.is_empty()).then(|| summarize(descriptor, &records));
    let tips = (!descriptor.tips.is_empty()).then(|| Labeled(descriptor.tips.to_vec()));
    let message = records.is_empty().then_some(descriptor.empty_message);

    PageEnvelope {
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        request: RequestInfo {
            page_no: params.page_no,
            num_of_rows: params.num_of_rows,
            filters,
        },
        response: ResponseInfo {
            total_count: extraction.total_count,
            current_page_count: records.len(),
            total_pages,
            next_page: next_page(params.page_no, total_pages),
        },
        list_key: descriptor.list_key,
        records,
        message,
        summary,
        tips,
    }
}

/// Render one item with the descriptor's output labels.
pub fn to_record(descriptor: &EndpointDescriptor, sequence: usize, item: &ItemBlock) -> OutgoingRecord {
    let fields = descriptor
        .fields
        .iter()
        .map(|mapping| {
            let raw = item.field(mapping.tag);
            let value = match mapping.kind {
                FieldKind::Text if raw.is_empty() => RecordValue::Text(PLACEHOLDER.to_string()),
                FieldKind::Text => RecordValue::Text(raw.to_string()),
                FieldKind::Count => RecordValue::Count(parse_count(raw)),
            };
            (mapping.label, value)
        })
        .collect();

    OutgoingRecord {
        sequence,
        fields: Labeled(fields),
    }
}

/// ceil(total / rows); zero rows yields zero pages.
pub fn total_pages(total_count: u64, num_of_rows: u32) -> u64 {
    if num_of_rows == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(num_of_rows))
}

pub fn next_page(page_no: u32, total_pages: u64) -> Option<u64> {
    (u64::from(page_no) < total_pages).then(|| u64::from(page_no) + 1)
}

/// Leading integer of `text`, 0 when there is none.
///
/// Mirrors lenient integer parsing: surrounding whitespace and trailing
/// non-digits are ignored, so `"12건"` reads as 12.
pub fn parse_count(text: &str) -> i64 {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => 0,
    }
}

/// Distinct non-placeholder values per summary, first-seen order, current
/// page only.
fn summarize(descriptor: &EndpointDescriptor, records: &[OutgoingRecord]) -> Labeled<Vec<String>> {
    let lists = descriptor
        .summaries
        .iter()
        .map(|spec| {
            let mut distinct: Vec<String> = Vec::new();
            for value in records.iter().filter_map(|r| r.text(spec.source)) {
                if value != PLACEHOLDER && !distinct.iter().any(|seen| seen == value) {
                    distinct.push(value.to_string());
                }
            }
            (spec.label, distinct)
        })
        .collect();

    Labeled(lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::catalog::{PRECEDENTS, STATISTICS};
    use crate::xml::extract;
    use std::collections::HashMap;

    fn params(descriptor: &EndpointDescriptor, pairs: &[(&str, &str)]) -> RequestParams {
        let query: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RequestParams::from_query(descriptor, &query).unwrap()
    }

    fn item(fields: &[(&str, &str)]) -> String {
        let inner: String = fields
            .iter()
            .map(|(tag, value)| format!("<{tag}>{value}</{tag}>"))
            .collect();
        format!("<item>{inner}</item>")
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-15T09:30:00.123Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 100), 1);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_next_page() {
        assert_eq!(next_page(2, 3), Some(3));
        assert_eq!(next_page(3, 3), None);
        assert_eq!(next_page(1, 0), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count(" 12건 "), 12);
        assert_eq!(parse_count("-3"), -3);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("없음"), 0);
    }

    #[test]
    fn test_records_are_numbered_with_placeholders() {
        let body = format!(
            "<response><header><resultCode>00</resultCode></header><body><items>{}{}</items>\
             <totalCount>2</totalCount></body></response>",
            item(&[("accnum", "2019구단1"), ("courtname", "서울행정법원"), ("title", "")]),
            item(&[("accnum", "2019누2"), ("kinda", "기각")]),
        );
        let extraction = extract(&body, PRECEDENTS.item_tag).unwrap();
        let page = shape_page(&PRECEDENTS, &params(&PRECEDENTS, &[("serviceKey", "K")]), extraction, now());

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].sequence, 1);
        assert_eq!(page.records[1].sequence, 2);
        assert_eq!(page.records[0].text("제목"), Some(PLACEHOLDER));
        assert_eq!(page.records[1].text("법원명"), Some(PLACEHOLDER));
        assert_eq!(page.records[1].text("사건결과"), Some("기각"));
        assert_eq!(page.records[0].fields.0.len(), PRECEDENTS.fields.len());
        assert!(page.message.is_none());
        assert_eq!(page.timestamp, "2026-10-15T09:30:00.123Z");
    }

    #[test]
    fn test_summary_is_distinct_first_seen() {
        let body = [
            item(&[("courtname", "서울고등법원"), ("kinda", "기각"), ("kindb", "요양")]),
            item(&[("courtname", "대법원"), ("kinda", "기각")]),
            item(&[("courtname", "서울고등법원"), ("kinda", "인용"), ("kindb", "유족")]),
            item(&[("kindb", "요양")]),
        ]
        .concat();
        let extraction = extract(&body, "item").unwrap();
        let page = shape_page(&PRECEDENTS, &params(&PRECEDENTS, &[("serviceKey", "K")]), extraction, now());

        let summary = page.summary.unwrap();
        assert_eq!(summary.get("주요법원").unwrap(), &["서울고등법원", "대법원"]);
        assert_eq!(summary.get("사건결과분포").unwrap(), &["기각", "인용"]);
        assert_eq!(summary.get("사건유형분포").unwrap(), &["요양", "유족"]);
    }

    #[test]
    fn test_filters_echo_all_when_unset() {
        let extraction = extract("<items></items>", "item").unwrap();
        let page = shape_page(
            &PRECEDENTS,
            &params(&PRECEDENTS, &[("serviceKey", "K"), ("kindA", "기각")]),
            extraction,
            now(),
        );

        let filters = page.request.filters.unwrap();
        assert_eq!(filters.get("사건결과").map(String::as_str), Some("기각"));
        assert_eq!(filters.get("사건유형").map(String::as_str), Some(ALL_FILTER));
        assert_eq!(page.message, Some(PRECEDENTS.empty_message));
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_count_fields() {
        let body = [
            item(&[("type", "업무상질병"), ("count", "120")]),
            item(&[("type", ""), ("count", "n/a")]),
        ]
        .concat();
        let extraction = extract(&body, "item").unwrap();
        let page = shape_page(&STATISTICS, &params(&STATISTICS, &[("serviceKey", "K")]), extraction, now());

        assert_eq!(page.records[0].fields.get("건수"), Some(&RecordValue::Count(120)));
        assert_eq!(page.records[1].fields.get("건수"), Some(&RecordValue::Count(0)));
        assert_eq!(page.records[1].text("유형"), Some(PLACEHOLDER));
        assert!(page.summary.is_none());
        assert!(page.request.filters.is_none());
        assert_eq!(page.response.total_pages, 1);
    }
}
