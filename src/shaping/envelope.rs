//! Outward JSON documents.
//!
//! Keys are Korean and form the public wire contract:
//!
//! | wire key | meaning |
//! |---|---|
//! | `성공` | success |
//! | `타임스탬프` | timestamp |
//! | `요청정보` / `페이지번호` / `페이지당건수` / `적용된필터` | requestInfo / pageNo / numOfRows / filters |
//! | `응답정보` / `총건수` / `현재페이지건수` / `전체페이지수` / `다음페이지` | responseInfo / totalCount / currentPageCount / totalPages / nextPage |
//! | `메시지` | message |
//! | `분석정보` | summary |
//! | `사용팁` | tips |
//! | `오류` / `오류유형` / `에러코드` / `에러메시지` | error / errorKind / errorCode / errorMessage |
//! | `사용법` / `디버그정보` | usage / debug |

use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::ProxyError;

use super::params::SERVICE_KEY_PARAMS;

/// Key of the 1-based position inside an outgoing record.
pub const SEQUENCE_KEY: &str = "순번";

/// A JSON object whose keys keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeled<V>(pub Vec<(&'static str, V)>);

impl<V> Labeled<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl<V: Serialize> Serialize for Labeled<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Value of one outgoing record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
    Text(String),
    Count(i64),
}

/// One upstream item rendered with output labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRecord {
    pub sequence: usize,
    pub fields: Labeled<RecordValue>,
}

impl OutgoingRecord {
    pub fn text(&self, label: &str) -> Option<&str> {
        match self.fields.get(label) {
            Some(RecordValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

impl Serialize for OutgoingRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.0.len() + 1))?;
        map.serialize_entry(SEQUENCE_KEY, &self.sequence)?;
        for (key, value) in &self.fields.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    #[serde(rename = "페이지번호")]
    pub page_no: u32,
    #[serde(rename = "페이지당건수")]
    pub num_of_rows: u32,
    #[serde(rename = "적용된필터", skip_serializing_if = "Option::is_none")]
    pub filters: Option<Labeled<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseInfo {
    #[serde(rename = "총건수")]
    pub total_count: u64,
    #[serde(rename = "현재페이지건수")]
    pub current_page_count: usize,
    #[serde(rename = "전체페이지수")]
    pub total_pages: u64,
    #[serde(rename = "다음페이지")]
    pub next_page: Option<u64>,
}

/// Successful response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEnvelope {
    /// RFC 3339, millisecond precision, UTC.
    pub timestamp: String,
    pub request: RequestInfo,
    pub response: ResponseInfo,
    /// Key under which `records` is emitted; differs per endpoint.
    pub list_key: &'static str,
    pub records: Vec<OutgoingRecord>,
    pub message: Option<&'static str>,
    pub summary: Option<Labeled<Vec<String>>>,
    pub tips: Option<Labeled<&'static str>>,
}

impl Serialize for PageEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("성공", &true)?;
        map.serialize_entry("타임스탬프", &self.timestamp)?;
        map.serialize_entry("요청정보", &self.request)?;
        map.serialize_entry("응답정보", &self.response)?;
        map.serialize_entry(self.list_key, &self.records)?;
        if let Some(message) = self.message {
            map.serialize_entry("메시지", message)?;
        }
        if let Some(summary) = &self.summary {
            map.serialize_entry("분석정보", summary)?;
        }
        if let Some(tips) = &self.tips {
            map.serialize_entry("사용팁", tips)?;
        }
        map.end()
    }
}

/// Context attached to server-side failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugInfo {
    #[serde(rename = "요청시간")]
    pub requested_at: String,
    #[serde(rename = "파라미터")]
    pub params: Labeled<Option<String>>,
}

impl DebugInfo {
    /// Echo the paging and filter parameters; the key is only reported as
    /// present or missing.
    ///
    /// Paging reports the effective values, so an omitted `pageNo` echoes
    /// `"1"` and an omitted `numOfRows` echoes `default_rows`.
    pub fn from_query(
        requested_at: String,
        query: &HashMap<String, String>,
        default_rows: u32,
    ) -> Self {
        let key_given = SERVICE_KEY_PARAMS
            .iter()
            .any(|k| query.get(*k).is_some_and(|v| !v.trim().is_empty()));
        let key_state = if key_given { "제공됨" } else { "누락" };

        let given = |name: &str| {
            query
                .get(name)
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim().to_string())
        };

        let mut params = vec![
            ("ServiceKey", Some(key_state.to_string())),
            ("pageNo", Some(given("pageNo").unwrap_or_else(|| "1".to_string()))),
            (
                "numOfRows",
                Some(given("numOfRows").unwrap_or_else(|| default_rows.to_string())),
            ),
        ];
        for name in ["kindA", "kindB", "kindC"] {
            params.push((name, query.get(name).cloned()));
        }

        Self {
            requested_at,
            params: Labeled(params),
        }
    }
}

/// Failure response document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "성공")]
    success: bool,
    #[serde(rename = "오류")]
    pub error: String,
    #[serde(rename = "오류유형")]
    pub kind: &'static str,
    #[serde(rename = "에러코드", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "에러메시지", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "사용법", skip_serializing_if = "Option::is_none")]
    pub usage: Option<Labeled<&'static str>>,
    #[serde(rename = "디버그정보", skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl ErrorEnvelope {
    pub fn from_error(err: &ProxyError) -> Self {
        let (code, message) = match err {
            ProxyError::UpstreamApi { code, message } => (Some(code.clone()), Some(message.clone())),
            _ => (None, None),
        };

        Self {
            success: false,
            error: err.to_string(),
            kind: err.kind(),
            code,
            message,
            usage: None,
            debug: None,
        }
    }

    pub fn with_usage(mut self, usage: &'static [(&'static str, &'static str)]) -> Self {
        if !usage.is_empty() {
            self.usage = Some(Labeled(usage.to_vec()));
        }
        self
    }

    pub fn with_debug(mut self, debug: DebugInfo) -> Self {
        self.debug = Some(debug);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_label_order() {
        let record = OutgoingRecord {
            sequence: 2,
            fields: Labeled(vec![
                ("유형", RecordValue::Text("요양".into())),
                ("건수", RecordValue::Count(17)),
            ]),
        };
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"순번":2,"유형":"요양","건수":17}"#);
    }

    #[test]
    fn test_api_error_envelope() {
        let envelope = ErrorEnvelope::from_error(&ProxyError::UpstreamApi {
            code: "30".into(),
            message: "SERVICE KEY IS NOT REGISTERED ERROR.".into(),
        });
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "성공": false,
                "오류": "API 에러 발생",
                "오류유형": "UpstreamApiError",
                "에러코드": "30",
                "에러메시지": "SERVICE KEY IS NOT REGISTERED ERROR."
            })
        );
    }

    #[test]
    fn test_debug_info_masks_key() {
        let query: HashMap<String, String> = [("serviceKey", "secret"), ("pageNo", "4")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let debug = DebugInfo::from_query("2026-01-01T00:00:00.000Z".into(), &query, 10);
        let value = serde_json::to_value(&debug).unwrap();

        assert_eq!(value["파라미터"]["ServiceKey"], "제공됨");
        assert_eq!(value["파라미터"]["pageNo"], "4");
        assert_eq!(value["파라미터"]["numOfRows"], "10");
        assert!(value["파라미터"]["kindA"].is_null());
        assert!(!value.to_string().contains("secret"));
    }

    #[test]
    fn test_debug_info_echoes_effective_paging() {
        let query: HashMap<String, String> = [("pageNo", " "), ("kindB", "행정")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let debug = DebugInfo::from_query("2026-01-01T00:00:00.000Z".into(), &query, 100);
        let value = serde_json::to_value(&debug).unwrap();

        assert_eq!(value["파라미터"]["ServiceKey"], "누락");
        assert_eq!(value["파라미터"]["pageNo"], "1");
        assert_eq!(value["파라미터"]["numOfRows"], "100");
        assert_eq!(value["파라미터"]["kindB"], "행정");
    }
}
