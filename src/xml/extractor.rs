//! Status check and item extraction on top of [`XmlDocument`].

use crate::error::{ProxyError, UNKNOWN};

use super::document::{ItemBlock, XmlDocument};

/// Result code the service uses for a normal response.
pub const SUCCESS_CODE: &str = "00";

/// Items and total of one successful upstream page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub items: Vec<ItemBlock>,
    /// `totalCount` from the document, or the item count when it is missing
    /// or not an integer.
    pub total_count: u64,
}

/// Parse an upstream body, failing on an upstream-declared error.
///
/// Zero items is a valid outcome, not an error.
pub fn extract(xml: &str, item_tag: &str) -> Result<Extraction, ProxyError> {
    let document = XmlDocument::parse(xml, item_tag);
    check_status(&document)?;

    let total_count = document
        .scalar("totalCount")
        .and_then(|v| v.parse::<u64>().ok());
    let items = document.into_items();
    let total_count = total_count.unwrap_or(items.len() as u64);

    Ok(Extraction { items, total_count })
}

fn check_status(document: &XmlDocument) -> Result<(), ProxyError> {
    if let Some(code) = document.scalar("resultCode") {
        if code == SUCCESS_CODE {
            return Ok(());
        }
        return Err(ProxyError::UpstreamApi {
            code: or_unknown(code),
            message: or_unknown(document.scalar("resultMsg").unwrap_or_default()),
        });
    }

    // The data.go.kr gateway reports key and quota problems in its own
    // envelope, without a resultCode.
    if let Some(code) = document.scalar("returnReasonCode") {
        if code != SUCCESS_CODE {
            let message = document
                .scalar("returnAuthMsg")
                .filter(|m| !m.is_empty())
                .or_else(|| document.scalar("errMsg"))
                .unwrap_or_default();
            return Err(ProxyError::UpstreamApi {
                code: or_unknown(code),
                message: or_unknown(message),
            });
        }
    }

    Ok(())
}

fn or_unknown(value: &str) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(result_code: &str, total: Option<&str>, items: &str) -> String {
        let total = total
            .map(|t| format!("<totalCount>{t}</totalCount>"))
            .unwrap_or_default();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <response><header><resultCode>{result_code}</resultCode>\
             <resultMsg>NORMAL SERVICE.</resultMsg></header>\
             <body><items>{items}</items><numOfRows>10</numOfRows><pageNo>1</pageNo>{total}</body></response>"
        )
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    }

    #[test]
    fn test_items_in_document_order() {
        let xml = page(
            "00",
            Some("3"),
            "<item><accnum>A-1</accnum></item><item><accnum>A-2</accnum></item><item><accnum>A-3</accnum></item>",
        );
        let extraction = extract(&xml, "item").unwrap();

        let numbers: Vec<_> = extraction.items.iter().map(|i| i.field("accnum")).collect();
        assert_eq!(numbers, ["A-1", "A-2", "A-3"]);
        assert_eq!(extraction.total_count, 3);
    }

    #[test]
    fn test_zero_items_is_success() {
        let extraction = extract(&page("00", Some("0"), ""), "item").unwrap();
        assert!(extraction.items.is_empty());
        assert_eq!(extraction.total_count, 0);
    }

    #[test]
    fn test_total_falls_back_to_item_count() {
        let items = "<item><title>a</title></item><item><title>b</title></item>";

        let missing = extract(&page("00", None, items), "item").unwrap();
        assert_eq!(missing.total_count, 2);

        let garbage = extract(&page("00", Some("many"), items), "item").unwrap();
        assert_eq!(garbage.total_count, 2);
    }

    #[test]
    fn test_result_code_error() {
        let xml = "<response><header><resultCode>22</resultCode>\
                   <resultMsg>LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS ERROR.</resultMsg>\
                   </header></response>";
        let err = extract(xml, "item").unwrap_err();
        assert_eq!(
            err,
            ProxyError::UpstreamApi {
                code: "22".into(),
                message: "LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS ERROR.".into(),
            }
        );
    }

    #[test]
    fn test_empty_result_code_defaults_to_unknown() {
        let err = extract("<response><resultCode></resultCode></response>", "item").unwrap_err();
        assert_eq!(
            err,
            ProxyError::UpstreamApi {
                code: UNKNOWN.into(),
                message: UNKNOWN.into(),
            }
        );
    }

    #[test]
    fn test_gateway_error_envelope() {
        let xml = "<OpenAPI_ServiceResponse><cmmMsgHeader>\
                   <errMsg>SERVICE ERROR</errMsg>\
                   <returnAuthMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</returnAuthMsg>\
                   <returnReasonCode>30</returnReasonCode>\
                   </cmmMsgHeader></OpenAPI_ServiceResponse>";
        let err = extract(xml, "item").unwrap_err();
        assert_eq!(
            err,
            ProxyError::UpstreamApi {
                code: "30".into(),
                message: "SERVICE_KEY_IS_NOT_REGISTERED_ERROR".into(),
            }
        );
    }

    #[test]
    fn test_serialized_records_round_trip() {
        let records: Vec<Vec<(&str, String)>> = (1..=25)
            .map(|n| {
                vec![
                    ("accnum", format!("2021구합{n}")),
                    ("courtname", format!("법원 {}", n % 4)),
                    ("title", format!("요양불승인처분취소 <{n}> & 기타")),
                    ("noncontent", format!("판결 본문 {n}\n둘째 줄")),
                ]
            })
            .collect();

        let body: String = records
            .iter()
            .enumerate()
            .map(|(i, fields)| {
                let inner: String = fields
                    .iter()
                    .map(|(tag, value)| {
                        // Alternate between escaped text and CDATA wrapping.
                        if i % 2 == 0 {
                            format!("<{tag}>{}</{tag}>", escape(value))
                        } else {
                            format!("<{tag}><![CDATA[{value}]]></{tag}>")
                        }
                    })
                    .collect();
                format!("<item>{inner}</item>")
            })
            .collect();

        let extraction = extract(&page("00", Some("25"), &body), "item").unwrap();
        assert_eq!(extraction.items.len(), records.len());
        for (item, fields) in extraction.items.iter().zip(&records) {
            for (tag, value) in fields {
                assert_eq!(item.field(tag), value.trim());
            }
        }
    }
}
