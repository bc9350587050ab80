//! The five operations of the industrial-accident precedent service.

use super::descriptor::{EndpointDescriptor, FieldMapping, FilterParam, SummarySpec};

/// Precedent full-text search with filters and page summary.
pub static PRECEDENTS: EndpointDescriptor = EndpointDescriptor {
    name: "precedents",
    route: "/api/proxy",
    operation: "getSjbPrecedentNaeyongPstate",
    item_tag: "item",
    default_rows: 10,
    list_key: "판례목록",
    fields: &[
        FieldMapping::text("accnum", "사건번호"),
        FieldMapping::text("courtname", "법원명"),
        FieldMapping::text("title", "제목"),
        FieldMapping::text("kinda", "사건결과"),
        FieldMapping::text("kindb", "사건유형"),
        FieldMapping::text("kindc", "질병구분"),
        FieldMapping::text("noncontent", "판결문내용"),
    ],
    filters: &[
        FilterParam {
            param: "kindA",
            label: "사건결과",
        },
        FilterParam {
            param: "kindB",
            label: "사건유형",
        },
        FilterParam {
            param: "kindC",
            label: "질병구분",
        },
    ],
    summaries: &[
        SummarySpec {
            label: "주요법원",
            source: "법원명",
        },
        SummarySpec {
            label: "사건결과분포",
            source: "사건결과",
        },
        SummarySpec {
            label: "사건유형분포",
            source: "사건유형",
        },
    ],
    tips: &[
        (
            "필터링",
            "kindA, kindB, kindC 파라미터로 원하는 조건의 판례만 검색 가능",
        ),
        ("페이징", "pageNo를 증가시켜 더 많은 결과 확인 가능"),
        ("내용확인", "판결문내용 필드에서 실제 판결 내용 확인 가능"),
    ],
    usage: &[
        ("기본", "?serviceKey=YOUR_KEY&pageNo=1&numOfRows=10"),
        ("필터링", "?serviceKey=YOUR_KEY&kindA=기각&kindB=요양"),
    ],
    empty_message: "검색 조건에 맞는 판례가 없습니다",
};

pub static ACCIDENT_TYPES: EndpointDescriptor = EndpointDescriptor {
    name: "accident-types",
    route: "/api/proxy/accident-types",
    operation: "getSjbSagoJilbyeongGubunPstate",
    item_tag: "item",
    default_rows: 100,
    list_key: "사고질병구분목록",
    fields: &[
        FieldMapping::text("kindc", "코드"),
        FieldMapping::text("kindc", "명칭"),
    ],
    filters: &[],
    summaries: &[],
    tips: &[],
    usage: &[("기본", "/accident-types?serviceKey=YOUR_KEY")],
    empty_message: "조회된 사고/질병 구분이 없습니다",
};

pub static CASE_TYPES: EndpointDescriptor = EndpointDescriptor {
    name: "case-types",
    route: "/api/proxy/case-types",
    operation: "getSjbSageonYuhyeongPstate",
    item_tag: "item",
    default_rows: 100,
    list_key: "사건유형목록",
    fields: &[
        FieldMapping::text("kindb", "코드"),
        FieldMapping::text("kindb", "명칭"),
    ],
    filters: &[],
    summaries: &[],
    tips: &[],
    usage: &[("기본", "/case-types?serviceKey=YOUR_KEY")],
    empty_message: "조회된 사건유형이 없습니다",
};

pub static RESULT_TYPES: EndpointDescriptor = EndpointDescriptor {
    name: "result-types",
    route: "/api/proxy/result-types",
    operation: "getSjbPrecedentResultYuhyeongPstate",
    item_tag: "item",
    default_rows: 100,
    list_key: "판결결과유형목록",
    fields: &[
        FieldMapping::text("kinda", "코드"),
        FieldMapping::text("kinda", "명칭"),
    ],
    filters: &[],
    summaries: &[],
    tips: &[],
    usage: &[("기본", "/result-types?serviceKey=YOUR_KEY")],
    empty_message: "조회된 판결결과 유형이 없습니다",
};

pub static STATISTICS: EndpointDescriptor = EndpointDescriptor {
    name: "statistics",
    route: "/api/proxy/statistics",
    operation: "getSjbYuhyeongByCountPstate",
    item_tag: "item",
    default_rows: 100,
    list_key: "통계정보",
    fields: &[
        FieldMapping::text("type", "유형"),
        FieldMapping::count("count", "건수"),
    ],
    filters: &[],
    summaries: &[],
    tips: &[],
    usage: &[("기본", "/statistics?serviceKey=YOUR_KEY")],
    empty_message: "조회된 통계 정보가 없습니다",
};

static ALL: [&EndpointDescriptor; 5] = [
    &PRECEDENTS,
    &ACCIDENT_TYPES,
    &CASE_TYPES,
    &RESULT_TYPES,
    &STATISTICS,
];

/// All served endpoints, search first.
pub fn all() -> &'static [&'static EndpointDescriptor] {
    &ALL
}

/// Look up an endpoint by its short name.
pub fn by_name(name: &str) -> Option<&'static EndpointDescriptor> {
    ALL.iter().copied().find(|d| d.name == name)
}
