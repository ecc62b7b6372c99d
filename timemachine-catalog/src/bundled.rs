// ---------------------------------------------------------------------------
// Bundled exploit dataset
// ---------------------------------------------------------------------------
//
// Pre-computed analyses compiled into the binary so the demo runs without
// any data directory. Order here is the catalogue order shown in selectors.

/// Dataset version stamped into logs. Bump when adding/changing records.
pub const BUNDLED_VERSION: &str = "2025-08-14";

/// Record selected when nothing else is requested.
pub const DEFAULT_RECORD_ID: &str = "dao_2016";

/// `(id, json)` pairs for every bundled record, in catalogue order.
pub fn bundled_documents() -> [(&'static str, &'static str); 5] {
    [
        ("dao_2016", include_str!("../data/dao_2016.json")),
        ("wormhole_2022", include_str!("../data/wormhole_2022.json")),
        ("euler_2023", include_str!("../data/euler_2023.json")),
        ("beanstalk_2022", include_str!("../data/beanstalk_2022.json")),
        ("mango_2022", include_str!("../data/mango_2022.json")),
    ]
}
