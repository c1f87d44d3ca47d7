/// Category name and its member type identifiers, in output order
pub type TaxonomyEntry = (&'static str, &'static [&'static str]);

pub const BASIC_TYPES: &[TaxonomyEntry] = &[
    ("NUMBER", &["INT8", "INT4", "INT2", "FLOAT8", "FLOAT4", "NUMERIC"]),
    ("LONGINTEGER", &["INT8"]),
    ("INTEGER", &["INT4", "INT2"]),
    ("FLOAT", &["FLOAT8", "FLOAT4", "NUMERIC"]),
    ("STRING", &["NAME", "CHAR", "TEXT", "BPCHAR", "VARCHAR"]),
    ("BOOLEAN", &["BOOL"]),
    (
        "DATETIME",
        &[
            "DATE",
            "TIME",
            "TIMETZ",
            "TIMESTAMP",
            "TIMESTAMPTZ",
            "TINTERVAL",
            "INTERVAL",
        ],
    ),
    ("TIME", &["TIME", "TIMETZ"]),
    ("DATE", &["DATE", "TIMESTAMP", "TIMESTAMPTZ"]),
    ("INTERVAL", &["TINTERVAL", "INTERVAL"]),
    ("BINARY", &["BYTEA"]),
    ("ROWID", &["OID"]),
];

/// Every distinct member identifier, first-seen order
pub fn all_members() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for (_, members) in BASIC_TYPES {
        for m in *members {
            if !seen.contains(m) {
                seen.push(*m);
            }
        }
    }
    seen
}
