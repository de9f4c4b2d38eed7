//! Named validation contracts, grouped by domain
//!
//! Each contract is built once behind a `LazyLock` and referenced by route
//! wiring via these accessor functions. Bounds here are the API's public
//! input contract; changing them changes what clients may send.

use std::sync::LazyLock;

use serde_json::json;

use super::{Field, Pattern, Schema};

/// User account contracts
pub mod user {
    use super::*;

    static CREATE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::object(vec![
            Field::required("email", Schema::email()),
            Field::required("password", Schema::string().min_len(8).max_len(128)),
            Field::required("fullName", Schema::string().min_len(2).max_len(100)),
            Field::optional(
                "phone",
                Schema::string().matching(Pattern::new(
                    r"^\+?[0-9]{7,15}$",
                    "be a valid phone number",
                )),
            ),
        ])
    });

    /// Registration payload
    pub fn create() -> &'static Schema {
        &CREATE
    }
}

/// Contracts shared across endpoints
pub mod common {
    use super::*;

    static PAGINATION: LazyLock<Schema> = LazyLock::new(|| pagination_with_limit(10));

    /// 1-based pagination with a default page size of 10
    pub fn pagination() -> &'static Schema {
        &PAGINATION
    }

    /// Build a pagination contract with a call-site default page size
    pub(crate) fn pagination_fields(default_limit: i64) -> Vec<Field> {
        vec![
            Field::with_default("page", Schema::integer().min(1.0), json!(1)),
            Field::with_default(
                "limit",
                Schema::integer().min(1.0).max(100.0),
                json!(default_limit),
            ),
        ]
    }

    fn pagination_with_limit(default_limit: i64) -> Schema {
        Schema::object(pagination_fields(default_limit))
    }
}

/// News and sentiment contracts
pub mod news {
    use super::*;

    static ANALYZE_SENTIMENT: LazyLock<Schema> = LazyLock::new(|| {
        Schema::object(vec![
            Field::required("content", Schema::string().min_len(6).max_len(20_000)),
            Field::with_default("type", Schema::one_of(&["news", "social"]), json!("news")),
            Field::optional("source", Schema::string().max_len(200)),
        ])
    });

    static BATCH_ANALYZE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::object(vec![Field::required(
            "articles",
            Schema::array(Schema::object(vec![
                Field::required("title", Schema::string().min_len(3).max_len(300)),
                Field::required("content", Schema::string().min_len(6).max_len(20_000)),
            ]))
            .min_items(1)
            .max_items(50),
        )])
    });

    /// Single-item sentiment payload
    pub fn analyze_sentiment() -> &'static Schema {
        &ANALYZE_SENTIMENT
    }

    /// Batch sentiment payload
    pub fn batch_analyze() -> &'static Schema {
        &BATCH_ANALYZE
    }
}

/// Prediction contracts
pub mod prediction {
    use super::*;

    static PARAMS: LazyLock<Schema> = LazyLock::new(|| {
        Schema::object(vec![Field::required(
            "symbol",
            Schema::string().min_len(1).max_len(20).matching(Pattern::new(
                r"^[A-Za-z0-9&-]+$",
                "be a valid instrument symbol",
            )),
        )])
    });

    static QUERY: LazyLock<Schema> = LazyLock::new(|| {
        Schema::object(vec![Field::with_default(
            "horizon",
            Schema::integer().min(1.0).max(365.0),
            json!(30),
        )])
    });

    /// Path parameters for forecast routes
    pub fn params() -> &'static Schema {
        &PARAMS
    }

    /// Query parameters for forecast routes
    pub fn query() -> &'static Schema {
        &QUERY
    }
}

/// Backup contracts
pub mod backup {
    use super::*;

    static CREATE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::object(vec![
            Field::required(
                "type",
                Schema::one_of(&["full", "incremental", "differential"]),
            ),
            Field::with_default(
                "priority",
                Schema::one_of(&["high", "normal", "low"]),
                json!("normal"),
            ),
            Field::with_default("compression", Schema::boolean(), json!(true)),
            Field::with_default("encryption", Schema::boolean(), json!(true)),
        ])
    });

    /// Backup creation payload
    pub fn create() -> &'static Schema {
        &CREATE
    }
}

/// Payment contracts
pub mod payment {
    use super::*;

    static INITIATE_UPI: LazyLock<Schema> = LazyLock::new(|| {
        Schema::object(vec![
            Field::required("amount", Schema::number().greater_than(0.0)),
            Field::required(
                "vpa",
                Schema::string().matching(Pattern::new(
                    r"^[A-Za-z0-9._-]{2,256}@[A-Za-z]{2,64}$",
                    "be a valid UPI address",
                )),
            ),
            Field::optional("note", Schema::string().max_len(80)),
        ])
    });

    /// UPI payment initiation payload
    pub fn initiate_upi() -> &'static Schema {
        &INITIATE_UPI
    }
}

/// Log query contracts
pub mod log {
    use super::*;

    static QUERY: LazyLock<Schema> = LazyLock::new(|| {
        let mut fields = vec![
            Field::optional(
                "level",
                Schema::one_of(&["error", "warn", "info", "debug", "verbose"]),
            ),
            Field::optional("from", Schema::datetime()),
            Field::optional("to", Schema::datetime()),
        ];
        fields.extend(common::pagination_fields(20));
        Schema::object(fields)
    });

    /// Log query string contract
    pub fn query() -> &'static Schema {
        &QUERY
    }
}

/// Export contracts
pub mod export {
    use super::*;

    static QUERY: LazyLock<Schema> = LazyLock::new(|| {
        let mut fields = vec![Field::with_default(
            "format",
            Schema::one_of(&["csv", "json", "pdf"]),
            json!("csv"),
        )];
        fields.extend(common::pagination_fields(20));
        Schema::object(fields)
    });

    /// Export listing query contract
    pub fn query() -> &'static Schema {
        &QUERY
    }
}
