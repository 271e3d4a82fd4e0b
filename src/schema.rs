//! Declarative description of the target tables.
//!
//! Each entity kind maps to one table spec: the column list in emission
//! order, the source JSON field feeding each column, and how the value is
//! rendered. The `"id"` primary-key column is implicit; the compiler prefixes
//! every statement with it, valued by the server-side id generator.

/// The five dataset kinds, in referential insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Region,
    Subregion,
    Country,
    State,
    City,
}

impl EntityKind {
    /// Insertion order: parents before children.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Region,
        EntityKind::Subregion,
        EntityKind::Country,
        EntityKind::State,
        EntityKind::City,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Region => "region",
            EntityKind::Subregion => "subregion",
            EntityKind::Country => "country",
            EntityKind::State => "state",
            EntityKind::City => "city",
        }
    }

    /// Expected dataset filename under the input root.
    pub fn dataset_filename(self) -> &'static str {
        match self {
            EntityKind::Region => "regions.json",
            EntityKind::Subregion => "subregions.json",
            EntityKind::Country => "countries.json",
            EntityKind::State => "states.json",
            EntityKind::City => "cities.json",
        }
    }

    pub fn table(self) -> &'static TableSpec {
        match self {
            EntityKind::Region => &REGION,
            EntityKind::Subregion => &SUBREGION,
            EntityKind::Country => &COUNTRY,
            EntityKind::State => &STATE,
            EntityKind::City => &CITY,
        }
    }
}

/// How a column value is rendered into the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Single-quoted literal; `null` renders as `''`.
    Text,
    /// Bare number; `null` or a non-numeric value is a fatal error.
    Numeric,
    /// Bare number, or the bare token `NULL` when the value is `null`.
    NullableNumeric,
    /// Compact JSON serialized into a single-quoted literal.
    Json,
    /// Correlated subquery resolving a parent row by its internal id.
    ParentLookup { table: &'static str },
}

/// One target column: its name, the source JSON field, and the renderer.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub column: &'static str,
    pub field: &'static str,
    pub kind: ColumnKind,
}

/// A target table and its columns in emission order.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
}

const fn text(column: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec {
        column,
        field,
        kind: ColumnKind::Text,
    }
}

const fn numeric(column: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec {
        column,
        field,
        kind: ColumnKind::Numeric,
    }
}

const fn nullable_numeric(column: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec {
        column,
        field,
        kind: ColumnKind::NullableNumeric,
    }
}

const fn json(column: &'static str, field: &'static str) -> ColumnSpec {
    ColumnSpec {
        column,
        field,
        kind: ColumnKind::Json,
    }
}

const fn parent(column: &'static str, field: &'static str, table: &'static str) -> ColumnSpec {
    ColumnSpec {
        column,
        field,
        kind: ColumnKind::ParentLookup { table },
    }
}

pub static REGION: TableSpec = TableSpec {
    table: "Region",
    columns: &[
        text("name", "name"),
        json("translations", "translations"),
        numeric("id_internal", "id"),
    ],
};

pub static SUBREGION: TableSpec = TableSpec {
    table: "SubRegion",
    columns: &[
        parent("id_region", "region_id", "Region"),
        text("name", "name"),
        json("translations", "translations"),
        numeric("id_internal", "id"),
    ],
};

pub static COUNTRY: TableSpec = TableSpec {
    table: "Country",
    columns: &[
        parent("id_subregion", "subregion_id", "SubRegion"),
        text("name", "name"),
        text("iso_2", "iso2"),
        text("iso_3", "iso3"),
        text("numeric_code", "numeric_code"),
        text("phone_code", "phonecode"),
        text("capital", "capital"),
        text("currency", "currency"),
        text("currency_name", "currency_name"),
        text("currency_symbol", "currency_symbol"),
        text("tld", "tld"),
        text("native", "native"),
        numeric("population", "population"),
        nullable_numeric("gdp", "gdp"),
        text("region", "region"),
        text("subregion", "subregion"),
        text("nationality", "nationality"),
        json("timezones", "timezones"),
        json("translations", "translations"),
        numeric("latitude", "latitude"),
        numeric("longitude", "longitude"),
        text("emoji", "emoji"),
        text("emoji_u", "emojiU"),
        numeric("id_internal", "id"),
    ],
};

pub static STATE: TableSpec = TableSpec {
    table: "State",
    columns: &[
        parent("id_country", "country_id", "Country"),
        text("name", "name"),
        text("country_code", "country_code"),
        text("fips_code", "fips_code"),
        text("iso_2", "iso2"),
        text("iso_3166_2", "iso3166_2"),
        text("type", "type"),
        nullable_numeric("level", "level"),
        text("native", "native"),
        numeric("latitude", "latitude"),
        numeric("longitude", "longitude"),
        json("timezone", "timezone"),
        json("translations", "translations"),
        numeric("id_internal", "id"),
    ],
};

pub static CITY: TableSpec = TableSpec {
    table: "City",
    columns: &[
        parent("id_state", "state_id", "State"),
        parent("id_country", "country_id", "Country"),
        text("name", "name"),
        numeric("latitude", "latitude"),
        numeric("longitude", "longitude"),
        json("timezone", "timezone"),
        json("translations", "translations"),
        numeric("id_internal", "id"),
    ],
};

#[cfg(test)]
mod tests {
    use super::{ColumnKind, EntityKind};

    #[test]
    fn insertion_order_puts_parents_before_children() {
        let tables: Vec<&str> = EntityKind::ALL
            .iter()
            .map(|kind| kind.table().table)
            .collect();
        assert_eq!(tables, ["Region", "SubRegion", "Country", "State", "City"]);
    }

    #[test]
    fn every_table_tracks_the_internal_id_in_its_last_column() {
        for kind in EntityKind::ALL {
            let last = kind.table().columns.last().unwrap();
            assert_eq!(last.column, "id_internal", "table {}", kind.table().table);
            assert_eq!(last.field, "id");
            assert_eq!(last.kind, ColumnKind::Numeric);
        }
    }

    #[test]
    fn parent_lookups_reference_the_previous_kind() {
        let lookup_tables: Vec<Vec<&str>> = EntityKind::ALL
            .iter()
            .map(|kind| {
                kind.table()
                    .columns
                    .iter()
                    .filter_map(|column| match column.kind {
                        ColumnKind::ParentLookup { table } => Some(table),
                        _ => None,
                    })
                    .collect()
            })
            .collect();

        assert_eq!(lookup_tables[0], Vec::<&str>::new());
        assert_eq!(lookup_tables[1], ["Region"]);
        assert_eq!(lookup_tables[2], ["SubRegion"]);
        assert_eq!(lookup_tables[3], ["Country"]);
        assert_eq!(lookup_tables[4], ["State", "Country"]);
    }
}
