pub mod alias;
pub mod context;
pub mod cte;
pub mod descriptor;
pub mod error;
pub mod expr;
pub mod macros;
pub mod query;
pub mod serialize;
pub mod table;
pub mod traits;

pub use alias::Alias;
pub use context::{BoundParameter, Context, RenderedQuery, SqlContext};
pub use cte::cte;
pub use error::{QueryError, Result};
pub use expr::{not, Col, Column, Expr, Parameter, Value};
pub use query::*;
pub use table::{ColumnDef, Table};

#[cfg(test)]
mod tests {
    use tessera_config::dialect::{DialectConfig, Feature};

    use super::*;
    use crate::{
        descriptor::{Tags, ValueType},
        error::{Inconsistency, Malformation},
        query::from::TableRef,
        traits::{Expression as _, Fragment},
    };

    define_table! {
        packages {
            table: "packages",
            columns: {
                ID: i64 => "id",
                NAME: String => "name",
                VERSION: String => "version",
                DOWNLOADS: u64 => "downloads",
                DESCRIPTION: Option<String> => "description",
                RATING: f64 => "rating",
            }
        }
    }

    define_table! {
        maintainers {
            table: "maintainers",
            columns: {
                ID: i64 => "id",
                PACKAGE_ID: i64 => "package_id",
                NAME: String => "name",
            }
        }
    }

    fn render(statement: &Statement) -> String {
        statement.to_sql(&DialectConfig::sqlite()).unwrap().sql
    }

    #[test]
    fn test_select_with_filter_and_order() {
        let statement = select(columns![packages::NAME, packages::VERSION])
            .unwrap()
            .from([packages::TABLE])
            .unwrap()
            .where_(
                packages::DOWNLOADS
                    .gte(100)
                    .unwrap()
                    .and(packages::DESCRIPTION.is_not_null().unwrap())
                    .unwrap(),
            )
            .unwrap()
            .order_by([packages::DOWNLOADS.desc(), packages::NAME.asc()])
            .unwrap();

        assert_eq!(
            render(&statement),
            "SELECT packages.name, packages.version FROM packages \
             WHERE (packages.downloads >= 100 AND packages.description IS NOT NULL) \
             ORDER BY packages.downloads DESC, packages.name ASC"
        );
    }

    #[test]
    fn test_join_through_where() {
        let statement = select(columns![
            packages::NAME,
            maintainers::NAME.as_("maintainer")
        ])
        .unwrap()
        .from([packages::TABLE, maintainers::TABLE])
        .unwrap()
        .where_(maintainers::PACKAGE_ID.eq(packages::ID).unwrap())
        .unwrap();

        assert_eq!(
            render(&statement),
            "SELECT packages.name, maintainers.name AS maintainer \
             FROM packages, maintainers WHERE maintainers.package_id = packages.id"
        );
        let row = statement.result_row().unwrap();
        assert_eq!(row.field("maintainer").unwrap().value_type(), ValueType::Text);
    }

    #[test]
    fn test_literals_are_inlined() {
        let statement = select(columns![packages::ID])
            .unwrap()
            .from([packages::TABLE])
            .unwrap()
            .where_(
                packages::NAME
                    .eq("it's")
                    .unwrap()
                    .or(packages::RATING.gt(4).unwrap())
                    .unwrap(),
            )
            .unwrap();

        let rendered = statement.to_sql(&DialectConfig::postgresql()).unwrap();
        assert_eq!(
            rendered.sql,
            "SELECT packages.id FROM packages \
             WHERE (packages.name = 'it''s' OR packages.rating > 4)"
        );
        assert!(rendered.parameters.is_empty());
    }

    #[test]
    fn test_negation() {
        let statement = select(columns![packages::ID])
            .unwrap()
            .from([packages::TABLE])
            .unwrap()
            .where_(not(packages::NAME.like("lib%").unwrap()).unwrap())
            .unwrap();

        assert_eq!(
            render(&statement),
            "SELECT packages.id FROM packages WHERE NOT (packages.name LIKE 'lib%')"
        );
    }

    #[test]
    fn test_type_errors_surface_at_construction() {
        assert!(matches!(
            packages::NAME.eq(1),
            Err(QueryError::Malformed(Malformation::TypeMismatch { .. }))
        ));
        assert!(matches!(
            packages::ID.like("1%"),
            Err(QueryError::Malformed(Malformation::NotText(_)))
        ));

        let statement = select(columns![packages::ID])
            .unwrap()
            .from([packages::TABLE])
            .unwrap();
        assert!(matches!(
            statement.where_(packages::ID),
            Err(QueryError::Malformed(Malformation::NotBoolean(ValueType::Integral)))
        ));
    }

    #[test]
    fn test_quoting_follows_dialect() {
        let statement = select(columns![packages::ID.as_("order")])
            .unwrap()
            .from([packages::TABLE])
            .unwrap();

        assert_eq!(
            render(&statement),
            "SELECT packages.id AS \"order\" FROM packages"
        );
        assert_eq!(
            statement.to_sql(&DialectConfig::mysql()).unwrap().sql,
            "SELECT packages.id AS `order` FROM packages"
        );
        assert_eq!(
            statement.to_sql(&DialectConfig::mssql()).unwrap().sql,
            "SELECT packages.id AS [order] FROM packages"
        );
    }

    #[test]
    fn test_paginated_query_with_parameters() {
        let mut statement = select(columns![packages::ID, packages::NAME])
            .unwrap()
            .from([packages::TABLE])
            .unwrap()
            .where_(packages::NAME.like(Parameter::of::<String>("pattern")).unwrap())
            .unwrap()
            .order_by([packages::ID.asc()])
            .unwrap()
            .dynamic_limit()
            .unwrap()
            .dynamic_offset()
            .unwrap();
        statement.set_limit(Parameter::of::<i64>("limit")).unwrap();
        statement.set_offset(40).unwrap();

        let rendered = statement.to_sql(&DialectConfig::postgresql()).unwrap();
        assert_eq!(
            rendered.sql,
            "SELECT packages.id, packages.name FROM packages \
             WHERE packages.name LIKE $1 ORDER BY packages.id ASC LIMIT $2 OFFSET 40"
        );
        let positions: Vec<_> = rendered
            .parameters
            .iter()
            .map(|p| (p.position, p.value_type))
            .collect();
        assert_eq!(positions, [(1, ValueType::Text), (2, ValueType::Integral)]);
    }

    #[test]
    fn test_top_downloads_per_maintainer_cte() {
        let popular = Alias::new("popular");
        let body = select(columns![packages::ID, packages::NAME])
            .unwrap()
            .from([packages::TABLE])
            .unwrap()
            .where_(packages::DOWNLOADS.gt(1000).unwrap())
            .unwrap();
        let popular = cte(&popular).as_(body).unwrap();

        let statement = with([popular.clone()])
            .unwrap()
            .select(columns![
                popular.column("name").unwrap(),
                maintainers::NAME.as_("maintainer")
            ])
            .unwrap();
        let statement = statement
            .from([TableRef::from(popular.reference()), maintainers::TABLE.into()])
            .unwrap()
            .where_(
                maintainers::PACKAGE_ID
                    .eq(popular.column("id").unwrap())
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(
            render(&statement),
            "WITH popular AS (SELECT packages.id, packages.name FROM packages \
             WHERE packages.downloads > 1000) \
             SELECT popular.name, maintainers.name AS maintainer FROM popular, maintainers \
             WHERE maintainers.package_id = popular.id"
        );
    }

    #[test]
    fn test_duplicate_result_columns() {
        assert!(matches!(
            select(columns![packages::NAME, maintainers::NAME]),
            Err(QueryError::Inconsistent(Inconsistency::DuplicateColumn(name))) if name == "name"
        ));
    }

    #[test]
    fn test_statement_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Statement>();
        assert_send_sync::<RenderedQuery>();
    }

    #[test]
    fn test_union_of_aliases() {
        let first = packages::TABLE.as_(&Alias::new("a")).unwrap();
        let second = packages::TABLE.as_(&Alias::new("b")).unwrap();
        let lhs = select([first.column("id").unwrap()])
            .unwrap()
            .from([first])
            .unwrap();
        let rhs = select([second.column("id").unwrap()])
            .unwrap()
            .from([second])
            .unwrap();
        let statement = lhs.union_distinct(rhs).unwrap();

        assert!(statement.descriptor().has_tag(Tags::UNION));
        let mut dialect = DialectConfig::new("explicit");
        dialect.explicit_union_distinct = Some(true);
        assert_eq!(
            statement.to_sql(&dialect).unwrap().sql,
            "SELECT a.id FROM packages AS a UNION DISTINCT SELECT b.id FROM packages AS b"
        );

        dialect.unsupported = Some(vec![Feature::UnionDistinct]);
        assert!(matches!(
            statement.to_sql(&dialect),
            Err(QueryError::Unsupported(_))
        ));
    }
}
