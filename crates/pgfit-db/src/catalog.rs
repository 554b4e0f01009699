use sqlx::PgPool;

use crate::error::{Error, Result};
use pgfit_core::health::IndexDescriptor;

/// Per-index statistics snapshot, largest index first
///
/// pg_index is the driving table so indexes that have never been scanned
/// still show up; their counters come back as zero through the COALESCE.
const INDEX_STATS_QUERY: &str = r#"
  SELECT
      n.nspname AS schema,
      c.relname AS "table",
      ic.relname AS index,
      pg_get_indexdef(ic.oid) AS definition,
      COALESCE(s.idx_scan, 0) AS scans,
      COALESCE(s.idx_tup_read, 0) AS tuples_read,
      pg_relation_size(ic.oid) AS size_bytes
  FROM pg_class c
  JOIN pg_namespace n ON n.oid = c.relnamespace
  JOIN pg_index i ON i.indrelid = c.oid
  JOIN pg_class ic ON ic.oid = i.indexrelid
  LEFT JOIN pg_stat_user_indexes s ON s.indexrelid = ic.oid
  WHERE n.nspname NOT IN ('pg_catalog', 'information_schema')
    AND c.relkind = 'r'
    AND c.relname LIKE $1 || '%'
  ORDER BY pg_relation_size(ic.oid) DESC
  "#;

/// Fetch index statistics for every ordinary table whose name starts
/// with `table_prefix`
///
/// Read-only. The scan counters are cumulative since the last statistics
/// reset, so a report is only as meaningful as the load generated since
/// then. Any failure here is fatal for the report; there is no partial
/// output to fall back to.
pub async fn fetch_index_stats(
    pool: &PgPool,
    table_prefix: &str,
) -> Result<Vec<IndexDescriptor>> {
    let rows = sqlx::query_as::<_, (String, String, String, String, i64, i64, i64)>(
        INDEX_STATS_QUERY,
    )
    .bind(table_prefix)
    .fetch_all(pool)
    .await
    .map_err(|source| Error::CatalogUnavailable { source })?;

    Ok(rows
        .into_iter()
        .map(
            |(schema, table, index, definition, scans, tuples_read, size_bytes)| IndexDescriptor {
                schema,
                table,
                index,
                definition,
                scans,
                tuples_read,
                size_bytes,
            },
        )
        .collect())
}

/// Reset PostgreSQL's statistics counters
///
/// pg_stat_reset() zeroes the counters for the whole database, not just
/// the shop tables, and there is no undo. Run it before generating a
/// fresh load so the next report reflects only that load.
pub async fn reset_statistics(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT pg_stat_reset()")
        .execute(pool)
        .await
        .map_err(|source| Error::CatalogUnavailable { source })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_query_joins_the_statistics_view() {
        // LEFT JOIN, so never-scanned indexes are kept
        assert!(INDEX_STATS_QUERY.contains("LEFT JOIN pg_stat_user_indexes"));
        assert!(INDEX_STATS_QUERY.contains("COALESCE(s.idx_scan, 0)"));
        assert!(INDEX_STATS_QUERY.contains("COALESCE(s.idx_tup_read, 0)"));
    }

    #[test]
    fn test_stats_query_filters_and_ordering() {
        assert!(INDEX_STATS_QUERY.contains("c.relkind = 'r'"));
        assert!(INDEX_STATS_QUERY.contains("LIKE $1 || '%'"));
        assert!(INDEX_STATS_QUERY.contains("NOT IN ('pg_catalog', 'information_schema')"));
        assert!(INDEX_STATS_QUERY.contains("ORDER BY pg_relation_size(ic.oid) DESC"));
    }
}
