//! Catalog listing filters and the SQL they compile to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use crate::api::error::ApiError;

pub const DEFAULT_LIMIT: u32 = 12;
pub const MAX_LIMIT: u32 = 50;
pub const NEW_ARRIVAL_DAYS: u32 = 30;

/// Raw query string, echoed back in the listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub featured: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub quality: Option<String>,
    pub new_arrivals: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub featured: bool,
    pub quality: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub new_arrivals: bool,
}

impl ProductFilter {
    /// Lenient parse: unparseable page and limit fall back to defaults, only
    /// malformed prices are rejected.
    pub fn from_params(p: &ListParams) -> Result<Self, ApiError> {
        let page = parse_int(p.page.as_deref()).unwrap_or(1).max(1);
        let limit = parse_int(p.limit.as_deref()).unwrap_or(i64::from(DEFAULT_LIMIT)).clamp(1, i64::from(MAX_LIMIT));
        Ok(Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            limit: u32::try_from(limit).unwrap_or(DEFAULT_LIMIT),
            category: non_empty(&p.category).filter(|c| c != "all"),
            featured: p.featured.as_deref() == Some("true"),
            quality: non_empty(&p.quality),
            search: non_empty(&p.search),
            min_price: parse_price("minPrice", &p.min_price)?,
            max_price: parse_price("maxPrice", &p.max_price)?,
            new_arrivals: p.new_arrivals.as_deref() == Some("true"),
        })
    }

    pub fn offset(&self) -> i64 { (i64::from(self.page) - 1) * i64::from(self.limit) }

    pub fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT * FROM products");
        self.push_conditions(&mut qb);
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(i64::from(self.limit));
        qb.push(" OFFSET ").push_bind(self.offset());
        qb
    }

    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products");
        self.push_conditions(&mut qb);
        qb
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut first = true;
        if let Some(category) = &self.category {
            conjoin(qb, &mut first).push("category = ").push_bind(category.clone());
        }
        if self.featured {
            conjoin(qb, &mut first).push("is_featured = TRUE");
        }
        if let Some(quality) = &self.quality {
            conjoin(qb, &mut first).push("quality = ").push_bind(quality.clone());
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            conjoin(qb, &mut first)
                .push("(title ILIKE ").push_bind(pattern.clone())
                .push(" OR description ILIKE ").push_bind(pattern.clone())
                .push(" OR brand ILIKE ").push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ").push_bind(pattern)
                .push("))");
        }
        if let Some(min) = self.min_price {
            conjoin(qb, &mut first).push("final_price >= ").push_bind(min);
        }
        if let Some(max) = self.max_price {
            conjoin(qb, &mut first).push("final_price <= ").push_bind(max);
        }
        if self.new_arrivals {
            conjoin(qb, &mut first).push(format!("created_at >= NOW() - INTERVAL '{NEW_ARRIVAL_DAYS} days'"));
        }
    }
}

fn conjoin<'q, 'a>(qb: &'q mut QueryBuilder<'a, Postgres>, first: &mut bool) -> &'q mut QueryBuilder<'a, Postgres> {
    qb.push(if std::mem::take(first) { " WHERE " } else { " AND " })
}

fn parse_int(raw: Option<&str>) -> Option<i64> { raw.and_then(|v| v.trim().parse().ok()) }

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_price(name: &str, raw: &Option<String>) -> Result<Option<Decimal>, ApiError> {
    non_empty(raw)
        .map(|v| v.parse::<Decimal>().map_err(|_| ApiError::BadRequest(format!("{name} must be a number"))))
        .transpose()
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') { out.push('\\'); }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(filter: &ProductFilter, total: i64) -> Self {
        let limit = i64::from(filter.limit);
        let pages = (total + limit - 1) / limit;
        Self {
            page: filter.page, limit: filter.limit, total, pages,
            has_next: i64::from(filter.page) < pages, has_prev: filter.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let query = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
        serde_json::from_value(serde_json::Value::Object(
            url::form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned().into())).collect(),
        ))
        .unwrap()
    }

    #[test]
    fn test_defaults_and_clamping() {
        let f = ProductFilter::from_params(&ListParams::default()).unwrap();
        assert_eq!((f.page, f.limit, f.offset()), (1, 12, 0));
        let f = ProductFilter::from_params(&params(&[("page", "-4"), ("limit", "500")])).unwrap();
        assert_eq!((f.page, f.limit), (1, 50));
        let f = ProductFilter::from_params(&params(&[("page", "3"), ("limit", "0")])).unwrap();
        assert_eq!((f.page, f.limit, f.offset()), (3, 1, 2));
        let f = ProductFilter::from_params(&params(&[("page", "abc")])).unwrap();
        assert_eq!(f.page, 1);
    }

    #[test]
    fn test_unfiltered_sql() {
        let f = ProductFilter::from_params(&params(&[("category", "all")])).unwrap();
        assert_eq!(f.select_query().sql(), "SELECT * FROM products ORDER BY created_at DESC LIMIT $1 OFFSET $2");
        assert_eq!(f.count_query().sql(), "SELECT COUNT(*) FROM products");
    }

    #[test]
    fn test_full_filter_sql() {
        let f = ProductFilter::from_params(&params(&[
            ("category", "books"), ("featured", "true"), ("quality", "used"), ("search", "rust"),
            ("minPrice", "5"), ("maxPrice", "20.50"), ("newArrivals", "true"),
        ]))
        .unwrap();
        assert_eq!(
            f.count_query().sql(),
            "SELECT COUNT(*) FROM products WHERE category = $1 AND is_featured = TRUE AND quality = $2 \
             AND (title ILIKE $3 OR description ILIKE $4 OR brand ILIKE $5 OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $6)) \
             AND final_price >= $7 AND final_price <= $8 AND created_at >= NOW() - INTERVAL '30 days'"
        );
        assert!(f.select_query().sql().ends_with("ORDER BY created_at DESC LIMIT $9 OFFSET $10"));
    }

    #[test]
    fn test_bad_price_rejected() {
        let err = ProductFilter::from_params(&params(&[("minPrice", "cheap")])).unwrap_err();
        assert_eq!(err.to_string(), "minPrice must be a number");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_pagination() {
        let f = ProductFilter::from_params(&params(&[("page", "2"), ("limit", "10")])).unwrap();
        assert_eq!(Pagination::new(&f, 25), Pagination { page: 2, limit: 10, total: 25, pages: 3, has_next: true, has_prev: true });
        assert_eq!(Pagination::new(&f, 0).pages, 0);
    }
}
