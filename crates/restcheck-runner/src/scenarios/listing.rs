//! Collection endpoints: schema, id uniqueness, pagination
//!
//! Each scenario fetches its own page; nothing is shared between them.

use restcheck_core::ListSchema;

use super::{Context, Scenario, case_id};
use crate::checks::{self, CheckResult};

/// A collection endpoint and the schema of its items.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Listing {
    /// Id prefix, e.g. "users"
    pub group: &'static str,
    pub path: &'static str,
    pub schema: &'static str,
    pub unique_items: bool,
}

/// `(case, page, per_page, expected item count)`
const PAGES: &[(&str, u64, u64, usize)] = &[
    ("page-1", 1, 2, 2),
    ("page-2", 2, 5, 5),
    ("page-out-of-range", 9_999_999, 5, 0),
];

pub(crate) fn scenarios(listing: Listing) -> Vec<Scenario> {
    let group = listing.group;
    let mut out = vec![
        Scenario::new(format!("{group}::list_schema"), move |ctx| {
            list_schema(ctx, listing)
        }),
        Scenario::new(format!("{group}::list_unique_ids"), move |ctx| {
            list_unique_ids(ctx, listing)
        }),
    ];
    for &(case, page, per_page, count) in PAGES {
        out.push(Scenario::new(
            case_id(&format!("{group}::pagination"), case),
            move |ctx| pagination(ctx, listing, page, per_page, count),
        ));
    }
    out
}

fn list_schema(ctx: &mut Context<'_>, listing: Listing) -> CheckResult {
    let resp = ctx.api.get(listing.path)?;
    let body = checks::expect_json_status(&resp, 200)?;
    let shape = ListSchema {
        min_items: 1,
        unique_items: listing.unique_items,
    };
    ctx.validate_list(&body, listing.schema, shape)
}

fn list_unique_ids(ctx: &mut Context<'_>, listing: Listing) -> CheckResult {
    let resp = ctx.api.get(listing.path)?;
    let body = checks::expect_json_status(&resp, 200)?;
    checks::expect_unique_ids(&body)
}

fn pagination(
    ctx: &mut Context<'_>,
    listing: Listing,
    page: u64,
    per_page: u64,
    count: usize,
) -> CheckResult {
    let resp = ctx.api.get_page(listing.path, page, per_page)?;
    let body = checks::expect_json_status(&resp, 200)?;
    checks::expect_pagination(&resp, page, per_page)?;
    checks::expect_item_count(&body, count)?;
    Ok(())
}
