// TrueMoney push relay: the payload is just the amount

use crate::context::ExtractContext;
use crate::error::Result;
use crate::numeric;
use crate::record::Extracted;

/// "฿ 1,234.50" → 1234.50 at the received time.
pub(super) fn extract_push(raw: &str, ctx: &ExtractContext) -> Result<Extracted> {
    let amount = numeric::parse_amount(raw)?;
    Ok(Extracted::new(amount, ctx.received_at()))
}
