//! `<cosmos-balance>`: an amount and its denomination.
//!
//! `value` accepts a decimal, number or numeric string. `decimals` is the
//! number of decimals to show (not the precision of the denom) and
//! defaults to 3.

use std::rc::Rc;

use crate::decimal::Decimal;
use crate::engine::{ComponentDefinition, ComponentOptions, define_component, el, fragment};
use crate::schema::{Schema, SchemaMap, decimal_like};
use crate::utils::unindent;
use crate::value::Value;

pub const TAG: &str = "cosmos-balance";

/// Decimals shown when `decimals` is not set.
pub const DEFAULT_DECIMALS: u32 = 3;

/// Largest `decimals` honored. An `i128` mantissa holds 38 digits.
pub const MAX_DECIMALS: u32 = 38;

const STYLES: &str = "
    :host {
      font-family: var(--cosmos-font-monospace, monospace);
    }
";

/// Truncate to `decimals` and format with thousands separators.
pub fn display_value(value: &Value, decimals: Option<u32>) -> String {
    let decimals = decimals.unwrap_or(DEFAULT_DECIMALS);
    value
        .as_decimal()
        .and_then(|d: Decimal| {
            // Within `decimals` already: nothing to cut, and widening could overflow.
            if d.decimals() <= decimals { Some(d) } else { d.rebase(decimals).ok() }
        })
        .map(|d| d.format_grouped(decimals.min(DEFAULT_DECIMALS)))
        .unwrap_or_else(|| "NaN".to_string())
}

/// `decimals` as a digit count: fractions are dropped, values are clamped to
/// [`MAX_DECIMALS`] and negative ones are ignored.
fn decimals(value: &Value) -> Option<u32> {
    value
        .as_f64()
        .filter(|d| *d >= 0.0)
        .map(|d| d.trunc().min(f64::from(MAX_DECIMALS)) as u32)
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new()
            .with("value", decimal_like())
            .with("denom", Schema::string())
            .with("decimals", Schema::number().optional()),
        render: Some(Rc::new(|props| {
            let decimals = decimals(&props.read("decimals"));
            let shown = display_value(&props.read("value"), decimals);
            let denom = props.read("denom").as_str().map(str::to_string);
            fragment([
                el("style").child(unindent(STYLES)).into(),
                el("span").attr("part", "value").child(shown).into(),
                " ".into(),
                el("span").attr("part", "denom").child(denom).into(),
            ])
        })),
        ..Default::default()
    })
}
