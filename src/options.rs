//! Install and options dialogs for the transfer fee
//!
//! Both steps show one required float field, `transfer_fee`. The install step
//! defaults it to 0, the options step to the value currently stored in the
//! entry's options. Submitted values are coerced to float the way a form
//! post would: numbers and numeric strings are accepted.

use crate::error::{PorssisahkoError, Result};
use crate::persistence::{ConfigEntry, EntryOptions};
use serde::Serialize;
use serde_json::Value;

pub const CONF_TRANSFER_FEE: &str = "transfer_fee";

/// Step shown when the entry is first created
pub const STEP_USER: &str = "user";
/// Step shown when editing an existing entry
pub const STEP_INIT: &str = "init";

/// Abort reason when a second entry is attempted
pub const ABORT_SINGLE_INSTANCE: &str = "single_instance_allowed";

/// One input of a dialog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    /// Value type after coercion
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    pub default: f64,
}

/// A dialog to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSchema {
    pub step_id: &'static str,
    pub fields: Vec<FormField>,
}

fn fee_form(step_id: &'static str, default: f64) -> FormSchema {
    FormSchema {
        step_id,
        fields: vec![FormField {
            name: CONF_TRANSFER_FEE,
            kind: "float",
            required: true,
            default,
        }],
    }
}

/// Install dialog
pub fn user_step_form() -> FormSchema {
    fee_form(STEP_USER, 0.0)
}

/// Options dialog; the default is the fee currently in effect
pub fn options_step_form(entry: &ConfigEntry) -> FormSchema {
    fee_form(STEP_INIT, entry.transfer_fee())
}

/// Coerce a submitted value to float
fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Validate a submitted dialog
pub fn parse_user_input(input: &Value) -> Result<EntryOptions> {
    let Some(obj) = input.as_object() else {
        return Err(PorssisahkoError::validation(
            "form",
            "Expected an object of field values",
        ));
    };
    let Some(raw) = obj.get(CONF_TRANSFER_FEE) else {
        return Err(PorssisahkoError::validation(
            CONF_TRANSFER_FEE,
            "required key not provided",
        ));
    };
    let transfer_fee = coerce_float(raw).ok_or_else(|| {
        PorssisahkoError::validation(CONF_TRANSFER_FEE, format!("expected float, got {raw}"))
    })?;
    Ok(EntryOptions { transfer_fee })
}
