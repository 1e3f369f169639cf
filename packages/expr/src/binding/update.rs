//! Binding re-evaluation
//!
//! Evaluates a batch of descriptors against one context. Every descriptor gets
//! its own parse with its own memo table, so the batch runs in parallel.

use std::borrow::Borrow;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::descriptor::{BindingDescriptor, Target, WriteKind};
use crate::config::ParseOptions;
use crate::error::ExprError;
use crate::eval::{EvalContext, Value};

/// What the host writes to the target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpdateValue {
    /// Text and attribute writes
    Display(String),
    /// Value writes
    Raw(Value),
}

#[derive(Debug, Clone)]
pub struct BindingUpdate {
    pub target: Target,
    pub kind: WriteKind,
    pub result: Result<UpdateValue, ExprError>,
}

impl BindingUpdate {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Evaluate each descriptor's expression. Updates come back in input order.
pub fn evaluate_bindings<D>(
    descriptors: &[D],
    ctx: &EvalContext,
    options: &ParseOptions,
) -> Vec<BindingUpdate>
where
    D: Borrow<BindingDescriptor> + Sync,
{
    debug!(count = descriptors.len(), "evaluating bindings");

    descriptors
        .par_iter()
        .map(|descriptor| {
            let descriptor = descriptor.borrow();
            let result = crate::parse_with_options(&descriptor.expr, ctx, options).map(|value| {
                if descriptor.kind.wants_raw_value() {
                    UpdateValue::Raw(value)
                } else {
                    UpdateValue::Display(value.to_display_string())
                }
            });
            if let Err(err) = &result {
                warn!(target_locator = %descriptor.target, error = %err, "binding evaluation failed");
            }
            BindingUpdate {
                target: descriptor.target.clone(),
                kind: descriptor.kind.clone(),
                result,
            }
        })
        .collect()
}
