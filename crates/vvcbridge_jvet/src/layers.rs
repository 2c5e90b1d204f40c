//! Layer-selector partitioning of the flat argument list.
//!
//! An option of the form `-l<idx>` routes the option that follows it to coding
//! layer `idx` only; everything else is broadcast to every layer. A long
//! option (`--Key=Value`) consumes one slot after the selector, a short one
//! consumes two (name and value). Partitioning runs once per layer index, so
//! it can be re-run after the first layer reports the real layer count.

use crate::error::{JvetError, Result};

pub fn partition_layer_args(args: &[String], layer_idx: usize) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(args.len());
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        if is_layer_selector(arg) {
            let Some(param) = args.get(i + 1) else {
                return Err(JvetError::MissingLayerParameter(arg.clone()));
            };
            // long options carry their value inline, short ones in the next slot
            let consumed = if param.starts_with("--") { 1 } else { 2 };
            if args.len() <= i + consumed {
                return Err(JvetError::MissingLayerParameter(arg.clone()));
            }
            if arg[2..] == layer_idx.to_string() {
                out.extend(args[i + 1..=i + consumed].iter().cloned());
            }
            i += consumed + 1;
        } else {
            out.push(arg.clone());
            i += 1;
        }
    }

    Ok(out)
}

fn is_layer_selector(arg: &str) -> bool {
    let bytes = arg.as_bytes();
    bytes.len() > 2
        && bytes[0] == b'-'
        && bytes[1] == b'l'
        && bytes[2..].iter().all(u8::is_ascii_digit)
}
