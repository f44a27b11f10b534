//! kinds command - List selector kinds and their host bindings

use anyhow::Result;
use serde::Serialize;

use super::Context;
use crate::selector::SelectorKind;
use crate::ui::output::{self, format_list};

/// One kind, as printed.
#[derive(Debug, Serialize)]
struct KindSummary {
    name: &'static str,
    cardinality: String,
    value_parameter: &'static str,
    label_output: Option<&'static str>,
    scope_parameters: Vec<&'static str>,
    placeholder: &'static str,
    loading_label: &'static str,
}

impl From<SelectorKind> for KindSummary {
    fn from(kind: SelectorKind) -> Self {
        let binding = kind.binding();
        Self {
            name: kind.name(),
            cardinality: kind.cardinality().to_string(),
            value_parameter: binding.value,
            label_output: binding.label_output,
            scope_parameters: binding.scope.names(),
            placeholder: kind.placeholder(),
            loading_label: kind.loading_label(),
        }
    }
}

/// List every selector kind.
pub fn kinds(ctx: &Context) -> Result<()> {
    let summaries: Vec<KindSummary> = SelectorKind::all().map(KindSummary::from).collect();

    if ctx.json {
        return output::print_json(&summaries);
    }

    for summary in &summaries {
        let mut lines = vec![
            format!("cardinality: {}", summary.cardinality),
            format!("binds:       {}", summary.value_parameter),
        ];
        if let Some(label_output) = summary.label_output {
            lines.push(format!("label:       {}", label_output));
        }
        if !summary.scope_parameters.is_empty() {
            lines.push(format!("scope:       {}", summary.scope_parameters.join(", ")));
        }
        lines.push(format!("placeholder: {}", summary.placeholder));

        output::print(summary.name, ctx.verbosity);
        output::print(format_list(&lines, "  "), ctx.verbosity);
    }

    Ok(())
}
