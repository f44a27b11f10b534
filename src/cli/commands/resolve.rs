//! resolve command - Drive one selector against the metadata service

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::Context;
use crate::cli::args::ResolveArgs;
use crate::host::{HostAdapter, HostContext, Outputs};
use crate::selector::kind::ScopeParams;
use crate::selector::ControlView;
use crate::service::{create_service, MetadataService};
use crate::ui::output::{self, format_list, or_none};

/// What `resolve` reports.
#[derive(Debug, Serialize)]
struct ResolveReport {
    kind: String,
    phase: String,
    status: Option<String>,
    placeholder: &'static str,
    display_text: String,
    options: Vec<OptionReport>,
    selected: Vec<String>,
    disabled: bool,
    outputs: Outputs,
}

#[derive(Debug, Serialize)]
struct OptionReport {
    value: String,
    text: String,
}

impl ResolveReport {
    fn new(view: ControlView, outputs: Outputs) -> Self {
        Self {
            kind: view.kind.to_string(),
            phase: view.phase.to_string(),
            status: view.status.map(|s| s.to_string()),
            placeholder: view.placeholder,
            display_text: view.display_text,
            options: view
                .options
                .into_iter()
                .map(|o| OptionReport {
                    value: o.value,
                    text: o.text,
                })
                .collect(),
            selected: view.selected,
            disabled: view.disabled,
            outputs,
        }
    }
}

/// Resolve a selector's options and print them.
pub fn resolve(ctx: &Context, args: &ResolveArgs) -> Result<()> {
    let config = ctx.load_config()?;
    output::debug(
        format!(
            "config: {}",
            config
                .loaded_from()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(defaults)".to_string())
        ),
        ctx.verbosity,
    );
    output::debug(
        format!("metadata service: {}", or_none(config.base_url().unwrap_or_default())),
        ctx.verbosity,
    );
    let service = create_service(&config).context("Cannot create metadata service")?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(resolve_async(service, args))?;

    if ctx.json {
        return output::print_json(&report);
    }
    print_report(ctx, &report);
    Ok(())
}

async fn resolve_async(service: Arc<dyn MetadataService>, args: &ResolveArgs) -> Result<ResolveReport> {
    let host = host_context(args);
    let mut adapter = HostAdapter::new(args.kind, service);

    adapter.initialize(&host, Box::new(|| {}));
    adapter.render(&host);
    adapter.settle().await;
    let mut view = adapter.render(&host);

    if let Some(raw) = &args.select {
        adapter
            .select_raw(raw)
            .with_context(|| format!("Cannot select '{}'", raw))?;
        view = adapter.view();
    }

    let outputs = adapter.current_outputs();
    adapter.teardown();
    Ok(ResolveReport::new(view, outputs))
}

/// Build the host configuration a control of this kind would receive.
///
/// Flags map onto whichever host parameters the kind reads; flags the kind
/// does not use are ignored.
pub fn host_context(args: &ResolveArgs) -> HostContext {
    let binding = args.kind.binding();
    let mut host = HostContext::new().with_disabled(args.disabled);

    let mut set = |name: &str, value: &Option<String>| {
        if let Some(value) = value {
            host.set_parameter(name, value.as_str());
        }
    };

    set(binding.value, &args.value);
    match binding.scope {
        ScopeParams::Entity(entity) => set(entity, &args.entity),
        ScopeParams::Related {
            form_entity,
            query_entity,
        } => {
            set(form_entity, &args.form_entity);
            set(query_entity, &args.query_entity);
        }
        ScopeParams::Catalog {
            activities_only,
            supports_activities,
        } => {
            set(activities_only, &args.activities_only);
            set(supports_activities, &args.supports_activities);
        }
        ScopeParams::None => {}
    }

    host
}

fn print_report(ctx: &Context, report: &ResolveReport) {
    let v = ctx.verbosity;

    output::print(
        format!(
            "{} [{}{}]",
            report.kind,
            report.phase,
            report
                .status
                .as_ref()
                .map(|s| format!(", {}", s))
                .unwrap_or_default()
        ),
        v,
    );
    output::print(format!("placeholder: {}", report.placeholder), v);
    output::print(format!("display:     {}", or_none(&report.display_text)), v);

    let options: Vec<&str> = report
        .options
        .iter()
        .filter(|o| !o.value.is_empty())
        .map(|o| o.text.as_str())
        .collect();
    if options.is_empty() {
        output::print("options:     (none)", v);
    } else {
        output::print(format!("options ({}):", options.len()), v);
        output::print(format_list(&options, "  "), v);
    }

    let outputs: Vec<String> = report
        .outputs
        .iter()
        .map(|(name, value)| format!("{} = {}", name, or_none(value)))
        .collect();
    output::print("outputs:", v);
    output::print(format_list(&outputs, "  "), v);

    if report.status.as_deref() == Some("failed") {
        output::warn("metadata request failed; run with --debug for details", v);
    }
}
