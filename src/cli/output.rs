use anyhow::Result;
use clap::ValueEnum;
use routebind_cli::planner::PlanReport;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

pub fn render_plan(report: &PlanReport, format: &OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
        OutputFormat::Human => render_human(report),
    };
    Ok(rendered)
}

fn render_human(report: &PlanReport) -> String {
    let mut out = format!("api {} ({})\n", report.api_id, report.stack);
    for planned in &report.integrations {
        let config = &planned.config;
        out.push_str(&format!(
            "  {} -> {} [{}] {} (payload {})\n",
            planned.route_key,
            config.kind.as_str(),
            planned.handler,
            config.uri,
            config.payload_format_version
        ));
        if let Some(mapping) = &config.parameter_mapping {
            for (key, value) in mapping.iter() {
                out.push_str(&format!("      {key} = {value}\n"));
            }
        }
    }
    out.push_str(&format!("grants ({})\n", report.grants.len()));
    for grant in &report.grants {
        out.push_str(&format!(
            "  {} on {}\n      {} from {}\n",
            grant.statement_id, grant.function_arn, grant.principal, grant.source_arn
        ));
    }
    out
}
