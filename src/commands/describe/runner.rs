use crate::commands::describe::DescribeCommand;
use crate::error::Error;
use crate::runner::Runner;
use crate::stack::Stack;
use aws_sdk_cloudformation::primitives::DateTime;
use aws_sdk_cloudformation::types::Stack as StackDescription;
use eyre::Context;
use serde_json::json;
use tabled::settings::{peaker::Priority, style::Style, Settings, Width};
use tabled::{Table, Tabled};
use terminal_size::{terminal_size, Width as TerminalWidth};

pub(crate) struct DescribeRunner {
    pub(crate) command: DescribeCommand,
}

impl Runner for DescribeRunner {
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config(&self.command.stack)?;
        let sdk = config.sdk().await;
        let description = Stack::new(&sdk, config).describe().await?;

        if self.command.json {
            let raw = serde_json::to_string_pretty(&as_json(&description))
                .wrap_err("Failed to serialize stack description")?;
            println!("{raw}");
            return Ok(());
        }

        render(&description);
        Ok(())
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Stack")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Last Updated")]
    updated: String,
}

#[derive(Tabled)]
struct OutputRow {
    #[tabled(rename = "Output")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "Parameter")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render summary, outputs and parameters as tables fitting the terminal
fn render(description: &StackDescription) {
    // Check terminal size and set up the output tables accordingly
    let width = terminal_size()
        .map(|(TerminalWidth(width), _)| width as usize)
        .unwrap_or(120);

    let settings = Settings::default()
        .with(Width::wrap(width).priority(Priority::max(true)))
        .with(Width::increase(width));

    let summary = vec![SummaryRow {
        name: description.stack_name().unwrap_or_default().to_string(),
        status: description
            .stack_status()
            .map(|status| status.as_str())
            .unwrap_or_default()
            .to_string(),
        created: format_time(description.creation_time()),
        updated: format_time(description.last_updated_time()),
    }];

    let mut table = Table::new(summary);
    table.with(Style::modern()).with(settings.clone());
    println!("{table}");

    if let Some(reason) = description.stack_status_reason() {
        println!("{} {reason}", console::style("Status reason:").yellow());
    }

    let outputs: Vec<OutputRow> = description
        .outputs()
        .iter()
        .map(|output| OutputRow {
            key: output.output_key().unwrap_or_default().to_string(),
            value: output.output_value().unwrap_or_default().to_string(),
            description: output.description().unwrap_or_default().to_string(),
        })
        .collect();

    if !outputs.is_empty() {
        let mut table = Table::new(outputs);
        table.with(Style::modern()).with(settings.clone());
        println!("Outputs:\n{table}");
    }

    let parameters: Vec<ParameterRow> = description
        .parameters()
        .iter()
        .map(|parameter| ParameterRow {
            key: parameter.parameter_key().unwrap_or_default().to_string(),
            value: parameter.parameter_value().unwrap_or_default().to_string(),
        })
        .collect();

    if !parameters.is_empty() {
        let mut table = Table::new(parameters);
        table.with(Style::modern()).with(settings.clone());
        println!("Parameters:\n{table}");
    }
}

/// Mirror the service response shape, as the raw AWS CLI would print it
fn as_json(stack: &StackDescription) -> serde_json::Value {
    json!({
        "StackName": stack.stack_name(),
        "StackId": stack.stack_id(),
        "Description": stack.description(),
        "StackStatus": stack.stack_status().map(|status| status.as_str()),
        "StackStatusReason": stack.stack_status_reason(),
        "CreationTime": stack.creation_time().map(|time| time.to_string()),
        "LastUpdatedTime": stack.last_updated_time().map(|time| time.to_string()),
        "Parameters": stack.parameters().iter().map(|parameter| json!({
            "ParameterKey": parameter.parameter_key(),
            "ParameterValue": parameter.parameter_value(),
        })).collect::<Vec<_>>(),
        "Outputs": stack.outputs().iter().map(|output| json!({
            "OutputKey": output.output_key(),
            "OutputValue": output.output_value(),
            "Description": output.description(),
        })).collect::<Vec<_>>(),
        "Tags": stack.tags().iter().map(|tag| json!({
            "Key": tag.key(),
            "Value": tag.value(),
        })).collect::<Vec<_>>(),
    })
}

fn format_time(time: Option<&DateTime>) -> String {
    time.and_then(|time| chrono::DateTime::from_timestamp(time.secs(), 0))
        .map(|time| {
            time.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}
