//! Command execution handlers

use crate::application::{AppConfig, Commands, EnvironmentConfig, LoadedConfig};
use crate::infra::{
    CloudAssembly, Stack, StartupScript, build_services_stack, synthesize,
};
use crate::primitives::TemplateFormat;
use anyhow::{Context, Result};
use console::style;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Resolved inputs shared by every handler
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub app: AppConfig,
    pub environment: EnvironmentConfig,
}

impl CommandContext {
    pub fn new(app: AppConfig, environment: EnvironmentConfig) -> Self {
        Self { app, environment }
    }

    pub fn workdir(&self) -> &Path {
        self.app.workdir()
    }

    /// Environment first, then the boot script, then the graph
    pub fn build_stack(&self) -> Result<Stack> {
        let environment = self.environment.stack_environment()?;
        let script = StartupScript::load(self.workdir())?;
        let stack = build_services_stack(environment, &script)
            .context("Failed to build the resource graph")?;
        Ok(stack)
    }
}

/// Execute the parsed command, `synth` when none was given
pub fn execute_command(config: LoadedConfig) -> Result<()> {
    let context = CommandContext::new(config.app_config, config.environment);
    let command = config.command.unwrap_or_default();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute_command_with_context(command, &context, &mut out)
}

/// Execute a specific command against a provided context and writer
pub fn execute_command_with_context(
    command: Commands,
    context: &CommandContext,
    out: &mut dyn Write,
) -> Result<()> {
    debug!(?command, workdir = %context.workdir().display(), "Executing command");
    match command {
        Commands::Synth { format, stdout } => handle_synth(context, format, stdout, out),
        Commands::List => handle_list(context, out),
        Commands::Version => handle_version(out),
    }
}

fn handle_synth(
    context: &CommandContext,
    format: TemplateFormat,
    to_stdout: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let stack = context.build_stack()?;
    let template = synthesize(&stack).context("Failed to synthesize template")?;

    if to_stdout {
        let body = match format {
            TemplateFormat::Json => template.to_json_string()?,
            TemplateFormat::Yaml => template.to_yaml_string()?,
        };
        writeln!(out, "{body}")?;
        return Ok(());
    }

    let assembly = CloudAssembly::new(&context.app.output);
    let written = assembly
        .write(&stack, &template, format)
        .context("Failed to write cloud assembly")?;

    info!(
        stack = stack.name(),
        resources = template.resources.len(),
        "Synthesis complete"
    );
    writeln!(
        out,
        "{} {} ({} resources) -> {}",
        style("✓").green(),
        style(stack.name()).bold(),
        template.resources.len(),
        written.template.display()
    )?;
    Ok(())
}

fn handle_list(context: &CommandContext, out: &mut dyn Write) -> Result<()> {
    let stack = context.build_stack()?;
    let graph = stack.graph();

    writeln!(
        out,
        "{} ({})",
        style(stack.name()).bold(),
        stack.environment()
    )?;
    for declaration in graph.topological_order()? {
        writeln!(
            out,
            "  {:<24} {:<28} {}",
            style(declaration.kind().label()).cyan(),
            declaration.construct_id,
            style(&declaration.logical_id).dim()
        )?;
        for (dependency, reference) in graph.dependencies(&declaration.logical_id).unwrap_or_default() {
            writeln!(
                out,
                "      <- {} ({:?})",
                dependency.construct_id,
                reference
            )?;
        }
    }
    Ok(())
}

fn handle_version(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "stackgraph {}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
