// src/commands/launch.rs

use crate::{
    commands::exec::stream_process,
    core::{
        context::EngineContext,
        error::{ScriptError, ScriptResult},
        paths,
        registry::{Command, Invocation, parse_options},
    },
    system::executor::ProcessSpec,
};
use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "launch")]
struct LaunchArgs {
    /// Print what would be started without starting it.
    #[arg(long, short = 'n')]
    dry_run: bool,
}

/// Starts an environment's program with its configured arguments, followed by
/// any passthrough arguments given after `--`.
#[derive(Debug, Default)]
pub struct Launch;

impl Command for Launch {
    fn name(&self) -> &'static str {
        "launch"
    }

    fn requires_environment(&self) -> bool {
        true
    }

    fn options(&self) -> Option<clap::Command> {
        Some(LaunchArgs::command())
    }

    fn accepts_passthrough(&self) -> bool {
        true
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut EngineContext, mut inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<LaunchArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        let Some(env) = inv.environment.take() else {
            return Err(ScriptError::MissingEnvironment {
                command: self.name().to_string(),
            });
        };

        let mut program_args = env.args.clone();
        program_args.extend(inv.passthrough.iter().cloned());

        let cwd = match &env.working_dir {
            Some(dir) => Some(
                paths::expand_path(&dir.to_string_lossy())
                    .map_err(|e| ScriptError::Other(e.into()))?,
            ),
            None => None,
        };

        let spec = ProcessSpec {
            program: &env.program,
            args: &program_args,
            cwd: cwd.as_deref(),
            env: Some(&env.env),
        };

        if args.dry_run {
            let mut line = format!("[{}] {}", env.name, spec.display());
            if let Some(dir) = &cwd {
                line.push_str(&format!(" (in {})", dir.display()));
            }
            if let Some(line) = inv.filters.apply(line, true) {
                ctx.emit(&line, true);
            }
            return Ok(());
        }

        log::info!("Launching environment '{}': {}", env.name, spec.display());
        stream_process(ctx, &spec, &mut inv.filters, None)?;
        Ok(())
    }
}

pub fn build() -> Box<dyn Command> {
    Box::new(Launch)
}

#[cfg(test)]
mod tests {
    use crate::core::context::{BufferListener, EngineContext};
    use crate::core::engine::run_source;
    use crate::models::EnvironmentConfig;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn context_with(env: EnvironmentConfig) -> (EngineContext, BufferListener) {
        let mut envs = HashMap::new();
        envs.insert("app".to_string(), env);
        let out = BufferListener::new();
        let ctx = EngineContext::for_script(Box::new(envs)).with_listener(out.clone());
        (ctx, out)
    }

    #[test]
    fn test_dry_run_shows_full_command_line() {
        let (mut ctx, out) = context_with(EnvironmentConfig {
            program: "server".to_string(),
            args: vec!["--mode".to_string(), "dev".to_string()],
            working_dir: Some(PathBuf::from("/srv/app")),
            ..Default::default()
        });
        run_source(&mut ctx, "launch app --dry-run -- --port 8080\n").unwrap();
        assert_eq!(
            out.stdout(),
            vec!["[app] server --mode dev --port 8080 (in /srv/app)"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_runs_with_environment_variables() {
        let mut env = HashMap::new();
        env.insert("GREETING".to_string(), "hello".to_string());
        let (mut ctx, out) = context_with(EnvironmentConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo $GREETING $0".to_string()],
            env,
            ..Default::default()
        });
        run_source(&mut ctx, "launch app -- world | replace world there\n").unwrap();
        assert_eq!(out.stdout(), vec!["hello there"]);
    }
}
