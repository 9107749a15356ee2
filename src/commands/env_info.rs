// src/commands/env_info.rs

use crate::core::{
    commons::wrap_value,
    context::EngineContext,
    error::{ScriptError, ScriptResult},
    registry::{Command, Invocation},
};

/// Prints the configuration of an environment.
#[derive(Debug, Default)]
pub struct EnvInfo;

impl Command for EnvInfo {
    fn name(&self) -> &'static str {
        "env_info"
    }

    fn requires_environment(&self) -> bool {
        true
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut EngineContext, mut inv: Invocation) -> ScriptResult<()> {
        if let Some(extra) = inv.args.first() {
            return Err(ScriptError::InvalidOptions {
                command: self.name().to_string(),
                message: format!("unexpected argument '{}'", extra),
            });
        }
        let Some(env) = inv.environment.take() else {
            return Err(ScriptError::MissingEnvironment {
                command: self.name().to_string(),
            });
        };

        let mut lines = vec![format!("Environment: {}", env.name)];
        if let Some(description) = &env.description {
            lines.push(format!("  Description: {}", description));
        }
        lines.push(format!("  Program: {}", env.program));
        if !env.args.is_empty() {
            let args: Vec<String> = env.args.iter().map(|a| wrap_value(a)).collect();
            lines.push(format!("  Args: {}", args.join(" ")));
        }
        if let Some(dir) = &env.working_dir {
            lines.push(format!("  Working dir: {}", dir.display()));
        }
        if !env.env.is_empty() {
            lines.push("  Env:".to_string());
            let mut vars: Vec<_> = env.env.iter().collect();
            vars.sort();
            for (key, value) in vars {
                lines.push(format!("    {}={}", key, wrap_value(value)));
            }
        }

        for line in lines {
            if let Some(line) = inv.filters.apply(line, true) {
                ctx.emit(&line, true);
            }
        }
        Ok(())
    }
}

pub fn build() -> Box<dyn Command> {
    Box::new(EnvInfo)
}

#[cfg(test)]
mod tests {
    use crate::core::context::{BufferListener, EngineContext};
    use crate::core::engine::run_source;
    use crate::core::error::ScriptError;
    use crate::models::EnvironmentConfig;
    use std::collections::HashMap;

    fn context() -> (EngineContext, BufferListener) {
        let mut env = HashMap::new();
        env.insert("B".to_string(), "2".to_string());
        env.insert("A".to_string(), "1".to_string());
        let mut envs = HashMap::new();
        envs.insert(
            "web".to_string(),
            EnvironmentConfig {
                description: Some("Web frontend".to_string()),
                program: "npm".to_string(),
                args: vec!["run".to_string(), "dev".to_string()],
                env,
                ..Default::default()
            },
        );
        let out = BufferListener::new();
        (
            EngineContext::for_command_line(Box::new(envs)).with_listener(out.clone()),
            out,
        )
    }

    #[test]
    fn test_prints_environment_details() {
        let (mut ctx, out) = context();
        run_source(&mut ctx, "env_info web\n").unwrap();
        assert_eq!(
            out.stdout(),
            vec![
                "Environment: web",
                "  Description: Web frontend",
                "  Program: npm",
                "  Args: \"run\" \"dev\"",
                "  Env:",
                "    A=\"1\"",
                "    B=\"2\"",
            ]
        );
    }

    #[test]
    fn test_output_can_be_filtered() {
        let (mut ctx, out) = context();
        run_source(&mut ctx, "env_info web | grep Program\n").unwrap();
        assert_eq!(out.stdout(), vec!["  Program: npm"]);
    }

    #[test]
    fn test_unknown_environment() {
        let (mut ctx, _) = context();
        let err = run_source(&mut ctx, "env_info api\n").unwrap_err();
        assert!(matches!(err.root_cause(), ScriptError::InvalidEnvironment { .. }));
    }
}
