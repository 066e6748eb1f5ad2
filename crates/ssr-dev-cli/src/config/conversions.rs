use crate::config::validation::resolve;
use crate::config::{PipelineKind, SsrDevConfig};
use ssr_dev::{CommandCompiler, CommandSpec, DevServerOptions, PipelineConfig, TemplateWatch};
use std::path::Path;
use std::sync::Arc;

/// The three command-backed pipelines built from a configuration.
#[derive(Debug, Clone)]
pub struct Compilers {
    pub client: Arc<CommandCompiler>,
    pub server: Arc<CommandCompiler>,
    pub error: Arc<CommandCompiler>,
}

impl SsrDevConfig {
    /// Build the compiler for one pipeline, run from `cwd`.
    ///
    /// The client pipeline is reconfigured for hot reload against `hmr_path`.
    pub fn command_compiler(&self, kind: PipelineKind, cwd: &Path) -> CommandCompiler {
        let section = self.section(kind);

        let mut pipeline = PipelineConfig::new(kind.as_str(), String::new(), &self.output_dir);
        pipeline.entry = section.entry.clone();
        pipeline.public_path = section.public_path.clone();
        if kind == PipelineKind::Client {
            pipeline = pipeline.into_hot_reload(&self.hmr_path);
        }

        let (program, args) = section
            .command
            .split_first()
            .map(|(program, args)| (program.clone(), args.to_vec()))
            .unwrap_or_default();

        let mut spec = CommandSpec::new(program, args).with_cwd(cwd);
        spec.watch = section.watch.iter().map(|root| resolve(cwd, root)).collect();
        spec.ignore = self.ignore.clone();
        spec.debounce_ms = self.debounce_ms;

        CommandCompiler::new(spec, pipeline)
    }

    pub fn compilers(&self, cwd: &Path) -> Compilers {
        Compilers {
            client: Arc::new(self.command_compiler(PipelineKind::Client, cwd)),
            server: Arc::new(self.command_compiler(PipelineKind::Server, cwd)),
            error: Arc::new(self.command_compiler(PipelineKind::Error, cwd)),
        }
    }

    /// Options for the coordinator, with the template resolved against `cwd`.
    pub fn dev_server_options(&self, cwd: &Path, compilers: &Compilers) -> DevServerOptions {
        DevServerOptions::new(
            resolve(cwd, &self.template),
            compilers.client.clone(),
            compilers.server.clone(),
            compilers.error.clone(),
            &self.output_dir,
        )
        .with_artifacts(self.artifacts.clone())
        .with_template_watch(TemplateWatch::Notify {
            debounce_ms: self.debounce_ms,
        })
    }
}
